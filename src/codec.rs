//! Base64 codecs and client-data validation.
//!
//! Wire fields use the websafe alphabet without padding, as produced by the
//! U2F JavaScript API. The stored credential public key uses the standard
//! alphabet. Decoding is strict: any malformed input is rejected before it
//! reaches a cryptographic trust decision.

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;

use crate::errors::U2fError;
use crate::types::ClientData;

pub(crate) fn decode_websafe(data: &str) -> Result<Vec<u8>, U2fError> {
    URL_SAFE_NO_PAD.decode(data).map_err(|_| U2fError::Base64)
}

pub(crate) fn encode_websafe(data: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(data)
}

pub(crate) fn decode_standard(data: &str) -> Result<Vec<u8>, U2fError> {
    STANDARD.decode(data).map_err(|_| U2fError::Base64)
}

pub(crate) fn encode_standard(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Decode the client-data blob and check it against the pending operation.
///
/// The challenge comparison is byte-for-byte on the decoded nonces, not on
/// their encodings. Returns the decoded bytes so the caller hashes exactly
/// what was verified.
pub(crate) fn verify_client_data(
    client_data_b64: &str,
    expected_typ: &str,
    expected_challenge: &str,
    expected_origin: &str,
) -> Result<Vec<u8>, U2fError> {
    let raw = decode_websafe(client_data_b64)?;
    let client_data: ClientData = serde_json::from_slice(&raw).map_err(|_| U2fError::Json)?;

    if client_data.typ != expected_typ {
        return Err(U2fError::Format);
    }

    let issued = decode_websafe(expected_challenge)?;
    // An unparseable echoed challenge cannot match the issued nonce.
    let echoed = decode_websafe(&client_data.challenge).map_err(|_| U2fError::Challenge)?;
    if issued != echoed {
        return Err(U2fError::Challenge);
    }

    if client_data.origin != expected_origin {
        return Err(U2fError::Origin);
    }

    Ok(raw)
}
