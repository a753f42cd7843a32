//! Registration response parsing and verification.

use log::debug;

use crate::codec;
use crate::crypto;
use crate::errors::U2fError;
use crate::types::{RegistrationResponse, PUBLIC_KEY_LEN, TYP_REGISTRATION};

/// Reserved first byte of the binary registration message.
const RESERVED_BYTE: u8 = 0x05;

/// Outcome of a verified registration. Consumed immediately by the context;
/// only the encoded [`Client`](crate::Client) escapes to the caller.
pub(crate) struct RegistrationResult {
    pub key_handle: Vec<u8>,
    pub public_key: Vec<u8>,
}

/// Binary registration message:
/// `0x05 || publicKey(65) || handleLen(1) || keyHandle || attestationCert || signature`.
/// Slices borrow from the decoded response buffer.
struct RegistrationData<'a> {
    public_key: &'a [u8],
    key_handle: &'a [u8],
    certificate: &'a [u8],
    signature: &'a [u8],
}

impl<'a> RegistrationData<'a> {
    fn from_raw(data: &'a [u8]) -> Result<Self, U2fError> {
        // Reserved byte, public key, handle length, plus at least the first
        // two octets of the certificate SEQUENCE.
        if data.len() < 1 + PUBLIC_KEY_LEN + 1 + 2 {
            return Err(U2fError::Format);
        }
        if data[0] != RESERVED_BYTE {
            return Err(U2fError::Format);
        }

        let public_key = &data[1..=PUBLIC_KEY_LEN];
        let key_handle_len = usize::from(data[1 + PUBLIC_KEY_LEN]);
        let rest = &data[1 + PUBLIC_KEY_LEN + 1..];

        if rest.len() < key_handle_len + 2 {
            return Err(U2fError::Format);
        }
        let key_handle = &rest[..key_handle_len];
        let rest = &rest[key_handle_len..];

        // The certificate is a single DER SEQUENCE; walk its length header
        // to find where the signature begins.
        if rest[0] != 0x30 {
            return Err(U2fError::Format);
        }
        let (body_len, len_octets) = der_length(&rest[1..])?;
        let cert_len = 1 + len_octets + body_len;
        if rest.len() < cert_len + 1 {
            return Err(U2fError::Format);
        }

        Ok(Self {
            public_key,
            key_handle,
            certificate: &rest[..cert_len],
            signature: &rest[cert_len..],
        })
    }
}

/// Parse a DER length field, returning `(length, size of the length field)`.
fn der_length(data: &[u8]) -> Result<(usize, usize), U2fError> {
    if data.is_empty() {
        return Err(U2fError::Format);
    }
    if data[0] & 0x80 == 0 {
        return Ok((usize::from(data[0]), 1));
    }

    let octets = usize::from(data[0] & 0x7f);
    // DER forbids the indefinite form, and more than four length octets
    // cannot describe a sane certificate.
    if octets == 0 || octets > 4 || data.len() < 1 + octets {
        return Err(U2fError::Format);
    }
    let mut length = 0usize;
    for octet in &data[1..=octets] {
        length = (length << 8) | usize::from(*octet);
    }
    Ok((length, 1 + octets))
}

/// Verify a registration response against the issued challenge and the
/// context's origin and application identifier.
pub(crate) fn verify(
    challenge: &str,
    origin: &str,
    app_id: &str,
    response: &str,
) -> Result<RegistrationResult, U2fError> {
    let response: RegistrationResponse =
        serde_json::from_str(response).map_err(|_| U2fError::Json)?;

    let client_data =
        codec::verify_client_data(&response.client_data, TYP_REGISTRATION, challenge, origin)?;

    let raw = codec::decode_websafe(&response.registration_data)?;
    let data = RegistrationData::from_raw(&raw)?;

    if data.public_key[0] != 0x04 {
        return Err(U2fError::Format);
    }

    let cert_key = crypto::attestation_public_key(data.certificate)?;

    // Signed message: 0x00 || H(appId) || H(clientData) || keyHandle || publicKey.
    let app_id_hash = crypto::sha256(app_id.as_bytes());
    let client_data_hash = crypto::sha256(&client_data);
    let mut message =
        Vec::with_capacity(1 + 32 + 32 + data.key_handle.len() + PUBLIC_KEY_LEN);
    message.push(0x00);
    message.extend_from_slice(app_id_hash.as_ref());
    message.extend_from_slice(client_data_hash.as_ref());
    message.extend_from_slice(data.key_handle);
    message.extend_from_slice(data.public_key);

    crypto::verify_signature(&cert_key, &message, data.signature)?;

    debug!(
        "registration verified, {} byte key handle",
        data.key_handle.len()
    );

    Ok(RegistrationResult {
        key_handle: data.key_handle.to_vec(),
        public_key: data.public_key.to_vec(),
    })
}
