//! Authentication response parsing and verification.

use log::debug;

use crate::codec;
use crate::crypto;
use crate::errors::U2fError;
use crate::types::{AuthenticationResponse, PUBLIC_KEY_LEN, TYP_AUTHENTICATION};

/// Outcome of a verified authentication. Consumed immediately by the
/// context; the caller only ever sees the `(counter, present)` pair.
pub(crate) struct AuthenticationResult {
    pub counter: u32,
    pub user_presence: u8,
}

impl AuthenticationResult {
    /// User presence is asserted by the low bit of the presence byte.
    pub fn user_present(&self) -> bool {
        self.user_presence & 0x01 != 0
    }
}

/// Binary signature message: `userPresence(1) || counter(4 BE) || signature`.
struct SignatureData<'a> {
    user_presence: u8,
    counter: u32,
    signature: &'a [u8],
}

impl<'a> SignatureData<'a> {
    fn from_raw(data: &'a [u8]) -> Result<Self, U2fError> {
        // Presence byte, counter, and at least one octet of signature.
        if data.len() < 6 {
            return Err(U2fError::Format);
        }
        Ok(Self {
            user_presence: data[0],
            counter: u32::from_be_bytes([data[1], data[2], data[3], data[4]]),
            signature: &data[5..],
        })
    }
}

/// Verify an authentication response against the issued challenge and the
/// credential registered on the context.
///
/// The returned counter is not compared to any previous value here; the
/// check is stateless and a replayed response verifies again.
pub(crate) fn verify(
    challenge: &str,
    origin: &str,
    app_id: &str,
    key_handle: &str,
    public_key: &[u8; PUBLIC_KEY_LEN],
    response: &str,
) -> Result<AuthenticationResult, U2fError> {
    let response: AuthenticationResponse =
        serde_json::from_str(response).map_err(|_| U2fError::Json)?;

    // A response for a different credential cannot answer this challenge.
    if let Some(handle) = &response.key_handle {
        if handle != key_handle {
            return Err(U2fError::Challenge);
        }
    }

    let client_data =
        codec::verify_client_data(&response.client_data, TYP_AUTHENTICATION, challenge, origin)?;

    let raw = codec::decode_websafe(&response.signature_data)?;
    let data = SignatureData::from_raw(&raw)?;

    // Signed message: H(appId) || userPresence || counter(4 BE) || H(clientData).
    let app_id_hash = crypto::sha256(app_id.as_bytes());
    let client_data_hash = crypto::sha256(&client_data);
    let mut message = Vec::with_capacity(32 + 1 + 4 + 32);
    message.extend_from_slice(app_id_hash.as_ref());
    message.push(data.user_presence);
    message.extend_from_slice(&data.counter.to_be_bytes());
    message.extend_from_slice(client_data_hash.as_ref());

    crypto::verify_signature(public_key, &message, data.signature)?;

    debug!("authentication verified, counter {}", data.counter);

    Ok(AuthenticationResult {
        counter: data.counter,
        user_presence: data.user_presence,
    })
}
