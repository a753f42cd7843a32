//! U2F wire messages and the stored-credential type.
//!
//! Field names follow the U2F JavaScript API spelling (`appId`, `keyHandle`,
//! `registrationData`, ...), so the serialized structures can be handed to
//! `u2f.register` / `u2f.sign` in the browser unchanged.

use serde::{Deserialize, Serialize};

/// Protocol version emitted in every challenge.
pub const U2F_VERSION: &str = "U2F_V2";

/// Length of an uncompressed P-256 public key: `0x04 || X(32) || Y(32)`.
pub const PUBLIC_KEY_LEN: usize = 65;

/// Client-data type marker echoed in registration responses.
pub(crate) const TYP_REGISTRATION: &str = "navigator.id.finishEnrollment";

/// Client-data type marker echoed in authentication responses.
pub(crate) const TYP_AUTHENTICATION: &str = "navigator.id.getAssertion";

/// Registration challenge passed to `u2f.register` on the client.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationChallenge {
    pub version: String,
    /// Websafe-Base64 nonce, fresh per challenge.
    pub challenge: String,
    pub app_id: String,
}

/// Response produced by the device for a registration challenge.
#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationResponse {
    /// Websafe-Base64 binary registration message.
    pub registration_data: String,
    /// Websafe-Base64 client-data JSON.
    pub client_data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Authentication challenge passed to `u2f.sign` on the client.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationChallenge {
    pub version: String,
    /// Websafe-Base64 nonce, independent of any registration nonce.
    pub challenge: String,
    /// Handle of the credential expected to answer.
    pub key_handle: String,
    pub app_id: String,
}

/// Response produced by the device for an authentication challenge.
#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationResponse {
    /// Websafe-Base64 binary signature message.
    pub signature_data: String,
    /// Websafe-Base64 client-data JSON.
    pub client_data: String,
    /// Echoed by real devices; checked against the context when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_handle: Option<String>,
}

/// Client-data JSON assembled by the browser and signed by the device.
#[derive(Deserialize, Debug)]
pub(crate) struct ClientData {
    pub typ: String,
    pub challenge: String,
    pub origin: String,
}

/// A registered credential, returned to the caller to persist.
///
/// `handle` is the websafe-Base64 key handle, opaque and of no fixed length;
/// it round-trips verbatim into authentication challenges. `pub_key` is the
/// standard-Base64 encoding of the 65-byte uncompressed EC point.
///
/// A `Client` is produced only by a successful registration verification and
/// is immutable afterwards. Alongside it, callers must store the last seen
/// usage counter for the credential and reject any authentication whose
/// counter is not strictly greater.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub handle: String,
    pub pub_key: String,
}
