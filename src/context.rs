//! Per-operation protocol context.
//!
//! A [`Context`] holds the parameter set for a single in-flight registration
//! or authentication and orchestrates the two flows: issue a challenge, hand
//! it to the transport, feed the device's response back for verification.

use log::{debug, warn};
use url::Url;

use crate::authentication;
use crate::codec;
use crate::crypto;
use crate::errors::U2fError;
use crate::registration;
use crate::types::{
    AuthenticationChallenge, Client, RegistrationChallenge, PUBLIC_KEY_LEN, U2F_VERSION,
};

/// Parameter set for one logical challenge/response pair.
///
/// A context owns its buffers exclusively; independent contexts may be used
/// concurrently from independent threads. Reuse after a completed
/// verification is unsupported: obtain a fresh context from
/// [`Server::open`](crate::Server::open) for each operation. Issuing a new
/// challenge on the same context replaces the pending one.
#[derive(Debug, Default)]
pub struct Context {
    origin: Option<String>,
    app_id: Option<String>,
    challenge: Option<String>,
    key_handle: Option<String>,
    public_key: Option<[u8; PUBLIC_KEY_LEN]>,
}

impl Context {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Set the expected relying-party origin.
    ///
    /// # Errors
    /// `U2fError::Format` if `origin` is empty or not parseable as a URL.
    /// The context is unchanged on failure.
    pub fn set_origin(&mut self, origin: &str) -> Result<(), U2fError> {
        validate_url_like(origin)?;
        self.origin = Some(origin.to_owned());
        Ok(())
    }

    /// Set the application identifier.
    ///
    /// # Errors
    /// `U2fError::Format` if `app_id` is empty or not parseable as a URL.
    /// The context is unchanged on failure.
    pub fn set_app_id(&mut self, app_id: &str) -> Result<(), U2fError> {
        validate_url_like(app_id)?;
        self.app_id = Some(app_id.to_owned());
        Ok(())
    }

    /// Set the key handle of the credential expected to authenticate.
    ///
    /// # Errors
    /// `U2fError::Format` if the handle is empty.
    pub fn set_key_handle(&mut self, key_handle: &str) -> Result<(), U2fError> {
        if key_handle.is_empty() {
            return Err(U2fError::Format);
        }
        self.key_handle = Some(key_handle.to_owned());
        Ok(())
    }

    /// Set the credential public key from its standard-Base64 encoding.
    ///
    /// The key is decoded and its length validated here, at construction
    /// time, not deferred to verification.
    ///
    /// # Errors
    /// `U2fError::Base64` if the encoding is invalid,
    /// `U2fError::InvalidPublicKey` if the decoded key is not exactly
    /// 65 bytes. The context is unchanged on failure.
    pub fn set_public_key(&mut self, public_key: &str) -> Result<(), U2fError> {
        let decoded = codec::decode_standard(public_key)?;
        let key: [u8; PUBLIC_KEY_LEN] = decoded
            .try_into()
            .map_err(|_| U2fError::InvalidPublicKey)?;
        self.public_key = Some(key);
        Ok(())
    }

    /// Build a registration challenge for `origin` / `app_id`.
    ///
    /// Generates a fresh random nonce and returns the JSON structure to pass
    /// to `u2f.register` on the client.
    ///
    /// # Errors
    /// `U2fError::Format` for unusable parameters, `U2fError::Crypto` if the
    /// system RNG fails.
    pub fn registration_challenge(
        &mut self,
        origin: &str,
        app_id: &str,
    ) -> Result<String, U2fError> {
        self.set_app_id(app_id)?;
        self.set_origin(origin)?;
        let challenge = crypto::generate_challenge()?;

        let message = RegistrationChallenge {
            version: U2F_VERSION.to_owned(),
            challenge: challenge.clone(),
            app_id: app_id.to_owned(),
        };
        let json = serde_json::to_string(&message).map_err(|_| U2fError::Json)?;
        self.challenge = Some(challenge);
        debug!("issued registration challenge for {origin}");
        Ok(json)
    }

    /// Verify a registration response and extract the new credential.
    ///
    /// All checks must pass: challenge echo, origin binding, attestation
    /// certificate parse, signature over the registration message, and
    /// public-key format. The transient verification result is released
    /// here; only the [`Client`] escapes.
    ///
    /// # Errors
    /// The verification step that failed, per the [`U2fError`] taxonomy.
    pub fn registration_verify(&self, response: &str) -> Result<Client, U2fError> {
        let challenge = self.challenge.as_deref().ok_or(U2fError::Challenge)?;
        let origin = self.origin.as_deref().ok_or(U2fError::Format)?;
        let app_id = self.app_id.as_deref().ok_or(U2fError::Format)?;

        let result = registration::verify(challenge, origin, app_id, response)
            .map_err(|err| log_rejection("registration", err))?;

        Ok(Client {
            handle: codec::encode_websafe(&result.key_handle),
            pub_key: codec::encode_standard(&result.public_key),
        })
    }

    /// Build an authentication challenge bound to a registered credential.
    ///
    /// Generates a fresh nonce, independent of any prior registration nonce,
    /// and returns the JSON structure to pass to `u2f.sign` on the client.
    ///
    /// # Errors
    /// `U2fError::InvalidPublicKey` or `U2fError::Base64` if the stored
    /// credential key is malformed, `U2fError::Format` for unusable
    /// parameters, `U2fError::Crypto` if the system RNG fails.
    pub fn authentication_challenge(
        &mut self,
        origin: &str,
        app_id: &str,
        client: &Client,
    ) -> Result<String, U2fError> {
        self.set_app_id(app_id)?;
        self.set_origin(origin)?;
        self.set_key_handle(&client.handle)?;
        self.set_public_key(&client.pub_key)?;
        let challenge = crypto::generate_challenge()?;

        let message = AuthenticationChallenge {
            version: U2F_VERSION.to_owned(),
            challenge: challenge.clone(),
            key_handle: client.handle.clone(),
            app_id: app_id.to_owned(),
        };
        let json = serde_json::to_string(&message).map_err(|_| U2fError::Json)?;
        self.challenge = Some(challenge);
        debug!("issued authentication challenge for {origin}");
        Ok(json)
    }

    /// Verify an authentication response.
    ///
    /// Returns the device's usage counter and whether user presence was
    /// asserted. The caller must reject any counter that is not strictly
    /// greater than the last value stored for this credential: the check
    /// here is stateless, so a replayed response verifies again with the
    /// same counter, and only the caller's comparison detects it (and with
    /// it, cloned keys).
    ///
    /// # Errors
    /// The verification step that failed, per the [`U2fError`] taxonomy.
    pub fn authentication_verify(&self, response: &str) -> Result<(u32, bool), U2fError> {
        let challenge = self.challenge.as_deref().ok_or(U2fError::Challenge)?;
        let origin = self.origin.as_deref().ok_or(U2fError::Format)?;
        let app_id = self.app_id.as_deref().ok_or(U2fError::Format)?;
        let key_handle = self.key_handle.as_deref().ok_or(U2fError::Format)?;
        let public_key = self.public_key.as_ref().ok_or(U2fError::InvalidPublicKey)?;

        let result =
            authentication::verify(challenge, origin, app_id, key_handle, public_key, response)
                .map_err(|err| log_rejection("authentication", err))?;

        Ok((result.counter, result.user_present()))
    }

    /// Consume the context, releasing its buffers. Dropping it is
    /// equivalent; this exists as an explicit release point.
    pub fn close(self) {}
}

fn validate_url_like(value: &str) -> Result<(), U2fError> {
    if value.is_empty() || Url::parse(value).is_err() {
        return Err(U2fError::Format);
    }
    Ok(())
}

/// Log a verification failure, distinguishing potential forgeries from
/// benignly malformed input, and hand the error back.
fn log_rejection(operation: &str, err: U2fError) -> U2fError {
    if err.is_security_relevant() {
        warn!("{operation} rejected: {err}");
    } else {
        debug!("{operation} rejected: {err}");
    }
    err
}
