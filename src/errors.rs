//! Error types for U2F challenge and verification operations.

use thiserror::Error;

/// Failures reported by challenge generation and response verification.
///
/// The enumeration is closed: every failure maps to exactly one documented
/// variant, and anything a backend could report outside the documented range
/// collapses to [`U2fError::Unknown`] rather than being misreported as a
/// specific kind.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum U2fError {
    /// Allocation failure in the verification backend. Fatal for the
    /// request; callers should fail it and allow an upstream retry instead
    /// of treating it as an authentication rejection.
    #[error("memory error")]
    Memory,

    /// Malformed JSON structure in a challenge or response message.
    #[error("JSON error")]
    Json,

    /// Malformed Base64 in a message field.
    #[error("Base64 error")]
    Base64,

    /// Certificate parsing or cryptographic-primitive failure.
    #[error("cryptographic error")]
    Crypto,

    /// Client-data origin does not match the context's origin.
    #[error("origin mismatch")]
    Origin,

    /// Client-data challenge does not match the issued nonce.
    #[error("challenge error")]
    Challenge,

    /// ECDSA signature did not verify.
    #[error("signature mismatch")]
    Signature,

    /// Malformed binary message layout.
    #[error("message format error")]
    Format,

    /// Public key does not decode to exactly 65 bytes.
    #[error("invalid public key format")]
    InvalidPublicKey,

    /// Unrecognized backend failure.
    #[error("unknown error")]
    Unknown,
}

impl U2fError {
    /// Whether this failure suggests a forged or tampered response rather
    /// than benignly malformed input. Security monitoring should log these
    /// kinds distinctly.
    #[must_use]
    pub fn is_security_relevant(self) -> bool {
        matches!(self, U2fError::Crypto | U2fError::Signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_and_crypto_are_security_relevant() {
        assert!(U2fError::Signature.is_security_relevant());
        assert!(U2fError::Crypto.is_security_relevant());
        assert!(!U2fError::Base64.is_security_relevant());
        assert!(!U2fError::Challenge.is_security_relevant());
        assert!(!U2fError::Origin.is_security_relevant());
    }
}
