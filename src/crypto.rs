//! Cryptographic operations for U2F verification.
//!
//! Nonce generation, SHA-256 digests and ECDSA verification; X.509 handling
//! is limited to extracting the attestation certificate's public key.

use openssl::bn::BigNumContext;
use openssl::ec::PointConversionForm;
use openssl::nid::Nid;
use openssl::x509::X509;
use ring::digest::{self, Digest};
use ring::rand::SecureRandom;
use ring::signature::{UnparsedPublicKey, ECDSA_P256_SHA256_ASN1};

use crate::codec;
use crate::errors::U2fError;

/// Number of random bytes in a challenge nonce (256 bits).
pub(crate) const CHALLENGE_LEN: usize = 32;

/// Generate a fresh random challenge, websafe-Base64 encoded.
///
/// Every call draws new bytes from the system RNG; nonces are never reused
/// across operations. The RNG is safe for concurrent use from independent
/// contexts.
pub(crate) fn generate_challenge() -> Result<String, U2fError> {
    let mut bytes = [0u8; CHALLENGE_LEN];
    ring::rand::SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| U2fError::Crypto)?;
    Ok(codec::encode_websafe(&bytes))
}

/// Hash data using SHA-256.
pub(crate) fn sha256(data: &[u8]) -> Digest {
    digest::digest(&digest::SHA256, data)
}

/// Verify an ASN.1 DER ECDSA P-256 signature over `message` with an
/// uncompressed SEC1 public key.
pub(crate) fn verify_signature(
    public_key: &[u8],
    message: &[u8],
    signature: &[u8],
) -> Result<(), U2fError> {
    UnparsedPublicKey::new(&ECDSA_P256_SHA256_ASN1, public_key)
        .verify(message, signature)
        .map_err(|_| U2fError::Signature)
}

/// Extract the attestation certificate's public key as a 65-byte
/// uncompressed P-256 point.
///
/// Trust policy: any syntactically valid X.509 certificate carrying a P-256
/// key is accepted, self-signed certificates included. Chain and validity
/// period are not checked; deployments that pin device vendors must validate
/// the certificate out of band before trusting the registration.
pub(crate) fn attestation_public_key(cert_der: &[u8]) -> Result<Vec<u8>, U2fError> {
    let cert = X509::from_der(cert_der).map_err(|_| U2fError::Crypto)?;
    let key = cert
        .public_key()
        .and_then(|key| key.ec_key())
        .map_err(|_| U2fError::Crypto)?;

    if key.group().curve_name() != Some(Nid::X9_62_PRIME256V1) {
        return Err(U2fError::Crypto);
    }

    let mut ctx = BigNumContext::new().map_err(|_| U2fError::Crypto)?;
    key.public_key()
        .to_bytes(key.group(), PointConversionForm::UNCOMPRESSED, &mut ctx)
        .map_err(|_| U2fError::Crypto)
}
