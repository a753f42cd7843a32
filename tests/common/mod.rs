//! Software U2F key used to exercise the full protocol in tests.
//!
//! `SoftKey` plays the device role: it holds a credential key pair and an
//! attestation key pair with a self-signed certificate, and answers
//! challenges with responses signed over the exact U2F message layouts.

#![allow(dead_code)]

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use openssl::asn1::Asn1Time;
use openssl::bn::{BigNum, BigNumContext};
use openssl::ec::{EcGroup, EcKey, PointConversionForm};
use openssl::ecdsa::EcdsaSig;
use openssl::hash::MessageDigest;
use openssl::nid::Nid;
use openssl::pkey::{PKey, Private};
use openssl::sha::sha256;
use openssl::x509::{X509, X509NameBuilder};
use serde_json::json;

pub const ORIGIN: &str = "https://example.com";
pub const APP_ID: &str = "https://example.com";

pub const TYP_REGISTRATION: &str = "navigator.id.finishEnrollment";
pub const TYP_AUTHENTICATION: &str = "navigator.id.getAssertion";

pub struct SoftKey {
    credential: EcKey<Private>,
    attestation: EcKey<Private>,
    cert_der: Vec<u8>,
    pub key_handle: Vec<u8>,
}

impl SoftKey {
    pub fn new() -> Self {
        let group = p256_group();
        let attestation = EcKey::generate(&group).unwrap();
        let cert_der = self_signed_cert(&attestation);
        SoftKey {
            credential: EcKey::generate(&group).unwrap(),
            attestation,
            cert_der,
            key_handle: b"soft-key-handle-0001".to_vec(),
        }
    }

    /// The credential public key as a 65-byte uncompressed point.
    pub fn public_key_bytes(&self) -> Vec<u8> {
        let mut ctx = BigNumContext::new().unwrap();
        self.credential
            .public_key()
            .to_bytes(
                self.credential.group(),
                PointConversionForm::UNCOMPRESSED,
                &mut ctx,
            )
            .unwrap()
    }

    /// Answer a registration challenge JSON with a validly signed response.
    pub fn register(&self, challenge_json: &str) -> String {
        let challenge: serde_json::Value = serde_json::from_str(challenge_json).unwrap();
        self.register_with(
            challenge["challenge"].as_str().unwrap(),
            challenge["appId"].as_str().unwrap(),
            ORIGIN,
        )
    }

    /// Build a registration response for an explicit nonce, appId and
    /// origin, letting tests produce deliberately mismatched messages.
    pub fn register_with(&self, nonce: &str, app_id: &str, origin: &str) -> String {
        let client_data = client_data_json(TYP_REGISTRATION, nonce, origin);
        let public_key = self.public_key_bytes();

        let mut message = vec![0x00];
        message.extend_from_slice(&sha256(app_id.as_bytes()));
        message.extend_from_slice(&sha256(client_data.as_bytes()));
        message.extend_from_slice(&self.key_handle);
        message.extend_from_slice(&public_key);
        let signature = ecdsa_sign(&self.attestation, &message);

        let mut registration_data = vec![0x05];
        registration_data.extend_from_slice(&public_key);
        registration_data.push(u8::try_from(self.key_handle.len()).unwrap());
        registration_data.extend_from_slice(&self.key_handle);
        registration_data.extend_from_slice(&self.cert_der);
        registration_data.extend_from_slice(&signature);

        json!({
            "registrationData": URL_SAFE_NO_PAD.encode(&registration_data),
            "clientData": URL_SAFE_NO_PAD.encode(client_data.as_bytes()),
            "version": "U2F_V2",
        })
        .to_string()
    }

    /// Answer an authentication challenge JSON with the given counter and
    /// presence byte.
    pub fn sign(&self, challenge_json: &str, counter: u32, presence: u8) -> String {
        let challenge: serde_json::Value = serde_json::from_str(challenge_json).unwrap();
        self.sign_with(
            challenge["challenge"].as_str().unwrap(),
            challenge["appId"].as_str().unwrap(),
            ORIGIN,
            challenge["keyHandle"].as_str().unwrap(),
            counter,
            presence,
        )
    }

    /// Build an authentication response for explicit parameters.
    pub fn sign_with(
        &self,
        nonce: &str,
        app_id: &str,
        origin: &str,
        key_handle: &str,
        counter: u32,
        presence: u8,
    ) -> String {
        let client_data = client_data_json(TYP_AUTHENTICATION, nonce, origin);

        let mut message = Vec::new();
        message.extend_from_slice(&sha256(app_id.as_bytes()));
        message.push(presence);
        message.extend_from_slice(&counter.to_be_bytes());
        message.extend_from_slice(&sha256(client_data.as_bytes()));
        let signature = ecdsa_sign(&self.credential, &message);

        let mut signature_data = vec![presence];
        signature_data.extend_from_slice(&counter.to_be_bytes());
        signature_data.extend_from_slice(&signature);

        json!({
            "signatureData": URL_SAFE_NO_PAD.encode(&signature_data),
            "clientData": URL_SAFE_NO_PAD.encode(client_data.as_bytes()),
            "keyHandle": key_handle,
        })
        .to_string()
    }
}

fn p256_group() -> EcGroup {
    EcGroup::from_curve_name(Nid::X9_62_PRIME256V1).unwrap()
}

fn client_data_json(typ: &str, challenge: &str, origin: &str) -> String {
    json!({
        "typ": typ,
        "challenge": challenge,
        "origin": origin,
    })
    .to_string()
}

fn ecdsa_sign(key: &EcKey<Private>, message: &[u8]) -> Vec<u8> {
    EcdsaSig::sign(&sha256(message), key)
        .unwrap()
        .to_der()
        .unwrap()
}

fn self_signed_cert(key: &EcKey<Private>) -> Vec<u8> {
    let pkey = PKey::from_ec_key(key.clone()).unwrap();

    let mut name = X509NameBuilder::new().unwrap();
    name.append_entry_by_text("CN", "U2F Soft Key").unwrap();
    let name = name.build();

    let serial = BigNum::from_u32(1).unwrap().to_asn1_integer().unwrap();

    let mut builder = X509::builder().unwrap();
    builder.set_version(2).unwrap();
    builder.set_serial_number(&serial).unwrap();
    builder.set_subject_name(&name).unwrap();
    builder.set_issuer_name(&name).unwrap();
    builder.set_pubkey(&pkey).unwrap();
    builder
        .set_not_before(&Asn1Time::days_from_now(0).unwrap())
        .unwrap();
    builder
        .set_not_after(&Asn1Time::days_from_now(3650).unwrap())
        .unwrap();
    builder.sign(&pkey, MessageDigest::sha256()).unwrap();
    builder.build().to_der().unwrap()
}
