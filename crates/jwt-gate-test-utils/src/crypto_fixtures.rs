//! Deterministic cryptographic fixtures for testing
//!
//! Provides token signing helpers and reproducible Ed25519 keypairs.
//! All keys are deterministic based on seed values.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use ring::hmac;
use ring::signature::{Ed25519KeyPair, KeyPair};
use serde_json::Value;
use thiserror::Error;

/// Test fixture error type
#[derive(Error, Debug)]
pub enum FixtureError {
    #[error("Cryptographic operation failed: {0}")]
    Crypto(String),
}

/// Ed25519 test key.
pub struct TestEd25519Key {
    /// Public key as a JWK `x` value (base64url, no padding)
    pub public_x: String,
    /// Raw 32-byte public key
    pub public_key_bytes: Vec<u8>,
    /// Private key as PKCS#8 v1 DER
    pub private_key_pkcs8: Vec<u8>,
}

/// base64url-encode the JSON serialization of `value`.
pub fn b64url_json(value: &Value) -> String {
    URL_SAFE_NO_PAD.encode(value.to_string())
}

/// Sign `claims` with HS256 and a UTF-8 secret.
pub fn sign_hs256(claims: &Value, secret: &str) -> String {
    sign_with(Algorithm::HS256, claims, secret)
}

/// Sign `claims` with the given HMAC algorithm and a UTF-8 secret.
pub fn sign_with(algorithm: Algorithm, claims: &Value, secret: &str) -> String {
    sign_with_bytes(algorithm, claims, secret.as_bytes())
}

/// Sign `claims` with the given HMAC algorithm and raw key bytes.
pub fn sign_with_bytes(algorithm: Algorithm, claims: &Value, key: &[u8]) -> String {
    encode(
        &Header::new(algorithm),
        claims,
        &EncodingKey::from_secret(key),
    )
    .expect("Failed to sign test token")
}

/// HS256-sign an arbitrary payload, bypassing JSON serialization.
///
/// Used to produce correctly signed tokens whose payload is not a claim
/// object (invalid UTF-8, arrays, ...).
pub fn sign_raw_hs256(payload: &[u8], secret: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let message = format!("{header}.{}", URL_SAFE_NO_PAD.encode(payload));
    let key = hmac::Key::new(hmac::HMAC_SHA256, secret.as_bytes());
    let signature = hmac::sign(&key, message.as_bytes());
    format!("{message}.{}", URL_SAFE_NO_PAD.encode(signature.as_ref()))
}

/// Assemble a token from an arbitrary header, payload and signature segment.
pub fn forge_token(header: &Value, payload: &Value, signature: &str) -> String {
    format!("{}.{}.{signature}", b64url_json(header), b64url_json(payload))
}

/// Generate a deterministic Ed25519 key for testing.
///
/// The same seed always produces the same keypair, ensuring test reproducibility.
///
/// # Example
/// ```rust,ignore
/// let key = test_ed25519_key(1)?;
/// let config = GateConfig::new(KeyMaterial::ed25519(key.public_x.clone()), "app1", "/api/**");
/// ```
pub fn test_ed25519_key(seed: u8) -> Result<TestEd25519Key, FixtureError> {
    // Create deterministic 32-byte seed from input
    let mut seed_bytes = [0u8; 32];
    seed_bytes[0] = seed;
    // Fill rest with deterministic pattern
    for (i, byte) in seed_bytes.iter_mut().enumerate().skip(1) {
        *byte = seed.wrapping_mul(i as u8).wrapping_add(i as u8);
    }

    let key_pair = Ed25519KeyPair::from_seed_unchecked(&seed_bytes)
        .map_err(|e| FixtureError::Crypto(format!("Failed to generate test keypair: {:?}", e)))?;

    let public_key_bytes = key_pair.public_key().as_ref().to_vec();

    Ok(TestEd25519Key {
        public_x: URL_SAFE_NO_PAD.encode(&public_key_bytes),
        public_key_bytes,
        private_key_pkcs8: build_pkcs8_from_seed(&seed_bytes),
    })
}

/// Sign `claims` with EdDSA using a test key.
pub fn sign_eddsa(claims: &Value, key: &TestEd25519Key) -> String {
    encode(
        &Header::new(Algorithm::EdDSA),
        claims,
        &EncodingKey::from_ed_der(&key.private_key_pkcs8),
    )
    .expect("Failed to sign test token")
}

/// Build PKCS#8 v1 document from Ed25519 seed
///
/// This is a test-only utility. Production keys come from a real key store.
fn build_pkcs8_from_seed(seed: &[u8; 32]) -> Vec<u8> {
    // SEQUENCE { INTEGER 0, SEQUENCE { OID 1.3.101.112 }, OCTET STRING { OCTET STRING seed } }
    let mut pkcs8 = Vec::with_capacity(48);
    pkcs8.extend_from_slice(&[0x30, 0x2e]);
    pkcs8.extend_from_slice(&[0x02, 0x01, 0x00]);
    pkcs8.extend_from_slice(&[0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x70]);
    pkcs8.extend_from_slice(&[0x04, 0x22, 0x04, 0x20]);
    pkcs8.extend_from_slice(seed);
    pkcs8
}
