//! Token verification.
//!
//! Checks a compact JWS against the configured trust material and returns
//! its claims.
//!
//! # Security
//!
//! - Header algorithm must equal the configured algorithm; this is checked
//!   before any signature math (algorithm confusion)
//! - Signatures are compared by `jsonwebtoken` in constant time
//! - `aud` must contain the client id even when the signature is valid
//! - `exp`/`nbf` are enforced when present, with clock skew tolerance
//! - The verifier is immutable and safe to share across threads

use crate::claims::ClaimSet;
use crate::config::{ConfigError, GateConfig};
use crate::errors::VerifyError;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jsonwebtoken::{decode, get_current_timestamp, Algorithm, DecodingKey, Validation};
use std::fmt;
use std::str::FromStr;
use tracing::instrument;

/// Stateless JWT verifier bound to one key, algorithm and audience.
#[derive(Clone)]
pub struct Verifier {
    algorithm: Algorithm,
    client_id: String,
    issuer: Option<String>,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl fmt::Debug for Verifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Verifier")
            .field("algorithm", &self.algorithm)
            .field("client_id", &self.client_id)
            .field("issuer", &self.issuer)
            .field("leeway", &self.validation.leeway)
            .finish_non_exhaustive()
    }
}

impl Verifier {
    /// Create a verifier from a configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the configuration fails validation or the key
    /// material cannot be turned into a decoding key.
    pub fn new(config: &GateConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let decoding_key = config.key.decoding_key()?;

        let mut validation = Validation::new(config.algorithm);
        // exp/nbf are checked when present but no claim is mandatory
        validation.required_spec_claims.clear();
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.leeway = config.clock_skew.as_secs();
        validation.set_audience(&[config.client_id.as_str()]);
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer.as_str()]);
        }

        Ok(Self {
            algorithm: config.algorithm,
            client_id: config.client_id.clone(),
            issuer: config.issuer.clone(),
            decoding_key,
            validation,
        })
    }

    /// The only header algorithm this verifier accepts.
    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Verify a token and return its claims.
    ///
    /// # Security Checks
    ///
    /// 1. Structure - exactly three dot-separated segments, readable header
    /// 2. Algorithm - header `alg` equals the configured algorithm
    /// 3. Signature - recomputed over header and payload with the key
    /// 4. Claims - payload is a JSON object; `aud`, `iss`, `exp`, `nbf`
    ///
    /// # Errors
    ///
    /// Returns the `VerifyError` of the first failed check. The error is for
    /// diagnostics only.
    #[instrument(skip_all)]
    pub fn verify(&self, token: &str) -> Result<ClaimSet, VerifyError> {
        let alg = header_algorithm(token)?;
        if alg != self.algorithm {
            return Err(VerifyError::UnsupportedAlgorithm(format!(
                "header declares {alg:?}, expected {:?}",
                self.algorithm
            )));
        }

        let claims = decode::<ClaimSet>(token, &self.decoding_key, &self.validation)?.claims;

        // Re-check the relying-party claims on the decoded set itself
        if !claims.contains_audience(&self.client_id) {
            return Err(VerifyError::AudienceMismatch(format!(
                "aud does not contain {}",
                self.client_id
            )));
        }
        if let Some(issuer) = &self.issuer {
            if claims.get_str("iss") != Some(issuer.as_str()) {
                return Err(VerifyError::IssuerMismatch(format!("iss is not {issuer}")));
            }
        }

        // jsonwebtoken skips exp/nbf values it cannot read as u64
        check_time_claims(&claims, self.validation.leeway, get_current_timestamp())?;

        Ok(claims)
    }
}

/// Enforce `exp` and `nbf` against an explicit `now` (Unix epoch seconds).
///
/// Absent claims pass. A present claim that is not a JSON number is
/// rejected, as is any value outside `now` +/- `leeway`.
#[allow(clippy::cast_precision_loss)]
fn check_time_claims(claims: &ClaimSet, leeway: u64, now: u64) -> Result<(), VerifyError> {
    let now = now as f64;
    let leeway = leeway as f64;

    if let Some(exp) = numeric_date(claims, "exp")? {
        if exp < now - leeway {
            return Err(VerifyError::Expired(format!("exp {exp} is in the past")));
        }
    }

    if let Some(nbf) = numeric_date(claims, "nbf")? {
        if nbf > now + leeway {
            return Err(VerifyError::Expired(format!("nbf {nbf} is in the future")));
        }
    }

    Ok(())
}

fn numeric_date(claims: &ClaimSet, name: &str) -> Result<Option<f64>, VerifyError> {
    match claims.get(name) {
        None => Ok(None),
        Some(value) => value
            .as_f64()
            .map(Some)
            .ok_or_else(|| VerifyError::Decoding(format!("{name} is not a NumericDate"))),
    }
}

/// Read the `alg` header of a compact JWS without verifying anything.
fn header_algorithm(token: &str) -> Result<Algorithm, VerifyError> {
    // JWT format: header.payload.signature
    let mut segments = token.split('.');
    let (Some(header_part), Some(_), Some(_), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(VerifyError::MalformedToken(format!(
            "expected 3 segments, got {}",
            token.split('.').count()
        )));
    };

    let header_bytes = URL_SAFE_NO_PAD
        .decode(header_part)
        .map_err(|e| VerifyError::MalformedToken(format!("header is not base64url: {e}")))?;

    let header: serde_json::Value = serde_json::from_slice(&header_bytes)
        .map_err(|e| VerifyError::MalformedToken(format!("header is not JSON: {e}")))?;

    let alg = header
        .get("alg")
        .and_then(|v| v.as_str())
        .ok_or_else(|| VerifyError::UnsupportedAlgorithm("header has no alg".to_string()))?;

    Algorithm::from_str(alg)
        .map_err(|_| VerifyError::UnsupportedAlgorithm(format!("unknown algorithm '{alg}'")))
}
