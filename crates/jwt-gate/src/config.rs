//! Gate configuration.
//!
//! Holds the trust material (signing secret or public key), the expected
//! audience, and the protected route pattern. Configuration can be built in
//! code or loaded from environment variables; either way it is validated
//! before a verifier or provider is constructed from it. Secrets are
//! redacted in Debug output.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use jsonwebtoken::{Algorithm, DecodingKey};
use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Default clock skew tolerance applied to `exp` and `nbf` (5 minutes).
pub const DEFAULT_CLOCK_SKEW: Duration = Duration::from_secs(300);

/// Maximum allowed clock skew tolerance (10 minutes).
///
/// Prevents misconfiguration that would accept long-expired tokens.
pub const MAX_CLOCK_SKEW: Duration = Duration::from_secs(600);

/// Length of a raw Ed25519 public key.
const ED25519_PUBLIC_KEY_LEN: usize = 32;

/// base64url that tolerates both padded and unpadded input.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Client secret is not set")]
    MissingClientSecret,

    #[error("Client id is not set")]
    MissingClientId,

    #[error("Secured route pattern is not set; it decides which requests must authenticate")]
    MissingSecuredRoute,

    #[error("Invalid key material: {0}")]
    InvalidKey(String),

    #[error("Invalid JWT algorithm configuration: {0}")]
    InvalidAlgorithm(String),

    #[error("Invalid JWT clock skew configuration: {0}")]
    InvalidJwtClockSkew(String),

    #[error("Invalid boolean for {name}: '{value}'")]
    InvalidBool { name: String, value: String },
}

/// Trust material used to check token signatures.
#[derive(Clone, Debug)]
pub enum KeyMaterial {
    /// Shared HMAC secret. When `base64_encoded` is set the secret string is
    /// base64url and its decoded bytes are the key.
    Hmac {
        secret: SecretString,
        base64_encoded: bool,
    },

    /// Ed25519 public key as the base64url `x` value of an OKP JWK.
    Ed25519 { x: String },
}

impl KeyMaterial {
    /// Plain-text HMAC secret.
    pub fn hmac(secret: impl Into<String>) -> Self {
        KeyMaterial::Hmac {
            secret: SecretString::from(secret.into()),
            base64_encoded: false,
        }
    }

    /// base64url-encoded HMAC secret.
    pub fn hmac_base64(secret: impl Into<String>) -> Self {
        KeyMaterial::Hmac {
            secret: SecretString::from(secret.into()),
            base64_encoded: true,
        }
    }

    /// Ed25519 public key from a JWK `x` value.
    pub fn ed25519(x: impl Into<String>) -> Self {
        KeyMaterial::Ed25519 { x: x.into() }
    }

    /// Algorithm used when none is configured explicitly.
    #[must_use]
    pub fn default_algorithm(&self) -> Algorithm {
        match self {
            KeyMaterial::Hmac { .. } => Algorithm::HS256,
            KeyMaterial::Ed25519 { .. } => Algorithm::EdDSA,
        }
    }

    /// Whether `algorithm` belongs to this key's family.
    #[must_use]
    pub fn accepts(&self, algorithm: Algorithm) -> bool {
        match self {
            KeyMaterial::Hmac { .. } => matches!(
                algorithm,
                Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
            ),
            KeyMaterial::Ed25519 { .. } => algorithm == Algorithm::EdDSA,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            KeyMaterial::Hmac { .. } => "hmac",
            KeyMaterial::Ed25519 { .. } => "ed25519",
        }
    }

    /// Decoded key bytes, rejecting empty or malformed material.
    fn key_bytes(&self) -> Result<Vec<u8>, ConfigError> {
        match self {
            KeyMaterial::Hmac {
                secret,
                base64_encoded,
            } => {
                let raw = secret.expose_secret();
                if raw.trim().is_empty() {
                    return Err(ConfigError::MissingClientSecret);
                }
                if !base64_encoded {
                    return Ok(raw.as_bytes().to_vec());
                }
                let bytes = URL_SAFE_LENIENT.decode(raw.trim()).map_err(|e| {
                    ConfigError::InvalidKey(format!("client secret is not valid base64url: {e}"))
                })?;
                if bytes.is_empty() {
                    return Err(ConfigError::MissingClientSecret);
                }
                Ok(bytes)
            }
            KeyMaterial::Ed25519 { x } => {
                if x.trim().is_empty() {
                    return Err(ConfigError::MissingClientSecret);
                }
                let bytes = URL_SAFE_LENIENT.decode(x.trim()).map_err(|e| {
                    ConfigError::InvalidKey(format!("Ed25519 public key is not valid base64url: {e}"))
                })?;
                if bytes.len() != ED25519_PUBLIC_KEY_LEN {
                    return Err(ConfigError::InvalidKey(format!(
                        "Ed25519 public key must be {ED25519_PUBLIC_KEY_LEN} bytes, got {}",
                        bytes.len()
                    )));
                }
                Ok(bytes)
            }
        }
    }

    /// Build the `jsonwebtoken` decoding key for this material.
    pub(crate) fn decoding_key(&self) -> Result<DecodingKey, ConfigError> {
        let bytes = self.key_bytes()?;
        Ok(match self {
            KeyMaterial::Hmac { .. } => DecodingKey::from_secret(&bytes),
            KeyMaterial::Ed25519 { .. } => DecodingKey::from_ed_der(&bytes),
        })
    }
}

/// Gate configuration.
///
/// Built in code with [`GateConfig::new`] or loaded with
/// [`GateConfig::from_env`]. Must pass [`GateConfig::validate`] before use.
#[derive(Clone)]
pub struct GateConfig {
    /// Signing secret or public key.
    pub key: KeyMaterial,

    /// Expected audience; the token's `aud` claim must contain it.
    pub client_id: String,

    /// Route pattern that requires authentication. Consumed by the routing
    /// layer, not by verification.
    pub secured_route: String,

    /// The only header algorithm accepted.
    pub algorithm: Algorithm,

    /// Expected `iss` claim, if any.
    pub issuer: Option<String>,

    /// Tolerance applied to `exp` and `nbf`.
    pub clock_skew: Duration,
}

/// Custom Debug implementation that redacts key material.
impl fmt::Debug for GateConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GateConfig")
            .field("key", &self.key.kind())
            .field("client_id", &self.client_id)
            .field("secured_route", &self.secured_route)
            .field("algorithm", &self.algorithm)
            .field("issuer", &self.issuer)
            .field("clock_skew", &self.clock_skew)
            .finish()
    }
}

impl GateConfig {
    /// Create a configuration with the key's default algorithm, no issuer
    /// check and the default clock skew.
    pub fn new(
        key: KeyMaterial,
        client_id: impl Into<String>,
        secured_route: impl Into<String>,
    ) -> Self {
        let algorithm = key.default_algorithm();
        Self {
            key,
            client_id: client_id.into(),
            secured_route: secured_route.into(),
            algorithm,
            issuer: None,
            clock_skew: DEFAULT_CLOCK_SKEW,
        }
    }

    #[must_use]
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    #[must_use]
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    #[must_use]
    pub fn with_clock_skew(mut self, clock_skew: Duration) -> Self {
        self.clock_skew = clock_skew;
        self
    }

    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or a value
    /// cannot be parsed. The result still has to be validated.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a `HashMap` (for testing).
    ///
    /// # Errors
    ///
    /// Same as [`GateConfig::from_env`].
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let client_id = vars
            .get("GATE_CLIENT_ID")
            .ok_or_else(|| ConfigError::MissingEnvVar("GATE_CLIENT_ID".to_string()))?
            .clone();

        let secured_route = vars
            .get("GATE_SECURED_ROUTE")
            .ok_or_else(|| ConfigError::MissingEnvVar("GATE_SECURED_ROUTE".to_string()))?
            .clone();

        // An Ed25519 public key selects asymmetric trust; otherwise an HMAC
        // secret is required.
        let key = if let Some(x) = vars.get("GATE_ED25519_PUBLIC_KEY") {
            KeyMaterial::ed25519(x.clone())
        } else {
            let secret = vars
                .get("GATE_CLIENT_SECRET")
                .ok_or_else(|| ConfigError::MissingEnvVar("GATE_CLIENT_SECRET".to_string()))?
                .clone();
            let base64_encoded = parse_bool(vars, "GATE_SECRET_BASE64")?.unwrap_or(false);
            KeyMaterial::Hmac {
                secret: SecretString::from(secret),
                base64_encoded,
            }
        };

        let algorithm = if let Some(value_str) = vars.get("GATE_JWT_ALGORITHM") {
            Algorithm::from_str(value_str).map_err(|e| {
                ConfigError::InvalidAlgorithm(format!(
                    "GATE_JWT_ALGORITHM must name a JWS algorithm, got '{value_str}': {e}"
                ))
            })?
        } else {
            key.default_algorithm()
        };

        let issuer = vars.get("GATE_ISSUER").filter(|s| !s.is_empty()).cloned();

        // Parse JWT clock skew tolerance with validation
        let clock_skew = if let Some(value_str) = vars.get("GATE_JWT_CLOCK_SKEW_SECONDS") {
            let value: u64 = value_str.parse().map_err(|e| {
                ConfigError::InvalidJwtClockSkew(format!(
                    "GATE_JWT_CLOCK_SKEW_SECONDS must be a non-negative integer, got '{value_str}': {e}"
                ))
            })?;
            Duration::from_secs(value)
        } else {
            DEFAULT_CLOCK_SKEW
        };

        Ok(Self {
            key,
            client_id,
            secured_route,
            algorithm,
            issuer,
            clock_skew,
        })
    }

    /// Check the configuration is complete and consistent.
    ///
    /// # Errors
    ///
    /// - `MissingClientSecret` if the secret (or public key) is empty
    /// - `MissingClientId` if the client id is empty
    /// - `MissingSecuredRoute` if the route pattern is empty
    /// - `InvalidAlgorithm` if the algorithm is outside the key's family
    /// - `InvalidKey` if the key material cannot be decoded
    /// - `InvalidJwtClockSkew` if the skew exceeds [`MAX_CLOCK_SKEW`]
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.key.key_bytes()?;

        if self.client_id.trim().is_empty() {
            return Err(ConfigError::MissingClientId);
        }

        if self.secured_route.trim().is_empty() {
            return Err(ConfigError::MissingSecuredRoute);
        }

        if !self.key.accepts(self.algorithm) {
            return Err(ConfigError::InvalidAlgorithm(format!(
                "{:?} cannot be verified with {} key material",
                self.algorithm,
                self.key.kind()
            )));
        }

        if self.clock_skew > MAX_CLOCK_SKEW {
            return Err(ConfigError::InvalidJwtClockSkew(format!(
                "clock skew must not exceed {} seconds, got {}",
                MAX_CLOCK_SKEW.as_secs(),
                self.clock_skew.as_secs()
            )));
        }

        Ok(())
    }
}

fn parse_bool(vars: &HashMap<String, String>, name: &str) -> Result<Option<bool>, ConfigError> {
    let Some(value) = vars.get(name) else {
        return Ok(None);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(Some(true)),
        "false" | "0" | "no" => Ok(Some(false)),
        _ => Err(ConfigError::InvalidBool {
            name: name.to_string(),
            value: value.clone(),
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn base_vars() -> HashMap<String, String> {
        HashMap::from([
            ("GATE_CLIENT_ID".to_string(), "app1".to_string()),
            ("GATE_CLIENT_SECRET".to_string(), "s3cr3t".to_string()),
            ("GATE_SECURED_ROUTE".to_string(), "/api/**".to_string()),
        ])
    }

    #[test]
    fn test_from_vars_with_defaults() {
        let config = GateConfig::from_vars(&base_vars()).unwrap();

        assert_eq!(config.client_id, "app1");
        assert_eq!(config.secured_route, "/api/**");
        assert_eq!(config.algorithm, Algorithm::HS256);
        assert_eq!(config.issuer, None);
        assert_eq!(config.clock_skew, DEFAULT_CLOCK_SKEW);
        assert!(matches!(
            config.key,
            KeyMaterial::Hmac {
                base64_encoded: false,
                ..
            }
        ));
        config.validate().unwrap();
    }

    #[test]
    fn test_from_vars_missing_client_id() {
        let mut vars = base_vars();
        vars.remove("GATE_CLIENT_ID");

        let result = GateConfig::from_vars(&vars);
        assert!(matches!(result, Err(ConfigError::MissingEnvVar(name)) if name == "GATE_CLIENT_ID"));
    }

    #[test]
    fn test_from_vars_missing_secret() {
        let mut vars = base_vars();
        vars.remove("GATE_CLIENT_SECRET");

        let result = GateConfig::from_vars(&vars);
        assert!(
            matches!(result, Err(ConfigError::MissingEnvVar(name)) if name == "GATE_CLIENT_SECRET")
        );
    }

    #[test]
    fn test_from_vars_missing_secured_route() {
        let mut vars = base_vars();
        vars.remove("GATE_SECURED_ROUTE");

        let result = GateConfig::from_vars(&vars);
        assert!(
            matches!(result, Err(ConfigError::MissingEnvVar(name)) if name == "GATE_SECURED_ROUTE")
        );
    }

    #[test]
    fn test_from_vars_overrides() {
        let mut vars = base_vars();
        vars.insert("GATE_JWT_ALGORITHM".to_string(), "HS512".to_string());
        vars.insert("GATE_ISSUER".to_string(), "https://issuer.example/".to_string());
        vars.insert("GATE_JWT_CLOCK_SKEW_SECONDS".to_string(), "30".to_string());
        vars.insert("GATE_SECRET_BASE64".to_string(), "true".to_string());

        let config = GateConfig::from_vars(&vars).unwrap();

        assert_eq!(config.algorithm, Algorithm::HS512);
        assert_eq!(config.issuer.as_deref(), Some("https://issuer.example/"));
        assert_eq!(config.clock_skew, Duration::from_secs(30));
        assert!(matches!(
            config.key,
            KeyMaterial::Hmac {
                base64_encoded: true,
                ..
            }
        ));
    }

    #[test]
    fn test_from_vars_ed25519_defaults_to_eddsa() {
        let mut vars = base_vars();
        vars.remove("GATE_CLIENT_SECRET");
        vars.insert(
            "GATE_ED25519_PUBLIC_KEY".to_string(),
            "11qYAYKxCrfVS_7TyWQHOg7hcvPapiMlrwIaaPcHURo".to_string(),
        );

        let config = GateConfig::from_vars(&vars).unwrap();
        assert_eq!(config.algorithm, Algorithm::EdDSA);
        config.validate().unwrap();
    }

    #[test]
    fn test_from_vars_rejects_unknown_algorithm() {
        let mut vars = base_vars();
        vars.insert("GATE_JWT_ALGORITHM".to_string(), "none".to_string());

        let result = GateConfig::from_vars(&vars);
        assert!(matches!(result, Err(ConfigError::InvalidAlgorithm(_))));
    }

    #[test]
    fn test_from_vars_rejects_bad_clock_skew() {
        let mut vars = base_vars();
        vars.insert("GATE_JWT_CLOCK_SKEW_SECONDS".to_string(), "soon".to_string());

        let result = GateConfig::from_vars(&vars);
        assert!(matches!(result, Err(ConfigError::InvalidJwtClockSkew(_))));
    }

    #[test]
    fn test_from_vars_rejects_bad_bool() {
        let mut vars = base_vars();
        vars.insert("GATE_SECRET_BASE64".to_string(), "maybe".to_string());

        let result = GateConfig::from_vars(&vars);
        assert!(matches!(result, Err(ConfigError::InvalidBool { .. })));
    }

    #[test]
    fn test_validate_rejects_empty_values() {
        let empty_secret = GateConfig::new(KeyMaterial::hmac(""), "app1", "/api/**");
        assert!(matches!(
            empty_secret.validate(),
            Err(ConfigError::MissingClientSecret)
        ));

        let empty_client = GateConfig::new(KeyMaterial::hmac("s3cr3t"), "", "/api/**");
        assert!(matches!(
            empty_client.validate(),
            Err(ConfigError::MissingClientId)
        ));

        let empty_route = GateConfig::new(KeyMaterial::hmac("s3cr3t"), "app1", "  ");
        assert!(matches!(
            empty_route.validate(),
            Err(ConfigError::MissingSecuredRoute)
        ));
    }

    #[test]
    fn test_validate_rejects_algorithm_outside_key_family() {
        let config = GateConfig::new(KeyMaterial::hmac("s3cr3t"), "app1", "/api/**")
            .with_algorithm(Algorithm::RS256);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidAlgorithm(_))
        ));

        let config = GateConfig::new(
            KeyMaterial::ed25519("11qYAYKxCrfVS_7TyWQHOg7hcvPapiMlrwIaaPcHURo"),
            "app1",
            "/api/**",
        )
        .with_algorithm(Algorithm::HS256);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidAlgorithm(_))
        ));
    }

    #[test]
    fn test_validate_rejects_malformed_keys() {
        let bad_base64 = GateConfig::new(KeyMaterial::hmac_base64("!!!"), "app1", "/api/**");
        assert!(matches!(
            bad_base64.validate(),
            Err(ConfigError::InvalidKey(_))
        ));

        let short_ed = GateConfig::new(KeyMaterial::ed25519("dGVzdA"), "app1", "/api/**");
        assert!(matches!(short_ed.validate(), Err(ConfigError::InvalidKey(_))));
    }

    #[test]
    fn test_validate_rejects_excessive_clock_skew() {
        let config = GateConfig::new(KeyMaterial::hmac("s3cr3t"), "app1", "/api/**")
            .with_clock_skew(MAX_CLOCK_SKEW + Duration::from_secs(1));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidJwtClockSkew(_))
        ));

        let at_max = GateConfig::new(KeyMaterial::hmac("s3cr3t"), "app1", "/api/**")
            .with_clock_skew(MAX_CLOCK_SKEW);
        assert!(at_max.validate().is_ok());
    }

    #[test]
    fn test_base64_secret_accepts_padded_and_unpadded() {
        // "s3cr3t!" encodes to "czNjcjN0IQ==" with padding
        let padded = KeyMaterial::hmac_base64("czNjcjN0IQ==");
        let unpadded = KeyMaterial::hmac_base64("czNjcjN0IQ");

        assert_eq!(padded.key_bytes().unwrap(), b"s3cr3t!");
        assert_eq!(unpadded.key_bytes().unwrap(), b"s3cr3t!");
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = GateConfig::new(KeyMaterial::hmac("super-secret-value"), "app1", "/api/**");
        let debug_str = format!("{config:?}");

        assert!(!debug_str.contains("super-secret-value"));
        assert!(debug_str.contains("app1"));

        let key_debug = format!("{:?}", config.key);
        assert!(!key_debug.contains("super-secret-value"));
        assert!(key_debug.contains("REDACTED"));
    }
}
