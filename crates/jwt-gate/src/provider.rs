//! Authentication provider.
//!
//! Bridges the authentication contract of the surrounding framework and the
//! [`Verifier`]. One call to [`AuthenticationProvider::authenticate`] is one
//! attempt: `Received -> Verifying -> {Authenticated | Rejected}`. There are
//! no retries here.
//!
//! A provider only exists once its configuration has been validated, so
//! every reachable `authenticate` call runs against complete, immutable
//! configuration and needs no locking.

use crate::claims::Identity;
use crate::config::{ConfigError, GateConfig};
use crate::credential::{Authenticated, Credential};
use crate::errors::{AuthenticationError, VerifyError, AUTH_ERROR};
use crate::verifier::Verifier;
use tracing::instrument;

/// Verifies bearer credentials and binds their claims to an identity.
#[derive(Debug, Clone)]
pub struct AuthenticationProvider {
    verifier: Verifier,
    client_id: String,
    secured_route: String,
}

impl AuthenticationProvider {
    /// Validate `config` and build a provider from it.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the secret, client id or secured route is
    /// missing, or the key material is unusable. No provider is created in
    /// that case.
    pub fn new(config: GateConfig) -> Result<Self, ConfigError> {
        let verifier = Verifier::new(&config).map_err(|e| {
            tracing::error!(
                target: "jwt_gate.provider",
                error = %e,
                "Refusing to initialize authentication provider"
            );
            e
        })?;

        tracing::info!(
            target: "jwt_gate.provider",
            client_id = %config.client_id,
            secured_route = %config.secured_route,
            algorithm = ?config.algorithm,
            "Authentication provider initialized"
        );

        Ok(Self {
            verifier,
            client_id: config.client_id,
            secured_route: config.secured_route,
        })
    }

    /// Build a provider from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if loading or validating the configuration fails.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::new(GateConfig::from_env()?)
    }

    /// Route pattern that must be authenticated by this provider.
    #[must_use]
    pub fn secured_route(&self) -> &str {
        &self.secured_route
    }

    /// Expected audience of accepted tokens.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Verifier built from this provider's configuration.
    #[must_use]
    pub fn verifier(&self) -> &Verifier {
        &self.verifier
    }

    /// Whether this provider can handle `credential`.
    ///
    /// True iff a credential is present and carries a bearer token.
    #[must_use]
    pub fn supports(&self, credential: Option<&dyn Credential>) -> bool {
        let supported = credential.is_some_and(|c| c.bearer_token().is_some());
        tracing::debug!(
            target: "jwt_gate.provider",
            scheme = credential.map_or("none", |c| c.scheme()),
            supported,
            "Credential support queried"
        );
        supported
    }

    /// Authenticate a credential.
    ///
    /// The credential is not modified. On success the verified identity and
    /// claims are returned as a new [`Authenticated`] value.
    ///
    /// # Errors
    ///
    /// Returns [`AUTH_ERROR`] for every failure: unsupported credential,
    /// any verification failure, or a claim set without a subject. The
    /// specific cause is logged at debug level only.
    #[instrument(skip_all, name = "jwt_gate.provider.authenticate")]
    pub fn authenticate(
        &self,
        credential: &dyn Credential,
    ) -> Result<Authenticated, AuthenticationError> {
        let Some(token) = credential.bearer_token() else {
            tracing::debug!(
                target: "jwt_gate.provider",
                scheme = credential.scheme(),
                "Credential does not carry a bearer token"
            );
            return Err(AUTH_ERROR);
        };

        let outcome = self.verifier.verify(token).and_then(|claims| {
            let principal = Identity::from_claims(&claims)?;
            Ok(Authenticated::new(principal, claims))
        });

        outcome.map_err(|e: VerifyError| {
            tracing::debug!(
                target: "jwt_gate.provider",
                category = e.category().as_str(),
                error = %e,
                "Token rejected"
            );
            AuthenticationError::from(e)
        })
        .inspect(|authenticated| {
            tracing::debug!(
                target: "jwt_gate.provider",
                claims = authenticated.details().len(),
                "Token authenticated"
            );
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::KeyMaterial;
    use crate::credential::BearerCredential;
    use jwt_gate_test_utils::*;
    use tracing_test::traced_test;

    fn provider() -> AuthenticationProvider {
        AuthenticationProvider::new(GateConfig::new(
            KeyMaterial::hmac(TEST_SECRET),
            TEST_CLIENT_ID,
            TEST_SECURED_ROUTE,
        ))
        .unwrap()
    }

    #[test]
    fn test_provider_is_send_sync_clone() {
        fn assert_traits<T: Send + Sync + Clone>() {}
        assert_traits::<AuthenticationProvider>();
    }

    #[test]
    fn test_accessors() {
        let provider = provider();
        assert_eq!(provider.client_id(), TEST_CLIENT_ID);
        assert_eq!(provider.secured_route(), TEST_SECURED_ROUTE);
        assert_eq!(provider.verifier().algorithm(), jsonwebtoken::Algorithm::HS256);
    }

    #[test]
    fn test_authenticate_does_not_modify_credential() {
        let token = sign_hs256(&TestClaimsBuilder::new().build(), TEST_SECRET);
        let credential = BearerCredential::new(token.clone());

        let authenticated = provider().authenticate(&credential).unwrap();
        assert!(authenticated.is_authenticated());
        assert_eq!(credential.token(), token);
    }

    #[test]
    fn test_authenticate_missing_subject_is_rejected() {
        let token = sign_hs256(&TestClaimsBuilder::new().without_subject().build(), TEST_SECRET);
        let result = provider().authenticate(&BearerCredential::new(token));
        assert_eq!(result, Err(AUTH_ERROR));
    }

    #[test]
    fn test_new_rejects_missing_secured_route() {
        let result = AuthenticationProvider::new(GateConfig::new(
            KeyMaterial::hmac(TEST_SECRET),
            TEST_CLIENT_ID,
            "",
        ));
        assert!(matches!(result, Err(ConfigError::MissingSecuredRoute)));
    }

    #[test]
    #[traced_test]
    fn test_rejection_logs_algorithm_category() {
        let token = sign_with(
            jsonwebtoken::Algorithm::HS512,
            &TestClaimsBuilder::new().build(),
            TEST_SECRET,
        );
        assert_eq!(provider().authenticate(&BearerCredential::new(token)), Err(AUTH_ERROR));

        assert!(logs_contain("Token rejected"));
        assert!(logs_contain("unsupported_algorithm"));
        assert!(!logs_contain("signature_mismatch"));
    }

    #[test]
    #[traced_test]
    fn test_rejection_logs_signature_category() {
        let token = sign_hs256(&TestClaimsBuilder::new().build(), WRONG_SECRET);
        assert_eq!(provider().authenticate(&BearerCredential::new(token)), Err(AUTH_ERROR));

        assert!(logs_contain("Token rejected"));
        assert!(logs_contain("signature_mismatch"));
        assert!(!logs_contain("unsupported_algorithm"));
    }

    #[test]
    #[traced_test]
    fn test_rejection_logs_audience_category() {
        let token = sign_hs256(
            &TestClaimsBuilder::new().with_audience(OTHER_CLIENT_ID).build(),
            TEST_SECRET,
        );
        assert_eq!(provider().authenticate(&BearerCredential::new(token)), Err(AUTH_ERROR));

        assert!(logs_contain("Token rejected"));
        assert!(logs_contain("audience_mismatch"));
        assert!(!logs_contain("signature_mismatch"));
    }

    #[test]
    #[traced_test]
    fn test_rejection_log_omits_token() {
        let token = sign_hs256(&TestClaimsBuilder::new().build(), WRONG_SECRET);
        let _ = provider().authenticate(&BearerCredential::new(token.clone()));

        assert!(logs_contain("Token rejected"));
        assert!(!logs_contain(&token));
    }
}
