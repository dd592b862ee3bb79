//! Credential shapes accepted by the provider and the result of a
//! successful authentication.

use crate::claims::{ClaimSet, Identity};
use secrecy::{ExposeSecret, SecretString};
use std::fmt;

/// Something presented by a caller to prove who they are.
///
/// The provider dispatches on capability: a credential is handled iff it
/// exposes a bearer token.
pub trait Credential: Send + Sync {
    /// Short scheme name for diagnostics (e.g. "bearer").
    fn scheme(&self) -> &'static str;

    /// The raw bearer token, if this credential carries one.
    fn bearer_token(&self) -> Option<&str> {
        None
    }
}

/// Unauthenticated credential carrying a raw bearer token.
///
/// The token is held as a secret so it never shows up in Debug output.
#[derive(Clone)]
pub struct BearerCredential {
    token: SecretString,
}

impl fmt::Debug for BearerCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerCredential")
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl BearerCredential {
    /// Wrap a raw token as presented by the caller.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: SecretString::from(token.into()),
        }
    }

    /// Parse an `Authorization` header value of the form `Bearer <token>`.
    ///
    /// The scheme is matched case-insensitively. Returns `None` for other
    /// schemes or an empty token.
    #[must_use]
    pub fn from_authorization_header(value: &str) -> Option<Self> {
        let (scheme, token) = value.trim().split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("bearer") {
            return None;
        }
        let token = token.trim();
        if token.is_empty() {
            return None;
        }
        Some(Self::new(token))
    }

    /// The raw token.
    #[must_use]
    pub fn token(&self) -> &str {
        self.token.expose_secret()
    }
}

impl Credential for BearerCredential {
    fn scheme(&self) -> &'static str {
        "bearer"
    }

    fn bearer_token(&self) -> Option<&str> {
        Some(self.token())
    }
}

/// Outcome of a successful authentication.
#[derive(Debug, Clone, PartialEq)]
pub struct Authenticated {
    principal: Identity,
    details: ClaimSet,
}

impl Authenticated {
    pub(crate) fn new(principal: Identity, details: ClaimSet) -> Self {
        Self { principal, details }
    }

    /// Always true; an `Authenticated` value only exists after verification.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        true
    }

    #[must_use]
    pub fn principal(&self) -> &Identity {
        &self.principal
    }

    /// The full verified claim set.
    #[must_use]
    pub fn details(&self) -> &ClaimSet {
        &self.details
    }

    #[must_use]
    pub fn into_parts(self) -> (Identity, ClaimSet) {
        (self.principal, self.details)
    }
}
