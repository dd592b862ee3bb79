//! JWT claim set and the identity derived from it.
//!
//! A [`ClaimSet`] is the full decoded payload of a verified token. An
//! [`Identity`] is the principal view over it. Subject and email are
//! redacted in Debug output to keep them out of logs.

use crate::errors::VerifyError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Decoded claims of a verified token, keyed by claim name.
///
/// Immutable once produced by the verifier.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimSet(Map<String, Value>);

/// Debug lists claim names only; values may identify the user.
impl fmt::Debug for ClaimSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClaimSet")
            .field("claims", &self.0.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl From<Map<String, Value>> for ClaimSet {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl ClaimSet {
    /// Raw value of a claim.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Claim value if it is a string.
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    /// Claim value if it is a boolean.
    #[must_use]
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.0.get(name).and_then(Value::as_bool)
    }

    /// Audiences from the `aud` claim, in either its string or array form.
    ///
    /// Non-string array entries are skipped.
    #[must_use]
    pub fn audiences(&self) -> Vec<&str> {
        match self.0.get("aud") {
            Some(Value::String(aud)) => vec![aud.as_str()],
            Some(Value::Array(auds)) => auds.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    /// Check if `aud` names the given client.
    #[must_use]
    pub fn contains_audience(&self, client_id: &str) -> bool {
        self.audiences().contains(&client_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    #[must_use]
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

/// Authenticated principal derived from a claim set.
#[derive(Clone, PartialEq, Eq)]
pub struct Identity {
    subject: String,
    username: String,
    email: Option<String>,
    email_verified: Option<bool>,
    name: Option<String>,
    nickname: Option<String>,
    picture: Option<String>,
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("subject", &"[REDACTED]")
            .field("email", &self.email.as_ref().map(|_| "[REDACTED]"))
            .field("email_verified", &self.email_verified)
            .field("name", &self.name)
            .field("nickname", &self.nickname)
            .field("picture", &self.picture)
            .finish_non_exhaustive()
    }
}

impl Identity {
    /// Build an identity from verified claims.
    ///
    /// The username is the first present of `email`, `nickname` and `name`,
    /// falling back to the subject.
    ///
    /// # Errors
    ///
    /// Returns `VerifyError::MissingSubject` if `sub` is absent, empty or not
    /// a string.
    pub fn from_claims(claims: &ClaimSet) -> Result<Self, VerifyError> {
        let subject = claims
            .get_str("sub")
            .filter(|s| !s.is_empty())
            .ok_or(VerifyError::MissingSubject)?
            .to_string();

        let owned = |name: &str| claims.get_str(name).map(ToString::to_string);
        let email = owned("email");
        let name = owned("name");
        let nickname = owned("nickname");

        let username = email
            .as_ref()
            .or(nickname.as_ref())
            .or(name.as_ref())
            .unwrap_or(&subject)
            .clone();

        Ok(Self {
            subject,
            username,
            email,
            email_verified: claims.get_bool("email_verified"),
            name,
            nickname,
            picture: owned("picture"),
        })
    }

    /// Stable subject identifier (`sub`).
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Display name used by frameworks that expect a username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    #[must_use]
    pub fn email_verified(&self) -> Option<bool> {
        self.email_verified
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn nickname(&self) -> Option<&str> {
        self.nickname.as_deref()
    }

    #[must_use]
    pub fn picture(&self) -> Option<&str> {
        self.picture.as_deref()
    }
}
