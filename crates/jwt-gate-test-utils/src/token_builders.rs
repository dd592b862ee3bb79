//! Builder patterns for test data construction
//!
//! Provides a fluent API for creating JWT claim sets.

use crate::test_ids::{TEST_CLIENT_ID, TEST_SUBJECT};
use chrono::{Duration, Utc};
use serde_json::{json, Map, Value};

/// Builder for creating test JWT claims
///
/// Defaults to the test subject and the test client id as audience, with no
/// time-based claims.
///
/// # Example
/// ```rust,ignore
/// let claims = TestClaimsBuilder::new()
///     .for_subject("alice")
///     .with_email("alice@example.com")
///     .expires_in(3600)
///     .build();
/// ```
pub struct TestClaimsBuilder {
    claims: Map<String, Value>,
}

impl TestClaimsBuilder {
    /// Create a new claims builder with defaults
    pub fn new() -> Self {
        let mut claims = Map::new();
        claims.insert("sub".to_string(), json!(TEST_SUBJECT));
        claims.insert("aud".to_string(), json!(TEST_CLIENT_ID));
        Self { claims }
    }

    /// Set the subject
    pub fn for_subject(self, subject: &str) -> Self {
        self.with_claim("sub", json!(subject))
    }

    /// Remove the subject
    pub fn without_subject(mut self) -> Self {
        self.claims.remove("sub");
        self
    }

    /// Set a single audience
    pub fn with_audience(self, audience: &str) -> Self {
        self.with_claim("aud", json!(audience))
    }

    /// Set the audience as an array
    pub fn with_audiences(self, audiences: &[&str]) -> Self {
        self.with_claim("aud", json!(audiences))
    }

    /// Remove the audience
    pub fn without_audience(mut self) -> Self {
        self.claims.remove("aud");
        self
    }

    /// Set the issuer
    pub fn with_issuer(self, issuer: &str) -> Self {
        self.with_claim("iss", json!(issuer))
    }

    /// Set the email claim
    pub fn with_email(self, email: &str) -> Self {
        self.with_claim("email", json!(email))
    }

    /// Set expiration in seconds from now (negative for the past)
    pub fn expires_in(self, seconds: i64) -> Self {
        let exp = (Utc::now() + Duration::seconds(seconds)).timestamp();
        self.with_claim("exp", json!(exp))
    }

    /// Set not-before in seconds from now
    pub fn not_before_in(self, seconds: i64) -> Self {
        let nbf = (Utc::now() + Duration::seconds(seconds)).timestamp();
        self.with_claim("nbf", json!(nbf))
    }

    /// Set an arbitrary claim
    pub fn with_claim(mut self, name: &str, value: Value) -> Self {
        self.claims.insert(name.to_string(), value);
        self
    }

    /// Build the claims as a JSON value
    pub fn build(self) -> Value {
        Value::Object(self.claims)
    }
}

impl Default for TestClaimsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
