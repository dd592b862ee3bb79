//! Bearer-token verification gate.
//!
//! Verifies a signed JWT against configured trust material and binds the
//! decoded claims into an authenticated identity, or rejects the attempt
//! with a single normalized error.
//!
//! ```rust,ignore
//! use jwt_gate::{AuthenticationProvider, BearerCredential, GateConfig, KeyMaterial};
//!
//! let config = GateConfig::new(KeyMaterial::hmac("s3cr3t"), "app1", "/api/**");
//! let provider = AuthenticationProvider::new(config)?;
//!
//! let credential = BearerCredential::new(token);
//! let authenticated = provider.authenticate(&credential)?;
//! assert_eq!(authenticated.principal().subject(), "user-42");
//! ```
//!
//! # Security
//!
//! - The header algorithm must equal the configured one; anything else is
//!   rejected before signature math runs
//! - Every rejection surfaces as the same [`AuthenticationError`]; the cause
//!   is only logged at debug level
//! - Configuration is validated once at construction; an incomplete
//!   configuration never yields a provider

#![warn(clippy::pedantic)]

/// Module for JWT claim sets and the identity derived from them
pub mod claims;

/// Module for gate configuration
pub mod config;

/// Module for credential shapes and authentication results
pub mod credential;

/// Module for verification and authentication errors
pub mod errors;

/// Module for the authentication provider
pub mod provider;

/// Module for token signature and claim verification
pub mod verifier;

pub use claims::{ClaimSet, Identity};
pub use config::{ConfigError, GateConfig, KeyMaterial};
pub use credential::{Authenticated, BearerCredential, Credential};
pub use errors::{AuthenticationError, FailureCategory, VerifyError, AUTH_ERROR};
pub use provider::AuthenticationProvider;
pub use verifier::Verifier;
