//! # jwt-gate Test Utilities
//!
//! Shared test utilities for the jwt-gate crate.
//!
//! This crate provides:
//! - Fixed test ids and secrets (client ids, secrets, subjects)
//! - A claims builder (TestClaimsBuilder)
//! - Token signing and forging helpers (HMAC, Ed25519, raw segments)
//! - Deterministic Ed25519 keys (fixed seeds for reproducible tests)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use jwt_gate_test_utils::*;
//!
//! #[test]
//! fn test_example() {
//!     let claims = TestClaimsBuilder::new()
//!         .for_subject("alice")
//!         .with_audience(TEST_CLIENT_ID)
//!         .build();
//!
//!     let token = sign_hs256(&claims, TEST_SECRET);
//! }
//! ```

pub mod crypto_fixtures;
pub mod test_ids;
pub mod token_builders;

// Re-export commonly used items
pub use crypto_fixtures::*;
pub use test_ids::*;
pub use token_builders::*;
