//! Fixed test values for deterministic tests
//!
//! Secrets and ids match the documented example scenario so failures read
//! the same way in every test.

// Client ids (audiences)
pub const TEST_CLIENT_ID: &str = "app1";
pub const OTHER_CLIENT_ID: &str = "app2";

// Secrets
pub const TEST_SECRET: &str = "s3cr3t";
pub const WRONG_SECRET: &str = "wrong-secret";

// Subjects
pub const TEST_SUBJECT: &str = "user-42";
pub const OTHER_SUBJECT: &str = "user-7";

// Issuer
pub const TEST_ISSUER: &str = "https://issuer.test/";

// Route pattern
pub const TEST_SECURED_ROUTE: &str = "/api/**";
