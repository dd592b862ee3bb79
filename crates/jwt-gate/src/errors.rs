//! Verification and authentication error types.
//!
//! [`VerifyError`] carries the specific cause of a rejected token and is only
//! meant for diagnostic logging. Callers of the provider only ever see
//! [`AuthenticationError`], which is identical for every rejection so that
//! responses cannot be used as an oracle.

use std::fmt;
use thiserror::Error;

/// Coarse cause of a verification failure, used as a log field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureCategory {
    /// Not a three-segment compact token, or an unreadable header.
    MalformedToken,
    /// Header algorithm is unknown or differs from the configured one.
    UnsupportedAlgorithm,
    /// Signature does not match header and payload.
    SignatureMismatch,
    /// Audience claim missing or not containing the client id.
    AudienceMismatch,
    /// Issuer claim missing or different from the configured issuer.
    IssuerMismatch,
    /// `exp` in the past or `nbf` in the future.
    Expired,
    /// Base64, UTF-8 or JSON decoding of a segment failed.
    DecodingError,
    /// Claim set has no string `sub` claim.
    MissingSubject,
    /// Unexpected cryptographic fault (bad key material, backend error).
    CryptoFault,
}

impl FailureCategory {
    /// Stable label for structured log fields.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FailureCategory::MalformedToken => "malformed_token",
            FailureCategory::UnsupportedAlgorithm => "unsupported_algorithm",
            FailureCategory::SignatureMismatch => "signature_mismatch",
            FailureCategory::AudienceMismatch => "audience_mismatch",
            FailureCategory::IssuerMismatch => "issuer_mismatch",
            FailureCategory::Expired => "expired",
            FailureCategory::DecodingError => "decoding_error",
            FailureCategory::MissingSubject => "missing_subject",
            FailureCategory::CryptoFault => "crypto_fault",
        }
    }
}

impl fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Internal verification failure.
///
/// Messages are diagnostic and may name the offending header or claim; they
/// must never be returned to the party that presented the token.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    #[error("Malformed token: {0}")]
    MalformedToken(String),

    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Signature mismatch")]
    SignatureMismatch,

    #[error("Audience mismatch: {0}")]
    AudienceMismatch(String),

    #[error("Issuer mismatch: {0}")]
    IssuerMismatch(String),

    #[error("Token outside validity window: {0}")]
    Expired(String),

    #[error("Decoding error: {0}")]
    Decoding(String),

    #[error("Claim set has no subject")]
    MissingSubject,

    #[error("Cryptographic failure: {0}")]
    Crypto(String),
}

impl VerifyError {
    /// The category this failure is logged under.
    #[must_use]
    pub fn category(&self) -> FailureCategory {
        match self {
            VerifyError::MalformedToken(_) => FailureCategory::MalformedToken,
            VerifyError::UnsupportedAlgorithm(_) => FailureCategory::UnsupportedAlgorithm,
            VerifyError::SignatureMismatch => FailureCategory::SignatureMismatch,
            VerifyError::AudienceMismatch(_) => FailureCategory::AudienceMismatch,
            VerifyError::IssuerMismatch(_) => FailureCategory::IssuerMismatch,
            VerifyError::Expired(_) => FailureCategory::Expired,
            VerifyError::Decoding(_) => FailureCategory::DecodingError,
            VerifyError::MissingSubject => FailureCategory::MissingSubject,
            VerifyError::Crypto(_) => FailureCategory::CryptoFault,
        }
    }
}

impl From<jsonwebtoken::errors::Error> for VerifyError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::InvalidToken => VerifyError::MalformedToken(err.to_string()),
            ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName
            | ErrorKind::MissingAlgorithm => VerifyError::UnsupportedAlgorithm(err.to_string()),
            ErrorKind::InvalidSignature => VerifyError::SignatureMismatch,
            ErrorKind::InvalidAudience => VerifyError::AudienceMismatch(err.to_string()),
            ErrorKind::InvalidIssuer => VerifyError::IssuerMismatch(err.to_string()),
            ErrorKind::ExpiredSignature | ErrorKind::ImmatureSignature => {
                VerifyError::Expired(err.to_string())
            }
            ErrorKind::MissingRequiredClaim(claim) => match claim.as_str() {
                "aud" => VerifyError::AudienceMismatch(err.to_string()),
                "iss" => VerifyError::IssuerMismatch(err.to_string()),
                "sub" => VerifyError::MissingSubject,
                _ => VerifyError::Decoding(err.to_string()),
            },
            ErrorKind::Base64(_) | ErrorKind::Json(_) | ErrorKind::Utf8(_) => {
                VerifyError::Decoding(err.to_string())
            }
            _ => VerifyError::Crypto(err.to_string()),
        }
    }
}

/// The one error callers see when authentication fails.
///
/// Carries no per-request state. Compare against [`AUTH_ERROR`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[error("Authentication error occurred")]
pub struct AuthenticationError(());

/// Shared rejection value returned for every failed authentication.
pub const AUTH_ERROR: AuthenticationError = AuthenticationError(());

impl From<VerifyError> for AuthenticationError {
    fn from(_: VerifyError) -> Self {
        AUTH_ERROR
    }
}
