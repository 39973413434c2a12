//! Gateway error taxonomy
//!
//! The closed set of failures the coordination layer is allowed to observe
//! from either managed service. REST implementations translate wire-level
//! failures into these kinds; nothing provider-specific leaks upward.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Failures surfaced by the identity and storage gateways
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Email/password pair rejected by the identity provider
    #[error("incorrect email or password")]
    InvalidCredentials,

    /// Account exists but its email has not been confirmed
    #[error("account not confirmed; check your email for the code")]
    NotConfirmed,

    /// Confirmation or reset code rejected
    #[error("invalid or expired verification code")]
    CodeMismatch,

    /// Candidate password rejected by policy
    #[error("{0}")]
    WeakPassword(String),

    /// Transport-level failure reaching a managed service
    #[error("network unavailable: {0}")]
    NetworkUnavailable(String),

    /// No authenticated session exists
    #[error("no active session")]
    NoActiveSession,

    /// The key has no resolvable object yet
    #[error("no resolvable object at key: {0}")]
    ResolutionUnavailable(String),

    /// Anything the taxonomy does not name
    #[error("{0}")]
    Unknown(String),
}

impl GatewayError {
    /// Translate a provider error code into the taxonomy.
    ///
    /// The identity facade reports Cognito-style exception names in its
    /// error body; everything unrecognized collapses into [`Self::Unknown`]
    /// with the provider's human-readable message.
    pub fn from_provider_code(code: &str, message: &str) -> Self {
        match code {
            "NotAuthorizedException" | "UserNotFoundException" => Self::InvalidCredentials,
            "UserNotConfirmedException" => Self::NotConfirmed,
            "CodeMismatchException" | "ExpiredCodeException" => Self::CodeMismatch,
            "InvalidPasswordException" => Self::WeakPassword(message.to_string()),
            "NoActiveSessionException" => Self::NoActiveSession,
            _ => Self::Unknown(message.to_string()),
        }
    }

    /// Translate a transport error into the taxonomy.
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            Self::NetworkUnavailable(err.to_string())
        } else {
            Self::Unknown(err.to_string())
        }
    }

    /// Whether this is the absent-session failure.
    pub fn is_no_session(&self) -> bool {
        matches!(self, Self::NoActiveSession)
    }

    /// Whether this is the expected not-yet-resolvable failure.
    pub fn is_resolution_unavailable(&self) -> bool {
        matches!(self, Self::ResolutionUnavailable(_))
    }
}
