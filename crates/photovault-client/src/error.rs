//! Core error types

use photovault_gateway::GatewayError;
use photovault_keys::KeyError;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, CoreError>;

/// Failures surfaced by the coordination core
///
/// Gateway and key errors pass through transparently so the presentation
/// layer sees the provider's message verbatim.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Operation requires a signed-in session
    #[error("not signed in")]
    NotAuthenticated,

    /// Upload requested without a file selection
    #[error("select a file first")]
    NoFileSelected,

    /// Key namespace error
    #[error(transparent)]
    Key(#[from] KeyError),

    /// Gateway error
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}
