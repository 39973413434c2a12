//! # PhotoVault Gateway
//!
//! Gateway contracts for the two managed services behind the PhotoVault
//! photo library: the identity provider and the object store.
//!
//! This crate provides:
//! - **IdentityGateway**: sign-in/sign-up/confirm/reset/sign-out/session
//! - **ObjectStore**: list/presign/put against the caller's private partition
//! - **REST implementations**: `reqwest`-backed clients for the managed
//!   services' facades
//! - **In-memory implementations**: full fakes for tests and demos
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │         Session / Gallery coordination      │
//! ├──────────────────────┬──────────────────────┤
//! │  IdentityGateway     │     ObjectStore      │
//! ├──────────┬───────────┼───────────┬──────────┤
//! │ RestId.. │ MemoryId..│ RestObj.. │ MemoryO..│
//! ├──────────┴───────────┴───────────┴──────────┤
//! │        Identity provider / Object store     │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Every error crossing these traits is drawn from the closed
//! [`GatewayError`] taxonomy; callers never see provider-specific shapes.

pub mod error;
pub mod identity;
pub mod memory;
pub mod storage;
pub mod types;

pub use error::{GatewayError, Result};
pub use identity::{IdentityEndpoint, RestIdentityGateway};
pub use memory::{MemoryIdentityGateway, MemoryObjectStore};
pub use storage::{RestObjectStore, StorageEndpoint};
pub use types::{AccessScope, ObjectSummary, SignedUrl, UserIdentity};

use async_trait::async_trait;
use bytes::Bytes;

/// Contract wrapping the managed identity provider.
///
/// Each operation resolves with a [`UserIdentity`] or unit, or fails with
/// one of the [`GatewayError`] kinds. Token storage and refresh are internal
/// to the provider; implementations expose only the session observable.
#[async_trait]
pub trait IdentityGateway: Send + Sync {
    /// Authenticate with email and password.
    async fn sign_in(&self, email: &str, password: &str) -> Result<UserIdentity>;

    /// Register a new account; confirmation happens out of band.
    async fn sign_up(&self, email: &str, password: &str) -> Result<()>;

    /// Confirm a registration with the emailed code.
    async fn confirm_sign_up(&self, email: &str, code: &str) -> Result<()>;

    /// Send a fresh confirmation code.
    async fn resend_confirmation(&self, email: &str) -> Result<()>;

    /// Begin a password reset; the provider emails a code.
    async fn request_password_reset(&self, email: &str) -> Result<()>;

    /// Complete a password reset with the emailed code.
    async fn submit_password_reset(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<()>;

    /// End the current session.
    async fn sign_out(&self) -> Result<()>;

    /// The currently authenticated identity, if any.
    async fn current_session(&self) -> Result<UserIdentity>;
}

/// Contract wrapping the managed object store, scoped to the caller's
/// private partition.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List objects under a key prefix, in the store's own order.
    async fn list(&self, prefix: &str) -> Result<Vec<ObjectSummary>>;

    /// Resolve a time-limited access URL for a key.
    ///
    /// A key with no stored object fails with
    /// [`GatewayError::ResolutionUnavailable`].
    async fn presign_get(&self, key: &str) -> Result<SignedUrl>;

    /// Write an object, tagged with its content type.
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<()>;
}
