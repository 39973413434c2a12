//! # PhotoVault Client
//!
//! Session and gallery synchronization core for the PhotoVault photo
//! library.
//!
//! This crate provides:
//! - **Session Coordinator**: the sign-in/sign-out state machine over the
//!   identity gateway
//! - **Gallery Sync Engine**: lists originals, resolves thumbnail URLs with
//!   fallback, and absorbs thumbnail-generation latency with a deferred
//!   re-sync after uploads
//! - **PhotoLibrary**: the facade a presentation layer drives
//!
//! ## Example
//!
//! ```rust,ignore
//! use photovault_client::{Config, Photo, PhotoLibrary};
//! use photovault_gateway::{MemoryIdentityGateway, MemoryObjectStore};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let identity = Arc::new(MemoryIdentityGateway::with_confirmed_user(
//!         "ada@example.com",
//!         "Pass1word!",
//!     ));
//!     let store = Arc::new(MemoryObjectStore::new());
//!     let library = PhotoLibrary::new(Config::default(), identity, store);
//!
//!     library.sign_in("ada@example.com", "Pass1word!").await?;
//!     library
//!         .upload(Some(Photo::new("cat.png", b"...".as_ref())))
//!         .await?;
//!     println!("{:?}", library.gallery());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod gallery;
pub mod library;
pub mod password;
pub mod session;

pub use config::{Config, IdentityConfig, PasswordPolicy, StorageConfig};
pub use error::{CoreError, Result};
pub use gallery::{GalleryEngine, GalleryItem, GallerySnapshot, Photo};
pub use library::PhotoLibrary;
pub use session::{SessionCoordinator, SessionState};

// Re-export the gateway surface callers wire in.
pub use photovault_gateway::{
    GatewayError, IdentityEndpoint, IdentityGateway, ObjectStore, SignedUrl, StorageEndpoint,
    UserIdentity,
};
