//! Common types shared by the gateway contracts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An authenticated user, as reported by the identity provider
///
/// Immutable once obtained; `subject_id` is the partition root for all of
/// the user's storage keys.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    /// Opaque subject identifier assigned by the provider
    pub subject_id: String,
    /// Verified email address
    pub email: String,
}

/// A listed object reference
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ObjectSummary {
    /// Full object key, role segment included
    pub key: String,
}

/// A time-limited access URL for a stored object
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SignedUrl {
    /// The resolvable address
    pub url: String,
    /// When the address stops resolving
    pub expires_at: DateTime<Utc>,
}

/// Access level for storage operations
///
/// The photo library only ever uses [`AccessScope::Private`]; the other
/// levels exist because the store's contract names them and configuration
/// carries a default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessScope {
    /// Readable and writable by the owning subject only
    #[default]
    Private,
    /// Readable by any signed-in user, writable by the owner
    Protected,
    /// Readable by anyone
    Public,
}

impl AccessScope {
    /// Get the string representation used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::Protected => "protected",
            Self::Public => "public",
        }
    }
}
