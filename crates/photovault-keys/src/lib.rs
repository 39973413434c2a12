//! # PhotoVault Keys
//!
//! Key namespace for the PhotoVault photo library.
//!
//! Every stored object lives under the authenticated subject's private
//! partition and carries a role segment identifying it as an uploaded
//! original or a derived thumbnail:
//!
//! ```text
//! {subject}/original/{upload-id}-{file-name}
//! {subject}/thumbnails/{upload-id}-{file-name}
//! ```
//!
//! The two forms are related by substring substitution of the role segment,
//! so for any original key exactly one thumbnail key exists and vice versa.
//! Partition isolation across subjects is enforced by the object store's
//! private-scope contract, not by these functions.

use thiserror::Error;
use uuid::Uuid;

/// Role segment marking an uploaded original.
pub const ORIGINAL_SEGMENT: &str = "/original/";

/// Role segment marking a derived thumbnail.
pub const THUMBNAIL_SEGMENT: &str = "/thumbnails/";

/// Result type alias
pub type Result<T> = std::result::Result<T, KeyError>;

/// Key namespace errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// The key carries no recognized role segment
    #[error("malformed key: {0}")]
    MalformedKey(String),
}

/// Role of a stored object, derived from its key
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectRole {
    /// A user-uploaded photo
    Original,
    /// A derived thumbnail produced by the external pipeline
    Thumbnail,
    /// Anything without a recognized role segment; excluded from listings
    Unknown,
}

/// Generate a fresh collision-resistant upload identifier.
///
/// Identifiers are random, never content-derived, so concurrent uploads of
/// same-named files never collide.
pub fn upload_id() -> String {
    Uuid::new_v4().to_string()
}

/// Build the key for a newly uploaded original.
pub fn build_original_key(subject_id: &str, upload_id: &str, file_name: &str) -> String {
    format!("{subject_id}{ORIGINAL_SEGMENT}{upload_id}-{file_name}")
}

/// Derive the thumbnail key for an original key.
///
/// Fails with [`KeyError::MalformedKey`] if the original role segment is
/// absent.
pub fn derive_thumbnail_key(original_key: &str) -> Result<String> {
    if !original_key.contains(ORIGINAL_SEGMENT) {
        return Err(KeyError::MalformedKey(original_key.to_string()));
    }
    Ok(original_key.replacen(ORIGINAL_SEGMENT, THUMBNAIL_SEGMENT, 1))
}

/// Derive the original key for a thumbnail key (inverse substitution).
pub fn derive_original_key(thumbnail_key: &str) -> Result<String> {
    if !thumbnail_key.contains(THUMBNAIL_SEGMENT) {
        return Err(KeyError::MalformedKey(thumbnail_key.to_string()));
    }
    Ok(thumbnail_key.replacen(THUMBNAIL_SEGMENT, ORIGINAL_SEGMENT, 1))
}

/// Classify a raw listed key by its role segment.
pub fn classify(key: &str) -> ObjectRole {
    if key.contains(ORIGINAL_SEGMENT) {
        ObjectRole::Original
    } else if key.contains(THUMBNAIL_SEGMENT) {
        ObjectRole::Thumbnail
    } else {
        ObjectRole::Unknown
    }
}

/// Whether a listed key is an uploaded original.
pub fn is_original(key: &str) -> bool {
    classify(key) == ObjectRole::Original
}
