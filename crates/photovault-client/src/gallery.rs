//! Gallery synchronization engine
//!
//! Produces the ordered gallery for the signed-in user by listing the
//! private partition and resolving each original into time-limited access
//! URLs. Thumbnails are generated out of band some time after an upload, so
//! a missing thumbnail is expected: the engine falls back to the original's
//! own URL and re-syncs once after a fixed delay.
//!
//! Overlapping `refresh` passes are not serialized; the later writer
//! overwrites the snapshot (last-writer-wins, no fencing token). Triggers
//! are human-paced, and that behavior is deliberate — do not add
//! cancellation here.

use crate::{CoreError, Result};
use bytes::Bytes;
use futures::future::join_all;
use parking_lot::Mutex;
use photovault_gateway::ObjectStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// A photo selected for upload
#[derive(Clone, Debug)]
pub struct Photo {
    /// File name, kept as the tail of the storage key
    pub file_name: String,
    /// Declared content type; guessed from the file name when absent
    pub content_type: Option<String>,
    /// File contents
    pub data: Bytes,
}

impl Photo {
    /// Create a photo from a file name and its contents
    pub fn new(file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            data: data.into(),
        }
    }

    /// Set the declared content type
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Whether the selection is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn resolved_content_type(&self) -> String {
        self.content_type.clone().unwrap_or_else(|| {
            mime_guess::from_path(&self.file_name)
                .first_or_octet_stream()
                .to_string()
        })
    }
}

/// One gallery entry: an original and its resolved display URLs
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GalleryItem {
    /// Key of the uploaded original
    pub original_key: String,
    /// URL for the thumbnail; equals `full_url` while the thumbnail is
    /// still being generated
    pub thumbnail_url: String,
    /// URL for the full-size photo
    pub full_url: String,
}

/// The caller-visible gallery state
///
/// Rebuilt wholesale on every sync pass; never merged with a prior pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum GallerySnapshot {
    /// Cleared state; no user is signed in
    #[default]
    SignedOut,
    /// The "no photos yet" sentinel for an empty listing
    Empty,
    /// Resolved entries, in the store's listing order
    Photos(Vec<GalleryItem>),
    /// A whole-pass failure; partial results were discarded
    Unavailable(String),
}

/// The gallery synchronization engine
pub struct GalleryEngine<S> {
    store: Arc<S>,
    snapshot: Arc<Mutex<GallerySnapshot>>,
    refresh_delay: Duration,
    deferred: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl<S> Clone for GalleryEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            snapshot: Arc::clone(&self.snapshot),
            refresh_delay: self.refresh_delay,
            deferred: Arc::clone(&self.deferred),
        }
    }
}

impl<S: ObjectStore + 'static> GalleryEngine<S> {
    /// Create an engine over a storage gateway
    pub fn new(store: Arc<S>, refresh_delay: Duration) -> Self {
        Self {
            store,
            snapshot: Arc::new(Mutex::new(GallerySnapshot::SignedOut)),
            refresh_delay,
            deferred: Arc::new(Mutex::new(None)),
        }
    }

    /// The current gallery state
    pub fn snapshot(&self) -> GallerySnapshot {
        self.snapshot.lock().clone()
    }

    /// Reset to the cleared state (sign-out)
    pub fn clear(&self) {
        *self.snapshot.lock() = GallerySnapshot::SignedOut;
    }

    /// Run one full sync pass for a subject and store the result.
    ///
    /// A failure anywhere outside thumbnail resolution aborts the pass; the
    /// snapshot is then replaced by [`GallerySnapshot::Unavailable`] rather
    /// than left partially updated.
    pub async fn refresh(&self, subject_id: &str) -> GallerySnapshot {
        debug!(subject = subject_id, "gallery sync pass");

        let snapshot = match self.sync_pass(subject_id).await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!("gallery sync failed: {err}");
                GallerySnapshot::Unavailable(err.to_string())
            }
        };

        *self.snapshot.lock() = snapshot.clone();
        snapshot
    }

    async fn sync_pass(&self, subject_id: &str) -> Result<GallerySnapshot> {
        let prefix = format!("{subject_id}/");
        let listed = self.store.list(&prefix).await?;

        // Keep the store's own order; it is treated as stable enough for
        // display but never relied on for correctness.
        let originals: Vec<String> = listed
            .into_iter()
            .filter(|object| photovault_keys::is_original(&object.key))
            .map(|object| object.key)
            .collect();

        if originals.is_empty() {
            return Ok(GallerySnapshot::Empty);
        }

        let resolved = join_all(originals.iter().map(|key| self.resolve_item(key))).await;
        let items = resolved.into_iter().collect::<Result<Vec<_>>>()?;
        Ok(GallerySnapshot::Photos(items))
    }

    async fn resolve_item(&self, original_key: &str) -> Result<GalleryItem> {
        let thumbnail_key = photovault_keys::derive_thumbnail_key(original_key)?;

        // A thumbnail that does not resolve yet is expected, not
        // exceptional: show the original until the pipeline catches up.
        let thumbnail = match self.store.presign_get(&thumbnail_key).await {
            Ok(signed) => signed,
            Err(_) => self.store.presign_get(original_key).await?,
        };
        let full = self.store.presign_get(original_key).await?;

        Ok(GalleryItem {
            original_key: original_key.to_string(),
            thumbnail_url: thumbnail.url,
            full_url: full.url,
        })
    }

    /// Upload a photo into the subject's partition.
    ///
    /// Writes exactly one object and schedules exactly one deferred
    /// `refresh` after the configured delay, a heuristic wait for the
    /// thumbnail pipeline. No retry, no backoff. Returns the new key.
    pub async fn upload(&self, subject_id: &str, photo: Photo) -> Result<String> {
        if photo.is_empty() {
            return Err(CoreError::NoFileSelected);
        }

        let key = photovault_keys::build_original_key(
            subject_id,
            &photovault_keys::upload_id(),
            &photo.file_name,
        );
        let content_type = photo.resolved_content_type();

        self.store.put(&key, photo.data, &content_type).await?;
        info!(key = %key, content_type = %content_type, "uploaded original");

        self.schedule_refresh(subject_id);
        Ok(key)
    }

    fn schedule_refresh(&self, subject_id: &str) {
        let engine = self.clone();
        let subject = subject_id.to_string();
        let delay = self.refresh_delay;

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            engine.refresh(&subject).await;
        });
        *self.deferred.lock() = Some(handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use photovault_gateway::MemoryObjectStore;

    const SUBJECT: &str = "u1";

    fn engine(store: &Arc<MemoryObjectStore>) -> GalleryEngine<MemoryObjectStore> {
        GalleryEngine::new(Arc::clone(store), Duration::from_secs(4))
    }

    async fn seed_original(store: &MemoryObjectStore, name: &str) -> String {
        use photovault_gateway::ObjectStore;
        let key = photovault_keys::build_original_key(
            SUBJECT,
            &photovault_keys::upload_id(),
            name,
        );
        store
            .put(&key, Bytes::from_static(b"png"), "image/png")
            .await
            .unwrap();
        key
    }

    #[tokio::test]
    async fn test_refresh_on_empty_listing_is_the_sentinel() {
        let store = Arc::new(MemoryObjectStore::new());
        let engine = engine(&store);

        assert_eq!(engine.refresh(SUBJECT).await, GallerySnapshot::Empty);
        assert_eq!(engine.snapshot(), GallerySnapshot::Empty);
    }

    #[tokio::test]
    async fn test_refresh_resolves_generated_thumbnails() {
        let store = Arc::new(MemoryObjectStore::new());
        let key = seed_original(&store, "cat.png").await;
        store.generate_thumbnail(&key).unwrap();

        let engine = engine(&store);
        match engine.refresh(SUBJECT).await {
            GallerySnapshot::Photos(items) => {
                assert_eq!(items.len(), 1);
                assert!(items[0].thumbnail_url.contains("/thumbnails/"));
                assert!(items[0].full_url.contains("/original/"));
                assert_ne!(items[0].thumbnail_url, items[0].full_url);
            }
            other => panic!("unexpected snapshot: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_thumbnail_falls_back_to_original() {
        let store = Arc::new(MemoryObjectStore::new());
        let first = seed_original(&store, "cat.png").await;
        let second = seed_original(&store, "dog.png").await;
        // Only the second original's thumbnail has been generated.
        store.generate_thumbnail(&second).unwrap();

        let engine = engine(&store);
        match engine.refresh(SUBJECT).await {
            GallerySnapshot::Photos(items) => {
                assert_eq!(items.len(), 2);
                // Fallback: both URLs point at the original itself.
                assert_eq!(items[0].original_key, first);
                assert_eq!(items[0].thumbnail_url, items[0].full_url);
                // The generated one resolves normally; the miss next to it
                // did not abort the pass.
                assert!(items[1].thumbnail_url.contains("/thumbnails/"));
            }
            other => panic!("unexpected snapshot: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_refresh_preserves_listing_order_and_skips_non_originals() {
        let store = Arc::new(MemoryObjectStore::new());
        let first = seed_original(&store, "one.png").await;
        let second = seed_original(&store, "two.png").await;
        store.generate_thumbnail(&first).unwrap();
        {
            use photovault_gateway::ObjectStore;
            store
                .put("u1/notes.txt", Bytes::from_static(b"n"), "text/plain")
                .await
                .unwrap();
        }

        let engine = engine(&store);
        match engine.refresh(SUBJECT).await {
            GallerySnapshot::Photos(items) => {
                let keys: Vec<_> = items.iter().map(|i| i.original_key.clone()).collect();
                assert_eq!(keys, vec![first, second]);
            }
            other => panic!("unexpected snapshot: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_failed_listing_discards_prior_snapshot() {
        let store = Arc::new(MemoryObjectStore::new());
        seed_original(&store, "cat.png").await;

        let engine = engine(&store);
        assert!(matches!(
            engine.refresh(SUBJECT).await,
            GallerySnapshot::Photos(_)
        ));

        store.set_offline(true);
        match engine.refresh(SUBJECT).await {
            GallerySnapshot::Unavailable(message) => {
                assert!(message.contains("network unavailable"));
            }
            other => panic!("unexpected snapshot: {other:?}"),
        }
        assert!(matches!(engine.snapshot(), GallerySnapshot::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_upload_rejects_empty_selection() {
        let store = Arc::new(MemoryObjectStore::new());
        let engine = engine(&store);

        let result = engine.upload(SUBJECT, Photo::new("cat.png", Bytes::new())).await;
        assert!(matches!(result, Err(CoreError::NoFileSelected)));
        assert_eq!(store.put_calls(), 0);
    }

    #[tokio::test]
    async fn test_upload_writes_one_object_under_the_subject_partition() {
        let store = Arc::new(MemoryObjectStore::new());
        let engine = engine(&store);

        let key = engine
            .upload(SUBJECT, Photo::new("cat.png", &b"png bytes"[..]))
            .await
            .unwrap();

        assert_eq!(store.put_calls(), 1);
        assert!(key.starts_with("u1/original/"));
        assert!(key.ends_with("-cat.png"));
        assert!(store.contains(&key));
    }

    #[tokio::test(start_paused = true)]
    async fn test_upload_schedules_exactly_one_deferred_refresh() {
        let store = Arc::new(MemoryObjectStore::new());
        let engine = engine(&store);

        engine
            .upload(SUBJECT, Photo::new("cat.png", &b"png bytes"[..]))
            .await
            .unwrap();
        assert_eq!(store.list_calls(), 0);

        let handle = engine.deferred.lock().take().expect("refresh scheduled");
        handle.await.unwrap();

        assert_eq!(store.list_calls(), 1);
        // Thumbnail generation has not happened; the refresh shows the
        // fallback rather than waiting further.
        match engine.snapshot() {
            GallerySnapshot::Photos(items) => {
                assert_eq!(items.len(), 1);
                assert_eq!(items[0].thumbnail_url, items[0].full_url);
            }
            other => panic!("unexpected snapshot: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_upload_guesses_content_type_from_file_name() {
        let store = Arc::new(MemoryObjectStore::new());
        let engine = engine(&store);

        let guessed = engine
            .upload(SUBJECT, Photo::new("cat.png", &b"png bytes"[..]))
            .await
            .unwrap();
        let declared = engine
            .upload(
                SUBJECT,
                Photo::new("raw-dump.bin", &b"data"[..]).with_content_type("image/x-raw"),
            )
            .await
            .unwrap();

        assert_eq!(store.content_type(&guessed).as_deref(), Some("image/png"));
        assert_eq!(store.content_type(&declared).as_deref(), Some("image/x-raw"));
    }

    #[tokio::test]
    async fn test_clear_resets_to_signed_out() {
        let store = Arc::new(MemoryObjectStore::new());
        let engine = engine(&store);

        engine.refresh(SUBJECT).await;
        assert_eq!(engine.snapshot(), GallerySnapshot::Empty);

        engine.clear();
        assert_eq!(engine.snapshot(), GallerySnapshot::SignedOut);
    }
}
