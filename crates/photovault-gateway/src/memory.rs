//! In-memory gateways for tests and demos
//!
//! `MemoryIdentityGateway` models the provider's account lifecycle
//! (registration, emailed codes, password reset, one session slot) and
//! `MemoryObjectStore` models the private partition of the object store,
//! including the external thumbnail pipeline via [`MemoryObjectStore::generate_thumbnail`].

use crate::{
    GatewayError, IdentityGateway, ObjectStore, ObjectSummary, Result, SignedUrl, UserIdentity,
};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{Duration, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use uuid::Uuid;

fn six_digit_code() -> String {
    format!("{:06}", Uuid::new_v4().as_u128() % 1_000_000)
}

#[derive(Clone)]
struct Account {
    subject_id: String,
    password: String,
    confirmed: bool,
    confirmation_code: Option<String>,
    reset_code: Option<String>,
}

/// An in-memory identity provider
#[derive(Clone, Default)]
pub struct MemoryIdentityGateway {
    accounts: Arc<Mutex<HashMap<String, Account>>>,
    session: Arc<Mutex<Option<UserIdentity>>>,
}

impl MemoryIdentityGateway {
    /// Create a new empty provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with one already-confirmed account
    pub fn with_confirmed_user(email: &str, password: &str) -> Self {
        let gateway = Self::new();
        gateway.accounts.lock().insert(
            email.to_string(),
            Account {
                subject_id: format!("sub-{}", Uuid::new_v4()),
                password: password.to_string(),
                confirmed: true,
                confirmation_code: None,
                reset_code: None,
            },
        );
        gateway
    }

    /// Seed an active session, as if a prior process had signed in
    pub fn with_active_session(self, identity: UserIdentity) -> Self {
        *self.session.lock() = Some(identity);
        self
    }

    /// The confirmation code last emailed to an account
    pub fn confirmation_code(&self, email: &str) -> Option<String> {
        self.accounts
            .lock()
            .get(email)
            .and_then(|a| a.confirmation_code.clone())
    }

    /// The reset code last emailed to an account
    pub fn reset_code(&self, email: &str) -> Option<String> {
        self.accounts
            .lock()
            .get(email)
            .and_then(|a| a.reset_code.clone())
    }

    /// The subject identifier assigned to an account
    pub fn subject_id(&self, email: &str) -> Option<String> {
        self.accounts
            .lock()
            .get(email)
            .map(|a| a.subject_id.clone())
    }
}

#[async_trait]
impl IdentityGateway for MemoryIdentityGateway {
    async fn sign_in(&self, email: &str, password: &str) -> Result<UserIdentity> {
        let accounts = self.accounts.lock();
        let account = accounts.get(email).ok_or(GatewayError::InvalidCredentials)?;
        if account.password != password {
            return Err(GatewayError::InvalidCredentials);
        }
        if !account.confirmed {
            return Err(GatewayError::NotConfirmed);
        }

        let identity = UserIdentity {
            subject_id: account.subject_id.clone(),
            email: email.to_string(),
        };
        drop(accounts);
        *self.session.lock() = Some(identity.clone());
        Ok(identity)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<()> {
        let mut accounts = self.accounts.lock();
        if accounts.contains_key(email) {
            return Err(GatewayError::Unknown(format!(
                "an account already exists for {email}"
            )));
        }
        accounts.insert(
            email.to_string(),
            Account {
                subject_id: format!("sub-{}", Uuid::new_v4()),
                password: password.to_string(),
                confirmed: false,
                confirmation_code: Some(six_digit_code()),
                reset_code: None,
            },
        );
        Ok(())
    }

    async fn confirm_sign_up(&self, email: &str, code: &str) -> Result<()> {
        let mut accounts = self.accounts.lock();
        let account = accounts
            .get_mut(email)
            .ok_or(GatewayError::InvalidCredentials)?;
        if account.confirmation_code.as_deref() != Some(code) {
            return Err(GatewayError::CodeMismatch);
        }
        account.confirmed = true;
        account.confirmation_code = None;
        Ok(())
    }

    async fn resend_confirmation(&self, email: &str) -> Result<()> {
        let mut accounts = self.accounts.lock();
        let account = accounts
            .get_mut(email)
            .ok_or(GatewayError::InvalidCredentials)?;
        account.confirmation_code = Some(six_digit_code());
        Ok(())
    }

    async fn request_password_reset(&self, email: &str) -> Result<()> {
        let mut accounts = self.accounts.lock();
        let account = accounts
            .get_mut(email)
            .ok_or(GatewayError::InvalidCredentials)?;
        account.reset_code = Some(six_digit_code());
        Ok(())
    }

    async fn submit_password_reset(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<()> {
        let mut accounts = self.accounts.lock();
        let account = accounts
            .get_mut(email)
            .ok_or(GatewayError::InvalidCredentials)?;
        if account.reset_code.as_deref() != Some(code) {
            return Err(GatewayError::CodeMismatch);
        }
        account.password = new_password.to_string();
        account.reset_code = None;
        Ok(())
    }

    async fn sign_out(&self) -> Result<()> {
        *self.session.lock() = None;
        Ok(())
    }

    async fn current_session(&self) -> Result<UserIdentity> {
        self.session
            .lock()
            .clone()
            .ok_or(GatewayError::NoActiveSession)
    }
}

#[derive(Clone)]
struct StoredObject {
    key: String,
    data: Bytes,
    content_type: String,
    signature: String,
}

/// An in-memory object store
///
/// Objects keep insertion order, which is what `list` reports as the
/// store's own order. Signed URLs resolve under a fake `memory://` scheme;
/// the signature is fixed per stored object so repeated resolution of the
/// same key yields the same URL.
#[derive(Clone, Default)]
pub struct MemoryObjectStore {
    objects: Arc<Mutex<Vec<StoredObject>>>,
    offline: Arc<Mutex<bool>>,
    put_calls: Arc<AtomicUsize>,
    list_calls: Arc<AtomicUsize>,
}

impl MemoryObjectStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle a simulated outage; all operations fail while offline
    pub fn set_offline(&self, offline: bool) {
        *self.offline.lock() = offline;
    }

    /// Number of stored objects
    pub fn len(&self) -> usize {
        self.objects.lock().len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.objects.lock().is_empty()
    }

    /// Whether a key currently holds an object
    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().iter().any(|o| o.key == key)
    }

    /// Stored keys, in listing order
    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().iter().map(|o| o.key.clone()).collect()
    }

    /// The content type an object was stored with
    pub fn content_type(&self, key: &str) -> Option<String> {
        self.objects
            .lock()
            .iter()
            .find(|o| o.key == key)
            .map(|o| o.content_type.clone())
    }

    /// How many `put` calls the store has served
    pub fn put_calls(&self) -> usize {
        self.put_calls.load(Ordering::SeqCst)
    }

    /// How many `list` calls the store has served
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Emulate the external pipeline: derive and store the thumbnail for an
    /// uploaded original. Returns the thumbnail key.
    pub fn generate_thumbnail(&self, original_key: &str) -> Result<String> {
        let thumb_key = photovault_keys::derive_thumbnail_key(original_key)
            .map_err(|e| GatewayError::Unknown(e.to_string()))?;

        let mut objects = self.objects.lock();
        let original = objects
            .iter()
            .find(|o| o.key == original_key)
            .ok_or_else(|| GatewayError::ResolutionUnavailable(original_key.to_string()))?;

        let thumbnail = StoredObject {
            key: thumb_key.clone(),
            data: original.data.clone(),
            content_type: original.content_type.clone(),
            signature: Uuid::new_v4().simple().to_string(),
        };
        objects.push(thumbnail);
        Ok(thumb_key)
    }

    fn ensure_online(&self) -> Result<()> {
        if *self.offline.lock() {
            return Err(GatewayError::NetworkUnavailable(
                "object store offline".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn list(&self, prefix: &str) -> Result<Vec<ObjectSummary>> {
        self.ensure_online()?;
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .objects
            .lock()
            .iter()
            .filter(|o| o.key.starts_with(prefix))
            .map(|o| ObjectSummary { key: o.key.clone() })
            .collect())
    }

    async fn presign_get(&self, key: &str) -> Result<SignedUrl> {
        self.ensure_online()?;
        let objects = self.objects.lock();
        objects
            .iter()
            .find(|o| o.key == key)
            .map(|o| SignedUrl {
                url: format!("memory://{}?sig={}", o.key, o.signature),
                expires_at: Utc::now() + Duration::minutes(15),
            })
            .ok_or_else(|| GatewayError::ResolutionUnavailable(key.to_string()))
    }

    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<()> {
        self.ensure_online()?;
        self.put_calls.fetch_add(1, Ordering::SeqCst);

        let mut objects = self.objects.lock();
        let stored = StoredObject {
            key: key.to_string(),
            data,
            content_type: content_type.to_string(),
            signature: Uuid::new_v4().simple().to_string(),
        };
        match objects.iter_mut().find(|o| o.key == key) {
            Some(existing) => *existing = stored,
            None => objects.push(stored),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_account_lifecycle() {
        let gateway = MemoryIdentityGateway::new();
        gateway.sign_up("ada@example.com", "Pass1word!").await.unwrap();

        // Unconfirmed accounts cannot sign in.
        let result = gateway.sign_in("ada@example.com", "Pass1word!").await;
        assert!(matches!(result, Err(GatewayError::NotConfirmed)));

        let code = gateway.confirmation_code("ada@example.com").unwrap();
        gateway.confirm_sign_up("ada@example.com", &code).await.unwrap();

        let identity = gateway.sign_in("ada@example.com", "Pass1word!").await.unwrap();
        assert_eq!(identity.email, "ada@example.com");
        assert_eq!(
            gateway.current_session().await.unwrap().subject_id,
            identity.subject_id
        );

        gateway.sign_out().await.unwrap();
        assert!(matches!(
            gateway.current_session().await,
            Err(GatewayError::NoActiveSession)
        ));
    }

    #[tokio::test]
    async fn test_wrong_confirmation_code() {
        let gateway = MemoryIdentityGateway::new();
        gateway.sign_up("ada@example.com", "Pass1word!").await.unwrap();

        let result = gateway.confirm_sign_up("ada@example.com", "not-it").await;
        assert!(matches!(result, Err(GatewayError::CodeMismatch)));
    }

    #[tokio::test]
    async fn test_password_reset_flow() {
        let gateway = MemoryIdentityGateway::with_confirmed_user("ada@example.com", "Old1pass!");
        gateway.request_password_reset("ada@example.com").await.unwrap();

        let code = gateway.reset_code("ada@example.com").unwrap();
        gateway
            .submit_password_reset("ada@example.com", &code, "New1pass!")
            .await
            .unwrap();

        assert!(matches!(
            gateway.sign_in("ada@example.com", "Old1pass!").await,
            Err(GatewayError::InvalidCredentials)
        ));
        gateway.sign_in("ada@example.com", "New1pass!").await.unwrap();
    }

    #[tokio::test]
    async fn test_list_is_prefix_scoped_and_ordered() {
        let store = MemoryObjectStore::new();
        store
            .put("u1/original/b-two.png", Bytes::from_static(b"2"), "image/png")
            .await
            .unwrap();
        store
            .put("u1/original/a-one.png", Bytes::from_static(b"1"), "image/png")
            .await
            .unwrap();
        store
            .put("u2/original/c-other.png", Bytes::from_static(b"3"), "image/png")
            .await
            .unwrap();

        let listed = store.list("u1/").await.unwrap();
        let keys: Vec<_> = listed.iter().map(|o| o.key.as_str()).collect();
        assert_eq!(keys, ["u1/original/b-two.png", "u1/original/a-one.png"]);
    }

    #[tokio::test]
    async fn test_presign_missing_key() {
        let store = MemoryObjectStore::new();
        let result = store.presign_get("u1/thumbnails/a-one.png").await;
        assert!(matches!(
            result,
            Err(GatewayError::ResolutionUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_generate_thumbnail() {
        let store = MemoryObjectStore::new();
        store
            .put("u1/original/a-cat.png", Bytes::from_static(b"png"), "image/png")
            .await
            .unwrap();

        let thumb_key = store.generate_thumbnail("u1/original/a-cat.png").unwrap();
        assert_eq!(thumb_key, "u1/thumbnails/a-cat.png");
        store.presign_get(&thumb_key).await.unwrap();
    }

    #[tokio::test]
    async fn test_offline_store_fails_everything() {
        let store = MemoryObjectStore::new();
        store.set_offline(true);

        assert!(matches!(
            store.list("u1/").await,
            Err(GatewayError::NetworkUnavailable(_))
        ));
        assert!(matches!(
            store
                .put("u1/original/a.png", Bytes::from_static(b"x"), "image/png")
                .await,
            Err(GatewayError::NetworkUnavailable(_))
        ));
    }
}
