//! The photo library facade
//!
//! Composition root the presentation layer drives. Session transitions
//! drive gallery refreshes: restore and sign-in each trigger exactly one
//! sync pass, sign-out clears the gallery. The facade owns no
//! synchronization logic beyond that wiring.

use crate::{
    Config, CoreError, GalleryEngine, GallerySnapshot, Photo, Result, SessionCoordinator,
    SessionState,
};
use photovault_gateway::{IdentityGateway, ObjectStore, UserIdentity};
use std::sync::Arc;
use tracing::debug;

/// A private photo library bound to one identity and one storage gateway
pub struct PhotoLibrary<I, S> {
    sessions: SessionCoordinator<I>,
    gallery: GalleryEngine<S>,
}

impl<I: IdentityGateway, S: ObjectStore + 'static> PhotoLibrary<I, S> {
    /// Wire a library from its configuration and gateways
    pub fn new(config: Config, identity: Arc<I>, store: Arc<S>) -> Self {
        Self {
            sessions: SessionCoordinator::new(identity, config.identity.password_policy.clone()),
            gallery: GalleryEngine::new(store, config.refresh_delay()),
        }
    }

    /// Restore a prior session on process start.
    ///
    /// A restored session triggers one gallery refresh; otherwise the
    /// library stays signed out with a cleared gallery.
    pub async fn start(&self) -> GallerySnapshot {
        match self.sessions.restore().await {
            Some(identity) => self.gallery.refresh(&identity.subject_id).await,
            None => {
                debug!("starting signed out");
                self.gallery.snapshot()
            }
        }
    }

    /// Sign in and run exactly one gallery refresh.
    ///
    /// A refresh failure does not fail the sign-in; it shows up in the
    /// gallery snapshot instead.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<UserIdentity> {
        let identity = self.sessions.sign_in(email, password).await?;
        self.gallery.refresh(&identity.subject_id).await;
        Ok(identity)
    }

    /// Sign out and clear the gallery.
    ///
    /// The gallery is cleared regardless of the provider's answer.
    pub async fn sign_out(&self) -> Result<()> {
        let result = self.sessions.sign_out().await;
        self.gallery.clear();
        result
    }

    /// Register a new account.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<()> {
        self.sessions.sign_up(email, password).await
    }

    /// Confirm a registration with the emailed code.
    pub async fn confirm_sign_up(&self, email: &str, code: &str) -> Result<()> {
        self.sessions.confirm_sign_up(email, code).await
    }

    /// Send a fresh confirmation code.
    pub async fn resend_confirmation(&self, email: &str) -> Result<()> {
        self.sessions.resend_confirmation(email).await
    }

    /// Begin a password reset.
    pub async fn request_password_reset(&self, email: &str) -> Result<()> {
        self.sessions.request_password_reset(email).await
    }

    /// Complete a password reset with the emailed code.
    pub async fn submit_password_reset(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<()> {
        self.sessions
            .submit_password_reset(email, code, new_password)
            .await
    }

    /// Run a gallery sync pass for the signed-in user.
    pub async fn refresh(&self) -> Result<GallerySnapshot> {
        let identity = self
            .sessions
            .current_user()
            .ok_or(CoreError::NotAuthenticated)?;
        Ok(self.gallery.refresh(&identity.subject_id).await)
    }

    /// Upload the selected photo into the signed-in user's partition.
    pub async fn upload(&self, selection: Option<Photo>) -> Result<String> {
        let identity = self
            .sessions
            .current_user()
            .ok_or(CoreError::NotAuthenticated)?;
        let photo = selection.ok_or(CoreError::NoFileSelected)?;
        self.gallery.upload(&identity.subject_id, photo).await
    }

    /// The current gallery state
    pub fn gallery(&self) -> GallerySnapshot {
        self.gallery.snapshot()
    }

    /// The current authentication state
    pub fn session_state(&self) -> SessionState {
        self.sessions.state()
    }

    /// The signed-in user, if any
    pub fn current_user(&self) -> Option<UserIdentity> {
        self.sessions.current_user()
    }
}
