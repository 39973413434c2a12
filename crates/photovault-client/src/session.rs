//! Session coordination
//!
//! A state machine over sign-in/out events. The coordinator owns the
//! current-user cell; nothing else mutates it. It assumes a single
//! in-flight auth operation at a time — the surrounding collaborator must
//! not start a second one while a transition is pending. It is not
//! re-entrant-safe.

use crate::{PasswordPolicy, Result};
use parking_lot::Mutex;
use photovault_gateway::{IdentityGateway, UserIdentity};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Authentication state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// No authenticated user; the initial state
    SignedOut,
    /// An auth operation is in flight
    Transitioning,
    /// A user is authenticated
    SignedIn,
}

#[derive(Debug)]
struct Session {
    identity: Option<UserIdentity>,
    state: SessionState,
}

/// The session state machine
pub struct SessionCoordinator<I> {
    gateway: Arc<I>,
    policy: PasswordPolicy,
    session: Mutex<Session>,
}

impl<I: IdentityGateway> SessionCoordinator<I> {
    /// Create a coordinator in the `SignedOut` state
    pub fn new(gateway: Arc<I>, policy: PasswordPolicy) -> Self {
        Self {
            gateway,
            policy,
            session: Mutex::new(Session {
                identity: None,
                state: SessionState::SignedOut,
            }),
        }
    }

    /// Current authentication state
    pub fn state(&self) -> SessionState {
        self.session.lock().state
    }

    /// The signed-in user, if any
    pub fn current_user(&self) -> Option<UserIdentity> {
        self.session.lock().identity.clone()
    }

    fn settle(&self, identity: Option<UserIdentity>) {
        let mut session = self.session.lock();
        session.state = match identity {
            Some(_) => SessionState::SignedIn,
            None => SessionState::SignedOut,
        };
        session.identity = identity;
    }

    /// Attempt to restore a prior session on process start.
    ///
    /// Success settles directly in `SignedIn`; any failure — including the
    /// ordinary no-active-session case — settles in `SignedOut` without
    /// surfacing an error.
    pub async fn restore(&self) -> Option<UserIdentity> {
        self.session.lock().state = SessionState::Transitioning;

        match self.gateway.current_session().await {
            Ok(identity) => {
                info!(subject = %identity.subject_id, "session restored");
                self.settle(Some(identity.clone()));
                Some(identity)
            }
            Err(err) => {
                if err.is_no_session() {
                    debug!("no existing session");
                } else {
                    warn!("session restore failed: {err}");
                }
                self.settle(None);
                None
            }
        }
    }

    /// Sign in with email and password.
    ///
    /// Failure never leaves the machine anywhere but `SignedOut`.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<UserIdentity> {
        self.session.lock().state = SessionState::Transitioning;

        match self.gateway.sign_in(email, password).await {
            Ok(identity) => {
                info!(subject = %identity.subject_id, "signed in");
                self.settle(Some(identity.clone()));
                Ok(identity)
            }
            Err(err) => {
                self.settle(None);
                Err(err.into())
            }
        }
    }

    /// Sign out.
    ///
    /// The local session is destroyed unconditionally; a gateway failure is
    /// still reported, but the machine always ends `SignedOut`.
    pub async fn sign_out(&self) -> Result<()> {
        self.session.lock().state = SessionState::Transitioning;

        let result = self.gateway.sign_out().await;
        self.settle(None);
        info!("signed out");
        result.map_err(Into::into)
    }

    /// Register a new account; the password is validated locally first.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<()> {
        self.policy.check(password)?;
        self.gateway.sign_up(email, password).await?;
        Ok(())
    }

    /// Confirm a registration with the emailed code.
    pub async fn confirm_sign_up(&self, email: &str, code: &str) -> Result<()> {
        self.gateway.confirm_sign_up(email, code).await?;
        Ok(())
    }

    /// Send a fresh confirmation code.
    pub async fn resend_confirmation(&self, email: &str) -> Result<()> {
        self.gateway.resend_confirmation(email).await?;
        Ok(())
    }

    /// Begin a password reset.
    pub async fn request_password_reset(&self, email: &str) -> Result<()> {
        self.gateway.request_password_reset(email).await?;
        Ok(())
    }

    /// Complete a password reset; the new password is validated locally
    /// first.
    pub async fn submit_password_reset(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<()> {
        self.policy.check(new_password)?;
        self.gateway
            .submit_password_reset(email, code, new_password)
            .await?;
        Ok(())
    }
}
