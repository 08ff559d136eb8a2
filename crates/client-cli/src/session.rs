//! Process-wide session state: who is signed in, and the one-shot bootstrap
//! that decides it.
//!
//! Exactly one [`Session`] exists per process. The surface that owns the
//! program flow (TUI loop or a subcommand handler) constructs it and passes
//! it by reference to whatever needs it; there is no global. The session is
//! a cache derived from the persisted credential, and the two are kept from
//! diverging: a rejected verification evicts the credential, and an evicted
//! credential demotes the session.

use shared::User;

use crate::api::{ApiClient, ApiError};
use crate::credentials::CredentialStore;

/// Where the app lands once the session settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Landing {
    Dashboard,
    Welcome,
}

#[derive(Debug)]
pub struct Session {
    user: Option<User>,
    is_loading: bool,
}

impl Session {
    /// Unauthenticated and loading, until the bootstrap settles it.
    pub fn new() -> Self {
        Self {
            user: None,
            is_loading: true,
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// One-shot startup verification: absent credential settles signed-out
    /// without a round trip; a present one is verified exactly once.
    /// Verification failure of any kind (network error, non-2xx, malformed
    /// body) evicts the credential and settles signed-out; there is no
    /// retry.
    pub async fn bootstrap(&mut self, api: &ApiClient, credentials: &CredentialStore) -> Landing {
        if credentials.get().is_none() {
            return self.settle_signed_out();
        }
        let outcome = api.verify_user().await;
        self.finish_bootstrap(outcome, credentials)
    }

    /// Settles without a verification round trip (no stored credential).
    pub fn settle_signed_out(&mut self) -> Landing {
        self.user = None;
        self.is_loading = false;
        Landing::Welcome
    }

    /// Applies a verification outcome. Split from [`Session::bootstrap`] so
    /// a result produced by a spawned task can be fed in directly.
    ///
    /// Success renews the credential's expiry horizon (sliding window) and
    /// lands on the dashboard; failure evicts the credential.
    pub fn finish_bootstrap(
        &mut self,
        outcome: Result<User, ApiError>,
        credentials: &CredentialStore,
    ) -> Landing {
        self.is_loading = false;
        match outcome {
            Ok(user) => {
                if let Err(e) = credentials.renew() {
                    tracing::warn!("Failed to renew credential expiry: {}", e);
                }
                tracing::info!("Session verified for {}", user.email);
                self.user = Some(user);
                Landing::Dashboard
            }
            Err(e) => {
                tracing::error!("Session verification failed, signing out: {}", e);
                credentials.remove();
                self.user = None;
                Landing::Welcome
            }
        }
    }

    /// Marks the session authenticated after a sign-in exchange that already
    /// stored a fresh credential. Does not itself touch the credential.
    pub fn login(&mut self, user: User) {
        self.user = Some(user);
        self.is_loading = false;
    }

    /// Evicts the credential and clears the user. Idempotent: signing out an
    /// already signed-out session changes nothing observable.
    pub fn logout(&mut self, credentials: &CredentialStore) {
        credentials.remove();
        self.user = None;
        self.is_loading = false;
    }
}
