//! One-shot reauthenticate-and-retry policy for remote calls.
//!
//! Every remote call made by the session goes through [`ReauthPolicy::call`].
//! A failure classified as an auth failure, in a mode that can log in again,
//! triggers exactly one reauthentication and exactly one retry. Anything else
//! is returned unchanged. There is no backoff and no loop.

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use mmbridge_core::constants::CURRENT_USER_ID;
use mmbridge_core::error::{BridgeError, Result};
use mmbridge_core::traits::ChatApi;

use crate::config::AuthMode;

/// Reauthentication policy wrapping a [`ChatApi`].
///
/// # Concurrency
///
/// Reauthentication is coalesced. Each successful login bumps a generation
/// counter; a caller only logs in if the generation is unchanged since its
/// failed attempt started. Concurrent auth failures therefore trigger at most
/// one login between them.
pub struct ReauthPolicy {
    api: Arc<dyn ChatApi>,
    auth: AuthMode,
    request_timeout: Duration,
    authenticated: AtomicBool,
    generation: AtomicU64,
    auth_lock: Mutex<()>,
}

impl ReauthPolicy {
    /// Creates a policy; the session starts unauthenticated.
    pub fn new(api: Arc<dyn ChatApi>, auth: AuthMode, request_timeout: Duration) -> Self {
        Self {
            api,
            auth,
            request_timeout,
            authenticated: AtomicBool::new(false),
            generation: AtomicU64::new(0),
            auth_lock: Mutex::new(()),
        }
    }

    /// The wrapped remote API.
    pub fn api(&self) -> &dyn ChatApi {
        self.api.as_ref()
    }

    /// Returns true after a successful authentication and before logout or
    /// a failed reauthentication.
    pub fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::SeqCst)
    }

    /// Returns true if auth failures can be recovered by logging in again.
    pub fn supports_reauth(&self) -> bool {
        self.auth.supports_reauth()
    }

    /// Authenticates the session.
    ///
    /// Token mode verifies the token by fetching the current user; password
    /// mode logs in.
    #[instrument(skip(self))]
    pub async fn authenticate(&self) -> Result<()> {
        let _guard = self.auth_lock.lock().await;
        self.authenticate_locked().await
    }

    /// Logs out when a password session is active. Logout errors are ignored.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        let _guard = self.auth_lock.lock().await;
        if self.is_authenticated() && self.supports_reauth() {
            if let Err(err) = self.timed("logout", self.api.logout()).await {
                debug!(error = %err, "ignoring logout failure");
            }
        }
        self.authenticated.store(false, Ordering::SeqCst);
    }

    /// Runs a remote operation under the policy.
    ///
    /// `operation` builds a fresh attempt each time it is invoked; it is
    /// invoked at most twice.
    pub async fn call<T, F, Fut>(&self, name: &'static str, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let observed = self.generation.load(Ordering::SeqCst);

        let original = match self.timed(name, operation()).await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if !original.is_auth_error() || !self.supports_reauth() {
            return Err(original);
        }

        warn!(operation = name, error = %original, "auth failure, re-authenticating once");

        let retried = async {
            self.reauthenticate(observed).await?;
            self.timed(name, operation()).await
        }
        .await;

        retried.map_err(|retry| BridgeError::ReauthFailed {
            original: original.to_string(),
            retry: retry.to_string(),
        })
    }

    async fn reauthenticate(&self, observed: u64) -> Result<()> {
        let _guard = self.auth_lock.lock().await;
        if self.generation.load(Ordering::SeqCst) != observed {
            debug!("session already refreshed by a concurrent call");
            return Ok(());
        }
        self.authenticate_locked().await
    }

    async fn authenticate_locked(&self) -> Result<()> {
        let outcome = match &self.auth {
            AuthMode::Token(_) => self
                .timed("get_user", self.api.get_user(CURRENT_USER_ID))
                .await
                .map(|_| ()),
            AuthMode::Password { login, password } => {
                self.timed("login", self.api.login(login, password)).await
            }
        };

        match outcome {
            Ok(()) => {
                self.authenticated.store(true, Ordering::SeqCst);
                self.generation.fetch_add(1, Ordering::SeqCst);
                info!("Authenticated with Mattermost");
                Ok(())
            }
            Err(err) => {
                self.authenticated.store(false, Ordering::SeqCst);
                Err(BridgeError::AuthenticationFailed(err.to_string()))
            }
        }
    }

    async fn timed<T>(&self, name: &str, attempt: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::time::timeout(self.request_timeout, attempt)
            .await
            .map_err(|_| BridgeError::Timeout {
                operation: name.to_string(),
                seconds: self.request_timeout.as_secs(),
            })?
    }
}
