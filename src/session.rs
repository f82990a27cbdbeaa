//! Session holder: single source of truth for who is signed in.
//!
//! SYSTEM CONTEXT
//! ==============
//! UI layers hold an `Arc<SessionManager>` and either query it directly or
//! `subscribe()` to a watch channel of [`SessionSnapshot`]s to re-render on
//! sign-in, sign-out and loading changes.
//!
//! DESIGN
//! ======
//! The holder owns the in-memory user and coordinates two collaborators: the
//! [`AuthGateway`] that verifies credentials and the [`TokenStore`] that
//! persists the issued tokens. Nothing is cached beyond the current user.
//!
//! TRADE-OFFS
//! ==========
//! One auth call at a time per holder. `login`, `signup`, `restore` and
//! `refresh_tokens` fail fast with `OperationInProgress` instead of queueing,
//! so a double-tapped submit cannot race two sessions into place. `logout`
//! waits its turn instead, because it must always complete.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard, watch};

use crate::config::{ClientConfig, GatewayKind};
use crate::error::{AuthError, AuthResult};
use crate::gateway::{AuthGateway, HttpGateway, LoginRequest, MockGateway, SignupRequest};
use crate::models::{AuthResponse, SessionSnapshot, User, UserPatch};
use crate::token_store::{FileTokenStore, MemoryTokenStore, TokenStore};
use crate::validation::check_credentials;

pub struct SessionManager {
    gateway: Arc<dyn AuthGateway>,
    tokens: Arc<dyn TokenStore>,
    state: watch::Sender<SessionSnapshot>,
    in_flight: Mutex<()>,
}

/// Held for the duration of an auth call; clears `loading` when dropped.
struct InFlight<'a> {
    state: &'a watch::Sender<SessionSnapshot>,
    _guard: MutexGuard<'a, ()>,
}

impl<'a> InFlight<'a> {
    fn new(state: &'a watch::Sender<SessionSnapshot>, guard: MutexGuard<'a, ()>) -> Self {
        state.send_if_modified(|s| !std::mem::replace(&mut s.loading, true));
        Self { state, _guard: guard }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.state
            .send_if_modified(|s| std::mem::replace(&mut s.loading, false));
    }
}

impl SessionManager {
    #[must_use]
    pub fn new(gateway: Arc<dyn AuthGateway>, tokens: Arc<dyn TokenStore>) -> Self {
        let (state, _) = watch::channel(SessionSnapshot::default());
        Self { gateway, tokens, state, in_flight: Mutex::new(()) }
    }

    /// Wire a holder from config: file or memory token store, HTTP or mock
    /// gateway, the mock optionally backed by a state file.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &ClientConfig) -> AuthResult<Self> {
        let tokens: Arc<dyn TokenStore> = match &config.token_file {
            Some(path) => Arc::new(FileTokenStore::new(path)),
            None => Arc::new(MemoryTokenStore::new()),
        };
        let gateway: Arc<dyn AuthGateway> = match config.gateway {
            GatewayKind::Http => Arc::new(HttpGateway::new(&config.api_base_url, config.timeouts, Arc::clone(&tokens))?),
            GatewayKind::Mock => {
                let mock = match &config.mock_state_file {
                    Some(path) => MockGateway::persisted(path),
                    None => MockGateway::new(),
                };
                Arc::new(mock.with_delay(config.mock_delay))
            }
        };
        Ok(Self::new(gateway, tokens))
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.state.borrow().is_signed_in()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    /// Receive every change to the session snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn token_store(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    // =========================================================================
    // OPERATIONS
    // =========================================================================

    /// Sign in with email and password.
    ///
    /// On failure the current session, if any, is left as it was.
    ///
    /// # Errors
    ///
    /// [`AuthError::Validation`] when a field is missing or the email is
    /// malformed (no request is sent), [`AuthError::OperationInProgress`] when
    /// another call is running, or whatever the gateway returned.
    pub async fn login(&self, email: &str, password: &str) -> AuthResult<User> {
        let check = check_credentials(None, email, password);
        if !check.is_valid {
            return Err(AuthError::Validation(check));
        }
        let _busy = self.begin()?;

        let response = self
            .gateway
            .login(&LoginRequest { email, password })
            .await
            .inspect_err(|e| tracing::warn!(error = %e, code = e.error_code(), "login failed"))?;
        Ok(self.establish(response, "login").await)
    }

    /// Create an account and sign in to it.
    ///
    /// Name length rules belong to the signup form; only presence is checked here.
    ///
    /// # Errors
    ///
    /// Same as [`SessionManager::login`].
    pub async fn signup(&self, full_name: &str, email: &str, password: &str) -> AuthResult<User> {
        let check = check_credentials(Some(full_name), email, password);
        if !check.is_valid {
            return Err(AuthError::Validation(check));
        }
        let _busy = self.begin()?;

        let response = self
            .gateway
            .signup(&SignupRequest { full_name, email, password })
            .await
            .inspect_err(|e| tracing::warn!(error = %e, code = e.error_code(), "signup failed"))?;
        Ok(self.establish(response, "signup").await)
    }

    /// End the session. Always leaves the holder signed out.
    ///
    /// Backend and token-store failures are logged, not returned.
    pub async fn logout(&self) {
        let _busy = InFlight::new(&self.state, self.in_flight.lock().await);

        match self.tokens.access_token().await {
            Ok(Some(_)) => {
                if let Err(e) = self.gateway.logout().await {
                    tracing::warn!(error = %e, "backend logout failed; clearing local session anyway");
                }
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "token lookup failed during logout"),
        }
        if let Err(e) = self.tokens.clear().await {
            tracing::warn!(error = %e, "token clear failed during logout");
        }

        let was_signed_in = self.state.send_if_modified(|s| s.user.take().is_some());
        if was_signed_in {
            tracing::info!("signed out");
        }
    }

    /// Merge `patch` into the signed-in user. Returns the updated user, or
    /// `None` without touching anything when signed out.
    pub fn update_profile(&self, patch: UserPatch) -> Option<User> {
        let mut updated = None;
        self.state.send_if_modified(|s| match s.user.as_mut() {
            Some(user) => {
                user.apply(patch);
                updated = Some(user.clone());
                true
            }
            None => false,
        });
        updated
    }

    /// Resume a session from stored tokens, e.g. at app start.
    ///
    /// Returns `Ok(None)` when nothing is stored or the backend no longer
    /// accepts the token; the stale token is dropped in the latter case.
    ///
    /// # Errors
    ///
    /// [`AuthError::OperationInProgress`], token-store failures, and gateway
    /// failures other than 401/403.
    pub async fn restore(&self) -> AuthResult<Option<User>> {
        let _busy = self.begin()?;

        if self.tokens.access_token().await?.is_none() {
            return Ok(None);
        }
        match self.gateway.me().await {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "session restored");
                self.state.send_modify(|s| s.user = Some(user.clone()));
                Ok(Some(user))
            }
            Err(e) if e.is_unauthorized() => {
                tracing::info!("stored token rejected; discarding");
                self.tokens.clear().await?;
                self.state.send_if_modified(|s| s.user.take().is_some());
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Trade the stored refresh token for a new token pair.
    ///
    /// # Errors
    ///
    /// [`AuthError::MissingToken`] when no refresh token is stored, plus the
    /// errors of [`SessionManager::restore`].
    pub async fn refresh_tokens(&self) -> AuthResult<User> {
        let _busy = self.begin()?;

        let refresh_token = self
            .tokens
            .get()
            .await?
            .and_then(|t| t.refresh_token)
            .ok_or(AuthError::MissingToken)?;
        let response = self.gateway.refresh(&refresh_token).await?;
        self.tokens.set(&response.tokens()).await?;
        self.state.send_modify(|s| s.user = Some(response.user.clone()));
        Ok(response.user)
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    fn begin(&self) -> AuthResult<InFlight<'_>> {
        let guard = self
            .in_flight
            .try_lock()
            .map_err(|_| AuthError::OperationInProgress)?;
        Ok(InFlight::new(&self.state, guard))
    }

    async fn establish(&self, response: AuthResponse, via: &'static str) -> User {
        if let Err(e) = self.tokens.set(&response.tokens()).await {
            tracing::warn!(error = %e, "token persist failed; session will not survive restart");
        }
        let user = response.user;
        tracing::info!(user_id = %user.id, via, "signed in");
        self.state.send_modify(|s| s.user = Some(user.clone()));
        user
    }
}
