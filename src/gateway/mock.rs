//! In-process auth backend.
//!
//! Accepts any credentials and fabricates the account, the way the app ran
//! before a backend existed. Login gets a placeholder display name; signup
//! keeps the one provided. Remembers the last signed-in account so `me` and
//! `refresh` behave like a real server session.
//!
//! The session lives in memory unless the gateway is built with
//! [`MockGateway::persisted`], in which case it is kept in a JSON file and
//! reloaded on every call. The CLI runs each command in a new process, so it
//! needs the persisted form for `whoami`, `refresh` and `logout` to see the
//! account `login` created.

#[cfg(test)]
#[path = "mock_test.rs"]
mod mock_test;

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use super::{AuthGateway, LoginRequest, SignupRequest};
use crate::error::{AuthError, AuthResult};
use crate::models::{AuthResponse, User};

pub const PLACEHOLDER_NAME: &str = "Test User";
const NOT_AUTHENTICATED: &str = "Not authenticated";

#[derive(Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MockSession {
    user: Option<User>,
    refresh_token: Option<String>,
}

#[derive(Default)]
pub struct MockGateway {
    delay: Duration,
    reject_with: Option<String>,
    session: Mutex<MockSession>,
    state_file: Option<PathBuf>,
}

impl MockGateway {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep the server-side session in `path` so separate processes share it.
    #[must_use]
    pub fn persisted(path: impl Into<PathBuf>) -> Self {
        Self { state_file: Some(path.into()), ..Self::default() }
    }

    #[must_use]
    pub fn state_file(&self) -> Option<&Path> {
        self.state_file.as_deref()
    }

    /// Sleep this long before answering each call.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Fail every login/signup with a 401 carrying `message`.
    #[must_use]
    pub fn rejecting(message: impl Into<String>) -> Self {
        Self { reject_with: Some(message.into()), ..Self::default() }
    }

    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }

    fn check_rejection(&self) -> AuthResult<()> {
        match &self.reject_with {
            Some(message) => Err(AuthError::gateway(401, Some(message.clone()))),
            None => Ok(()),
        }
    }

    /// Lock the session, refreshed from the state file when there is one.
    async fn lock_session(&self) -> AuthResult<MutexGuard<'_, MockSession>> {
        let mut session = self.session.lock().await;
        if let Some(path) = &self.state_file {
            *session = read_state(path).await?;
        }
        Ok(session)
    }

    async fn save(&self, session: &MockSession) -> AuthResult<()> {
        match &self.state_file {
            Some(path) => write_state(path, session).await,
            None => Ok(()),
        }
    }

    async fn issue(&self, user: User) -> AuthResult<AuthResponse> {
        let token = generate_token();
        let refresh_token = generate_token();
        let mut session = self.lock_session().await?;
        session.user = Some(user.clone());
        session.refresh_token = Some(refresh_token.clone());
        self.save(&session).await?;
        Ok(AuthResponse { user, token, refresh_token: Some(refresh_token) })
    }
}

fn state_error(path: &Path, err: impl std::fmt::Display) -> AuthError {
    AuthError::gateway(500, Some(format!("mock state {}: {err}", path.display())))
}

async fn read_state(path: &Path) -> AuthResult<MockSession> {
    match tokio::fs::read_to_string(path).await {
        Ok(raw) => serde_json::from_str(&raw).map_err(|e| state_error(path, e)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(MockSession::default()),
        Err(e) => Err(state_error(path, e)),
    }
}

async fn write_state(path: &Path, session: &MockSession) -> AuthResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| state_error(parent, e))?;
    }
    let body = serde_json::to_vec(session).map_err(|e| state_error(path, e))?;
    tokio::fs::write(path, body)
        .await
        .map_err(|e| state_error(path, e))
}

fn new_user(email: &str, full_name: &str) -> User {
    User {
        id: Uuid::new_v4().to_string(),
        email: email.to_owned(),
        full_name: full_name.to_owned(),
        profile_image: None,
        bio: None,
        created_at: OffsetDateTime::now_utc(),
    }
}

/// Random 32-byte hex token.
#[must_use]
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[async_trait]
impl AuthGateway for MockGateway {
    async fn login(&self, request: &LoginRequest<'_>) -> AuthResult<AuthResponse> {
        self.pause().await;
        self.check_rejection()?;
        self.issue(new_user(request.email, PLACEHOLDER_NAME)).await
    }

    async fn signup(&self, request: &SignupRequest<'_>) -> AuthResult<AuthResponse> {
        self.pause().await;
        self.check_rejection()?;
        self.issue(new_user(request.email, request.full_name)).await
    }

    async fn logout(&self) -> AuthResult<()> {
        self.pause().await;
        let mut session = self.lock_session().await?;
        session.user = None;
        session.refresh_token = None;
        self.save(&session).await
    }

    async fn me(&self) -> AuthResult<User> {
        self.pause().await;
        self.lock_session()
            .await?
            .user
            .clone()
            .ok_or_else(|| AuthError::gateway(401, Some(NOT_AUTHENTICATED.to_owned())))
    }

    async fn refresh(&self, refresh_token: &str) -> AuthResult<AuthResponse> {
        self.pause().await;
        let user = {
            let session = self.lock_session().await?;
            match (&session.user, &session.refresh_token) {
                (Some(user), Some(current)) if current == refresh_token => user.clone(),
                _ => return Err(AuthError::gateway(401, Some(NOT_AUTHENTICATED.to_owned()))),
            }
        };
        self.issue(user).await
    }
}
