//! Remote auth gateway: the backend boundary that verifies credentials and
//! issues tokens.
//!
//! DESIGN
//! ======
//! `AuthGateway` is the seam the session holder depends on. `HttpGateway`
//! talks to the real backend; `MockGateway` fabricates accounts in-process so
//! the app and tests can run without one. Both are used as
//! `Arc<dyn AuthGateway>`.

pub mod http;
pub mod mock;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::AuthResult;
use crate::models::{AuthResponse, User};

pub use http::HttpGateway;
pub use mock::MockGateway;

// =============================================================================
// ENDPOINTS
// =============================================================================

pub const LOGIN_PATH: &str = "/auth/login";
pub const SIGNUP_PATH: &str = "/auth/signup";
pub const LOGOUT_PATH: &str = "/auth/logout";
pub const REFRESH_PATH: &str = "/auth/refresh";
pub const ME_PATH: &str = "/auth/me";

// =============================================================================
// REQUEST BODIES
// =============================================================================

#[derive(Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest<'a> {
    pub full_name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

// =============================================================================
// TRAIT
// =============================================================================

#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// `POST /auth/login`.
    async fn login(&self, request: &LoginRequest<'_>) -> AuthResult<AuthResponse>;

    /// `POST /auth/signup`.
    async fn signup(&self, request: &SignupRequest<'_>) -> AuthResult<AuthResponse>;

    /// `POST /auth/logout`, authenticated with the stored bearer token.
    async fn logout(&self) -> AuthResult<()>;

    /// `GET /auth/me`: the account behind the stored bearer token.
    async fn me(&self) -> AuthResult<User>;

    /// `POST /auth/refresh`: trade a refresh token for a new token pair.
    async fn refresh(&self, refresh_token: &str) -> AuthResult<AuthResponse>;
}
