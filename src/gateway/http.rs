//! Auth backend client over HTTP.
//!
//! Thin reqwest wrapper. Status handling and error-body parsing live in pure
//! functions so they can be tested without a server.

#[cfg(test)]
#[path = "http_test.rs"]
mod http_test;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::{AuthGateway, LOGIN_PATH, LOGOUT_PATH, LoginRequest, ME_PATH, REFRESH_PATH, RefreshRequest, SIGNUP_PATH, SignupRequest};
use crate::config::{Timeouts, normalize_base_url};
use crate::error::{AuthError, AuthResult};
use crate::models::{AuthResponse, User};
use crate::token_store::TokenStore;

pub struct HttpGateway {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
}

impl HttpGateway {
    /// # Errors
    ///
    /// Returns [`AuthError::HttpClientBuild`] if the reqwest client fails to build.
    pub fn new(base_url: &str, timeouts: Timeouts, tokens: Arc<dyn TokenStore>) -> AuthResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeouts.request())
            .connect_timeout(timeouts.connect())
            .build()
            .map_err(|e| AuthError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: normalize_base_url(Some(base_url)), tokens })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send<B>(&self, method: Method, path: &str, body: Option<&B>) -> AuthResult<String>
    where
        B: Serialize + Sync + ?Sized,
    {
        let url = endpoint_url(&self.base_url, path);
        let mut request = self
            .http
            .request(method.clone(), &url)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json");
        if let Some(token) = self.tokens.access_token().await? {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AuthError::Request(e.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AuthError::Request(e.to_string()))?;

        tracing::debug!(%method, path, status = status.as_u16(), "auth gateway response");
        check_status(status, &text)?;
        Ok(text)
    }

    async fn call<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> AuthResult<T>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let text = self.send(method, path, body).await?;
        parse_body(&text)
    }
}

#[async_trait]
impl AuthGateway for HttpGateway {
    async fn login(&self, request: &LoginRequest<'_>) -> AuthResult<AuthResponse> {
        self.call(Method::POST, LOGIN_PATH, Some(request)).await
    }

    async fn signup(&self, request: &SignupRequest<'_>) -> AuthResult<AuthResponse> {
        self.call(Method::POST, SIGNUP_PATH, Some(request)).await
    }

    async fn logout(&self) -> AuthResult<()> {
        self.send::<()>(Method::POST, LOGOUT_PATH, None).await?;
        Ok(())
    }

    async fn me(&self) -> AuthResult<User> {
        self.call::<(), _>(Method::GET, ME_PATH, None).await
    }

    async fn refresh(&self, refresh_token: &str) -> AuthResult<AuthResponse> {
        self.call(Method::POST, REFRESH_PATH, Some(&RefreshRequest { refresh_token }))
            .await
    }
}

// =============================================================================
// PURE HELPERS
// =============================================================================

fn endpoint_url(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

#[derive(serde::Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Pull the backend's `message` out of an error body, if it has one.
fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
}

fn check_status(status: StatusCode, body: &str) -> AuthResult<()> {
    if status.is_success() {
        return Ok(());
    }
    Err(AuthError::gateway(status.as_u16(), error_message(body)))
}

fn parse_body<T: DeserializeOwned>(text: &str) -> AuthResult<T> {
    serde_json::from_str(text).map_err(|e| AuthError::Parse(e.to_string()))
}
