//! Error type shared by the session holder, gateways and token stores.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use crate::validation::ValidationResult;

/// Errors produced by authentication operations.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Credentials failed the pre-flight check; no request was sent.
    #[error("invalid credentials: {0}")]
    Validation(ValidationResult),

    /// The auth backend answered with a non-success status.
    #[error("{message}")]
    Gateway { status: u16, message: String },

    /// The HTTP request could not be completed.
    #[error("request failed: {0}")]
    Request(String),

    /// The response body could not be decoded.
    #[error("response parse failed: {0}")]
    Parse(String),

    /// Another login/signup/restore/refresh is still running on this session.
    #[error("another authentication request is already in progress")]
    OperationInProgress,

    /// The operation needs a stored token and none is present.
    #[error("no stored credentials")]
    MissingToken,

    /// Reading or writing persisted tokens failed.
    #[error("token store error: {0}")]
    TokenStore(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    Config(String),
}

impl AuthError {
    /// Build a gateway error from a status code, defaulting the message the
    /// way the backend's clients expect.
    #[must_use]
    pub fn gateway(status: u16, message: Option<String>) -> Self {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| format!("HTTP Error: {status}"));
        Self::Gateway { status, message }
    }

    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "E_VALIDATION",
            Self::Gateway { .. } => "E_GATEWAY",
            Self::Request(_) => "E_REQUEST",
            Self::Parse(_) => "E_PARSE",
            Self::OperationInProgress => "E_IN_PROGRESS",
            Self::MissingToken => "E_MISSING_TOKEN",
            Self::TokenStore(_) => "E_TOKEN_STORE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
            Self::Config(_) => "E_CONFIG",
        }
    }

    /// `true` when the backend rejected the presented credentials or token.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Gateway { status: 401 | 403, .. })
    }
}

pub type AuthResult<T> = Result<T, AuthError>;
