//! Persisted access/refresh tokens.
//!
//! DESIGN
//! ======
//! The session holder writes tokens after a successful login/signup/refresh
//! and clears them on logout. The HTTP gateway only reads them, to attach the
//! bearer header.

#[cfg(test)]
#[path = "token_store_test.rs"]
mod token_store_test;

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{AuthError, AuthResult};
use crate::models::Tokens;

#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Currently stored tokens, if any.
    async fn get(&self) -> AuthResult<Option<Tokens>>;

    /// Replace the stored tokens.
    async fn set(&self, tokens: &Tokens) -> AuthResult<()>;

    /// Remove stored tokens. Succeeds when nothing is stored.
    async fn clear(&self) -> AuthResult<()>;

    async fn access_token(&self) -> AuthResult<Option<String>> {
        Ok(self.get().await?.map(|t| t.access_token))
    }
}

// =============================================================================
// MEMORY
// =============================================================================

/// Process-lifetime store. Tokens are lost on exit.
#[derive(Default)]
pub struct MemoryTokenStore {
    tokens: RwLock<Option<Tokens>>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn get(&self) -> AuthResult<Option<Tokens>> {
        Ok(self.tokens.read().await.clone())
    }

    async fn set(&self, tokens: &Tokens) -> AuthResult<()> {
        *self.tokens.write().await = Some(tokens.clone());
        Ok(())
    }

    async fn clear(&self) -> AuthResult<()> {
        *self.tokens.write().await = None;
        Ok(())
    }
}

// =============================================================================
// FILE
// =============================================================================

/// JSON file store so tokens survive restarts.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn io_error(path: &Path, err: &std::io::Error) -> AuthError {
    AuthError::TokenStore(format!("{}: {err}", path.display()))
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn get(&self) -> AuthResult<Option<Tokens>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(&self.path, &e)),
        };
        let tokens = serde_json::from_str(&raw)
            .map_err(|e| AuthError::TokenStore(format!("{}: {e}", self.path.display())))?;
        Ok(Some(tokens))
    }

    async fn set(&self, tokens: &Tokens) -> AuthResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error(parent, &e))?;
        }
        let body = serde_json::to_vec(tokens).map_err(|e| AuthError::TokenStore(e.to_string()))?;
        tokio::fs::write(&self.path, body)
            .await
            .map_err(|e| io_error(&self.path, &e))
    }

    async fn clear(&self) -> AuthResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(&self.path, &e)),
        }
    }
}
