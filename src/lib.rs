//! Lovele client authentication core.
//!
//! ARCHITECTURE
//! ============
//! - `validation`: pure checks behind the login and signup forms.
//! - `session`: the session holder the UI talks to.
//! - `gateway`: backend boundary (HTTP client and in-process mock).
//! - `token_store`: where issued tokens live between calls and restarts.

pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod session;
pub mod token_store;
pub mod validation;

pub use config::{ClientConfig, GatewayKind};
pub use error::{AuthError, AuthResult};
pub use gateway::{AuthGateway, HttpGateway, MockGateway};
pub use models::{AuthResponse, SessionSnapshot, Tokens, User, UserPatch};
pub use session::SessionManager;
pub use token_store::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use validation::{
    Field, PasswordReport, PasswordStrength, ValidationResult, password_score, validate_email, validate_full_name,
    validate_login_form, validate_password, validate_password_match, validate_signup_form,
};
