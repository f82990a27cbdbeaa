use super::*;
use crate::validation::validate_login_form;

#[test]
fn gateway_uses_backend_message() {
    let err = AuthError::gateway(400, Some("Email already registered".to_owned()));
    assert_eq!(err.to_string(), "Email already registered");
}

#[test]
fn gateway_defaults_missing_message() {
    assert_eq!(AuthError::gateway(502, None).to_string(), "HTTP Error: 502");
}

#[test]
fn gateway_defaults_blank_message() {
    assert_eq!(AuthError::gateway(500, Some("  ".to_owned())).to_string(), "HTTP Error: 500");
}

#[test]
fn unauthorized_statuses() {
    assert!(AuthError::gateway(401, None).is_unauthorized());
    assert!(AuthError::gateway(403, None).is_unauthorized());
    assert!(!AuthError::gateway(500, None).is_unauthorized());
    assert!(!AuthError::Request("timeout".into()).is_unauthorized());
}

#[test]
fn validation_error_lists_fields() {
    let err = AuthError::Validation(validate_login_form("", "secret"));
    assert_eq!(err.to_string(), "invalid credentials: email: Email is required");
    assert_eq!(err.error_code(), "E_VALIDATION");
}

#[test]
fn error_codes_are_distinct() {
    let codes = [
        AuthError::gateway(400, None).error_code(),
        AuthError::Request(String::new()).error_code(),
        AuthError::Parse(String::new()).error_code(),
        AuthError::OperationInProgress.error_code(),
        AuthError::MissingToken.error_code(),
        AuthError::TokenStore(String::new()).error_code(),
        AuthError::HttpClientBuild(String::new()).error_code(),
        AuthError::Config(String::new()).error_code(),
    ];
    let unique: std::collections::HashSet<_> = codes.iter().collect();
    assert_eq!(unique.len(), codes.len());
}
