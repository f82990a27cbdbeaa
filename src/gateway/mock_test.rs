use super::*;

fn login_request<'a>(email: &'a str) -> LoginRequest<'a> {
    LoginRequest { email, password: "secret" }
}

#[test]
fn generate_token_shape() {
    let a = generate_token();
    let b = generate_token();
    assert_eq!(a.len(), 64);
    assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    assert_ne!(a, b);
}

#[tokio::test]
async fn login_fabricates_placeholder_account() {
    let gateway = MockGateway::new();
    let resp = gateway.login(&login_request("a@b.com")).await.unwrap();
    assert_eq!(resp.user.email, "a@b.com");
    assert_eq!(resp.user.full_name, PLACEHOLDER_NAME);
    assert!(!resp.token.is_empty());
    assert!(resp.refresh_token.is_some());
}

#[tokio::test]
async fn signup_keeps_full_name() {
    let gateway = MockGateway::new();
    let resp = gateway
        .signup(&SignupRequest { full_name: "Ana Souza", email: "ana@lovele.app", password: "Abcdef1!" })
        .await
        .unwrap();
    assert_eq!(resp.user.full_name, "Ana Souza");
    assert_eq!(gateway.me().await.unwrap(), resp.user);
}

#[tokio::test]
async fn me_requires_session() {
    let err = MockGateway::new().me().await.unwrap_err();
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn logout_ends_server_session() {
    let gateway = MockGateway::new();
    gateway.login(&login_request("a@b.com")).await.unwrap();
    gateway.logout().await.unwrap();
    assert!(gateway.me().await.is_err());
}

#[tokio::test]
async fn refresh_rotates_tokens() {
    let gateway = MockGateway::new();
    let first = gateway.login(&login_request("a@b.com")).await.unwrap();
    let old_refresh = first.refresh_token.clone().unwrap();

    let second = gateway.refresh(&old_refresh).await.unwrap();
    assert_eq!(second.user, first.user);
    assert_ne!(second.token, first.token);

    // The previous refresh token is no longer accepted.
    assert!(gateway.refresh(&old_refresh).await.unwrap_err().is_unauthorized());
}

#[tokio::test]
async fn rejecting_gateway_fails_with_message() {
    let gateway = MockGateway::rejecting("Wrong email or password");
    let err = gateway.login(&login_request("a@b.com")).await.unwrap_err();
    assert_eq!(err.to_string(), "Wrong email or password");
    assert!(gateway.me().await.is_err());
}

#[tokio::test(start_paused = true)]
async fn delay_is_applied() {
    let gateway = MockGateway::new().with_delay(Duration::from_millis(1000));
    let started = tokio::time::Instant::now();
    gateway.login(&login_request("a@b.com")).await.unwrap();
    assert!(started.elapsed() >= Duration::from_millis(1000));
}

#[tokio::test]
async fn persisted_session_is_shared_between_instances() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mock").join("state.json");

    let first = MockGateway::persisted(&path);
    let issued = first.login(&login_request("a@b.com")).await.unwrap();
    assert!(path.exists());

    let second = MockGateway::persisted(&path);
    assert_eq!(second.state_file(), Some(path.as_path()));
    assert_eq!(second.me().await.unwrap(), issued.user);

    let refresh_token = issued.refresh_token.unwrap();
    let rotated = second.refresh(&refresh_token).await.unwrap();
    assert_eq!(rotated.user, issued.user);

    // The first instance rereads the file and sees the rotation.
    assert!(first.refresh(&refresh_token).await.unwrap_err().is_unauthorized());

    first.logout().await.unwrap();
    assert!(second.me().await.unwrap_err().is_unauthorized());
}

#[tokio::test]
async fn unreadable_state_file_is_server_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    std::fs::write(&path, "not json").unwrap();

    let err = MockGateway::persisted(&path).me().await.unwrap_err();
    assert!(matches!(err, AuthError::Gateway { status: 500, .. }));
}
