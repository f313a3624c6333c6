//! Forced logout on the revoked-session error code.

mod support;

use appkey_client::{ProfileUpdate, SessionState};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer};

use support::{authenticate, client};

#[tokio::test]
async fn test_revoked_code_forces_logout_from_authenticated() {
    let server = MockServer::start().await;
    let client = client(&server);
    authenticate(&client, &server, "alice@example.com", "at-1").await;

    Mock::given(method("POST"))
        .and(path("/api/appuser/updateProfile"))
        .and(header("access-token", "at-1"))
        .respond_with(support::error_response(405, "invalid access token"))
        .expect(1)
        .mount(&server)
        .await;

    let update = ProfileUpdate {
        display_name: Some("Alice B".to_string()),
        ..ProfileUpdate::default()
    };
    let error = client.update_profile(&update).await.unwrap_err();
    assert!(error.is_code(405));

    // Any operation hitting a revoked session drops to anonymous.
    let snapshot = client.snapshot();
    assert_eq!(snapshot.state, SessionState::Anonymous);
    assert!(snapshot.user.is_none());
    assert!(!snapshot.is_loading);
}

#[tokio::test]
async fn test_revoked_code_forces_logout_from_signup_pending() {
    let server = MockServer::start().await;
    let client = client(&server);

    Mock::given(method("POST"))
        .and(path("/api/appuser/signupConfirm"))
        .respond_with(
            wiremock::ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "signup-token": "st-1" })),
        )
        .mount(&server)
        .await;
    client
        .confirm_signup(support::attestation(), "alice@example.com")
        .await
        .unwrap();

    Mock::given(method("POST"))
        .and(path("/api/appuser/signupComplete"))
        .respond_with(support::error_response(405, "invalid signup token"))
        .mount(&server)
        .await;

    let error = client
        .finish_signup("alice@example.com", "1234")
        .await
        .unwrap_err();
    assert!(error.is_code(405));
    assert_eq!(client.snapshot().state, SessionState::Anonymous);
}

#[tokio::test]
async fn test_logout_resets_to_anonymous() {
    let server = MockServer::start().await;
    let client = client(&server);
    authenticate(&client, &server, "alice@example.com", "at-1").await;

    client.logout();

    let snapshot = client.snapshot();
    assert_eq!(snapshot.state, SessionState::Anonymous);
    assert!(snapshot.user.is_none());
    assert!(snapshot.last_error.is_none());
}
