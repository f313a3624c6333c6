//! Social login probe and the missing-account fall-through.

mod support;

use appkey_client::{SessionState, SocialLogin, SocialProfile, SocialProvider};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use support::{auth_json, client};

fn profile() -> SocialProfile {
    SocialProfile {
        handle: "alice@example.com".to_string(),
        display_name: "Alice".to_string(),
        locale: Some("EN".to_string()),
    }
}

#[tokio::test]
async fn test_missing_account_falls_through_to_signup() {
    let server = MockServer::start().await;
    let client = client(&server);

    Mock::given(method("POST"))
        .and(path("/api/appuser/socialLogin"))
        .and(body_partial_json(json!({
            "token": "google-jwt",
            "provider": "google",
        })))
        .respond_with(support::error_response(603, "account does not exist"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/appuser/socialSignup"))
        .and(body_partial_json(json!({
            "token": "google-jwt",
            "provider": "google",
            "handle": "alice@example.com",
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(auth_json("alice@example.com", "at-social")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let user = client
        .social_sign_in("google-jwt", SocialProvider::Google, &profile())
        .await
        .unwrap();
    assert_eq!(user.handle, "alice@example.com");

    let snapshot = client.snapshot();
    assert_eq!(
        snapshot.state,
        SessionState::Authenticated {
            access_token: "at-social".to_string()
        }
    );
    // The 603 probe answer is an expected branch, not a surfaced failure.
    assert!(snapshot.last_error.is_none());
}

#[tokio::test]
async fn test_existing_account_authenticates_directly() {
    let server = MockServer::start().await;
    let client = client(&server);

    Mock::given(method("POST"))
        .and(path("/api/appuser/socialLogin"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(auth_json("alice@example.com", "at-social")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let outcome = client
        .social_login("google-jwt", SocialProvider::Google)
        .await
        .unwrap();
    assert!(matches!(outcome, SocialLogin::Authenticated(_)));
    assert_eq!(
        client.snapshot().state,
        SessionState::Authenticated {
            access_token: "at-social".to_string()
        }
    );
}

#[tokio::test]
async fn test_other_social_errors_are_recorded() {
    let server = MockServer::start().await;
    let client = client(&server);

    Mock::given(method("POST"))
        .and(path("/api/appuser/socialLogin"))
        .respond_with(support::error_response(700, "provider token expired"))
        .mount(&server)
        .await;

    let error = client
        .social_login("stale-jwt", SocialProvider::Apple)
        .await
        .unwrap_err();
    assert!(error.is_code(700));
    assert!(client.snapshot().last_error.unwrap().is_code(700));
    assert_eq!(client.snapshot().state, SessionState::Anonymous);
}
