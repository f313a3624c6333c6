//! Shared helpers for wiremock integration tests.

#![allow(dead_code)]

use appkey_client::{AppKeyClient, ClientConfig, PasskeyAssertion, PasskeyAttestation};
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Application token every test client sends on unauthenticated calls.
pub const APP_TOKEN: &str = "app-token-1";

/// Builds a client pointed at the mock server.
pub fn client(server: &MockServer) -> AppKeyClient {
    let config = ClientConfig::new(server.uri(), APP_TOKEN).unwrap();
    AppKeyClient::new(config)
}

/// Bare user record JSON with a single registered passkey.
pub fn user_json(handle: &str) -> Value {
    json!({
        "handle": handle,
        "displayName": "Alice",
        "locale": "EN",
        "loginProvider": "handle",
        "authenticators": [{ "id": "cred-1", "name": "iPhone" }],
    })
}

/// Authenticated payload: user record plus the access-token key.
pub fn auth_json(handle: &str, token: &str) -> Value {
    let mut body = user_json(handle);
    body["access-token"] = json!(token);
    body
}

/// Service error envelope wrapped in a 400 response.
pub fn error_response(code: u32, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(400).set_body_json(json!({ "code": code, "message": message }))
}

/// Fabricated registration ceremony output.
pub fn attestation() -> PasskeyAttestation {
    PasskeyAttestation {
        credential_id: vec![1, 2, 3, 4],
        attestation_object: vec![0xa3, 0x01, 0x02],
        client_data_json: br#"{"type":"webauthn.create"}"#.to_vec(),
    }
}

/// Fabricated authentication ceremony output.
pub fn assertion() -> PasskeyAssertion {
    PasskeyAssertion {
        credential_id: vec![1, 2, 3, 4],
        client_data_json: br#"{"type":"webauthn.get"}"#.to_vec(),
        authenticator_data: vec![0x49, 0x96, 0x02, 0xd2],
        signature: vec![0x30, 0x45, 0x02, 0x20],
    }
}

/// Mounts a loginComplete mock and authenticates the client.
pub async fn authenticate(client: &AppKeyClient, server: &MockServer, handle: &str, token: &str) {
    Mock::given(method("POST"))
        .and(path("/api/appuser/loginComplete"))
        .and(header("app-token", APP_TOKEN))
        .and(body_partial_json(json!({ "handle": handle })))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_json(handle, token)))
        .expect(1)
        .mount(server)
        .await;

    client.complete_login(assertion(), handle).await.unwrap();
}
