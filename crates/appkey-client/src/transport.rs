//! HTTP transport for the AppKey REST API.
//!
//! One round trip per call, no automatic retry. Every request carries
//! exactly one identity header chosen by the session's credential policy;
//! the caller never picks the credential.

use std::sync::Arc;

use appkey_types::{ErrorEnvelope, codes};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::{AuthError, AuthResult};
use crate::session::Session;

/// Whether a failure is recorded on the session for observers.
///
/// Probe-style calls (the social account-existence probe, the username
/// availability check) run quiet because their callers branch on the
/// answer instead of surfacing a generic failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCapture {
    Record,
    Quiet,
}

pub(crate) struct Transport {
    http: reqwest::Client,
    base_url: String,
    app_token: String,
    session: Arc<Session>,
}

impl Transport {
    pub(crate) fn new(config: &ClientConfig, session: Arc<Session>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.clone(),
            app_token: config.app_token.clone(),
            session,
        }
    }

    /// Sends one request and decodes the response envelope.
    ///
    /// A revoked-session error (code 405) resets the session to anonymous
    /// no matter which operation produced it, before the error is returned.
    pub(crate) async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
        capture: ErrorCapture,
    ) -> AuthResult<T> {
        let url = format!("{}/api/appuser/{endpoint}", self.base_url);
        let (header, value) = self.session.credential(&self.app_token);
        tracing::debug!(%endpoint, credential = header, "api request");

        let mut request = self
            .http
            .request(method, &url)
            .header("Accept", "application/json")
            .header(header, value);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                let error = AuthError::transport(format!("Request to {endpoint} failed: {e}"));
                return Err(self.fail(error, capture));
            }
        };

        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                let error = AuthError::transport(format!("Reading {endpoint} response: {e}"));
                return Err(self.fail(error, capture));
            }
        };

        if !status.is_success() {
            let error = match serde_json::from_str::<ErrorEnvelope>(&text) {
                Ok(envelope) => {
                    if envelope.code == codes::INVALID_ACCESS_TOKEN {
                        tracing::warn!(%endpoint, "session revoked by server, forcing logout");
                        self.session.reset();
                    }
                    AuthError::api(&envelope)
                }
                Err(_) => AuthError::http_status(status.as_u16(), &text),
            };
            return Err(self.fail(error, capture));
        }

        serde_json::from_str(&text).map_err(|e| {
            let error = AuthError::parse(format!("Decoding {endpoint} response: {e}"), &text);
            self.fail(error, capture)
        })
    }

    /// Records the error on the session when the capture policy asks for it.
    fn fail(&self, error: AuthError, capture: ErrorCapture) -> AuthError {
        if capture == ErrorCapture::Record {
            self.session.record_error(&error);
        }
        error
    }
}
