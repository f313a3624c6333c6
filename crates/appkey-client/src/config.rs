//! Client configuration for the AppKey service.
//!
//! Resolution precedence mirrors the rest of the stack: env var > explicit
//! value > default for the base URL; explicit value > env var for the app
//! token (there is no default token).

use anyhow::{Context, Result};

/// Production AppKey API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.appkey.io";

/// Env var overriding the base URL (mock servers, staging).
pub const BASE_URL_ENV: &str = "APPKEY_BASE_URL";

/// Env var supplying the application token.
pub const APP_TOKEN_ENV: &str = "APPKEY_APP_TOKEN";

/// Connection settings for [`crate::AppKeyClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Service origin, without the `/api/appuser` suffix.
    pub base_url: String,
    /// Static application identifier token sent on unauthenticated calls.
    pub app_token: String,
}

impl ClientConfig {
    /// Creates a config with an explicit base URL and app token.
    ///
    /// # Errors
    /// Returns an error if the base URL is not a well-formed URL.
    pub fn new(base_url: impl Into<String>, app_token: impl Into<String>) -> Result<Self> {
        let base_url = normalize_base_url(base_url.into())?;
        Ok(Self {
            base_url,
            app_token: app_token.into(),
        })
    }

    /// Resolves a config from optional explicit values and the environment.
    ///
    /// # Errors
    /// Returns an error if no app token is available or the base URL is
    /// malformed.
    pub fn resolve(base_url: Option<&str>, app_token: Option<&str>) -> Result<Self> {
        let base_url = resolve_base_url(base_url)?;
        let app_token = resolve_app_token(app_token)?;
        Ok(Self {
            base_url,
            app_token,
        })
    }
}

fn resolve_base_url(explicit: Option<&str>) -> Result<String> {
    if let Ok(env_url) = std::env::var(BASE_URL_ENV) {
        let trimmed = env_url.trim();
        if !trimmed.is_empty() {
            return normalize_base_url(trimmed.to_string());
        }
    }

    if let Some(url) = explicit {
        let trimmed = url.trim();
        if !trimmed.is_empty() {
            return normalize_base_url(trimmed.to_string());
        }
    }

    Ok(DEFAULT_BASE_URL.to_string())
}

fn resolve_app_token(explicit: Option<&str>) -> Result<String> {
    if let Some(token) = explicit {
        let trimmed = token.trim();
        if !trimmed.is_empty() {
            return Ok(trimmed.to_string());
        }
    }

    std::env::var(APP_TOKEN_ENV).context(format!(
        "No app token available. Pass one explicitly or set {APP_TOKEN_ENV}."
    ))
}

/// Validates the URL and strips a trailing slash so endpoint joins are
/// predictable.
fn normalize_base_url(url: String) -> Result<String> {
    url::Url::parse(&url).with_context(|| format!("Invalid AppKey base URL: {url}"))?;
    Ok(url.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test: explicit values pass through with a trailing slash stripped.
    #[test]
    fn test_new_normalizes_trailing_slash() {
        let config = ClientConfig::new("https://auth.example.com/", "tok-1").unwrap();
        assert_eq!(config.base_url, "https://auth.example.com");
        assert_eq!(config.app_token, "tok-1");
    }

    /// Test: malformed URLs are rejected up front.
    #[test]
    fn test_invalid_base_url() {
        let result = ClientConfig::new("not a url", "tok-1");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid AppKey base URL"));
    }

    /// Test: resolve falls back to the production default.
    #[test]
    fn test_resolve_default_base_url() {
        // The env override is not set in the test environment.
        let config = ClientConfig::resolve(None, Some("tok-1")).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    /// Test: a missing app token is an error naming the env var.
    #[test]
    fn test_resolve_missing_app_token() {
        let result = ClientConfig::resolve(Some("https://auth.example.com"), None);
        match result {
            Ok(config) => assert!(!config.app_token.is_empty()), // env var set externally
            Err(error) => assert!(error.to_string().contains(APP_TOKEN_ENV)),
        }
    }
}
