//! User records as returned by the AppKey service.

use serde::{Deserialize, Serialize};

/// How the account was established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LoginProvider {
    /// Handle + passkey account (email, phone, or free text)
    #[default]
    Handle,
    Google,
    Apple,
    Anonymous,
}

/// A registered passkey descriptor.
///
/// The service only exposes the credential id and a user-chosen name;
/// key material never leaves the platform authenticator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authenticator {
    pub id: String,
    pub name: String,
}

/// Server-returned user profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppUser {
    /// Unique login identifier (email, phone, or free text per app config)
    pub handle: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    /// Optional username, set post-signup when the app enables usernames
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default)]
    pub login_provider: LoginProvider,
    /// Ordered list of registered passkeys
    #[serde(default)]
    pub authenticators: Vec<Authenticator>,
}

/// Response body for operations that authenticate the session.
///
/// The service embeds the user profile alongside the hyphenated
/// `access-token` key in a single flat object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthPayload {
    #[serde(rename = "access-token")]
    pub access_token: String,
    #[serde(flatten)]
    pub user: AppUser,
}

/// Response body for a successful signup confirmation.
///
/// The signup token proves the first factor completed; it is not yet an
/// authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupConfirmPayload {
    #[serde(rename = "signup-token")]
    pub signup_token: String,
}

/// Response body for operations that return a (possibly re-issued) profile.
///
/// Profile updates may rotate the access token; most other profile calls
/// return the bare user object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfilePayload {
    #[serde(default, rename = "access-token", skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(flatten)]
    pub user: AppUser,
}
