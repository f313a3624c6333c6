//! Passkey ceremony challenges and completion payloads.
//!
//! Binary fields (challenge, credential ids, attestation/assertion blobs)
//! cross the wire base64url-encoded without padding. These types hold the
//! encoded text form; the client's ceremony codec converts to and from raw
//! bytes at the platform-authenticator boundary.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Relying party identification inside a registration challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelyingParty {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
}

/// The account a registration ceremony is tagged to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeUser {
    /// Opaque user id, base64url
    pub id: String,
    /// The handle this ceremony registers a credential for
    pub name: String,
    #[serde(default)]
    pub display_name: String,
}

/// Server-issued challenge for registering a new passkey
/// (`PublicKeyCredentialCreationOptions` shape).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationChallenge {
    /// Base64url challenge bytes, consumed exactly once
    pub challenge: String,
    pub rp: RelyingParty,
    pub user: ChallengeUser,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attestation: Option<String>,
    /// Algorithm list and other creation options the client passes through
    /// to the authenticator untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Credential reference inside an assertion challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowCredential {
    pub id: String,
    #[serde(rename = "type")]
    pub credential_type: String,
}

/// Server-issued challenge for asserting an existing passkey
/// (`PublicKeyCredentialRequestOptions` shape).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssertionChallenge {
    /// Base64url challenge bytes, consumed exactly once
    pub challenge: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rp_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_verification: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allow_credentials: Vec<AllowCredential>,
    /// Sentinel: the account exists but has no usable passkey and must
    /// register a new one before logging in.
    #[serde(default)]
    pub require_add_passkey: bool,
}

/// Attestation blobs of a completed registration ceremony, base64url.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttestationData {
    pub attestation_object: String,
    #[serde(rename = "clientDataJSON")]
    pub client_data_json: String,
}

/// Completion payload for registration ceremonies (signup, anonymous
/// signup, add-passkey).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationResponse {
    pub id: String,
    pub raw_id: String,
    pub response: AttestationData,
    #[serde(default)]
    pub client_extension_results: Map<String, Value>,
    #[serde(rename = "type")]
    pub credential_type: String,
    pub handle: String,
}

/// Assertion blobs of a completed authentication ceremony, base64url.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssertionData {
    #[serde(rename = "clientDataJSON")]
    pub client_data_json: String,
    pub authenticator_data: String,
    pub signature: String,
}

/// Completion payload for authentication ceremonies (login, step-up
/// verification).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssertionResponse {
    pub id: String,
    pub raw_id: String,
    pub response: AssertionData,
    #[serde(default)]
    pub client_extension_results: Map<String, Value>,
    #[serde(rename = "type")]
    pub credential_type: String,
    pub handle: String,
}
