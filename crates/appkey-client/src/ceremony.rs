//! Base64url codec at the platform-authenticator boundary.
//!
//! Challenges arrive base64url-encoded and must reach the authenticator as
//! raw bytes; attestation and assertion blobs come back as raw bytes and
//! must reach the wire as base64url text. The conversion is exact and
//! reversible; this is the one piece of protocol logic in the client.

use appkey_types::{AssertionData, AssertionResponse, AttestationData, RegistrationResponse};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::Map;

use crate::error::{AuthError, AuthResult};

/// Credential type tag attached to every completion payload.
const PUBLIC_KEY: &str = "public-key";

/// Encodes raw bytes to unpadded base64url.
pub fn encode(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Decodes unpadded base64url text back to raw bytes.
///
/// # Errors
/// Returns a parse error if the text is not valid base64url.
pub fn decode(text: &str) -> AuthResult<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(text)
        .map_err(|e| AuthError::parse(format!("Invalid base64url data: {e}"), text))
}

/// Decodes a challenge field for handing to the platform authenticator.
///
/// # Errors
/// Returns a parse error if the challenge is not valid base64url.
pub fn challenge_bytes(challenge: &str) -> AuthResult<Vec<u8>> {
    decode(challenge)
}

/// Output of a platform registration ceremony, in the authenticator's
/// native binary representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasskeyAttestation {
    pub credential_id: Vec<u8>,
    pub attestation_object: Vec<u8>,
    pub client_data_json: Vec<u8>,
}

impl PasskeyAttestation {
    /// Builds the wire completion payload for the given handle.
    pub fn into_response(self, handle: &str) -> RegistrationResponse {
        let id = encode(&self.credential_id);
        RegistrationResponse {
            raw_id: id.clone(),
            id,
            response: AttestationData {
                attestation_object: encode(&self.attestation_object),
                client_data_json: encode(&self.client_data_json),
            },
            client_extension_results: Map::new(),
            credential_type: PUBLIC_KEY.to_string(),
            handle: handle.to_string(),
        }
    }

    /// Recovers the native representation from a wire payload.
    ///
    /// # Errors
    /// Returns a parse error if any field is not valid base64url.
    pub fn from_response(response: &RegistrationResponse) -> AuthResult<Self> {
        Ok(Self {
            credential_id: decode(&response.raw_id)?,
            attestation_object: decode(&response.response.attestation_object)?,
            client_data_json: decode(&response.response.client_data_json)?,
        })
    }
}

/// Output of a platform authentication ceremony, in the authenticator's
/// native binary representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasskeyAssertion {
    pub credential_id: Vec<u8>,
    pub client_data_json: Vec<u8>,
    pub authenticator_data: Vec<u8>,
    pub signature: Vec<u8>,
}

impl PasskeyAssertion {
    /// Builds the wire completion payload for the given handle.
    pub fn into_response(self, handle: &str) -> AssertionResponse {
        let id = encode(&self.credential_id);
        AssertionResponse {
            raw_id: id.clone(),
            id,
            response: AssertionData {
                client_data_json: encode(&self.client_data_json),
                authenticator_data: encode(&self.authenticator_data),
                signature: encode(&self.signature),
            },
            client_extension_results: Map::new(),
            credential_type: PUBLIC_KEY.to_string(),
            handle: handle.to_string(),
        }
    }

    /// Recovers the native representation from a wire payload.
    ///
    /// # Errors
    /// Returns a parse error if any field is not valid base64url.
    pub fn from_response(response: &AssertionResponse) -> AuthResult<Self> {
        Ok(Self {
            credential_id: decode(&response.raw_id)?,
            client_data_json: decode(&response.response.client_data_json)?,
            authenticator_data: decode(&response.response.authenticator_data)?,
            signature: decode(&response.response.signature)?,
        })
    }
}
