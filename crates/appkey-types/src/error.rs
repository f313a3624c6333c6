//! Error envelope returned by the AppKey service on non-2xx responses.

use serde::{Deserialize, Serialize};

/// Well-known service error codes with client-side branches.
pub mod codes {
    /// The bearer token was revoked or is no longer valid; the client must
    /// drop its session.
    pub const INVALID_ACCESS_TOKEN: u32 = 405;
    /// Social login probe result: no account exists for this provider
    /// identity yet, fall through to social signup.
    pub const ACCOUNT_DOES_NOT_EXIST: u32 = 603;
    /// Signup rejected: the handle already belongs to an account.
    pub const HANDLE_ALREADY_REGISTERED: u32 = 605;
    /// Passkey operation referenced a credential the account does not hold.
    pub const PASSKEY_NOT_EXIST: u32 = 606;
}

/// Body of every error response: a numeric code plus a human-readable
/// message. Codes outside [`codes`] pass through to callers verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub code: u32,
    pub message: String,
}
