//! Wire-level types for the AppKey authentication API.

pub mod app;
pub mod ceremony;
pub mod error;
pub mod user;

pub use app::{AppConfig, HandleType, LocaleOption};
pub use ceremony::{
    AllowCredential, AssertionChallenge, AssertionData, AssertionResponse, AttestationData,
    ChallengeUser, RegistrationChallenge, RegistrationResponse, RelyingParty,
};
pub use error::{ErrorEnvelope, codes};
pub use user::{
    AppUser, AuthPayload, Authenticator, LoginProvider, ProfilePayload, SignupConfirmPayload,
};
