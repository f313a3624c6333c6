//! Client SDK for the AppKey passkey authentication service
//! (session orchestration, ceremony codec, REST transport).

pub mod ceremony;
pub mod client;
pub mod config;
pub mod error;
pub mod session;
mod transport;
mod validate;

pub use ceremony::{PasskeyAssertion, PasskeyAttestation};
pub use client::{
    AppKeyClient, LoginStart, ProfileUpdate, SocialLogin, SocialProfile, SocialProvider,
};
pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use error::{AuthError, AuthErrorKind, AuthResult};
pub use session::{Session, SessionSnapshot, SessionState};
