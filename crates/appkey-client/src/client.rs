//! The session/auth orchestrator.
//!
//! One method per authentication ceremony step. Every remote call performs
//! exactly one round trip, applies the credential-selection policy, and
//! conditionally mutates session state. Ceremonies are split into
//! begin/complete pairs; the platform authenticator runs between the two
//! and is never invoked from here. Abandoning a ceremony after `begin` is a
//! safe no-op.
//!
//! Callers must not interleave two ceremonies against the same session; the
//! `is_loading` snapshot field is the signal to disable triggers meanwhile.

use std::sync::Arc;

use appkey_types::{
    AppConfig, AppUser, AssertionChallenge, AuthPayload, HandleType, ProfilePayload,
    RegistrationChallenge, SignupConfirmPayload, codes,
};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::sync::watch;

use crate::ceremony::{PasskeyAssertion, PasskeyAttestation};
use crate::config::{ClientConfig, DEFAULT_BASE_URL};
use crate::error::{AuthError, AuthResult};
use crate::session::{Session, SessionSnapshot};
use crate::transport::{ErrorCapture, Transport};
use crate::validate::{validate_handle, validate_user_name};

/// Social identity providers accepted by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocialProvider {
    Google,
    Apple,
}

impl SocialProvider {
    /// Wire identifier for the provider.
    pub fn as_str(self) -> &'static str {
        match self {
            SocialProvider::Google => "google",
            SocialProvider::Apple => "apple",
        }
    }
}

/// Profile fields needed when a social login falls through to signup.
#[derive(Debug, Clone)]
pub struct SocialProfile {
    pub handle: String,
    pub display_name: String,
    pub locale: Option<String>,
}

/// Outcome of starting a login ceremony.
#[derive(Debug, Clone)]
pub enum LoginStart {
    /// Assert an existing passkey against this challenge.
    Challenge(AssertionChallenge),
    /// The account exists but must register a new passkey before logging in.
    PasskeyRequired,
}

impl From<AssertionChallenge> for LoginStart {
    fn from(challenge: AssertionChallenge) -> Self {
        if challenge.require_add_passkey {
            LoginStart::PasskeyRequired
        } else {
            LoginStart::Challenge(challenge)
        }
    }
}

/// Outcome of a social login probe.
#[derive(Debug, Clone)]
pub enum SocialLogin {
    Authenticated(AppUser),
    /// No account for this provider identity yet; fall through to
    /// [`AppKeyClient::social_signup`].
    AccountNotFound,
}

/// Partial profile fields for [`AppKeyClient::update_profile`].
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Availability {
    available: bool,
}

/// Client for the AppKey passkey authentication service.
pub struct AppKeyClient {
    session: Arc<Session>,
    transport: Transport,
}

impl AppKeyClient {
    /// Creates a new client with the given configuration.
    ///
    /// # Panics
    /// - In test builds (`#[cfg(test)]`), panics if `base_url` is the
    ///   production API.
    /// - At runtime, panics if `APPKEY_BLOCK_REAL_API=1` and `base_url` is
    ///   the production API.
    ///
    /// This prevents tests from accidentally making real network requests.
    /// Point `APPKEY_BASE_URL` at a mock server instead.
    pub fn new(config: ClientConfig) -> Self {
        #[cfg(test)]
        if config.base_url == DEFAULT_BASE_URL {
            panic!(
                "Tests must not use the production AppKey API!\n\
                 Set APPKEY_BASE_URL to a mock server (e.g., wiremock).\n\
                 Found base_url: {}",
                config.base_url
            );
        }

        #[cfg(not(test))]
        if std::env::var("APPKEY_BLOCK_REAL_API").is_ok_and(|v| v == "1")
            && config.base_url == DEFAULT_BASE_URL
        {
            panic!(
                "APPKEY_BLOCK_REAL_API=1 but trying to use the production AppKey API!\n\
                 Set APPKEY_BASE_URL to a mock server.\n\
                 Found base_url: {}",
                config.base_url
            );
        }

        let session = Arc::new(Session::new());
        let transport = Transport::new(&config, Arc::clone(&session));
        Self { session, transport }
    }

    /// Shared handle to the session for observers.
    pub fn session(&self) -> Arc<Session> {
        Arc::clone(&self.session)
    }

    /// Current session snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.snapshot()
    }

    /// Subscribes to session snapshot updates.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.session.subscribe()
    }

    // ------------------------------------------------------------------
    // Application config
    // ------------------------------------------------------------------

    /// Fetches the application configuration and derives the locale options.
    /// Requires no authentication; on failure the stored config is left
    /// untouched.
    ///
    /// # Errors
    /// Returns an error if the request or decoding fails.
    pub async fn fetch_app_config(&self) -> AuthResult<AppConfig> {
        let _loading = self.session.begin_loading();
        let config: AppConfig = self
            .transport
            .call(Method::GET, "app", None, ErrorCapture::Record)
            .await?;
        self.session.set_app_config(config.clone());
        Ok(config)
    }

    // ------------------------------------------------------------------
    // Anonymous login
    // ------------------------------------------------------------------

    /// Starts an anonymous signup ceremony under a generated
    /// `ANON_<uuid>` handle. The handle the ceremony is tagged to comes
    /// back in `challenge.user.name`; pass it to
    /// [`Self::complete_anonymous_login`].
    ///
    /// # Errors
    /// Returns an error if the request fails.
    pub async fn begin_anonymous_login(&self) -> AuthResult<RegistrationChallenge> {
        let _loading = self.session.begin_loading();
        let handle = format!("ANON_{}", uuid::Uuid::new_v4());
        self.transport
            .call(
                Method::POST,
                "loginAnonymous",
                Some(&json!({ "handle": handle })),
                ErrorCapture::Record,
            )
            .await
    }

    /// Completes the anonymous ceremony and authenticates the session.
    ///
    /// # Errors
    /// Returns an error if the attestation is rejected; session state is
    /// unchanged on failure.
    pub async fn complete_anonymous_login(
        &self,
        attestation: PasskeyAttestation,
        handle: &str,
    ) -> AuthResult<AppUser> {
        let _loading = self.session.begin_loading();
        let body = body_of(&attestation.into_response(handle))?;
        let auth: AuthPayload = self
            .transport
            .call(
                Method::POST,
                "loginAnonymousComplete",
                Some(&body),
                ErrorCapture::Record,
            )
            .await?;
        self.session.promote(auth.access_token, auth.user.clone());
        Ok(auth.user)
    }

    // ------------------------------------------------------------------
    // Login
    // ------------------------------------------------------------------

    /// Starts a login ceremony for the given handle.
    ///
    /// # Errors
    /// Returns a validation error before any network call if the handle is
    /// malformed; server errors are surfaced verbatim.
    pub async fn begin_login(&self, handle: &str) -> AuthResult<LoginStart> {
        validate_handle(handle, self.handle_type())?;
        let _loading = self.session.begin_loading();
        let challenge: AssertionChallenge = self
            .transport
            .call(
                Method::POST,
                "login",
                Some(&json!({ "handle": handle })),
                ErrorCapture::Record,
            )
            .await?;
        Ok(LoginStart::from(challenge))
    }

    /// Completes a login ceremony and authenticates the session.
    ///
    /// # Errors
    /// Returns an error on an invalid assertion; session state is unchanged
    /// on failure.
    pub async fn complete_login(
        &self,
        assertion: PasskeyAssertion,
        handle: &str,
    ) -> AuthResult<AppUser> {
        let _loading = self.session.begin_loading();
        let body = body_of(&assertion.into_response(handle))?;
        let auth: AuthPayload = self
            .transport
            .call(
                Method::POST,
                "loginComplete",
                Some(&body),
                ErrorCapture::Record,
            )
            .await?;
        self.session.promote(auth.access_token, auth.user.clone());
        Ok(auth.user)
    }

    // ------------------------------------------------------------------
    // Signup
    // ------------------------------------------------------------------

    /// Starts a signup ceremony for a new account.
    ///
    /// # Errors
    /// Returns a validation error for a malformed handle before any network
    /// call; a taken handle is surfaced as the server's error.
    pub async fn begin_signup(
        &self,
        handle: &str,
        display_name: &str,
        locale: &str,
    ) -> AuthResult<RegistrationChallenge> {
        validate_handle(handle, self.handle_type())?;
        let _loading = self.session.begin_loading();
        self.transport
            .call(
                Method::POST,
                "signup",
                Some(&json!({
                    "handle": handle,
                    "displayName": display_name,
                    "locale": locale,
                })),
                ErrorCapture::Record,
            )
            .await
    }

    /// Confirms the signup attestation. On success the session enters the
    /// signup-pending state; it is not yet authenticated.
    ///
    /// # Errors
    /// Returns an error if the attestation is rejected; session state is
    /// unchanged on failure.
    pub async fn confirm_signup(
        &self,
        attestation: PasskeyAttestation,
        handle: &str,
    ) -> AuthResult<()> {
        let _loading = self.session.begin_loading();
        let body = body_of(&attestation.into_response(handle))?;
        let payload: SignupConfirmPayload = self
            .transport
            .call(
                Method::POST,
                "signupConfirm",
                Some(&body),
                ErrorCapture::Record,
            )
            .await?;
        self.session.enter_signup_pending(payload.signup_token);
        Ok(())
    }

    /// Exchanges the signup token plus the out-of-band confirmation code
    /// for an authenticated session.
    ///
    /// # Errors
    /// Returns an error on a wrong or expired code; the signup token is
    /// retained so the caller may retry.
    pub async fn finish_signup(&self, handle: &str, code: &str) -> AuthResult<AppUser> {
        let _loading = self.session.begin_loading();
        let auth: AuthPayload = self
            .transport
            .call(
                Method::POST,
                "signupComplete",
                Some(&json!({ "handle": handle, "code": code })),
                ErrorCapture::Record,
            )
            .await?;
        self.session.promote(auth.access_token, auth.user.clone());
        Ok(auth.user)
    }

    // ------------------------------------------------------------------
    // Social login
    // ------------------------------------------------------------------

    /// Attempts a social login with a provider-issued token.
    ///
    /// An account-does-not-exist answer (code 603) is a normal outcome of
    /// this probe, returned as [`SocialLogin::AccountNotFound`] without
    /// touching `last_error`; other failures are recorded and returned.
    ///
    /// # Errors
    /// Returns an error for failures other than the missing-account probe
    /// result.
    pub async fn social_login(
        &self,
        token: &str,
        provider: SocialProvider,
    ) -> AuthResult<SocialLogin> {
        let _loading = self.session.begin_loading();
        let result: AuthResult<AuthPayload> = self
            .transport
            .call(
                Method::POST,
                "socialLogin",
                Some(&json!({ "token": token, "provider": provider.as_str() })),
                ErrorCapture::Quiet,
            )
            .await;

        match result {
            Ok(auth) => {
                self.session.promote(auth.access_token, auth.user.clone());
                Ok(SocialLogin::Authenticated(auth.user))
            }
            Err(error) if error.is_code(codes::ACCOUNT_DOES_NOT_EXIST) => {
                Ok(SocialLogin::AccountNotFound)
            }
            Err(error) => {
                self.session.record_error(&error);
                Err(error)
            }
        }
    }

    /// Creates an account from a social identity and authenticates.
    ///
    /// # Errors
    /// Returns an error if the request fails.
    pub async fn social_signup(
        &self,
        token: &str,
        provider: SocialProvider,
        profile: &SocialProfile,
    ) -> AuthResult<AppUser> {
        let _loading = self.session.begin_loading();
        let auth: AuthPayload = self
            .transport
            .call(
                Method::POST,
                "socialSignup",
                Some(&json!({
                    "token": token,
                    "provider": provider.as_str(),
                    "handle": profile.handle,
                    "displayName": profile.display_name,
                    "locale": profile.locale,
                })),
                ErrorCapture::Record,
            )
            .await?;
        self.session.promote(auth.access_token, auth.user.clone());
        Ok(auth.user)
    }

    /// Social login with automatic fall-through to signup when no account
    /// exists for the provider identity.
    ///
    /// # Errors
    /// Returns an error if both the login and the signup fail.
    pub async fn social_sign_in(
        &self,
        token: &str,
        provider: SocialProvider,
        profile: &SocialProfile,
    ) -> AuthResult<AppUser> {
        match self.social_login(token, provider).await? {
            SocialLogin::Authenticated(user) => Ok(user),
            SocialLogin::AccountNotFound => self.social_signup(token, provider, profile).await,
        }
    }

    // ------------------------------------------------------------------
    // Profile
    // ------------------------------------------------------------------

    /// Claims a username for the authenticated user and updates the local
    /// record on success.
    ///
    /// # Errors
    /// Returns a validation error for a malformed username, or the server's
    /// uniqueness-conflict error.
    pub async fn set_user_name(&self, user_name: &str) -> AuthResult<AppUser> {
        validate_user_name(user_name)?;
        let mut user = self.current_user()?;
        let _loading = self.session.begin_loading();
        let _ack: Value = self
            .transport
            .call(
                Method::POST,
                "setUserName",
                Some(&json!({ "userName": user_name })),
                ErrorCapture::Record,
            )
            .await?;
        user.user_name = Some(user_name.to_string());
        self.session.set_user(user.clone());
        Ok(user)
    }

    /// Probes whether a username is still free. Does not touch
    /// `last_error`; callers branch on the answer.
    ///
    /// # Errors
    /// Returns a validation error for a malformed username, or the request
    /// failure.
    pub async fn user_name_available(&self, user_name: &str) -> AuthResult<bool> {
        validate_user_name(user_name)?;
        let _loading = self.session.begin_loading();
        let availability: Availability = self
            .transport
            .call(
                Method::POST,
                "userNameAvailable",
                Some(&json!({ "userName": user_name })),
                ErrorCapture::Quiet,
            )
            .await?;
        Ok(availability.available)
    }

    /// Updates profile fields. The response merges into the local user
    /// record and may rotate the access token.
    ///
    /// # Errors
    /// Returns an error if the request fails.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> AuthResult<AppUser> {
        let _loading = self.session.begin_loading();
        let body = body_of(update)?;
        let payload: ProfilePayload = self
            .transport
            .call(
                Method::POST,
                "updateProfile",
                Some(&body),
                ErrorCapture::Record,
            )
            .await?;
        match payload.access_token {
            Some(token) => self.session.promote(token, payload.user.clone()),
            None => self.session.set_user(payload.user.clone()),
        }
        Ok(payload.user)
    }

    // ------------------------------------------------------------------
    // Step-up verification
    // ------------------------------------------------------------------

    /// Starts a step-up verification ceremony for an already-authenticated
    /// user. Never changes session credentials.
    ///
    /// # Errors
    /// Returns an error if the request fails.
    pub async fn verify(&self, handle: &str) -> AuthResult<AssertionChallenge> {
        let _loading = self.session.begin_loading();
        self.transport
            .call(
                Method::POST,
                "verify",
                Some(&json!({ "handle": handle })),
                ErrorCapture::Record,
            )
            .await
    }

    /// Completes a step-up verification ceremony. The session credential is
    /// deliberately left untouched even if the response carries a token.
    ///
    /// # Errors
    /// Returns an error if the assertion is rejected.
    pub async fn verify_complete(
        &self,
        assertion: PasskeyAssertion,
        handle: &str,
    ) -> AuthResult<AppUser> {
        let _loading = self.session.begin_loading();
        let body = body_of(&assertion.into_response(handle))?;
        let payload: ProfilePayload = self
            .transport
            .call(
                Method::POST,
                "verifyComplete",
                Some(&body),
                ErrorCapture::Record,
            )
            .await?;
        Ok(payload.user)
    }

    // ------------------------------------------------------------------
    // Passkey management
    // ------------------------------------------------------------------

    /// Requests a registration challenge for adding a passkey to the
    /// authenticated account.
    ///
    /// # Errors
    /// Returns an error if the request fails.
    pub async fn add_passkey(&self) -> AuthResult<RegistrationChallenge> {
        let _loading = self.session.begin_loading();
        self.transport
            .call(
                Method::POST,
                "addPasskey",
                Some(&json!({})),
                ErrorCapture::Record,
            )
            .await
    }

    /// Completes the add-passkey ceremony; the returned user record carries
    /// the extended authenticator list.
    ///
    /// # Errors
    /// Returns an error if the attestation is rejected.
    pub async fn add_passkey_complete(
        &self,
        attestation: PasskeyAttestation,
    ) -> AuthResult<AppUser> {
        let handle = self.current_user()?.handle;
        let _loading = self.session.begin_loading();
        let body = body_of(&attestation.into_response(&handle))?;
        let user: AppUser = self
            .transport
            .call(
                Method::POST,
                "addPasskeyComplete",
                Some(&body),
                ErrorCapture::Record,
            )
            .await?;
        self.session.set_user(user.clone());
        Ok(user)
    }

    /// Renames a passkey.
    ///
    /// # Errors
    /// Returns an error if the request fails; the local record is unchanged
    /// on failure.
    pub async fn update_passkey(&self, key_id: &str, name: &str) -> AuthResult<AppUser> {
        let _loading = self.session.begin_loading();
        let user: AppUser = self
            .transport
            .call(
                Method::POST,
                "updatePasskey",
                Some(&json!({ "keyId": key_id, "keyName": name })),
                ErrorCapture::Record,
            )
            .await?;
        self.session.set_user(user.clone());
        Ok(user)
    }

    /// Removes a passkey. The server rejects removing the last remaining
    /// authenticator; that error is surfaced and the local record is
    /// unchanged.
    ///
    /// # Errors
    /// Returns an error if the request fails.
    pub async fn remove_passkey(&self, key_id: &str) -> AuthResult<AppUser> {
        let _loading = self.session.begin_loading();
        let user: AppUser = self
            .transport
            .call(
                Method::POST,
                "removePasskey",
                Some(&json!({ "keyId": key_id })),
                ErrorCapture::Record,
            )
            .await?;
        self.session.set_user(user.clone());
        Ok(user)
    }

    // ------------------------------------------------------------------
    // Logout
    // ------------------------------------------------------------------

    /// Resets the session to the empty anonymous state. Local only; no
    /// request is made.
    pub fn logout(&self) {
        self.session.reset();
    }

    fn current_user(&self) -> AuthResult<AppUser> {
        self.session
            .snapshot()
            .user
            .ok_or_else(|| AuthError::validation("No authenticated user"))
    }

    /// Handle syntax to validate against. Without a fetched config the
    /// client only requires a non-empty handle.
    fn handle_type(&self) -> HandleType {
        self.session
            .snapshot()
            .app_config
            .map_or(HandleType::Other, |config| config.handle_type)
    }
}

fn body_of<T: Serialize>(value: &T) -> AuthResult<Value> {
    serde_json::to_value(value)
        .map_err(|e| AuthError::parse(format!("Encoding request body: {e}"), ""))
}
