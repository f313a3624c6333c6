//! In-memory session state machine.
//!
//! The session holds transient credentials for the lifetime of the process:
//! nothing here touches durable storage. State changes publish a fresh
//! snapshot through a watch channel so UI layers can poll or await changes.

use appkey_types::{AppConfig, AppUser, LocaleOption};
use tokio::sync::watch;

use crate::error::AuthError;

/// The three mutually-exclusive credential states.
///
/// At most one token is ever held: promotion to `Authenticated` discards any
/// pending signup token.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No credential; requests carry the application token.
    #[default]
    Anonymous,
    /// First signup factor completed, awaiting the confirmation code.
    SignupPending { signup_token: String },
    /// Fully authenticated session.
    Authenticated { access_token: String },
}

impl SessionState {
    /// Returns the access token when authenticated.
    pub fn access_token(&self) -> Option<&str> {
        match self {
            SessionState::Authenticated { access_token } => Some(access_token),
            _ => None,
        }
    }

    /// Returns the signup token when a signup is pending.
    pub fn signup_token(&self) -> Option<&str> {
        match self {
            SessionState::SignupPending { signup_token } => Some(signup_token),
            _ => None,
        }
    }
}

/// Point-in-time view of the session, cloned out to observers.
#[derive(Debug, Clone, Default)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub user: Option<AppUser>,
    pub app_config: Option<AppConfig>,
    pub locale_options: Vec<LocaleOption>,
    pub last_error: Option<AuthError>,
    pub is_loading: bool,
}

/// Owns the session snapshot and notifies observers on every mutation.
///
/// Mutations happen only through the orchestrator's ceremony operations.
/// The session holds no lock across await points; at most one in-flight
/// ceremony is a caller obligation, signalled via `is_loading`.
#[derive(Debug)]
pub struct Session {
    tx: watch::Sender<SessionSnapshot>,
}

impl Session {
    /// Creates an empty session (process start / post-logout state).
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(SessionSnapshot::default());
        Self { tx }
    }

    /// Returns the current snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.tx.borrow().clone()
    }

    /// Subscribes to snapshot updates.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.tx.subscribe()
    }

    /// Returns the current credential state.
    pub fn state(&self) -> SessionState {
        self.tx.borrow().state.clone()
    }

    /// Header name/value for the next request, per the credential-selection
    /// policy: access token, else signup token, else the app token.
    pub(crate) fn credential(&self, app_token: &str) -> (&'static str, String) {
        let snapshot = self.tx.borrow();
        if let Some(token) = snapshot.state.access_token() {
            ("access-token", token.to_string())
        } else if let Some(token) = snapshot.state.signup_token() {
            ("signup-token", token.to_string())
        } else {
            ("app-token", app_token.to_string())
        }
    }

    fn mutate(&self, f: impl FnOnce(&mut SessionSnapshot)) {
        self.tx.send_modify(f);
    }

    /// Promotes the session to authenticated, discarding any signup token.
    pub(crate) fn promote(&self, access_token: String, user: AppUser) {
        tracing::debug!(handle = %user.handle, "session authenticated");
        self.mutate(|s| {
            s.state = SessionState::Authenticated { access_token };
            s.user = Some(user);
            s.last_error = None;
        });
    }

    /// Enters the signup-pending state after a confirmed first factor.
    pub(crate) fn enter_signup_pending(&self, signup_token: String) {
        tracing::debug!("signup confirmed, awaiting code");
        self.mutate(|s| {
            s.state = SessionState::SignupPending { signup_token };
        });
    }

    /// Replaces the user record without touching credentials.
    pub(crate) fn set_user(&self, user: AppUser) {
        self.mutate(|s| s.user = Some(user));
    }

    /// Stores the application config and derives the locale options.
    pub(crate) fn set_app_config(&self, config: AppConfig) {
        self.mutate(|s| {
            s.locale_options = config.locale_options();
            s.app_config = Some(config);
        });
    }

    /// Records a surfaced failure for observers.
    pub(crate) fn record_error(&self, error: &AuthError) {
        self.mutate(|s| s.last_error = Some(error.clone()));
    }

    /// Resets to the empty anonymous state. Used by `logout()` and forced
    /// by a revoked-session error. The app config survives; it is not tied
    /// to the user.
    pub fn reset(&self) {
        tracing::debug!("session reset");
        self.mutate(|s| {
            s.state = SessionState::Anonymous;
            s.user = None;
            s.last_error = None;
            s.is_loading = false;
        });
    }

    /// Marks an operation in flight until the guard drops.
    pub(crate) fn begin_loading(&self) -> LoadingGuard<'_> {
        self.mutate(|s| s.is_loading = true);
        LoadingGuard { session: self }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Clears `is_loading` on every exit path, including unwinds.
pub(crate) struct LoadingGuard<'a> {
    session: &'a Session,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.session.mutate(|s| s.is_loading = false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(handle: &str) -> AppUser {
        serde_json::from_value(serde_json::json!({ "handle": handle })).unwrap()
    }

    /// Test: promotion discards a pending signup token.
    #[test]
    fn test_promote_clears_signup_token() {
        let session = Session::new();
        session.enter_signup_pending("st-1".to_string());
        assert_eq!(session.state().signup_token(), Some("st-1"));

        session.promote("at-1".to_string(), user("alice@example.com"));
        let state = session.state();
        assert_eq!(state.access_token(), Some("at-1"));
        assert_eq!(state.signup_token(), None);
    }

    /// Test: at most one token is observable in any state.
    #[test]
    fn test_token_exclusivity() {
        let session = Session::new();
        for state in [
            SessionState::Anonymous,
            SessionState::SignupPending {
                signup_token: "st".to_string(),
            },
            SessionState::Authenticated {
                access_token: "at".to_string(),
            },
        ] {
            session.mutate(|s| s.state = state.clone());
            let snapshot = session.snapshot();
            let held = usize::from(snapshot.state.access_token().is_some())
                + usize::from(snapshot.state.signup_token().is_some());
            assert!(held <= 1);
        }
    }

    /// Test: reset yields the empty anonymous state.
    #[test]
    fn test_reset() {
        let session = Session::new();
        session.promote("at-1".to_string(), user("alice@example.com"));
        session.record_error(&AuthError::transport("boom"));

        session.reset();
        let snapshot = session.snapshot();
        assert_eq!(snapshot.state, SessionState::Anonymous);
        assert!(snapshot.user.is_none());
        assert!(snapshot.last_error.is_none());
        assert!(!snapshot.is_loading);
    }

    /// Test: credential selection follows access > signup > app precedence.
    #[test]
    fn test_credential_selection() {
        let session = Session::new();
        assert_eq!(
            session.credential("app-1"),
            ("app-token", "app-1".to_string())
        );

        session.enter_signup_pending("st-1".to_string());
        assert_eq!(
            session.credential("app-1"),
            ("signup-token", "st-1".to_string())
        );

        session.promote("at-1".to_string(), user("alice@example.com"));
        assert_eq!(
            session.credential("app-1"),
            ("access-token", "at-1".to_string())
        );
    }

    /// Test: the loading flag clears when the guard drops, unwind included.
    #[test]
    fn test_loading_guard_clears_on_drop() {
        let session = Session::new();
        {
            let _guard = session.begin_loading();
            assert!(session.snapshot().is_loading);
        }
        assert!(!session.snapshot().is_loading);

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = session.begin_loading();
            panic!("ceremony blew up");
        }));
        assert!(result.is_err());
        assert!(!session.snapshot().is_loading);
    }

    /// Test: observers see mutations through the watch channel.
    #[test]
    fn test_subscribe_sees_updates() {
        let session = Session::new();
        let rx = session.subscribe();
        session.promote("at-1".to_string(), user("alice@example.com"));
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow().state.access_token(), Some("at-1"));
    }
}
