//! Local input validation, applied before any network call.
//!
//! Rejections here never touch the session's `last_error`.

use appkey_types::HandleType;

use crate::error::{AuthError, AuthResult};

/// Validates a handle against the app's configured handle syntax.
pub(crate) fn validate_handle(handle: &str, handle_type: HandleType) -> AuthResult<()> {
    let handle = handle.trim();
    if handle.is_empty() {
        return Err(AuthError::validation("Handle must not be empty"));
    }

    match handle_type {
        HandleType::Email if !is_plausible_email(handle) => Err(AuthError::validation(format!(
            "Invalid email handle: {handle}"
        ))),
        HandleType::Phone if !is_plausible_phone(handle) => Err(AuthError::validation(format!(
            "Invalid phone handle: {handle}"
        ))),
        _ => Ok(()),
    }
}

/// Validates a desired username: non-empty, alphanumeric plus `_`/`-`/`.`.
pub(crate) fn validate_user_name(user_name: &str) -> AuthResult<()> {
    let user_name = user_name.trim();
    if user_name.is_empty() {
        return Err(AuthError::validation("Username must not be empty"));
    }
    if !user_name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        return Err(AuthError::validation(format!(
            "Invalid username: {user_name}"
        )));
    }
    Ok(())
}

fn is_plausible_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && domain.contains('.')
        && !value.contains(char::is_whitespace)
}

fn is_plausible_phone(value: &str) -> bool {
    let digits = value.chars().filter(char::is_ascii_digit).count();
    digits >= 7
        && value
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')'))
}
