//! Application configuration served by the AppKey backend.

use serde::{Deserialize, Serialize};

/// Syntax the app expects for user handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HandleType {
    #[default]
    Email,
    Phone,
    /// Free-text handles; no local syntax validation applies
    #[serde(other)]
    Other,
}

/// Feature flags and locale list, fetched once at startup without
/// authentication and re-fetchable on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,
    #[serde(default)]
    pub anonymous_login_enabled: bool,
    #[serde(default)]
    pub google_login_enabled: bool,
    #[serde(default)]
    pub apple_login_enabled: bool,
    #[serde(default)]
    pub user_names_enabled: bool,
    #[serde(default)]
    pub handle_type: HandleType,
    #[serde(default)]
    pub locales: Vec<String>,
}

/// Label/value pair for locale pickers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleOption {
    pub label: String,
    pub value: String,
}

impl AppConfig {
    /// Derives the locale-option list from the raw locale codes.
    pub fn locale_options(&self) -> Vec<LocaleOption> {
        self.locales
            .iter()
            .map(|locale| LocaleOption {
                label: locale.clone(),
                value: locale.clone(),
            })
            .collect()
    }
}
