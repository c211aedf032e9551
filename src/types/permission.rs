use serde::{Deserialize, Serialize};
use std::fmt;

/// Notification permission as reported by the browser. Read-only for us.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
    #[default]
    Default,
    Granted,
    Denied,
}

impl PermissionState {
    /// Maps the platform's permission string. Anything unknown counts as
    /// `default`, which keeps the prompt retriable.
    pub fn from_platform(raw: &str) -> Self {
        match raw {
            "granted" => PermissionState::Granted,
            "denied" => PermissionState::Denied,
            _ => PermissionState::Default,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PermissionState::Default => "default",
            PermissionState::Granted => "granted",
            PermissionState::Denied => "denied",
        }
    }
}

impl fmt::Display for PermissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
