use thiserror::Error;

use crate::push::vapid::VapidKeyError;

/// Failures surfaced by the page-side controller. Platform errors arrive as
/// text because every port brings its own error type.
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("push notifications are not supported by this browser")]
    Unsupported,
    #[error("service worker registration failed: {0}")]
    Registration(String),
    #[error("failed to query the push subscription: {0}")]
    SubscriptionQuery(String),
    #[error("notification permission request failed: {0}")]
    Permission(String),
    #[error("push subscribe failed: {0}")]
    Subscribe(String),
    #[error("push unsubscribe failed: {0}")]
    Unsubscribe(String),
    #[error(transparent)]
    ApplicationServerKey(#[from] VapidKeyError),
}

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("service worker lifecycle step failed: {0}")]
    Lifecycle(String),
    #[error("failed to show notification: {0}")]
    Render(String),
    #[error("invalid notification url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("failed to open or focus a window: {0}")]
    Window(String),
    #[error("failed to read the push subscription: {0}")]
    Subscription(String),
}

#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Io {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to encode config: {0}")]
    Encode(#[from] toml::ser::Error),
}
