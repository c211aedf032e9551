use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::push::vapid::{self, VapidKeyError};

pub const DEFAULT_SITE_NAME: &str = "Top Up BUSSID";
pub const DEFAULT_SITE_ICON: &str = "https://i.postimg.cc/GmbgBPZ9/20250827-200754.png";
pub const DEFAULT_PROMO_IMAGE: &str =
    "https://i.postimg.cc/nrfSZWmP/file-00000000d29861f895e12e2a67d02858.png";
pub const DEFAULT_SYNC_TAG: &str = "send-subscription";
pub const AUTO_REQUEST_DELAY_MS: u64 = 3_000;

/// Everything the page and the worker need to know about the site.
/// Absent fields fall back to the site's literal constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PushConfig {
    pub site_name: String,
    /// Public half of the push sender's VAPID pair (`bussid-push vapid`).
    /// There is no built-in key; subscribing fails while this is empty.
    pub vapid_public_key: String,
    /// Ask for permission on its own this long after start, when the
    /// permission is still undecided. `None` waits for the user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_request_delay_ms: Option<u64>,
    /// Where subscription records are POSTed. `None` keeps them local.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_endpoint: Option<Url>,
    pub sync_tag: String,
    pub worker: WorkerRegistration,
    pub storage: StorageKeys,
    pub notification: NotificationDefaults,
    pub feedback: FeedbackTexts,
    pub test: TestNotification,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerRegistration {
    pub path: String,
    pub scope: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageKeys {
    pub subscription: String,
    pub backup: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationDefaults {
    pub body: String,
    pub icon: String,
    pub badge: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub url: String,
    pub tag: String,
    /// Tag for notifications requested by a page instead of a push.
    pub client_tag: String,
    pub require_interaction: bool,
    pub open_label: String,
    pub close_label: String,
    pub rich: PayloadRichness,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayloadRichness {
    pub image: bool,
    pub actions: bool,
    pub vibrate: bool,
    pub vibrate_pattern: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackTexts {
    pub toast_duration_ms: u64,
    pub granted: String,
    pub denied: String,
    pub dismissed: String,
    pub unsupported: String,
    pub error_prefix: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestNotification {
    /// Insert the floating test button into the page.
    pub button: bool,
    pub button_delay_ms: u64,
    pub button_label: String,
    /// Send a test notification right after a successful subscribe.
    pub on_subscribe: bool,
    pub title: String,
    pub body: String,
    pub direct_body: String,
    pub direct_tag: String,
    pub icon: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl PushConfig {
    pub fn auto_request_delay(&self) -> Option<Duration> {
        self.auto_request_delay_ms.map(Duration::from_millis)
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.feedback.toast_duration_ms)
    }

    /// The VAPID public key as the raw bytes `subscribe` expects.
    pub fn application_server_key(&self) -> Result<Vec<u8>, VapidKeyError> {
        vapid::decode_application_server_key(&self.vapid_public_key)
    }

    pub fn with_auto_request(mut self, delay: Duration) -> Self {
        self.auto_request_delay_ms = Some(u64::try_from(delay.as_millis()).unwrap_or(u64::MAX));
        self
    }

    pub fn with_remote_endpoint(mut self, endpoint: Url) -> Self {
        self.remote_endpoint = Some(endpoint);
        self
    }
}

impl TestNotification {
    pub fn button_delay(&self) -> Duration {
        Duration::from_millis(self.button_delay_ms)
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl PushConfig {
    pub fn from_toml(raw: &str) -> Result<Self, crate::error::ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn load(path: &std::path::Path) -> Result<Self, crate::error::ConfigError> {
        let raw =
            std::fs::read_to_string(path).map_err(|source| crate::error::ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_toml(&raw)
    }

    pub fn to_toml(&self) -> Result<String, crate::error::ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            site_name: DEFAULT_SITE_NAME.to_string(),
            vapid_public_key: String::new(),
            auto_request_delay_ms: None,
            remote_endpoint: None,
            sync_tag: DEFAULT_SYNC_TAG.to_string(),
            worker: WorkerRegistration::default(),
            storage: StorageKeys::default(),
            notification: NotificationDefaults::default(),
            feedback: FeedbackTexts::default(),
            test: TestNotification::default(),
        }
    }
}

impl Default for WorkerRegistration {
    fn default() -> Self {
        Self {
            path: "/sw.js".to_string(),
            scope: "/".to_string(),
        }
    }
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            subscription: "pushSubscription".to_string(),
            backup: "pushSubscription_backup".to_string(),
        }
    }
}

impl Default for NotificationDefaults {
    fn default() -> Self {
        Self {
            body: "Notifikasi dari Top Up BUSSID".to_string(),
            icon: DEFAULT_SITE_ICON.to_string(),
            badge: DEFAULT_SITE_ICON.to_string(),
            image: None,
            url: "/".to_string(),
            tag: "bussid-notification".to_string(),
            client_tag: "client-notification".to_string(),
            require_interaction: true,
            open_label: "Buka Website".to_string(),
            close_label: "Tutup".to_string(),
            rich: PayloadRichness::default(),
        }
    }
}

impl Default for PayloadRichness {
    fn default() -> Self {
        Self {
            image: true,
            actions: true,
            vibrate: false,
            vibrate_pattern: vec![200, 100, 200],
        }
    }
}

impl Default for FeedbackTexts {
    fn default() -> Self {
        Self {
            toast_duration_ms: 4_000,
            granted: "Izin notifikasi diberikan! 🎉".to_string(),
            denied: "Izin notifikasi ditolak. Silakan buka pengaturan browser untuk mengizinkan notifikasi.".to_string(),
            dismissed: "Izin notifikasi ditunda. Klik tombol lagi untuk mencoba.".to_string(),
            unsupported: "Browser tidak mendukung notifikasi".to_string(),
            error_prefix: "Error: ".to_string(),
        }
    }
}

impl Default for TestNotification {
    fn default() -> Self {
        Self {
            button: true,
            button_delay_ms: 1_000,
            button_label: "🔔 Test Notifikasi".to_string(),
            on_subscribe: true,
            title: "Test Berhasil! 🎉".to_string(),
            body: "Notifikasi dari Top Up BUSSID berhasil diaktifkan. Anda akan mendapatkan promo terbaru!".to_string(),
            direct_body: "Notifikasi dari Top Up BUSSID berhasil diaktifkan!".to_string(),
            direct_tag: "direct-test".to_string(),
            icon: DEFAULT_SITE_ICON.to_string(),
            image: Some(DEFAULT_PROMO_IMAGE.to_string()),
        }
    }
}
