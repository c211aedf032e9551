use serde::{Deserialize, Serialize};

use super::notification::NotificationContent;

/// Messages a page may post to the service worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    #[serde(rename = "SHOW_NOTIFICATION")]
    ShowNotification(NotificationContent),
}
