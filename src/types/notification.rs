use serde::{Deserialize, Serialize};

use crate::config::NotificationDefaults;

pub const OPEN_ACTION: &str = "open";
pub const CLOSE_ACTION: &str = "close";

/// Loose notification fields as they arrive in a push body or a client
/// message. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationData {
    pub url: String,
}

/// Options object handed to `showNotification`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationOptions {
    pub body: String,
    pub icon: String,
    pub badge: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub data: NotificationData,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<NotificationAction>,
    pub tag: String,
    pub require_interaction: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vibrate: Option<Vec<u32>>,
}

/// A notification with every default applied, ready to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationPayload {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub image: Option<String>,
    pub badge: String,
    pub url: String,
    pub tag: String,
    pub actions: Vec<NotificationAction>,
    pub vibrate: Option<Vec<u32>>,
    pub require_interaction: bool,
}

impl NotificationPayload {
    /// Fills every unset field from the site defaults. Empty strings count as
    /// unset. Image, actions and vibration follow the richness flags.
    pub fn from_content(
        content: NotificationContent,
        site_name: &str,
        defaults: &NotificationDefaults,
    ) -> Self {
        let rich = &defaults.rich;
        let image = if rich.image {
            non_empty(content.image).or_else(|| defaults.image.clone())
        } else {
            None
        };
        let actions = if rich.actions {
            vec![
                NotificationAction {
                    action: OPEN_ACTION.to_string(),
                    title: defaults.open_label.clone(),
                },
                NotificationAction {
                    action: CLOSE_ACTION.to_string(),
                    title: defaults.close_label.clone(),
                },
            ]
        } else {
            Vec::new()
        };

        Self {
            title: non_empty(content.title).unwrap_or_else(|| site_name.to_string()),
            body: non_empty(content.body).unwrap_or_else(|| defaults.body.clone()),
            icon: non_empty(content.icon).unwrap_or_else(|| defaults.icon.clone()),
            image,
            badge: defaults.badge.clone(),
            url: non_empty(content.url).unwrap_or_else(|| defaults.url.clone()),
            tag: non_empty(content.tag).unwrap_or_else(|| defaults.tag.clone()),
            actions,
            vibrate: rich.vibrate.then(|| rich.vibrate_pattern.clone()),
            require_interaction: defaults.require_interaction,
        }
    }

    pub fn options(&self) -> NotificationOptions {
        NotificationOptions {
            body: self.body.clone(),
            icon: self.icon.clone(),
            badge: self.badge.clone(),
            image: self.image.clone(),
            data: NotificationData {
                url: self.url.clone(),
            },
            actions: self.actions.clone(),
            tag: self.tag.clone(),
            require_interaction: self.require_interaction,
            vibrate: self.vibrate.clone(),
        }
    }
}

/// What the user clicked on a rendered notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickAction {
    /// The notification body itself, no action id.
    Default,
    Open,
    Close,
    Other(String),
}

impl ClickAction {
    pub fn parse(action: Option<&str>) -> Self {
        match action {
            None | Some("") => ClickAction::Default,
            Some(OPEN_ACTION) => ClickAction::Open,
            Some(CLOSE_ACTION) => ClickAction::Close,
            Some(other) => ClickAction::Other(other.to_string()),
        }
    }

    /// Everything except the explicit close action navigates.
    pub fn opens_window(&self) -> bool {
        !matches!(self, ClickAction::Close)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_SITE_ICON, DEFAULT_SITE_NAME, PushConfig};

    #[test]
    fn from_content__should_fill_defaults_for_missing_fields() {
        // Given
        let config = PushConfig::default();

        // When
        let payload = NotificationPayload::from_content(
            NotificationContent::default(),
            &config.site_name,
            &config.notification,
        );

        // Then
        assert_eq!(payload.title, DEFAULT_SITE_NAME);
        assert_eq!(payload.body, "Notifikasi dari Top Up BUSSID");
        assert_eq!(payload.icon, DEFAULT_SITE_ICON);
        assert_eq!(payload.badge, DEFAULT_SITE_ICON);
        assert_eq!(payload.url, "/");
        assert_eq!(payload.tag, "bussid-notification");
        assert!(payload.require_interaction);
    }

    #[test]
    fn from_content__should_treat_empty_strings_as_missing() {
        // Given
        let config = PushConfig::default();
        let content = NotificationContent {
            title: Some(String::new()),
            body: Some(String::new()),
            ..NotificationContent::default()
        };

        // When
        let payload =
            NotificationPayload::from_content(content, &config.site_name, &config.notification);

        // Then
        assert_eq!(payload.title, DEFAULT_SITE_NAME);
        assert_eq!(payload.body, config.notification.body);
    }

    #[test]
    fn from_content__should_drop_rich_fields_when_disabled() {
        // Given
        let mut config = PushConfig::default();
        config.notification.rich.image = false;
        config.notification.rich.actions = false;
        config.notification.rich.vibrate = false;
        let content = NotificationContent {
            image: Some("https://cdn.example/promo.png".to_string()),
            ..NotificationContent::default()
        };

        // When
        let options =
            NotificationPayload::from_content(content, &config.site_name, &config.notification)
                .options();

        // Then
        assert_eq!(options.image, None);
        assert!(options.actions.is_empty());
        assert_eq!(options.vibrate, None);
        let json = serde_json::to_value(&options).expect("encode");
        assert!(json.get("image").is_none());
        assert!(json.get("actions").is_none());
        assert!(json.get("vibrate").is_none());
    }

    #[test]
    fn options__should_serialize_with_platform_field_names() {
        // Given
        let mut config = PushConfig::default();
        config.notification.rich.vibrate = true;
        let payload = NotificationPayload::from_content(
            NotificationContent::default(),
            &config.site_name,
            &config.notification,
        );

        // When
        let json = serde_json::to_value(payload.options()).expect("encode");

        // Then
        assert_eq!(json["requireInteraction"], true);
        assert_eq!(json["data"]["url"], "/");
        assert_eq!(json["actions"][0]["action"], "open");
        assert_eq!(json["actions"][0]["title"], "Buka Website");
        assert_eq!(json["actions"][1]["action"], "close");
        assert_eq!(json["vibrate"], serde_json::json!([200, 100, 200]));
    }

    #[test]
    fn parse__should_map_missing_action_to_default() {
        // Then
        assert_eq!(ClickAction::parse(None), ClickAction::Default);
        assert_eq!(ClickAction::parse(Some("")), ClickAction::Default);
        assert_eq!(ClickAction::parse(Some("open")), ClickAction::Open);
        assert_eq!(ClickAction::parse(Some("close")), ClickAction::Close);
        assert!(ClickAction::parse(Some("later")).opens_window());
        assert!(!ClickAction::parse(Some("close")).opens_window());
    }
}
