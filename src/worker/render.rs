//! Turning push bodies and client messages into renderable notifications.
//! Pure functions, shared by the worker and the preview command.

use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::config::PushConfig;
use crate::error::WorkerError;
use crate::types::{ClientMessage, NotificationContent, NotificationPayload};

/// Reads a push body as JSON, or as plain text under the site name when it
/// is not JSON at all.
pub fn parse_push_body(raw: &str) -> NotificationContent {
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => content_from_value(&value),
        Err(err) => {
            debug!(error = %err, "push body is not JSON, rendering it as text");
            NotificationContent {
                body: Some(raw.to_string()),
                ..NotificationContent::default()
            }
        }
    }
}

/// Picks the known fields out of a JSON object. Numbers and booleans are
/// shown as text, any other type counts as missing.
fn content_from_value(value: &Value) -> NotificationContent {
    let field = |name: &str| match value.get(name)? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    };
    NotificationContent {
        title: field("title"),
        body: field("body"),
        icon: field("icon"),
        image: field("image"),
        url: field("url"),
        tag: field("tag"),
    }
}

/// Resolves `target` against the worker origin. Absolute targets pass
/// through unchanged.
pub fn resolve_url(origin: &str, target: &str) -> Result<String, url::ParseError> {
    Ok(Url::parse(origin)?.join(target)?.into())
}

/// Applies defaults, an optional tag override and url resolution.
pub fn prepare(
    content: NotificationContent,
    origin: &str,
    config: &PushConfig,
    tag: Option<&str>,
) -> Result<NotificationPayload, WorkerError> {
    let mut payload =
        NotificationPayload::from_content(content, &config.site_name, &config.notification);
    if let Some(tag) = tag {
        payload.tag = tag.to_string();
    }
    payload.url = match resolve_url(origin, &payload.url) {
        Ok(url) => url,
        Err(err) => {
            warn!(url = %payload.url, error = %err, "unusable notification url, using the default");
            resolve_url(origin, &config.notification.url)?
        }
    };
    Ok(payload)
}

pub fn render_push(
    raw: &str,
    origin: &str,
    config: &PushConfig,
) -> Result<NotificationPayload, WorkerError> {
    prepare(parse_push_body(raw), origin, config, None)
}

/// `None` for anything that is not a `SHOW_NOTIFICATION` message.
pub fn render_message(
    message: serde_json::Value,
    origin: &str,
    config: &PushConfig,
) -> Result<Option<NotificationPayload>, WorkerError> {
    let ClientMessage::ShowNotification(mut content) =
        match serde_json::from_value::<ClientMessage>(message) {
            Ok(message) => message,
            Err(err) => {
                debug!(error = %err, "ignoring client message");
                return Ok(None);
            }
        };
    content.tag = None;
    let tag = config.notification.client_tag.as_str();
    prepare(content, origin, config, Some(tag)).map(Some)
}
