use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use time::OffsetDateTime;

/// Endpoint and keys handed out by the push service for this browser profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushSubscription {
    pub endpoint: String,
    /// Key name (`p256dh`, `auth`) to base64url value.
    pub keys: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInfo {
    pub user_agent: String,
    pub platform: String,
}

/// What gets written to local storage and POSTed to the remote endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRecord {
    pub endpoint: String,
    pub keys: BTreeMap<String, String>,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub user_agent: String,
    pub platform: String,
}

/// Reduced record kept when the full one cannot be stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupRecord {
    pub endpoint: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl SubscriptionRecord {
    pub fn capture(
        subscription: PushSubscription,
        client: &ClientInfo,
        timestamp: OffsetDateTime,
    ) -> Self {
        Self {
            endpoint: subscription.endpoint,
            keys: subscription.keys,
            timestamp,
            user_agent: client.user_agent.clone(),
            platform: client.platform.clone(),
        }
    }

    pub fn backup(&self) -> BackupRecord {
        BackupRecord {
            endpoint: self.endpoint.clone(),
            timestamp: self.timestamp,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;

    fn record() -> SubscriptionRecord {
        let mut keys = BTreeMap::new();
        keys.insert("p256dh".to_string(), "BNcRd".to_string());
        keys.insert("auth".to_string(), "tBHI".to_string());
        SubscriptionRecord::capture(
            PushSubscription {
                endpoint: "https://fcm.googleapis.com/fcm/send/abc".to_string(),
                keys,
            },
            &ClientInfo {
                user_agent: "Mozilla/5.0".to_string(),
                platform: "Linux armv8l".to_string(),
            },
            OffsetDateTime::from_unix_timestamp(1_756_300_000).expect("timestamp"),
        )
    }

    #[test]
    fn to_json__should_use_camel_case_wire_names() {
        // When
        let json: serde_json::Value =
            serde_json::from_str(&record().to_json().expect("encode")).expect("decode");

        // Then
        assert_eq!(json["endpoint"], "https://fcm.googleapis.com/fcm/send/abc");
        assert_eq!(json["keys"]["p256dh"], "BNcRd");
        assert_eq!(json["userAgent"], "Mozilla/5.0");
        assert_eq!(json["platform"], "Linux armv8l");
        assert_eq!(json["timestamp"], "2025-08-27T13:06:40Z");
    }

    #[test]
    fn from_json__should_restore_a_stored_record() {
        // Given
        let written = record();
        let stored = written.to_json().expect("encode");

        // When
        let restored = SubscriptionRecord::from_json(&stored).expect("decode");

        // Then
        assert_eq!(restored, written);
    }

    #[test]
    fn backup__should_keep_endpoint_and_timestamp_only() {
        // When
        let backup = record().backup();

        // Then
        let json = serde_json::to_value(&backup).expect("encode");
        assert_eq!(json.as_object().map(|object| object.len()), Some(2));
        assert_eq!(backup.endpoint, "https://fcm.googleapis.com/fcm/send/abc");
    }
}
