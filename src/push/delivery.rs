use tracing::{info, warn};
use url::Url;

use crate::ports::SubscriptionSink;
use crate::types::SubscriptionRecord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteDelivery {
    /// No remote endpoint configured or nothing to send.
    Skipped,
    Delivered,
    Failed(String),
}

/// Best-effort POST of a subscription record. Failures are logged and
/// reported, never retried.
pub async fn deliver_record<R: SubscriptionSink>(
    sink: &R,
    endpoint: Option<&Url>,
    record: &SubscriptionRecord,
) -> RemoteDelivery {
    let Some(endpoint) = endpoint else {
        return RemoteDelivery::Skipped;
    };

    match sink.deliver(endpoint, record).await {
        Ok(()) => {
            info!(%endpoint, subscription = %record.endpoint, "subscription delivered");
            RemoteDelivery::Delivered
        }
        Err(err) => {
            warn!(%endpoint, error = %err, "subscription delivery failed");
            RemoteDelivery::Failed(err.to_string())
        }
    }
}
