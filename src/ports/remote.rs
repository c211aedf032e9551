use url::Url;

use crate::types::SubscriptionRecord;

/// Remote storage for subscription records. One unauthenticated POST, no
/// response body beyond ok/not-ok.
pub trait SubscriptionSink: 'static {
    type Error: std::fmt::Display + 'static;
    type Fut<'a>: Future<Output = Result<(), Self::Error>> + 'a
    where
        Self: 'a;

    fn deliver<'a>(&'a self, endpoint: &'a Url, record: &'a SubscriptionRecord) -> Self::Fut<'a>;
}
