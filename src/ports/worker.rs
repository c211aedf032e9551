use crate::types::{ClientInfo, NotificationOptions, PushSubscription};

/// The service worker's global scope.
pub trait WorkerScope: 'static {
    type Error: std::fmt::Display + 'static;
    type Fut<'a, T>: Future<Output = Result<T, Self::Error>> + 'a
    where
        Self: 'a,
        T: 'a;

    /// Origin the worker was served from, e.g. `https://topup.example`.
    fn origin(&self) -> String;
    fn client_info(&self) -> ClientInfo;

    fn skip_waiting<'a>(&'a self) -> Self::Fut<'a, ()>;
    fn claim_clients<'a>(&'a self) -> Self::Fut<'a, ()>;
    fn show_notification<'a>(
        &'a self,
        title: &'a str,
        options: &'a NotificationOptions,
    ) -> Self::Fut<'a, ()>;
    /// Focuses a window already showing `url`. `false` when none matched.
    fn focus_window<'a>(&'a self, url: &'a str) -> Self::Fut<'a, bool>;
    fn open_window<'a>(&'a self, url: &'a str) -> Self::Fut<'a, ()>;
    fn current_subscription<'a>(&'a self) -> Self::Fut<'a, Option<PushSubscription>>;
}

/// A notification the user just interacted with.
pub trait DisplayedNotification {
    fn action(&self) -> Option<String>;
    fn target_url(&self) -> Option<String>;
    fn close(&self);
}
