use crate::types::{ClientInfo, ClientMessage, NotificationOptions, PermissionState, PushSubscription};

/// Page-side browser surface: worker registration, permission prompt and the
/// push manager.
pub trait PushPlatform: 'static {
    type Error: std::fmt::Display + 'static;
    type Fut<'a, T>: Future<Output = Result<T, Self::Error>> + 'a
    where
        Self: 'a,
        T: 'a;

    /// Service worker, notifications and push are all available.
    fn is_supported(&self) -> bool;
    fn client_info(&self) -> ClientInfo;
    fn page_url(&self) -> String;
    fn permission(&self) -> PermissionState;

    fn register_worker<'a>(&'a self, path: &'a str, scope: &'a str) -> Self::Fut<'a, ()>;
    /// Resolves once the registered worker is active.
    fn wait_until_active<'a>(&'a self) -> Self::Fut<'a, ()>;
    fn current_subscription<'a>(&'a self) -> Self::Fut<'a, Option<PushSubscription>>;
    fn request_permission<'a>(&'a self) -> Self::Fut<'a, PermissionState>;
    fn subscribe<'a>(&'a self, application_server_key: &'a [u8]) -> Self::Fut<'a, PushSubscription>;
    /// Drops the current subscription. `false` when there was none.
    fn unsubscribe<'a>(&'a self) -> Self::Fut<'a, bool>;

    /// Fails when no worker is active.
    fn post_to_worker(&self, message: &ClientMessage) -> Result<(), Self::Error>;
    fn show_direct_notification(
        &self,
        title: &str,
        options: &NotificationOptions,
    ) -> Result<(), Self::Error>;
}
