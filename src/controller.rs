use std::cell::Cell;

use tracing::{debug, error, info, warn};

use crate::config::PushConfig;
use crate::error::ControllerError;
use crate::ports::{Feedback, KeyValueStore, MessageKind, PushPlatform, SubscriptionSink, TimeProvider};
use crate::push::{self, RemoteDelivery};
use crate::types::{
    ClientMessage, NotificationContent, NotificationPayload, PermissionState, PushSubscription,
    SubscriptionRecord,
};

/// Where the controller is in the page-load lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Uninitialized,
    /// The browser lacks service workers, notifications or push.
    Halted,
    WorkerRegistered,
    /// Not subscribed yet, permission not asked in this page load.
    PermissionPending,
    PermissionRequested,
    Subscribing,
    Subscribed,
    /// The user denied notifications. Only browser settings can undo it.
    Blocked,
    /// The prompt was dismissed or failed; asking again is allowed.
    Idle,
}

impl ControllerState {
    pub fn as_str(self) -> &'static str {
        match self {
            ControllerState::Uninitialized => "uninitialized",
            ControllerState::Halted => "halted",
            ControllerState::WorkerRegistered => "worker-registered",
            ControllerState::PermissionPending => "permission-pending",
            ControllerState::PermissionRequested => "permission-requested",
            ControllerState::Subscribing => "subscribing",
            ControllerState::Subscribed => "subscribed",
            ControllerState::Blocked => "blocked",
            ControllerState::Idle => "idle",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionOutcome {
    AlreadySubscribed,
    Subscribed(SubscriptionRecord),
    Denied,
    Dismissed,
}

impl PermissionOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionOutcome::AlreadySubscribed => "already-subscribed",
            PermissionOutcome::Subscribed(_) => "subscribed",
            PermissionOutcome::Denied => "denied",
            PermissionOutcome::Dismissed => "dismissed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoredAs {
    Primary,
    Backup,
    Nothing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShipReport {
    pub stored: StoredAs,
    pub remote: RemoteDelivery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestDelivery {
    /// Posted to the active service worker.
    Worker,
    /// Shown by the page itself.
    Direct,
    Skipped,
}

impl TestDelivery {
    pub fn as_str(self) -> &'static str {
        match self {
            TestDelivery::Worker => "worker",
            TestDelivery::Direct => "direct",
            TestDelivery::Skipped => "skipped",
        }
    }
}

/// Page-side half of the push setup: registers the worker, asks for
/// permission, subscribes and keeps the subscription record shipped.
///
/// Meant to be constructed once per page and shared by reference; state
/// lives in `Cell`s because everything runs on one event loop.
pub struct SubscriptionController<P, S, R, F, T> {
    config: PushConfig,
    platform: P,
    storage: S,
    sink: R,
    feedback: F,
    time: T,
    subscribed: Cell<bool>,
    state: Cell<ControllerState>,
}

impl<P, S, R, F, T> SubscriptionController<P, S, R, F, T>
where
    P: PushPlatform,
    S: KeyValueStore,
    R: SubscriptionSink,
    F: Feedback,
    T: TimeProvider,
{
    pub fn new(config: PushConfig, platform: P, storage: S, sink: R, feedback: F, time: T) -> Self {
        Self {
            config,
            platform,
            storage,
            sink,
            feedback,
            time,
            subscribed: Cell::new(false),
            state: Cell::new(ControllerState::Uninitialized),
        }
    }

    pub fn config(&self) -> &PushConfig {
        &self.config
    }

    pub fn state(&self) -> ControllerState {
        self.state.get()
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed.get()
    }

    /// Initializes and, when configured, asks for permission on its own once
    /// the startup delay has passed.
    pub async fn start(&self) -> Result<ControllerState, ControllerError> {
        self.initialize().await?;

        let Some(delay) = self.config.auto_request_delay() else {
            return Ok(self.state());
        };
        if !self.should_auto_request() {
            return Ok(self.state());
        }

        debug!(delay_ms = delay.as_millis() as u64, "scheduling permission request");
        self.time.sleep(delay).await;
        // The visitor may have used the button while we waited.
        if self.should_auto_request() {
            self.request_permission_and_subscribe().await?;
        }
        Ok(self.state())
    }

    /// Checks support, registers the worker, waits for it to activate and
    /// refreshes the subscription flag. Returns whether a subscription exists.
    pub async fn initialize(&self) -> Result<bool, ControllerError> {
        if !self.platform.is_supported() {
            warn!("push notifications are not supported here");
            self.state.set(ControllerState::Halted);
            self.feedback
                .show(&self.config.feedback.unsupported, MessageKind::Warning);
            return Err(ControllerError::Unsupported);
        }

        let worker = &self.config.worker;
        self.platform
            .register_worker(&worker.path, &worker.scope)
            .await
            .map_err(|err| ControllerError::Registration(err.to_string()))?;
        self.platform
            .wait_until_active()
            .await
            .map_err(|err| ControllerError::Registration(err.to_string()))?;
        self.state.set(ControllerState::WorkerRegistered);
        info!(path = %worker.path, scope = %worker.scope, "service worker active");

        self.check_subscription_status().await
    }

    /// Re-reads the platform's subscription. An existing subscription is
    /// shipped again, which only overwrites the stored record.
    pub async fn check_subscription_status(&self) -> Result<bool, ControllerError> {
        let subscription = self
            .platform
            .current_subscription()
            .await
            .map_err(|err| ControllerError::SubscriptionQuery(err.to_string()))?;

        match subscription {
            Some(subscription) => {
                debug!(endpoint = %subscription.endpoint, "existing push subscription");
                self.mark_subscribed();
                let record = self.capture(subscription);
                self.ship_subscription_record(&record).await;
                Ok(true)
            }
            None => {
                self.subscribed.set(false);
                let state = if self.platform.permission() == PermissionState::Denied {
                    ControllerState::Blocked
                } else {
                    ControllerState::PermissionPending
                };
                self.state.set(state);
                Ok(false)
            }
        }
    }

    /// One-shot permission prompt followed by subscribe on `granted`.
    /// Concurrent calls are not coordinated.
    pub async fn request_permission_and_subscribe(
        &self,
    ) -> Result<PermissionOutcome, ControllerError> {
        if self.is_subscribed() {
            debug!("already subscribed, skipping permission request");
            return Ok(PermissionOutcome::AlreadySubscribed);
        }

        self.state.set(ControllerState::PermissionRequested);
        let permission = match self.platform.request_permission().await {
            Ok(permission) => permission,
            Err(err) => {
                let err = ControllerError::Permission(err.to_string());
                self.fail(&err);
                return Err(err);
            }
        };
        info!(%permission, "notification permission answered");

        match permission {
            PermissionState::Granted => self.subscribe().await.map(PermissionOutcome::Subscribed),
            PermissionState::Denied => {
                self.state.set(ControllerState::Blocked);
                self.feedback
                    .show(&self.config.feedback.denied, MessageKind::Error);
                Ok(PermissionOutcome::Denied)
            }
            PermissionState::Default => {
                self.state.set(ControllerState::Idle);
                self.feedback
                    .show(&self.config.feedback.dismissed, MessageKind::Info);
                Ok(PermissionOutcome::Dismissed)
            }
        }
    }

    async fn subscribe(&self) -> Result<SubscriptionRecord, ControllerError> {
        self.state.set(ControllerState::Subscribing);
        let subscription = match self.create_subscription().await {
            Ok(subscription) => subscription,
            Err(err) => {
                self.fail(&err);
                return Err(err);
            }
        };

        self.mark_subscribed();
        info!(endpoint = %subscription.endpoint, "push subscription created");
        let record = self.capture(subscription);
        self.ship_subscription_record(&record).await;
        if self.config.test.on_subscribe {
            self.show_test_notification();
        }
        self.feedback
            .show(&self.config.feedback.granted, MessageKind::Success);
        Ok(record)
    }

    async fn create_subscription(&self) -> Result<PushSubscription, ControllerError> {
        let key = self.config.application_server_key()?;
        self.platform
            .subscribe(&key)
            .await
            .map_err(|err| ControllerError::Subscribe(err.to_string()))
    }

    /// Stores the record locally and, when a remote endpoint is configured,
    /// POSTs it there. Nothing here fails the caller.
    pub async fn ship_subscription_record(&self, record: &SubscriptionRecord) -> ShipReport {
        let stored = self.store_record(record);
        let remote =
            push::deliver_record(&self.sink, self.config.remote_endpoint.as_ref(), record).await;
        ShipReport { stored, remote }
    }

    fn store_record(&self, record: &SubscriptionRecord) -> StoredAs {
        let keys = &self.config.storage;
        let primary = record
            .to_json()
            .map_err(|err| err.to_string())
            .and_then(|json| {
                self.storage
                    .set(&keys.subscription, &json)
                    .map_err(|err| err.to_string())
            });
        let Err(err) = primary else {
            debug!(key = %keys.subscription, "subscription stored");
            return StoredAs::Primary;
        };

        warn!(error = %err, "failed to store subscription, writing backup");
        let backup = serde_json::to_string(&record.backup())
            .map_err(|err| err.to_string())
            .and_then(|json| {
                self.storage
                    .set(&keys.backup, &json)
                    .map_err(|err| err.to_string())
            });
        match backup {
            Ok(()) => StoredAs::Backup,
            Err(err) => {
                error!(error = %err, "failed to store subscription backup");
                StoredAs::Nothing
            }
        }
    }

    /// The record kept in local storage, if any.
    pub fn stored_record(&self) -> Option<SubscriptionRecord> {
        let raw = match self.storage.get(&self.config.storage.subscription) {
            Ok(raw) => raw?,
            Err(err) => {
                warn!(error = %err, "failed to read stored subscription");
                return None;
            }
        };
        match SubscriptionRecord::from_json(&raw) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!(error = %err, "stored subscription is corrupt");
                None
            }
        }
    }

    /// Drops the platform subscription and the local records. Remote copies
    /// are left alone. Returns whether a subscription was removed.
    pub async fn unsubscribe(&self) -> Result<bool, ControllerError> {
        let current = self
            .platform
            .current_subscription()
            .await
            .map_err(|err| ControllerError::SubscriptionQuery(err.to_string()))?;
        let removed = match current {
            Some(_) => self
                .platform
                .unsubscribe()
                .await
                .map_err(|err| ControllerError::Unsubscribe(err.to_string()))?,
            None => false,
        };

        let keys = &self.config.storage;
        for key in [&keys.subscription, &keys.backup] {
            if let Err(err) = self.storage.remove(key) {
                warn!(%key, error = %err, "failed to clear stored subscription");
            }
        }
        self.subscribed.set(false);
        self.state.set(ControllerState::PermissionPending);
        info!(removed, "unsubscribed from push");
        Ok(removed)
    }

    /// Asks the worker to show a test notification; falls back to a page
    /// notification when no worker takes the message.
    pub fn show_test_notification(&self) -> TestDelivery {
        let test = &self.config.test;
        let content = NotificationContent {
            title: Some(test.title.clone()),
            body: Some(test.body.clone()),
            icon: Some(test.icon.clone()),
            image: test.image.clone(),
            url: Some(self.platform.page_url()),
            tag: None,
        };

        let err = match self
            .platform
            .post_to_worker(&ClientMessage::ShowNotification(content.clone()))
        {
            Ok(()) => {
                debug!("test notification handed to the service worker");
                return TestDelivery::Worker;
            }
            Err(err) => err,
        };
        warn!(error = %err, "service worker unavailable for test notification");

        if self.platform.permission() != PermissionState::Granted {
            return TestDelivery::Skipped;
        }
        let mut payload = NotificationPayload::from_content(
            NotificationContent {
                body: Some(test.direct_body.clone()),
                ..content
            },
            &self.config.site_name,
            &self.config.notification,
        );
        payload.tag = test.direct_tag.clone();
        // Page notifications are not persistent and cannot carry actions.
        payload.actions.clear();
        payload.vibrate = None;
        match self
            .platform
            .show_direct_notification(&payload.title, &payload.options())
        {
            Ok(()) => TestDelivery::Direct,
            Err(err) => {
                error!(error = %err, "direct test notification failed");
                TestDelivery::Skipped
            }
        }
    }

    pub fn show_transient_message(&self, text: &str, kind: MessageKind) {
        self.feedback.show(text, kind);
    }

    fn should_auto_request(&self) -> bool {
        !self.is_subscribed() && self.platform.permission() == PermissionState::Default
    }

    fn mark_subscribed(&self) {
        self.subscribed.set(true);
        self.state.set(ControllerState::Subscribed);
    }

    fn capture(&self, subscription: PushSubscription) -> SubscriptionRecord {
        SubscriptionRecord::capture(subscription, &self.platform.client_info(), self.time.now())
    }

    fn fail(&self, err: &ControllerError) {
        error!(error = %err, "push setup failed");
        self.state.set(ControllerState::Idle);
        let text = format!("{}{}", self.config.feedback.error_prefix, err);
        self.feedback.show(&text, MessageKind::Error);
    }
}
