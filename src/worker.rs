pub mod render;

use tracing::{debug, info, warn};

use crate::config::PushConfig;
use crate::error::WorkerError;
use crate::ports::{DisplayedNotification, SubscriptionSink, TimeProvider, WorkerScope};
use crate::push::{self, RemoteDelivery};
use crate::types::{ClickAction, NotificationPayload, SubscriptionRecord};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// A window already at the url got focus.
    Focused(String),
    Opened(String),
    /// The close action; nothing beyond closing the notification.
    Closed,
}

/// Service-worker half: lifecycle, rendering and notification interaction.
pub struct NotificationWorker<W, R, T> {
    config: PushConfig,
    scope: W,
    sink: R,
    time: T,
}

impl<W, R, T> NotificationWorker<W, R, T>
where
    W: WorkerScope,
    R: SubscriptionSink,
    T: TimeProvider,
{
    pub fn new(config: PushConfig, scope: W, sink: R, time: T) -> Self {
        Self {
            config,
            scope,
            sink,
            time,
        }
    }

    pub fn config(&self) -> &PushConfig {
        &self.config
    }

    /// Activates the new worker without waiting for old pages to close.
    pub async fn on_install(&self) -> Result<(), WorkerError> {
        info!("service worker installed");
        self.scope
            .skip_waiting()
            .await
            .map_err(|err| WorkerError::Lifecycle(err.to_string()))
    }

    /// Takes control of already open pages.
    pub async fn on_activate(&self) -> Result<(), WorkerError> {
        info!("service worker activated");
        self.scope
            .claim_clients()
            .await
            .map_err(|err| WorkerError::Lifecycle(err.to_string()))
    }

    /// Renders a push. A push without data is ignored.
    pub async fn on_push(
        &self,
        data: Option<&str>,
    ) -> Result<Option<NotificationPayload>, WorkerError> {
        let Some(raw) = data else {
            debug!("push event without data");
            return Ok(None);
        };
        let payload = render::render_push(raw, &self.scope.origin(), &self.config)?;
        self.show(&payload).await?;
        Ok(Some(payload))
    }

    /// Renders a `SHOW_NOTIFICATION` message from a page.
    pub async fn on_message(
        &self,
        message: serde_json::Value,
    ) -> Result<Option<NotificationPayload>, WorkerError> {
        let Some(payload) = render::render_message(message, &self.scope.origin(), &self.config)?
        else {
            return Ok(None);
        };
        self.show(&payload).await?;
        Ok(Some(payload))
    }

    async fn show(&self, payload: &NotificationPayload) -> Result<(), WorkerError> {
        info!(title = %payload.title, tag = %payload.tag, "showing notification");
        let options = payload.options();
        self.scope
            .show_notification(&payload.title, &options)
            .await
            .map_err(|err| WorkerError::Render(err.to_string()))
    }

    /// Closes the notification, then focuses or opens its url unless the
    /// close action was used.
    pub async fn on_notification_click<N: DisplayedNotification>(
        &self,
        notification: &N,
    ) -> Result<ClickOutcome, WorkerError> {
        notification.close();
        let action = ClickAction::parse(notification.action().as_deref());
        if !action.opens_window() {
            debug!("notification closed through its close action");
            return Ok(ClickOutcome::Closed);
        }

        let target = notification
            .target_url()
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| self.config.notification.url.clone());
        let url = render::resolve_url(&self.scope.origin(), &target)?;
        info!(?action, %url, "notification clicked");

        match self.scope.focus_window(&url).await {
            Ok(true) => return Ok(ClickOutcome::Focused(url)),
            Ok(false) => {}
            Err(err) => warn!(error = %err, "failed to focus an open window"),
        }
        self.scope
            .open_window(&url)
            .await
            .map_err(|err| WorkerError::Window(err.to_string()))?;
        Ok(ClickOutcome::Opened(url))
    }

    pub fn on_notification_close(&self, tag: &str) {
        debug!(%tag, "notification dismissed");
    }

    /// Background sync: re-sends the subscription once connectivity is back.
    pub async fn on_sync(&self, tag: &str) -> Result<RemoteDelivery, WorkerError> {
        if tag != self.config.sync_tag {
            debug!(%tag, "ignoring sync event");
            return Ok(RemoteDelivery::Skipped);
        }
        let Some(endpoint) = self.config.remote_endpoint.as_ref() else {
            debug!("no remote endpoint configured, nothing to sync");
            return Ok(RemoteDelivery::Skipped);
        };

        let subscription = self
            .scope
            .current_subscription()
            .await
            .map_err(|err| WorkerError::Subscription(err.to_string()))?;
        let Some(subscription) = subscription else {
            info!("no push subscription to send");
            return Ok(RemoteDelivery::Skipped);
        };
        let record =
            SubscriptionRecord::capture(subscription, &self.scope.client_info(), self.time.now());
        Ok(push::deliver_record(&self.sink, Some(endpoint), &record).await)
    }
}
