use std::pin::Pin;

use js_sys::{Array, Object};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{ClientQueryOptions, Notification, NotificationEvent, ServiceWorkerGlobalScope, WindowClient};

use super::js::{self, JsError};
use crate::ports;
use crate::types::{ClientInfo, NotificationOptions, PushSubscription};

pub struct ServiceWorkerScope {
    scope: ServiceWorkerGlobalScope,
}

impl ServiceWorkerScope {
    pub fn new(scope: ServiceWorkerGlobalScope) -> Self {
        Self { scope }
    }

    pub fn current() -> Result<Self, JsError> {
        js_sys::global()
            .dyn_into::<ServiceWorkerGlobalScope>()
            .map(Self::new)
            .map_err(|_| JsError::new("not running in a service worker"))
    }

    pub fn global(&self) -> &ServiceWorkerGlobalScope {
        &self.scope
    }

    async fn window_clients(&self) -> Result<Vec<WindowClient>, JsError> {
        let options = Object::new();
        js::set_property(&options, "type", &JsValue::from_str("window"))?;
        js::set_property(&options, "includeUncontrolled", &JsValue::TRUE)?;
        let clients = js::resolve(
            "clients.matchAll",
            self.scope
                .clients()
                .match_all_with_options(options.unchecked_ref::<ClientQueryOptions>()),
        )
        .await?;
        Ok(Array::from(&clients)
            .iter()
            .filter_map(|client| client.dyn_into::<WindowClient>().ok())
            .collect())
    }
}

impl ports::WorkerScope for ServiceWorkerScope {
    type Error = JsError;
    type Fut<'a, T>
        = Pin<Box<dyn Future<Output = Result<T, Self::Error>> + 'a>>
    where
        Self: 'a,
        T: 'a;

    fn origin(&self) -> String {
        self.scope.location().origin()
    }

    fn client_info(&self) -> ClientInfo {
        let navigator = self.scope.navigator();
        ClientInfo {
            user_agent: navigator.user_agent().unwrap_or_default(),
            platform: navigator.platform().unwrap_or_default(),
        }
    }

    fn skip_waiting<'a>(&'a self) -> Self::Fut<'a, ()> {
        Box::pin(async move {
            let promise = self
                .scope
                .skip_waiting()
                .map_err(|err| JsError::from_js("skipWaiting", err))?;
            js::resolve("skipWaiting", promise).await.map(|_| ())
        })
    }

    fn claim_clients<'a>(&'a self) -> Self::Fut<'a, ()> {
        Box::pin(async move {
            js::resolve("clients.claim", self.scope.clients().claim())
                .await
                .map(|_| ())
        })
    }

    fn show_notification<'a>(
        &'a self,
        title: &'a str,
        options: &'a NotificationOptions,
    ) -> Self::Fut<'a, ()> {
        Box::pin(async move {
            let options = js::to_js(options)?;
            let promise = self
                .scope
                .registration()
                .show_notification_with_options(title, options.unchecked_ref())
                .map_err(|err| JsError::from_js("showNotification", err))?;
            js::resolve("showNotification", promise).await.map(|_| ())
        })
    }

    fn focus_window<'a>(&'a self, url: &'a str) -> Self::Fut<'a, bool> {
        Box::pin(async move {
            let Some(client) = self
                .window_clients()
                .await?
                .into_iter()
                .find(|client| client.url() == url)
            else {
                return Ok(false);
            };
            let promise = client
                .focus()
                .map_err(|err| JsError::from_js("client.focus", err))?;
            js::resolve("client.focus", promise).await?;
            Ok(true)
        })
    }

    fn open_window<'a>(&'a self, url: &'a str) -> Self::Fut<'a, ()> {
        Box::pin(async move {
            js::resolve("clients.openWindow", self.scope.clients().open_window(url))
                .await
                .map(|_| ())
        })
    }

    fn current_subscription<'a>(&'a self) -> Self::Fut<'a, Option<PushSubscription>> {
        Box::pin(async move {
            let promise = self
                .scope
                .registration()
                .push_manager()
                .and_then(|manager| manager.get_subscription())
                .map_err(|err| JsError::from_js("pushManager.getSubscription", err))?;
            let value = js::resolve("pushManager.getSubscription", promise).await?;
            if value.is_null() || value.is_undefined() {
                return Ok(None);
            }
            js::subscription_from_js(value.unchecked_ref()).map(Some)
        })
    }
}

/// The notification carried by a `notificationclick` event.
pub struct ClickedNotification {
    action: String,
    notification: Notification,
}

impl ClickedNotification {
    pub fn from_event(event: &NotificationEvent) -> Self {
        Self {
            action: event.action(),
            notification: event.notification(),
        }
    }
}

impl ports::DisplayedNotification for ClickedNotification {
    fn action(&self) -> Option<String> {
        Some(self.action.clone()).filter(|action| !action.is_empty())
    }

    fn target_url(&self) -> Option<String> {
        js::get_string(&self.notification.data(), "url")
    }

    fn close(&self) {
        self.notification.close();
    }
}
