use std::rc::Rc;
use std::sync::Once;

use js_sys::{Function, Promise, Reflect};
use serde::Serialize;
use tracing::{debug, info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, spawn_local};
use web_sys::{
    Document, Event, EventTarget, ExtendableEvent, ExtendableMessageEvent, NotificationEvent,
    PushEvent,
};

use crate::adapters::{
    BrowserClock, BrowserPlatform, ClickedNotification, DomToaster, FetchSink, LocalStorage,
    ServiceWorkerScope, insert_test_button, set_timeout,
};
use crate::{NotificationWorker, PushConfig, SubscriptionController};

type PageController =
    SubscriptionController<BrowserPlatform, LocalStorage, FetchSink, DomToaster, BrowserClock>;
type Worker = NotificationWorker<ServiceWorkerScope, FetchSink, BrowserClock>;

static LOGGING: Once = Once::new();

#[wasm_bindgen(js_name = initLogging)]
pub fn init_logging() {
    LOGGING.call_once(|| {
        console_error_panic_hook::set_once();
        tracing_wasm::set_as_global_default();
    });
}

/// `undefined` and `null` select the built-in configuration.
fn config_from_js(value: JsValue) -> Result<PushConfig, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(PushConfig::default());
    }
    serde_wasm_bindgen::from_value(value)
        .map_err(|err| JsValue::from_str(&format!("invalid push configuration: {err}")))
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|err| JsValue::from_str(&err.to_string()))
}

/// Page-side handle returned by `startPushClient`.
#[wasm_bindgen]
pub struct PushClient {
    controller: Rc<PageController>,
}

#[wasm_bindgen]
impl PushClient {
    /// Resolves to `already-subscribed`, `subscribed`, `denied` or
    /// `dismissed`.
    #[wasm_bindgen(js_name = requestPermission)]
    pub fn request_permission(&self) -> Promise {
        let controller = Rc::clone(&self.controller);
        future_to_promise(async move {
            controller
                .request_permission_and_subscribe()
                .await
                .map(|outcome| JsValue::from_str(outcome.as_str()))
                .map_err(|err| JsValue::from_str(&err.to_string()))
        })
    }

    pub fn unsubscribe(&self) -> Promise {
        let controller = Rc::clone(&self.controller);
        future_to_promise(async move {
            controller
                .unsubscribe()
                .await
                .map(JsValue::from_bool)
                .map_err(|err| JsValue::from_str(&err.to_string()))
        })
    }

    /// `worker`, `direct` or `skipped`.
    #[wasm_bindgen(js_name = showTestNotification)]
    pub fn show_test_notification(&self) -> String {
        self.controller.show_test_notification().as_str().to_string()
    }

    #[wasm_bindgen(js_name = isSubscribed)]
    pub fn is_subscribed(&self) -> bool {
        self.controller.is_subscribed()
    }

    pub fn state(&self) -> String {
        self.controller.state().as_str().to_string()
    }

    #[wasm_bindgen(js_name = storedSubscription)]
    pub fn stored_subscription(&self) -> Result<JsValue, JsValue> {
        match self.controller.stored_record() {
            Some(record) => to_js(&record),
            None => Ok(JsValue::NULL),
        }
    }
}

#[wasm_bindgen(js_name = startPushClient)]
pub fn start_push_client(config: JsValue) -> Result<PushClient, JsValue> {
    init_logging();
    let config = config_from_js(config)?;
    if config.vapid_public_key.trim().is_empty() {
        warn!("no VAPID public key configured, subscribing will fail");
    }
    let window =
        web_sys::window().ok_or_else(|| JsValue::from_str("startPushClient needs a window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("startPushClient needs a document"))?;

    let toaster = DomToaster::new(document.clone(), config.toast_duration());
    let controller = Rc::new(SubscriptionController::new(
        config,
        BrowserPlatform::new(window),
        LocalStorage::current(),
        FetchSink,
        toaster,
        BrowserClock,
    ));

    let starting = Rc::clone(&controller);
    spawn_local(async move {
        match starting.start().await {
            Ok(state) => info!(state = state.as_str(), "push client started"),
            Err(err) => warn!(error = %err, "push client failed to start"),
        }
    });
    if controller.config().test.button {
        schedule_test_button(&controller, document);
    }

    Ok(PushClient { controller })
}

fn schedule_test_button(controller: &Rc<PageController>, document: Document) {
    let label = controller.config().test.button_label.clone();
    let delay = controller.config().test.button_delay();
    let handle = Rc::clone(controller);
    let insert: Function = Closure::once_into_js(move || {
        let on_click = move || {
            let controller = Rc::clone(&handle);
            spawn_local(async move {
                if let Err(err) = controller.request_permission_and_subscribe().await {
                    debug!(error = %err, "test button request failed");
                }
            });
        };
        if let Err(err) = insert_test_button(&document, &label, on_click) {
            warn!(error = %err, "failed to insert the test button");
        }
    })
    .unchecked_into();
    if let Err(err) = set_timeout(&insert, delay) {
        warn!(error = %err, "failed to schedule the test button");
    }
}

#[wasm_bindgen(js_name = startNotificationWorker)]
pub fn start_notification_worker(config: JsValue) -> Result<(), JsValue> {
    init_logging();
    let config = config_from_js(config)?;
    let scope = ServiceWorkerScope::current().map_err(|err| JsValue::from_str(&err.to_string()))?;
    let target: EventTarget = scope.global().clone().into();
    let worker: Rc<Worker> = Rc::new(NotificationWorker::new(
        config,
        scope,
        FetchSink,
        BrowserClock,
    ));

    let handle = Rc::clone(&worker);
    listen(&target, "install", move |event: ExtendableEvent| {
        let worker = Rc::clone(&handle);
        extend(&event, async move {
            if let Err(err) = worker.on_install().await {
                warn!(error = %err, "install failed");
            }
        });
    })?;

    let handle = Rc::clone(&worker);
    listen(&target, "activate", move |event: ExtendableEvent| {
        let worker = Rc::clone(&handle);
        extend(&event, async move {
            if let Err(err) = worker.on_activate().await {
                warn!(error = %err, "activate failed");
            }
        });
    })?;

    let handle = Rc::clone(&worker);
    listen(&target, "push", move |event: PushEvent| {
        let worker = Rc::clone(&handle);
        let data = event.data().map(|data| data.text());
        extend(&event, async move {
            if let Err(err) = worker.on_push(data.as_deref()).await {
                warn!(error = %err, "failed to show push notification");
            }
        });
    })?;

    let handle = Rc::clone(&worker);
    listen(&target, "message", move |event: ExtendableMessageEvent| {
        let message = match serde_wasm_bindgen::from_value::<serde_json::Value>(event.data()) {
            Ok(message) => message,
            Err(err) => {
                debug!(error = %err, "ignoring unreadable client message");
                return;
            }
        };
        let worker = Rc::clone(&handle);
        extend(&event, async move {
            if let Err(err) = worker.on_message(message).await {
                warn!(error = %err, "failed to show client notification");
            }
        });
    })?;

    let handle = Rc::clone(&worker);
    listen(&target, "notificationclick", move |event: NotificationEvent| {
        let worker = Rc::clone(&handle);
        let notification = ClickedNotification::from_event(&event);
        extend(&event, async move {
            match worker.on_notification_click(&notification).await {
                Ok(outcome) => debug!(?outcome, "notification click handled"),
                Err(err) => warn!(error = %err, "notification click failed"),
            }
        });
    })?;

    let handle = Rc::clone(&worker);
    listen(&target, "notificationclose", move |event: NotificationEvent| {
        handle.on_notification_close(&event.notification().tag());
    })?;

    let handle = Rc::clone(&worker);
    listen(&target, "sync", move |event: ExtendableEvent| {
        let tag = Reflect::get(&event, &JsValue::from_str("tag"))
            .ok()
            .and_then(|tag| tag.as_string())
            .unwrap_or_default();
        let worker = Rc::clone(&handle);
        extend(&event, async move {
            match worker.on_sync(&tag).await {
                Ok(delivery) => debug!(?delivery, "sync handled"),
                Err(err) => warn!(error = %err, "sync failed"),
            }
        });
    })?;

    info!("notification worker listening");
    Ok(())
}

fn listen<E>(
    target: &EventTarget,
    kind: &str,
    mut handler: impl FnMut(E) + 'static,
) -> Result<(), JsValue>
where
    E: JsCast + 'static,
{
    let closure = Closure::wrap(
        Box::new(move |event: Event| handler(event.unchecked_into::<E>())) as Box<dyn FnMut(Event)>,
    );
    target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

/// Keeps the worker alive until `work` finishes.
fn extend(event: &ExtendableEvent, work: impl Future<Output = ()> + 'static) {
    let promise = future_to_promise(async move {
        work.await;
        Ok(JsValue::UNDEFINED)
    });
    if let Err(err) = event.wait_until(&promise) {
        warn!(error = ?err, "waitUntil rejected the promise");
    }
}
