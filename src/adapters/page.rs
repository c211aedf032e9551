use std::cell::RefCell;
use std::pin::Pin;

use js_sys::{Object, Promise, Reflect, Uint8Array};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Notification, NotificationPermission, PushManager, PushSubscriptionOptionsInit,
    RegistrationOptions, ServiceWorkerContainer, ServiceWorkerRegistration, Window,
};

use super::js::{self, JsError};
use crate::ports;
use crate::types::{
    ClientInfo, ClientMessage, NotificationOptions, PermissionState, PushSubscription,
};

/// The page's `navigator.serviceWorker`, `Notification` and push manager.
pub struct BrowserPlatform {
    window: Window,
    registration: RefCell<Option<ServiceWorkerRegistration>>,
}

impl BrowserPlatform {
    pub fn new(window: Window) -> Self {
        Self {
            window,
            registration: RefCell::new(None),
        }
    }

    pub fn current() -> Result<Self, JsError> {
        web_sys::window()
            .map(Self::new)
            .ok_or_else(|| JsError::new("not running in a window"))
    }

    fn has(&self, target: &JsValue, name: &str) -> bool {
        Reflect::has(target, &JsValue::from_str(name)).unwrap_or(false)
    }

    fn container(&self) -> ServiceWorkerContainer {
        self.window.navigator().service_worker()
    }

    fn registration(&self) -> Result<ServiceWorkerRegistration, JsError> {
        self.registration
            .borrow()
            .clone()
            .ok_or_else(|| JsError::new("service worker is not registered"))
    }

    fn push_manager(&self) -> Result<PushManager, JsError> {
        self.registration()?
            .push_manager()
            .map_err(|err| JsError::from_js("registration.pushManager", err))
    }
}

impl ports::PushPlatform for BrowserPlatform {
    type Error = JsError;
    type Fut<'a, T>
        = Pin<Box<dyn Future<Output = Result<T, Self::Error>> + 'a>>
    where
        Self: 'a,
        T: 'a;

    fn is_supported(&self) -> bool {
        self.has(&self.window.navigator(), "serviceWorker")
            && self.has(&self.window, "Notification")
            && self.has(&self.window, "PushManager")
    }

    fn client_info(&self) -> ClientInfo {
        let navigator = self.window.navigator();
        ClientInfo {
            user_agent: navigator.user_agent().unwrap_or_default(),
            platform: navigator.platform().unwrap_or_default(),
        }
    }

    fn page_url(&self) -> String {
        self.window.location().href().unwrap_or_default()
    }

    fn permission(&self) -> PermissionState {
        match Notification::permission() {
            NotificationPermission::Granted => PermissionState::Granted,
            NotificationPermission::Denied => PermissionState::Denied,
            _ => PermissionState::Default,
        }
    }

    fn register_worker<'a>(&'a self, path: &'a str, scope: &'a str) -> Self::Fut<'a, ()> {
        Box::pin(async move {
            let options = RegistrationOptions::new();
            options.set_scope(scope);
            let registration = js::resolve(
                "serviceWorker.register",
                self.container().register_with_options(path, &options),
            )
            .await?
            .dyn_into::<ServiceWorkerRegistration>()
            .map_err(|_| JsError::new("unexpected return value from serviceWorker.register"))?;
            self.registration.replace(Some(registration));
            Ok(())
        })
    }

    fn wait_until_active<'a>(&'a self) -> Self::Fut<'a, ()> {
        Box::pin(async move {
            let ready = self
                .container()
                .ready()
                .map_err(|err| JsError::from_js("serviceWorker.ready", err))?;
            let registration = js::resolve("serviceWorker.ready", ready)
                .await?
                .dyn_into::<ServiceWorkerRegistration>()
                .map_err(|_| JsError::new("unexpected return value from serviceWorker.ready"))?;
            self.registration.replace(Some(registration));
            Ok(())
        })
    }

    fn current_subscription<'a>(&'a self) -> Self::Fut<'a, Option<PushSubscription>> {
        Box::pin(async move {
            let promise = self
                .push_manager()?
                .get_subscription()
                .map_err(|err| JsError::from_js("pushManager.getSubscription", err))?;
            let value = js::resolve("pushManager.getSubscription", promise).await?;
            if value.is_null() || value.is_undefined() {
                return Ok(None);
            }
            js::subscription_from_js(value.unchecked_ref()).map(Some)
        })
    }

    fn request_permission<'a>(&'a self) -> Self::Fut<'a, PermissionState> {
        Box::pin(async move {
            let promise = Notification::request_permission()
                .map_err(|err| JsError::from_js("Notification.requestPermission", err))?;
            let answer = js::resolve("Notification.requestPermission", promise).await?;
            Ok(answer
                .as_string()
                .map(|answer| PermissionState::from_platform(&answer))
                .unwrap_or_default())
        })
    }

    fn subscribe<'a>(
        &'a self,
        application_server_key: &'a [u8],
    ) -> Self::Fut<'a, PushSubscription> {
        Box::pin(async move {
            let options = Object::new();
            js::set_property(&options, "userVisibleOnly", &JsValue::TRUE)?;
            js::set_property(
                &options,
                "applicationServerKey",
                &Uint8Array::from(application_server_key),
            )?;
            let promise = self
                .push_manager()?
                .subscribe_with_options(options.unchecked_ref::<PushSubscriptionOptionsInit>())
                .map_err(|err| JsError::from_js("pushManager.subscribe", err))?;
            let subscription = js::resolve("pushManager.subscribe", promise).await?;
            js::subscription_from_js(subscription.unchecked_ref())
        })
    }

    fn unsubscribe<'a>(&'a self) -> Self::Fut<'a, bool> {
        Box::pin(async move {
            let promise = self
                .push_manager()?
                .get_subscription()
                .map_err(|err| JsError::from_js("pushManager.getSubscription", err))?;
            let value = js::resolve("pushManager.getSubscription", promise).await?;
            let Some(subscription) = value.dyn_ref::<web_sys::PushSubscription>() else {
                return Ok(false);
            };
            let promise: Promise = subscription
                .unsubscribe()
                .map_err(|err| JsError::from_js("subscription.unsubscribe", err))?;
            let removed = js::resolve("subscription.unsubscribe", promise).await?;
            Ok(removed.as_bool().unwrap_or(true))
        })
    }

    fn post_to_worker(&self, message: &ClientMessage) -> Result<(), JsError> {
        let worker = self
            .registration()?
            .active()
            .ok_or_else(|| JsError::new("no active service worker"))?;
        worker
            .post_message(&js::to_js(message)?)
            .map_err(|err| JsError::from_js("serviceWorker.postMessage", err))
    }

    fn show_direct_notification(
        &self,
        title: &str,
        options: &NotificationOptions,
    ) -> Result<(), JsError> {
        let options = js::to_js(options)?;
        let notification = Notification::new_with_options(title, options.unchecked_ref())
            .map_err(|err| JsError::from_js("new Notification", err))?;

        let window = self.window.clone();
        let clicked = notification.clone();
        let on_click = Closure::<dyn FnMut()>::new(move || {
            let _ = window.focus();
            clicked.close();
        });
        notification.set_onclick(Some(on_click.as_ref().unchecked_ref()));
        on_click.forget();
        Ok(())
    }
}
