use std::fmt;
use std::time::Duration;

use js_sys::{Function, Promise, Reflect, Uint8Array};
use serde::Serialize;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{PushEncryptionKeyName, Window, WorkerGlobalScope};

use crate::push;
use crate::types::PushSubscription;

/// A rejected promise or a thrown exception, flattened to its message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsError(String);

impl JsError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub(crate) fn from_js(operation: &str, value: JsValue) -> Self {
        Self(format!("{operation} failed: {}", describe(&value)))
    }
}

impl fmt::Display for JsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for JsError {}

fn describe(value: &JsValue) -> String {
    if let Some(message) = value.as_string() {
        return message;
    }
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    format!("{value:?}")
}

pub(crate) async fn resolve(operation: &str, promise: Promise) -> Result<JsValue, JsError> {
    JsFuture::from(promise)
        .await
        .map_err(|err| JsError::from_js(operation, err))
}

/// `setTimeout` on whichever global is running, page or worker.
pub(crate) fn set_timeout(callback: &Function, delay: Duration) -> Result<i32, JsError> {
    let millis = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
    let global = js_sys::global();
    let scheduled = if let Some(window) = global.dyn_ref::<Window>() {
        window.set_timeout_with_callback_and_timeout_and_arguments_0(callback, millis)
    } else if let Some(scope) = global.dyn_ref::<WorkerGlobalScope>() {
        scope.set_timeout_with_callback_and_timeout_and_arguments_0(callback, millis)
    } else {
        return Err(JsError::new("no timer available in this global scope"));
    };
    scheduled.map_err(|err| JsError::from_js("setTimeout", err))
}

pub(crate) async fn sleep(delay: Duration) {
    let mut scheduled = Ok(0);
    let promise = Promise::new(&mut |resolve, _reject| {
        scheduled = set_timeout(&resolve, delay);
    });
    if let Err(err) = scheduled {
        tracing::warn!(error = %err, "timer unavailable, not sleeping");
        return;
    }
    let _ = JsFuture::from(promise).await;
}

pub(crate) async fn fetch(
    url: &str,
    init: &web_sys::RequestInit,
) -> Result<web_sys::Response, JsError> {
    let global = js_sys::global();
    let promise = if let Some(window) = global.dyn_ref::<Window>() {
        window.fetch_with_str_and_init(url, init)
    } else if let Some(scope) = global.dyn_ref::<WorkerGlobalScope>() {
        scope.fetch_with_str_and_init(url, init)
    } else {
        return Err(JsError::new("fetch is not available in this global scope"));
    };
    resolve("fetch", promise)
        .await?
        .dyn_into()
        .map_err(|_| JsError::new("fetch resolved to something other than a Response"))
}

pub(crate) fn subscription_from_js(
    subscription: &web_sys::PushSubscription,
) -> Result<PushSubscription, JsError> {
    let mut converted = PushSubscription {
        endpoint: subscription.endpoint(),
        keys: Default::default(),
    };
    for (name, key) in [
        ("p256dh", PushEncryptionKeyName::P256dh),
        ("auth", PushEncryptionKeyName::Auth),
    ] {
        let buffer = subscription
            .get_key(key)
            .map_err(|err| JsError::from_js("PushSubscription.getKey", err))?;
        if let Some(buffer) = buffer {
            let bytes = Uint8Array::new(&buffer).to_vec();
            converted
                .keys
                .insert(name.to_string(), push::encode_key(&bytes));
        }
    }
    Ok(converted)
}

pub(crate) fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsError> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|err| JsError::new(err.to_string()))
}

pub(crate) fn set_property(target: &JsValue, key: &str, value: &JsValue) -> Result<(), JsError> {
    Reflect::set(target, &JsValue::from_str(key), value)
        .map(|_| ())
        .map_err(|err| JsError::from_js("Reflect.set", err))
}

pub(crate) fn get_string(target: &JsValue, key: &str) -> Option<String> {
    Reflect::get(target, &JsValue::from_str(key))
        .ok()
        .and_then(|value| value.as_string())
}
