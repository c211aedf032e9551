use std::pin::Pin;

use url::Url;
use wasm_bindgen::JsValue;
use web_sys::{Headers, RequestInit};

use super::js::{self, JsError};
use crate::ports;
use crate::types::SubscriptionRecord;

/// Posts subscription records as JSON with `fetch`. Works from both the
/// page and the service worker.
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchSink;

impl ports::SubscriptionSink for FetchSink {
    type Error = JsError;
    type Fut<'a>
        = Pin<Box<dyn Future<Output = Result<(), Self::Error>> + 'a>>
    where
        Self: 'a;

    fn deliver<'a>(&'a self, endpoint: &'a Url, record: &'a SubscriptionRecord) -> Self::Fut<'a> {
        Box::pin(async move {
            let body = record
                .to_json()
                .map_err(|err| JsError::new(format!("failed to encode record: {err}")))?;
            let headers =
                Headers::new().map_err(|err| JsError::from_js("new Headers", err))?;
            headers
                .set("Content-Type", "application/json")
                .map_err(|err| JsError::from_js("Headers.set", err))?;

            let init = RequestInit::new();
            init.set_method("POST");
            init.set_headers(&headers);
            init.set_body(&JsValue::from_str(&body));

            let response = js::fetch(endpoint.as_str(), &init).await?;
            if !response.ok() {
                return Err(JsError::new(format!(
                    "remote storage answered {}",
                    response.status()
                )));
            }
            Ok(())
        })
    }
}
