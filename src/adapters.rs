//! Browser implementations of the ports, compiled for `wasm32` only.

mod js;
mod page;
mod remote;
mod storage;
mod time;
mod toast;
mod worker;

pub use js::JsError;
pub use page::BrowserPlatform;
pub use remote::FetchSink;
pub use storage::LocalStorage;
pub use time::BrowserClock;
pub use toast::{DomToaster, insert_test_button};
pub use worker::{ClickedNotification, ServiceWorkerScope};

pub(crate) use js::set_timeout;
