//! Push notifications for the Top Up BUSSID site: the page-side
//! [`SubscriptionController`] and the service-worker-side
//! [`NotificationWorker`], both driven through the traits in [`ports`].
//!
//! Built for `wasm32`, the crate also exports `startPushClient` and
//! `startNotificationWorker` to JavaScript.

pub mod config;
pub mod controller;
pub mod error;
pub mod ports;
pub mod push;
pub mod types;
pub mod worker;

#[cfg(target_arch = "wasm32")]
pub mod adapters;
#[cfg(target_arch = "wasm32")]
mod wasm;

pub use config::PushConfig;
pub use controller::{
    ControllerState, PermissionOutcome, ShipReport, StoredAs, SubscriptionController,
    TestDelivery,
};
pub use error::{ControllerError, WorkerError};
#[cfg(not(target_arch = "wasm32"))]
pub use push::vapid::{VapidCredentials, generate_vapid_credentials};
pub use worker::{ClickOutcome, NotificationWorker};
