//! Seams between the push logic and the browser. The browser adapters live
//! in `adapters`; tests use the in-memory fakes.
//!
//! Everything runs on a single-threaded event loop, so none of the futures
//! here are required to be `Send`.

pub mod feedback;
pub mod platform;
pub mod remote;
pub mod storage;
pub mod time;
pub mod worker;

#[cfg(test)]
pub(crate) mod fakes;

pub use feedback::{Feedback, MessageKind};
pub use platform::PushPlatform;
pub use remote::SubscriptionSink;
pub use storage::KeyValueStore;
pub use time::TimeProvider;
pub use worker::{DisplayedNotification, WorkerScope};
