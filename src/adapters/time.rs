use std::pin::Pin;
use std::time::Duration;

use time::OffsetDateTime;

use super::js;
use crate::ports;

/// `Date.now()` and `setTimeout`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserClock;

impl ports::TimeProvider for BrowserClock {
    type Sleep<'a>
        = Pin<Box<dyn Future<Output = ()> + 'a>>
    where
        Self: 'a;

    fn now(&self) -> OffsetDateTime {
        let nanos = (js_sys::Date::now() * 1_000_000.0) as i128;
        OffsetDateTime::from_unix_timestamp_nanos(nanos).unwrap_or(OffsetDateTime::UNIX_EPOCH)
    }

    fn sleep<'a>(&'a self, duration: Duration) -> Self::Sleep<'a> {
        Box::pin(js::sleep(duration))
    }
}
