use std::time::Duration;

use time::OffsetDateTime;

pub trait TimeProvider: 'static {
    type Sleep<'a>: Future<Output = ()> + 'a
    where
        Self: 'a;

    fn now(&self) -> OffsetDateTime;
    fn sleep<'a>(&'a self, duration: Duration) -> Self::Sleep<'a>;
}
