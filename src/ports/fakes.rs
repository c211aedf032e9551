//! In-memory ports for unit tests. Each fake shares its state through an
//! `Rc` so a test can keep a handle after moving a clone into the component.

use std::cell::{Cell, RefCell, RefMut};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::future::{Ready, ready};
use std::pin::Pin;
use std::rc::Rc;
use std::time::Duration;

use time::OffsetDateTime;
use url::Url;

use super::{
    DisplayedNotification, Feedback, KeyValueStore, MessageKind, PushPlatform, SubscriptionSink,
    TimeProvider, WorkerScope,
};
use crate::config::PushConfig;
use crate::types::{
    ClientInfo, ClientMessage, NotificationOptions, PermissionState, PushSubscription,
    SubscriptionRecord,
};

type FakeFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, FakeError>> + 'a>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FakeError(pub(crate) String);

impl fmt::Display for FakeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fake failure: {}", self.0)
    }
}

/// Public key of the pair generated from the seed `[7; 32]`. The private
/// half is public too, so this must never leave test code.
pub(crate) const SAMPLE_VAPID_PUBLIC_KEY: &str =
    "BCRweRf_U5iQM4pKNucGRzM6OuLp8Hisa8yX0N2ePIf1oxKitvFT6qvuGgYoTxlMatMDaytXbZR3rVClc2w_p6U";

pub(crate) fn sample_config() -> PushConfig {
    PushConfig {
        vapid_public_key: SAMPLE_VAPID_PUBLIC_KEY.to_string(),
        ..PushConfig::default()
    }
}

fn settle<'a, T: 'a>(result: Result<T, FakeError>) -> FakeFuture<'a, T> {
    Box::pin(ready(result))
}

fn fail<T>(reason: &str) -> Result<T, FakeError> {
    Err(FakeError(reason.to_string()))
}

pub(crate) fn sample_subscription() -> PushSubscription {
    let mut keys = BTreeMap::new();
    keys.insert("auth".to_string(), "tBHItJI5svbpez7KI4CCXg".to_string());
    keys.insert(
        "p256dh".to_string(),
        "BNcRdreALRFXTkOOUHK1EtK2wtaz5Ry4YfYCA_0QTpQtUbVlUls0VJXg7A8u-Ts1XbjhazAkj7I99e8QcYP7DkM"
            .to_string(),
    );
    PushSubscription {
        endpoint: "https://fcm.googleapis.com/fcm/send/dGVzdC1lbmRwb2ludA".to_string(),
        keys,
    }
}

pub(crate) fn sample_client() -> ClientInfo {
    ClientInfo {
        user_agent: "Mozilla/5.0 (Linux; Android 14)".to_string(),
        platform: "Linux armv8l".to_string(),
    }
}

pub(crate) fn sample_now() -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(1_756_300_000).expect("timestamp")
}

pub(crate) fn sample_record() -> SubscriptionRecord {
    SubscriptionRecord::capture(sample_subscription(), &sample_client(), sample_now())
}

#[derive(Default)]
pub(crate) struct PlatformState {
    pub(crate) supported: bool,
    pub(crate) worker_active: bool,
    pub(crate) permission: PermissionState,
    pub(crate) permission_answer: PermissionState,
    pub(crate) subscription: Option<PushSubscription>,
    pub(crate) fail_register: bool,
    pub(crate) fail_permission: bool,
    pub(crate) fail_subscribe: bool,
    pub(crate) calls: Vec<String>,
    pub(crate) subscribe_keys: Vec<Vec<u8>>,
    pub(crate) posted: Vec<ClientMessage>,
    pub(crate) direct: Vec<(String, NotificationOptions)>,
}

#[derive(Clone, Default)]
pub(crate) struct FakePlatform {
    state: Rc<RefCell<PlatformState>>,
}

impl FakePlatform {
    pub(crate) fn supported() -> Self {
        let platform = Self::default();
        {
            let mut state = platform.state();
            state.supported = true;
            state.worker_active = true;
        }
        platform
    }

    pub(crate) fn unsupported() -> Self {
        Self::default()
    }

    pub(crate) fn subscribed(self) -> Self {
        {
            let mut state = self.state();
            state.permission = PermissionState::Granted;
            state.subscription = Some(sample_subscription());
        }
        self
    }

    pub(crate) fn answering(self, answer: PermissionState) -> Self {
        self.state().permission_answer = answer;
        self
    }

    pub(crate) fn state(&self) -> RefMut<'_, PlatformState> {
        self.state.borrow_mut()
    }

    pub(crate) fn count(&self, call: &str) -> usize {
        self.state().calls.iter().filter(|name| *name == call).count()
    }

    fn record(&self, call: &str) {
        self.state().calls.push(call.to_string());
    }
}

impl PushPlatform for FakePlatform {
    type Error = FakeError;
    type Fut<'a, T>
        = FakeFuture<'a, T>
    where
        Self: 'a,
        T: 'a;

    fn is_supported(&self) -> bool {
        self.state().supported
    }

    fn client_info(&self) -> ClientInfo {
        sample_client()
    }

    fn page_url(&self) -> String {
        "https://topup.example/promo".to_string()
    }

    fn permission(&self) -> PermissionState {
        self.state().permission
    }

    fn register_worker<'a>(&'a self, path: &'a str, scope: &'a str) -> Self::Fut<'a, ()> {
        self.record(&format!("register {path} {scope}"));
        if self.state().fail_register {
            return settle(fail("register rejected"));
        }
        settle(Ok(()))
    }

    fn wait_until_active<'a>(&'a self) -> Self::Fut<'a, ()> {
        self.record("wait_until_active");
        settle(Ok(()))
    }

    fn current_subscription<'a>(&'a self) -> Self::Fut<'a, Option<PushSubscription>> {
        self.record("current_subscription");
        settle(Ok(self.state().subscription.clone()))
    }

    fn request_permission<'a>(&'a self) -> Self::Fut<'a, PermissionState> {
        self.record("request_permission");
        let mut state = self.state();
        if state.fail_permission {
            return settle(fail("permission prompt failed"));
        }
        state.permission = state.permission_answer;
        settle(Ok(state.permission_answer))
    }

    fn subscribe<'a>(&'a self, application_server_key: &'a [u8]) -> Self::Fut<'a, PushSubscription> {
        self.record("subscribe");
        let mut state = self.state();
        state.subscribe_keys.push(application_server_key.to_vec());
        if state.fail_subscribe {
            return settle(fail("push service unavailable"));
        }
        let subscription = sample_subscription();
        state.subscription = Some(subscription.clone());
        settle(Ok(subscription))
    }

    fn unsubscribe<'a>(&'a self) -> Self::Fut<'a, bool> {
        self.record("unsubscribe");
        let removed = self.state().subscription.take().is_some();
        settle(Ok(removed))
    }

    fn post_to_worker(&self, message: &ClientMessage) -> Result<(), Self::Error> {
        let mut state = self.state();
        if !state.worker_active {
            return fail("no active service worker");
        }
        state.posted.push(message.clone());
        Ok(())
    }

    fn show_direct_notification(
        &self,
        title: &str,
        options: &NotificationOptions,
    ) -> Result<(), Self::Error> {
        self.state()
            .direct
            .push((title.to_string(), options.clone()));
        Ok(())
    }
}

#[derive(Clone, Default)]
pub(crate) struct FakeStore {
    entries: Rc<RefCell<BTreeMap<String, String>>>,
    failing: Rc<RefCell<BTreeSet<String>>>,
    writes: Rc<Cell<usize>>,
}

impl FakeStore {
    pub(crate) fn failing_on(key: &str) -> Self {
        let store = Self::default();
        store.failing.borrow_mut().insert(key.to_string());
        store
    }

    pub(crate) fn entry(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub(crate) fn writes(&self) -> usize {
        self.writes.get()
    }
}

impl KeyValueStore for FakeStore {
    type Error = FakeError;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.entry(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        if self.failing.borrow().contains(key) {
            return fail("quota exceeded");
        }
        self.writes.set(self.writes.get() + 1);
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), Self::Error> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

#[derive(Clone, Default)]
pub(crate) struct FakeSink {
    delivered: Rc<RefCell<Vec<(String, SubscriptionRecord)>>>,
    fail: bool,
}

impl FakeSink {
    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub(crate) fn delivered(&self) -> Vec<(String, SubscriptionRecord)> {
        self.delivered.borrow().clone()
    }
}

impl SubscriptionSink for FakeSink {
    type Error = FakeError;
    type Fut<'a>
        = FakeFuture<'a, ()>
    where
        Self: 'a;

    fn deliver<'a>(&'a self, endpoint: &'a Url, record: &'a SubscriptionRecord) -> Self::Fut<'a> {
        if self.fail {
            return settle(fail("remote storage answered 500"));
        }
        self.delivered
            .borrow_mut()
            .push((endpoint.to_string(), record.clone()));
        settle(Ok(()))
    }
}

#[derive(Clone, Default)]
pub(crate) struct FakeFeedback {
    shown: Rc<RefCell<Vec<(String, MessageKind)>>>,
}

impl FakeFeedback {
    pub(crate) fn shown(&self) -> Vec<(String, MessageKind)> {
        self.shown.borrow().clone()
    }

    pub(crate) fn kinds(&self) -> Vec<MessageKind> {
        self.shown.borrow().iter().map(|(_, kind)| *kind).collect()
    }
}

impl Feedback for FakeFeedback {
    fn show(&self, text: &str, kind: MessageKind) {
        self.shown.borrow_mut().push((text.to_string(), kind));
    }
}

#[derive(Clone)]
pub(crate) struct FakeClock {
    now: OffsetDateTime,
    slept: Rc<RefCell<Vec<Duration>>>,
}

impl Default for FakeClock {
    fn default() -> Self {
        Self {
            now: sample_now(),
            slept: Rc::default(),
        }
    }
}

impl FakeClock {
    pub(crate) fn slept(&self) -> Vec<Duration> {
        self.slept.borrow().clone()
    }
}

impl TimeProvider for FakeClock {
    type Sleep<'a>
        = Ready<()>
    where
        Self: 'a;

    fn now(&self) -> OffsetDateTime {
        self.now
    }

    fn sleep<'a>(&'a self, duration: Duration) -> Self::Sleep<'a> {
        self.slept.borrow_mut().push(duration);
        ready(())
    }
}

pub(crate) struct ScopeState {
    pub(crate) origin: String,
    pub(crate) open_windows: Vec<String>,
    pub(crate) subscription: Option<PushSubscription>,
    pub(crate) fail_render: bool,
    pub(crate) fail_lifecycle: bool,
    pub(crate) calls: Vec<String>,
    pub(crate) shown: Vec<(String, NotificationOptions)>,
    pub(crate) focused: Vec<String>,
    pub(crate) opened: Vec<String>,
}

#[derive(Clone)]
pub(crate) struct FakeWorkerScope {
    state: Rc<RefCell<ScopeState>>,
}

impl Default for FakeWorkerScope {
    fn default() -> Self {
        Self {
            state: Rc::new(RefCell::new(ScopeState {
                origin: "https://topup.example".to_string(),
                open_windows: Vec::new(),
                subscription: None,
                fail_render: false,
                fail_lifecycle: false,
                calls: Vec::new(),
                shown: Vec::new(),
                focused: Vec::new(),
                opened: Vec::new(),
            })),
        }
    }
}

impl FakeWorkerScope {
    pub(crate) fn state(&self) -> RefMut<'_, ScopeState> {
        self.state.borrow_mut()
    }

    pub(crate) fn shown(&self) -> Vec<(String, NotificationOptions)> {
        self.state().shown.clone()
    }

    pub(crate) fn opened(&self) -> Vec<String> {
        self.state().opened.clone()
    }

    pub(crate) fn focused(&self) -> Vec<String> {
        self.state().focused.clone()
    }
}

impl WorkerScope for FakeWorkerScope {
    type Error = FakeError;
    type Fut<'a, T>
        = FakeFuture<'a, T>
    where
        Self: 'a,
        T: 'a;

    fn origin(&self) -> String {
        self.state().origin.clone()
    }

    fn client_info(&self) -> ClientInfo {
        sample_client()
    }

    fn skip_waiting<'a>(&'a self) -> Self::Fut<'a, ()> {
        let mut state = self.state();
        state.calls.push("skip_waiting".to_string());
        if state.fail_lifecycle {
            return settle(fail("skipWaiting rejected"));
        }
        settle(Ok(()))
    }

    fn claim_clients<'a>(&'a self) -> Self::Fut<'a, ()> {
        let mut state = self.state();
        state.calls.push("claim_clients".to_string());
        if state.fail_lifecycle {
            return settle(fail("clients.claim rejected"));
        }
        settle(Ok(()))
    }

    fn show_notification<'a>(
        &'a self,
        title: &'a str,
        options: &'a NotificationOptions,
    ) -> Self::Fut<'a, ()> {
        let mut state = self.state();
        if state.fail_render {
            return settle(fail("notification permission revoked"));
        }
        state.shown.push((title.to_string(), options.clone()));
        settle(Ok(()))
    }

    fn focus_window<'a>(&'a self, url: &'a str) -> Self::Fut<'a, bool> {
        let mut state = self.state();
        if state.open_windows.iter().any(|open| open == url) {
            state.focused.push(url.to_string());
            return settle(Ok(true));
        }
        settle(Ok(false))
    }

    fn open_window<'a>(&'a self, url: &'a str) -> Self::Fut<'a, ()> {
        self.state().opened.push(url.to_string());
        settle(Ok(()))
    }

    fn current_subscription<'a>(&'a self) -> Self::Fut<'a, Option<PushSubscription>> {
        settle(Ok(self.state().subscription.clone()))
    }
}

#[derive(Default)]
pub(crate) struct FakeNotification {
    pub(crate) action: Option<String>,
    pub(crate) url: Option<String>,
    closed: Cell<bool>,
}

impl FakeNotification {
    pub(crate) fn clicked(action: Option<&str>, url: Option<&str>) -> Self {
        Self {
            action: action.map(str::to_string),
            url: url.map(str::to_string),
            closed: Cell::new(false),
        }
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.get()
    }
}

impl DisplayedNotification for FakeNotification {
    fn action(&self) -> Option<String> {
        self.action.clone()
    }

    fn target_url(&self) -> Option<String> {
        self.url.clone()
    }

    fn close(&self) {
        self.closed.set(true);
    }
}
