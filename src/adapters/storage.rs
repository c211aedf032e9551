use web_sys::Storage;

use super::js::JsError;
use crate::ports;

/// `window.localStorage`. Private browsing modes may refuse access, in which
/// case every call fails and the controller falls back to the backup key.
pub struct LocalStorage {
    storage: Option<Storage>,
}

impl LocalStorage {
    pub fn current() -> Self {
        let storage = web_sys::window().and_then(|window| window.local_storage().ok().flatten());
        Self { storage }
    }

    fn storage(&self) -> Result<&Storage, JsError> {
        self.storage
            .as_ref()
            .ok_or_else(|| JsError::new("localStorage is not available"))
    }
}

impl ports::KeyValueStore for LocalStorage {
    type Error = JsError;

    fn get(&self, key: &str) -> Result<Option<String>, JsError> {
        self.storage()?
            .get_item(key)
            .map_err(|err| JsError::from_js("localStorage.getItem", err))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), JsError> {
        self.storage()?
            .set_item(key, value)
            .map_err(|err| JsError::from_js("localStorage.setItem", err))
    }

    fn remove(&self, key: &str) -> Result<(), JsError> {
        self.storage()?
            .remove_item(key)
            .map_err(|err| JsError::from_js("localStorage.removeItem", err))
    }
}
