//! `localStorage` behind the core key/value seam.
use randompoke_core::KeyValueStore;

use crate::dom;

/// Browser `localStorage`; the handle is looked up on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserStorage;

#[derive(Debug, thiserror::Error)]
#[error("Storage error: {0}")]
pub struct BrowserStorageError(String);

impl BrowserStorageError {
    fn from_js(value: &wasm_bindgen::JsValue) -> Self {
        Self(dom::js_error_message(value))
    }
}

impl KeyValueStore for BrowserStorage {
    type Error = BrowserStorageError;

    fn get_item(&self, key: &str) -> Result<Option<String>, Self::Error> {
        let storage = dom::local_storage().map_err(|e| BrowserStorageError::from_js(&e))?;
        storage
            .get_item(key)
            .map_err(|e| BrowserStorageError::from_js(&e))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        let storage = dom::local_storage().map_err(|e| BrowserStorageError::from_js(&e))?;
        storage
            .set_item(key, value)
            .map_err(|e| BrowserStorageError::from_js(&e))
    }

    fn remove_item(&self, key: &str) -> Result<(), Self::Error> {
        let storage = dom::local_storage().map_err(|e| BrowserStorageError::from_js(&e))?;
        storage
            .remove_item(key)
            .map_err(|e| BrowserStorageError::from_js(&e))
    }
}
