//! JavaScript-facing generator handle.
use chrono::{DateTime, Utc};
use js_sys::Promise;
use randompoke_core::{GenerateError, GenerationOptions, Generator};
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::dom;
use crate::source::WebCatalogSource;
use crate::storage::BrowserStorage;
use crate::view::{ControlsView, LoadedOptionsView, record_views};

type WebGenerator = Generator<WebCatalogSource, BrowserStorage>;

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("a generation is already in progress")]
    Busy,
    #[error("invalid options: {0}")]
    Options(String),
    #[error("serialization error: {0}")]
    Serialize(String),
    #[error(transparent)]
    Generate(#[from] GenerateError),
}

impl From<BridgeError> for JsValue {
    fn from(err: BridgeError) -> Self {
        js_sys::Error::new(&err.to_string()).into()
    }
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|err| BridgeError::Serialize(err.to_string()).into())
}

fn parse_options(value: JsValue) -> Result<GenerationOptions, BridgeError> {
    serde_wasm_bindgen::from_value(value).map_err(|err| BridgeError::Options(err.to_string()))
}

#[allow(clippy::cast_possible_truncation)]
fn now() -> DateTime<Utc> {
    DateTime::from_timestamp_millis(dom::now_millis() as i64).unwrap_or_default()
}

/// Generator shared with JavaScript. While a generation is in flight the
/// generator is checked out of its slot and every other call reports busy.
#[wasm_bindgen]
pub struct RandomGenerator {
    slot: Rc<RefCell<Option<WebGenerator>>>,
}

impl Default for RandomGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomGenerator {
    fn with_generator<T>(&self, f: impl FnOnce(&WebGenerator) -> T) -> Result<T, BridgeError> {
        self.slot.borrow().as_ref().map(f).ok_or(BridgeError::Busy)
    }

    fn with_generator_mut<T>(
        &self,
        f: impl FnOnce(&mut WebGenerator) -> T,
    ) -> Result<T, BridgeError> {
        self.slot.borrow_mut().as_mut().map(f).ok_or(BridgeError::Busy)
    }
}

#[wasm_bindgen]
impl RandomGenerator {
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new() -> Self {
        let seed = dom::now_millis().to_bits();
        let generator = Generator::new(WebCatalogSource, BrowserStorage, seed);
        Self {
            slot: Rc::new(RefCell::new(Some(generator))),
        }
    }

    /// Startup options: URL query first, then `localStorage`, then defaults.
    ///
    /// # Errors
    /// Returns an error while a generation is running.
    #[wasm_bindgen(js_name = loadOptions)]
    pub fn load_options(&self) -> Result<JsValue, JsValue> {
        let search = dom::location_search();
        let query = Some(search.as_str()).filter(|q| !q.trim_start_matches('?').is_empty());
        let loaded = self.with_generator(|generator| generator.load_options(query))?;
        to_js(&LoadedOptionsView::from(loaded))
    }

    /// Generate a batch; resolves to the record views, rejects on busy or retrieval failure.
    pub fn generate(&self, options: JsValue) -> Promise {
        let slot = Rc::clone(&self.slot);
        future_to_promise(async move {
            let options = parse_options(options)?;
            let checked_out = slot.borrow_mut().take();
            let Some(mut generator) = checked_out else {
                return Err(BridgeError::Busy.into());
            };

            let share_query = options.clone().sanitized().to_query();
            let result = generator.generate(options, now()).await;
            *slot.borrow_mut() = Some(generator);

            let batch = result.map_err(|err| {
                dom::console_error(&err.to_string());
                BridgeError::from(err)
            })?;
            if let Err(err) = dom::replace_query(&share_query) {
                log::warn!("could not update URL: {}", dom::js_error_message(&err));
            }
            to_js(&record_views(&batch))
        })
    }

    /// # Errors
    /// Returns an error while a generation is running.
    #[wasm_bindgen(js_name = showNext)]
    pub fn show_next(&self) -> Result<bool, JsValue> {
        Ok(self.with_generator_mut(WebGenerator::show_next)?)
    }

    /// # Errors
    /// Returns an error while a generation is running.
    #[wasm_bindgen(js_name = showPrevious)]
    pub fn show_previous(&self) -> Result<bool, JsValue> {
        Ok(self.with_generator_mut(WebGenerator::show_previous)?)
    }

    /// # Errors
    /// Returns an error while a generation is running.
    pub fn displayed(&self) -> Result<JsValue, JsValue> {
        let views = self.with_generator(|generator| {
            record_views(generator.displayed().unwrap_or_default())
        })?;
        to_js(&views)
    }

    /// # Errors
    /// Returns an error while a generation is running.
    pub fn controls(&self) -> Result<JsValue, JsValue> {
        let view = self.with_generator_mut(|generator| ControlsView {
            controls: generator.controls(),
            displayed: record_views(generator.displayed().unwrap_or_default()),
        })?;
        to_js(&view)
    }

    /// # Errors
    /// Returns an error while a generation is running.
    pub fn vault(&self) -> Result<JsValue, JsValue> {
        let views = self.with_generator_mut(|generator| record_views(generator.vault()))?;
        to_js(&views)
    }

    /// Caller confirms with the user first.
    ///
    /// # Errors
    /// Returns an error while a generation is running.
    #[wasm_bindgen(js_name = clearVault)]
    pub fn clear_vault(&self) -> Result<(), JsValue> {
        Ok(self.with_generator_mut(WebGenerator::clear_vault)?)
    }

    /// Canonical share query for `options`, without the leading `?`.
    ///
    /// # Errors
    /// Returns an error if `options` is not a valid options object.
    #[wasm_bindgen(js_name = shareQuery)]
    pub fn share_query(options: JsValue) -> Result<String, JsValue> {
        Ok(parse_options(options)?.sanitized().to_query())
    }
}
