#![forbid(unsafe_code)]
//! Browser adapter for the Randompoke generator.
//!
//! Supplies the fetch-backed [`source::WebCatalogSource`], the `localStorage`
//! backed [`storage::BrowserStorage`], and the `RandomGenerator` handle exported
//! to JavaScript.
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
pub mod bridge;
pub mod dom;
pub mod paths;
pub mod source;
pub mod storage;
pub mod view;

#[cfg(target_arch = "wasm32")]
pub use bridge::RandomGenerator;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    log::debug!("randompoke-web initialized");
}
