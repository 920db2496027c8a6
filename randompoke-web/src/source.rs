//! Catalog documents fetched from static assets.
use async_trait::async_trait;
use randompoke_core::{CatalogSource, DocumentKey, Entity, entities_from_json};

use crate::{dom, paths};

/// Fetches `dex/<key>.json` relative to the deployment base path.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebCatalogSource;

#[derive(Debug, thiserror::Error)]
pub enum WebCatalogError {
    #[error("Request for {url} failed: {message}")]
    Request { url: String, message: String },
    #[error("HTTP {status} {status_text} for {url}")]
    Status {
        url: String,
        status: u16,
        status_text: String,
    },
    #[error("JSON parsing error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl WebCatalogSource {
    #[allow(clippy::future_not_send)]
    async fn fetch(url: &str) -> Result<Vec<Entity>, WebCatalogError> {
        let request_error = |err: wasm_bindgen::JsValue| WebCatalogError::Request {
            url: url.to_string(),
            message: dom::js_error_message(&err),
        };
        let response = dom::fetch_response(url).await.map_err(request_error)?;
        if !response.ok() {
            return Err(WebCatalogError::Status {
                url: url.to_string(),
                status: response.status(),
                status_text: response.status_text(),
            });
        }
        let text = dom::response_text(&response).await.map_err(request_error)?;
        Ok(entities_from_json(&text)?)
    }
}

#[async_trait(?Send)]
impl CatalogSource for WebCatalogSource {
    type Error = WebCatalogError;

    async fn fetch_document(&self, key: DocumentKey) -> Result<Vec<Entity>, Self::Error> {
        let url = paths::catalog_url(key);
        log::debug!("fetching catalog document {url}");
        Self::fetch(&url).await.inspect_err(|err| {
            dom::console_error(&err.to_string());
        })
    }
}
