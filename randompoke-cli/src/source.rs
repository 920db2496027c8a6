use async_trait::async_trait;
use randompoke_core::{CatalogSource, DocumentKey, Entity, entities_from_json};
use std::path::{Path, PathBuf};

/// Reads catalog documents from a local directory laid out like the `dex/`
/// assets: `<root>/all.json`, `<root>/kanto.json`, ...
#[derive(Debug, Clone)]
pub struct DirectoryCatalogSource {
    root: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryCatalogError {
    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl DirectoryCatalogSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn document_path(&self, key: DocumentKey) -> PathBuf {
        self.root.join(format!(
            "{}{}",
            key.as_str(),
            randompoke_core::constants::CATALOG_EXTENSION
        ))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait(?Send)]
impl CatalogSource for DirectoryCatalogSource {
    type Error = DirectoryCatalogError;

    async fn fetch_document(&self, key: DocumentKey) -> Result<Vec<Entity>, Self::Error> {
        let path = self.document_path(key);
        log::debug!("reading catalog document {}", path.display());
        let json = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| DirectoryCatalogError::Read {
                path: path.clone(),
                source,
            })?;
        entities_from_json(&json).map_err(|source| DirectoryCatalogError::Parse { path, source })
    }
}
