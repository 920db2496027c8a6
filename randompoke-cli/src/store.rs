use randompoke_core::KeyValueStore;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// `localStorage`-shaped store persisted as one JSON object on disk.
/// Without a path it lives in memory only.
#[derive(Debug)]
pub struct JsonFileStore {
    path: Option<PathBuf>,
    items: RefCell<BTreeMap<String, String>>,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode state file")]
    Encode(#[from] serde_json::Error),
}

impl JsonFileStore {
    /// Open `path`. A missing file is an empty store; an unreadable one is
    /// logged and treated as empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let items = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                log::warn!("ignoring corrupt state file {}: {err}", path.display());
                BTreeMap::new()
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                log::warn!("could not read state file {}: {err}", path.display());
                BTreeMap::new()
            }
        };
        Self {
            path: Some(path),
            items: RefCell::new(items),
        }
    }

    pub fn ephemeral() -> Self {
        Self {
            path: None,
            items: RefCell::new(BTreeMap::new()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn flush(&self) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(&*self.items.borrow())?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StoreError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, json).map_err(|source| StoreError::Write {
            path: path.clone(),
            source,
        })
    }
}

impl KeyValueStore for JsonFileStore {
    type Error = StoreError;

    fn get_item(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove_item(&self, key: &str) -> Result<(), Self::Error> {
        let removed = self.items.borrow_mut().remove(key).is_some();
        if removed { self.flush() } else { Ok(()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "randompoke-store-{label}-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ))
    }

    #[test]
    fn values_survive_reopen() {
        let path = temp_path("reopen").join("state.json");
        let store = JsonFileStore::open(&path);
        store.set_item("options", "{\"n\":3}").unwrap();
        store.set_item("shinies", "[]").unwrap();
        store.remove_item("shinies").unwrap();

        let reopened = JsonFileStore::open(&path);
        assert_eq!(
            reopened.get_item("options").unwrap().as_deref(),
            Some("{\"n\":3}")
        );
        assert_eq!(reopened.get_item("shinies").unwrap(), None);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn corrupt_file_opens_empty() {
        let path = temp_path("corrupt");
        fs::write(&path, "{{{").unwrap();
        let store = JsonFileStore::open(&path);
        assert_eq!(store.get_item("options").unwrap(), None);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn ephemeral_store_never_touches_disk() {
        let store = JsonFileStore::ephemeral();
        store.set_item("options", "{}").unwrap();
        assert!(store.path().is_none());
        assert_eq!(store.get_item("options").unwrap().as_deref(), Some("{}"));
    }
}
