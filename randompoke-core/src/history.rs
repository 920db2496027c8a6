//! Navigable batch history and the persisted shiny vault.
use serde::Serialize;
use std::collections::VecDeque;

use crate::constants::{HISTORY_SIZE, STORAGE_SHINIES_KEY};
use crate::record::GeneratedRecord;
use crate::storage::{KeyValueStore, read_json, write_json};

/// Bounded list of batches, newest at index 0, with a display cursor.
#[derive(Debug, Clone, Default)]
pub struct History {
    batches: VecDeque<Vec<GeneratedRecord>>,
    cursor: usize,
}

impl History {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a batch as the newest entry and display it. Empty batches are ignored.
    pub fn push(&mut self, batch: Vec<GeneratedRecord>) {
        if batch.is_empty() {
            return;
        }
        self.batches.push_front(batch);
        self.batches.truncate(HISTORY_SIZE);
        self.cursor = 0;
    }

    #[must_use]
    pub fn displayed(&self) -> Option<&[GeneratedRecord]> {
        self.batches.get(self.cursor).map(Vec::as_slice)
    }

    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.batches.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// An older batch exists.
    #[must_use]
    pub fn can_show_next(&self) -> bool {
        self.cursor + 1 < self.batches.len()
    }

    /// A newer batch exists.
    #[must_use]
    pub const fn can_show_previous(&self) -> bool {
        self.cursor > 0
    }

    /// Step to the next older batch. Returns whether the cursor moved.
    pub fn show_next(&mut self) -> bool {
        let moved = self.can_show_next();
        if moved {
            self.cursor += 1;
        }
        moved
    }

    /// Step to the next newer batch. Returns whether the cursor moved.
    pub fn show_previous(&mut self) -> bool {
        let moved = self.can_show_previous();
        if moved {
            self.cursor -= 1;
        }
        moved
    }

    /// Jump to `index`, clamped into range.
    pub fn show_at(&mut self, index: usize) {
        self.cursor = index.min(self.batches.len().saturating_sub(1));
    }

    pub fn iter(&self) -> impl Iterator<Item = &[GeneratedRecord]> {
        self.batches.iter().map(Vec::as_slice)
    }
}

/// Every shiny ever generated, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vault {
    records: Vec<GeneratedRecord>,
}

impl Vault {
    /// Load the persisted vault; missing or unreadable data yields an empty vault.
    #[must_use]
    pub fn load<K: KeyValueStore>(store: &K) -> Self {
        Self {
            records: read_json(store, STORAGE_SHINIES_KEY).unwrap_or_default(),
        }
    }

    /// Prepend the shiny records of `batch`, keeping their batch order.
    /// Returns how many were added.
    pub fn absorb(&mut self, batch: &[GeneratedRecord]) -> usize {
        let shinies: Vec<GeneratedRecord> = batch.iter().filter(|r| r.shiny).cloned().collect();
        let added = shinies.len();
        if added > 0 {
            self.records.splice(0..0, shinies);
        }
        added
    }

    /// # Errors
    ///
    /// Returns an error if the store rejects the write.
    pub fn save<K: KeyValueStore>(&self, store: &K) -> Result<(), K::Error> {
        write_json(store, STORAGE_SHINIES_KEY, &self.records)
    }

    #[must_use]
    pub fn records(&self) -> &[GeneratedRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Snapshot of what the navigation and vault controls should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryControls {
    pub can_show_next: bool,
    pub can_show_previous: bool,
    pub vault_visible: bool,
    pub vault_len: usize,
    pub cursor: usize,
    pub history_len: usize,
}

/// History plus vault, kept consistent with the persisted vault.
#[derive(Debug, Clone, Default)]
pub struct HistoryManager {
    history: History,
    vault: Vault,
}

impl HistoryManager {
    #[must_use]
    pub fn load<K: KeyValueStore>(store: &K) -> Self {
        let vault = Vault::load(store);
        log::debug!("loaded vault with {} shinies", vault.len());
        Self {
            history: History::new(),
            vault,
        }
    }

    /// Record a finished batch. Shinies are prepended to the vault as currently
    /// persisted (another page may have written it since) and saved right away;
    /// a failed write is logged and the in-memory vault kept.
    pub fn add<K: KeyValueStore>(&mut self, batch: Vec<GeneratedRecord>, store: &K) {
        if batch.is_empty() {
            return;
        }
        self.refresh_vault(store);
        if self.vault.absorb(&batch) > 0
            && let Err(err) = self.vault.save(store)
        {
            log::error!("failed to persist shiny vault: {err}");
        }
        self.history.push(batch);
    }

    /// Re-read the persisted vault, picking up writes made through other handles
    /// on the same store.
    pub fn refresh_vault<K: KeyValueStore>(&mut self, store: &K) {
        self.vault = Vault::load(store);
    }

    /// Forget every vaulted shiny, in memory and in storage.
    pub fn clear_vault<K: KeyValueStore>(&mut self, store: &K) {
        self.vault = Vault::default();
        if let Err(err) = store.remove_item(STORAGE_SHINIES_KEY) {
            log::error!("failed to clear persisted shiny vault: {err}");
        }
    }

    pub fn show_next(&mut self) -> bool {
        self.history.show_next()
    }

    pub fn show_previous(&mut self) -> bool {
        self.history.show_previous()
    }

    pub fn show_at(&mut self, index: usize) {
        self.history.show_at(index);
    }

    #[must_use]
    pub fn displayed(&self) -> Option<&[GeneratedRecord]> {
        self.history.displayed()
    }

    #[must_use]
    pub const fn history(&self) -> &History {
        &self.history
    }

    #[must_use]
    pub const fn vault(&self) -> &Vault {
        &self.vault
    }

    #[must_use]
    pub fn controls(&self) -> HistoryControls {
        HistoryControls {
            can_show_next: self.history.can_show_next(),
            can_show_previous: self.history.can_show_previous(),
            vault_visible: !self.vault.is_empty(),
            vault_len: self.vault.len(),
            cursor: self.history.cursor(),
            history_len: self.history.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn rec(id: u32, shiny: bool) -> GeneratedRecord {
        GeneratedRecord {
            id,
            base_name: format!("Mon {id}"),
            name: format!("Mon {id}"),
            sprite_suffix: None,
            nature: None,
            shiny,
            gender: None,
            timestamp: None,
        }
    }

    fn batch(first_id: u32) -> Vec<GeneratedRecord> {
        vec![rec(first_id, false), rec(first_id + 1, false)]
    }

    #[test]
    fn history_keeps_most_recent_batches() {
        let mut history = History::new();
        for i in 0..70 {
            history.push(batch(i * 10));
        }
        assert_eq!(history.len(), HISTORY_SIZE);
        assert_eq!(history.displayed().unwrap()[0].id, 690);
        assert_eq!(history.iter().last().unwrap()[0].id, 60);
    }

    #[test]
    fn empty_batch_is_not_recorded() {
        let mut history = History::new();
        history.push(batch(1));
        history.push(Vec::new());
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn navigation_is_clamped() {
        let mut history = History::new();
        assert!(!history.show_next());
        assert!(!history.show_previous());
        history.show_at(5);
        assert_eq!(history.cursor(), 0);
        assert!(history.displayed().is_none());

        for i in 0..3 {
            history.push(batch(i * 10));
        }
        assert!(!history.show_previous());
        assert!(history.show_next());
        assert!(history.show_next());
        assert!(!history.show_next());
        assert!(!history.show_next());
        assert_eq!(history.cursor(), 2);
        assert_eq!(history.displayed().unwrap()[0].id, 0);

        history.show_at(99);
        assert_eq!(history.cursor(), 2);
        history.push(batch(100));
        assert_eq!(history.cursor(), 0);
    }

    #[test]
    fn shinies_are_prepended_in_batch_order_and_persisted() {
        let store = MemoryStore::default();
        let mut manager = HistoryManager::load(&store);
        manager.add(vec![rec(1, true), rec(2, false)], &store);
        manager.add(vec![rec(3, true), rec(4, true), rec(5, false), rec(6, true)], &store);

        let ids: Vec<u32> = manager.vault().records().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 4, 6, 1]);

        let reloaded = HistoryManager::load(&store);
        assert_eq!(reloaded.vault(), manager.vault());
        assert!(reloaded.history().is_empty());
        assert!(reloaded.controls().vault_visible);
    }

    #[test]
    fn clear_vault_removes_persisted_entry() {
        let store = MemoryStore::default();
        let mut manager = HistoryManager::load(&store);
        manager.add(vec![rec(1, true)], &store);
        assert!(store.get(STORAGE_SHINIES_KEY).is_some());
        manager.clear_vault(&store);
        assert!(manager.vault().is_empty());
        assert!(store.get(STORAGE_SHINIES_KEY).is_none());
        assert!(!manager.controls().vault_visible);
    }

    #[test]
    fn managers_sharing_a_store_keep_each_others_shinies() {
        let store = MemoryStore::default();
        let mut first = HistoryManager::load(&store);
        let mut second = HistoryManager::load(&store);
        let persisted = || -> Vec<u32> {
            Vault::load(&store).records().iter().map(|r| r.id).collect()
        };

        first.add(vec![rec(1, true)], &store);
        second.add(vec![rec(2, true)], &store);
        assert_eq!(persisted(), vec![2, 1]);

        first.clear_vault(&store);
        second.add(vec![rec(3, true)], &store);
        assert_eq!(persisted(), vec![3]);

        first.refresh_vault(&store);
        let ids: Vec<u32> = first.vault().records().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3]);
        assert_eq!(first.controls().vault_len, 1);
    }

    #[test]
    fn corrupt_vault_loads_empty() {
        let store = MemoryStore::default();
        store.insert(STORAGE_SHINIES_KEY, "[{\"id\":");
        assert!(HistoryManager::load(&store).vault().is_empty());
    }

    #[test]
    fn controls_follow_cursor() {
        let store = MemoryStore::default();
        let mut manager = HistoryManager::load(&store);
        manager.add(batch(1), &store);
        manager.add(batch(10), &store);
        let controls = manager.controls();
        assert!(controls.can_show_next);
        assert!(!controls.can_show_previous);
        assert_eq!(controls.history_len, 2);

        assert!(manager.show_next());
        let controls = manager.controls();
        assert!(!controls.can_show_next);
        assert!(controls.can_show_previous);
        assert_eq!(controls.cursor, 1);
    }
}
