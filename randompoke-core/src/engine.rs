//! The generator state object: source, storage, cache, history and RNG.
use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use thiserror::Error;

use crate::catalog::{CatalogError, CatalogSource, load_catalog};
use crate::data::Entity;
use crate::filter::{EligibilityCache, filter_eligible};
use crate::history::{HistoryControls, HistoryManager};
use crate::options::{self, GenerationOptions, LoadedOptions};
use crate::record::GeneratedRecord;
use crate::sampler::sample;
use crate::storage::KeyValueStore;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("eligible pokemon retrieval failed")]
    Retrieval {
        #[from]
        source: CatalogError,
    },
}

/// Owns everything one generation touches. `&mut self` on [`Generator::generate`]
/// rules out overlapping runs.
pub struct Generator<S, K> {
    source: S,
    store: K,
    cache: EligibilityCache,
    history: HistoryManager,
    rng: ChaCha20Rng,
    seed: u64,
}

impl<S, K> Generator<S, K>
where
    S: CatalogSource,
    K: KeyValueStore,
{
    /// Build a generator and load the persisted vault from `store`.
    pub fn new(source: S, store: K, seed: u64) -> Self {
        let history = HistoryManager::load(&store);
        Self {
            source,
            store,
            cache: EligibilityCache::new(),
            history,
            rng: ChaCha20Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Startup options for an optional URL query, falling back to the stored blob.
    #[must_use]
    pub fn load_options(&self, query: Option<&str>) -> LoadedOptions {
        options::resolve(query, &self.store)
    }

    /// Run one generation with a fixed snapshot of `options`.
    ///
    /// The eligible set is reused while the options serialize identically.
    /// Options are persisted and the batch is pushed to history (when non-empty)
    /// only after a successful run.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::Retrieval`] if any catalog document fails to load.
    pub async fn generate(
        &mut self,
        options: GenerationOptions,
        now: DateTime<Utc>,
    ) -> Result<Vec<GeneratedRecord>, GenerateError> {
        let options = options.sanitized();
        let key = options.cache_key();

        if self.cache.get(&key).is_some() {
            log::debug!("eligibility cache hit");
        } else {
            log::debug!("eligibility cache miss; loading catalog");
            let catalog = load_catalog(&self.source, &options.regions)
                .await
                .inspect_err(|err| log::error!("catalog load failed: {err}"))?;
            let eligible = filter_eligible(&catalog, &options);
            log::debug!(
                "{} of {} entities eligible",
                eligible.len(),
                catalog.len()
            );
            self.cache.store(key.clone(), eligible);
        }

        let eligible: &[Entity] = self.cache.get(&key).unwrap_or_default();
        let batch = sample(eligible, &options, &mut self.rng, now);
        if batch.is_empty() {
            log::info!("no eligible entities for the selected options");
        }

        if let Err(err) = options::persist(&options, &self.store) {
            log::warn!("failed to persist options: {err}");
        }
        self.history.add(batch.clone(), &self.store);
        Ok(batch)
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

    /// Control state, with the vault re-read from the store.
    pub fn controls(&mut self) -> HistoryControls {
        self.history.refresh_vault(&self.store);
        self.history.controls()
    }

    /// The vault as currently persisted.
    pub fn vault(&mut self) -> &[GeneratedRecord] {
        self.history.refresh_vault(&self.store);
        self.history.vault().records()
    }

    /// Confirmation is the caller's job.
    pub fn clear_vault(&mut self) {
        self.history.clear_vault(&self.store);
    }

    #[must_use]
    pub const fn history(&self) -> &HistoryManager {
        &self.history
    }

    #[must_use]
    pub const fn source(&self) -> &S {
        &self.source
    }

    #[must_use]
    pub const fn store(&self) -> &K {
        &self.store
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }
}
