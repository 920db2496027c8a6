//! Randompoke Generator Core
//!
//! Platform-agnostic logic for the Randompoke random Pokémon generator: option
//! codecs, catalog loading and merging, eligibility filtering, sampling, and the
//! batch history with its persisted shiny vault.
//! This crate has no UI or platform-specific dependencies; adapters plug in a
//! [`CatalogSource`] and a [`KeyValueStore`].

pub mod catalog;
pub mod constants;
pub mod data;
pub mod engine;
pub mod filter;
pub mod history;
pub mod options;
pub mod record;
pub mod sampler;
pub mod storage;

#[cfg(test)]
pub(crate) mod fixtures;

// Re-export commonly used types
pub use catalog::{CatalogError, CatalogSource, DocumentKey, document_plan, load_catalog};
pub use data::{
    Entity, GenderRatio, Genderless, PokemonType, RarityFlags, Region, UnknownToken, Variant,
    entities_from_json,
};
pub use engine::{GenerateError, Generator};
pub use filter::{EligibilityCache, filter_eligible};
pub use history::{History, HistoryControls, HistoryManager, Vault};
pub use options::{
    GenerationOptions, LoadedOptions, OptionsOrigin, ParsedQuery, has_recognized_keys,
    parse_query, resolve,
};
pub use record::{Gender, GeneratedRecord, Nature};
pub use sampler::sample;
pub use storage::{KeyValueStore, MemoryStore};
