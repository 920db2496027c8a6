//! Eligibility filtering and the single-entry cache in front of it.
use std::collections::BTreeSet;

use crate::data::{Entity, Variant};
use crate::options::GenerationOptions;

/// Entities that may be drawn under `options`.
///
/// When forms are enabled an entity's variant list is narrowed to the allowed
/// variants, and the entity survives only if at least one remains.
#[must_use]
pub fn filter_eligible(catalog: &[Entity], options: &GenerationOptions) -> Vec<Entity> {
    catalog
        .iter()
        .filter(|entity| passes_rarity(entity, options))
        .filter(|entity| passes_stage(entity, options))
        .filter(|entity| passes_evolution_count(entity, &options.evolution_counts))
        .filter_map(|entity| narrow_by_type(entity, options))
        .collect()
}

fn passes_rarity(entity: &Entity, options: &GenerationOptions) -> bool {
    let rarity = &entity.rarity;
    !(rarity.sub_legendary && !options.sublegendaries
        || rarity.legendary && !options.legendaries
        || rarity.mythical && !options.mythicals
        || rarity.paradox && !options.paradoxes
        || rarity.ultra_beast && !options.ultra_beasts)
}

fn passes_stage(entity: &Entity, options: &GenerationOptions) -> bool {
    // With both toggles off the stage filter does not apply at all.
    if !options.nfes && !options.fully_evolved {
        return true;
    }
    if entity.is_nfe() && !options.nfes {
        return false;
    }
    !(entity.is_fully_evolved() && !options.fully_evolved)
}

fn passes_evolution_count(entity: &Entity, wanted: &BTreeSet<u8>) -> bool {
    wanted.is_empty() || wanted.contains(&entity.evolution_count())
}

fn narrow_by_type(entity: &Entity, options: &GenerationOptions) -> Option<Entity> {
    match (&entity.forms, options.forms) {
        (Some(forms), true) => {
            let kept: Vec<Variant> = forms
                .iter()
                .filter(|variant| variant_allowed(variant, options))
                .cloned()
                .collect();
            (!kept.is_empty()).then(|| Entity {
                forms: Some(kept),
                ..entity.clone()
            })
        }
        _ => entity.matches_types(&options.types).then(|| entity.clone()),
    }
}

fn variant_allowed(variant: &Variant, options: &GenerationOptions) -> bool {
    if variant.is_mega && !options.megas {
        return false;
    }
    if variant.is_gigantamax && !options.gigantamaxes {
        return false;
    }
    variant.matches_types(&options.types)
}

/// Remembers the eligible set for the most recent options serialization.
#[derive(Debug, Clone, Default)]
pub struct EligibilityCache {
    entry: Option<(String, Vec<Entity>)>,
}

impl EligibilityCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached list, only when `key` equals the stored key exactly.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&[Entity]> {
        self.entry
            .as_ref()
            .filter(|(stored, _)| stored == key)
            .map(|(_, eligible)| eligible.as_slice())
    }

    /// Replace the cached entry.
    pub fn store(&mut self, key: String, eligible: Vec<Entity>) {
        self.entry = Some((key, eligible));
    }

    pub fn clear(&mut self) {
        self.entry = None;
    }

    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.entry.as_ref().map(|(key, _)| key.as_str())
    }
}
