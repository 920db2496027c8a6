//! Shared builders and fakes for unit tests.
use async_trait::async_trait;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use thiserror::Error;

use crate::catalog::{CatalogSource, DocumentKey};
use crate::data::{Entity, PokemonType, RarityFlags, Variant};

pub fn entity(id: u32, name: &str, types: &[PokemonType]) -> Entity {
    Entity {
        id,
        name: name.to_string(),
        types: types.to_vec(),
        gender_ratio: None,
        rarity: RarityFlags::default(),
        is_nfe: None,
        evolution_count: None,
        forms: None,
    }
}

pub fn variant(name: &str, suffix: Option<&str>, types: &[PokemonType]) -> Variant {
    Variant {
        name: name.to_string(),
        sprite_suffix: suffix.map(str::to_string),
        is_mega: false,
        is_gigantamax: false,
        gender_ratio: None,
        types: types.to_vec(),
    }
}

pub fn mega(name: &str, suffix: &str) -> Variant {
    Variant {
        is_mega: true,
        ..variant(name, Some(suffix), &[PokemonType::Normal])
    }
}

pub fn gigantamax(name: &str, suffix: &str) -> Variant {
    Variant {
        is_gigantamax: true,
        ..variant(name, Some(suffix), &[PokemonType::Normal])
    }
}

/// `count` plain Normal-type entities with ids starting at `first_id`.
pub fn plain_entities(first_id: u32, count: u32) -> Vec<Entity> {
    (first_id..first_id + count)
        .map(|id| entity(id, &format!("Mon {id}"), &[PokemonType::Normal]))
        .collect()
}

#[derive(Debug, Error)]
#[error("no fixture document `{0}`")]
pub struct MissingDocument(pub DocumentKey);

/// In-memory catalog source that records every request.
#[derive(Debug, Default)]
pub struct FixtureSource {
    documents: HashMap<DocumentKey, Vec<Entity>>,
    requests: RefCell<Vec<DocumentKey>>,
    fail: Cell<bool>,
}

impl FixtureSource {
    pub fn with_document(mut self, key: DocumentKey, entities: Vec<Entity>) -> Self {
        self.documents.insert(key, entities);
        self
    }

    pub fn requests(&self) -> Vec<DocumentKey> {
        self.requests.borrow().clone()
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.set(fail);
    }
}

#[async_trait(?Send)]
impl CatalogSource for FixtureSource {
    type Error = MissingDocument;

    async fn fetch_document(&self, key: DocumentKey) -> Result<Vec<Entity>, Self::Error> {
        self.requests.borrow_mut().push(key);
        if self.fail.get() {
            return Err(MissingDocument(key));
        }
        self.documents
            .get(&key)
            .cloned()
            .ok_or(MissingDocument(key))
    }
}
