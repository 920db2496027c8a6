//! Catalog loading: which documents to fetch and how per-region copies of the
//! same entity are merged into one canonical list.
use async_trait::async_trait;
use indexmap::IndexMap;
use indexmap::map::Entry;
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

use crate::constants::{ALL_TOKEN, CATALOG_DIR, CATALOG_EXTENSION};
use crate::data::{Entity, Region, Variant};

/// Names one catalog document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKey {
    All,
    Region(Region),
}

impl DocumentKey {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => ALL_TOKEN,
            Self::Region(region) => region.asset_key(),
        }
    }

    /// Conventional path of the document, relative to the asset root.
    #[must_use]
    pub fn relative_path(self) -> String {
        format!("{CATALOG_DIR}/{}{CATALOG_EXTENSION}", self.as_str())
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source of catalog documents. Platform-specific implementations should provide this.
#[async_trait(?Send)]
pub trait CatalogSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch and decode one document.
    ///
    /// # Errors
    ///
    /// Returns an error for any non-success response or undecodable body.
    async fn fetch_document(&self, key: DocumentKey) -> Result<Vec<Entity>, Self::Error>;
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to fetch catalog document `{document}`")]
    Fetch {
        document: DocumentKey,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Documents needed for a region selection, primary (first) region first.
///
/// An empty selection or the full domain is served by the combined document.
#[must_use]
pub fn document_plan(regions: &BTreeSet<Region>) -> Vec<DocumentKey> {
    if regions.is_empty() || regions.len() == Region::ALL.len() {
        return vec![DocumentKey::All];
    }
    regions.iter().copied().map(DocumentKey::Region).collect()
}

/// Fetch every planned document and merge them. Any failure aborts the whole load.
///
/// # Errors
///
/// Returns [`CatalogError::Fetch`] naming the first document that failed.
pub async fn load_catalog<S>(source: &S, regions: &BTreeSet<Region>) -> Result<Vec<Entity>, CatalogError>
where
    S: CatalogSource + ?Sized,
{
    let plan = document_plan(regions);
    log::debug!(
        "catalog plan: {}",
        plan.iter()
            .map(|key| key.as_str())
            .collect::<Vec<_>>()
            .join(",")
    );

    let fetches = plan.iter().map(|&document| async move {
        source
            .fetch_document(document)
            .await
            .map_err(|err| CatalogError::Fetch {
                document,
                source: Box::new(err),
            })
    });
    let mut documents = futures::future::try_join_all(fetches).await?;

    if documents.len() == 1 {
        return Ok(documents.pop().unwrap_or_default());
    }
    Ok(merge_documents(documents))
}

/// Merge per-region documents given in plan order (primary first).
///
/// Documents are applied secondaries first and primary last, so the primary
/// copy of an entity wins on entity-level fields and on shared sprite suffixes.
/// Entities without forms on either side keep their first-seen copy.
#[must_use]
pub fn merge_documents(documents: Vec<Vec<Entity>>) -> Vec<Entity> {
    let mut by_id: IndexMap<u32, Entity> = IndexMap::new();
    for document in documents.into_iter().rev() {
        for entity in document {
            match by_id.entry(entity.id) {
                Entry::Vacant(slot) => {
                    slot.insert(entity);
                }
                Entry::Occupied(mut slot) => {
                    if entity.forms.is_some() || slot.get().forms.is_some() {
                        let merged = merge_entity(entity, slot.get());
                        slot.insert(merged);
                    }
                }
            }
        }
    }
    by_id.into_values().collect()
}

/// `primary` overwrites `secondary`; a formless side contributes itself as one variant.
fn merge_entity(mut primary: Entity, secondary: &Entity) -> Entity {
    let primary_forms = primary
        .forms
        .take()
        .unwrap_or_else(|| vec![primary.as_variant()]);
    let secondary_forms = secondary
        .forms
        .clone()
        .unwrap_or_else(|| vec![secondary.as_variant()]);
    primary.forms = Some(merge_variants(primary_forms, secondary_forms));
    primary
}

fn merge_variants(primaries: Vec<Variant>, secondaries: Vec<Variant>) -> Vec<Variant> {
    let mut by_suffix: IndexMap<Option<String>, Variant> = IndexMap::new();
    for variant in secondaries.into_iter().chain(primaries) {
        // Replacing keeps the slot of the first insertion.
        by_suffix.insert(variant.sprite_suffix.clone(), variant);
    }
    by_suffix.into_values().collect()
}
