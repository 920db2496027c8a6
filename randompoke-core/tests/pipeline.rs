use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use futures::executor::block_on;
use std::cell::Cell;
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;

use randompoke_core::constants::{STORAGE_OPTIONS_KEY, STORAGE_SHINIES_KEY};
use randompoke_core::{
    CatalogSource, DocumentKey, Entity, GenerationOptions, Generator, MemoryStore, OptionsOrigin,
    PokemonType, Region, entities_from_json, filter_eligible, load_catalog, parse_query,
};

#[derive(Debug, Error)]
#[error("document `{0}` unavailable")]
struct Unavailable(DocumentKey);

#[derive(Default)]
struct JsonSource {
    documents: HashMap<DocumentKey, String>,
    fetches: Cell<usize>,
}

impl JsonSource {
    fn with(mut self, key: DocumentKey, json: &str) -> Self {
        self.documents.insert(key, json.to_string());
        self
    }
}

#[async_trait(?Send)]
impl CatalogSource for JsonSource {
    type Error = Unavailable;

    async fn fetch_document(&self, key: DocumentKey) -> Result<Vec<Entity>, Self::Error> {
        self.fetches.set(self.fetches.get() + 1);
        let json = self.documents.get(&key).ok_or(Unavailable(key))?;
        entities_from_json(json).map_err(|_| Unavailable(key))
    }
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 2, 14, 18, 0, 0).unwrap()
}

const MIXED_DEX: &str = r#"[
    {"id": 144, "name": "Articuno", "types": ["ice", "flying"], "isSubLegendary": true},
    {"id": 145, "name": "Zapdos", "types": ["electric", "flying"], "isSubLegendary": true},
    {"id": 146, "name": "Moltres", "types": ["fire", "flying"], "isSubLegendary": true},
    {"id": 1, "name": "Bulbasaur", "types": ["grass", "poison"], "isNfe": true},
    {"id": 4, "name": "Charmander", "types": ["fire"], "isNfe": true},
    {"id": 7, "name": "Squirtle", "types": ["water"], "isNfe": true},
    {"id": 25, "name": "Pikachu", "types": ["electric"], "isNfe": true, "evolutionCount": 1},
    {"id": 39, "name": "Jigglypuff", "types": ["normal", "fairy"], "isNfe": true, "evolutionCount": 1},
    {"id": 52, "name": "Meowth", "types": ["normal"], "isNfe": true},
    {"id": 143, "name": "Snorlax", "types": ["normal"], "evolutionCount": 1}
]"#;

#[test]
fn sublegendaries_toggle_excludes_rare_entities() {
    let source = JsonSource::default().with(DocumentKey::All, MIXED_DEX);
    let mut generator = Generator::new(source, MemoryStore::default(), 0x00C0_FFEE);
    let options = GenerationOptions {
        n: 5,
        sublegendaries: false,
        ..GenerationOptions::default()
    };

    let batch = block_on(generator.generate(options, now())).unwrap();
    assert_eq!(batch.len(), 5);
    let ids: BTreeSet<u32> = batch.iter().map(|r| r.id).collect();
    assert_eq!(ids.len(), 5);
    assert!(ids.iter().all(|id| ![144, 145, 146].contains(id)));
}

#[test]
fn regional_documents_merge_with_primary_precedence() {
    let kanto = r#"[
        {"id": 58, "name": "Growlithe", "types": ["fire"], "forms": [
            {"name": "Growlithe", "spriteSuffix": "a", "types": ["fire"]},
            {"name": "Growlithe (Kanto)", "spriteSuffix": "b", "types": ["fire"]}
        ]}
    ]"#;
    let hisui = r#"[
        {"id": 58, "name": "Growlithe", "types": ["fire"], "forms": [
            {"name": "Growlithe (Hisui)", "spriteSuffix": "b", "types": ["fire", "rock"]},
            {"name": "Hisuian Growlithe", "spriteSuffix": "c", "types": ["fire", "rock"]}
        ]},
        {"id": 899, "name": "Wyrdeer", "types": ["normal", "psychic"]}
    ]"#;
    let source = JsonSource::default()
        .with(DocumentKey::Region(Region::Kanto), kanto)
        .with(DocumentKey::Region(Region::Hisui), hisui);

    let regions = BTreeSet::from([Region::Hisui, Region::Kanto]);
    let catalog = block_on(load_catalog(&source, &regions)).unwrap();
    assert_eq!(source.fetches.get(), 2);
    assert_eq!(catalog.len(), 2);

    let growlithe = catalog.iter().find(|e| e.id == 58).unwrap();
    let forms = growlithe.forms.as_ref().unwrap();
    let suffixes: BTreeSet<&str> = forms
        .iter()
        .filter_map(|f| f.sprite_suffix.as_deref())
        .collect();
    assert_eq!(suffixes, BTreeSet::from(["a", "b", "c"]));
    let shared = forms
        .iter()
        .find(|f| f.sprite_suffix.as_deref() == Some("b"))
        .unwrap();
    assert_eq!(shared.name, "Growlithe (Kanto)");
}

#[test]
fn share_query_filters_to_the_same_eligible_set() {
    let catalog = entities_from_json(MIXED_DEX).unwrap();
    let options = GenerationOptions {
        types: BTreeSet::from([PokemonType::Normal, PokemonType::Electric]),
        evolution_counts: BTreeSet::from([1]),
        nfes: false,
        ..GenerationOptions::default()
    };
    let parsed = parse_query(&options.to_query());
    let expected: Vec<u32> = filter_eligible(&catalog, &options)
        .iter()
        .map(|e| e.id)
        .collect();
    let actual: Vec<u32> = filter_eligible(&catalog, &parsed.options)
        .iter()
        .map(|e| e.id)
        .collect();
    assert_eq!(actual, expected);
    assert_eq!(actual, vec![143]);
}

#[test]
fn state_survives_a_reload() {
    let store = MemoryStore::default();
    let options = GenerationOptions {
        n: 3,
        types: BTreeSet::from([PokemonType::Fire]),
        ..GenerationOptions::default()
    };
    {
        let source = JsonSource::default().with(DocumentKey::All, MIXED_DEX);
        let mut generator = Generator::new(source, store.clone(), 5);
        block_on(generator.generate(options.clone(), now())).unwrap();
    }

    let source = JsonSource::default().with(DocumentKey::All, MIXED_DEX);
    let generator = Generator::new(source, store.clone(), 6);
    let loaded = generator.load_options(Some("?utm_campaign=spring"));
    assert_eq!(loaded.origin, OptionsOrigin::Storage);
    assert_eq!(loaded.options, options);

    let from_url = generator.load_options(Some("?n=2&generate"));
    assert_eq!(from_url.origin, OptionsOrigin::Url);
    assert!(from_url.auto_generate);
    assert!(from_url.options.types.is_empty());
}

#[test]
fn corrupt_persisted_state_degrades_gracefully() {
    let store = MemoryStore::default();
    store.insert(STORAGE_OPTIONS_KEY, "{\"n\": \"six\"");
    store.insert(STORAGE_SHINIES_KEY, "not json at all");

    let source = JsonSource::default().with(DocumentKey::All, MIXED_DEX);
    let mut generator = Generator::new(source, store, 7);
    assert!(generator.vault().is_empty());
    let loaded = generator.load_options(None);
    assert_eq!(loaded.origin, OptionsOrigin::Defaults);
    assert_eq!(loaded.options, GenerationOptions::default());
}

#[test]
fn history_navigation_over_several_batches() {
    let source = JsonSource::default().with(DocumentKey::All, MIXED_DEX);
    let mut generator = Generator::new(source, MemoryStore::default(), 8);
    let options = GenerationOptions {
        n: 2,
        ..GenerationOptions::default()
    };
    let mut batches = Vec::new();
    for _ in 0..3 {
        batches.push(block_on(generator.generate(options.clone(), now())).unwrap());
    }
    // One fetch; the remaining runs hit the eligibility cache.
    assert_eq!(generator.source().fetches.get(), 1);

    assert!(!generator.show_previous());
    assert!(generator.show_next());
    assert_eq!(generator.displayed(), Some(batches[1].as_slice()));
    assert!(generator.show_next());
    assert!(!generator.show_next());
    assert_eq!(generator.displayed(), Some(batches[0].as_slice()));
    assert!(generator.show_previous());
    assert_eq!(generator.controls().cursor, 1);
}
