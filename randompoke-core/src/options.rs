//! Generation options and their two external encodings: the shareable URL
//! query string and the persisted JSON blob.
use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::fmt::Display;
use std::str::FromStr;
use url::form_urlencoded;

use crate::constants::{ALL_TOKEN, DEFAULT_BATCH_SIZE, EVOLUTION_COUNTS, STORAGE_OPTIONS_KEY};
use crate::data::{PokemonType, Region};
use crate::storage::{KeyValueStore, read_json, write_json};

/// Query keys understood by [`parse_query`]. `region`/`type` are legacy single-value forms.
pub const QUERY_KEYS: [&str; 20] = [
    "n",
    "region",
    "regions",
    "type",
    "types",
    "sublegendaries",
    "legendaries",
    "mythicals",
    "paradoxes",
    "ultraBeasts",
    "evolutionCounts",
    "nfes",
    "fullyEvolved",
    "sprites",
    "natures",
    "genders",
    "forms",
    "megas",
    "gigantamaxes",
    "generate",
];

/// Immutable snapshot of every filter and generation toggle.
///
/// Empty sets mean "no restriction". Field order is also the order of the
/// persisted JSON and therefore of the eligibility cache key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationOptions {
    pub n: u32,
    #[serde(deserialize_with = "lenient_set")]
    pub regions: BTreeSet<Region>,
    #[serde(deserialize_with = "lenient_set")]
    pub types: BTreeSet<PokemonType>,
    pub sublegendaries: bool,
    pub legendaries: bool,
    pub mythicals: bool,
    pub paradoxes: bool,
    pub ultra_beasts: bool,
    #[serde(deserialize_with = "lenient_set")]
    pub evolution_counts: BTreeSet<u8>,
    pub nfes: bool,
    pub fully_evolved: bool,
    pub sprites: bool,
    pub natures: bool,
    pub genders: bool,
    pub forms: bool,
    pub megas: bool,
    pub gigantamaxes: bool,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            n: DEFAULT_BATCH_SIZE,
            regions: BTreeSet::new(),
            types: BTreeSet::new(),
            sublegendaries: true,
            legendaries: true,
            mythicals: true,
            paradoxes: true,
            ultra_beasts: true,
            evolution_counts: BTreeSet::new(),
            nfes: true,
            fully_evolved: true,
            sprites: true,
            natures: true,
            genders: true,
            forms: true,
            megas: false,
            gigantamaxes: false,
        }
    }
}

impl GenerationOptions {
    /// Replace values no generation can use (a zero batch size, counts outside 0..=2).
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        if self.n == 0 {
            self.n = DEFAULT_BATCH_SIZE;
        }
        self.evolution_counts
            .retain(|count| EVOLUTION_COUNTS.contains(count));
        self
    }

    /// Exact serialization used to key the eligibility cache.
    #[must_use]
    pub fn cache_key(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.to_query())
    }

    /// Canonical shareable query string (without the leading `?`).
    #[must_use]
    pub fn to_query(&self) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        query
            .append_pair("n", &self.n.to_string())
            .append_pair("regions", &encode_list(&self.regions, Region::ALL.len()))
            .append_pair("types", &encode_list(&self.types, PokemonType::ALL.len()))
            .append_pair("sublegendaries", bool_str(self.sublegendaries))
            .append_pair("legendaries", bool_str(self.legendaries))
            .append_pair("mythicals", bool_str(self.mythicals))
            .append_pair("paradoxes", bool_str(self.paradoxes))
            .append_pair("ultraBeasts", bool_str(self.ultra_beasts))
            .append_pair(
                "evolutionCounts",
                &encode_list(&self.evolution_counts, EVOLUTION_COUNTS.len()),
            )
            .append_pair("nfes", bool_str(self.nfes))
            .append_pair("fullyEvolved", bool_str(self.fully_evolved))
            .append_pair("sprites", bool_str(self.sprites))
            .append_pair("natures", bool_str(self.natures))
            .append_pair("genders", bool_str(self.genders))
            .append_pair("forms", bool_str(self.forms))
            .append_pair("megas", bool_str(self.megas))
            .append_pair("gigantamaxes", bool_str(self.gigantamaxes));
        query.finish()
    }
}

const fn bool_str(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

fn parse_bool(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

fn encode_list<T: Display>(values: &BTreeSet<T>, domain_len: usize) -> String {
    if values.is_empty() || values.len() == domain_len {
        return ALL_TOKEN.to_string();
    }
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Decode a comma-separated list. Unknown tokens are dropped with a warning.
///
/// Returns `None` when tokens were given but none was usable: the empty set
/// means "no restriction", so it must not stand in for a list that failed.
fn decode_list<T>(raw: &str, key: &str, accept: impl Fn(&T) -> bool) -> Option<BTreeSet<T>>
where
    T: FromStr + Ord,
    T::Err: Display,
{
    let mut out = BTreeSet::new();
    let mut seen_tokens = false;
    for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if token.eq_ignore_ascii_case(ALL_TOKEN) {
            return Some(BTreeSet::new());
        }
        seen_tokens = true;
        match token.parse::<T>() {
            Ok(value) if accept(&value) => {
                out.insert(value);
            }
            Ok(_) => log::warn!("ignoring out-of-range `{key}` entry `{token}`"),
            Err(err) => log::warn!("ignoring `{key}` entry: {err}"),
        }
    }
    if seen_tokens && out.is_empty() {
        log::warn!("no usable `{key}` values in `{raw}`; keeping the previous selection");
        return None;
    }
    Some(out)
}

/// Deserialize a stored list, dropping entries this build does not know.
/// A list whose every entry is unknown fails, so the blob counts as corrupt
/// instead of widening to "no restriction".
fn lenient_set<'de, D, T>(deserializer: D) -> Result<BTreeSet<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Ord,
{
    let raw = Vec::<serde_json::Value>::deserialize(deserializer)?;
    let given = raw.len();
    let out: BTreeSet<T> = raw
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<T>(value.clone()) {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                log::warn!("dropping stored option entry {value}: {err}");
                None
            }
        })
        .collect();
    if given > 0 && out.is_empty() {
        return Err(de::Error::custom("no known entries in stored list"));
    }
    Ok(out)
}

/// Result of reading a query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuery {
    pub options: GenerationOptions,
    /// `generate` was present: run a generation right after applying the options.
    pub generate: bool,
    /// At least one recognized key was present.
    pub recognized: bool,
    /// List keys whose values were all unknown; those fields kept their previous value.
    pub rejected: Vec<&'static str>,
}

/// Whether a query string carries any recognized option key.
#[must_use]
pub fn has_recognized_keys(query: &str) -> bool {
    query_pairs(query).any(|(key, _)| QUERY_KEYS.contains(&key.as_str()))
}

fn query_pairs(query: &str) -> impl Iterator<Item = (String, String)> + '_ {
    let query = query.trim().trim_start_matches('?');
    form_urlencoded::parse(query.as_bytes()).map(|(k, v)| (k.into_owned(), v.into_owned()))
}

/// Parse a query string over defaults. Keys that are absent keep their default value.
#[must_use]
pub fn parse_query(query: &str) -> ParsedQuery {
    // First occurrence of each key wins.
    let mut params: Vec<(String, String)> = Vec::new();
    for (key, value) in query_pairs(query) {
        if !params.iter().any(|(seen, _)| *seen == key) {
            params.push((key, value));
        }
    }
    let get = |key: &str| {
        params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    };

    let mut options = GenerationOptions::default();
    if let Some(raw) = get("n") {
        match raw.trim().parse::<u32>() {
            Ok(n) if n > 0 => options.n = n,
            _ => log::warn!("ignoring invalid batch size `{raw}`"),
        }
    }
    let mut rejected = Vec::new();
    for key in ["region", "regions"] {
        if let Some(raw) = get(key) {
            match decode_list(raw, key, |_: &Region| true) {
                Some(regions) => options.regions = regions,
                None => rejected.push(key),
            }
        }
    }
    for key in ["type", "types"] {
        if let Some(raw) = get(key) {
            match decode_list(raw, key, |_: &PokemonType| true) {
                Some(types) => options.types = types,
                None => rejected.push(key),
            }
        }
    }
    if let Some(raw) = get("evolutionCounts") {
        match decode_list(raw, "evolutionCounts", |count: &u8| {
            EVOLUTION_COUNTS.contains(count)
        }) {
            Some(counts) => options.evolution_counts = counts,
            None => rejected.push("evolutionCounts"),
        }
    }

    let flags: [(&str, &mut bool); 13] = [
        ("sublegendaries", &mut options.sublegendaries),
        ("legendaries", &mut options.legendaries),
        ("mythicals", &mut options.mythicals),
        ("paradoxes", &mut options.paradoxes),
        ("ultraBeasts", &mut options.ultra_beasts),
        ("nfes", &mut options.nfes),
        ("fullyEvolved", &mut options.fully_evolved),
        ("sprites", &mut options.sprites),
        ("natures", &mut options.natures),
        ("genders", &mut options.genders),
        ("forms", &mut options.forms),
        ("megas", &mut options.megas),
        ("gigantamaxes", &mut options.gigantamaxes),
    ];
    for (key, slot) in flags {
        if let Some(raw) = get(key) {
            *slot = parse_bool(raw);
        }
    }

    ParsedQuery {
        options: options.sanitized(),
        generate: get("generate").is_some(),
        recognized: params
            .iter()
            .any(|(key, _)| QUERY_KEYS.contains(&key.as_str())),
        rejected,
    }
}

/// Where the active options came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionsOrigin {
    Url,
    Storage,
    Defaults,
}

/// Options chosen at startup plus whether to generate immediately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedOptions {
    pub options: GenerationOptions,
    pub origin: OptionsOrigin,
    pub auto_generate: bool,
}

/// Read the last persisted options blob. Malformed data counts as absent.
#[must_use]
pub fn load_persisted<K: KeyValueStore>(store: &K) -> Option<GenerationOptions> {
    read_json::<GenerationOptions, K>(store, STORAGE_OPTIONS_KEY).map(GenerationOptions::sanitized)
}

/// Overwrite the persisted options blob.
///
/// # Errors
///
/// Returns an error if the store rejects the write.
pub fn persist<K: KeyValueStore>(options: &GenerationOptions, store: &K) -> Result<(), K::Error> {
    write_json(store, STORAGE_OPTIONS_KEY, options)
}

/// Pick startup options: a query with recognized keys wins outright, then the
/// persisted blob, then defaults.
#[must_use]
pub fn resolve<K: KeyValueStore>(query: Option<&str>, store: &K) -> LoadedOptions {
    if let Some(query) = query {
        let parsed = parse_query(query);
        if parsed.recognized {
            if !parsed.rejected.is_empty() {
                log::warn!(
                    "query lists without usable values: {}; not auto-generating",
                    parsed.rejected.join(", ")
                );
            }
            return LoadedOptions {
                auto_generate: parsed.generate && parsed.rejected.is_empty(),
                options: parsed.options,
                origin: OptionsOrigin::Url,
            };
        }
    }
    match load_persisted(store) {
        Some(options) => LoadedOptions {
            options,
            origin: OptionsOrigin::Storage,
            auto_generate: false,
        },
        None => LoadedOptions {
            options: GenerationOptions::default(),
            origin: OptionsOrigin::Defaults,
            auto_generate: false,
        },
    }
}
