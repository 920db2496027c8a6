//! Catalog data: entities, their variants, and the closed region/type domains.
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A token that does not name a member of a closed domain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {domain} `{token}`")]
pub struct UnknownToken {
    pub domain: &'static str,
    pub token: String,
}

/// Catalog regions in canonical (release) order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Kanto,
    Johto,
    Hoenn,
    Sinnoh,
    Unova,
    Kalos,
    Alola,
    Galar,
    Hisui,
    Paldea,
}

impl Region {
    pub const ALL: [Self; 10] = [
        Self::Kanto,
        Self::Johto,
        Self::Hoenn,
        Self::Sinnoh,
        Self::Unova,
        Self::Kalos,
        Self::Alola,
        Self::Galar,
        Self::Hisui,
        Self::Paldea,
    ];

    /// Identifier used in URLs and catalog document names.
    #[must_use]
    pub const fn asset_key(self) -> &'static str {
        match self {
            Self::Kanto => "kanto",
            Self::Johto => "johto",
            Self::Hoenn => "hoenn",
            Self::Sinnoh => "sinnoh",
            Self::Unova => "unova",
            Self::Kalos => "kalos",
            Self::Alola => "alola",
            Self::Galar => "galar",
            Self::Hisui => "hisui",
            Self::Paldea => "paldea",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.asset_key())
    }
}

impl FromStr for Region {
    type Err = UnknownToken;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        Self::ALL
            .into_iter()
            .find(|region| region.asset_key().eq_ignore_ascii_case(token))
            .ok_or_else(|| UnknownToken {
                domain: "region",
                token: token.to_string(),
            })
    }
}

/// Elemental types an entity or variant can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PokemonType {
    Normal,
    Fire,
    Water,
    Grass,
    Electric,
    Ice,
    Fighting,
    Poison,
    Ground,
    Flying,
    Psychic,
    Bug,
    Rock,
    Ghost,
    Dragon,
    Dark,
    Steel,
    Fairy,
}

impl PokemonType {
    pub const ALL: [Self; 18] = [
        Self::Normal,
        Self::Fire,
        Self::Water,
        Self::Grass,
        Self::Electric,
        Self::Ice,
        Self::Fighting,
        Self::Poison,
        Self::Ground,
        Self::Flying,
        Self::Psychic,
        Self::Bug,
        Self::Rock,
        Self::Ghost,
        Self::Dragon,
        Self::Dark,
        Self::Steel,
        Self::Fairy,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Fire => "fire",
            Self::Water => "water",
            Self::Grass => "grass",
            Self::Electric => "electric",
            Self::Ice => "ice",
            Self::Fighting => "fighting",
            Self::Poison => "poison",
            Self::Ground => "ground",
            Self::Flying => "flying",
            Self::Psychic => "psychic",
            Self::Bug => "bug",
            Self::Rock => "rock",
            Self::Ghost => "ghost",
            Self::Dragon => "dragon",
            Self::Dark => "dark",
            Self::Steel => "steel",
            Self::Fairy => "fairy",
        }
    }
}

impl fmt::Display for PokemonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for PokemonType {
    type Err = UnknownToken;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        Self::ALL
            .into_iter()
            .find(|ty| ty.key().eq_ignore_ascii_case(token))
            .ok_or_else(|| UnknownToken {
                domain: "type",
                token: token.to_string(),
            })
    }
}

/// Marker for the literal `"unknown"` gender ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Genderless {
    #[serde(rename = "unknown")]
    Unknown,
}

/// Relative male/female weights, or `"unknown"` for genderless entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GenderRatio {
    Known { male: u32, female: u32 },
    Unknown(Genderless),
}

impl GenderRatio {
    /// Ratio assumed when neither a variant nor its entity declares one.
    pub const EVEN: Self = Self::Known { male: 1, female: 1 };
    pub const GENDERLESS: Self = Self::Unknown(Genderless::Unknown);

    /// Probability that a roll comes out male, or `None` when no gender applies.
    #[must_use]
    pub fn male_probability(self) -> Option<f64> {
        match self {
            Self::Known { male, female } => {
                let total = f64::from(male) + f64::from(female);
                (total > 0.0).then(|| f64::from(male) / total)
            }
            Self::Unknown(_) => None,
        }
    }
}

const fn is_false(value: &bool) -> bool {
    !*value
}

/// Rarity classes; a missing key in catalog JSON means the entity is not in that class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RarityFlags {
    #[serde(rename = "isSubLegendary", default, skip_serializing_if = "is_false")]
    pub sub_legendary: bool,
    #[serde(rename = "isLegendary", default, skip_serializing_if = "is_false")]
    pub legendary: bool,
    #[serde(rename = "isMythical", default, skip_serializing_if = "is_false")]
    pub mythical: bool,
    #[serde(rename = "isParadox", default, skip_serializing_if = "is_false")]
    pub paradox: bool,
    #[serde(rename = "isUltraBeast", default, skip_serializing_if = "is_false")]
    pub ultra_beast: bool,
}

/// Alternate form of an entity (regional, mega, gigantamax, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub name: String,
    /// Merge key; `None` for a variant synthesized from a formless entity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprite_suffix: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_mega: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_gigantamax: bool,
    /// Overrides the entity ratio when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender_ratio: Option<GenderRatio>,
    #[serde(default)]
    pub types: Vec<PokemonType>,
}

impl Variant {
    /// Type filter: an empty request matches everything.
    #[must_use]
    pub fn matches_types(&self, wanted: &BTreeSet<PokemonType>) -> bool {
        types_intersect(&self.types, wanted)
    }
}

/// A catalog entry eligible for generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub types: Vec<PokemonType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender_ratio: Option<GenderRatio>,
    #[serde(flatten)]
    pub rarity: RarityFlags,
    /// `None` means the entity has no stage data and counts as fully evolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_nfe: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evolution_count: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forms: Option<Vec<Variant>>,
}

impl Entity {
    #[must_use]
    pub fn is_nfe(&self) -> bool {
        self.is_nfe == Some(true)
    }

    #[must_use]
    pub const fn is_fully_evolved(&self) -> bool {
        self.is_nfe.is_none()
    }

    /// Number of evolutions leading to this entity; 0 when unspecified.
    #[must_use]
    pub fn evolution_count(&self) -> u8 {
        self.evolution_count.unwrap_or(0)
    }

    #[must_use]
    pub fn matches_types(&self, wanted: &BTreeSet<PokemonType>) -> bool {
        types_intersect(&self.types, wanted)
    }

    /// The entity viewed as its own suffix-less variant.
    #[must_use]
    pub fn as_variant(&self) -> Variant {
        Variant {
            name: self.name.clone(),
            sprite_suffix: None,
            is_mega: false,
            is_gigantamax: false,
            gender_ratio: self.gender_ratio,
            types: self.types.clone(),
        }
    }
}

fn types_intersect(types: &[PokemonType], wanted: &BTreeSet<PokemonType>) -> bool {
    wanted.is_empty() || types.iter().any(|ty| wanted.contains(ty))
}

/// Parse one catalog document (a JSON array of entities).
///
/// # Errors
///
/// Returns an error if the JSON is not a valid entity list.
pub fn entities_from_json(json: &str) -> Result<Vec<Entity>, serde_json::Error> {
    serde_json::from_str(json)
}
