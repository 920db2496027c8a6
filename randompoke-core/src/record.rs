//! Generated records and the presentation-neutral strings derived from them.
use chrono::{DateTime, Utc};
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use crate::constants::{
    GENDERED_NAMES, PATH_TO_SHINY_SPRITES, PATH_TO_SPRITES, SHINY_ODDS_NUMERATOR,
    SHINY_ROLL_RANGE, SPRITE_EXTENSION,
};
use crate::data::{Entity, GenderRatio, Variant};
use crate::options::GenerationOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Nature {
    Adamant,
    Bashful,
    Bold,
    Brave,
    Calm,
    Careful,
    Docile,
    Gentle,
    Hardy,
    Hasty,
    Impish,
    Jolly,
    Lax,
    Lonely,
    Mild,
    Modest,
    #[serde(rename = "Naïve", alias = "Na&iuml;ve", alias = "Naive")]
    Naive,
    Naughty,
    Quiet,
    Quirky,
    Rash,
    Relaxed,
    Sassy,
    Serious,
    Timid,
}

impl Nature {
    pub const ALL: [Self; 25] = [
        Self::Adamant,
        Self::Bashful,
        Self::Bold,
        Self::Brave,
        Self::Calm,
        Self::Careful,
        Self::Docile,
        Self::Gentle,
        Self::Hardy,
        Self::Hasty,
        Self::Impish,
        Self::Jolly,
        Self::Lax,
        Self::Lonely,
        Self::Mild,
        Self::Modest,
        Self::Naive,
        Self::Naughty,
        Self::Quiet,
        Self::Quirky,
        Self::Rash,
        Self::Relaxed,
        Self::Sassy,
        Self::Serious,
        Self::Timid,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Adamant => "Adamant",
            Self::Bashful => "Bashful",
            Self::Bold => "Bold",
            Self::Brave => "Brave",
            Self::Calm => "Calm",
            Self::Careful => "Careful",
            Self::Docile => "Docile",
            Self::Gentle => "Gentle",
            Self::Hardy => "Hardy",
            Self::Hasty => "Hasty",
            Self::Impish => "Impish",
            Self::Jolly => "Jolly",
            Self::Lax => "Lax",
            Self::Lonely => "Lonely",
            Self::Mild => "Mild",
            Self::Modest => "Modest",
            Self::Naive => "Naïve",
            Self::Naughty => "Naughty",
            Self::Quiet => "Quiet",
            Self::Quirky => "Quirky",
            Self::Rash => "Rash",
            Self::Relaxed => "Relaxed",
            Self::Sassy => "Sassy",
            Self::Serious => "Serious",
            Self::Timid => "Timid",
        }
    }

    fn roll<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

impl fmt::Display for Nature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Male => "♂",
            Self::Female => "♀",
        }
    }
}

/// One generated entity with its rolled traits. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedRecord {
    pub id: u32,
    #[serde(default)]
    pub base_name: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprite_suffix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nature: Option<Nature>,
    #[serde(default)]
    pub shiny: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    /// Older vault entries store this under `date` and a few have none at all.
    #[serde(default, alias = "date", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl GeneratedRecord {
    /// Roll traits for `entity`, optionally as one of its variants.
    pub fn roll<R>(
        entity: &Entity,
        variant: Option<&Variant>,
        options: &GenerationOptions,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Self
    where
        R: Rng + ?Sized,
    {
        let nature = options.natures.then(|| Nature::roll(rng));
        let shiny = rng.gen_range(0..SHINY_ROLL_RANGE) < SHINY_ODDS_NUMERATOR;
        let gender = if options.genders {
            let ratio = variant
                .and_then(|v| v.gender_ratio)
                .or(entity.gender_ratio)
                .unwrap_or(GenderRatio::EVEN);
            ratio.male_probability().map(|male| {
                if rng.gen_bool(male) {
                    Gender::Male
                } else {
                    Gender::Female
                }
            })
        } else {
            None
        };

        Self {
            id: entity.id,
            base_name: entity.name.clone(),
            name: variant.map_or_else(|| entity.name.clone(), |v| v.name.clone()),
            sprite_suffix: variant.and_then(|v| v.sprite_suffix.clone()),
            nature,
            shiny,
            gender,
            timestamp: Some(now),
        }
    }

    /// Relative sprite path, e.g. `sprites/shiny/mrmime-galar.webp`.
    #[must_use]
    pub fn sprite_path(&self) -> String {
        let dir = if self.shiny {
            PATH_TO_SHINY_SPRITES
        } else {
            PATH_TO_SPRITES
        };
        let mut name = self.normalized_name();
        if let Some(suffix) = self.sprite_suffix.as_deref().filter(|s| !s.is_empty()) {
            name.push('-');
            name.push_str(suffix);
        }
        format!("{dir}{name}{SPRITE_EXTENSION}")
    }

    /// Sprite file stem for the base entity name.
    #[must_use]
    pub fn normalized_name(&self) -> String {
        let source = if self.base_name.is_empty() {
            &self.name
        } else {
            &self.base_name
        };
        let lowered = source
            .to_lowercase()
            .replace('é', "e")
            .replace('♀', "f")
            .replace('♂', "m");
        sprite_strip_pattern()
            .map(|re| re.replace_all(&lowered, "").into_owned())
            .unwrap_or(lowered)
    }

    /// `♂`/`♀`, or nothing when there is no gender or the name already carries it.
    #[must_use]
    pub fn gender_symbol(&self) -> Option<&'static str> {
        if GENDERED_NAMES.contains(&self.name.as_str()) {
            return None;
        }
        self.gender.map(Gender::symbol)
    }

    #[must_use]
    pub fn alt_text(&self) -> String {
        if self.shiny {
            format!("Shiny {}", self.name)
        } else {
            self.name.clone()
        }
    }

    /// One-line text form: nature, name, gender symbol and a star when shiny.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(4);
        if let Some(nature) = self.nature {
            parts.push(nature.label());
        }
        parts.push(&self.name);
        if let Some(symbol) = self.gender_symbol() {
            parts.push(symbol);
        }
        if self.shiny {
            parts.push("★");
        }
        parts.join(" ")
    }
}

fn sprite_strip_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"['.:% -]").ok())
        .as_ref()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::PokemonType;
    use crate::fixtures::{entity, variant};
    use chrono::TimeZone;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn record(name: &str, base: &str, suffix: Option<&str>, shiny: bool) -> GeneratedRecord {
        GeneratedRecord {
            id: 1,
            base_name: base.to_string(),
            name: name.to_string(),
            sprite_suffix: suffix.map(str::to_string),
            nature: None,
            shiny,
            gender: None,
            timestamp: None,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn sprite_path_normalizes_base_name() {
        assert_eq!(
            record("Galarian Mr. Mime", "Mr. Mime", Some("galar"), false).sprite_path(),
            "sprites/normal/mrmime-galar.webp"
        );
        assert_eq!(
            record("Nidoran ♀", "Nidoran ♀", None, true).sprite_path(),
            "sprites/shiny/nidoranf.webp"
        );
        assert_eq!(
            record("Flabébé", "Flabébé", None, false).sprite_path(),
            "sprites/normal/flabebe.webp"
        );
        assert_eq!(
            record("Type: Null", "Type: Null", None, false).normalized_name(),
            "typenull"
        );
        assert_eq!(
            record("Farfetch'd", "", None, false).normalized_name(),
            "farfetchd"
        );
    }

    #[test]
    fn strip_pattern_compiles_and_covers_every_separator() {
        let re = sprite_strip_pattern().expect("pattern compiles");
        assert_eq!(re.replace_all("mr. mime-jr:'100%", ""), "mrmimejr100");
    }

    #[test]
    fn text_derivations() {
        let mut rec = record("Nidoran ♂", "Nidoran ♂", None, true);
        rec.gender = Some(Gender::Male);
        rec.nature = Some(Nature::Naive);
        assert_eq!(rec.gender_symbol(), None);
        assert_eq!(rec.alt_text(), "Shiny Nidoran ♂");
        assert_eq!(rec.summary(), "Naïve Nidoran ♂ ★");

        let mut eevee = record("Eevee", "Eevee", None, false);
        eevee.gender = Some(Gender::Female);
        assert_eq!(eevee.gender_symbol(), Some("♀"));
        assert_eq!(eevee.summary(), "Eevee ♀");
        assert_eq!(eevee.alt_text(), "Eevee");
    }

    #[test]
    fn roll_respects_disabled_traits_and_genderless() {
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        let options = GenerationOptions {
            natures: false,
            ..GenerationOptions::default()
        };
        let mut magnemite = entity(81, "Magnemite", &[PokemonType::Electric]);
        magnemite.gender_ratio = Some(GenderRatio::GENDERLESS);
        for _ in 0..50 {
            let rec = GeneratedRecord::roll(&magnemite, None, &options, &mut rng, now());
            assert_eq!(rec.nature, None);
            assert_eq!(rec.gender, None);
            assert_eq!(rec.name, "Magnemite");
            assert_eq!(rec.timestamp, Some(now()));
        }
    }

    #[test]
    fn variant_ratio_overrides_entity() {
        let mut rng = ChaCha20Rng::seed_from_u64(11);
        let options = GenerationOptions::default();
        let base = entity(678, "Meowstic", &[PokemonType::Psychic]);
        let mut female_only = variant("Meowstic (F)", Some("f"), &[PokemonType::Psychic]);
        female_only.gender_ratio = Some(GenderRatio::Known { male: 0, female: 1 });
        for _ in 0..50 {
            let rec = GeneratedRecord::roll(&base, Some(&female_only), &options, &mut rng, now());
            assert_eq!(rec.gender, Some(Gender::Female));
            assert_eq!(rec.base_name, "Meowstic");
            assert_eq!(rec.sprite_suffix.as_deref(), Some("f"));
            assert!(rec.nature.is_some());
        }
    }

    #[test]
    fn legacy_vault_entry_decodes() {
        let json = r#"{
            "id": 133, "baseName": "Eevee", "name": "Eevee",
            "nature": "Na&iuml;ve", "shiny": true, "gender": "female",
            "date": "2023-05-04T10:11:12.000Z"
        }"#;
        let rec: GeneratedRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.nature, Some(Nature::Naive));
        assert_eq!(rec.gender, Some(Gender::Female));
        assert_eq!(
            rec.timestamp,
            Some(Utc.with_ymd_and_hms(2023, 5, 4, 10, 11, 12).unwrap())
        );

        let out = serde_json::to_string(&rec).unwrap();
        assert!(out.contains("\"timestamp\""));
        assert!(out.contains("Naïve"));
    }
}
