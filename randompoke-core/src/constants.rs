//! Centralized constants for Randompoke generation logic.
//!
//! Odds, caps and storage keys live here so that changing them is a reviewed
//! code change rather than a data edit.

// History & vault -----------------------------------------------------------
/// Maximum number of batches kept in the navigable history.
pub const HISTORY_SIZE: usize = 64;
/// Storage key for the persisted shiny vault.
pub const STORAGE_SHINIES_KEY: &str = "shinies";
/// Storage key for the persisted generation options.
pub const STORAGE_OPTIONS_KEY: &str = "options";

// Trait odds ----------------------------------------------------------------
/// A record is shiny when a roll in `0..SHINY_ROLL_RANGE` lands below this.
pub const SHINY_ODDS_NUMERATOR: u32 = 16;
pub const SHINY_ROLL_RANGE: u32 = 65_536;

// Options -------------------------------------------------------------------
pub const DEFAULT_BATCH_SIZE: u32 = 6;
/// Evolution-count filter domain (unevolved, evolved once, evolved twice).
pub const EVOLUTION_COUNTS: [u8; 3] = [0, 1, 2];
/// Query value standing in for "every member of the domain".
pub const ALL_TOKEN: &str = "all";

// Assets --------------------------------------------------------------------
pub const CATALOG_DIR: &str = "dex";
pub const CATALOG_EXTENSION: &str = ".json";
pub const PATH_TO_SPRITES: &str = "sprites/normal/";
pub const PATH_TO_SHINY_SPRITES: &str = "sprites/shiny/";
pub const SPRITE_EXTENSION: &str = ".webp";

/// Display names whose gender is already part of the name.
pub(crate) const GENDERED_NAMES: [&str; 2] = ["Nidoran ♀", "Nidoran ♂"];
