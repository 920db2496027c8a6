use anyhow::{Result, anyhow};
use std::collections::BTreeSet;
use std::fmt::Display;
use std::str::FromStr;

use randompoke_core::constants::ALL_TOKEN;

pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// Parse a comma-separated flag value into a set. `all` means no restriction.
/// Unlike URL parsing, an unknown token is an error here.
pub fn parse_csv_set<T>(s: &str) -> Result<BTreeSet<T>>
where
    T: FromStr + Ord,
    T::Err: Display,
{
    let mut out = BTreeSet::new();
    for token in split_csv(s) {
        if token.eq_ignore_ascii_case(ALL_TOKEN) {
            return Ok(BTreeSet::new());
        }
        let value = token.parse::<T>().map_err(|err| anyhow!("{err}"))?;
        out.insert(value);
    }
    Ok(out)
}

/// Seed from the wall clock when none was given.
pub fn entropy_seed() -> u64 {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    #[allow(clippy::cast_possible_truncation)]
    let seed = nanos as u64;
    seed
}
