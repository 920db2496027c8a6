//! Helpers for constructing URLs to static assets that respect the deployment base path.
use randompoke_core::{DocumentKey, GeneratedRecord};

/// Prefix `relative` with the compile-time `PUBLIC_URL` base.
///
/// When `PUBLIC_URL` is set at compile time (e.g., `/randompoke` for GitHub Pages),
/// generated URLs are prefixed accordingly. Local builds without `PUBLIC_URL`
/// fall back to root-anchored paths.
#[must_use]
pub fn asset_path(relative: &str) -> String {
    asset_path_with_base(relative, option_env!("PUBLIC_URL").unwrap_or(""))
}

/// URL of one catalog document, e.g. `/dex/kanto.json`.
#[must_use]
pub fn catalog_url(key: DocumentKey) -> String {
    asset_path(&key.relative_path())
}

/// URL of the sprite for a generated record.
#[must_use]
pub fn sprite_url(record: &GeneratedRecord) -> String {
    asset_path(&record.sprite_path())
}

fn asset_path_with_base(relative: &str, base: &str) -> String {
    let base = base.trim_end_matches('/');
    let rel = relative.trim_start_matches('/');

    if base.is_empty() {
        format!("/{rel}")
    } else {
        format!("{base}/{rel}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use randompoke_core::Region;

    #[test]
    fn builds_root_prefixed_path_when_base_missing() {
        assert_eq!(asset_path("dex/all.json"), "/dex/all.json");
        assert_eq!(asset_path("/dex/all.json"), "/dex/all.json");
    }

    #[test]
    fn builds_paths_with_public_base() {
        assert_eq!(
            asset_path_with_base("sprites/normal/eevee.webp", "/randompoke"),
            "/randompoke/sprites/normal/eevee.webp"
        );
        assert_eq!(
            asset_path_with_base("/dex/galar.json", "/randompoke/"),
            "/randompoke/dex/galar.json"
        );
    }

    #[test]
    fn catalog_urls_follow_document_keys() {
        assert_eq!(catalog_url(DocumentKey::All), "/dex/all.json");
        assert_eq!(
            catalog_url(DocumentKey::Region(Region::Paldea)),
            "/dex/paldea.json"
        );
    }
}
