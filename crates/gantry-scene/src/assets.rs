//! Cache-directory asset resolution.

use std::path::{Path, PathBuf};

use gantry_core::AssetResolver;

/// URI scheme recognized for remote world identifiers.
const SCHEME: &str = "gantry://";

/// Stock [`AssetResolver`] backed by a local resource cache directory.
///
/// Strips the `gantry://` scheme if present and probes the cache for a
/// file matching the identifier's final path component. Actual fetching
/// is the embedding application's concern; this resolver only answers
/// "already cached" lookups. Without a cache directory every lookup is
/// absent.
#[derive(Clone, Debug, Default)]
pub struct CacheAssetResolver {
    cache: Option<PathBuf>,
}

impl CacheAssetResolver {
    /// A resolver over the given cache directory.
    pub fn new(cache: Option<PathBuf>) -> Self {
        Self { cache }
    }
}

impl AssetResolver for CacheAssetResolver {
    fn resolve(&self, identifier: &str) -> Option<PathBuf> {
        let cache = self.cache.as_ref()?;
        let stripped = identifier.strip_prefix(SCHEME).unwrap_or(identifier);
        let file_name = Path::new(stripped).file_name()?;
        let candidate = cache.join(file_name);
        candidate.is_file().then_some(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("gantry-assets-{tag}-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn resolves_cached_identifier_with_scheme() {
        let dir = temp_dir("hit");
        fs::write(dir.join("shelf.gsd"), "world shelf\n").unwrap();
        let resolver = CacheAssetResolver::new(Some(dir.clone()));
        let path = resolver.resolve("gantry://worlds/shelf.gsd").unwrap();
        assert_eq!(path, dir.join("shelf.gsd"));
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn absent_when_not_cached() {
        let dir = temp_dir("miss");
        let resolver = CacheAssetResolver::new(Some(dir.clone()));
        assert!(resolver.resolve("gantry://worlds/missing.gsd").is_none());
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn absent_without_cache_directory() {
        let resolver = CacheAssetResolver::new(None);
        assert!(resolver.resolve("anything.gsd").is_none());
    }
}
