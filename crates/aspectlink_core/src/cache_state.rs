//! Cache-state snapshot contract.
//!
//! # Responsibility
//! - Describe, per absolute source path, whether a rewritten file already
//!   exists on disk.
//!
//! # Invariants
//! - A snapshot is immutable after construction; it is queried exactly once
//!   when the intercepting loader is built and never refreshed. Staleness
//!   across cache regenerations is an accepted tradeoff; deployments restart
//!   the process when the cache is rebuilt.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// One cache decision for a source file.
///
/// `cache_uri == None` means the file was already inspected and needs no
/// rewrite; the original path is served as-is.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CacheRecord {
    /// Location of the rewritten file, when one exists.
    pub cache_uri: Option<PathBuf>,
}

impl CacheRecord {
    /// Record pointing at a rewritten file.
    pub fn rewritten(cache_uri: impl Into<PathBuf>) -> Self {
        Self {
            cache_uri: Some(cache_uri.into()),
        }
    }

    /// Record marking a file as inspected with no rewrite needed.
    pub fn unmodified() -> Self {
        Self { cache_uri: None }
    }
}

/// Immutable snapshot mapping absolute source paths to cache records.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CacheState {
    entries: BTreeMap<PathBuf, CacheRecord>,
}

impl CacheState {
    pub fn new(entries: BTreeMap<PathBuf, CacheRecord>) -> Self {
        Self { entries }
    }

    pub fn get(&self, path: &Path) -> Option<&CacheRecord> {
        self.entries.get(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Provider boundary for the on-disk cache-state store.
pub trait CacheStateProvider: Send + Sync {
    /// Returns the current cache-state snapshot.
    fn query_cache_state(&self) -> CacheState;
}

#[cfg(test)]
mod tests {
    use super::{CacheRecord, CacheState};
    use std::collections::BTreeMap;
    use std::path::{Path, PathBuf};

    #[test]
    fn lookup_distinguishes_rewritten_and_unmodified() {
        let mut entries = BTreeMap::new();
        entries.insert(
            PathBuf::from("/srv/app/Foo.php"),
            CacheRecord::rewritten("/srv/cache/Foo.php"),
        );
        entries.insert(PathBuf::from("/srv/app/Bar.php"), CacheRecord::unmodified());
        let state = CacheState::new(entries);

        assert_eq!(
            state.get(Path::new("/srv/app/Foo.php")).unwrap().cache_uri,
            Some(PathBuf::from("/srv/cache/Foo.php"))
        );
        assert_eq!(
            state.get(Path::new("/srv/app/Bar.php")).unwrap().cache_uri,
            None
        );
        assert!(state.get(Path::new("/srv/app/Baz.php")).is_none());
        assert_eq!(state.len(), 2);
    }
}
