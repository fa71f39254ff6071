//! Process-wide per-file-path mutex registry.
//!
//! Every read and write of a `DayFile` acquires the mutex for its absolute
//! path before touching disk, so concurrent writers to the same path
//! linearize. The registry is lazily populated and never purged — bounded
//! by the number of distinct (market, symbol, date) triples touched
//! during the process lifetime.

use std::path::PathBuf;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

pub static FILE_LOCKS: std::sync::LazyLock<FileLockRegistry> =
    std::sync::LazyLock::new(FileLockRegistry::new);

pub struct FileLockRegistry {
    inner: DashMap<PathBuf, Arc<Mutex<()>>>,
}

impl FileLockRegistry {
    fn new() -> Self {
        Self {
            inner: DashMap::new(),
        }
    }

    /// Returns the mutex for `path`, creating it on first access.
    #[must_use]
    pub fn mutex_for(&self, path: &std::path::Path) -> Arc<Mutex<()>> {
        if let Some(existing) = self.inner.get(path) {
            return Arc::clone(existing.value());
        }
        let created = Arc::new(Mutex::new(()));
        Arc::clone(
            self.inner
                .entry(path.to_path_buf())
                .or_insert(created)
                .value(),
        )
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl Default for FileLockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::FileLockRegistry;
    use std::path::Path;

    #[test]
    fn same_path_yields_same_mutex() {
        let registry = FileLockRegistry::new();
        let a = registry.mutex_for(Path::new("/tmp/a.json"));
        let b = registry.mutex_for(Path::new("/tmp/a.json"));
        assert!(std::sync::Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn distinct_paths_yield_distinct_mutexes() {
        let registry = FileLockRegistry::new();
        let a = registry.mutex_for(Path::new("/tmp/a.json"));
        let b = registry.mutex_for(Path::new("/tmp/b.json"));
        assert!(!std::sync::Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len(), 2);
    }
}
