use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, info};

use crate::error::LoadError;
use crate::loader::{self, DatasetBundle, SourcePaths};

// ---------------------------------------------------------------------------
// DatasetCache
// ---------------------------------------------------------------------------

/// Memoized bundles keyed by the path set that produced them.
///
/// Entries live until `invalidate`/`clear` or process exit; file modification
/// times are not watched. A cold key is loaded without holding any lock, so two
/// concurrent cold callers each load and the later one overwrites the entry.
/// Both results come from the same immutable files, so either is correct.
/// Failed loads are never stored.
pub struct DatasetCache {
    entries: DashMap<SourcePaths, Arc<DatasetBundle>>,
    loads: AtomicU64,
}

impl DatasetCache {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn get_or_load(&self, sources: &SourcePaths) -> Result<Arc<DatasetBundle>, LoadError> {
        self.get_or_load_with(sources, loader::load)
    }

    /// As `get_or_load`, with the loading function supplied by the caller.
    pub fn get_or_load_with<F>(&self, sources: &SourcePaths, load: F) -> Result<Arc<DatasetBundle>, LoadError>
    where
        F: FnOnce(&SourcePaths) -> Result<DatasetBundle, LoadError>,
    {
        if let Some(hit) = self.entries.get(sources) {
            debug!("Dataset cache hit");
            return Ok(Arc::clone(hit.value()));
        }

        debug!("Dataset cache miss, loading");
        self.loads.fetch_add(1, Ordering::Relaxed);
        let bundle = Arc::new(load(sources)?);
        self.entries.insert(sources.clone(), Arc::clone(&bundle));
        Ok(bundle)
    }

    /// Drop the bundle for one path set. Returns true if an entry was present.
    pub fn invalidate(&self, sources: &SourcePaths) -> bool {
        let removed = self.entries.remove(sources).is_some();
        info!(removed, "Dataset cache invalidated for path set");
        removed
    }

    pub fn clear(&self) {
        let n = self.entries.len();
        self.entries.clear();
        info!(entries = n, "Dataset cache cleared");
    }

    pub fn contains(&self, sources: &SourcePaths) -> bool {
        self.entries.contains_key(sources)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of load attempts performed (hits excluded).
    pub fn load_count(&self) -> u64 {
        self.loads.load(Ordering::Relaxed)
    }
}

impl Default for DatasetCache {
    fn default() -> Self {
        Self {
            entries: DashMap::new(),
            loads: AtomicU64::new(0),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
