//! Registration storage for the reference host
//!
//! Uses DashMap for lock-free concurrent access. One store per scope;
//! child stores hold a parent reference for hierarchical resolution.

use crate::locator::{AnyArc, ChainProvider};
use crate::provider::{Lifetime, ServiceKey};
use ahash::RandomState;
use dashmap::DashMap;
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// One registered chain: the construction closure, its declared lifetime and
/// the cell a singleton instance is cached in.
///
/// Cheap to clone so resolution can take a snapshot out of the map and drop
/// the map guard before the provider runs — providers re-enter the store to
/// resolve their own dependencies.
#[derive(Clone)]
pub(crate) struct HostEntry {
    pub provider: ChainProvider,
    pub lifetime: Lifetime,
    pub singleton: Arc<OnceCell<AnyArc>>,
}

impl HostEntry {
    pub fn new(provider: ChainProvider, lifetime: Lifetime) -> Self {
        Self {
            provider,
            lifetime,
            singleton: Arc::new(OnceCell::new()),
        }
    }
}

/// Thread-safe registration store for one scope.
///
/// Uses `DashMap` with `ahash` for concurrent performance. The `scoped` map
/// caches instances of `Lifetime::Scoped` registrations resolved through
/// this scope.
pub(crate) struct RegistrationStore {
    entries: DashMap<ServiceKey, HostEntry, RandomState>,
    scoped: DashMap<ServiceKey, AnyArc, RandomState>,
    parent: Option<Arc<RegistrationStore>>,
}

impl RegistrationStore {
    /// Create new empty storage.
    ///
    /// Uses 8 shards as a balance between creation overhead and concurrent
    /// read performance; the DashMap default of num_cpus * 4 is oversized
    /// for typical registration counts.
    pub fn new() -> Self {
        Self {
            entries: DashMap::with_capacity_and_hasher_and_shard_amount(0, RandomState::new(), 8),
            scoped: DashMap::with_capacity_and_hasher_and_shard_amount(0, RandomState::new(), 8),
            parent: None,
        }
    }

    /// Create a child store with a parent reference for hierarchical resolution
    pub fn with_parent(parent: Arc<RegistrationStore>) -> Self {
        Self {
            entries: DashMap::with_capacity_and_hasher_and_shard_amount(0, RandomState::new(), 8),
            scoped: DashMap::with_capacity_and_hasher_and_shard_amount(0, RandomState::new(), 8),
            parent: Some(parent),
        }
    }

    /// Insert an entry, replacing any prior entry under the same key
    #[inline]
    pub fn insert(&self, key: ServiceKey, entry: HostEntry) {
        self.entries.insert(key, entry);
    }

    /// Remove an entry by exact key match
    #[inline]
    pub fn remove(&self, key: &ServiceKey) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Nearest-scope entry for the key, cloned out so the caller holds no
    /// map guard while the provider runs
    pub fn lookup(&self, key: &ServiceKey) -> Option<HostEntry> {
        if let Some(entry) = self.entries.get(key) {
            return Some(entry.clone());
        }

        let mut current = self.parent.as_ref();
        while let Some(store) = current {
            if let Some(entry) = store.entries.get(key) {
                return Some(entry.clone());
            }
            current = store.parent.as_ref();
        }

        None
    }

    /// Check if a key is registered in this store or any ancestor
    pub fn contains_in_chain(&self, key: &ServiceKey) -> bool {
        if self.entries.contains_key(key) {
            return true;
        }

        let mut current = self.parent.as_ref();
        while let Some(store) = current {
            if store.entries.contains_key(key) {
                return true;
            }
            current = store.parent.as_ref();
        }

        false
    }

    /// Instance cached in this scope for a `Scoped` registration
    #[inline]
    pub fn scoped_instance(&self, key: &ServiceKey) -> Option<AnyArc> {
        self.scoped.get(key).map(|entry| entry.value().clone())
    }

    /// Cache a scoped instance, keeping the first one if another thread won
    /// the race
    #[inline]
    pub fn cache_scoped(&self, key: ServiceKey, instance: AnyArc) -> AnyArc {
        self.scoped.entry(key).or_insert(instance).value().clone()
    }

    /// Number of registrations in this scope (not including parents)
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if this scope has no registrations
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for RegistrationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationStore")
            .field("count", &self.len())
            .field("has_parent", &self.parent.is_some())
            .finish()
    }
}
