//! Memoizing cache of specialized include invokers.
//!
//! Resolving and specializing an include translation costs a registry scan
//! and an allocation. The [`TranslationCache`] does that work once per
//! [`CacheKey`] and hands out the same [`Invoker`] afterwards.
//!
//! Entries are never evicted: the key space is bounded by the navigation
//! shapes the application declares.
//!
//! # Concurrency
//!
//! - A hit takes the map's read lock only.
//! - A miss inserts an empty slot under a short write lock, then builds the
//!   invoker under the slot's own mutex. Different keys never wait on each
//!   other; callers racing on one new key wait for a single construction.
//! - A failed construction stores nothing, so a later call may try again.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};

use crate::entity::TypeInfo;
use crate::error::QueryResult;
use crate::translation::Invoker;

/// Key identifying one cached invoker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Entity the navigation starts from.
    pub entity: TypeInfo,
    /// Entity the navigation leads to.
    pub property: TypeInfo,
    /// Property type of the preceding step, when keyed per chain position.
    pub previous: Option<TypeInfo>,
}

impl CacheKey {
    /// Key for a navigation shape.
    pub fn new(entity: TypeInfo, property: TypeInfo) -> Self {
        Self {
            entity,
            property,
            previous: None,
        }
    }

    /// Set the preceding step's property type.
    pub fn with_previous(mut self, previous: TypeInfo) -> Self {
        self.previous = Some(previous);
        self
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.previous {
            Some(previous) => write!(f, "{} -> {} (after {})", self.entity, self.property, previous),
            None => write!(f, "{} -> {}", self.entity, self.property),
        }
    }
}

/// Statistics about cache usage.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from a stored invoker.
    pub hits: u64,
    /// Lookups that found no stored invoker.
    pub misses: u64,
    /// Invokers successfully constructed.
    pub constructions: u64,
}

impl CacheStats {
    /// Calculate the hit rate.
    #[inline]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

struct Slot<Q> {
    value: OnceLock<Invoker<Q>>,
    building: Mutex<()>,
}

impl<Q> Slot<Q> {
    fn empty() -> Self {
        Self {
            value: OnceLock::new(),
            building: Mutex::new(()),
        }
    }
}

/// Thread-safe, unbounded cache of include invokers.
pub struct TranslationCache<Q> {
    slots: RwLock<HashMap<CacheKey, Arc<Slot<Q>>>>,
    hits: AtomicU64,
    misses: AtomicU64,
    constructions: AtomicU64,
}

impl<Q> TranslationCache<Q> {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            constructions: AtomicU64::new(0),
        }
    }

    /// Get the invoker for `key`, building it with `factory` if absent.
    ///
    /// `factory` runs at most once per key while it succeeds. Callers that
    /// lose the race wait for the winner and receive the same invoker.
    pub fn get_or_create<F>(&self, key: CacheKey, factory: F) -> QueryResult<Invoker<Q>>
    where
        F: FnOnce() -> QueryResult<Invoker<Q>>,
    {
        let slot = {
            let slots = self.slots.read();
            slots.get(&key).cloned()
        };
        if let Some(invoker) = slot.as_ref().and_then(|slot| slot.value.get()) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(Arc::clone(invoker));
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let slot = match slot {
            Some(slot) => slot,
            None => Arc::clone(self.slots.write().entry(key).or_insert_with(|| Arc::new(Slot::empty()))),
        };

        let _building = slot.building.lock();
        if let Some(invoker) = slot.value.get() {
            debug!(%key, "include invoker built by a concurrent caller");
            return Ok(Arc::clone(invoker));
        }

        let invoker = factory()?;
        let invoker = Arc::clone(slot.value.get_or_init(|| invoker));
        self.constructions.fetch_add(1, Ordering::Relaxed);
        info!(%key, "include invoker cached");
        Ok(invoker)
    }

    /// Whether an invoker is stored for `key`.
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.slots
            .read()
            .get(key)
            .is_some_and(|slot| slot.value.get().is_some())
    }

    /// Number of stored invokers.
    pub fn len(&self) -> usize {
        self.slots
            .read()
            .values()
            .filter(|slot| slot.value.get().is_some())
            .count()
    }

    /// Whether no invoker is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the usage counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            constructions: self.constructions.load(Ordering::Relaxed),
        }
    }
}

impl<Q> Default for TranslationCache<Q> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Q> fmt::Debug for TranslationCache<Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslationCache")
            .field("len", &self.len())
            .field("stats", &self.stats())
            .finish()
    }
}
