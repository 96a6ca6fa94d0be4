//! Request Pipeline
//!
//! [`Cache`] ties an [`ObjectStore`] to an eviction [`Policy`] and keeps the
//! core hit/miss statistics. Every request goes through [`Cache::get`]:
//!
//! ```text
//! get(req)
//!   ├─ find(id, promote) ── hit ──▶ record hit, return true
//!   └─ miss: record miss
//!        ├─ size > cache_size ──▶ not admitted, return false
//!        ├─ while occupied + size > cache_size: evict
//!        └─ insert, return false
//! ```
//!
//! The lower-level operations (`find`, `insert`, `to_evict`, `evict`,
//! `remove`) are exposed as well, for callers that drive the policy directly.
//! `insert` through this path does not free capacity first.
//!
//! # Examples
//!
//! ```
//! use sieve_size::config::CacheConfig;
//! use sieve_size::{Cache, Request};
//! use core::num::NonZeroU64;
//!
//! let mut cache = Cache::init(CacheConfig::new(NonZeroU64::new(100).unwrap()));
//!
//! assert!(!cache.get(&Request::new(1, 60)));  // miss, inserted
//! assert!(cache.get(&Request::new(1, 60)));   // hit
//! assert!(!cache.get(&Request::new(2, 60)));  // miss, object 1 evicted to make room
//! assert_eq!(cache.n_obj(), 1);
//! assert!(cache.verify().is_ok());
//! ```

extern crate alloc;

use crate::config::CacheConfig;
use crate::error::VerifyError;
use crate::metrics::{CacheMetrics, CoreCacheMetrics};
use crate::object::{CacheObject, ObjHandle, ObjId};
use crate::policy::{EvictionPolicy, Policy};
use crate::request::Request;
use crate::store::ObjectStore;
use alloc::collections::BTreeMap;
use alloc::string::String;

/// A byte-bounded cache driven by one eviction policy.
#[derive(Debug)]
pub struct Cache {
    config: CacheConfig,
    store: ObjectStore,
    policy: Policy,
    metrics: CoreCacheMetrics,
}

impl Cache {
    /// Creates an empty cache.
    pub fn init(config: CacheConfig) -> Self {
        log::debug!(
            "init cache: {} bytes, policy {}",
            config.cache_size,
            config.policy
        );
        Self {
            config,
            store: ObjectStore::new(),
            policy: Policy::from_config(&config.policy),
            metrics: CoreCacheMetrics::new(config.cache_size.get()),
        }
    }

    /// Serves one request. Returns `true` on a hit.
    ///
    /// On a miss the object is admitted if it fits in the cache at all,
    /// evicting as many objects as needed first.
    pub fn get(&mut self, req: &Request) -> bool {
        if self.policy.find(&mut self.store, req.id, true).is_some() {
            self.metrics.record_hit(req.size);
            return true;
        }
        self.metrics.record_miss(req.size);

        if !self.can_insert(req) {
            log::trace!(
                "object {} ({} bytes) exceeds cache size {}",
                req.id,
                req.size,
                self.cache_size()
            );
            return false;
        }

        while self.store.occupied_bytes() + req.size > self.cache_size() {
            if self.evict().is_none() {
                break;
            }
        }
        self.insert(req);
        false
    }

    /// Looks `id` up, counting it as an access when `promote` is true.
    /// Does not touch the hit/miss statistics.
    pub fn find(&mut self, id: ObjId, promote: bool) -> Option<&CacheObject> {
        let handle = self.policy.find(&mut self.store, id, promote)?;
        self.store.get(handle)
    }

    /// Inserts `req` without freeing capacity first.
    pub fn insert(&mut self, req: &Request) -> ObjHandle {
        let handle = self.policy.insert(&mut self.store, req);
        self.metrics.record_insertion(req.size);
        handle
    }

    /// The object the next eviction would remove.
    pub fn to_evict(&self) -> Option<&CacheObject> {
        let handle = self.policy.to_evict(&self.store)?;
        self.store.get(handle)
    }

    /// Evicts one object.
    pub fn evict(&mut self) -> Option<CacheObject> {
        let evicted = self.policy.evict(&mut self.store)?;
        self.metrics.record_eviction(evicted.size);
        Some(evicted)
    }

    /// Deletes `id` out of band. Returns `false` if it was not cached.
    pub fn remove(&mut self, id: ObjId) -> bool {
        let Some(size) = self.store.find_by_id(id).map(|h| self.store[h].size) else {
            return false;
        };
        let removed = self.policy.remove(&mut self.store, id);
        if removed {
            self.metrics.record_removal(size);
        }
        removed
    }

    /// Checks that the policy's queue and the store agree.
    pub fn verify(&self) -> Result<(), VerifyError> {
        self.policy.verify(&self.store)
    }

    /// Whether an object of this size could ever be admitted.
    #[inline]
    pub fn can_insert(&self, req: &Request) -> bool {
        req.size <= self.cache_size()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.policy.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.policy.is_empty()
    }

    #[inline]
    pub fn n_obj(&self) -> u64 {
        self.store.n_obj()
    }

    #[inline]
    pub fn occupied_bytes(&self) -> u64 {
        self.store.occupied_bytes()
    }

    #[inline]
    pub fn cache_size(&self) -> u64 {
        self.config.cache_size.get()
    }

    #[inline]
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    #[inline]
    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    #[inline]
    pub fn store(&self) -> &ObjectStore {
        &self.store
    }

    /// Hit/miss statistics of the request pipeline.
    #[inline]
    pub fn core_metrics(&self) -> &CoreCacheMetrics {
        &self.metrics
    }

    /// Drops every object. Statistics other than the current size are kept.
    pub fn clear(&mut self) {
        self.policy.clear();
        self.store.clear();
        self.metrics.cache_size_bytes = 0;
    }
}

impl CacheMetrics for Cache {
    fn metrics(&self) -> BTreeMap<String, f64> {
        let mut metrics = self.metrics.to_btreemap();
        metrics.extend(self.policy.metrics());
        metrics
    }

    fn algorithm_name(&self) -> &'static str {
        self.policy.algorithm_name()
    }
}
