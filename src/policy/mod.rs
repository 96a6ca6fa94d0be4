//! Eviction Policies
//!
//! Every policy implements [`EvictionPolicy`] and keeps only its own ordering
//! state: an intrusive [`ObjQueue`] over the shared [`ObjectStore`] and, for
//! the SIEVE family, a persistent scan [`Hand`](hand::Hand). Record allocation,
//! the id index and the occupancy totals belong to the store, which each
//! operation receives explicitly.
//!
//! | Policy | Type | Victim |
//! |--------|------|--------|
//! | FIFO | [`Fifo`] | oldest object |
//! | SIEVE | [`Sieve`] | first unvisited object from the hand |
//! | SIEVE-size | [`SieveSize`] | largest object in a window starting at the first unvisited one |
//!
//! [`Policy`] is the closed set of variants selected at construction time from
//! a [`PolicyConfig`].

extern crate alloc;

pub mod fifo;
pub mod hand;
pub mod sieve;
pub mod sieve_size;

pub use fifo::Fifo;
pub use sieve::Sieve;
pub use sieve_size::SieveSize;

use crate::config::PolicyConfig;
use crate::error::VerifyError;
use crate::object::{CacheObject, ObjHandle, ObjId};
use crate::queue::ObjQueue;
use crate::request::Request;
use crate::store::ObjectStore;
use alloc::collections::BTreeMap;
use alloc::string::String;

/// The operations every eviction policy provides to the request pipeline.
///
/// Policies never allocate records. `insert` asks the store for a fresh
/// record and links it; `evict` and `remove` unlink a record and hand it back
/// through the store's `on_evict`/`on_remove` hooks.
pub trait EvictionPolicy {
    /// Short display name, e.g. `"Sieve_size"`.
    fn algorithm_name(&self) -> &'static str;

    /// Looks `id` up. When `promote` is true a hit counts as an access.
    /// The queue order never changes.
    fn find(&mut self, store: &mut ObjectStore, id: ObjId, promote: bool) -> Option<ObjHandle>;

    /// Inserts a new object at the queue head.
    ///
    /// The caller must have freed enough capacity and must not insert an id
    /// that is already resident; no capacity check happens here.
    fn insert(&mut self, store: &mut ObjectStore, req: &Request) -> ObjHandle;

    /// Returns the object `evict` would remove, without changing any state.
    /// `None` when the cache is empty.
    fn to_evict(&self, store: &ObjectStore) -> Option<ObjHandle>;

    /// Evicts one object and returns its record. `None` when the cache is empty.
    fn evict(&mut self, store: &mut ObjectStore) -> Option<CacheObject>;

    /// Deletes `id` out of band. Returns `false` if it is not resident.
    fn remove(&mut self, store: &mut ObjectStore, id: ObjId) -> bool;

    /// Checks that the queue and the store agree.
    fn verify(&self, store: &ObjectStore) -> Result<(), VerifyError>;

    /// Number of queued objects.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forgets the queue and scan state. The store must be cleared alongside.
    fn clear(&mut self);

    /// Policy-specific counters. Empty by default.
    fn metrics(&self) -> BTreeMap<String, f64> {
        BTreeMap::new()
    }
}

/// A policy selected at construction time.
#[derive(Debug)]
pub enum Policy {
    Fifo(Fifo),
    Sieve(Sieve),
    SieveSize(SieveSize),
}

impl Policy {
    /// Builds the policy described by `config`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sieve_size::config::PolicyConfig;
    /// use sieve_size::policy::{EvictionPolicy, Policy};
    ///
    /// let config: PolicyConfig = "sieve-size".parse().unwrap();
    /// let policy = Policy::from_config(&config);
    /// assert_eq!(policy.algorithm_name(), "Sieve_size");
    /// ```
    pub fn from_config(config: &PolicyConfig) -> Self {
        match config {
            PolicyConfig::Fifo => Policy::Fifo(Fifo::new()),
            PolicyConfig::Sieve => Policy::Sieve(Sieve::new()),
            PolicyConfig::SieveSize(config) => Policy::SieveSize(SieveSize::init(*config)),
        }
    }

    fn inner(&self) -> &dyn EvictionPolicy {
        match self {
            Policy::Fifo(p) => p,
            Policy::Sieve(p) => p,
            Policy::SieveSize(p) => p,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn EvictionPolicy {
        match self {
            Policy::Fifo(p) => p,
            Policy::Sieve(p) => p,
            Policy::SieveSize(p) => p,
        }
    }
}

impl EvictionPolicy for Policy {
    fn algorithm_name(&self) -> &'static str {
        self.inner().algorithm_name()
    }

    fn find(&mut self, store: &mut ObjectStore, id: ObjId, promote: bool) -> Option<ObjHandle> {
        self.inner_mut().find(store, id, promote)
    }

    fn insert(&mut self, store: &mut ObjectStore, req: &Request) -> ObjHandle {
        self.inner_mut().insert(store, req)
    }

    fn to_evict(&self, store: &ObjectStore) -> Option<ObjHandle> {
        self.inner().to_evict(store)
    }

    fn evict(&mut self, store: &mut ObjectStore) -> Option<CacheObject> {
        self.inner_mut().evict(store)
    }

    fn remove(&mut self, store: &mut ObjectStore, id: ObjId) -> bool {
        self.inner_mut().remove(store, id)
    }

    fn verify(&self, store: &ObjectStore) -> Result<(), VerifyError> {
        self.inner().verify(store)
    }

    fn len(&self) -> usize {
        self.inner().len()
    }

    fn clear(&mut self) {
        self.inner_mut().clear()
    }

    fn metrics(&self) -> BTreeMap<String, f64> {
        self.inner().metrics()
    }
}

/// Shared consistency walk.
///
/// Walks `queue` head to tail and checks that every record is indexed under
/// its own handle, that each `prev` link mirrors the walk, and that the
/// object count and byte total match the store. If `hand` is set it must be
/// one of the walked records.
pub(crate) fn verify_queue(
    queue: &ObjQueue,
    store: &ObjectStore,
    hand: Option<ObjHandle>,
) -> Result<(), VerifyError> {
    let tracked = store.n_obj();
    let mut walked: u64 = 0;
    let mut bytes: u64 = 0;
    let mut hand_seen = hand.is_none();
    let mut last: Option<ObjHandle> = None;
    let mut cursor = queue.head();

    while let Some(handle) = cursor {
        let obj = store.get(handle).ok_or(VerifyError::DanglingHand)?;
        if store.find_by_id(obj.id) != Some(handle) {
            return Err(VerifyError::NotIndexed { id: obj.id });
        }
        if obj.prev() != last {
            return Err(VerifyError::BrokenLink { id: obj.id });
        }
        walked += 1;
        // A cycle would never end; more records than the store holds means one.
        if walked > tracked {
            return Err(VerifyError::ObjectCountMismatch { walked, tracked });
        }
        bytes += obj.size;
        hand_seen |= hand == Some(handle);
        last = Some(handle);
        cursor = obj.next();
    }

    if queue.tail() != last {
        let id = last.and_then(|h| store.get(h)).map_or(0, |obj| obj.id);
        return Err(VerifyError::BrokenLink { id });
    }
    if walked != tracked || walked != queue.len() as u64 {
        return Err(VerifyError::ObjectCountMismatch { walked, tracked });
    }
    if bytes != store.occupied_bytes() {
        return Err(VerifyError::ByteCountMismatch {
            walked: bytes,
            tracked: store.occupied_bytes(),
        });
    }
    if !hand_seen {
        return Err(VerifyError::DanglingHand);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SieveSizeConfig;

    fn fill(policy: &mut Policy, store: &mut ObjectStore, n: u64) {
        for id in 0..n {
            policy.insert(store, &Request::new(id, id + 1));
        }
    }

    #[test]
    fn test_from_config_selects_variant() {
        let fifo = Policy::from_config(&PolicyConfig::Fifo);
        let sieve = Policy::from_config(&PolicyConfig::Sieve);
        let sieve_size = Policy::from_config(&PolicyConfig::SieveSize(SieveSizeConfig::default()));
        assert_eq!(fifo.algorithm_name(), "FIFO");
        assert_eq!(sieve.algorithm_name(), "SIEVE");
        assert_eq!(sieve_size.algorithm_name(), "Sieve_size");
    }

    #[test]
    fn test_dispatch_keeps_store_consistent() {
        for config in [
            PolicyConfig::Fifo,
            PolicyConfig::Sieve,
            PolicyConfig::SieveSize(SieveSizeConfig::default()),
        ] {
            let mut store = ObjectStore::new();
            let mut policy = Policy::from_config(&config);
            fill(&mut policy, &mut store, 8);
            policy.find(&mut store, 3, true);
            assert!(policy.evict(&mut store).is_some());
            assert!(policy.remove(&mut store, 5));
            assert!(!policy.remove(&mut store, 5));
            assert_eq!(policy.len(), 6);
            assert_eq!(policy.verify(&store), Ok(()));
        }
    }

    #[test]
    fn test_verify_detects_unaccounted_store_record() {
        let mut store = ObjectStore::new();
        let mut policy = Policy::from_config(&PolicyConfig::Fifo);
        fill(&mut policy, &mut store, 3);
        // Allocated behind the policy's back, so never queued.
        store.on_insert(&Request::new(99, 1));
        assert_eq!(
            policy.verify(&store),
            Err(VerifyError::ObjectCountMismatch {
                walked: 3,
                tracked: 4
            })
        );
    }

    #[test]
    fn test_verify_detects_dangling_hand() {
        let mut store = ObjectStore::new();
        let mut queue = ObjQueue::new();
        let a = store.on_insert(&Request::new(1, 1));
        queue.prepend(&mut store, a);
        let b = store.on_insert(&Request::new(2, 1));
        assert_eq!(
            verify_queue(&queue, &store, Some(b)),
            Err(VerifyError::ObjectCountMismatch {
                walked: 1,
                tracked: 2
            })
        );
        store.on_remove(b);
        assert_eq!(
            verify_queue(&queue, &store, Some(b)),
            Err(VerifyError::DanglingHand)
        );
        assert_eq!(verify_queue(&queue, &store, Some(a)), Ok(()));
    }
}
