//! Size-aware SIEVE Eviction Policy
//!
//! SIEVE keeps objects in insertion order and marks them as visited on access
//! instead of moving them. A single hand sweeps from the oldest object toward
//! the newest, clearing visited marks, and evicts the first object it finds
//! unvisited. SIEVE-size keeps that sweep but does not evict the object the
//! hand stops on. It looks at a window of `W` objects starting there and
//! evicts the largest one, trading a bounded `O(W)` scan per eviction for a
//! better byte hit ratio.
//!
//! # Eviction
//!
//! ```text
//!             hand                         (prev direction: toward head)
//!              │
//!   tail ──▶ [A:1] ─▶ [B:1] ─▶ [C:0] ─▶ [D:0] ─▶ [E:0] ─▶ head
//!              aging ──────────▶ stop
//!                                 └────── window (W = 3) ──────┘
//!                                 victim = largest of C, D, E
//! ```
//!
//! 1. **Aging.** From the hand (or the tail), decrement visited counters and
//!    advance toward the head, wrapping to the tail, until an object with
//!    `visited == 0` is reached. That object is `stop`.
//! 2. **Window.** Walk `W` objects from `stop` with the same wrapping and pick
//!    the strictly largest (first seen wins ties). Visited counters are not
//!    consulted here, so a visited object can be evicted if it is the largest
//!    in the window.
//! 3. **Hand.** If the victim is `stop` the hand moves past it; otherwise the
//!    hand stays on `stop` so the next eviction resumes from the same point.
//! 4. **Release.** The victim is unlinked and handed back to the store.
//!
//! [`to_evict`](EvictionPolicy::to_evict) answers the same question without
//! aging: it searches for the first object at or below an escalating visited
//! threshold (see [`hand`](super::hand)) and applies the same window.
//!
//! # Examples
//!
//! ```
//! use sieve_size::config::SieveSizeConfig;
//! use sieve_size::policy::{EvictionPolicy, SieveSize};
//! use sieve_size::store::ObjectStore;
//! use sieve_size::Request;
//! use core::num::NonZeroUsize;
//!
//! let config = SieveSizeConfig::new(NonZeroUsize::new(2).unwrap());
//! let mut store = ObjectStore::new();
//! let mut policy = SieveSize::init(config);
//!
//! policy.insert(&mut store, &Request::new(1, 10));
//! policy.insert(&mut store, &Request::new(2, 50));
//! policy.insert(&mut store, &Request::new(3, 10));
//!
//! // The two oldest objects form the window; the larger one goes.
//! let evicted = policy.evict(&mut store).unwrap();
//! assert_eq!(evicted.id, 2);
//! assert!(policy.verify(&store).is_ok());
//! ```

extern crate alloc;

use super::hand::Hand;
use super::{verify_queue, EvictionPolicy};
use crate::config::SieveSizeConfig;
use crate::error::VerifyError;
use crate::metrics::SieveSizeMetrics;
use crate::object::{CacheObject, ObjHandle, ObjId};
use crate::queue::ObjQueue;
use crate::request::Request;
use crate::store::ObjectStore;
use alloc::collections::BTreeMap;
use alloc::string::String;
use core::num::NonZeroUsize;

/// Size-aware SIEVE policy state: the insertion-ordered queue, the hand and
/// the window size.
#[derive(Debug)]
pub struct SieveSize {
    config: SieveSizeConfig,
    queue: ObjQueue,
    hand: Hand,
    metrics: SieveSizeMetrics,
}

impl SieveSize {
    /// Creates an empty policy from its configuration.
    pub fn init(config: SieveSizeConfig) -> Self {
        log::debug!("init Sieve_size with {config}");
        Self {
            config,
            queue: ObjQueue::new(),
            hand: Hand::new(),
            metrics: SieveSizeMetrics::new(),
        }
    }

    #[inline]
    pub fn eviction_window_size(&self) -> NonZeroUsize {
        self.config.eviction_window_size
    }

    /// Current scan position, `None` when the next scan starts at the tail.
    #[inline]
    pub fn hand(&self) -> Option<ObjHandle> {
        self.hand.get()
    }

    /// The policy's queue, for inspection.
    #[inline]
    pub fn queue(&self) -> &ObjQueue {
        &self.queue
    }

    pub fn sieve_size_metrics(&self) -> &SieveSizeMetrics {
        &self.metrics
    }

    /// Picks the largest object among `W` objects starting at `first`,
    /// walking toward the head and wrapping to the tail. Returns the pick and
    /// the number of objects inspected.
    fn largest_in_window(&self, store: &ObjectStore, first: ObjHandle) -> (ObjHandle, u64) {
        let mut victim = first;
        let mut victim_size = store[first].size;
        let mut cursor = Some(first);
        let mut scanned = 0;

        for _ in 0..self.config.eviction_window_size.get() {
            let Some(handle) = cursor.or(self.queue.tail()) else {
                break;
            };
            let obj = &store[handle];
            if obj.size > victim_size {
                victim = handle;
                victim_size = obj.size;
            }
            scanned += 1;
            cursor = obj.prev();
        }
        (victim, scanned)
    }

    /// Ages visited counters from the hand until an unvisited object is found.
    /// Returns that object with the number of decrements and head wraps taken.
    fn age_until_unvisited(&self, store: &mut ObjectStore) -> Option<(ObjHandle, u64, u64)> {
        let mut cursor = self.hand.start(&self.queue)?;
        let mut steps = 0;
        let mut wraps = 0;

        while store[cursor].visited > 0 {
            store[cursor].visited -= 1;
            steps += 1;
            if store[cursor].prev().is_none() {
                wraps += 1;
            }
            cursor = self.queue.prev_wrapping(store, cursor)?;
        }
        Some((cursor, steps, wraps))
    }
}

impl Default for SieveSize {
    fn default() -> Self {
        Self::init(SieveSizeConfig::default())
    }
}

impl EvictionPolicy for SieveSize {
    fn algorithm_name(&self) -> &'static str {
        "Sieve_size"
    }

    fn find(&mut self, store: &mut ObjectStore, id: ObjId, promote: bool) -> Option<ObjHandle> {
        let handle = store.find_by_id(id)?;
        if promote {
            store[handle].visited = 1;
        }
        Some(handle)
    }

    fn insert(&mut self, store: &mut ObjectStore, req: &Request) -> ObjHandle {
        let handle = store.on_insert(req);
        self.queue.prepend(store, handle);
        store[handle].visited = 0;
        handle
    }

    fn to_evict(&self, store: &ObjectStore) -> Option<ObjHandle> {
        let (candidate, _threshold) = self.hand.find_candidate_escalating(&self.queue, store)?;
        Some(self.largest_in_window(store, candidate).0)
    }

    fn evict(&mut self, store: &mut ObjectStore) -> Option<CacheObject> {
        let (stop, steps, wraps) = self.age_until_unvisited(store)?;
        let (victim, scanned) = self.largest_in_window(store, stop);

        if victim == stop {
            self.hand.set(store[stop].prev());
        } else {
            self.hand.set(Some(stop));
        }

        self.queue.unlink(store, victim);
        let evicted = store.on_evict(victim)?;
        self.metrics
            .record_eviction(steps, scanned, wraps, victim != stop);
        log::trace!(
            "Sieve_size evicted object {} ({} bytes) after aging {} objects",
            evicted.id,
            evicted.size,
            steps
        );
        Some(evicted)
    }

    fn remove(&mut self, store: &mut ObjectStore, id: ObjId) -> bool {
        let Some(handle) = store.find_by_id(id) else {
            return false;
        };
        self.hand.step_off(store, handle);
        self.queue.unlink(store, handle);
        store.on_remove(handle);
        self.metrics.record_removal();
        true
    }

    fn verify(&self, store: &ObjectStore) -> Result<(), VerifyError> {
        verify_queue(&self.queue, store, self.hand.get())
    }

    fn len(&self) -> usize {
        self.queue.len()
    }

    fn clear(&mut self) {
        self.queue.clear();
        self.hand.reset();
    }

    fn metrics(&self) -> BTreeMap<String, f64> {
        self.metrics.to_btreemap()
    }
}
