//! SIEVE eviction.
//!
//! Classic SIEVE: objects stay in insertion order, an access only sets the
//! visited mark, and a persistent hand sweeps from the tail toward the head
//! clearing marks until it finds an unvisited object to evict. The hand then
//! rests on the victim's head-side neighbour.

use super::hand::Hand;
use super::{verify_queue, EvictionPolicy};
use crate::error::VerifyError;
use crate::object::{CacheObject, ObjHandle, ObjId};
use crate::queue::ObjQueue;
use crate::request::Request;
use crate::store::ObjectStore;

/// SIEVE policy state.
#[derive(Debug, Default)]
pub struct Sieve {
    queue: ObjQueue,
    hand: Hand,
}

impl Sieve {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn hand(&self) -> Option<ObjHandle> {
        self.hand.get()
    }
}

impl EvictionPolicy for Sieve {
    fn algorithm_name(&self) -> &'static str {
        "SIEVE"
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
        self.hand
            .find_candidate_escalating(&self.queue, store)
            .map(|(handle, _)| handle)
    }

    fn evict(&mut self, store: &mut ObjectStore) -> Option<CacheObject> {
        let mut cursor = self.hand.start(&self.queue)?;
        while store[cursor].visited > 0 {
            store[cursor].visited = 0;
            cursor = self.queue.prev_wrapping(store, cursor)?;
        }

        self.hand.set(store[cursor].prev());
        self.queue.unlink(store, cursor);
        let evicted = store.on_evict(cursor)?;
        log::trace!("SIEVE evicted object {}", evicted.id);
        Some(evicted)
    }

    fn remove(&mut self, store: &mut ObjectStore, id: ObjId) -> bool {
        let Some(handle) = store.find_by_id(id) else {
            return false;
        };
        self.hand.step_off(store, handle);
        self.queue.unlink(store, handle);
        store.on_remove(handle);
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
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_sieve(store: &mut ObjectStore, n: u64) -> Sieve {
        let mut sieve = Sieve::new();
        for id in 1..=n {
            sieve.insert(store, &Request::new(id, 1));
        }
        sieve
    }

    #[test]
    fn test_sieve_skips_visited() {
        let mut store = ObjectStore::new();
        let mut sieve = make_sieve(&mut store, 3);
        sieve.find(&mut store, 1, true);

        assert_eq!(sieve.to_evict(&store), store.find_by_id(2));
        assert_eq!(sieve.evict(&mut store).map(|obj| obj.id), Some(2));
        assert_eq!(store[store.find_by_id(1).unwrap()].visited, 0);
        assert_eq!(sieve.hand(), store.find_by_id(3));
    }

    #[test]
    fn test_sieve_hand_persists_across_evictions() {
        let mut store = ObjectStore::new();
        let mut sieve = make_sieve(&mut store, 4);
        sieve.find(&mut store, 1, true);
        sieve.find(&mut store, 3, true);

        assert_eq!(sieve.evict(&mut store).map(|obj| obj.id), Some(2));
        // The hand resumes at 3, so the re-marked object 1 is not reached.
        sieve.find(&mut store, 1, true);
        assert_eq!(sieve.evict(&mut store).map(|obj| obj.id), Some(4));
        assert_eq!(sieve.verify(&store), Ok(()));
    }

    #[test]
    fn test_sieve_all_visited_wraps() {
        let mut store = ObjectStore::new();
        let mut sieve = make_sieve(&mut store, 3);
        for id in 1..=3 {
            sieve.find(&mut store, id, true);
        }
        assert_eq!(sieve.evict(&mut store).map(|obj| obj.id), Some(1));
        assert_eq!(sieve.len(), 2);
        assert_eq!(sieve.verify(&store), Ok(()));
    }

    #[test]
    fn test_sieve_remove_hand() {
        let mut store = ObjectStore::new();
        let mut sieve = make_sieve(&mut store, 3);
        sieve.evict(&mut store);
        assert_eq!(sieve.hand(), store.find_by_id(2));
        assert!(sieve.remove(&mut store, 2));
        assert_eq!(sieve.hand(), store.find_by_id(3));
        assert_eq!(sieve.verify(&store), Ok(()));
    }
}
