//! First-In-First-Out eviction.
//!
//! Evicts the oldest object regardless of access. Used as the baseline the
//! SIEVE policies are compared against.

use super::{verify_queue, EvictionPolicy};
use crate::error::VerifyError;
use crate::object::{CacheObject, ObjHandle, ObjId};
use crate::queue::ObjQueue;
use crate::request::Request;
use crate::store::ObjectStore;

/// FIFO policy state.
#[derive(Debug, Default)]
pub struct Fifo {
    queue: ObjQueue,
}

impl Fifo {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EvictionPolicy for Fifo {
    fn algorithm_name(&self) -> &'static str {
        "FIFO"
    }

    fn find(&mut self, store: &mut ObjectStore, id: ObjId, _promote: bool) -> Option<ObjHandle> {
        store.find_by_id(id)
    }

    fn insert(&mut self, store: &mut ObjectStore, req: &Request) -> ObjHandle {
        let handle = store.on_insert(req);
        self.queue.prepend(store, handle);
        handle
    }

    fn to_evict(&self, _store: &ObjectStore) -> Option<ObjHandle> {
        self.queue.tail()
    }

    fn evict(&mut self, store: &mut ObjectStore) -> Option<CacheObject> {
        let victim = self.queue.pop_tail(store)?;
        let evicted = store.on_evict(victim)?;
        log::trace!("FIFO evicted object {}", evicted.id);
        Some(evicted)
    }

    fn remove(&mut self, store: &mut ObjectStore, id: ObjId) -> bool {
        let Some(handle) = store.find_by_id(id) else {
            return false;
        };
        self.queue.unlink(store, handle);
        store.on_remove(handle);
        true
    }

    fn verify(&self, store: &ObjectStore) -> Result<(), VerifyError> {
        verify_queue(&self.queue, store, None)
    }

    fn len(&self) -> usize {
        self.queue.len()
    }

    fn clear(&mut self) {
        self.queue.clear();
    }
}
