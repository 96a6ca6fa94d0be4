//! Object Store
//!
//! The store is the runtime side of an eviction policy: it allocates object
//! records, maps identifiers to records, and tracks the occupied object and
//! byte totals. Policies never allocate or free records themselves; they call
//! the store's hooks after every structural change:
//!
//! | Hook | Called by | Effect |
//! |------|-----------|--------|
//! | [`on_insert`](ObjectStore::on_insert) | policy `insert` | allocate slot, index id, add bytes |
//! | [`on_evict`](ObjectStore::on_evict) | policy `evict` | free slot, unindex id, subtract bytes |
//! | [`on_remove`](ObjectStore::on_remove) | policy `remove` | same as evict, for out-of-band deletion |
//!
//! Records live in a slot arena. Freed slots are reused, so an
//! [`ObjHandle`] is only meaningful while its object is resident.

extern crate alloc;

use crate::object::{CacheObject, ObjHandle, ObjId};
use crate::request::Request;
use alloc::vec::Vec;
use core::fmt;
use core::ops::{Index, IndexMut};

#[cfg(feature = "hashbrown")]
use hashbrown::HashMap;

#[cfg(not(feature = "hashbrown"))]
use std::collections::HashMap;

/// Arena of cached object records plus the identifier index and totals.
pub struct ObjectStore {
    slots: Vec<Option<CacheObject>>,
    free_slots: Vec<usize>,
    index: HashMap<ObjId, ObjHandle>,
    occupied_bytes: u64,
}

impl ObjectStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty store with room for `capacity` objects before reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_slots: Vec::new(),
            index: HashMap::with_capacity(capacity),
            occupied_bytes: 0,
        }
    }

    /// Looks up the record for `id`.
    #[inline]
    pub fn find_by_id(&self, id: ObjId) -> Option<ObjHandle> {
        self.index.get(&id).copied()
    }

    /// Returns the record behind `handle`, or `None` if the slot is vacant.
    #[inline]
    pub fn get(&self, handle: ObjHandle) -> Option<&CacheObject> {
        self.slots.get(handle.0).and_then(Option::as_ref)
    }

    #[inline]
    pub fn get_mut(&mut self, handle: ObjHandle) -> Option<&mut CacheObject> {
        self.slots.get_mut(handle.0).and_then(Option::as_mut)
    }

    /// Returns true if `handle` refers to a resident record.
    #[inline]
    pub fn contains(&self, handle: ObjHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Number of resident objects.
    #[inline]
    pub fn n_obj(&self) -> u64 {
        self.index.len() as u64
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Sum of the sizes of all resident objects.
    #[inline]
    pub fn occupied_bytes(&self) -> u64 {
        self.occupied_bytes
    }

    /// Allocates and indexes a record for `req`.
    ///
    /// The new record is unlinked; the calling policy links it into its queue.
    /// The caller must not insert an id that is already resident.
    pub fn on_insert(&mut self, req: &Request) -> ObjHandle {
        debug_assert!(
            !self.index.contains_key(&req.id),
            "object {} inserted twice",
            req.id
        );
        let obj = CacheObject::new(req.id, req.size);
        let handle = match self.free_slots.pop() {
            Some(slot) => {
                self.slots[slot] = Some(obj);
                ObjHandle(slot)
            }
            None => {
                self.slots.push(Some(obj));
                ObjHandle(self.slots.len() - 1)
            }
        };
        self.index.insert(req.id, handle);
        self.occupied_bytes += req.size;
        handle
    }

    /// Releases a record the policy has just evicted and unlinked.
    #[inline]
    pub fn on_evict(&mut self, handle: ObjHandle) -> Option<CacheObject> {
        self.release(handle)
    }

    /// Releases a record the policy has just removed out of band and unlinked.
    #[inline]
    pub fn on_remove(&mut self, handle: ObjHandle) -> Option<CacheObject> {
        self.release(handle)
    }

    fn release(&mut self, handle: ObjHandle) -> Option<CacheObject> {
        let obj = self.slots.get_mut(handle.0)?.take()?;
        self.index.remove(&obj.id);
        self.free_slots.push(handle.0);
        self.occupied_bytes -= obj.size;
        Some(obj)
    }

    /// Iterates over resident records in slot order (not queue order).
    pub fn iter(&self) -> impl Iterator<Item = (ObjHandle, &CacheObject)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(slot, obj)| obj.as_ref().map(|obj| (ObjHandle(slot), obj)))
    }

    /// Drops every record. Any policy queue over this store must be reset too.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_slots.clear();
        self.index.clear();
        self.occupied_bytes = 0;
    }
}

impl Default for ObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<ObjHandle> for ObjectStore {
    type Output = CacheObject;

    /// # Panics
    ///
    /// Panics if `handle` refers to a vacant slot. Policies only index with
    /// handles reachable from their own queue, so this indicates a broken
    /// queue invariant.
    fn index(&self, handle: ObjHandle) -> &CacheObject {
        match self.get(handle) {
            Some(obj) => obj,
            None => panic!("stale object handle {}", handle.0),
        }
    }
}

impl IndexMut<ObjHandle> for ObjectStore {
    fn index_mut(&mut self, handle: ObjHandle) -> &mut CacheObject {
        match self.get_mut(handle) {
            Some(obj) => obj,
            None => panic!("stale object handle {}", handle.0),
        }
    }
}

impl fmt::Debug for ObjectStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectStore")
            .field("n_obj", &self.index.len())
            .field("occupied_bytes", &self.occupied_bytes)
            .field("slots", &self.slots.len())
            .finish()
    }
}
