//! Intrusive FIFO queue over object-store records.
//!
//! The queue itself only holds the two endpoint handles and a length. The
//! per-object `prev`/`next` links live inside each [`CacheObject`] in the
//! [`ObjectStore`], so linking and unlinking are O(1) and allocation-free.
//!
//! ```text
//!   head                                             tail
//!  (newest)                                        (oldest)
//!   ┌───┐  next   ┌───┐  next   ┌───┐  next   ┌───┐
//!   │ D │ ──────▶ │ C │ ──────▶ │ B │ ──────▶ │ A │
//!   │   │ ◀────── │   │ ◀────── │   │ ◀────── │   │
//!   └───┘  prev   └───┘  prev   └───┘  prev   └───┘
//! ```
//!
//! Eviction scans run from the tail toward the head by following `prev`.
//! Order only records insertion recency; accesses never move records.

use crate::object::{CacheObject, ObjHandle};
use crate::store::ObjectStore;

/// Endpoints of a doubly linked queue whose links live in an [`ObjectStore`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ObjQueue {
    head: Option<ObjHandle>,
    tail: Option<ObjHandle>,
    len: usize,
}

impl ObjQueue {
    /// Creates an empty queue.
    pub const fn new() -> Self {
        Self {
            head: None,
            tail: None,
            len: 0,
        }
    }

    /// Most recently inserted record.
    #[inline]
    pub fn head(&self) -> Option<ObjHandle> {
        self.head
    }

    /// Oldest record, where eviction scans start.
    #[inline]
    pub fn tail(&self) -> Option<ObjHandle> {
        self.tail
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Links an unlinked record in as the new head.
    pub fn prepend(&mut self, store: &mut ObjectStore, handle: ObjHandle) {
        let old_head = self.head;
        {
            let obj = &mut store[handle];
            obj.prev = None;
            obj.next = old_head;
        }
        match old_head {
            Some(old) => store[old].prev = Some(handle),
            None => self.tail = Some(handle),
        }
        self.head = Some(handle);
        self.len += 1;
    }

    /// Unlinks a record that is currently in this queue, repairing its
    /// neighbours and the endpoints.
    pub fn unlink(&mut self, store: &mut ObjectStore, handle: ObjHandle) {
        let (prev, next) = {
            let obj = &mut store[handle];
            (obj.prev.take(), obj.next.take())
        };
        match prev {
            Some(p) => store[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => store[n].prev = prev,
            None => self.tail = prev,
        }
        self.len -= 1;
    }

    /// Unlinks and returns the oldest record's handle.
    pub fn pop_tail(&mut self, store: &mut ObjectStore) -> Option<ObjHandle> {
        let tail = self.tail?;
        self.unlink(store, tail);
        Some(tail)
    }

    /// Tail-to-head successor of `handle`, wrapping to the tail past the head.
    #[inline]
    pub fn prev_wrapping(&self, store: &ObjectStore, handle: ObjHandle) -> Option<ObjHandle> {
        store[handle].prev.or(self.tail)
    }

    /// Walks the queue from head to tail.
    pub fn iter<'a>(&self, store: &'a ObjectStore) -> Iter<'a> {
        Iter {
            store,
            cursor: self.head,
        }
    }

    /// Forgets every link. The records themselves are owned by the store.
    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

/// Head-to-tail iterator over a queue's records.
#[derive(Debug)]
pub struct Iter<'a> {
    store: &'a ObjectStore,
    cursor: Option<ObjHandle>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (ObjHandle, &'a CacheObject);

    fn next(&mut self) -> Option<Self::Item> {
        let handle = self.cursor?;
        let obj = self.store.get(handle)?;
        self.cursor = obj.next;
        Some((handle, obj))
    }
}
