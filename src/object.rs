//! Cached Object Records
//!
//! This module provides [`CacheObject`], the per-object record shared between
//! the object store and the eviction policies, and [`ObjHandle`], the stable
//! arena index used to link records into a policy's queue.
//!
//! # Design Philosophy
//!
//! Records are stored in the [`ObjectStore`](crate::store::ObjectStore) slot
//! arena. Queue links are handles into that arena rather than pointers, so
//! unlinking a record or moving the scan hand can never leave a dangling
//! reference behind: a stale handle fails the arena lookup instead.
//!
//! # Memory Layout
//!
//! - `id: u64` - 8 bytes
//! - `size: u64` - 8 bytes
//! - `visited: u8` - 1 byte (+ padding)
//! - `prev`/`next: Option<ObjHandle>` - 16 bytes each
//!
//! # Field Ownership
//!
//! The store owns `id` and `size`. Policies own `visited` and the queue links
//! and are the only code that writes them.

use core::fmt;

/// Identifier of a cached object, unique while the object is resident.
pub type ObjId = u64;

/// Stable index of a record inside the object store's arena.
///
/// `Option<ObjHandle>` is the "no link" sentinel used by queue links and by the
/// scan hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjHandle(pub(crate) usize);

impl ObjHandle {
    /// Returns the arena slot index this handle refers to.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// One cached object.
///
/// # Examples
///
/// ```
/// use sieve_size::object::CacheObject;
///
/// let obj = CacheObject::new(42, 1024);
/// assert_eq!(obj.id, 42);
/// assert_eq!(obj.size, 1024);
/// assert_eq!(obj.visited, 0);
/// assert!(obj.prev().is_none() && obj.next().is_none());
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct CacheObject {
    /// Object identifier.
    pub id: ObjId,

    /// Size in bytes. Eviction logic only reads it.
    pub size: u64,

    /// Visited counter. Set to 1 on a promoted lookup, reset to 0 on insert,
    /// decremented toward 0 by the SIEVE aging scan. Callers keep it in
    /// `{0, 1}`.
    pub visited: u8,

    /// Neighbour toward the queue head (newer object).
    pub(crate) prev: Option<ObjHandle>,

    /// Neighbour toward the queue tail (older object).
    pub(crate) next: Option<ObjHandle>,
}

impl CacheObject {
    /// Creates an unlinked, unvisited record.
    #[inline]
    pub fn new(id: ObjId, size: u64) -> Self {
        Self {
            id,
            size,
            visited: 0,
            prev: None,
            next: None,
        }
    }

    /// Neighbour toward the head (the next object in a tail-to-head scan).
    #[inline]
    pub fn prev(&self) -> Option<ObjHandle> {
        self.prev
    }

    /// Neighbour toward the tail.
    #[inline]
    pub fn next(&self) -> Option<ObjHandle> {
        self.next
    }

    /// Returns true if the record has been accessed since it was last aged.
    #[inline]
    pub fn is_visited(&self) -> bool {
        self.visited > 0
    }
}

impl fmt::Debug for CacheObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheObject")
            .field("id", &self.id)
            .field("size", &self.size)
            .field("visited", &self.visited)
            .finish()
    }
}
