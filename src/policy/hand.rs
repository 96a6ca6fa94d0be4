//! Scan hand and escalating-threshold candidate search.
//!
//! The hand is the persistent scan position shared by the SIEVE-family
//! policies. It survives across evictions so each eviction resumes where the
//! previous one stopped instead of restarting at the tail. `None` means no scan
//! is in progress and the next one starts at the tail.
//!
//! # Candidate search
//!
//! [`Hand::find_candidate`] looks for the first record, scanning tail-to-head
//! from the hand, whose visited counter is at or below a threshold `t`:
//!
//! ```text
//! Scanning(t) ──hit──────────────────────────▶ found
//!     │ fell off the head
//!     ▼
//! WrappedOnce(t): rescan from the tail ──hit──▶ found
//!     │ fell off the head again
//!     ▼
//! Escalate: t + 1, back to Scanning
//! ```
//!
//! Each threshold level costs at most two passes over the queue. Visited
//! counters are `u8`, so the search terminates by `t = u8::MAX` at the latest,
//! and in practice by `t = 1`.

use crate::object::ObjHandle;
use crate::queue::ObjQueue;
use crate::store::ObjectStore;

/// Persistent scan position into a policy's queue.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Hand(Option<ObjHandle>);

impl Hand {
    /// A hand with no scan in progress.
    pub const fn new() -> Self {
        Hand(None)
    }

    #[inline]
    pub fn get(&self) -> Option<ObjHandle> {
        self.0
    }

    #[inline]
    pub fn set(&mut self, handle: Option<ObjHandle>) {
        self.0 = handle;
    }

    #[inline]
    pub fn reset(&mut self) {
        self.0 = None;
    }

    /// Where the next scan begins: the hand, or the tail if no scan is in progress.
    #[inline]
    pub fn start(&self, queue: &ObjQueue) -> Option<ObjHandle> {
        self.0.or(queue.tail())
    }

    /// Moves the hand off `handle` before it is unlinked, so the hand never
    /// refers to a record that has left the queue.
    #[inline]
    pub fn step_off(&mut self, store: &ObjectStore, handle: ObjHandle) {
        if self.0 == Some(handle) {
            self.0 = store[handle].prev();
        }
    }

    /// Finds the next record with `visited <= threshold`, starting at the hand
    /// and rescanning once from the tail if the first pass falls off the head.
    pub fn find_candidate(
        &self,
        queue: &ObjQueue,
        store: &ObjectStore,
        threshold: u8,
    ) -> Option<ObjHandle> {
        scan_toward_head(store, self.start(queue), threshold)
            .or_else(|| scan_toward_head(store, queue.tail(), threshold))
    }

    /// Runs [`find_candidate`](Self::find_candidate) with `t = 0, 1, 2, ...`
    /// until a record matches. Returns the record and the threshold that
    /// matched, or `None` only if the queue is empty.
    pub fn find_candidate_escalating(
        &self,
        queue: &ObjQueue,
        store: &ObjectStore,
    ) -> Option<(ObjHandle, u8)> {
        if queue.is_empty() {
            return None;
        }
        (0..=u8::MAX).find_map(|threshold| {
            let found = self.find_candidate(queue, store, threshold);
            if found.is_none() {
                log::debug!("no candidate at visited <= {threshold}, escalating");
            }
            found.map(|handle| (handle, threshold))
        })
    }
}

/// Walks `prev` links from `from` until a record with `visited <= threshold`
/// is found or the walk falls off the head.
fn scan_toward_head(
    store: &ObjectStore,
    mut cursor: Option<ObjHandle>,
    threshold: u8,
) -> Option<ObjHandle> {
    while let Some(handle) = cursor {
        let obj = &store[handle];
        if obj.visited <= threshold {
            return Some(handle);
        }
        cursor = obj.prev();
    }
    None
}
