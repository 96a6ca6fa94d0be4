//! Correctness Tests for the Eviction Policies
//!
//! This module validates the eviction behaviour of each policy using small,
//! predictable request patterns. Each test explicitly checks which object is
//! evicted and where the scan hand ends up.
//!
//! ## Test Strategy
//! - Small queues (3-8 objects) for predictable behavior
//! - Policies driven directly against an `ObjectStore`, plus a few tests
//!   through the `Cache` request pipeline
//! - `verify()` after every mutating step that matters

use sieve_size::config::{CacheConfig, PolicyConfig, SieveSizeConfig};
use sieve_size::policy::{EvictionPolicy, Fifo, Sieve, SieveSize};
use sieve_size::store::ObjectStore;
use sieve_size::{Cache, ObjId, Request};
use std::num::{NonZeroU64, NonZeroUsize};

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Helper to create a SieveSize policy with the given window
fn make_sieve_size(window: usize) -> SieveSize {
    SieveSize::init(SieveSizeConfig::new(NonZeroUsize::new(window).unwrap()))
}

/// Inserts `(id, size)` pairs, oldest first
fn insert_all<P: EvictionPolicy>(policy: &mut P, store: &mut ObjectStore, objects: &[(ObjId, u64)]) {
    for &(id, size) in objects {
        policy.insert(store, &Request::new(id, size));
    }
}

/// Queue contents from head (newest) to tail (oldest)
fn queue_ids(policy: &SieveSize, store: &ObjectStore) -> Vec<ObjId> {
    policy.queue().iter(store).map(|(_, obj)| obj.id).collect()
}

fn visited(store: &ObjectStore, id: ObjId) -> u8 {
    store[store.find_by_id(id).unwrap()].visited
}

fn hand_id(policy: &SieveSize, store: &ObjectStore) -> Option<ObjId> {
    policy.hand().map(|h| store[h].id)
}

fn make_cache(size: u64, policy: PolicyConfig) -> Cache {
    Cache::init(CacheConfig::new(NonZeroU64::new(size).unwrap()).with_policy(policy))
}

// ============================================================================
// QUEUE AND VISITED SEMANTICS
// ============================================================================

#[test]
fn test_insert_order_is_fifo() {
    let mut store = ObjectStore::new();
    let mut policy = make_sieve_size(4);
    insert_all(&mut policy, &mut store, &[(1, 1), (2, 1), (3, 1)]);

    assert_eq!(queue_ids(&policy, &store), vec![3, 2, 1]);
    // Hits never reorder the queue.
    policy.find(&mut store, 1, true);
    assert_eq!(queue_ids(&policy, &store), vec![3, 2, 1]);
}

#[test]
fn test_visited_set_only_on_promoted_lookup() {
    let mut store = ObjectStore::new();
    let mut policy = make_sieve_size(4);
    insert_all(&mut policy, &mut store, &[(1, 1), (2, 1)]);

    policy.find(&mut store, 1, false);
    assert_eq!(visited(&store, 1), 0);

    policy.find(&mut store, 1, true);
    assert_eq!(visited(&store, 1), 1);

    // Repeated hits saturate at 1.
    policy.find(&mut store, 1, true);
    assert_eq!(visited(&store, 1), 1);

    policy.find(&mut store, 2, false);
    assert_eq!(visited(&store, 2), 0);
}

// ============================================================================
// SIEVE-SIZE EVICTION
// ============================================================================

#[test]
fn test_aging_decrements_only_scanned_objects() {
    let mut store = ObjectStore::new();
    let mut policy = make_sieve_size(1);
    insert_all(&mut policy, &mut store, &[(1, 1), (2, 1), (3, 1), (4, 1), (5, 1)]);
    for id in [1, 2, 4, 5] {
        policy.find(&mut store, id, true);
    }

    let evicted = policy.evict(&mut store).unwrap();
    assert_eq!(evicted.id, 3);
    assert_eq!(visited(&store, 1), 0);
    assert_eq!(visited(&store, 2), 0);
    assert_eq!(visited(&store, 4), 1);
    assert_eq!(visited(&store, 5), 1);
    assert_eq!(policy.verify(&store), Ok(()));
}

#[test]
fn test_largest_in_window_not_global_largest() {
    let mut store = ObjectStore::new();
    let mut policy = make_sieve_size(3);
    // Window of 3 from the tail covers ids 1..=3; id 6 is larger but outside.
    insert_all(
        &mut policy,
        &mut store,
        &[(1, 4), (2, 9), (3, 6), (4, 2), (5, 3), (6, 500)],
    );

    assert_eq!(policy.evict(&mut store).unwrap().id, 2);
    assert!(store.find_by_id(6).is_some());
    assert_eq!(policy.verify(&store), Ok(()));
}

#[test]
fn test_window_size_one_matches_sieve() {
    let requests: Vec<(ObjId, u64)> = (1..=6).map(|id| (id, id * 10)).collect();
    let mut sieve_store = ObjectStore::new();
    let mut size_store = ObjectStore::new();
    let mut sieve = Sieve::new();
    let mut sieve_size = make_sieve_size(1);
    insert_all(&mut sieve, &mut sieve_store, &requests);
    insert_all(&mut sieve_size, &mut size_store, &requests);

    for id in [1, 3, 4] {
        sieve.find(&mut sieve_store, id, true);
        sieve_size.find(&mut size_store, id, true);
    }
    for _ in 0..4 {
        let a = sieve.evict(&mut sieve_store).map(|obj| obj.id);
        let b = sieve_size.evict(&mut size_store).map(|obj| obj.id);
        assert_eq!(a, b);
    }
}

#[test]
fn test_hand_stays_on_stop_when_window_picks_elsewhere() {
    let mut store = ObjectStore::new();
    let mut policy = make_sieve_size(3);
    insert_all(&mut policy, &mut store, &[(1, 5), (2, 50), (3, 5), (4, 5)]);

    assert_eq!(policy.evict(&mut store).unwrap().id, 2);
    assert_eq!(hand_id(&policy, &store), Some(1));

    // Next eviction resumes at 1 with window {1, 3, 4}; ties keep 1.
    assert_eq!(policy.evict(&mut store).unwrap().id, 1);
    assert_eq!(hand_id(&policy, &store), Some(3));
    assert_eq!(policy.verify(&store), Ok(()));
}

#[test]
fn test_window_may_evict_visited_object() {
    let mut store = ObjectStore::new();
    let mut policy = make_sieve_size(3);
    insert_all(&mut policy, &mut store, &[(1, 5), (2, 80), (3, 5)]);
    policy.find(&mut store, 2, true);

    // Object 2 is visited but the window compares sizes only.
    let evicted = policy.evict(&mut store).unwrap();
    assert_eq!(evicted.id, 2);
    assert_eq!(evicted.visited, 1);
    assert_eq!(policy.verify(&store), Ok(()));
}

#[test]
fn test_peek_is_idempotent() {
    let mut store = ObjectStore::new();
    let mut policy = make_sieve_size(2);
    insert_all(&mut policy, &mut store, &[(1, 5), (2, 7), (3, 30), (4, 1)]);
    policy.find(&mut store, 1, true);
    policy.evict(&mut store);
    policy.find(&mut store, 4, true);

    let hand_before = policy.hand();
    let visited_before: Vec<(ObjId, u8)> =
        store.iter().map(|(_, obj)| (obj.id, obj.visited)).collect();

    let first = policy.to_evict(&store);
    let second = policy.to_evict(&store);
    assert!(first.is_some());
    assert_eq!(first, second);
    assert_eq!(policy.hand(), hand_before);
    let visited_after: Vec<(ObjId, u8)> =
        store.iter().map(|(_, obj)| (obj.id, obj.visited)).collect();
    assert_eq!(visited_before, visited_after);
}

#[test]
fn test_peek_matches_evict_when_nothing_visited() {
    let mut store = ObjectStore::new();
    let mut policy = make_sieve_size(3);
    insert_all(&mut policy, &mut store, &[(1, 3), (2, 8), (3, 8), (4, 1), (5, 9)]);

    for _ in 0..5 {
        let peeked = policy.to_evict(&store).map(|h| store[h].id);
        let evicted = policy.evict(&mut store).map(|obj| obj.id);
        assert_eq!(peeked, evicted);
    }
    assert!(policy.is_empty());
}

#[test]
fn test_remove_hand_object_moves_hand() {
    let mut store = ObjectStore::new();
    let mut policy = make_sieve_size(2);
    insert_all(&mut policy, &mut store, &[(1, 5), (2, 50), (3, 5)]);
    policy.evict(&mut store);
    assert_eq!(hand_id(&policy, &store), Some(1));

    assert!(policy.remove(&mut store, 1));
    assert_eq!(hand_id(&policy, &store), Some(3));
    assert!(policy.remove(&mut store, 3));
    assert_eq!(policy.hand(), None);
    assert!(policy.is_empty());
    assert_eq!(policy.verify(&store), Ok(()));
}

#[test]
fn test_remove_unknown_id() {
    let mut store = ObjectStore::new();
    let mut policy = make_sieve_size(2);
    insert_all(&mut policy, &mut store, &[(1, 5)]);
    assert!(!policy.remove(&mut store, 42));
    assert_eq!(policy.len(), 1);
}

// ============================================================================
// END-TO-END SCENARIOS
// ============================================================================

#[test]
fn test_scenario_window_prefers_large_object() {
    let mut store = ObjectStore::new();
    let mut policy = make_sieve_size(2);
    insert_all(&mut policy, &mut store, &[(1, 10), (2, 50), (3, 10)]);

    let evicted = policy.evict(&mut store).unwrap();
    assert_eq!(evicted.id, 2);
    assert!(store.find_by_id(2).is_none());
    assert_eq!(store.occupied_bytes(), 20);
    assert_eq!(policy.verify(&store), Ok(()));
}

#[test]
fn test_scenario_all_visited_single_eviction() {
    let mut store = ObjectStore::new();
    let mut policy = make_sieve_size(2);
    insert_all(&mut policy, &mut store, &[(1, 10), (2, 50), (3, 10)]);
    for id in 1..=3 {
        policy.find(&mut store, id, true);
    }

    let before = policy.len();
    let evicted = policy.evict(&mut store).unwrap();
    assert_eq!(policy.len(), before - 1);
    assert!(store.find_by_id(evicted.id).is_none());
    assert!(store.iter().all(|(_, obj)| obj.visited == 0));
    // Aging wrapped back to object 1; the window {1, 2} picks 2.
    assert_eq!(evicted.id, 2);
    assert_eq!(policy.verify(&store), Ok(()));
}

// ============================================================================
// BASELINES
// ============================================================================

#[test]
fn test_fifo_ignores_hits() {
    let mut store = ObjectStore::new();
    let mut fifo = Fifo::new();
    insert_all(&mut fifo, &mut store, &[(1, 1), (2, 1), (3, 1)]);
    fifo.find(&mut store, 1, true);
    assert_eq!(fifo.evict(&mut store).map(|obj| obj.id), Some(1));
}

#[test]
fn test_sieve_evicts_first_unvisited() {
    let mut store = ObjectStore::new();
    let mut sieve = Sieve::new();
    insert_all(&mut sieve, &mut store, &[(1, 100), (2, 1), (3, 1)]);
    sieve.find(&mut store, 1, true);
    // Size is irrelevant to SIEVE.
    assert_eq!(sieve.evict(&mut store).map(|obj| obj.id), Some(2));
}

// ============================================================================
// REQUEST PIPELINE
// ============================================================================

#[test]
fn test_cache_mixed_sizes_stays_consistent() {
    // One large object and a few small ones that keep coming back.
    let mut sieve_size = make_cache(
        100,
        PolicyConfig::SieveSize(SieveSizeConfig::new(NonZeroUsize::new(4).unwrap())),
    );
    for round in 0..20u64 {
        for id in 1..=4 {
            sieve_size.get(&Request::new(id, 10));
        }
        sieve_size.get(&Request::new(100 + round, 60));
    }
    assert_eq!(sieve_size.verify(), Ok(()));
    assert!(sieve_size.occupied_bytes() <= 100);
    assert!(sieve_size.core_metrics().cache_hits > 0);
}

#[test]
fn test_cache_never_exceeds_capacity() {
    for policy in [
        PolicyConfig::Fifo,
        PolicyConfig::Sieve,
        PolicyConfig::SieveSize(SieveSizeConfig::default()),
    ] {
        let mut cache = make_cache(1000, policy);
        for i in 0..500u64 {
            let id = (i * 7919) % 97;
            cache.get(&Request::new(id, 10 + (id % 13) * 20));
            assert!(cache.occupied_bytes() <= cache.cache_size());
        }
        assert_eq!(cache.verify(), Ok(()), "{policy}");
    }
}

#[test]
fn test_cache_remove_and_reinsert() {
    let mut cache = make_cache(100, PolicyConfig::default());
    cache.get(&Request::new(1, 40));
    assert!(cache.remove(1));
    assert!(!cache.get(&Request::new(1, 40)));
    assert!(cache.get(&Request::new(1, 40)));
    assert_eq!(cache.n_obj(), 1);
    assert_eq!(cache.verify(), Ok(()));
}
