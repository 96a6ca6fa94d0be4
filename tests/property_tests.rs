//! Property tests: random operation sequences against every policy.
//!
//! After every operation the queue must agree with the object store, the scan
//! hand must refer to a queued object, and peeking must not change anything.

use proptest::prelude::*;
use sieve_size::config::{CacheConfig, PolicyConfig, SieveSizeConfig};
use sieve_size::policy::{EvictionPolicy, Policy, SieveSize};
use sieve_size::store::ObjectStore;
use sieve_size::{Cache, ObjId, Request};
use std::num::{NonZeroU64, NonZeroUsize};

#[derive(Debug, Clone)]
enum Op {
    Insert(ObjId, u64),
    Find(ObjId, bool),
    Evict,
    Remove(ObjId),
    Peek,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0u64..40, 1u64..200).prop_map(|(id, size)| Op::Insert(id, size)),
        3 => (0u64..40, any::<bool>()).prop_map(|(id, promote)| Op::Find(id, promote)),
        2 => Just(Op::Evict),
        1 => (0u64..40).prop_map(Op::Remove),
        1 => Just(Op::Peek),
    ]
}

fn policy_strategy() -> impl Strategy<Value = PolicyConfig> {
    prop_oneof![
        Just(PolicyConfig::Fifo),
        Just(PolicyConfig::Sieve),
        (1usize..12).prop_map(|w| {
            PolicyConfig::SieveSize(SieveSizeConfig::new(NonZeroUsize::new(w).unwrap()))
        }),
    ]
}

/// Visited counters keyed by id, in a stable order.
fn snapshot(store: &ObjectStore) -> Vec<(ObjId, u8)> {
    let mut state: Vec<(ObjId, u8)> = store.iter().map(|(_, obj)| (obj.id, obj.visited)).collect();
    state.sort_unstable();
    state
}

fn apply<P: EvictionPolicy>(policy: &mut P, store: &mut ObjectStore, op: &Op) {
    match *op {
        Op::Insert(id, size) => {
            // Inserting a resident id is a caller error; skip it.
            if store.find_by_id(id).is_none() {
                policy.insert(store, &Request::new(id, size));
            }
        }
        Op::Find(id, promote) => {
            policy.find(store, id, promote);
        }
        Op::Evict => {
            policy.evict(store);
        }
        Op::Remove(id) => {
            let resident = store.find_by_id(id).is_some();
            assert_eq!(policy.remove(store, id), resident);
        }
        Op::Peek => {
            policy.to_evict(store);
        }
    }
}

proptest! {
    #[test]
    fn prop_verify_never_fails(
        config in policy_strategy(),
        ops in prop::collection::vec(op_strategy(), 0..200)
    ) {
        let mut store = ObjectStore::new();
        let mut policy = Policy::from_config(&config);
        for op in &ops {
            apply(&mut policy, &mut store, op);
            prop_assert_eq!(policy.verify(&store), Ok(()));
            prop_assert_eq!(policy.len() as u64, store.n_obj());
        }
    }

    #[test]
    fn prop_hand_always_queued(
        window in 1usize..12,
        ops in prop::collection::vec(op_strategy(), 0..200)
    ) {
        let mut store = ObjectStore::new();
        let mut policy = SieveSize::init(SieveSizeConfig::new(NonZeroUsize::new(window).unwrap()));
        for op in &ops {
            apply(&mut policy, &mut store, op);
            if let Some(hand) = policy.hand() {
                let queued = policy.queue().iter(&store).any(|(h, _)| h == hand);
                prop_assert!(queued, "hand {:?} not queued after {:?}", hand, op);
            }
        }
    }

    #[test]
    fn prop_peek_is_idempotent(
        window in 1usize..12,
        ops in prop::collection::vec(op_strategy(), 1..120)
    ) {
        let mut store = ObjectStore::new();
        let mut policy = SieveSize::init(SieveSizeConfig::new(NonZeroUsize::new(window).unwrap()));
        for op in &ops {
            apply(&mut policy, &mut store, op);

            let hand = policy.hand();
            let before = snapshot(&store);
            let first = policy.to_evict(&store);
            let second = policy.to_evict(&store);
            prop_assert_eq!(first, second);
            prop_assert_eq!(first.is_none(), policy.is_empty());
            prop_assert_eq!(policy.hand(), hand);
            prop_assert_eq!(snapshot(&store), before);
        }
    }

    #[test]
    fn prop_evict_removes_exactly_one(
        config in policy_strategy(),
        ops in prop::collection::vec(op_strategy(), 0..120)
    ) {
        let mut store = ObjectStore::new();
        let mut policy = Policy::from_config(&config);
        for op in &ops {
            apply(&mut policy, &mut store, op);
        }
        let before = policy.len();
        let bytes = store.occupied_bytes();
        match policy.evict(&mut store) {
            Some(evicted) => {
                prop_assert_eq!(policy.len(), before - 1);
                prop_assert_eq!(store.occupied_bytes(), bytes - evicted.size);
                prop_assert!(store.find_by_id(evicted.id).is_none());
            }
            None => prop_assert_eq!(before, 0),
        }
    }

    #[test]
    fn prop_cache_respects_capacity(
        config in policy_strategy(),
        cache_size in 50u64..2000,
        ids in prop::collection::vec(0u64..60, 0..300)
    ) {
        let mut cache = Cache::init(
            CacheConfig::new(NonZeroU64::new(cache_size).unwrap()).with_policy(config),
        );
        for id in ids {
            // One size per id, so a hit never changes the footprint.
            let size = 1 + (id * 37) % 300;
            cache.get(&Request::new(id, size));
            prop_assert!(cache.occupied_bytes() <= cache.cache_size());
        }
        prop_assert_eq!(cache.verify(), Ok(()));
    }
}
