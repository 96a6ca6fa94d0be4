#![no_std]
extern crate alloc;
extern crate sieve_size;

use alloc::format;
use alloc::vec::Vec;
use core::num::{NonZeroU64, NonZeroUsize};
use sieve_size::config::{CacheConfig, PolicyConfig, SieveSizeConfig};
use sieve_size::metrics::CacheMetrics;
use sieve_size::{Cache, Request};

fn make_cache(size: u64, policy: PolicyConfig) -> Cache {
    Cache::init(CacheConfig::new(NonZeroU64::new(size).unwrap()).with_policy(policy))
}

#[test]
fn test_sieve_size_in_no_std() {
    let policy = PolicyConfig::SieveSize(SieveSizeConfig::new(NonZeroUsize::new(2).unwrap()));
    let mut cache = make_cache(70, policy);

    cache.get(&Request::new(1, 10));
    cache.get(&Request::new(2, 50));
    cache.get(&Request::new(3, 10));
    cache.get(&Request::new(4, 10));

    assert!(cache.find(2, false).is_none());
    assert_eq!(cache.occupied_bytes(), 30);
    assert!(cache.verify().is_ok());
}

#[test]
fn test_baselines_in_no_std() {
    for policy in [PolicyConfig::Fifo, PolicyConfig::Sieve] {
        let mut cache = make_cache(3, policy);
        let ids: Vec<u64> = (0..10).collect();
        for &id in &ids {
            cache.get(&Request::new(id, 1));
        }
        assert_eq!(cache.n_obj(), 3);
        assert!(cache.verify().is_ok());
    }
}

#[test]
fn test_config_display_in_no_std() {
    let config: PolicyConfig = "sieve_size:eviction-window-size=7".parse().unwrap();
    assert_eq!(format!("{config}"), "sieve-size:eviction-window-size=7");
}

#[test]
fn test_metrics_in_no_std() {
    let mut cache = make_cache(10, PolicyConfig::default());
    cache.get(&Request::new(1, 5));
    cache.get(&Request::new(1, 5));
    let metrics = cache.metrics();
    assert_eq!(metrics.get("cache_hits"), Some(&1.0));
    assert_eq!(metrics.get("requests"), Some(&2.0));
}
