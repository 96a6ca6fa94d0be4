#![doc = include_str!("../README.md")]
//!
//! ---
//!
//! # Code Reference
//!
//! ## Policy Selection Guide
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                 Which Eviction Policy Should I Use?                  │
//! ├──────────────────────────────────────────────────────────────────────┤
//! │                                                                      │
//! │  ┌──────────────────┐                                                │
//! │  │ Objects vary a   │──Yes──▶ Is byte hit ratio the goal?            │
//! │  │ lot in size?     │              │                                 │
//! │  └────────┬─────────┘         Yes  │  No                             │
//! │           │                    │   │                                 │
//! │          No                    ▼   ▼                                 │
//! │           │            ┌────────────┐  ┌──────────┐                  │
//! │           │            │ SIEVE-size │  │  SIEVE   │                  │
//! │           ▼            └────────────┘  └──────────┘                  │
//! │  ┌──────────────────┐                                                │
//! │  │ Need a baseline? │──Yes──▶ ┌──────────┐                           │
//! │  └──────────────────┘         │   FIFO   │                           │
//! │                               └──────────┘                           │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Reference
//!
//! | Policy | Type | Victim | Evict cost |
//! |--------|------|--------|------------|
//! | FIFO | [`policy::Fifo`] | oldest object | O(1) |
//! | SIEVE | [`policy::Sieve`] | first unvisited object from the hand | amortized O(1) |
//! | SIEVE-size | [`policy::SieveSize`] | largest object in a window of `W` from the first unvisited one | amortized O(1) + O(W) |
//!
//! ## Code Examples
//!
//! ### Running requests through a cache
//!
//! ```rust
//! use sieve_size::config::{CacheConfig, PolicyConfig, SieveSizeConfig};
//! use sieve_size::{Cache, Request};
//! use core::num::{NonZeroU64, NonZeroUsize};
//!
//! let policy = PolicyConfig::SieveSize(SieveSizeConfig::new(NonZeroUsize::new(2).unwrap()));
//! let mut cache = Cache::init(CacheConfig::new(NonZeroU64::new(70).unwrap()).with_policy(policy));
//!
//! cache.get(&Request::new(1, 10));
//! cache.get(&Request::new(2, 50));
//! cache.get(&Request::new(3, 10));
//!
//! // Object 4 needs room: the window covers objects 1 and 2, and 2 is larger.
//! cache.get(&Request::new(4, 10));
//! assert!(cache.find(2, false).is_none());
//! assert!(cache.find(1, false).is_some());
//! ```
//!
//! ### Driving a policy directly
//!
//! ```rust
//! use sieve_size::policy::{EvictionPolicy, Sieve};
//! use sieve_size::store::ObjectStore;
//! use sieve_size::Request;
//!
//! let mut store = ObjectStore::new();
//! let mut sieve = Sieve::new();
//! sieve.insert(&mut store, &Request::new(1, 1));
//! sieve.insert(&mut store, &Request::new(2, 1));
//! sieve.find(&mut store, 1, true);
//!
//! // Object 1 was visited, so the hand passes over it.
//! assert_eq!(sieve.evict(&mut store).map(|obj| obj.id), Some(2));
//! ```
//!
//! ## Modules
//!
//! - [`object`]: cached object records and arena handles
//! - [`store`]: object arena, id index and occupancy totals
//! - [`queue`]: intrusive insertion-order queue
//! - [`policy`]: FIFO, SIEVE and SIEVE-size eviction policies
//! - [`cache`]: request pipeline over a store and a policy
//! - [`config`]: configuration structures and parameter parsing
//! - [`metrics`]: metrics collection for cache performance monitoring
//! - [`error`]: configuration and consistency errors

#![no_std]

extern crate alloc;

#[cfg(any(feature = "std", not(feature = "hashbrown")))]
extern crate std;

/// Cached object records.
///
/// Provides [`CacheObject`](object::CacheObject), the per-object record shared
/// by the store and the policies, and the arena handle used for queue links.
pub mod object;

/// Cache requests.
pub mod request;

/// Object store: record arena, id index and occupancy totals.
pub mod store;

/// Intrusive doubly linked queue over store records.
///
/// Links are arena handles, so unlinking never leaves a dangling reference.
pub mod queue;

/// Eviction policies and their common interface.
pub mod policy;

/// Request pipeline.
pub mod cache;

/// Cache configuration structures.
///
/// Provides configuration structures for the cache and each policy, with
/// parsing from the `key=value` parameter syntax.
pub mod config;

/// Cache metrics system.
///
/// Provides a flexible metrics collection and reporting system. The request
/// pipeline tracks core metrics and each policy can add its own counters.
pub mod metrics;

/// Error types.
pub mod error;

pub use cache::Cache;
pub use error::{ConfigError, VerifyError};
pub use object::{CacheObject, ObjHandle, ObjId};
pub use policy::{EvictionPolicy, Policy};
pub use request::Request;
