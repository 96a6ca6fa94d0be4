//! Cache Configuration Module
//!
//! This module provides the configuration structures for the cache and its
//! eviction policies.
//!
//! # Design Philosophy
//!
//! Configuration structs have public fields for simple instantiation, and
//! parse from the compact text form used on the simulator command line:
//!
//! - **Policy names**: `fifo`, `sieve`, `sieve-size` (case-insensitive, `-` and
//!   `_` interchangeable, `sievesize` accepted)
//! - **Parameters**: comma-separated `key=value` pairs, e.g.
//!   `eviction-window-size=50`
//! - **Combined**: `name:params`, e.g. `sieve-size:eviction-window-size=50`
//!
//! Every config renders back to the same syntax through `Display`, so the
//! active parameters can be printed and parsed again.
//!
//! | Config | Used by | Description |
//! |--------|---------|-------------|
//! | [`CacheConfig`] | [`Cache`](crate::Cache) | byte capacity plus policy |
//! | [`PolicyConfig`] | [`Policy`](crate::policy::Policy) | which policy to build |
//! | [`SieveSizeConfig`] | [`SieveSize`](crate::policy::SieveSize) | eviction window size |
//!
//! # Examples
//!
//! ```
//! use sieve_size::config::{CacheConfig, PolicyConfig};
//! use sieve_size::Cache;
//! use sieve_size::metrics::CacheMetrics;
//! use core::num::NonZeroU64;
//!
//! let policy: PolicyConfig = "sieve-size:eviction-window-size=50".parse().unwrap();
//! let config = CacheConfig::new(NonZeroU64::new(1024 * 1024).unwrap()).with_policy(policy);
//!
//! let cache = Cache::init(config);
//! assert_eq!(cache.algorithm_name(), "Sieve_size");
//! ```

extern crate alloc;

pub mod cache;
pub mod sieve_size;

pub use cache::{CacheConfig, PolicyConfig};
pub use sieve_size::SieveSizeConfig;

use crate::error::ConfigError;
use alloc::string::String;
use alloc::vec::Vec;

/// One `key=value` entry of a parameter string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Param<'a> {
    /// Lowercased key with `_` folded to `-`.
    pub key: String,
    /// The key as written, for error messages.
    pub raw_key: &'a str,
    pub value: &'a str,
}

/// Lowercases `name` and folds `_` to `-`.
pub(crate) fn normalize(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| if c == '_' { '-' } else { c.to_ascii_lowercase() })
        .collect()
}

/// Splits a comma-separated `key=value` list. Blank entries are skipped.
pub(crate) fn parse_params(params: &str) -> Result<Vec<Param<'_>>, ConfigError> {
    params
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (key, value) = entry
                .split_once('=')
                .ok_or_else(|| ConfigError::MalformedParameter(entry.into()))?;
            let (key, value) = (key.trim(), value.trim());
            if key.is_empty() {
                return Err(ConfigError::MalformedParameter(entry.into()));
            }
            Ok(Param {
                key: normalize(key),
                raw_key: key,
                value,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_params_normalizes_keys() {
        let params = parse_params(" Eviction_Window_Size = 7 ,, foo=bar").unwrap();
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].key, "eviction-window-size");
        assert_eq!(params[0].raw_key, "Eviction_Window_Size");
        assert_eq!(params[0].value, "7");
        assert_eq!(params[1].key, "foo");
    }

    #[test]
    fn test_parse_params_rejects_malformed() {
        assert_eq!(
            parse_params("eviction-window-size"),
            Err(ConfigError::MalformedParameter("eviction-window-size".into()))
        );
        assert_eq!(
            parse_params("=3"),
            Err(ConfigError::MalformedParameter("=3".into()))
        );
        assert_eq!(parse_params(""), Ok(Vec::new()));
    }
}
