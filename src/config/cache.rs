//! Configuration for a [`Cache`](crate::Cache) and its policy selection.
//!
//! # Sizing
//!
//! `cache_size` is the byte budget for resident objects. A request larger than
//! the whole budget is never admitted. The policy only orders the objects that
//! fit; it never grows or shrinks the budget.

use super::{normalize, SieveSizeConfig};
use crate::error::ConfigError;
use core::fmt;
use core::num::NonZeroU64;
use core::str::FromStr;

/// Which eviction policy a cache runs, with its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyConfig {
    /// First in, first out.
    Fifo,
    /// Classic SIEVE.
    Sieve,
    /// Size-aware SIEVE with an eviction window.
    SieveSize(SieveSizeConfig),
}

impl PolicyConfig {
    /// Builds a policy config from a policy name and an optional parameter
    /// string.
    ///
    /// # Examples
    ///
    /// ```
    /// use sieve_size::config::PolicyConfig;
    ///
    /// let config = PolicyConfig::parse("Sieve_Size", Some("eviction-window-size=4")).unwrap();
    /// assert_eq!(config.to_string(), "sieve-size:eviction-window-size=4");
    ///
    /// assert!(PolicyConfig::parse("fifo", Some("eviction-window-size=4")).is_err());
    /// assert!(PolicyConfig::parse("lru", None).is_err());
    /// ```
    pub fn parse(name: &str, params: Option<&str>) -> Result<Self, ConfigError> {
        let params = params.map(str::trim).filter(|p| !p.is_empty());
        let config = match normalize(name).as_str() {
            "fifo" => PolicyConfig::Fifo,
            "sieve" => PolicyConfig::Sieve,
            "sieve-size" | "sievesize" => {
                return Ok(PolicyConfig::SieveSize(
                    params.unwrap_or_default().parse()?,
                ))
            }
            _ => return Err(ConfigError::UnknownPolicy(name.trim().into())),
        };
        match params {
            Some(_) => Err(ConfigError::UnexpectedParameters(config.name())),
            None => Ok(config),
        }
    }

    /// Canonical name, as accepted by [`parse`](Self::parse).
    pub fn name(&self) -> &'static str {
        match self {
            PolicyConfig::Fifo => "fifo",
            PolicyConfig::Sieve => "sieve",
            PolicyConfig::SieveSize(_) => "sieve-size",
        }
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        PolicyConfig::SieveSize(SieveSizeConfig::default())
    }
}

impl FromStr for PolicyConfig {
    type Err = ConfigError;

    /// Parses `name` or `name:params`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((name, params)) => Self::parse(name, Some(params)),
            None => Self::parse(s, None),
        }
    }
}

impl fmt::Display for PolicyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyConfig::SieveSize(config) => write!(f, "{}:{}", self.name(), config),
            _ => f.write_str(self.name()),
        }
    }
}

/// Configuration for a [`Cache`](crate::Cache).
///
/// # Examples
///
/// ```
/// use sieve_size::config::{CacheConfig, PolicyConfig};
/// use core::num::NonZeroU64;
///
/// let config = CacheConfig::new(NonZeroU64::new(4096).unwrap()).with_policy(PolicyConfig::Sieve);
/// assert_eq!(config.cache_size.get(), 4096);
/// ```
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Byte budget for resident objects.
    pub cache_size: NonZeroU64,
    /// Eviction policy, size-aware SIEVE by default.
    pub policy: PolicyConfig,
}

impl CacheConfig {
    pub fn new(cache_size: NonZeroU64) -> Self {
        Self {
            cache_size,
            policy: PolicyConfig::default(),
        }
    }

    pub fn with_policy(mut self, policy: PolicyConfig) -> Self {
        self.policy = policy;
        self
    }
}

impl fmt::Debug for CacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheConfig")
            .field("cache_size", &self.cache_size)
            .field("policy", &self.policy)
            .finish()
    }
}
