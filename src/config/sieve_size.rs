//! Configuration for the size-aware SIEVE policy.
//!
//! The only knob is the eviction window: how many objects, starting at the
//! first unvisited one, are compared by size on every eviction. A window of 1
//! degenerates to plain SIEVE victim choice. Windows larger than the number of
//! cached objects are fine; the scan wraps around the queue and revisits
//! objects, which cannot change the pick.
//!
//! # Examples
//!
//! ```
//! use sieve_size::config::SieveSizeConfig;
//!
//! let config: SieveSizeConfig = "eviction-window-size=32".parse().unwrap();
//! assert_eq!(config.eviction_window_size.get(), 32);
//! assert_eq!(config.to_string(), "eviction-window-size=32");
//!
//! assert!("eviction-window-size=0".parse::<SieveSizeConfig>().is_err());
//! ```

use super::parse_params;
use crate::error::ConfigError;
use core::fmt;
use core::num::NonZeroUsize;
use core::str::FromStr;

/// Configuration for a [`SieveSize`](crate::policy::SieveSize) policy.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct SieveSizeConfig {
    /// Number of objects compared by size per eviction. Fixed once the policy
    /// is built.
    pub eviction_window_size: NonZeroUsize,
}

impl SieveSizeConfig {
    pub const DEFAULT_EVICTION_WINDOW_SIZE: NonZeroUsize = match NonZeroUsize::new(100) {
        Some(n) => n,
        None => unreachable!(),
    };

    pub fn new(eviction_window_size: NonZeroUsize) -> Self {
        Self {
            eviction_window_size,
        }
    }
}

impl Default for SieveSizeConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_EVICTION_WINDOW_SIZE)
    }
}

impl FromStr for SieveSizeConfig {
    type Err = ConfigError;

    /// Parses a parameter string such as `eviction-window-size=50`.
    /// Unset parameters keep their defaults; an empty string is the default.
    fn from_str(params: &str) -> Result<Self, Self::Err> {
        let mut config = Self::default();
        for param in parse_params(params)? {
            match param.key.as_str() {
                "eviction-window-size" => {
                    let size: usize =
                        param
                            .value
                            .parse()
                            .map_err(|_| ConfigError::InvalidValue {
                                key: param.raw_key.into(),
                                value: param.value.into(),
                            })?;
                    config.eviction_window_size =
                        NonZeroUsize::new(size).ok_or(ConfigError::ZeroWindow)?;
                }
                _ => {
                    return Err(ConfigError::UnknownParameter {
                        policy: "Sieve_size",
                        key: param.raw_key.into(),
                    })
                }
            }
        }
        Ok(config)
    }
}

impl fmt::Display for SieveSizeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "eviction-window-size={}", self.eviction_window_size)
    }
}

impl fmt::Debug for SieveSizeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SieveSizeConfig")
            .field("eviction_window_size", &self.eviction_window_size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_default_window() {
        let config = SieveSizeConfig::default();
        assert_eq!(config.eviction_window_size.get(), 100);
        assert_eq!("".parse::<SieveSizeConfig>(), Ok(config));
    }

    #[test]
    fn test_parse_is_case_and_separator_insensitive() {
        for params in [
            "eviction-window-size=8",
            "EVICTION_WINDOW_SIZE=8",
            " eviction_window-size = 8 ",
        ] {
            let config: SieveSizeConfig = params.parse().unwrap();
            assert_eq!(config.eviction_window_size.get(), 8, "{params}");
        }
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            "eviction-window-size=0".parse::<SieveSizeConfig>(),
            Err(ConfigError::ZeroWindow)
        );
        assert_eq!(
            "eviction-window-size=-3".parse::<SieveSizeConfig>(),
            Err(ConfigError::InvalidValue {
                key: "eviction-window-size".into(),
                value: "-3".into(),
            })
        );
        assert_eq!(
            "window=3".parse::<SieveSizeConfig>(),
            Err(ConfigError::UnknownParameter {
                policy: "Sieve_size",
                key: "window".into(),
            })
        );
    }

    #[test]
    fn test_display_round_trip() {
        let config = SieveSizeConfig::new(NonZeroUsize::new(12).unwrap());
        let printed = config.to_string();
        assert_eq!(printed, "eviction-window-size=12");
        assert_eq!(printed.parse::<SieveSizeConfig>(), Ok(config));
    }
}
