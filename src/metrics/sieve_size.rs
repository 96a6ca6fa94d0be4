//! SIEVE-size Policy Metrics
//!
//! Counters specific to the size-aware SIEVE eviction policy. They describe how
//! much work each eviction does and how often the size window overrides the
//! plain SIEVE choice.

extern crate alloc;

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};

/// SIEVE-size-specific metrics.
///
/// These are policy-level counters only; the request pipeline keeps the
/// [`CoreCacheMetrics`](super::CoreCacheMetrics) and merges both maps when
/// reporting.
#[derive(Debug, Default, Clone)]
pub struct SieveSizeMetrics {
    /// Visited counters decremented by the aging scan
    pub aging_steps: u64,

    /// Records inspected by the victim window
    pub window_scans: u64,

    /// Evictions where the window picked a record other than the first
    /// unvisited one
    pub size_driven_evictions: u64,

    /// Times the aging scan passed the head and continued from the tail
    pub hand_wraps: u64,

    /// Out-of-band removals handled by the policy
    pub removals: u64,
}

impl SieveSizeMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one completed eviction.
    ///
    /// # Arguments
    /// * `aging_steps` - Visited counters decremented before the stop record was found
    /// * `window_scans` - Records inspected by the window
    /// * `wraps` - Head-to-tail wraps taken during aging
    /// * `size_driven` - Whether the victim differs from the stop record
    pub fn record_eviction(
        &mut self,
        aging_steps: u64,
        window_scans: u64,
        wraps: u64,
        size_driven: bool,
    ) {
        self.aging_steps += aging_steps;
        self.window_scans += window_scans;
        self.hand_wraps += wraps;
        if size_driven {
            self.size_driven_evictions += 1;
        }
    }

    pub fn record_removal(&mut self) {
        self.removals += 1;
    }

    /// Converts the counters to a BTreeMap, keys prefixed with `sieve_size_`.
    pub fn to_btreemap(&self) -> BTreeMap<String, f64> {
        let mut metrics = BTreeMap::new();
        metrics.insert(
            "sieve_size_aging_steps".to_string(),
            self.aging_steps as f64,
        );
        metrics.insert(
            "sieve_size_hand_wraps".to_string(),
            self.hand_wraps as f64,
        );
        metrics.insert("sieve_size_removals".to_string(), self.removals as f64);
        metrics.insert(
            "sieve_size_size_driven_evictions".to_string(),
            self.size_driven_evictions as f64,
        );
        metrics.insert(
            "sieve_size_window_scans".to_string(),
            self.window_scans as f64,
        );
        metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_eviction_accumulates() {
        let mut metrics = SieveSizeMetrics::new();
        metrics.record_eviction(3, 2, 1, true);
        metrics.record_eviction(0, 2, 0, false);
        metrics.record_removal();

        assert_eq!(metrics.aging_steps, 3);
        assert_eq!(metrics.window_scans, 4);
        assert_eq!(metrics.hand_wraps, 1);
        assert_eq!(metrics.size_driven_evictions, 1);

        let map = metrics.to_btreemap();
        assert_eq!(map.get("sieve_size_removals"), Some(&1.0));
        assert_eq!(map.len(), 5);
    }
}
