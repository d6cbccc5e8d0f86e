//! Policy statistics.
//!
//! The policy is driven by one request at a time, so these are plain
//! counters owned by the policy instance rather than shared atomics.

/// Counters describing how objects moved through the tiers.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PolicyMetrics {
    /// Objects admitted into the Small tier.
    pub n_obj_admit_to_small: u64,
    /// Bytes admitted into the Small tier.
    pub n_byte_admit_to_small: u64,
    /// Objects admitted into the Large tier.
    pub n_obj_admit_to_large: u64,
    /// Bytes admitted into the Large tier.
    pub n_byte_admit_to_large: u64,
    /// Objects admitted directly into Main after a ghost hit.
    pub n_obj_admit_to_main: u64,
    /// Bytes admitted directly into Main after a ghost hit.
    pub n_byte_admit_to_main: u64,
    /// Objects promoted from Small or Large into Main.
    pub n_obj_move_to_main: u64,
    /// Bytes promoted from Small or Large into Main.
    pub n_byte_move_to_main: u64,
    /// Lookups that found the id in the ghost index.
    pub ghost_hits: u64,
    /// Objects demoted to the ghost index.
    pub demoted_to_ghost: u64,
    /// Main-tier candidates decayed and re-queued.
    pub main_retained: u64,
    /// Main-tier candidates demoted despite a passing score after a full sweep.
    pub main_forced_demotions: u64,
    /// Planner passes that changed the tier ratios.
    pub planner_adjustments: u64,
}

impl PolicyMetrics {
    /// Create zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total objects admitted on a miss, across all tiers.
    pub fn admissions(&self) -> u64 {
        self.n_obj_admit_to_small + self.n_obj_admit_to_large + self.n_obj_admit_to_main
    }

    /// Fraction of admissions that went straight to Main (0.0 - 1.0).
    pub fn ghost_admission_ratio(&self) -> f64 {
        let total = self.admissions();
        if total == 0 {
            0.0
        } else {
            self.n_obj_admit_to_main as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_default() {
        let metrics = PolicyMetrics::new();
        assert_eq!(metrics.admissions(), 0);
        assert_eq!(metrics.ghost_admission_ratio(), 0.0);
    }

    #[test]
    fn test_ghost_admission_ratio() {
        let metrics = PolicyMetrics {
            n_obj_admit_to_small: 6,
            n_obj_admit_to_large: 2,
            n_obj_admit_to_main: 2,
            ..Default::default()
        };
        assert_eq!(metrics.admissions(), 10);
        assert!((metrics.ghost_admission_ratio() - 0.2).abs() < f64::EPSILON);
    }
}
