//! Retention scoring.
//!
//! `score = alpha * freq - beta * ln(size) + gamma * reload_cost`
//!
//! Frequently hit, small, expensive-to-reload objects score high and are
//! kept; large, cold, cheap objects score low and are demoted.

use crate::config::PolicyConfig;
use crate::eviction::ItemFate;
use crate::object::CacheObject;
use crate::router::TierId;

/// Weighted retention scorer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetentionScorer {
    /// Weight of access frequency.
    pub alpha: f64,
    /// Weight of `ln(size)`.
    pub beta: f64,
    /// Weight of reload cost.
    pub gamma: f64,
    /// Scores at or above this keep the object.
    pub threshold: f64,
}

impl RetentionScorer {
    /// Create a scorer from explicit weights.
    pub fn new(alpha: f64, beta: f64, gamma: f64, threshold: f64) -> Self {
        Self {
            alpha,
            beta,
            gamma,
            threshold,
        }
    }

    /// Create a scorer from the policy configuration.
    pub fn from_config(config: &PolicyConfig) -> Self {
        Self::new(config.alpha, config.beta, config.gamma, config.score_threshold)
    }

    /// Compute the retention score.
    ///
    /// Size must be non-zero; zero-size objects are rejected at admission.
    #[inline]
    pub fn score(&self, obj: &CacheObject) -> f64 {
        debug_assert!(obj.size() > 0, "scored a zero-size object");
        self.alpha * obj.frequency() as f64 - self.beta * (obj.size() as f64).ln()
            + self.gamma * obj.reload_cost()
    }

    /// Returns `true` if the object should be promoted or retained.
    #[inline]
    pub fn retains(&self, obj: &CacheObject) -> bool {
        self.score(obj) >= self.threshold
    }

    /// Decide the fate of an eviction candidate taken from `tier`.
    pub fn fate(&self, obj: &CacheObject, tier: TierId) -> ItemFate {
        match (self.retains(obj), tier) {
            (false, _) => ItemFate::Ghost,
            (true, TierId::Main) => ItemFate::Retain,
            (true, TierId::Small | TierId::Large) => ItemFate::Promote,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::Request;

    fn object(size: u64, hits: u8, reload_cost: f64) -> CacheObject {
        let mut obj = CacheObject::new(&Request::new(1, size).with_reload_cost(reload_cost));
        for _ in 0..hits {
            obj.record_hit();
        }
        obj
    }

    #[test]
    fn test_score_formula() {
        let scorer = RetentionScorer::new(1.0, 0.5, 2.0, 5.0);

        // 1*1 - 0.5*ln(50) + 0 = -0.956...
        let score = scorer.score(&object(50, 1, 0.0));
        assert!((score - (1.0 - 0.5 * 50f64.ln())).abs() < 1e-12);
        assert!(score < -0.95 && score > -0.96);

        // size 1 contributes nothing
        let score = scorer.score(&object(1, 3, 1.0));
        assert!((score - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let scorer = RetentionScorer::new(1.0, 0.0, 0.0, 2.0);
        assert!(!scorer.retains(&object(10, 1, 0.0)));
        assert!(scorer.retains(&object(10, 2, 0.0)));
    }

    #[test]
    fn test_fate_per_tier() {
        let scorer = RetentionScorer::new(1.0, 0.5, 2.0, 5.0);
        let hot = object(1, 10, 0.0);
        let cold = object(4096, 0, 0.0);

        assert_eq!(scorer.fate(&hot, TierId::Small), ItemFate::Promote);
        assert_eq!(scorer.fate(&hot, TierId::Large), ItemFate::Promote);
        assert_eq!(scorer.fate(&hot, TierId::Main), ItemFate::Retain);

        assert_eq!(scorer.fate(&cold, TierId::Small), ItemFate::Ghost);
        assert_eq!(scorer.fate(&cold, TierId::Main), ItemFate::Ghost);
        assert_eq!(scorer.fate(&cold, TierId::Large), ItemFate::Ghost);
    }

    #[test]
    fn test_reload_cost_rescues_large_objects() {
        let scorer = RetentionScorer::new(1.0, 0.5, 2.0, 5.0);
        assert!(!scorer.retains(&object(1 << 20, 0, 0.0)));
        assert!(scorer.retains(&object(1 << 20, 0, 10.0)));
    }

    #[test]
    fn test_from_config() {
        let config = PolicyConfig::new()
            .with_weights(2.0, 1.0, 0.5)
            .with_score_threshold(1.0);
        let scorer = RetentionScorer::from_config(&config);
        assert_eq!(scorer, RetentionScorer::new(2.0, 1.0, 0.5, 1.0));
    }
}
