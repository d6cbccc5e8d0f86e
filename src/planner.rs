//! Dynamic capacity planning.
//!
//! Before every request the planner looks at the recent mix of large and
//! small requests and shifts capacity between the tiers:
//!
//! - many large requests: `lq += step`, `s -= step / 2`, `m -= step / 2`
//! - otherwise many small requests: `lq -= step`, `s += step / 2`, `m += step / 2`
//! - otherwise: unchanged
//!
//! Ratios are then floored at [`MIN_TIER_RATIO`], renormalized to sum to one
//! and turned into byte budgets. The policy resizes its tiers and evicts
//! until each one is back under budget.

use crate::config::PlannerConfig;
use std::collections::VecDeque;

/// No tier's fraction of capacity is allowed below this.
pub const MIN_TIER_RATIO: f64 = 0.01;

/// Fractions of total capacity for the resident tiers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierRatios {
    /// Small tier fraction.
    pub small: f64,
    /// Main tier fraction.
    pub main: f64,
    /// Large tier fraction.
    pub large: f64,
}

impl TierRatios {
    /// Create normalized ratios.
    pub fn new(small: f64, main: f64, large: f64) -> Self {
        let mut ratios = Self { small, main, large };
        ratios.normalize();
        ratios
    }

    /// Sum of the three fractions.
    #[inline]
    pub fn sum(&self) -> f64 {
        self.small + self.main + self.large
    }

    /// Floor every fraction at [`MIN_TIER_RATIO`] and rescale to sum to one.
    pub fn normalize(&mut self) {
        self.small = self.small.max(MIN_TIER_RATIO);
        self.main = self.main.max(MIN_TIER_RATIO);
        self.large = self.large.max(MIN_TIER_RATIO);

        let total = self.sum();
        self.small /= total;
        self.main /= total;
        self.large /= total;
    }

    /// Byte budgets for a cache of `capacity` bytes.
    ///
    /// Each budget is rounded down so the budgets never sum past `capacity`.
    pub fn budgets(&self, capacity: u64) -> TierBudgets {
        let budget = |ratio: f64| (capacity as f64 * ratio) as u64;
        TierBudgets {
            small: budget(self.small),
            main: budget(self.main),
            large: budget(self.large),
        }
    }
}

/// Byte budgets for the resident tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierBudgets {
    /// Small tier budget.
    pub small: u64,
    /// Main tier budget.
    pub main: u64,
    /// Large tier budget.
    pub large: u64,
}

impl TierBudgets {
    /// Sum of the three budgets.
    pub fn total(&self) -> u64 {
        self.small + self.main + self.large
    }
}

/// Source of the workload signals the planner reacts to.
pub trait WorkloadSignals {
    /// Number of recent large-object requests.
    fn recent_large_requests(&self) -> f64;

    /// Number of recent small-object requests.
    fn recent_small_requests(&self) -> f64;
}

/// Sliding window over the last N requests, counting large and small ones.
#[derive(Debug, Clone)]
pub struct RequestWindow {
    window: VecDeque<bool>,
    capacity: usize,
    large: usize,
}

impl RequestWindow {
    /// Create a window covering the last `capacity` requests.
    ///
    /// Storage grows with the requests recorded, not with `capacity`.
    pub fn new(capacity: usize) -> Self {
        Self {
            window: VecDeque::new(),
            capacity,
            large: 0,
        }
    }

    /// Record one request.
    pub fn record(&mut self, is_large: bool) {
        if self.capacity == 0 {
            return;
        }
        if self.window.len() == self.capacity
            && let Some(evicted) = self.window.pop_front()
            && evicted
        {
            self.large -= 1;
        }
        self.window.push_back(is_large);
        if is_large {
            self.large += 1;
        }
    }

    /// Number of requests currently in the window.
    pub fn len(&self) -> usize {
        self.window.len()
    }

    /// Returns `true` if no requests have been recorded.
    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }
}

impl WorkloadSignals for RequestWindow {
    fn recent_large_requests(&self) -> f64 {
        self.large as f64
    }

    fn recent_small_requests(&self) -> f64 {
        (self.window.len() - self.large) as f64
    }
}

/// Signals captured at one point in time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalSnapshot {
    /// Recent large-object requests.
    pub large: f64,
    /// Recent small-object requests.
    pub small: f64,
}

impl SignalSnapshot {
    /// Read the current values from `signals`.
    pub fn capture<S: WorkloadSignals + ?Sized>(signals: &S) -> Self {
        Self {
            large: signals.recent_large_requests(),
            small: signals.recent_small_requests(),
        }
    }
}

impl WorkloadSignals for SignalSnapshot {
    fn recent_large_requests(&self) -> f64 {
        self.large
    }

    fn recent_small_requests(&self) -> f64 {
        self.small
    }
}

/// Direction of a planner pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjustment {
    /// Large tier grew.
    GrowLarge,
    /// Large tier shrank in favor of Small and Main.
    ShrinkLarge,
    /// Signals below both high-water marks.
    Unchanged,
}

/// The capacity planner feedback rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapacityPlanner {
    config: PlannerConfig,
}

impl CapacityPlanner {
    /// Create a planner.
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    /// The planner's tuning.
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Adjust `ratios` in place from the current signals. Ratios are always
    /// renormalized, even when unchanged.
    pub fn adjust<S: WorkloadSignals + ?Sized>(
        &self,
        ratios: &mut TierRatios,
        signals: &S,
    ) -> Adjustment {
        let step = self.config.step;

        let adjustment = if signals.recent_large_requests() > self.config.large_threshold {
            ratios.large += step;
            ratios.small -= step / 2.0;
            ratios.main -= step / 2.0;
            Adjustment::GrowLarge
        } else if signals.recent_small_requests() > self.config.small_threshold {
            ratios.large -= step;
            ratios.small += step / 2.0;
            ratios.main += step / 2.0;
            Adjustment::ShrinkLarge
        } else {
            Adjustment::Unchanged
        };

        ratios.normalize();
        adjustment
    }
}
