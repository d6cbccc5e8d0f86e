//! Weighted, size-aware S3-FIFO eviction policy for cache simulation.
//!
//! The policy decides admission and eviction for a byte-bounded cache that
//! is driven one request at a time by a trace-replay simulator.
//!
//! # Architecture
//!
//! ```text
//! +------------------------------------------------------+
//! |                   WeightedS3Fifo                     |
//! |                                                      |
//! |  request -> RequestWindow -> CapacityPlanner         |
//! |                                   |                  |
//! |                          resize tier budgets         |
//! |                                   |                  |
//! |  lookup:  Small -> Main -> Large -> Ghost            |
//! |                                   |                  |
//! |  miss:    Router (ghost hit? size threshold?)        |
//! |             |            |             |             |
//! |             v            v             v             |
//! |  +-----------+   +-------------+   +-----------+     |
//! |  | Small     |-->| Main        |<--| Large     |     |
//! |  | FifoTier  |   | FifoTier    |   | FifoTier  |     |
//! |  +-----------+   +-------------+   +-----------+     |
//! |        |          ^     |                |           |
//! |        |          +-----+ retain         |           |
//! |        v                v                v           |
//! |  +------------------------------------------------+  |
//! |  | Ghost (ids + sizes of evicted objects)         |  |
//! |  +------------------------------------------------+  |
//! +------------------------------------------------------+
//! ```
//!
//! # Retention Score
//!
//! Each eviction candidate is scored as
//! `alpha * frequency - beta * ln(size) + gamma * reload_cost`. Candidates at
//! or above the score threshold survive: Small and Large promote them into
//! Main, Main decays their frequency and re-queues them. Everything else is
//! dropped and remembered in the ghost index.
//!
//! # Example
//!
//! ```
//! use weighted_s3fifo::{Request, WeightedS3Fifo};
//!
//! let mut policy = WeightedS3Fifo::from_params(1000, "size-threshold=100").unwrap();
//!
//! assert!(!policy.get(&Request::new(1, 50)).unwrap()); // miss, admitted to Small
//! assert!(policy.get(&Request::new(1, 50)).unwrap()); // hit
//! assert!(!policy.get(&Request::new(2, 150)).unwrap()); // miss, admitted to Large
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod cache_trait;
mod config;
mod error;
mod eviction;
mod fifo_queue;
mod metrics;
mod object;
mod planner;
mod router;
mod s3fifo_policy;
mod tier;

pub use cache_trait::EvictionPolicy;
pub use config::{
    DEFAULT_PARAMS, DEFAULT_SCORE_THRESHOLD, FrequencyDecay, MAX_PLANNER_WINDOW, POLICY_NAME,
    ParsedParams, PlannerConfig, PolicyConfig,
};
pub use error::{ConfigError, PolicyError, PolicyResult};
pub use eviction::{ItemFate, RetentionScorer};
pub use fifo_queue::FifoTier;
pub use metrics::PolicyMetrics;
pub use object::{CacheObject, Frequency, GhostEntry, ObjId, Request, TierEntry};
pub use planner::{
    Adjustment, CapacityPlanner, MIN_TIER_RATIO, RequestWindow, SignalSnapshot, TierBudgets,
    TierRatios, WorkloadSignals,
};
pub use router::{Router, TierId};
pub use s3fifo_policy::WeightedS3Fifo;
pub use tier::BoundedTier;
