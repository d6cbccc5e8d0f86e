//! Eviction decisions.
//!
//! This module defines the pieces the eviction coordinator combines:
//!
//! - [`RetentionScorer`]: Weighted score of frequency, size and reload cost
//! - [`ItemFate`]: What happens to an eviction candidate
//!
//! # Tier Disciplines
//!
//! - **Small / Large**: Candidate scoring at or above the threshold is
//!   promoted to Main, otherwise its id goes to the ghost index
//! - **Main**: Candidate scoring at or above the threshold has its frequency
//!   decayed and is re-queued at the tail, otherwise its id goes to the ghost index

mod policy;
mod score;

pub use policy::ItemFate;
pub use score::RetentionScorer;
