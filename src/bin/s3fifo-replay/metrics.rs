//! Replay metrics.

use metriken::{AtomicHistogram, Counter, metric};

#[metric(name = "replay_requests", description = "Total requests replayed")]
pub static REQUESTS: Counter = Counter::new();

#[metric(name = "replay_hits", description = "Requests served from the cache")]
pub static HITS: Counter = Counter::new();

#[metric(name = "replay_misses", description = "Requests not served from the cache")]
pub static MISSES: Counter = Counter::new();

#[metric(
    name = "replay_rejected",
    description = "Misses too large for their destination tier"
)]
pub static REJECTED: Counter = Counter::new();

#[metric(name = "replay_bytes_requested", description = "Total bytes requested")]
pub static BYTES_REQUESTED: Counter = Counter::new();

#[metric(name = "replay_bytes_missed", description = "Bytes of missed requests")]
pub static BYTES_MISSED: Counter = Counter::new();

#[metric(
    name = "replay_object_size",
    description = "Requested object size histogram (bytes)"
)]
pub static OBJECT_SIZE: AtomicHistogram = AtomicHistogram::new(7, 64);
