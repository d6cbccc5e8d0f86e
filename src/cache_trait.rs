//! Eviction policy trait for the replay driver.
//!
//! This is the operation set a trace-replay simulator uses to drive a
//! policy: the full per-request `get`, plus the lower-level steps it is
//! built from for simulators that do their own dispatch.
//!
//! Policies are driven one request at a time and take `&mut self`; there is
//! no internal synchronization.

use crate::error::PolicyResult;
use crate::object::{CacheObject, ObjId, Request};

/// Trait for cache admission and eviction policies.
pub trait EvictionPolicy {
    /// Display name of the configured policy.
    fn name(&self) -> String;

    /// Process one request end to end.
    ///
    /// Returns `Ok(true)` on a hit. On a miss the object is admitted if it
    /// can be, evicting as needed, and `Ok(false)` is returned.
    fn get(&mut self, request: &Request) -> PolicyResult<bool>;

    /// Look up a resident object. With `mutate`, a hit records an access
    /// and a ghost hit is remembered for the following admission.
    fn find(&mut self, request: &Request, mutate: bool) -> Option<&CacheObject>;

    /// Admit a missed object. The caller must have made room first.
    fn insert(&mut self, request: &Request) -> PolicyResult<&CacheObject>;

    /// Run one eviction step on every tier that is over its budget.
    ///
    /// Returns the number of objects that left their tier.
    fn evict(&mut self) -> usize;

    /// The next object that would be evicted.
    ///
    /// Not every policy can answer this without performing the eviction.
    fn to_evict(&self) -> PolicyResult<&CacheObject>;

    /// Remove an object from the cache, including any ghost record.
    ///
    /// Returns `true` if anything was removed.
    fn remove(&mut self, id: ObjId) -> bool;

    /// Bytes held by resident objects.
    fn occupied_bytes(&self) -> u64;

    /// Number of resident objects.
    fn object_count(&self) -> usize;

    /// Returns `true` if the object could ever fit in its destination tier.
    fn can_insert(&self, request: &Request) -> bool;
}
