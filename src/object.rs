//! Requests and the entries held by each tier.
//!
//! - [`Request`]: one access presented by the simulator
//! - [`CacheObject`]: a resident object (Small, Main or Large)
//! - [`GhostEntry`]: identity-only record of an object demoted to the ghost index
//! - [`TierEntry`]: what a [`crate::FifoTier`] needs to know about its entries

/// Object identifier.
pub type ObjId = u64;

/// Saturating access-frequency counter.
pub type Frequency = u8;

/// A single access request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Request {
    /// Object identifier.
    pub id: ObjId,
    /// Object size in bytes. Must be non-zero to be admitted.
    pub size: u64,
    /// Cost of recomputing the object if it is evicted.
    pub reload_cost: f64,
}

impl Request {
    /// Create a request with no reload cost.
    pub fn new(id: ObjId, size: u64) -> Self {
        Self {
            id,
            size,
            reload_cost: 0.0,
        }
    }

    /// Set the reload cost.
    pub fn with_reload_cost(mut self, reload_cost: f64) -> Self {
        self.reload_cost = reload_cost;
        self
    }
}

/// An object resident in one of the Small, Main or Large tiers.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheObject {
    id: ObjId,
    size: u64,
    freq: Frequency,
    reload_cost: f64,
}

impl CacheObject {
    /// Create a freshly admitted object. Frequency starts at zero.
    pub fn new(request: &Request) -> Self {
        Self {
            id: request.id,
            size: request.size,
            freq: 0,
            reload_cost: request.reload_cost,
        }
    }

    /// Object identifier.
    #[inline]
    pub fn id(&self) -> ObjId {
        self.id
    }

    /// Size in bytes.
    #[inline]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Current access frequency.
    #[inline]
    pub fn frequency(&self) -> Frequency {
        self.freq
    }

    /// Reload cost recorded at admission.
    #[inline]
    pub fn reload_cost(&self) -> f64 {
        self.reload_cost
    }

    /// Record a hit. Saturates rather than wrapping.
    #[inline]
    pub fn record_hit(&mut self) {
        self.freq = self.freq.saturating_add(1);
    }

    pub(crate) fn set_frequency(&mut self, freq: Frequency) {
        self.freq = freq;
    }

    /// The same object with its frequency reset, as used on promotion.
    pub(crate) fn reset(mut self) -> Self {
        self.freq = 0;
        self
    }
}

/// Identity of an object recently evicted without promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GhostEntry {
    /// Object identifier.
    pub id: ObjId,
    /// Size of the object when it was evicted; charged against ghost capacity.
    pub size: u64,
}

impl From<&CacheObject> for GhostEntry {
    fn from(obj: &CacheObject) -> Self {
        Self {
            id: obj.id,
            size: obj.size,
        }
    }
}

/// An entry that can be stored in a [`crate::FifoTier`].
pub trait TierEntry {
    /// Key used by the tier's index.
    fn id(&self) -> ObjId;

    /// Bytes charged against the tier's capacity.
    fn size(&self) -> u64;
}

impl TierEntry for CacheObject {
    #[inline]
    fn id(&self) -> ObjId {
        self.id
    }

    #[inline]
    fn size(&self) -> u64 {
        self.size
    }
}

impl TierEntry for GhostEntry {
    #[inline]
    fn id(&self) -> ObjId {
        self.id
    }

    #[inline]
    fn size(&self) -> u64 {
        self.size
    }
}
