//! Admission routing.
//!
//! A missed object is placed in one of three tiers:
//!
//! ```text
//!               ghost hit?
//!              /          \
//!           yes            no
//!            |              |
//!          Main      size > threshold?
//!                      /          \
//!                   yes            no
//!                    |              |
//!                  Large          Small
//! ```

use std::fmt;

/// One of the resident tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TierId {
    /// Probationary queue for small objects.
    Small,
    /// Long-term queue.
    Main,
    /// Probationary queue for large objects.
    Large,
}

impl TierId {
    /// Overflow checks run in this order.
    pub const ALL: [TierId; 3] = [TierId::Small, TierId::Main, TierId::Large];
}

impl fmt::Display for TierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Small => write!(f, "small"),
            Self::Main => write!(f, "main"),
            Self::Large => write!(f, "large"),
        }
    }
}

/// Classifies objects by size and picks their admission tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Router {
    size_threshold: Option<u64>,
}

impl Router {
    /// Create a router. `None` treats every object as small.
    pub fn new(size_threshold: Option<u64>) -> Self {
        Self { size_threshold }
    }

    /// Returns `true` if an object of `size` bytes belongs to the Large tier.
    #[inline]
    pub fn is_large(&self, size: u64) -> bool {
        self.size_threshold.is_some_and(|threshold| size > threshold)
    }

    /// Destination tier for an object that is not resident.
    #[inline]
    pub fn route(&self, size: u64, ghost_hit: bool) -> TierId {
        if ghost_hit {
            TierId::Main
        } else if self.is_large(size) {
            TierId::Large
        } else {
            TierId::Small
        }
    }
}
