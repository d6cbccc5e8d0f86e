//! Eviction outcome definitions.

/// Decision for an eviction candidate.
///
/// Every overflow check picks the oldest object of the tier and applies
/// the retention score to decide which of these happens to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemFate {
    /// Move to the Main tier with a fresh frequency.
    ///
    /// Used for Small and Large candidates that earned their place.
    Promote,

    /// Stay in Main: decay frequency and re-queue at the tail.
    ///
    /// Approximates one step of a clock sweep. Frees no space.
    Retain,

    /// Leave the cache, keeping only the id in the ghost index.
    Ghost,
}

impl ItemFate {
    /// Returns `true` if the candidate leaves its tier.
    #[inline]
    pub fn frees_space(&self) -> bool {
        !matches!(self, Self::Retain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_fate_frees_space() {
        assert!(ItemFate::Promote.frees_space());
        assert!(ItemFate::Ghost.frees_space());
        assert!(!ItemFate::Retain.frees_space());
    }
}
