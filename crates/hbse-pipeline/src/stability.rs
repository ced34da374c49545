//! High-betweenness set comparison and convergence tracking.
//!
//! The per-cycle delta is directional: it counts ids that entered the set
//! and ignores ids that left, approximating "how much new information the
//! cycle added". A run converges once the delta stays within the cutoff
//! for a target number of consecutive cycles.

use hbse_core::types::VertexId;
use std::collections::HashSet;

/// Counts ids present in `new` but absent from `old`.
pub fn set_delta(old: &HashSet<VertexId>, new: &HashSet<VertexId>) -> usize {
    new.iter().filter(|id| !old.contains(id)).count()
}

/// Outcome of observing one cycle's delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stability {
    /// The counter reached its target; the run is converged.
    Converged,
    /// Delta within the cutoff, counter still climbing.
    Holding(u32),
    /// Delta exceeded the cutoff; the counter was reset to zero.
    Reset,
}

/// Running convergence counter over successive cycle deltas.
#[derive(Debug, Clone)]
pub struct StabilityTracker {
    cutoff: usize,
    target: u32,
    consecutive: u32,
}

impl StabilityTracker {
    pub fn new(cutoff: usize, target: u32) -> Self {
        Self {
            cutoff,
            target,
            consecutive: 0,
        }
    }

    /// Feeds one cycle's delta into the counter.
    pub fn observe(&mut self, delta: usize) -> Stability {
        if delta <= self.cutoff {
            self.consecutive += 1;
            if self.consecutive >= self.target {
                Stability::Converged
            } else {
                Stability::Holding(self.consecutive)
            }
        } else {
            self.consecutive = 0;
            Stability::Reset
        }
    }

    pub fn counter(&self) -> u32 {
        self.consecutive
    }

    pub fn cutoff(&self) -> usize {
        self.cutoff
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(slice: &[VertexId]) -> HashSet<VertexId> {
        slice.iter().copied().collect()
    }

    #[test]
    fn delta_counts_only_new_arrivals() {
        assert_eq!(set_delta(&ids(&[1, 2, 3]), &ids(&[2, 3, 4, 5])), 2);
    }

    #[test]
    fn delta_ignores_removals() {
        assert_eq!(set_delta(&ids(&[1, 2, 3]), &ids(&[1])), 0);
    }

    #[test]
    fn delta_from_empty_counts_everything() {
        assert_eq!(set_delta(&ids(&[]), &ids(&[7, 8])), 2);
    }

    #[test]
    fn converges_after_target_consecutive_stable_cycles() {
        let mut tracker = StabilityTracker::new(0, 2);
        assert_eq!(tracker.observe(0), Stability::Holding(1));
        assert_eq!(tracker.observe(0), Stability::Converged);
    }

    #[test]
    fn unstable_cycle_resets_the_counter() {
        let mut tracker = StabilityTracker::new(0, 2);
        assert_eq!(tracker.observe(0), Stability::Holding(1));
        assert_eq!(tracker.observe(1), Stability::Reset);
        assert_eq!(tracker.counter(), 0);
        assert_eq!(tracker.observe(0), Stability::Holding(1));
        assert_eq!(tracker.observe(0), Stability::Converged);
    }

    #[test]
    fn cutoff_tolerates_small_deltas() {
        let mut tracker = StabilityTracker::new(2, 1);
        assert_eq!(tracker.observe(2), Stability::Converged);
    }
}
