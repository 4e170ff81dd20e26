//! Rank allocation for sibling ordering.
//!
//! Ranks are plain `f64` sort keys. New ranks are derived from the neighbours of
//! the target slot only, so an insertion never rewrites other siblings unless the
//! gap between two neighbours has been exhausted.

use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Distance between consecutive ranks produced by append/prepend.
pub const STEP: f64 = 100.0;

/// Rank of the first node placed into an empty sibling set.
pub const BASE_RANK: f64 = 100.0;

/// Smallest gap still considered usable for a midpoint insertion.
pub const MIN_GAP: f64 = 1e-9;

/// Rank directly after `a`.
pub fn compute_rank_after(a: f64) -> f64 {
    a + STEP
}

/// Rank directly before `a`.
pub fn compute_rank_before(a: f64) -> f64 {
    a - STEP
}

/// Rank halfway between `a` and `b`.
pub fn compute_middle_rank(a: f64, b: f64) -> f64 {
    (a + b) / 2.0
}

/// Rank allocator carrying configured spacing values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankAllocator {
    pub step: f64,
    pub base_rank: f64,
    pub min_gap: f64,
}

impl Default for RankAllocator {
    fn default() -> Self {
        Self {
            step: STEP,
            base_rank: BASE_RANK,
            min_gap: MIN_GAP,
        }
    }
}

impl RankAllocator {
    pub fn new(step: f64, base_rank: f64, min_gap: f64) -> Self {
        Self {
            step,
            base_rank,
            min_gap,
        }
    }

    pub fn after(&self, a: f64) -> f64 {
        a + self.step
    }

    pub fn before(&self, a: f64) -> f64 {
        a - self.step
    }

    pub fn middle(&self, a: f64, b: f64) -> f64 {
        compute_middle_rank(a, b)
    }

    /// Picks a rank for the slot between `prev` and `next`.
    ///
    /// Returns `None` when both neighbours exist but the gap between them is too
    /// small to hold a distinct value. Callers renormalize the sibling set and retry.
    #[instrument(level = "trace", skip(self))]
    pub fn rank_for_slot(&self, prev: Option<f64>, next: Option<f64>) -> Option<f64> {
        match (prev, next) {
            (None, None) => Some(self.base_rank),
            (Some(a), None) => Some(self.after(a)),
            (None, Some(b)) => Some(self.before(b)),
            (Some(a), Some(b)) => {
                if b - a < self.min_gap {
                    return None;
                }
                let mid = self.middle(a, b);
                (a < mid && mid < b).then_some(mid)
            }
        }
    }

    /// Evenly spaced ranks for `count` siblings, starting at the base rank.
    pub fn renormalize(&self, count: usize) -> Vec<f64> {
        (0..count)
            .map(|i| self.base_rank + self.step * i as f64)
            .collect()
    }
}
