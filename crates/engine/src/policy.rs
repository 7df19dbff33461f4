//! When to retrain automatically.
//!
//! Retraining is amortized: additions between triggers leave the model stale
//! until the next trigger or an explicit `train()`.

use std::fmt;

/// Decides whether growing the corpus from `before` to `after` profiles
/// should trigger a retrain.
pub trait RetrainPolicy: fmt::Debug + Send + Sync {
    /// Returns the name of this policy (for logging)
    fn name(&self) -> &str;

    fn should_retrain(&self, before: usize, after: usize) -> bool;
}

/// Retrain whenever the corpus size reaches or passes a multiple of `interval`.
///
/// A batch that crosses several multiples at once triggers one retrain; its
/// result is the same as retraining at each of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchBoundaryPolicy {
    pub interval: usize,
}

impl BatchBoundaryPolicy {
    pub fn new(interval: usize) -> Self {
        Self { interval }
    }
}

impl Default for BatchBoundaryPolicy {
    fn default() -> Self {
        Self { interval: 50 }
    }
}

impl RetrainPolicy for BatchBoundaryPolicy {
    fn name(&self) -> &str {
        "BatchBoundaryPolicy"
    }

    fn should_retrain(&self, before: usize, after: usize) -> bool {
        // An interval of 0 disables automatic retraining
        self.interval > 0 && after / self.interval > before / self.interval
    }
}
