//! Shared step budget for coordinated crews
//!
//! A managed pipeline caps the total number of LLM round trips spent
//! across all of its tasks. Each executor draws from the same budget, so
//! a task that burns many tool-call iterations leaves fewer for the rest.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A step budget shared between executors
///
/// Cloning is cheap; all clones draw from the same counter.
#[derive(Debug, Clone)]
pub struct StepBudget {
    remaining: Arc<AtomicUsize>,
}

impl StepBudget {
    /// Create a budget with the given number of steps
    pub fn new(steps: usize) -> Self {
        Self {
            remaining: Arc::new(AtomicUsize::new(steps)),
        }
    }

    /// Try to take one step from the budget
    ///
    /// Returns false when the budget is exhausted.
    pub fn try_take(&self) -> bool {
        self.remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    /// Number of steps left
    pub fn remaining(&self) -> usize {
        self.remaining.load(Ordering::SeqCst)
    }

    /// Whether the budget is used up
    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_until_exhausted() {
        let budget = StepBudget::new(2);
        assert!(budget.try_take());
        assert!(budget.try_take());
        assert!(!budget.try_take());
        assert!(budget.is_exhausted());
    }

    #[test]
    fn test_clones_share_counter() {
        let budget = StepBudget::new(3);
        let clone = budget.clone();

        assert!(clone.try_take());
        assert_eq!(budget.remaining(), 2);
    }
}
