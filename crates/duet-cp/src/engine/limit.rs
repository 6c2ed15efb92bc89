//! Search limits.

use duet_solver::SolverConfig;
use pumpkin_core::termination::TerminationCondition;
use std::time::{Duration, Instant};

/// Stops the engine on a wall-clock deadline or a step budget.
///
/// The engine polls once per search step (a decision or a conflict). Reading
/// the clock is comparatively expensive, so it is only consulted on steps
/// whose count matches the check mask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SearchLimit {
    clock_check_mask: u64,
    time_limit: Option<Duration>,
    node_limit: Option<u64>,
    start_time: Instant,
    steps: u64,
}

impl SearchLimit {
    /// Check the clock every 256 steps.
    const DEFAULT_CLOCK_CHECK_MASK: u64 = 0xFF;

    pub(crate) fn new(time_limit: Option<Duration>, node_limit: Option<u64>) -> Self {
        Self {
            clock_check_mask: Self::DEFAULT_CLOCK_CHECK_MASK,
            time_limit,
            node_limit,
            start_time: Instant::now(),
            steps: 0,
        }
    }

    pub(crate) fn from_config(config: &SolverConfig) -> Self {
        Self::new(config.time_limit_duration(), config.node_limit)
    }

    #[cfg(test)]
    fn with_clock_check_mask(mut self, clock_check_mask: u64) -> Self {
        self.clock_check_mask = clock_check_mask;
        self
    }

    /// Search steps the engine was allowed to take.
    pub(crate) fn steps(&self) -> u64 {
        self.steps
    }

    /// Whether the search should stop before taking step number `nodes`.
    #[inline]
    pub(crate) fn reached(&self, nodes: u64) -> bool {
        if self.node_limit.is_some_and(|limit| nodes >= limit) {
            return true;
        }
        match self.time_limit {
            Some(limit) => {
                (nodes & self.clock_check_mask) == 0 && self.start_time.elapsed() >= limit
            }
            None => false,
        }
    }
}

impl TerminationCondition for SearchLimit {
    fn should_stop(&mut self) -> bool {
        if self.reached(self.steps) {
            return true;
        }
        self.steps += 1;
        false
    }
}
