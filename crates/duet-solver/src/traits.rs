//! Solver traits for abstraction over the discrete and linear engines.

use crate::{SolverConfig, Status};

/// Trait for accessing solution data from a solve.
///
/// Values are reported as `f64` so integer and continuous results can be
/// compared through one interface.
pub trait SolutionView {
    /// Get the normalized status.
    fn status(&self) -> Status;

    /// Get the objective value. Zero when no solution is available.
    fn objective_value(&self) -> f64;

    /// Get the value at the given variable index.
    fn get_value(&self, index: usize) -> Option<f64>;

    /// Number of variables covered by this solution.
    fn num_variables(&self) -> usize;

    /// Get the solve time in seconds.
    fn solve_time_seconds(&self) -> f64;

    /// Check if a solution is available.
    fn is_success(&self) -> bool {
        self.status().is_success()
    }

    /// Check if the solution is optimal.
    fn is_optimal(&self) -> bool {
        self.status().is_optimal()
    }
}

/// Trait for models that can be handed to an engine.
pub trait Solve {
    /// The solution type returned by this model.
    type Solution: SolutionView;

    /// Solve the model with the given configuration.
    ///
    /// Engine failures are reported through the solution status, never as
    /// a panic or error value.
    fn solve_with_config(&mut self, config: &SolverConfig) -> Self::Solution;
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    struct FixtureSolution {
        status: Status,
        values: Vec<f64>,
    }

    impl SolutionView for FixtureSolution {
        fn status(&self) -> Status {
            self.status
        }

        fn objective_value(&self) -> f64 {
            self.values.iter().sum()
        }

        fn get_value(&self, index: usize) -> Option<f64> {
            self.values.get(index).copied()
        }

        fn num_variables(&self) -> usize {
            self.values.len()
        }

        fn solve_time_seconds(&self) -> f64 {
            0.0
        }
    }

    #[test]
    fn test_solution_view_optimal_is_success() {
        let solution = FixtureSolution {
            status: Status::Optimal,
            values: vec![1.0],
        };
        assert!(solution.is_success());
        assert!(solution.is_optimal());
    }

    #[test]
    fn test_solution_view_feasible_is_not_optimal() {
        let solution = FixtureSolution {
            status: Status::Feasible,
            values: vec![1.0, 2.0],
        };
        assert!(solution.is_success());
        assert!(!solution.is_optimal());
        assert_eq!(solution.get_value(1), Some(2.0));
        assert_eq!(solution.get_value(2), None);
    }

    #[test]
    fn test_solution_view_infeasible() {
        let solution = FixtureSolution {
            status: Status::Infeasible,
            values: Vec::new(),
        };
        assert!(!solution.is_success());
        assert_eq!(solution.num_variables(), 0);
    }
}
