//! Result of a linear solve.

use crate::backend::{EngineOutcome, LinearBackend};
use duet_expr::{ModelTag, VarId};
use duet_solver::{ModelError, SolutionView, Status};
use std::time::Duration;

/// Snapshot of one linear solve.
#[derive(Debug, Clone, PartialEq)]
pub struct LpSolution {
    tag: ModelTag,
    backend: LinearBackend,
    status: Status,
    native_status: &'static str,
    objective_value: f64,
    num_variables: usize,
    values: Vec<f64>,
    solve_time: f64,
}

impl LpSolution {
    pub(crate) fn new(
        tag: ModelTag,
        backend: LinearBackend,
        num_variables: usize,
        outcome: EngineOutcome,
        elapsed: Duration,
    ) -> Self {
        Self {
            tag,
            backend,
            status: outcome.status,
            native_status: outcome.native_status,
            objective_value: if outcome.status.is_success() {
                outcome.objective
            } else {
                0.0
            },
            num_variables,
            values: outcome.values,
            solve_time: elapsed.as_secs_f64(),
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Backend-specific status name, for diagnostics.
    pub fn native_status(&self) -> &'static str {
        self.native_status
    }

    pub fn backend(&self) -> LinearBackend {
        self.backend
    }

    /// Objective value; zero when no solution was found.
    pub fn objective_value(&self) -> f64 {
        self.objective_value
    }

    /// Value of a variable; zero when no solution was found.
    ///
    /// # Errors
    ///
    /// Returns an error for handles from another model or beyond the
    /// variables that existed at solve time.
    pub fn value(&self, var: VarId) -> Result<f64, ModelError> {
        if var.model() != self.tag {
            return Err(ModelError::ForeignHandle {
                expected: self.tag,
                found: var.model(),
            });
        }
        if var.index() >= self.num_variables {
            return Err(ModelError::InvalidVariableId(var));
        }
        Ok(self.values.get(var.index()).copied().unwrap_or(0.0))
    }

    /// All variable values in handle order; empty when no solution was found.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn solve_time(&self) -> f64 {
        self.solve_time
    }
}

impl SolutionView for LpSolution {
    fn status(&self) -> Status {
        self.status
    }

    fn objective_value(&self) -> f64 {
        self.objective_value
    }

    fn get_value(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    fn num_variables(&self) -> usize {
        self.num_variables
    }

    fn solve_time_seconds(&self) -> f64 {
        self.solve_time
    }
}
