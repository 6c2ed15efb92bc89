//! Read-only result of a discrete solve.

use crate::engine::{CompiledModel, EngineOutcome, EngineStatus};
use crate::status::{engine_status_string, engine_to_status};
use duet_expr::VarId;
use duet_solver::{ModelError, SolutionView, Status};
use std::time::Duration;
use tracing::trace;

/// Snapshot of one discrete solve.
///
/// Holds the compiled model it was produced from, so it stays valid and
/// unchanged when the builder is modified or solved again.
#[derive(Debug, Clone)]
pub struct CpSolution {
    status: Status,
    native_status: EngineStatus,
    objective_value: i64,
    values: Vec<i64>,
    wall_time: f64,
    num_branches: u64,
    num_solutions: u64,
    model: CompiledModel,
}

impl CpSolution {
    pub(crate) fn from_outcome(
        model: CompiledModel,
        outcome: EngineOutcome,
        elapsed: Duration,
    ) -> Self {
        trace!(
            component = "cp_solution",
            operation = "from_outcome",
            status = "success",
            native_status = engine_status_string(outcome.status),
            "Translating engine outcome"
        );
        Self {
            status: engine_to_status(outcome.status),
            native_status: outcome.status,
            objective_value: outcome.objective,
            values: outcome.values,
            wall_time: elapsed.as_secs_f64(),
            num_branches: outcome.branches,
            num_solutions: outcome.solutions,
            model,
        }
    }

    pub(crate) fn model_invalid(model: CompiledModel, elapsed: Duration) -> Self {
        Self {
            status: engine_to_status(EngineStatus::ModelInvalid),
            native_status: EngineStatus::ModelInvalid,
            objective_value: 0,
            values: Vec::new(),
            wall_time: elapsed.as_secs_f64(),
            num_branches: 0,
            num_solutions: 0,
            model,
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Engine-specific status name, for diagnostics.
    pub fn native_status(&self) -> &'static str {
        engine_status_string(self.native_status)
    }

    /// Objective of the best solution. Zero without an objective or solution.
    pub fn objective_value(&self) -> i64 {
        self.objective_value
    }

    /// Value of a variable in this solve.
    ///
    /// Returns 0 when the solve produced no solution, and an error when the
    /// handle does not belong to the solved model.
    pub fn value(&self, id: VarId) -> Result<i64, ModelError> {
        let index = self.resolve(id)?;
        Ok(self.values.get(index).copied().unwrap_or_default())
    }

    /// Values of all variables in handle order, empty without a solution.
    pub fn values(&self) -> &[i64] {
        &self.values
    }

    /// Display name of a variable, if one was given.
    pub fn variable_name(&self, id: VarId) -> Result<Option<&str>, ModelError> {
        self.resolve(id)?;
        Ok(self.model.variable_name(id))
    }

    /// Elapsed wall-clock seconds, including compilation.
    pub fn wall_time(&self) -> f64 {
        self.wall_time
    }

    /// Search steps the engine took.
    pub fn num_branches(&self) -> u64 {
        self.num_branches
    }

    /// Solutions the engine reported, counting each improvement.
    pub fn num_solutions(&self) -> u64 {
        self.num_solutions
    }

    /// The compiled model this result was produced from.
    pub fn model(&self) -> &CompiledModel {
        &self.model
    }

    fn resolve(&self, id: VarId) -> Result<usize, ModelError> {
        if id.model() != self.model.tag() {
            return Err(ModelError::ForeignHandle {
                expected: self.model.tag(),
                found: id.model(),
            });
        }
        self.model
            .resolve(id)
            .ok_or(ModelError::InvalidVariableId(id))
    }
}

impl SolutionView for CpSolution {
    fn status(&self) -> Status {
        self.status
    }

    fn objective_value(&self) -> f64 {
        self.objective_value as f64
    }

    fn get_value(&self, index: usize) -> Option<f64> {
        self.values.get(index).map(|value| *value as f64)
    }

    fn num_variables(&self) -> usize {
        self.model.num_variables()
    }

    fn solve_time_seconds(&self) -> f64 {
        self.wall_time
    }
}
