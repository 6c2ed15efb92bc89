//! Backend selection and dispatch.

mod microlp;

#[cfg(feature = "highs")]
mod highs;

use crate::model::LinearModel;
use duet_solver::{SolverConfig, Status};

/// Engine used by a [`LinearModel`](crate::LinearModel).
///
/// The discriminants are the codes used across the C interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(i32)]
pub enum LinearBackend {
    /// Simplex over the continuous relaxation, via `microlp`.
    #[default]
    ContinuousA = 0,
    /// Simplex over the continuous relaxation, via HiGHS.
    ContinuousB = 1,
    /// Branch-and-bound honoring integrality, via `microlp`.
    MixedIntegerA = 2,
    /// Branch-and-cut honoring integrality, via HiGHS.
    MixedIntegerB = 3,
}

impl LinearBackend {
    pub const ALL: [LinearBackend; 4] = [
        LinearBackend::ContinuousA,
        LinearBackend::ContinuousB,
        LinearBackend::MixedIntegerA,
        LinearBackend::MixedIntegerB,
    ];

    /// Backend for an integer code. Unrecognized codes select the default.
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => LinearBackend::ContinuousB,
            2 => LinearBackend::MixedIntegerA,
            3 => LinearBackend::MixedIntegerB,
            _ => LinearBackend::ContinuousA,
        }
    }

    pub fn code(self) -> i32 {
        self as i32
    }

    /// Whether integer and boolean variables keep their integrality.
    pub fn is_mixed_integer(self) -> bool {
        matches!(
            self,
            LinearBackend::MixedIntegerA | LinearBackend::MixedIntegerB
        )
    }

    /// Name of the engine library behind this backend.
    pub fn engine(self) -> &'static str {
        match self {
            LinearBackend::ContinuousA | LinearBackend::MixedIntegerA => "microlp",
            LinearBackend::ContinuousB | LinearBackend::MixedIntegerB => "highs",
        }
    }

    /// Whether the engine was compiled into this build.
    pub fn is_available(self) -> bool {
        match self {
            LinearBackend::ContinuousA | LinearBackend::MixedIntegerA => true,
            LinearBackend::ContinuousB | LinearBackend::MixedIntegerB => cfg!(feature = "highs"),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LinearBackend::ContinuousA => "continuous_a",
            LinearBackend::ContinuousB => "continuous_b",
            LinearBackend::MixedIntegerA => "mixed_integer_a",
            LinearBackend::MixedIntegerB => "mixed_integer_b",
        }
    }
}

impl std::fmt::Display for LinearBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw result of one backend run.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct EngineOutcome {
    pub(crate) status: Status,
    pub(crate) native_status: &'static str,
    pub(crate) objective: f64,
    pub(crate) values: Vec<f64>,
}

impl EngineOutcome {
    pub(crate) fn without_solution(status: Status, native_status: &'static str) -> Self {
        Self {
            status,
            native_status,
            objective: 0.0,
            values: Vec::new(),
        }
    }
}

pub(crate) fn run(model: &LinearModel, config: &SolverConfig) -> EngineOutcome {
    let backend = model.backend();
    if model.num_variables() == 0 {
        return empty_model_outcome(model);
    }
    match backend {
        LinearBackend::ContinuousA => microlp::solve(model, false),
        LinearBackend::MixedIntegerA => microlp::solve(model, true),
        LinearBackend::ContinuousB | LinearBackend::MixedIntegerB => {
            run_highs(model, config, backend.is_mixed_integer())
        }
    }
}

/// A model without columns is decided by its rows alone.
fn empty_model_outcome(model: &LinearModel) -> EngineOutcome {
    let rows_hold = model
        .rows
        .iter()
        .all(|row| row.lower <= 0.0 && 0.0 <= row.upper);
    if rows_hold {
        EngineOutcome {
            status: Status::Optimal,
            native_status: "empty",
            objective: 0.0,
            values: Vec::new(),
        }
    } else {
        EngineOutcome::without_solution(Status::Infeasible, "empty_infeasible")
    }
}

#[cfg(feature = "highs")]
fn run_highs(model: &LinearModel, config: &SolverConfig, integral: bool) -> EngineOutcome {
    highs::solve(model, config, integral)
}

#[cfg(not(feature = "highs"))]
fn run_highs(model: &LinearModel, _config: &SolverConfig, _integral: bool) -> EngineOutcome {
    tracing::warn!(
        component = "lp_backend",
        operation = "solve",
        status = "error",
        backend = model.backend().as_str(),
        "HiGHS backend not compiled in; rebuild with the `highs` feature"
    );
    EngineOutcome::without_solution(Status::Error, "unavailable")
}
