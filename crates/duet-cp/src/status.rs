//! Discrete engine status normalization.

use crate::engine::EngineStatus;
use duet_solver::Status;

/// A solved model without objective counts as optimal.
pub(crate) fn engine_to_status(status: EngineStatus) -> Status {
    match status {
        EngineStatus::Satisfiable | EngineStatus::Optimal => Status::Optimal,
        EngineStatus::BestKnown => Status::Feasible,
        EngineStatus::Unsatisfiable => Status::Infeasible,
        EngineStatus::ModelInvalid => Status::ModelInvalid,
        EngineStatus::Unknown => Status::Unknown,
    }
}

pub(crate) fn engine_status_string(status: EngineStatus) -> &'static str {
    match status {
        EngineStatus::Satisfiable => "satisfiable",
        EngineStatus::Optimal => "optimal",
        EngineStatus::BestKnown => "best_known",
        EngineStatus::Unsatisfiable => "unsatisfiable",
        EngineStatus::Unknown => "unknown",
        EngineStatus::ModelInvalid => "model_invalid",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_to_status_mapping() {
        assert_eq!(engine_to_status(EngineStatus::Optimal), Status::Optimal);
        assert_eq!(engine_to_status(EngineStatus::BestKnown), Status::Feasible);
        assert_eq!(
            engine_to_status(EngineStatus::Unsatisfiable),
            Status::Infeasible
        );
        assert_eq!(
            engine_to_status(EngineStatus::ModelInvalid),
            Status::ModelInvalid
        );
    }

    #[test]
    fn test_satisfiable_counts_as_optimal() {
        assert_eq!(engine_to_status(EngineStatus::Satisfiable), Status::Optimal);
    }

    #[test]
    fn test_budget_without_solution_is_unknown() {
        assert_eq!(engine_to_status(EngineStatus::Unknown), Status::Unknown);
    }

    #[test]
    fn test_engine_status_string() {
        assert_eq!(engine_status_string(EngineStatus::Optimal), "optimal");
        assert_eq!(engine_status_string(EngineStatus::BestKnown), "best_known");
        assert_eq!(
            engine_status_string(EngineStatus::Unsatisfiable),
            "unsatisfiable"
        );
    }
}
