//! Linear backend status normalization.
//!
//! Outcomes a backend reports that have no counterpart among the normalized
//! statuses become [`Status::Error`].

use duet_solver::Status;

pub(crate) fn microlp_error_to_status(error: &microlp::Error) -> Status {
    match error {
        microlp::Error::Infeasible => Status::Infeasible,
        microlp::Error::Unbounded => Status::Unbounded,
        #[allow(unreachable_patterns)]
        _ => Status::Error,
    }
}

pub(crate) fn microlp_error_string(error: &microlp::Error) -> &'static str {
    match error {
        microlp::Error::Infeasible => "infeasible",
        microlp::Error::Unbounded => "unbounded",
        #[allow(unreachable_patterns)]
        _ => "internal_error",
    }
}

#[cfg(feature = "highs")]
pub(crate) fn highs_to_status(status: highs::HighsModelStatus, has_incumbent: bool) -> Status {
    use highs::HighsModelStatus;
    match status {
        HighsModelStatus::Optimal | HighsModelStatus::ModelEmpty => Status::Optimal,
        HighsModelStatus::Infeasible => Status::Infeasible,
        HighsModelStatus::Unbounded | HighsModelStatus::UnboundedOrInfeasible => {
            Status::Unbounded
        }
        HighsModelStatus::ReachedTimeLimit | HighsModelStatus::ReachedIterationLimit
            if has_incumbent =>
        {
            Status::Feasible
        }
        _ => Status::Error,
    }
}

#[cfg(feature = "highs")]
pub(crate) fn highs_status_string(status: highs::HighsModelStatus) -> &'static str {
    use highs::HighsModelStatus;
    match status {
        HighsModelStatus::Optimal => "optimal",
        HighsModelStatus::ModelEmpty => "model_empty",
        HighsModelStatus::Infeasible => "infeasible",
        HighsModelStatus::Unbounded => "unbounded",
        HighsModelStatus::UnboundedOrInfeasible => "unbounded_or_infeasible",
        HighsModelStatus::ReachedTimeLimit => "time_limit",
        HighsModelStatus::ReachedIterationLimit => "iteration_limit",
        _ => "other",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_microlp_error_mapping() {
        assert_eq!(
            microlp_error_to_status(&microlp::Error::Infeasible),
            Status::Infeasible
        );
        assert_eq!(
            microlp_error_to_status(&microlp::Error::Unbounded),
            Status::Unbounded
        );
        assert_eq!(microlp_error_string(&microlp::Error::Unbounded), "unbounded");
    }

    #[cfg(feature = "highs")]
    #[test]
    fn test_highs_mapping() {
        use highs::HighsModelStatus;
        assert_eq!(
            highs_to_status(HighsModelStatus::Optimal, false),
            Status::Optimal
        );
        assert_eq!(
            highs_to_status(HighsModelStatus::UnboundedOrInfeasible, false),
            Status::Unbounded
        );
        assert_eq!(
            highs_to_status(HighsModelStatus::ReachedTimeLimit, true),
            Status::Feasible
        );
        assert_eq!(
            highs_to_status(HighsModelStatus::ReachedTimeLimit, false),
            Status::Error
        );
        assert_eq!(
            highs_to_status(HighsModelStatus::LoadError, false),
            Status::Error
        );
    }
}
