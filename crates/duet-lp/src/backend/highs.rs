//! HiGHS engine.

use super::EngineOutcome;
use crate::model::LinearModel;
use crate::status::{highs_status_string, highs_to_status};
use duet_solver::{Sense, SolverConfig};
use highs::{Col, RowProblem, Sense as HighsSense};
use tracing::{debug, trace};

/// Build and solve `model`. Integrality is honored only when `integral` is set.
pub(super) fn solve(model: &LinearModel, config: &SolverConfig, integral: bool) -> EngineOutcome {
    let mut problem = RowProblem::default();
    let mut columns: Vec<Col> = Vec::with_capacity(model.variables.len());
    for (index, var) in model.variables.iter().enumerate() {
        let cost = model.objective.get(&index).copied().unwrap_or(0.0);
        let column = if integral && var.kind.is_integral() {
            problem.add_integer_column(cost, var.lower..=var.upper)
        } else {
            problem.add_column(cost, var.lower..=var.upper)
        };
        columns.push(column);
    }
    for row in &model.rows {
        let factors: Vec<(Col, f64)> = row
            .coeffs
            .iter()
            .map(|(col, coeff)| (columns[*col], *coeff))
            .collect();
        problem.add_row(row.lower..=row.upper, factors);
    }

    let sense = match model.sense() {
        Sense::Minimize => HighsSense::Minimise,
        Sense::Maximize => HighsSense::Maximise,
    };
    let mut highs = problem.optimise(sense);
    let log_to_console = config.log_to_console.unwrap_or(false);
    if config.verbosity.unwrap_or(0) == 0 && !log_to_console {
        highs.make_quiet();
    }
    if log_to_console {
        highs.set_option("log_to_console", true);
        highs.set_option("output_flag", true);
    }
    if let Some(limit) = config.time_limit_duration() {
        highs.set_option("time_limit", limit.as_secs_f64());
    }
    if let Some(gap) = config.mip_gap {
        highs.set_option("mip_rel_gap", gap);
    }
    if let Some(threads) = config.threads {
        highs.set_option("threads", i32::try_from(threads).unwrap_or(i32::MAX));
    }
    if let Some(presolve) = config.presolve {
        highs.set_option("presolve", if presolve { "on" } else { "off" });
    }

    debug!(
        component = "lp_backend",
        operation = "solve",
        status = "start",
        engine = "highs",
        integral,
        "Running HiGHS"
    );
    let solved = highs.solve();
    let native = solved.status();
    let has_incumbent = integral && solved.mip_gap().is_finite();
    let status = highs_to_status(native, has_incumbent);
    trace!(
        component = "lp_backend",
        operation = "solve",
        status = "success",
        native_status = highs_status_string(native),
        "HiGHS status received"
    );
    if !status.is_success() {
        return EngineOutcome::without_solution(status, highs_status_string(native));
    }

    let solution = solved.get_solution();
    let values = model
        .variables
        .iter()
        .zip(solution.columns())
        .map(|(var, value)| {
            if integral && var.kind.is_integral() {
                value.round()
            } else {
                *value
            }
        })
        .collect();
    EngineOutcome {
        status,
        native_status: highs_status_string(native),
        objective: solved.objective_value(),
        values,
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use duet_solver::Status;

    #[test]
    fn test_integral_solve() {
        let mut model = LinearModel::new();
        let x = model.int_var(0.0, 10.0, None).unwrap();
        let c = model.add_constraint(f64::NEG_INFINITY, 3.0, None).unwrap();
        model.set_constraint_coeff(c, x, 2.0).unwrap();
        model.set_objective_coeff(x, 1.0).unwrap();
        model.maximize();

        let outcome = solve(&model, &SolverConfig::default(), true);
        assert_eq!(outcome.status, Status::Optimal);
        assert_eq!(outcome.values[0], 1.0);

        let relaxed = solve(&model, &SolverConfig::default(), false);
        assert!((relaxed.values[0] - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_infeasible_rows() {
        let mut model = LinearModel::new();
        let x = model.num_var(0.0, 1.0, None).unwrap();
        let c = model.add_constraint(2.0, f64::INFINITY, None).unwrap();
        model.set_constraint_coeff(c, x, 1.0).unwrap();
        let outcome = solve(&model, &SolverConfig::default(), false);
        assert!(!outcome.status.is_success());
        assert!(outcome.values.is_empty());
    }
}
