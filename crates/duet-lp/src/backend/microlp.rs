//! `microlp` engine.

use super::EngineOutcome;
use crate::model::{LinearModel, VarKind};
use crate::status::{microlp_error_string, microlp_error_to_status};
use duet_solver::{Sense, Status};
use microlp::{ComparisonOp, LinearExpr as RowExpr, OptimizationDirection, Problem, Variable};
use tracing::{debug, trace};

/// Build and solve `model`. Integrality is honored only when `integral` is set.
pub(super) fn solve(model: &LinearModel, integral: bool) -> EngineOutcome {
    let direction = match model.sense() {
        Sense::Minimize => OptimizationDirection::Minimize,
        Sense::Maximize => OptimizationDirection::Maximize,
    };
    let mut problem = Problem::new(direction);

    let mut columns: Vec<Variable> = Vec::with_capacity(model.variables.len());
    for (index, var) in model.variables.iter().enumerate() {
        let cost = model.objective.get(&index).copied().unwrap_or(0.0);
        let column = if integral && var.kind.is_integral() {
            let (lower, upper) = match integer_range(var.lower, var.upper) {
                IntegerRange::Points(lower, upper) => (lower, upper),
                IntegerRange::Empty => {
                    trace!(
                        component = "lp_backend",
                        operation = "add_column",
                        status = "infeasible",
                        index,
                        "Integer column has no integral point"
                    );
                    return EngineOutcome::without_solution(
                        Status::Infeasible,
                        "empty_integer_range",
                    );
                }
                IntegerRange::OutOfRange => {
                    trace!(
                        component = "lp_backend",
                        operation = "add_column",
                        status = "model_invalid",
                        index,
                        lower = var.lower,
                        upper = var.upper,
                        "Integer column bound does not fit in 32 bits"
                    );
                    return EngineOutcome::without_solution(
                        Status::ModelInvalid,
                        "integer_bound_out_of_range",
                    );
                }
            };
            if var.kind == VarKind::Boolean {
                problem.add_binary_var(cost)
            } else {
                problem.add_integer_var(cost, (lower, upper))
            }
        } else {
            problem.add_var(cost, (var.lower, var.upper))
        };
        columns.push(column);
    }

    for (index, row) in model.rows.iter().enumerate() {
        if row.coeffs.is_empty() {
            if row.lower <= 0.0 && 0.0 <= row.upper {
                continue;
            }
            trace!(
                component = "lp_backend",
                operation = "add_row",
                status = "infeasible",
                index,
                "Empty row excludes zero"
            );
            return EngineOutcome::without_solution(Status::Infeasible, "empty_row");
        }
        let expr = || {
            let mut expr = RowExpr::empty();
            for (col, coeff) in &row.coeffs {
                expr.add(columns[*col], *coeff);
            }
            expr
        };
        if row.lower == row.upper {
            problem.add_constraint(expr(), ComparisonOp::Eq, row.lower);
            continue;
        }
        if row.lower.is_finite() {
            problem.add_constraint(expr(), ComparisonOp::Ge, row.lower);
        }
        if row.upper.is_finite() {
            problem.add_constraint(expr(), ComparisonOp::Le, row.upper);
        }
    }

    debug!(
        component = "lp_backend",
        operation = "solve",
        status = "start",
        engine = "microlp",
        integral,
        "Running microlp"
    );
    match problem.solve() {
        Ok(solution) => {
            let values = model
                .variables
                .iter()
                .zip(&columns)
                .map(|(var, column)| {
                    let value = solution[*column];
                    if integral && var.kind.is_integral() {
                        value.round()
                    } else {
                        value
                    }
                })
                .collect();
            EngineOutcome {
                status: Status::Optimal,
                native_status: "optimal",
                objective: solution.objective(),
                values,
            }
        }
        Err(err) => {
            debug!(
                component = "lp_backend",
                operation = "solve",
                status = "no_solution",
                engine = "microlp",
                error = %err,
                "microlp returned without a solution"
            );
            EngineOutcome::without_solution(
                microlp_error_to_status(&err),
                microlp_error_string(&err),
            )
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum IntegerRange {
    Points(i32, i32),
    Empty,
    /// A finite bound lies outside `i32`.
    OutOfRange,
}

/// Integral points of `[lower, upper]` as an `i32` range.
///
/// Infinite bounds stand for an unbounded side and map to the `i32` limits.
fn integer_range(lower: f64, upper: f64) -> IntegerRange {
    let fits = |bound: f64| {
        bound.is_infinite() || (f64::from(i32::MIN)..=f64::from(i32::MAX)).contains(&bound)
    };
    let lower = lower.ceil();
    let upper = upper.floor();
    if lower > upper {
        return IntegerRange::Empty;
    }
    if !fits(lower) || !fits(upper) {
        return IntegerRange::OutOfRange;
    }
    let lower = lower.max(f64::from(i32::MIN));
    let upper = upper.min(f64::from(i32::MAX));
    IntegerRange::Points(lower as i32, upper as i32)
}
