//! Builder to engine lowering.

use super::{CompiledModel, CompiledObjective, Domain, LinearRow, RowKind};
use crate::model::{CpConstraint, CpModel};
use duet_expr::{ComparisonSense, LinearExpr};
use tracing::trace;

/// Largest activity magnitude handed to the engine, which computes in `i32`.
const MAGNITUDE_LIMIT: i128 = (i32::MAX / 2) as i128;

/// Reasons a model cannot be evaluated by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CompileError {
    /// A variable domain does not fit the engine's integers.
    DomainOutOfRange { variable: usize },
    /// Repeated variables in one relation sum to a coefficient outside `i64`.
    CoefficientOverflow { constraint: usize },
    /// A merged coefficient does not fit the engine's integers.
    CoefficientOutOfRange { constraint: usize },
    /// The activity range of a relation does not fit the engine's integers.
    ActivityOverflow { constraint: usize },
    /// The objective range does not fit the engine's integers.
    ObjectiveOverflow,
}

impl CompileError {
    /// Returns a semantic error code for programmatic handling.
    pub(crate) fn code(&self) -> &'static str {
        match self {
            CompileError::DomainOutOfRange { .. } => "COMPILE_DOMAIN_OUT_OF_RANGE",
            CompileError::CoefficientOverflow { .. } => "COMPILE_COEFFICIENT_OVERFLOW",
            CompileError::CoefficientOutOfRange { .. } => "COMPILE_COEFFICIENT_OUT_OF_RANGE",
            CompileError::ActivityOverflow { .. } => "COMPILE_ACTIVITY_OVERFLOW",
            CompileError::ObjectiveOverflow => "COMPILE_OBJECTIVE_OVERFLOW",
        }
    }
}

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompileError::DomainOutOfRange { variable } => write!(
                f,
                "[{}] domain of variable {} exceeds 32 bits",
                self.code(),
                variable
            ),
            CompileError::CoefficientOverflow { constraint } => write!(
                f,
                "[{}] merged coefficients of constraint {} overflow",
                self.code(),
                constraint
            ),
            CompileError::CoefficientOutOfRange { constraint } => write!(
                f,
                "[{}] a coefficient of constraint {} exceeds 32 bits",
                self.code(),
                constraint
            ),
            CompileError::ActivityOverflow { constraint } => write!(
                f,
                "[{}] activity range of constraint {} overflows",
                self.code(),
                constraint
            ),
            CompileError::ObjectiveOverflow => {
                write!(f, "[{}] objective range exceeds 32 bits", self.code())
            }
        }
    }
}

impl std::error::Error for CompileError {}

/// Lower a builder into `<=` and `=` rows over engine integers.
///
/// `>=` rows are negated. Right-hand sides beyond the reachable activity
/// range are clamped to the nearest value with the same truth.
pub(crate) fn compile(model: &CpModel) -> Result<CompiledModel, CompileError> {
    let mut compiled = CompiledModel::skeleton(model);

    for (variable, &(lower, upper)) in compiled.domains.iter().enumerate() {
        if i32::try_from(lower).is_err() || i32::try_from(upper).is_err() {
            return Err(CompileError::DomainOutOfRange { variable });
        }
    }

    for (index, constraint) in model.constraints.iter().enumerate() {
        match constraint {
            CpConstraint::Linear { expr, sense, rhs } => {
                let terms = engine_terms(expr, &compiled.domains, index)?;
                let (lower, upper) = activity_range(&terms, &compiled.domains);
                let rhs = i128::from(*rhs);
                let row = match sense {
                    ComparisonSense::LessEqual => LinearRow {
                        rhs: clamp_rhs(rhs, lower - 1, upper),
                        terms,
                        kind: RowKind::LessEqual,
                    },
                    ComparisonSense::GreaterEqual => LinearRow {
                        rhs: clamp_rhs(-rhs, -upper - 1, -lower),
                        terms: terms.iter().map(|&(v, c)| (v, -c)).collect(),
                        kind: RowKind::LessEqual,
                    },
                    ComparisonSense::Equal => LinearRow {
                        rhs: clamp_rhs(rhs, lower - 1, upper + 1),
                        terms,
                        kind: RowKind::Equal,
                    },
                };
                compiled.rows.push(row);
            }
            CpConstraint::AllDifferent { vars } => {
                if vars.len() > 1 {
                    compiled
                        .all_different
                        .push(vars.iter().map(|id| id.index()).collect());
                }
            }
        }
    }

    if let Some(objective) = &model.objective {
        let terms = engine_terms(&objective.expr, &compiled.domains, 0)
            .map_err(|_| CompileError::ObjectiveOverflow)?;
        if !terms.is_empty() {
            let (lower, upper) = activity_range(&terms, &compiled.domains);
            compiled.objective = Some(CompiledObjective {
                sense: objective.sense,
                terms,
                lower: to_engine(lower),
                upper: to_engine(upper),
            });
        }
    }

    trace!(
        component = "cp_engine",
        operation = "compile",
        status = "success",
        rows = compiled.rows.len(),
        all_different = compiled.all_different.len(),
        "Compiled discrete model"
    );
    Ok(compiled)
}

/// Merged terms whose every partial sum stays within the engine's range.
fn engine_terms(
    expr: &LinearExpr<i64>,
    domains: &[Domain],
    constraint: usize,
) -> Result<Vec<(usize, i32)>, CompileError> {
    let merged = expr
        .try_normalized_terms()
        .ok_or(CompileError::CoefficientOverflow { constraint })?;

    let mut magnitude: i128 = 0;
    let mut terms = Vec::with_capacity(merged.len());
    for (var_id, coeff) in merged {
        let coeff =
            i32::try_from(coeff).map_err(|_| CompileError::CoefficientOutOfRange { constraint })?;
        let (lower, upper) = domains[var_id.index()];
        let reach = (i128::from(coeff) * i128::from(lower))
            .abs()
            .max((i128::from(coeff) * i128::from(upper)).abs());
        magnitude += reach;
        if magnitude > MAGNITUDE_LIMIT {
            return Err(CompileError::ActivityOverflow { constraint });
        }
        terms.push((var_id.index(), coeff));
    }
    Ok(terms)
}

/// Smallest and largest value `Σ coeff * x` can take over `domains`.
pub(crate) fn activity_range(terms: &[(usize, i32)], domains: &[Domain]) -> (i128, i128) {
    terms
        .iter()
        .fold((0, 0), |(lower, upper), &(var, coeff)| {
            let (lo, hi) = domains[var];
            let at_lo = i128::from(coeff) * i128::from(lo);
            let at_hi = i128::from(coeff) * i128::from(hi);
            (lower + at_lo.min(at_hi), upper + at_lo.max(at_hi))
        })
}

fn clamp_rhs(rhs: i128, lowest: i128, highest: i128) -> i32 {
    to_engine(rhs.clamp(lowest, highest))
}

/// Values bounded by [`MAGNITUDE_LIMIT`] plus one always fit.
fn to_engine(value: i128) -> i32 {
    i32::try_from(value).unwrap_or(if value < 0 { i32::MIN } else { i32::MAX })
}

#[cfg(test)]
mod tests {
    use super::*;
    use duet_solver::Sense;

    #[test]
    fn test_equality_stays_one_row() {
        let mut model = CpModel::new();
        let x = model.new_int_var(0, 10, None).unwrap();
        model.add_linear_eq(&[x], &[2], 4).unwrap();
        let compiled = compile(&model).unwrap();
        assert_eq!(
            compiled.rows,
            vec![LinearRow {
                terms: vec![(0, 2)],
                kind: RowKind::Equal,
                rhs: 4
            }]
        );
    }

    #[test]
    fn test_greater_equal_is_negated() {
        let mut model = CpModel::new();
        let x = model.new_bool_var(None);
        model.add_linear_ge(&[x], &[1], 1).unwrap();
        let compiled = compile(&model).unwrap();
        assert_eq!(compiled.rows[0].terms, vec![(0, -1)]);
        assert_eq!(compiled.rows[0].kind, RowKind::LessEqual);
        assert_eq!(compiled.rows[0].rhs, -1);
    }

    #[test]
    fn test_repeated_handles_merge() {
        let mut model = CpModel::new();
        let x = model.new_int_var(0, 10, None).unwrap();
        let y = model.new_int_var(0, 10, None).unwrap();
        model.add_linear_le(&[x, y, x], &[1, 1, 2], 9).unwrap();
        let compiled = compile(&model).unwrap();
        assert_eq!(compiled.rows[0].terms, vec![(0, 3), (1, 1)]);
    }

    #[test]
    fn test_far_rhs_is_clamped_without_changing_truth() {
        let mut model = CpModel::new();
        let x = model.new_int_var(0, 10, None).unwrap();
        model.add_linear_le(&[x], &[1], i64::MAX).unwrap();
        model.add_linear_le(&[x], &[1], i64::MIN).unwrap();
        model.add_linear_eq(&[x], &[1], 1_000_000_000_000).unwrap();
        let compiled = compile(&model).unwrap();
        let rhs: Vec<i32> = compiled.rows.iter().map(|row| row.rhs).collect();
        assert_eq!(rhs, vec![10, -1, 11]);
    }

    #[test]
    fn test_singleton_all_different_is_dropped() {
        let mut model = CpModel::new();
        let x = model.new_int_var(0, 3, None).unwrap();
        model.add_all_different(&[x]).unwrap();
        let compiled = compile(&model).unwrap();
        assert_eq!(compiled.num_all_different(), 0);
    }

    #[test]
    fn test_coefficient_overflow_is_reported() {
        let mut model = CpModel::new();
        let x = model.new_int_var(0, 1, None).unwrap();
        model.add_linear_le(&[x, x], &[i64::MAX, i64::MAX], 0).unwrap();
        assert_eq!(
            compile(&model).unwrap_err(),
            CompileError::CoefficientOverflow { constraint: 0 }
        );
    }

    #[test]
    fn test_wide_coefficient_is_reported() {
        let mut model = CpModel::new();
        let x = model.new_int_var(0, 1, None).unwrap();
        model.add_linear_le(&[x], &[1 << 40], 0).unwrap();
        assert_eq!(
            compile(&model).unwrap_err(),
            CompileError::CoefficientOutOfRange { constraint: 0 }
        );
    }

    #[test]
    fn test_activity_beyond_engine_range_is_reported() {
        let mut model = CpModel::new();
        let x = model.new_int_var(0, 1_000_000, None).unwrap();
        let y = model.new_int_var(0, 1_000_000, None).unwrap();
        model.add_linear_le(&[x, y], &[1_000, 1_000], 5).unwrap();
        assert_eq!(
            compile(&model).unwrap_err(),
            CompileError::ActivityOverflow { constraint: 0 }
        );
    }

    #[test]
    fn test_domain_beyond_engine_range_is_reported() {
        let mut model = CpModel::new();
        model.new_int_var(0, 1, None).unwrap();
        model.new_int_var(0, i64::from(i32::MAX) + 1, None).unwrap();
        assert_eq!(
            compile(&model).unwrap_err(),
            CompileError::DomainOutOfRange { variable: 1 }
        );
    }

    #[test]
    fn test_objective_keeps_sense_and_range() {
        let mut model = CpModel::new();
        let x = model.new_int_var(-2, 5, None).unwrap();
        model.maximize(&[x], &[3]).unwrap();
        let compiled = compile(&model).unwrap();
        let objective = compiled.objective.unwrap();
        assert_eq!(objective.sense, Sense::Maximize);
        assert_eq!((objective.lower, objective.upper), (-6, 15));
    }

    #[test]
    fn test_cancelled_objective_is_dropped() {
        let mut model = CpModel::new();
        let x = model.new_int_var(0, 5, None).unwrap();
        model.minimize(&[x, x], &[2, -2]).unwrap();
        let compiled = compile(&model).unwrap();
        assert!(!compiled.has_objective());
    }

    #[test]
    fn test_activity_range_mixed_signs() {
        let domains = vec![(-2, 3), (0, 4)];
        assert_eq!(activity_range(&[(0, 2), (1, -1)], &domains), (-8, 6));
    }
}
