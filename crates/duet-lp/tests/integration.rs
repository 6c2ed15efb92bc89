#![allow(clippy::float_cmp)]

use duet_expr::LinearExpr;
use duet_lp::{LinearBackend, LinearModel};
use duet_solver::{ModelError, SolutionView, Solve, SolverConfig, Status};
use proptest::prelude::*;

fn knapsack(backend: LinearBackend) -> (LinearModel, Vec<duet_expr::VarId>) {
    let mut model = LinearModel::with_backend("knapsack", backend);
    let weights = [2.0, 3.0, 4.0];
    let values = [3.0, 4.0, 5.0];
    let items: Vec<_> = (0..3)
        .map(|i| model.bool_var(Some(format!("item{i}").as_str())))
        .collect();
    let capacity = model.add_constraint(f64::NEG_INFINITY, 6.0, Some("capacity")).unwrap();
    for (item, (weight, value)) in items.iter().zip(weights.iter().zip(values)) {
        model.set_constraint_coeff(capacity, *item, *weight).unwrap();
        model.set_objective_coeff(*item, value).unwrap();
    }
    model.maximize();
    (model, items)
}

#[test]
fn test_bounded_maximize_scenario() {
    let mut model = LinearModel::new();
    let y = model.num_var(0.0, 10.0, Some("y")).unwrap();
    let c = model.add_constraint(f64::NEG_INFINITY, 5.0, None).unwrap();
    model.set_constraint_coeff(c, y, 1.0).unwrap();
    model.set_objective_coeff(y, 1.0).unwrap();
    model.maximize();

    assert_eq!(model.solve(), Status::Optimal);
    assert!((model.objective_value().unwrap() - 5.0).abs() < 1e-9);
    assert!((model.var_value(y).unwrap() - 5.0).abs() < 1e-9);
}

#[test]
fn test_row_outside_variable_range_is_infeasible() {
    let mut model = LinearModel::new();
    let x = model.num_var(2.0, 10.0, Some("x")).unwrap();
    let c = model.add_constraint(1.0, 1.0, None).unwrap();
    model.set_constraint_coeff(c, x, 1.0).unwrap();

    assert_eq!(model.solve(), Status::Infeasible);
    assert_eq!(model.objective_value().unwrap(), 0.0);
    assert_eq!(model.var_value(x).unwrap(), 0.0);
}

#[test]
fn test_overwritten_coefficient_is_used() {
    let mut model = LinearModel::new();
    let x = model.num_var(0.0, 10.0, None).unwrap();
    let c = model.add_constraint(f64::NEG_INFINITY, 6.0, None).unwrap();
    model.set_constraint_coeff(c, x, 1.0).unwrap();
    model.set_constraint_coeff(c, x, 2.0).unwrap();
    model.set_objective_coeff(x, 1.0).unwrap();
    model.maximize();

    assert_eq!(model.solve(), Status::Optimal);
    assert!((model.var_value(x).unwrap() - 3.0).abs() < 1e-9);
}

#[test]
fn test_minimizes_by_default() {
    let mut model = LinearModel::new();
    let x = model.num_var(1.5, 8.0, None).unwrap();
    let c = model.add_constraint(f64::NEG_INFINITY, 20.0, None).unwrap();
    model.set_constraint_coeff(c, x, 1.0).unwrap();
    model.set_objective_coeff(x, 2.0).unwrap();

    assert_eq!(model.solve(), Status::Optimal);
    assert!((model.objective_value().unwrap() - 3.0).abs() < 1e-9);
}

#[test]
fn test_mixed_integer_knapsack() {
    let (mut model, items) = knapsack(LinearBackend::MixedIntegerA);
    assert_eq!(model.solve(), Status::Optimal);
    assert!((model.objective_value().unwrap() - 8.0).abs() < 1e-9);
    let chosen: Vec<f64> = items.iter().map(|i| model.var_value(*i).unwrap()).collect();
    assert_eq!(chosen, vec![1.0, 0.0, 1.0]);
}

#[test]
fn test_continuous_backend_relaxes_knapsack() {
    let (mut model, items) = knapsack(LinearBackend::ContinuousA);
    assert_eq!(model.solve(), Status::Optimal);
    assert!((model.objective_value().unwrap() - 8.25).abs() < 1e-9);
    assert!((model.var_value(items[2]).unwrap() - 0.25).abs() < 1e-9);
}

#[test]
fn test_integer_bound_beyond_32_bits_is_model_invalid() {
    let mut model = LinearModel::with_backend("wide", LinearBackend::MixedIntegerA);
    let x = model.int_var(0.0, 5e9, Some("x")).unwrap();
    model.set_objective_coeff(x, 1.0).unwrap();
    model.maximize();

    assert_eq!(model.solve(), Status::ModelInvalid);
    assert_eq!(model.var_value(x).unwrap(), 0.0);
    assert_eq!(
        model.last_solution().map(|s| s.native_status()),
        Some("integer_bound_out_of_range")
    );
}

#[test]
fn test_unbounded_objective() {
    let mut model = LinearModel::new();
    let x = model.num_var(0.0, f64::INFINITY, None).unwrap();
    let c = model.add_constraint(1.0, f64::INFINITY, None).unwrap();
    model.set_constraint_coeff(c, x, 1.0).unwrap();
    model.set_objective_coeff(x, 1.0).unwrap();
    model.maximize();

    assert_eq!(model.solve(), Status::Unbounded);
    assert_eq!(model.objective_value().unwrap(), 0.0);
}

#[test]
fn test_mutation_discards_solution() {
    let mut model = LinearModel::new();
    let x = model.num_var(0.0, 4.0, None).unwrap();
    let c = model.add_constraint(0.0, 10.0, None).unwrap();
    model.set_constraint_coeff(c, x, 1.0).unwrap();
    model.set_objective_coeff(x, 1.0).unwrap();
    model.maximize();
    assert_eq!(model.solve(), Status::Optimal);
    assert!((model.var_value(x).unwrap() - 4.0).abs() < 1e-9);

    model.set_objective_coeff(x, -1.0).unwrap();
    assert_eq!(
        model.var_value(x),
        Err(ModelError::SolveRequired {
            operation: "var_value"
        })
    );
    assert_eq!(model.solve(), Status::Optimal);
    assert!(model.var_value(x).unwrap().abs() < 1e-9);
}

#[test]
fn test_snapshot_survives_mutation() {
    let mut model = LinearModel::new();
    let x = model.num_var(0.0, 4.0, None).unwrap();
    let c = model.add_constraint(0.0, 10.0, None).unwrap();
    model.set_constraint_coeff(c, x, 1.0).unwrap();
    model.set_objective_coeff(x, 1.0).unwrap();
    model.maximize();
    let snapshot = model.solve_with_config(&SolverConfig::default());
    model.set_objective_coeff(x, 3.0).unwrap();

    assert!(model.last_solution().is_none());
    assert_eq!(snapshot.status(), Status::Optimal);
    assert!((snapshot.value(x).unwrap() - 4.0).abs() < 1e-9);
    assert_eq!(snapshot.num_variables(), 1);
}

#[test]
fn test_expression_constraint() {
    let mut model = LinearModel::new();
    let x = model.num_var(0.0, 10.0, None).unwrap();
    let y = model.num_var(0.0, 10.0, None).unwrap();
    let expr = LinearExpr::from_parallel(&[x, y], &[1.0, 1.0]).unwrap();
    model.add_expr_constraint(&expr, f64::NEG_INFINITY, 7.0, None).unwrap();
    model.set_objective_coeff(x, 1.0).unwrap();
    model.set_objective_coeff(y, 2.0).unwrap();
    model.maximize();

    assert_eq!(model.solve(), Status::Optimal);
    assert!((model.objective_value().unwrap() - 14.0).abs() < 1e-9);
    assert!((model.var_value(y).unwrap() - 7.0).abs() < 1e-9);
}

#[test]
fn test_foreign_variable_is_rejected() {
    let mut first = LinearModel::new();
    let mut second = LinearModel::new();
    let x = first.num_var(0.0, 1.0, None).unwrap();
    second.num_var(0.0, 1.0, None).unwrap();
    assert!(matches!(
        second.set_objective_coeff(x, 1.0),
        Err(ModelError::ForeignHandle { .. })
    ));
    assert_eq!(second.solve(), Status::Optimal);
    assert!(matches!(
        second.var_value(x),
        Err(ModelError::ForeignHandle { .. })
    ));
}

#[test]
fn test_empty_model_is_optimal() {
    let mut model = LinearModel::new();
    assert_eq!(model.solve(), Status::Optimal);
    assert_eq!(model.objective_value().unwrap(), 0.0);
}

#[cfg(not(feature = "highs"))]
#[test]
fn test_unavailable_backend_reports_error() {
    let mut model = LinearModel::from_backend_code("lp", LinearBackend::ContinuousB.code());
    let x = model.num_var(0.0, 1.0, None).unwrap();
    model.set_objective_coeff(x, 1.0).unwrap();
    assert_eq!(model.solve(), Status::Error);
    assert_eq!(model.var_value(x).unwrap(), 0.0);
    assert_eq!(
        model.last_solution().map(|s| s.native_status()),
        Some("unavailable")
    );
}

#[cfg(feature = "highs")]
#[test]
fn test_highs_knapsack() {
    let (mut model, _) = knapsack(LinearBackend::MixedIntegerB);
    assert_eq!(model.solve(), Status::Optimal);
    assert!((model.objective_value().unwrap() - 8.0).abs() < 1e-6);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_values_respect_bounds(
        bounds in proptest::collection::vec((-20.0_f64..20.0, 0.0_f64..10.0), 1..5),
        costs in proptest::collection::vec(-3.0_f64..3.0, 5),
    ) {
        let mut model = LinearModel::new();
        let vars: Vec<_> = bounds
            .iter()
            .map(|(lower, width)| model.num_var(*lower, lower + width, None).unwrap())
            .collect();
        let total = model.add_constraint(f64::NEG_INFINITY, 1000.0, None).unwrap();
        for (var, cost) in vars.iter().zip(&costs) {
            model.set_constraint_coeff(total, *var, 1.0).unwrap();
            model.set_objective_coeff(*var, *cost).unwrap();
        }
        prop_assert_eq!(model.solve(), Status::Optimal);
        for (var, (lower, width)) in vars.iter().zip(&bounds) {
            let value = model.var_value(*var).unwrap();
            prop_assert!(*lower - 1e-7 <= value && value <= lower + width + 1e-7);
        }
    }
}
