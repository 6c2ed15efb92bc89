use duet_cp::CpModel;
use duet_expr::{ComparisonSense, LinearExpr};
use duet_solver::{SolverConfig, Status};
use proptest::prelude::*;

#[test]
fn test_bool_maximize_scenario() {
    let mut model = CpModel::new();
    let x = model.new_bool_var(Some("x"));
    model.add_linear_ge(&[x], &[1], 1).unwrap();
    model.maximize(&[x], &[1]).unwrap();

    let solution = model.solve(0.0);
    assert_eq!(solution.status(), Status::Optimal);
    assert_eq!(solution.objective_value(), 1);
    assert_eq!(solution.value(x).unwrap(), 1);
}

#[test]
fn test_all_different_pair_scenario() {
    let mut model = CpModel::new();
    let a = model.new_int_var(0, 2, Some("a")).unwrap();
    let b = model.new_int_var(0, 2, Some("b")).unwrap();
    model.add_all_different(&[a, b]).unwrap();

    let solution = model.solve(0.0);
    assert!(matches!(
        solution.status(),
        Status::Optimal | Status::Feasible
    ));
    assert_ne!(solution.value(a).unwrap(), solution.value(b).unwrap());
    assert_eq!(solution.objective_value(), 0);
}

#[test]
fn test_all_different_pigeonhole_is_infeasible() {
    let mut model = CpModel::new();
    let vars: Vec<_> = (0..5)
        .map(|_| model.new_int_var(0, 3, None).unwrap())
        .collect();
    model.add_all_different(&vars).unwrap();

    let solution = model.solve(0.0);
    assert_eq!(solution.status(), Status::Infeasible);
}

#[test]
fn test_all_different_union_too_small_with_fixed_member() {
    // Four members share the three values 0..=2.
    let mut model = CpModel::new();
    let fixed = model.new_int_var(1, 1, None).unwrap();
    let a = model.new_int_var(0, 2, None).unwrap();
    let b = model.new_int_var(0, 2, None).unwrap();
    let c = model.new_int_var(0, 2, None).unwrap();
    model.add_all_different(&[fixed, a, b, c]).unwrap();

    assert_eq!(model.solve(0.0).status(), Status::Infeasible);
}

#[test]
fn test_wide_member_does_not_hide_hall_set() {
    // Fourteen members fit in 13 values; the fifteenth could go anywhere.
    let mut model = CpModel::new();
    let mut vars: Vec<_> = (0..14)
        .map(|_| model.new_int_var(0, 12, None).unwrap())
        .collect();
    vars.push(model.new_int_var(0, 1000, None).unwrap());
    model.add_all_different(&vars).unwrap();

    let solution = model.solve(3.0);
    assert_eq!(solution.status(), Status::Infeasible);
    assert_eq!(solution.num_branches(), 0);
    assert!(solution.wall_time() < 3.0);
}

#[test]
fn test_repeated_all_different_member_is_infeasible() {
    let mut model = CpModel::new();
    let x = model.new_int_var(0, 9, None).unwrap();
    let y = model.new_int_var(0, 9, None).unwrap();
    model.add_all_different(&[x, y, x]).unwrap();

    assert_eq!(model.solve(0.0).status(), Status::Infeasible);
}

#[test]
fn test_single_variable_all_different_is_no_op() {
    let mut model = CpModel::new();
    let x = model.new_int_var(4, 6, None).unwrap();
    model.add_all_different(&[x]).unwrap();
    model.maximize(&[x], &[1]).unwrap();

    let solution = model.solve(0.0);
    assert_eq!(solution.status(), Status::Optimal);
    assert_eq!(solution.value(x).unwrap(), 6);
}

#[test]
fn test_repeated_handles_accumulate() {
    // x + x <= 5 means x <= 2
    let mut model = CpModel::new();
    let x = model.new_int_var(0, 10, None).unwrap();
    model.add_linear_le(&[x, x], &[1, 1], 5).unwrap();
    model.maximize(&[x], &[1]).unwrap();

    let solution = model.solve(0.0);
    assert_eq!(solution.status(), Status::Optimal);
    assert_eq!(solution.value(x).unwrap(), 2);
}

#[test]
fn test_equality_constraint() {
    let mut model = CpModel::new();
    let x = model.new_int_var(0, 10, None).unwrap();
    let y = model.new_int_var(0, 10, None).unwrap();
    model.add_linear_eq(&[x, y], &[2, 3], 12).unwrap();
    model.minimize(&[x, y], &[1, 1]).unwrap();

    let solution = model.solve(0.0);
    assert_eq!(solution.status(), Status::Optimal);
    let (vx, vy) = (solution.value(x).unwrap(), solution.value(y).unwrap());
    assert_eq!(2 * vx + 3 * vy, 12);
    assert_eq!(solution.objective_value(), 4);
}

#[test]
fn test_objective_replacement_changes_direction() {
    let mut model = CpModel::new();
    let x = model.new_int_var(-3, 8, None).unwrap();
    model.maximize(&[x], &[1]).unwrap();
    model.minimize(&[x], &[1]).unwrap();

    let solution = model.solve(0.0);
    assert_eq!(solution.objective_value(), -3);
    assert_eq!(solution.value(x).unwrap(), -3);
}

#[test]
fn test_resolve_after_tighter_constraint_does_not_improve() {
    let mut model = CpModel::new();
    let x = model.new_int_var(0, 10, None).unwrap();
    let y = model.new_int_var(0, 10, None).unwrap();
    model.add_linear_ge(&[x, y], &[1, 1], 5).unwrap();
    model.minimize(&[x, y], &[2, 3]).unwrap();

    let first = model.solve(0.0);
    assert_eq!(first.status(), Status::Optimal);
    assert_eq!(first.objective_value(), 10);

    model.add_linear_ge(&[y], &[1], 2).unwrap();
    let second = model.solve(0.0);
    assert_eq!(second.status(), Status::Optimal);
    assert!(second.objective_value() >= first.objective_value());
    assert_eq!(second.objective_value(), 12);

    // The earlier snapshot is unaffected by the new constraint and solve.
    assert_eq!(first.objective_value(), 10);
    assert_eq!(first.value(y).unwrap(), 0);
}

#[test]
fn test_linear_expr_entry_point() {
    let mut model = CpModel::new();
    let x = model.new_int_var(0, 9, None).unwrap();
    let y = model.new_int_var(0, 9, None).unwrap();
    let expr = LinearExpr::term(x, 1) + LinearExpr::term(y, -1);
    model
        .add_linear_expr(expr, ComparisonSense::GreaterEqual, 4)
        .unwrap();
    model.maximize(&[y], &[1]).unwrap();

    let solution = model.solve(0.0);
    assert_eq!(solution.value(y).unwrap(), 5);
    assert_eq!(solution.value(x).unwrap(), 9);
}

#[test]
fn test_queens_with_all_different() {
    let n: i64 = 6;
    let mut model = CpModel::new();
    let queens: Vec<_> = (0..n)
        .map(|i| model.new_int_var(0, n - 1, Some(format!("q{i}").as_str())).unwrap())
        .collect();
    model.add_all_different(&queens).unwrap();
    // Diagonals through shifted copies: up[i] = q[i] + i, down[i] = q[i] - i.
    let up: Vec<_> = (0..n)
        .map(|i| model.new_int_var(i, n - 1 + i, None).unwrap())
        .collect();
    let down: Vec<_> = (0..n)
        .map(|i| model.new_int_var(-i, n - 1 - i, None).unwrap())
        .collect();
    for i in 0..n as usize {
        model
            .add_linear_eq(&[up[i], queens[i]], &[1, -1], i as i64)
            .unwrap();
        model
            .add_linear_eq(&[down[i], queens[i]], &[1, -1], -(i as i64))
            .unwrap();
    }
    model.add_all_different(&up).unwrap();
    model.add_all_different(&down).unwrap();

    let solution = model.solve(10.0);
    assert_eq!(solution.status(), Status::Optimal);
    let rows: Vec<i64> = queens.iter().map(|q| solution.value(*q).unwrap()).collect();
    for i in 0..rows.len() {
        for j in (i + 1)..rows.len() {
            assert_ne!(rows[i], rows[j]);
            assert_ne!((rows[i] - rows[j]).abs(), (j - i) as i64);
        }
    }
    assert_eq!(solution.variable_name(queens[0]).unwrap(), Some("q0"));
}

#[test]
fn test_node_limit_reports_unknown_or_feasible() {
    let mut model = CpModel::new();
    let vars: Vec<_> = (0..8)
        .map(|_| model.new_int_var(0, 20, None).unwrap())
        .collect();
    model.add_all_different(&vars).unwrap();
    model
        .maximize(&vars, &[1, 2, 3, 4, 5, 6, 7, 8])
        .unwrap();

    let solution = model.solve_with_config(&SolverConfig::new().with_node_limit(20));
    assert!(matches!(
        solution.status(),
        Status::Feasible | Status::Unknown
    ));
    assert!(solution.num_branches() <= 20);
    if solution.status() == Status::Feasible {
        assert!(solution.num_solutions() >= 1);
    } else {
        assert!(solution.values().is_empty());
    }
}

#[test]
fn test_objective_overflow_is_model_invalid() {
    let mut model = CpModel::new();
    let x = model.new_int_var(0, i64::MAX, None).unwrap();
    model.maximize(&[x], &[i64::MAX]).unwrap();

    let solution = model.solve(0.0);
    assert_eq!(solution.status(), Status::ModelInvalid);
    assert_eq!(solution.value(x).unwrap(), 0);
    assert!(solution.wall_time() >= 0.0);
}

#[test]
fn test_domain_beyond_engine_range_is_model_invalid() {
    let mut model = CpModel::new();
    let x = model.new_int_var(0, 5_000_000_000, None).unwrap();
    model.maximize(&[x], &[1]).unwrap();

    let solution = model.solve(0.0);
    assert_eq!(solution.status(), Status::ModelInvalid);
    assert_eq!(solution.native_status(), "model_invalid");
}

#[test]
fn test_empty_model_is_optimal() {
    let model = CpModel::new();
    let solution = model.solve(0.0);
    assert_eq!(solution.status(), Status::Optimal);
    assert!(solution.values().is_empty());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_solved_values_lie_within_bounds(
        bounds in proptest::collection::vec((-50_i64..50, 0_i64..20), 1..5),
        coeffs in proptest::collection::vec(-5_i64..5, 5),
        rhs in -40_i64..40,
    ) {
        let mut model = CpModel::new();
        let vars: Vec<_> = bounds
            .iter()
            .map(|(lower, width)| model.new_int_var(*lower, lower + width, None).unwrap())
            .collect();
        model.add_linear_le(&vars, &coeffs[..vars.len()], rhs).unwrap();
        model.minimize(&vars, &coeffs[..vars.len()]).unwrap();

        let solution = model.solve(5.0);
        if solution.status().is_success() {
            for (var, (lower, width)) in vars.iter().zip(&bounds) {
                let value = solution.value(*var).unwrap();
                prop_assert!(*lower <= value && value <= lower + width);
            }
        }
    }

    #[test]
    fn prop_handles_are_sequential(kinds in proptest::collection::vec(any::<bool>(), 0..30)) {
        let mut model = CpModel::new();
        for (expected, is_bool) in kinds.iter().enumerate() {
            let id = if *is_bool {
                model.new_bool_var(None)
            } else {
                model.new_int_var(-1, 1, None).unwrap()
            };
            prop_assert_eq!(id.index(), expected);
        }
    }
}
