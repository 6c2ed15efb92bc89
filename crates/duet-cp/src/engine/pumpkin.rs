//! Dispatch to the pumpkin-core constraint solver.

use super::{CompiledModel, CompiledObjective, LinearRow, Refutation, RowKind, SearchLimit};
use duet_solver::Sense;
use pumpkin_core::constraints::{self, Constraint};
use pumpkin_core::optimisation::OptimisationDirection;
use pumpkin_core::optimisation::linear_sat_unsat::LinearSatUnsat;
use pumpkin_core::results::{
    OptimisationResult, ProblemSolution, SatisfactionResult, SolutionReference,
};
use pumpkin_core::variables::{AffineView, DomainId, TransformableVariable};
use pumpkin_core::{DefaultBrancher, Solver};
use std::cell::Cell;
use tracing::{debug, trace};

/// Native outcome of the discrete engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EngineStatus {
    /// A model without objective has a solution.
    Satisfiable,
    /// The best solution is proven optimal.
    Optimal,
    /// The budget ran out after at least one solution.
    BestKnown,
    /// No solution exists.
    Unsatisfiable,
    /// The budget ran out before any solution.
    Unknown,
    /// The model could not be lowered.
    ModelInvalid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EngineOutcome {
    pub(crate) status: EngineStatus,
    /// Best assignment, empty without a solution.
    pub(crate) values: Vec<i64>,
    pub(crate) objective: i64,
    pub(crate) branches: u64,
    pub(crate) solutions: u64,
}

impl EngineOutcome {
    pub(crate) fn without_solution(status: EngineStatus, branches: u64) -> Self {
        Self {
            status,
            values: Vec::new(),
            objective: 0,
            branches,
            solutions: 0,
        }
    }
}

thread_local! {
    // The optimiser takes a plain function as its solution callback.
    static SOLUTIONS_FOUND: Cell<u64> = const { Cell::new(0) };
}

/// Solve `model` under `limit`.
///
/// A fresh solver is built per call, so nothing learned in one solve is
/// visible to the next.
pub(crate) fn run(model: &CompiledModel, limit: &mut SearchLimit) -> EngineOutcome {
    if let Some(refutation) = model.all_different_refutation() {
        return refuted(&refutation);
    }

    let mut solver = Solver::default();
    let variables: Vec<DomainId> = model
        .domains
        .iter()
        .zip(&model.names)
        .map(|(&(lower, upper), name)| {
            // compile keeps every domain inside i32
            let (lower, upper) = (lower as i32, upper as i32);
            match name {
                Some(name) => solver.new_named_bounded_integer(lower, upper, name.as_str()),
                None => solver.new_bounded_integer(lower, upper),
            }
        })
        .collect();
    let objective = model.objective.as_ref().map(|objective| {
        let value = solver.new_named_bounded_integer(objective.lower, objective.upper, "objective");
        (objective, value)
    });

    let posted = post_model(&mut solver, model, &variables).and_then(|()| match objective {
        Some((objective, value)) => post_objective(&mut solver, objective, value, &variables),
        None => Ok(()),
    });
    if let Err(refutation) = posted {
        return refuted(&refutation);
    }

    trace!(
        component = "cp_engine",
        operation = "post",
        status = "success",
        variables = variables.len(),
        rows = model.rows.len(),
        all_different = model.all_different.len(),
        "Posted model to pumpkin"
    );

    let mut brancher = solver.default_brancher();
    let (status, values, solutions) = match objective {
        None => satisfy(&mut solver, &mut brancher, limit, &variables),
        Some((objective, value)) => optimise(
            &mut solver,
            &mut brancher,
            limit,
            objective.sense,
            value,
            &variables,
        ),
    };

    let objective_value = match (&model.objective, values.is_empty()) {
        (Some(objective), false) => objective.evaluate(&values),
        _ => 0,
    };
    EngineOutcome {
        status,
        values,
        objective: objective_value,
        branches: limit.steps(),
        solutions,
    }
}

fn refuted(refutation: &Refutation) -> EngineOutcome {
    debug!(
        component = "cp_engine",
        operation = "run",
        status = "success",
        reason = %refutation,
        "Model refuted before search"
    );
    EngineOutcome::without_solution(EngineStatus::Unsatisfiable, 0)
}

fn post_model(
    solver: &mut Solver,
    model: &CompiledModel,
    variables: &[DomainId],
) -> Result<(), Refutation> {
    for (index, row) in model.rows.iter().enumerate() {
        if row.terms.is_empty() {
            if row.holds(&[]) {
                continue;
            }
            return Err(Refutation::EmptyRow { row: index });
        }
        post_row(solver, row, variables).map_err(|_| Refutation::RootConflict {
            kind: "row",
            index,
        })?;
    }

    for (index, group) in model.all_different.iter().enumerate() {
        let members: Vec<DomainId> = group.iter().map(|&var| variables[var]).collect();
        let tag = solver.new_constraint_tag();
        constraints::all_different(members, tag)
            .post(solver)
            .map_err(|_| Refutation::RootConflict {
                kind: "all_different",
                index,
            })?;
    }
    Ok(())
}

fn post_row(
    solver: &mut Solver,
    row: &LinearRow,
    variables: &[DomainId],
) -> Result<(), pumpkin_core::ConstraintOperationError> {
    let terms = scaled_terms(&row.terms, variables);
    let tag = solver.new_constraint_tag();
    match row.kind {
        RowKind::LessEqual => constraints::less_than_or_equals(terms, row.rhs, tag).post(solver),
        RowKind::Equal => constraints::equals(terms, row.rhs, tag).post(solver),
    }
}

/// Tie `value` to the objective expression: `Σ coeff * x - value = 0`.
fn post_objective(
    solver: &mut Solver,
    objective: &CompiledObjective,
    value: DomainId,
    variables: &[DomainId],
) -> Result<(), Refutation> {
    let mut terms = scaled_terms(&objective.terms, variables);
    terms.push(value.scaled(-1));
    let tag = solver.new_constraint_tag();
    constraints::equals(terms, 0, tag)
        .post(solver)
        .map_err(|_| Refutation::RootConflict {
            kind: "objective",
            index: 0,
        })
}

fn scaled_terms(terms: &[(usize, i32)], variables: &[DomainId]) -> Vec<AffineView<DomainId>> {
    terms
        .iter()
        .map(|&(var, coeff)| variables[var].scaled(coeff))
        .collect()
}

fn satisfy(
    solver: &mut Solver,
    brancher: &mut DefaultBrancher,
    limit: &mut SearchLimit,
    variables: &[DomainId],
) -> (EngineStatus, Vec<i64>, u64) {
    match solver.satisfy(brancher, limit) {
        SatisfactionResult::Satisfiable(satisfiable) => {
            let values = read_values(&satisfiable.solution(), variables);
            (EngineStatus::Satisfiable, values, 1)
        }
        SatisfactionResult::Unsatisfiable(..) => (EngineStatus::Unsatisfiable, Vec::new(), 0),
        SatisfactionResult::Unknown(..) => (EngineStatus::Unknown, Vec::new(), 0),
    }
}

fn optimise(
    solver: &mut Solver,
    brancher: &mut DefaultBrancher,
    limit: &mut SearchLimit,
    sense: Sense,
    value: DomainId,
    variables: &[DomainId],
) -> (EngineStatus, Vec<i64>, u64) {
    let direction = match sense {
        Sense::Minimize => OptimisationDirection::Minimise,
        Sense::Maximize => OptimisationDirection::Maximise,
    };
    let callback: fn(&Solver, SolutionReference, &DefaultBrancher) = |_, _, _| {
        SOLUTIONS_FOUND.with(|found| found.set(found.get() + 1));
    };

    SOLUTIONS_FOUND.with(|found| found.set(0));
    let result = solver.optimise(
        brancher,
        limit,
        LinearSatUnsat::new(direction, value, callback),
    );
    let solutions = SOLUTIONS_FOUND.with(Cell::get);

    match result {
        OptimisationResult::Optimal(solution) => (
            EngineStatus::Optimal,
            read_values(&solution, variables),
            solutions.max(1),
        ),
        OptimisationResult::Satisfiable(solution) => (
            EngineStatus::BestKnown,
            read_values(&solution, variables),
            solutions.max(1),
        ),
        OptimisationResult::Unsatisfiable => (EngineStatus::Unsatisfiable, Vec::new(), 0),
        OptimisationResult::Unknown => (EngineStatus::Unknown, Vec::new(), 0),
    }
}

fn read_values(solution: &impl ProblemSolution, variables: &[DomainId]) -> Vec<i64> {
    variables
        .iter()
        .map(|&var| i64::from(solution.get_integer_value(var)))
        .collect()
}
