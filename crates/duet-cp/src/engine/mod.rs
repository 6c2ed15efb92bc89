//! Discrete engine adapter.
//!
//! - `compile`: freezes a builder into a [`CompiledModel`] within the engine's 32-bit range
//! - `limit`:   wall-clock and search-step budget polled by the engine
//! - `pumpkin`: posts a compiled model to pumpkin-core and runs it

mod compile;
mod limit;
mod pumpkin;

pub(crate) use compile::compile;
pub(crate) use limit::SearchLimit;
pub(crate) use pumpkin::{EngineOutcome, EngineStatus, run};

use duet_expr::{ModelTag, VarId};
use duet_solver::Sense;

/// Closed integer interval `[lower, upper]`.
pub(crate) type Domain = (i64, i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RowKind {
    LessEqual,
    Equal,
}

/// `Σ coeff * x (<= | =) rhs` in engine integers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LinearRow {
    pub(crate) terms: Vec<(usize, i32)>,
    pub(crate) kind: RowKind,
    pub(crate) rhs: i32,
}

impl LinearRow {
    pub(crate) fn activity(&self, values: &[i64]) -> i64 {
        self.terms
            .iter()
            .map(|&(var, coeff)| i64::from(coeff) * values[var])
            .sum()
    }

    pub(crate) fn holds(&self, values: &[i64]) -> bool {
        let activity = self.activity(values);
        let rhs = i64::from(self.rhs);
        match self.kind {
            RowKind::LessEqual => activity <= rhs,
            RowKind::Equal => activity == rhs,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CompiledObjective {
    pub(crate) sense: Sense,
    pub(crate) terms: Vec<(usize, i32)>,
    /// Smallest value the objective can take over the initial domains.
    pub(crate) lower: i32,
    /// Largest value the objective can take over the initial domains.
    pub(crate) upper: i32,
}

impl CompiledObjective {
    pub(crate) fn evaluate(&self, values: &[i64]) -> i64 {
        self.terms
            .iter()
            .map(|&(var, coeff)| i64::from(coeff) * values[var])
            .sum()
    }
}

/// Reason a model has no solution, established before search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Refutation {
    /// A variable appears twice in one all-different group.
    RepeatedMember { group: usize, variable: usize },
    /// More group members have domains inside `[lower, upper]` than it holds values.
    HallInterval {
        group: usize,
        lower: i64,
        upper: i64,
        members: usize,
    },
    /// A relation without terms that `0` does not satisfy.
    EmptyRow { row: usize },
    /// The engine detected a conflict while the relation was posted.
    RootConflict { kind: &'static str, index: usize },
}

impl std::fmt::Display for Refutation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Refutation::RepeatedMember { group, variable } => write!(
                f,
                "variable {variable} appears twice in all-different group {group}"
            ),
            Refutation::HallInterval {
                group,
                lower,
                upper,
                members,
            } => write!(
                f,
                "{members} members of all-different group {group} share [{lower}, {upper}]"
            ),
            Refutation::EmptyRow { row } => write!(f, "row {row} has no terms and excludes 0"),
            Refutation::RootConflict { kind, index } => {
                write!(f, "{kind} {index} conflicts at the root")
            }
        }
    }
}

/// Frozen copy of a discrete model, as handed to the engine.
///
/// A [`CpSolution`](crate::CpSolution) keeps the compiled model it was
/// produced from so variable handles can be resolved against it after the
/// builder has moved on.
#[derive(Debug, Clone)]
pub struct CompiledModel {
    tag: ModelTag,
    pub(crate) domains: Vec<Domain>,
    pub(crate) names: Vec<Option<String>>,
    pub(crate) rows: Vec<LinearRow>,
    pub(crate) all_different: Vec<Vec<usize>>,
    pub(crate) objective: Option<CompiledObjective>,
}

impl CompiledModel {
    /// Variables and names only, for snapshots of models that failed to compile.
    pub(crate) fn skeleton(model: &crate::CpModel) -> Self {
        Self {
            tag: model.tag(),
            domains: model
                .variables
                .iter()
                .map(|v| (v.lower, v.upper))
                .collect(),
            names: model.variables.iter().map(|v| v.name.clone()).collect(),
            rows: Vec::new(),
            all_different: Vec::new(),
            objective: None,
        }
    }

    pub fn tag(&self) -> ModelTag {
        self.tag
    }

    pub fn num_variables(&self) -> usize {
        self.domains.len()
    }

    /// Number of linear rows, with `>=` relations folded into `<=`.
    pub fn num_linear_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_all_different(&self) -> usize {
        self.all_different.len()
    }

    pub fn has_objective(&self) -> bool {
        self.objective.is_some()
    }

    /// Resolve a handle issued by the model this was compiled from.
    pub fn resolve(&self, id: VarId) -> Option<usize> {
        (id.model() == self.tag && id.index() < self.domains.len()).then_some(id.index())
    }

    /// Initial domain of a variable.
    pub fn domain(&self, id: VarId) -> Option<(i64, i64)> {
        self.resolve(id).map(|index| self.domains[index])
    }

    pub fn variable_name(&self, id: VarId) -> Option<&str> {
        self.resolve(id).and_then(|index| self.names[index].as_deref())
    }

    /// First all-different group whose members cannot all take distinct
    /// values within their initial domains.
    pub(crate) fn all_different_refutation(&self) -> Option<Refutation> {
        self.all_different
            .iter()
            .enumerate()
            .find_map(|(group, members)| {
                repeated_member(members)
                    .map(|variable| Refutation::RepeatedMember { group, variable })
                    .or_else(|| {
                        hall_violation(members, &self.domains).map(|(lower, upper, count)| {
                            Refutation::HallInterval {
                                group,
                                lower,
                                upper,
                                members: count,
                            }
                        })
                    })
            })
    }

    /// Check a complete assignment against every constraint.
    #[cfg(test)]
    pub(crate) fn is_satisfied(&self, values: &[i64]) -> bool {
        let within_domains = self
            .domains
            .iter()
            .zip(values)
            .all(|(&(lower, upper), &value)| lower <= value && value <= upper);
        let rows_hold = self.rows.iter().all(|row| row.holds(values));
        let groups_hold = self.all_different.iter().all(|group| {
            let mut seen: Vec<i64> = group.iter().map(|&var| values[var]).collect();
            seen.sort_unstable();
            seen.windows(2).all(|pair| pair[0] != pair[1])
        });
        within_domains && rows_hold && groups_hold
    }
}

fn repeated_member(members: &[usize]) -> Option<usize> {
    let mut sorted = members.to_vec();
    sorted.sort_unstable();
    sorted
        .windows(2)
        .find(|pair| pair[0] == pair[1])
        .map(|pair| pair[0])
}

/// Interval `[lower, upper]` holding the domains of more members than values.
///
/// Only intervals between an existing lower bound and an existing upper bound
/// can be tight, so each lower bound is paired with members in order of their
/// upper bounds.
fn hall_violation(members: &[usize], domains: &[Domain]) -> Option<(i64, i64, usize)> {
    let mut bounds: Vec<Domain> = members.iter().map(|&var| domains[var]).collect();
    bounds.sort_unstable_by_key(|&(_, upper)| upper);

    let mut starts: Vec<i64> = bounds.iter().map(|&(lower, _)| lower).collect();
    starts.sort_unstable();
    starts.dedup();

    for &start in &starts {
        let mut inside: usize = 0;
        for &(lower, upper) in &bounds {
            if lower < start {
                continue;
            }
            inside += 1;
            let values = i128::from(upper) - i128::from(start) + 1;
            if inside as i128 > values {
                return Some((start, upper, inside));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hall_violation_ignores_wide_member() {
        let mut domains = vec![(0, 12); 14];
        domains.push((0, 1000));
        let members: Vec<usize> = (0..15).collect();
        assert_eq!(hall_violation(&members, &domains), Some((0, 12, 14)));
    }

    #[test]
    fn test_hall_violation_finds_inner_interval() {
        // Three members squeezed into [4, 5] next to roomy neighbours.
        let domains = vec![(0, 9), (4, 5), (4, 5), (5, 5), (0, 9)];
        let members: Vec<usize> = (0..5).collect();
        assert_eq!(hall_violation(&members, &domains), Some((4, 5, 3)));
    }

    #[test]
    fn test_hall_violation_accepts_exact_fit() {
        let domains = vec![(0, 2), (0, 2), (0, 2), (-5, 40)];
        let members: Vec<usize> = (0..4).collect();
        assert_eq!(hall_violation(&members, &domains), None);
    }

    #[test]
    fn test_repeated_member_is_reported() {
        assert_eq!(repeated_member(&[3, 1, 3]), Some(3));
        assert_eq!(repeated_member(&[0, 1, 2]), None);
    }

    #[test]
    fn test_row_holds_by_kind() {
        let row = LinearRow {
            terms: vec![(0, 2), (1, -1)],
            kind: RowKind::Equal,
            rhs: 3,
        };
        assert!(row.holds(&[2, 1]));
        assert!(!row.holds(&[2, 0]));
        let row = LinearRow {
            kind: RowKind::LessEqual,
            ..row
        };
        assert!(row.holds(&[2, 4]));
    }

    #[test]
    fn test_refutation_display() {
        let refutation = Refutation::HallInterval {
            group: 0,
            lower: 0,
            upper: 12,
            members: 14,
        };
        assert_eq!(
            refutation.to_string(),
            "14 members of all-different group 0 share [0, 12]"
        );
    }
}
