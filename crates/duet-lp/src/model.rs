//! Linear model builder.

use crate::backend::{self, LinearBackend};
use crate::solution::LpSolution;
use duet_expr::{ConstraintId, LinearExpr, ModelTag, VarId};
use duet_solver::{ModelError, Sense, Solve, SolverConfig, Status};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, trace, warn};

const DEFAULT_NAME: &str = "solver";

/// Integrality class of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarKind {
    Continuous,
    Integer,
    Boolean,
}

impl VarKind {
    pub fn is_integral(self) -> bool {
        !matches!(self, VarKind::Continuous)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LpVariable {
    pub(crate) lower: f64,
    pub(crate) upper: f64,
    pub(crate) kind: VarKind,
    pub(crate) name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LpRow {
    pub(crate) lower: f64,
    pub(crate) upper: f64,
    pub(crate) name: Option<String>,
    pub(crate) coeffs: BTreeMap<usize, f64>,
}

/// Builder for a linear or mixed-integer program.
///
/// Constraints are ranged rows `lower <= Σ coeff * var <= upper` whose
/// coefficients are assigned after creation. Setting a coefficient that was
/// already set overwrites it, and setting it to zero removes it.
///
/// The model minimizes unless [`maximize`](Self::maximize) is called.
/// Any mutation discards the result of the previous solve.
#[derive(Debug, Clone)]
pub struct LinearModel {
    tag: ModelTag,
    name: String,
    backend: LinearBackend,
    pub(crate) variables: Vec<LpVariable>,
    pub(crate) rows: Vec<LpRow>,
    pub(crate) objective: BTreeMap<usize, f64>,
    pub(crate) sense: Sense,
    config: SolverConfig,
    solution: Option<LpSolution>,
}

impl LinearModel {
    /// Create an empty model named `"solver"` on the default backend.
    pub fn new() -> Self {
        Self::with_backend(DEFAULT_NAME, LinearBackend::default())
    }

    /// Create an empty model with a name and backend.
    pub fn with_backend(name: &str, backend: LinearBackend) -> Self {
        let tag = ModelTag::fresh();
        debug!(
            component = "lp_model",
            operation = "init",
            status = "success",
            model = tag.inner(),
            backend = backend.as_str(),
            "Creating linear model"
        );
        Self {
            tag,
            name: name.to_string(),
            backend,
            variables: Vec::new(),
            rows: Vec::new(),
            objective: BTreeMap::new(),
            sense: Sense::Minimize,
            config: SolverConfig::default(),
            solution: None,
        }
    }

    /// Create a model from an integer backend code.
    ///
    /// Unrecognized codes select [`LinearBackend::ContinuousA`].
    pub fn from_backend_code(name: &str, code: i32) -> Self {
        let backend = LinearBackend::from_code(code);
        if backend.code() != code {
            debug!(
                component = "lp_model",
                operation = "init",
                status = "fallback",
                code,
                backend = backend.as_str(),
                "Unknown backend code, using default"
            );
        }
        Self::with_backend(name, backend)
    }

    /// Tag shared by every handle this model issues.
    pub fn tag(&self) -> ModelTag {
        self.tag
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn backend(&self) -> LinearBackend {
        self.backend
    }

    pub fn sense(&self) -> Sense {
        self.sense
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.rows.len()
    }

    /// Replace the configuration used by [`solve`](Self::solve).
    pub fn set_config(&mut self, config: SolverConfig) {
        self.invalidate();
        self.config = config;
    }

    /// Add a continuous variable with bounds `[lower, upper]`.
    ///
    /// Infinite bounds are allowed.
    pub fn num_var(
        &mut self,
        lower: f64,
        upper: f64,
        name: Option<&str>,
    ) -> Result<VarId, ModelError> {
        self.push_variable(lower, upper, VarKind::Continuous, name)
    }

    /// Add an integer variable with bounds `[lower, upper]`.
    pub fn int_var(
        &mut self,
        lower: f64,
        upper: f64,
        name: Option<&str>,
    ) -> Result<VarId, ModelError> {
        self.push_variable(lower, upper, VarKind::Integer, name)
    }

    /// Add a boolean variable with bounds `[0, 1]`.
    pub fn bool_var(&mut self, name: Option<&str>) -> VarId {
        self.invalidate();
        self.push_unchecked(0.0, 1.0, VarKind::Boolean, name)
    }

    fn push_variable(
        &mut self,
        lower: f64,
        upper: f64,
        kind: VarKind,
        name: Option<&str>,
    ) -> Result<VarId, ModelError> {
        if lower.is_nan() || upper.is_nan() || lower > upper {
            warn!(
                component = "lp_model",
                operation = "add_variable",
                status = "error",
                lower,
                upper,
                "Rejected variable bounds"
            );
            return Err(ModelError::InvalidVariableBounds { lower, upper });
        }
        self.invalidate();
        Ok(self.push_unchecked(lower, upper, kind, name))
    }

    fn push_unchecked(
        &mut self,
        lower: f64,
        upper: f64,
        kind: VarKind,
        name: Option<&str>,
    ) -> VarId {
        let id = VarId::new(self.tag, self.variables.len() as u32);
        trace!(
            component = "lp_model",
            operation = "add_variable",
            status = "success",
            index = id.inner(),
            lower,
            upper,
            ?kind,
            "Adding variable"
        );
        self.variables.push(LpVariable {
            lower,
            upper,
            kind,
            name: name.filter(|n| !n.is_empty()).map(str::to_string),
        });
        id
    }

    /// Add an empty row `lower <= ... <= upper`.
    pub fn add_constraint(
        &mut self,
        lower: f64,
        upper: f64,
        name: Option<&str>,
    ) -> Result<ConstraintId, ModelError> {
        if lower.is_nan() || upper.is_nan() || lower > upper {
            warn!(
                component = "lp_model",
                operation = "add_constraint",
                status = "error",
                lower,
                upper,
                "Rejected constraint bounds"
            );
            return Err(ModelError::InvalidConstraintBounds { lower, upper });
        }
        self.invalidate();
        let id = ConstraintId::new(self.tag, self.rows.len() as u32);
        trace!(
            component = "lp_model",
            operation = "add_constraint",
            status = "success",
            index = id.inner(),
            lower,
            upper,
            "Adding constraint"
        );
        self.rows.push(LpRow {
            lower,
            upper,
            name: name.filter(|n| !n.is_empty()).map(str::to_string),
            coeffs: BTreeMap::new(),
        });
        Ok(id)
    }

    /// Add a row and fill it from an expression.
    ///
    /// Repeated variables in `expr` accumulate before being stored, and the
    /// accumulated coefficient must be finite too.
    pub fn add_expr_constraint(
        &mut self,
        expr: &LinearExpr<f64>,
        lower: f64,
        upper: f64,
        name: Option<&str>,
    ) -> Result<ConstraintId, ModelError> {
        for (var, coeff) in expr.terms() {
            self.ensure_variable_exists(*var)?;
            ensure_finite(*coeff)?;
        }
        let merged = expr.normalized_terms();
        for (_, coeff) in &merged {
            ensure_finite(*coeff)?;
        }
        let id = self.add_constraint(lower, upper, name)?;
        let row = &mut self.rows[id.index()];
        for (var, coeff) in merged {
            row.coeffs.insert(var.index(), coeff);
        }
        Ok(id)
    }

    /// Set the coefficient of `var` in `constraint`, overwriting any previous value.
    pub fn set_constraint_coeff(
        &mut self,
        constraint: ConstraintId,
        var: VarId,
        coeff: f64,
    ) -> Result<(), ModelError> {
        self.ensure_constraint_exists(constraint)?;
        self.ensure_variable_exists(var)?;
        ensure_finite(coeff)?;
        self.invalidate();
        trace!(
            component = "lp_model",
            operation = "set_constraint_coeff",
            status = "success",
            row = constraint.inner(),
            col = var.inner(),
            coeff,
            "Setting constraint coefficient"
        );
        let coeffs = &mut self.rows[constraint.index()].coeffs;
        if coeff == 0.0 {
            coeffs.remove(&var.index());
        } else {
            coeffs.insert(var.index(), coeff);
        }
        Ok(())
    }

    /// Coefficient of `var` in `constraint`; zero when never set.
    pub fn constraint_coeff(
        &self,
        constraint: ConstraintId,
        var: VarId,
    ) -> Result<f64, ModelError> {
        self.ensure_constraint_exists(constraint)?;
        self.ensure_variable_exists(var)?;
        Ok(self.rows[constraint.index()]
            .coeffs
            .get(&var.index())
            .copied()
            .unwrap_or(0.0))
    }

    /// Bounds of a constraint row.
    pub fn constraint_bounds(&self, constraint: ConstraintId) -> Result<(f64, f64), ModelError> {
        self.ensure_constraint_exists(constraint)?;
        let row = &self.rows[constraint.index()];
        Ok((row.lower, row.upper))
    }

    /// Set the objective coefficient of `var`, overwriting any previous value.
    pub fn set_objective_coeff(&mut self, var: VarId, coeff: f64) -> Result<(), ModelError> {
        self.ensure_variable_exists(var)?;
        ensure_finite(coeff)?;
        self.invalidate();
        if coeff == 0.0 {
            self.objective.remove(&var.index());
        } else {
            self.objective.insert(var.index(), coeff);
        }
        Ok(())
    }

    /// Objective coefficient of `var`; zero when never set.
    pub fn objective_coeff(&self, var: VarId) -> Result<f64, ModelError> {
        self.ensure_variable_exists(var)?;
        Ok(self.objective.get(&var.index()).copied().unwrap_or(0.0))
    }

    pub fn minimize(&mut self) {
        self.set_sense(Sense::Minimize);
    }

    pub fn maximize(&mut self) {
        self.set_sense(Sense::Maximize);
    }

    fn set_sense(&mut self, sense: Sense) {
        debug!(
            component = "lp_model",
            operation = "set_sense",
            status = "success",
            sense = sense.as_str(),
            "Setting objective sense"
        );
        self.invalidate();
        self.sense = sense;
    }

    /// Bounds of a variable.
    pub fn variable_bounds(&self, var: VarId) -> Result<(f64, f64), ModelError> {
        self.ensure_variable_exists(var)?;
        let v = &self.variables[var.index()];
        Ok((v.lower, v.upper))
    }

    pub fn variable_kind(&self, var: VarId) -> Result<VarKind, ModelError> {
        self.ensure_variable_exists(var)?;
        Ok(self.variables[var.index()].kind)
    }

    /// Display name of a variable, if one was given.
    pub fn variable_name(&self, var: VarId) -> Result<Option<&str>, ModelError> {
        self.ensure_variable_exists(var)?;
        Ok(self.variables[var.index()].name.as_deref())
    }

    /// Display name of a constraint, if one was given.
    pub fn constraint_name(&self, constraint: ConstraintId) -> Result<Option<&str>, ModelError> {
        self.ensure_constraint_exists(constraint)?;
        Ok(self.rows[constraint.index()].name.as_deref())
    }

    /// Solve under the stored configuration and keep the result on the model.
    pub fn solve(&mut self) -> Status {
        let solution = self.compute(&self.config);
        let status = solution.status();
        self.solution = Some(solution);
        status
    }

    /// Result of the last solve, unless the model changed since.
    pub fn last_solution(&self) -> Option<&LpSolution> {
        self.solution.as_ref()
    }

    /// Objective value of the last solve; zero when it found no solution.
    pub fn objective_value(&self) -> Result<f64, ModelError> {
        self.require_solution("objective_value")
            .map(LpSolution::objective_value)
    }

    /// Value of `var` in the last solve; zero when it found no solution.
    pub fn var_value(&self, var: VarId) -> Result<f64, ModelError> {
        self.ensure_variable_exists(var)?;
        let solution = self.require_solution("var_value")?;
        solution.value(var)
    }

    fn require_solution(&self, operation: &'static str) -> Result<&LpSolution, ModelError> {
        self.solution
            .as_ref()
            .ok_or(ModelError::SolveRequired { operation })
    }

    fn compute(&self, config: &SolverConfig) -> LpSolution {
        let started = Instant::now();
        debug!(
            component = "lp_model",
            operation = "solve",
            status = "start",
            backend = self.backend.as_str(),
            num_variables = self.variables.len(),
            num_constraints = self.rows.len(),
            sense = self.sense.as_str(),
            "Solving linear model"
        );
        let outcome = backend::run(self, config);
        let solution = LpSolution::new(
            self.tag,
            self.backend,
            self.variables.len(),
            outcome,
            started.elapsed(),
        );
        debug!(
            component = "lp_model",
            operation = "solve",
            status = "success",
            solve_status = %solution.status(),
            objective = solution.objective_value(),
            solve_time = solution.solve_time(),
            "Linear solve finished"
        );
        solution
    }

    fn invalidate(&mut self) {
        self.solution = None;
    }

    pub(crate) fn ensure_variable_exists(&self, id: VarId) -> Result<(), ModelError> {
        if id.model() != self.tag {
            return Err(ModelError::ForeignHandle {
                expected: self.tag,
                found: id.model(),
            });
        }
        if id.index() < self.variables.len() {
            Ok(())
        } else {
            Err(ModelError::InvalidVariableId(id))
        }
    }

    fn ensure_constraint_exists(&self, id: ConstraintId) -> Result<(), ModelError> {
        if id.model() != self.tag {
            return Err(ModelError::ForeignHandle {
                expected: self.tag,
                found: id.model(),
            });
        }
        if id.index() < self.rows.len() {
            Ok(())
        } else {
            Err(ModelError::InvalidConstraintId(id))
        }
    }
}

fn ensure_finite(coefficient: f64) -> Result<(), ModelError> {
    if coefficient.is_finite() {
        Ok(())
    } else {
        Err(ModelError::InvalidCoefficient { coefficient })
    }
}

impl Default for LinearModel {
    fn default() -> Self {
        Self::new()
    }
}

impl Solve for LinearModel {
    type Solution = LpSolution;

    fn solve_with_config(&mut self, config: &SolverConfig) -> LpSolution {
        let solution = self.compute(config);
        self.solution = Some(solution.clone());
        solution
    }
}
