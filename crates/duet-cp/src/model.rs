//! Discrete model builder.

use crate::engine::{self, CompiledModel, SearchLimit};
use crate::solution::CpSolution;
use duet_expr::{ComparisonSense, LinearExpr, ModelTag, VarId};
use duet_solver::{ModelError, Sense, Solve, SolverConfig};
use std::time::Instant;
use tracing::{debug, trace, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct IntVar {
    pub(crate) lower: i64,
    pub(crate) upper: i64,
    pub(crate) name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum CpConstraint {
    Linear {
        expr: LinearExpr<i64>,
        sense: ComparisonSense,
        rhs: i64,
    },
    AllDifferent {
        vars: Vec<VarId>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CpObjective {
    pub(crate) sense: Sense,
    pub(crate) expr: LinearExpr<i64>,
}

/// Builder for a discrete constraint model.
///
/// Variables receive sequential handles starting at 0. Boolean variables are
/// integer variables with domain `[0, 1]` and share the same index space.
/// Handles carry the tag of the model that issued them; passing a handle to
/// another model is rejected with [`ModelError::ForeignHandle`].
#[derive(Debug, Clone)]
pub struct CpModel {
    tag: ModelTag,
    pub(crate) variables: Vec<IntVar>,
    pub(crate) constraints: Vec<CpConstraint>,
    pub(crate) objective: Option<CpObjective>,
}

impl CpModel {
    /// Create a new empty model.
    pub fn new() -> Self {
        let tag = ModelTag::fresh();
        debug!(
            component = "cp_model",
            operation = "init",
            status = "success",
            model = tag.inner(),
            "Creating discrete model"
        );
        Self {
            tag,
            variables: Vec::new(),
            constraints: Vec::new(),
            objective: None,
        }
    }

    /// Tag shared by every handle this model issues.
    pub fn tag(&self) -> ModelTag {
        self.tag
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn has_objective(&self) -> bool {
        self.objective.is_some()
    }

    /// Add an integer variable with domain `[lower, upper]`.
    ///
    /// An empty name is treated as no name.
    pub fn new_int_var(
        &mut self,
        lower: i64,
        upper: i64,
        name: Option<&str>,
    ) -> Result<VarId, ModelError> {
        if lower > upper {
            warn!(
                component = "cp_model",
                operation = "new_int_var",
                status = "error",
                lower,
                upper,
                "Rejected empty domain"
            );
            return Err(ModelError::InvalidDomain { lower, upper });
        }
        Ok(self.push_variable(lower, upper, name))
    }

    /// Add a boolean variable, represented as the integer domain `[0, 1]`.
    pub fn new_bool_var(&mut self, name: Option<&str>) -> VarId {
        self.push_variable(0, 1, name)
    }

    fn push_variable(&mut self, lower: i64, upper: i64, name: Option<&str>) -> VarId {
        let id = VarId::new(self.tag, self.variables.len() as u32);
        trace!(
            component = "cp_model",
            operation = "add_variable",
            status = "success",
            index = id.inner(),
            lower,
            upper,
            "Adding variable"
        );
        self.variables.push(IntVar {
            lower,
            upper,
            name: name.filter(|n| !n.is_empty()).map(str::to_string),
        });
        id
    }

    /// Domain bounds of a variable.
    pub fn variable_bounds(&self, id: VarId) -> Result<(i64, i64), ModelError> {
        self.ensure_variable_exists(id)?;
        let var = &self.variables[id.index()];
        Ok((var.lower, var.upper))
    }

    /// Display name of a variable, if one was given.
    pub fn variable_name(&self, id: VarId) -> Result<Option<&str>, ModelError> {
        self.ensure_variable_exists(id)?;
        Ok(self.variables[id.index()].name.as_deref())
    }

    /// Constrain `Σ coeffs[i] * vars[i] <= rhs`.
    pub fn add_linear_le(
        &mut self,
        vars: &[VarId],
        coeffs: &[i64],
        rhs: i64,
    ) -> Result<(), ModelError> {
        let expr = LinearExpr::from_parallel(vars, coeffs)?;
        self.add_linear_expr(expr, ComparisonSense::LessEqual, rhs)
    }

    /// Constrain `Σ coeffs[i] * vars[i] >= rhs`.
    pub fn add_linear_ge(
        &mut self,
        vars: &[VarId],
        coeffs: &[i64],
        rhs: i64,
    ) -> Result<(), ModelError> {
        let expr = LinearExpr::from_parallel(vars, coeffs)?;
        self.add_linear_expr(expr, ComparisonSense::GreaterEqual, rhs)
    }

    /// Constrain `Σ coeffs[i] * vars[i] == rhs`.
    pub fn add_linear_eq(
        &mut self,
        vars: &[VarId],
        coeffs: &[i64],
        rhs: i64,
    ) -> Result<(), ModelError> {
        let expr = LinearExpr::from_parallel(vars, coeffs)?;
        self.add_linear_expr(expr, ComparisonSense::Equal, rhs)
    }

    /// Constrain a linear expression against a right-hand side.
    ///
    /// Repeated variables accumulate their coefficients.
    pub fn add_linear_expr(
        &mut self,
        expr: LinearExpr<i64>,
        sense: ComparisonSense,
        rhs: i64,
    ) -> Result<(), ModelError> {
        for var_id in expr.variables() {
            self.ensure_variable_exists(var_id)?;
        }
        trace!(
            component = "cp_model",
            operation = "add_linear",
            status = "success",
            terms = expr.len(),
            sense = sense.as_str(),
            rhs,
            "Adding linear constraint"
        );
        self.constraints
            .push(CpConstraint::Linear { expr, sense, rhs });
        Ok(())
    }

    /// Require all listed variables to take pairwise distinct values.
    ///
    /// A single variable is accepted and constrains nothing.
    pub fn add_all_different(&mut self, vars: &[VarId]) -> Result<(), ModelError> {
        if vars.is_empty() {
            return Err(ModelError::EmptyAllDifferent);
        }
        for var_id in vars {
            self.ensure_variable_exists(*var_id)?;
        }
        trace!(
            component = "cp_model",
            operation = "add_all_different",
            status = "success",
            arity = vars.len(),
            "Adding all-different constraint"
        );
        self.constraints.push(CpConstraint::AllDifferent {
            vars: vars.to_vec(),
        });
        Ok(())
    }

    /// Minimize `Σ coeffs[i] * vars[i]`, replacing any previous objective.
    pub fn minimize(&mut self, vars: &[VarId], coeffs: &[i64]) -> Result<(), ModelError> {
        let expr = LinearExpr::from_parallel(vars, coeffs)?;
        self.set_objective(expr, Sense::Minimize)
    }

    /// Maximize `Σ coeffs[i] * vars[i]`, replacing any previous objective.
    pub fn maximize(&mut self, vars: &[VarId], coeffs: &[i64]) -> Result<(), ModelError> {
        let expr = LinearExpr::from_parallel(vars, coeffs)?;
        self.set_objective(expr, Sense::Maximize)
    }

    /// Set the objective function, replacing any previous objective.
    pub fn set_objective(&mut self, expr: LinearExpr<i64>, sense: Sense) -> Result<(), ModelError> {
        for var_id in expr.variables() {
            self.ensure_variable_exists(var_id)?;
        }
        debug!(
            component = "cp_model",
            operation = "set_objective",
            status = "success",
            sense = sense.as_str(),
            terms = expr.len(),
            replaced = self.objective.is_some(),
            "Set objective function"
        );
        self.objective = Some(CpObjective { sense, expr });
        Ok(())
    }

    /// Solve with a wall-clock limit in seconds; zero or negative means unlimited.
    pub fn solve(&self, time_limit: f64) -> CpSolution {
        self.solve_with_config(&SolverConfig::new().with_time_limit(time_limit))
    }

    /// Compile the current state and hand it to the engine under `config`.
    ///
    /// Each call produces an independent snapshot. The builder is not modified.
    pub fn solve_with_config(&self, config: &SolverConfig) -> CpSolution {
        let started = Instant::now();
        debug!(
            component = "cp_model",
            operation = "solve",
            status = "start",
            num_variables = self.variables.len(),
            num_constraints = self.constraints.len(),
            has_objective = self.objective.is_some(),
            "Solving discrete model"
        );

        let compiled = match engine::compile(self) {
            Ok(compiled) => compiled,
            Err(err) => {
                warn!(
                    component = "cp_model",
                    operation = "compile",
                    status = "error",
                    code = err.code(),
                    error = %err,
                    "Model could not be compiled"
                );
                return CpSolution::model_invalid(
                    CompiledModel::skeleton(self),
                    started.elapsed(),
                );
            }
        };

        let mut limit = SearchLimit::from_config(config);
        let outcome = engine::run(&compiled, &mut limit);
        let solution = CpSolution::from_outcome(compiled, outcome, started.elapsed());

        debug!(
            component = "cp_model",
            operation = "solve",
            status = "success",
            solve_status = %solution.status(),
            objective = solution.objective_value(),
            branches = solution.num_branches(),
            wall_time = solution.wall_time(),
            "Discrete solve finished"
        );
        solution
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
}

impl Default for CpModel {
    fn default() -> Self {
        Self::new()
    }
}

impl Solve for CpModel {
    type Solution = CpSolution;

    fn solve_with_config(&mut self, config: &SolverConfig) -> CpSolution {
        CpModel::solve_with_config(self, config)
    }
}
