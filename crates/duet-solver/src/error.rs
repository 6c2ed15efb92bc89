//! Model error types.

use duet_expr::{ConstraintId, LinearExprError, ModelTag, VarId};

/// Errors that can occur while building or querying a model.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Handle was issued by a different model
    ForeignHandle { expected: ModelTag, found: ModelTag },
    /// Invalid variable ID
    InvalidVariableId(VarId),
    /// Invalid constraint ID
    InvalidConstraintId(ConstraintId),
    /// Invalid integer domain
    InvalidDomain { lower: i64, upper: i64 },
    /// Invalid variable bounds
    InvalidVariableBounds { lower: f64, upper: f64 },
    /// Invalid constraint bounds
    InvalidConstraintBounds { lower: f64, upper: f64 },
    /// Non-finite coefficient
    InvalidCoefficient { coefficient: f64 },
    /// Parallel handle and coefficient sequences differ in length
    MismatchedLengths { variables: usize, coefficients: usize },
    /// All-different over no variables
    EmptyAllDifferent,
    /// Result queried before any solve
    SolveRequired { operation: &'static str },
}

impl ModelError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            ModelError::ForeignHandle { .. } => "HANDLE_FOREIGN_MODEL",
            ModelError::InvalidVariableId(_) => "VARIABLE_INVALID_ID",
            ModelError::InvalidConstraintId(_) => "CONSTRAINT_INVALID_ID",
            ModelError::InvalidDomain { .. } => "VARIABLE_INVALID_DOMAIN",
            ModelError::InvalidVariableBounds { .. } => "VARIABLE_INVALID_BOUNDS",
            ModelError::InvalidConstraintBounds { .. } => "CONSTRAINT_INVALID_BOUNDS",
            ModelError::InvalidCoefficient { .. } => "COEFFICIENT_INVALID",
            ModelError::MismatchedLengths { .. } => "EXPR_MISMATCHED_LENGTHS",
            ModelError::EmptyAllDifferent => "ALL_DIFFERENT_EMPTY",
            ModelError::SolveRequired { .. } => "SOLVE_REQUIRED",
        }
    }
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::ForeignHandle { expected, found } => write!(
                f,
                "[{}] Handle belongs to model {} but was used with model {}",
                self.code(),
                found,
                expected
            ),
            ModelError::InvalidVariableId(id) => write!(
                f,
                "[{}] Variable ID {} does not exist",
                self.code(),
                id.inner()
            ),
            ModelError::InvalidConstraintId(id) => write!(
                f,
                "[{}] Constraint ID {} does not exist",
                self.code(),
                id.inner()
            ),
            ModelError::InvalidDomain { lower, upper } => write!(
                f,
                "[{}] Variable domain invalid: lower ({}) > upper ({})",
                self.code(),
                lower,
                upper
            ),
            ModelError::InvalidVariableBounds { lower, upper } => write!(
                f,
                "[{}] Variable bounds invalid: lower ({}) > upper ({})",
                self.code(),
                lower,
                upper
            ),
            ModelError::InvalidConstraintBounds { lower, upper } => write!(
                f,
                "[{}] Constraint bounds invalid: lower ({}) > upper ({})",
                self.code(),
                lower,
                upper
            ),
            ModelError::InvalidCoefficient { coefficient } => write!(
                f,
                "[{}] Coefficient must be finite (got {})",
                self.code(),
                coefficient
            ),
            ModelError::MismatchedLengths {
                variables,
                coefficients,
            } => write!(
                f,
                "[{}] variables ({}) and coefficients ({}) must have the same length",
                self.code(),
                variables,
                coefficients
            ),
            ModelError::EmptyAllDifferent => write!(
                f,
                "[{}] All-different requires at least one variable",
                self.code()
            ),
            ModelError::SolveRequired { operation } => write!(
                f,
                "[{}] solve must be called before {}",
                self.code(),
                operation
            ),
        }
    }
}

impl std::error::Error for ModelError {}

impl From<LinearExprError> for ModelError {
    fn from(err: LinearExprError) -> Self {
        match err {
            LinearExprError::MismatchedLengths {
                variables,
                coefficients,
            } => ModelError::MismatchedLengths {
                variables,
                coefficients,
            },
        }
    }
}
