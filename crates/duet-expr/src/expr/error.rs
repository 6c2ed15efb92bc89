//! Expression construction errors.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinearExprError {
    MismatchedLengths { variables: usize, coefficients: usize },
}

impl LinearExprError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            LinearExprError::MismatchedLengths { .. } => "EXPR_MISMATCHED_LENGTHS",
        }
    }
}

impl std::fmt::Display for LinearExprError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LinearExprError::MismatchedLengths {
                variables,
                coefficients,
            } => write!(
                f,
                "[{}] variables ({}) and coefficients ({}) must have the same length",
                self.code(),
                variables,
                coefficients
            ),
        }
    }
}

impl std::error::Error for LinearExprError {}

#[cfg(test)]
mod tests {
    use super::LinearExprError;

    #[test]
    fn error_code_is_stable() {
        let err = LinearExprError::MismatchedLengths {
            variables: 2,
            coefficients: 1,
        };
        assert_eq!(err.code(), "EXPR_MISMATCHED_LENGTHS");
    }

    #[test]
    fn display_prefixes_error_code() {
        let rendered = LinearExprError::MismatchedLengths {
            variables: 3,
            coefficients: 2,
        }
        .to_string();
        assert!(rendered.starts_with("[EXPR_MISMATCHED_LENGTHS]"));
        assert!(rendered.contains("(3)"));
    }
}
