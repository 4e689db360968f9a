//! Formula error types

/// Errors raised while validating or evaluating a custom formula
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormulaError {
    #[error("expression required")]
    EmptyExpression,

    #[error("Unknown variable: '{0}'")]
    UnknownVariable(String),

    #[error("Unknown condition field: '{0}' (use 'result' or a known variable)")]
    UnknownConditionField(String),

    #[error("Invalid condition on '{field}': {message}")]
    InvalidCondition { field: String, message: String },

    #[error("Parse error at position {position}: {message}")]
    Parse { position: usize, message: String },

    #[error("Variable not bound: '{0}'")]
    UnboundVariable(String),

    #[error("Modulo by zero")]
    ModuloByZero,

    #[error("Expression result is not a number")]
    NotANumber,
}

impl FormulaError {
    /// Validation errors are raised before evaluation and reject the formula
    /// outright; the rest surface inside an `Evaluation`
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::EmptyExpression
                | Self::UnknownVariable(_)
                | Self::UnknownConditionField(_)
                | Self::InvalidCondition { .. }
        )
    }
}

/// Result type alias for formula operations
pub type FormulaResult<T> = Result<T, FormulaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(FormulaError::EmptyExpression.is_validation());
        assert!(FormulaError::UnknownVariable("foo_bar".into()).is_validation());
        assert!(!FormulaError::ModuloByZero.is_validation());
        assert!(!FormulaError::Parse {
            position: 3,
            message: "x".into()
        }
        .is_validation());
    }

    #[test]
    fn test_messages_name_the_identifier() {
        let err = FormulaError::UnknownVariable("foo_bar".into());
        assert_eq!(err.to_string(), "Unknown variable: 'foo_bar'");
        assert_eq!(FormulaError::EmptyExpression.to_string(), "expression required");
    }
}
