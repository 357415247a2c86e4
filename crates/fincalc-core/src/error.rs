use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CalcError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Non-convergence: {function} did not pay off after {iterations} periods (remaining balance: {remaining_balance})")]
    NonConvergence {
        function: String,
        iterations: u32,
        remaining_balance: Decimal,
    },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl CalcError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Arithmetic on `field` left the representable decimal range.
    pub(crate) fn overflow(field: &str, context: impl std::fmt::Display) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            reason: format!("{context} exceeds the representable decimal range"),
        }
    }
}

impl From<serde_json::Error> for CalcError {
    fn from(e: serde_json::Error) -> Self {
        CalcError::SerializationError(e.to_string())
    }
}
