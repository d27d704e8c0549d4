use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoanCalcError {
    #[error("Invalid input for {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    /// The requested payment never amortises the loan within policy bounds.
    #[error("Payment too low: increase the monthly payment to at least {minimum_payment}")]
    PeriodUnsolvable { minimum_payment: Decimal },

    #[error("Invalid policy: {0}")]
    InvalidPolicy(String),

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl LoanCalcError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        LoanCalcError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for LoanCalcError {
    fn from(e: serde_json::Error) -> Self {
        LoanCalcError::SerializationError(e.to_string())
    }
}
