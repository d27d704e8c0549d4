pub mod annuity;
pub mod error;
pub mod policy;
pub mod types;

#[cfg(feature = "mortgage")]
pub mod mortgage;

#[cfg(feature = "credit")]
pub mod credit;

#[cfg(feature = "eligibility")]
pub mod eligibility;

#[cfg(feature = "validation")]
pub mod validation;

pub use error::LoanCalcError;
pub use policy::LoanPolicy;
pub use types::*;

/// Standard result type for all loan-calc operations
pub type LoanCalcResult<T> = Result<T, LoanCalcError>;
