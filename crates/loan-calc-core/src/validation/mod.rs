//! Declarative multi-step form validation.
//!
//! A step is described by a [`schema::StepSchema`]: an ordered list of field
//! rules, each with its checks and an optional condition on other fields.
//! [`steps`] holds the built-in steps of the mortgage and credit flows and
//! [`options`] the dropdown code tables those conditions depend on.

pub mod options;
pub mod schema;
pub mod steps;

pub use options::{IncomeSource, Obligation};
pub use schema::{validate, FormValues, StepSchema, ValidationReport};
pub use steps::{validate_step, FormStep};
