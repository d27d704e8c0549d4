//! Mortgage calculator core: payment engine, period solver, LTV policy and
//! the active-field recompute step that ties them together.

pub mod ltv;
pub mod payment;
pub mod period;
pub mod recompute;

pub use ltv::{min_down_payment, PropertyOwnership};
pub use payment::compute_monthly_payment;
pub use period::{compute_period_years, PeriodBoundary, PeriodSolution};
pub use recompute::{recompute, ActiveField, CalculatorState, CalculatorStatus};
