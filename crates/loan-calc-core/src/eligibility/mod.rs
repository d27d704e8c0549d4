pub mod assessment;
pub mod credit;

pub use assessment::{assess_eligibility, CreditRiskLevel, EligibilityInput, EligibilityOutput};
pub use credit::{assess_credit_eligibility, CreditEligibilityInput, CreditEligibilityOutput};
