pub mod credit;
pub mod eligibility;
pub mod mortgage;
pub mod policy;
pub mod validation;
