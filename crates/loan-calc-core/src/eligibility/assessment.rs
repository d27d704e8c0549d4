//! Mortgage eligibility: LTV, debt-to-income, stress test, age at maturity,
//! credit score band and employment stability, with rejection reasons and
//! approval conditions.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::annuity::{checked_total, round_payment, whole_months};
use crate::mortgage::ltv::PropertyOwnership;
use crate::mortgage::payment::compute_monthly_payment;
use crate::policy::{EligibilityStandards, LoanPolicy};
use crate::{types::*, LoanCalcError, LoanCalcResult};

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibilityInput {
    pub property_value: Money,
    #[serde(default)]
    pub down_payment: Money,
    pub annual_rate_percent: Percent,
    pub period_years: u32,
    pub monthly_income: Money,
    /// Existing monthly debt service (other loans, cards).
    #[serde(default)]
    pub monthly_expenses: Money,
    pub age: u32,
    #[serde(default = "default_credit_score")]
    pub credit_score: u32,
    #[serde(default = "default_employment_years")]
    pub employment_years: Decimal,
    /// When set, the category's LTV replaces the generic LTV cap.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ownership: Option<PropertyOwnership>,
}

fn default_credit_score() -> u32 {
    750
}

fn default_employment_years() -> Decimal {
    dec!(5)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditRiskLevel {
    Poor,
    Fair,
    Good,
    Excellent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriteriaResults {
    pub ltv_approved: bool,
    pub dti_approved: bool,
    pub age_approved: bool,
    pub stress_test_approved: bool,
    pub credit_approved: bool,
    pub employment_approved: bool,
}

impl CriteriaResults {
    pub fn all_met(&self) -> bool {
        self.ltv_approved
            && self.dti_approved
            && self.age_approved
            && self.stress_test_approved
            && self.credit_approved
            && self.employment_approved
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibilityOutput {
    pub approved: bool,
    pub loan_amount: Money,
    pub monthly_payment: Money,
    /// Down payment plus every scheduled payment.
    pub total_payment: Money,
    pub total_interest: Money,
    pub ltv_percent: Percent,
    pub max_ltv_percent: Percent,
    pub dti_percent: Percent,
    pub max_dti_percent: Percent,
    pub stress_monthly_payment: Money,
    pub stress_dti_percent: Percent,
    pub age_at_maturity: u32,
    pub credit_risk_level: CreditRiskLevel,
    pub criteria: CriteriaResults,
    pub rejection_reasons: Vec<String>,
    pub approval_conditions: Vec<String>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

pub fn assess_eligibility(
    input: &EligibilityInput,
    policy: &LoanPolicy,
) -> LoanCalcResult<ComputationOutput<EligibilityOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    let standards = &policy.eligibility;

    validate_input(input)?;

    let years = Decimal::from(input.period_years);
    let n = Decimal::from(whole_months(input.period_years)?);
    let loan = input.property_value - input.down_payment;

    let monthly = compute_monthly_payment(
        input.property_value,
        input.down_payment,
        years,
        input.annual_rate_percent,
    )?;
    let total_payment = checked_total(monthly, n)? + input.down_payment;
    let total_interest = total_payment - input.property_value;

    // -- LTV ------------------------------------------------------------------
    let ltv_percent = loan / input.property_value * dec!(100);
    let max_ltv_percent = match input.ownership {
        Some(o) => policy.ltv.ratio_for(o) * dec!(100),
        None => {
            warnings.push(format!(
                "No ownership category given; generic {}% LTV cap applied.",
                standards.max_ltv_percent
            ));
            standards.max_ltv_percent
        }
    };
    let ltv_approved = ltv_percent <= max_ltv_percent;

    // -- DTI ------------------------------------------------------------------
    let dti_percent = (monthly + input.monthly_expenses) / input.monthly_income * dec!(100);
    let dti_approved = dti_percent <= standards.max_dti_percent;

    // -- Age at maturity ------------------------------------------------------
    let age_at_maturity = input
        .age
        .checked_add(input.period_years)
        .ok_or_else(|| LoanCalcError::invalid("age", "Age at maturity is out of range."))?;
    let age_approved = age_at_maturity <= standards.max_age_at_maturity;

    // -- Stress test ----------------------------------------------------------
    let stress_payment = compute_monthly_payment(
        input.property_value,
        input.down_payment,
        years,
        standards.stress_rate_percent,
    )?;
    let stress_dti_percent =
        (stress_payment + input.monthly_expenses) / input.monthly_income * dec!(100);
    let stress_test_approved = stress_dti_percent <= standards.max_dti_percent;

    // -- Credit score ---------------------------------------------------------
    let credit_risk_level = credit_band(input.credit_score, standards);
    let credit_approved = credit_risk_level != CreditRiskLevel::Poor;

    // -- Employment -----------------------------------------------------------
    let employment_approved = input.employment_years >= standards.min_employment_years;

    let criteria = CriteriaResults {
        ltv_approved,
        dti_approved,
        age_approved,
        stress_test_approved,
        credit_approved,
        employment_approved,
    };

    let ltv_shown = ltv_percent.round_dp(1);
    let dti_shown = dti_percent.round_dp(1);
    let stress_shown = stress_dti_percent.round_dp(1);

    let mut rejection_reasons = Vec::new();
    if !ltv_approved {
        rejection_reasons.push(format!(
            "LTV ratio {ltv_shown}% exceeds maximum {max_ltv_percent}%"
        ));
    }
    if !dti_approved {
        rejection_reasons.push(format!(
            "DTI ratio {dti_shown}% exceeds maximum {}%",
            standards.max_dti_percent
        ));
    }
    if !age_approved {
        rejection_reasons.push(format!(
            "Age at maturity {age_at_maturity} exceeds maximum {}",
            standards.max_age_at_maturity
        ));
    }
    if !stress_test_approved {
        rejection_reasons.push(format!(
            "Stress test DTI {stress_shown}% exceeds maximum {}%",
            standards.max_dti_percent
        ));
    }
    if !credit_approved {
        rejection_reasons.push(format!(
            "Credit score {} below minimum {}",
            input.credit_score, standards.min_credit_score
        ));
    }
    if !employment_approved {
        rejection_reasons.push(format!(
            "Employment history {} years below minimum {} years",
            input.employment_years, standards.min_employment_years
        ));
    }

    let mut approval_conditions = Vec::new();
    if ltv_percent > standards.insurance_ltv_percent {
        approval_conditions.push("Mortgage insurance required".to_string());
    }
    if input.credit_score < standards.surcharge_credit_score {
        approval_conditions.push("Higher interest rate due to credit score".to_string());
    }
    if dti_percent > standards.income_verification_dti_percent {
        approval_conditions.push("Additional income verification required".to_string());
    }

    let output = EligibilityOutput {
        approved: criteria.all_met(),
        loan_amount: loan,
        monthly_payment: round_payment(monthly),
        total_payment: total_payment.round_dp(2),
        total_interest: total_interest.round_dp(2),
        ltv_percent: ltv_shown,
        max_ltv_percent,
        dti_percent: dti_shown,
        max_dti_percent: standards.max_dti_percent,
        stress_monthly_payment: round_payment(stress_payment),
        stress_dti_percent: stress_shown,
        age_at_maturity,
        credit_risk_level,
        criteria,
        rejection_reasons,
        approval_conditions,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Mortgage eligibility (LTV, DTI, stress, age, credit, employment)",
        standards,
        warnings,
        elapsed,
        output,
    ))
}

/// Band a credit score against the policy thresholds.
pub fn credit_band(score: u32, standards: &EligibilityStandards) -> CreditRiskLevel {
    score_band(
        score,
        standards.min_credit_score,
        standards.good_credit_score,
        standards.excellent_credit_score,
    )
}

pub(crate) fn score_band(score: u32, min: u32, good: u32, excellent: u32) -> CreditRiskLevel {
    if score < min {
        CreditRiskLevel::Poor
    } else if score < good {
        CreditRiskLevel::Fair
    } else if score < excellent {
        CreditRiskLevel::Good
    } else {
        CreditRiskLevel::Excellent
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn validate_input(input: &EligibilityInput) -> LoanCalcResult<()> {
    if input.property_value <= Decimal::ZERO {
        return Err(LoanCalcError::invalid(
            "property_value",
            "Property value must be positive.",
        ));
    }
    if input.down_payment < Decimal::ZERO || input.down_payment > input.property_value {
        return Err(LoanCalcError::invalid(
            "down_payment",
            "Down payment must be between zero and the property value.",
        ));
    }
    if input.period_years == 0 || input.period_years > MAX_PERIOD_YEARS {
        return Err(LoanCalcError::invalid(
            "period_years",
            format!("Period must be between 1 and {MAX_PERIOD_YEARS} years."),
        ));
    }
    if input.monthly_income <= Decimal::ZERO {
        return Err(LoanCalcError::invalid(
            "monthly_income",
            "Monthly income must be positive.",
        ));
    }
    if input.monthly_expenses < Decimal::ZERO {
        return Err(LoanCalcError::invalid(
            "monthly_expenses",
            "Monthly expenses cannot be negative.",
        ));
    }
    if input.age == 0 {
        return Err(LoanCalcError::invalid("age", "Age is required."));
    }
    if input.employment_years < Decimal::ZERO {
        return Err(LoanCalcError::invalid(
            "employment_years",
            "Employment years cannot be negative.",
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
