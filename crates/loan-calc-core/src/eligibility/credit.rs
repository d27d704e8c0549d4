//! Consumer-credit eligibility. Unsecured, so there is no LTV test; the
//! amount is capped against annual income instead, existing debts count
//! toward DTI and the stress test adds a margin to the offered rate.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::annuity::{annuity_payment, checked_total, monthly_rate, months_in, round_payment};
use crate::eligibility::assessment::{score_band, CreditRiskLevel};
use crate::policy::LoanPolicy;
use crate::{types::*, LoanCalcError, LoanCalcResult};

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditEligibilityInput {
    pub amount: Money,
    pub annual_rate_percent: Percent,
    /// Fractional years allowed, as in the credit calculator.
    pub period_years: Years,
    pub monthly_income: Money,
    #[serde(default)]
    pub monthly_expenses: Money,
    /// Monthly service of debts that stay open alongside the new credit.
    #[serde(default)]
    pub existing_debts: Money,
    pub age: u32,
    #[serde(default = "default_credit_score")]
    pub credit_score: u32,
    #[serde(default = "default_employment_years")]
    pub employment_years: Decimal,
}

fn default_credit_score() -> u32 {
    750
}

fn default_employment_years() -> Decimal {
    dec!(5)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditCriteriaResults {
    pub dti_approved: bool,
    pub credit_amount_approved: bool,
    pub age_approved: bool,
    pub stress_test_approved: bool,
    pub credit_approved: bool,
    pub employment_approved: bool,
}

impl CreditCriteriaResults {
    pub fn all_met(&self) -> bool {
        self.dti_approved
            && self.credit_amount_approved
            && self.age_approved
            && self.stress_test_approved
            && self.credit_approved
            && self.employment_approved
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditEligibilityOutput {
    pub approved: bool,
    pub amount: Money,
    pub monthly_payment: Money,
    pub total_payment: Money,
    pub total_interest: Money,
    pub dti_percent: Percent,
    pub max_dti_percent: Percent,
    pub credit_to_income_percent: Percent,
    pub max_credit_to_income_percent: Percent,
    pub stress_rate_percent: Percent,
    pub stress_monthly_payment: Money,
    pub stress_dti_percent: Percent,
    pub age_at_maturity: Years,
    pub credit_risk_level: CreditRiskLevel,
    pub criteria: CreditCriteriaResults,
    pub rejection_reasons: Vec<String>,
    pub approval_conditions: Vec<String>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

pub fn assess_credit_eligibility(
    input: &CreditEligibilityInput,
    policy: &LoanPolicy,
) -> LoanCalcResult<ComputationOutput<CreditEligibilityOutput>> {
    let start = Instant::now();
    let standards = &policy.credit_eligibility;

    validate_input(input)?;

    let n = months_in(input.period_years);
    let monthly = annuity_payment(input.amount, monthly_rate(input.annual_rate_percent), n)?;
    let total_payment = checked_total(monthly, n)?;
    let total_interest = total_payment - input.amount;
    let other_debt = input.monthly_expenses + input.existing_debts;

    // -- DTI ------------------------------------------------------------------
    let dti_percent = (monthly + other_debt) / input.monthly_income * dec!(100);
    let dti_approved = dti_percent <= standards.max_dti_percent;

    // -- Amount against annual income -----------------------------------------
    let credit_to_income_percent = input.amount / (input.monthly_income * dec!(12)) * dec!(100);
    let credit_amount_approved =
        credit_to_income_percent <= standards.max_credit_to_income_percent;

    // -- Age at maturity ------------------------------------------------------
    let age_at_maturity = Decimal::from(input.age) + input.period_years;
    let age_approved = age_at_maturity <= Decimal::from(standards.max_age_at_maturity);

    // -- Stress test ----------------------------------------------------------
    let stress_rate_percent = input.annual_rate_percent + standards.stress_rate_margin_percent;
    let stress_payment = annuity_payment(input.amount, monthly_rate(stress_rate_percent), n)?;
    let stress_dti_percent = (stress_payment + other_debt) / input.monthly_income * dec!(100);
    let stress_test_approved = stress_dti_percent <= standards.max_dti_percent;

    // -- Credit score ---------------------------------------------------------
    let credit_risk_level = score_band(
        input.credit_score,
        standards.min_credit_score,
        standards.good_credit_score,
        standards.excellent_credit_score,
    );
    let credit_approved = credit_risk_level != CreditRiskLevel::Poor;

    let employment_approved = input.employment_years >= standards.min_employment_years;

    let criteria = CreditCriteriaResults {
        dti_approved,
        credit_amount_approved,
        age_approved,
        stress_test_approved,
        credit_approved,
        employment_approved,
    };

    let dti_shown = dti_percent.round_dp(1);
    let cti_shown = credit_to_income_percent.round_dp(1);
    let stress_shown = stress_dti_percent.round_dp(1);

    let mut rejection_reasons = Vec::new();
    if !dti_approved {
        rejection_reasons.push(format!(
            "DTI ratio {dti_shown}% exceeds maximum {}%",
            standards.max_dti_percent
        ));
    }
    if !credit_amount_approved {
        rejection_reasons.push(format!(
            "Credit amount {}% of annual income exceeds maximum {}%",
            credit_to_income_percent.round_dp(0),
            standards.max_credit_to_income_percent
        ));
    }
    if !age_approved {
        rejection_reasons.push(format!(
            "Age at maturity {} exceeds maximum {}",
            age_at_maturity.normalize(),
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
    if input.credit_score < standards.surcharge_credit_score {
        approval_conditions.push("Higher interest rate due to credit score".to_string());
    }
    if dti_percent > standards.cosigner_dti_percent {
        approval_conditions.push("Co-signer may be required".to_string());
    }
    if credit_to_income_percent > standards.collateral_credit_to_income_percent {
        approval_conditions.push("Additional collateral required".to_string());
    }

    let output = CreditEligibilityOutput {
        approved: criteria.all_met(),
        amount: input.amount,
        monthly_payment: round_payment(monthly),
        total_payment: total_payment.round_dp(2),
        total_interest: total_interest.round_dp(2),
        dti_percent: dti_shown,
        max_dti_percent: standards.max_dti_percent,
        credit_to_income_percent: cti_shown,
        max_credit_to_income_percent: standards.max_credit_to_income_percent,
        stress_rate_percent,
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
        "Consumer credit eligibility (DTI, amount-to-income, stress, age, credit, employment)",
        standards,
        Vec::new(),
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn validate_input(input: &CreditEligibilityInput) -> LoanCalcResult<()> {
    if input.amount <= Decimal::ZERO {
        return Err(LoanCalcError::invalid("amount", "Credit amount must be positive."));
    }
    if input.annual_rate_percent < Decimal::ZERO {
        return Err(LoanCalcError::invalid(
            "annual_rate_percent",
            "Interest rate cannot be negative.",
        ));
    }
    if input.period_years <= Decimal::ZERO || input.period_years > Decimal::from(MAX_PERIOD_YEARS) {
        return Err(LoanCalcError::invalid(
            "period_years",
            format!("Period must be greater than zero and at most {MAX_PERIOD_YEARS} years."),
        ));
    }
    if input.monthly_income <= Decimal::ZERO {
        return Err(LoanCalcError::invalid(
            "monthly_income",
            "Monthly income must be positive.",
        ));
    }
    if input.monthly_expenses < Decimal::ZERO || input.existing_debts < Decimal::ZERO {
        return Err(LoanCalcError::invalid(
            "monthly_expenses",
            "Expenses and existing debts cannot be negative.",
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
