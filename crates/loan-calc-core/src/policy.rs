//! Business policy: LTV ratios per ownership category, period bounds per
//! flow, property value cap and eligibility standards.
//!
//! `LoanPolicy::default()` carries the production constants. Callers may
//! load an override from JSON (or YAML in the CLI); every loaded policy must
//! pass [`LoanPolicy::validate`] before use.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::LoanCalcError;
use crate::types::{Money, PeriodBounds, Percent, Ratio};
use crate::LoanCalcResult;

/// Maximum financing ratio for each property-ownership category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LtvTable {
    pub no_property: Ratio,
    pub has_property: Ratio,
    pub selling_property: Ratio,
}

impl Default for LtvTable {
    fn default() -> Self {
        Self {
            no_property: dec!(0.75),
            has_property: dec!(0.50),
            selling_property: dec!(0.70),
        }
    }
}

/// Underwriting thresholds used by the eligibility assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EligibilityStandards {
    /// Cap on loan / property value when no ownership category is given.
    pub max_ltv_percent: Percent,
    /// Back-end debt-to-income cap.
    pub max_dti_percent: Percent,
    /// Reference rate for the affordability stress test.
    pub stress_rate_percent: Percent,
    pub max_age_at_maturity: u32,
    pub min_credit_score: u32,
    pub good_credit_score: u32,
    pub excellent_credit_score: u32,
    pub min_employment_years: Decimal,
    /// Above this LTV the approval carries a mortgage-insurance condition.
    pub insurance_ltv_percent: Percent,
    /// Below this score the approval carries a rate surcharge condition.
    pub surcharge_credit_score: u32,
    /// Above this DTI the approval requires additional income verification.
    pub income_verification_dti_percent: Percent,
}

impl Default for EligibilityStandards {
    fn default() -> Self {
        Self {
            max_ltv_percent: dec!(80),
            max_dti_percent: dec!(42),
            stress_rate_percent: dec!(6.5),
            max_age_at_maturity: 75,
            min_credit_score: 620,
            good_credit_score: 670,
            excellent_credit_score: 740,
            min_employment_years: dec!(2),
            insurance_ltv_percent: dec!(75),
            surcharge_credit_score: 700,
            income_verification_dti_percent: dec!(35),
        }
    }
}

/// Underwriting thresholds for unsecured consumer credit. Stricter than the
/// mortgage standards on age and credit score; no LTV since nothing is
/// pledged, a cap on the amount relative to annual income instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreditEligibilityStandards {
    /// Cap on new payment plus expenses plus existing debts over income.
    pub max_dti_percent: Percent,
    /// Cap on the credit amount as a share of annual income.
    pub max_credit_to_income_percent: Percent,
    /// Points added to the offered rate for the stress test.
    pub stress_rate_margin_percent: Percent,
    pub max_age_at_maturity: u32,
    pub min_credit_score: u32,
    pub good_credit_score: u32,
    pub excellent_credit_score: u32,
    pub min_employment_years: Decimal,
    pub surcharge_credit_score: u32,
    /// Above this DTI the approval may require a co-signer.
    pub cosigner_dti_percent: Percent,
    /// Above this credit-to-income share the approval requires collateral.
    pub collateral_credit_to_income_percent: Percent,
}

impl Default for CreditEligibilityStandards {
    fn default() -> Self {
        Self {
            max_dti_percent: dec!(42),
            max_credit_to_income_percent: dec!(300),
            stress_rate_margin_percent: dec!(2),
            max_age_at_maturity: 70,
            min_credit_score: 620,
            good_credit_score: 680,
            excellent_credit_score: 750,
            min_employment_years: dec!(2),
            surcharge_credit_score: 700,
            cosigner_dti_percent: dec!(35),
            collateral_credit_to_income_percent: dec!(200),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoanPolicy {
    pub ltv: LtvTable,
    /// Period range offered by the mortgage calculator.
    pub mortgage_period: PeriodBounds,
    /// Period range offered by the consumer-credit calculator.
    pub credit_period: PeriodBounds,
    pub max_property_value: Money,
    /// Rate used by the calculator pages before a bank offer is selected.
    pub default_rate_percent: Percent,
    pub eligibility: EligibilityStandards,
    pub credit_eligibility: CreditEligibilityStandards,
}

impl Default for LoanPolicy {
    fn default() -> Self {
        Self {
            ltv: LtvTable::default(),
            mortgage_period: PeriodBounds::new(4, 30),
            credit_period: PeriodBounds::new(1, 30),
            max_property_value: dec!(10_000_000),
            default_rate_percent: dec!(5),
            eligibility: EligibilityStandards::default(),
            credit_eligibility: CreditEligibilityStandards::default(),
        }
    }
}

impl LoanPolicy {
    /// Parse a policy from JSON. Missing keys keep their defaults.
    pub fn from_json(json: &str) -> LoanCalcResult<Self> {
        let policy: LoanPolicy = serde_json::from_str(json)?;
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> LoanCalcResult<()> {
        for (name, ratio) in [
            ("no_property", self.ltv.no_property),
            ("has_property", self.ltv.has_property),
            ("selling_property", self.ltv.selling_property),
        ] {
            if ratio <= Decimal::ZERO || ratio > Decimal::ONE {
                return Err(LoanCalcError::InvalidPolicy(format!(
                    "LTV ratio for {name} must be in (0, 1], got {ratio}"
                )));
            }
        }

        for (name, bounds) in [
            ("mortgage_period", self.mortgage_period),
            ("credit_period", self.credit_period),
        ] {
            if let Err(e) = bounds.validate() {
                return Err(LoanCalcError::InvalidPolicy(format!("{name}: {e}")));
            }
        }

        if self.max_property_value <= Decimal::ZERO {
            return Err(LoanCalcError::InvalidPolicy(
                "max_property_value must be positive".into(),
            ));
        }
        if self.default_rate_percent < Decimal::ZERO {
            return Err(LoanCalcError::InvalidPolicy(
                "default_rate_percent cannot be negative".into(),
            ));
        }

        let e = &self.eligibility;
        for (name, pct) in [
            ("max_ltv_percent", e.max_ltv_percent),
            ("max_dti_percent", e.max_dti_percent),
        ] {
            if pct <= Decimal::ZERO || pct > dec!(100) {
                return Err(LoanCalcError::InvalidPolicy(format!(
                    "{name} must be in (0, 100], got {pct}"
                )));
            }
        }
        if e.stress_rate_percent < Decimal::ZERO {
            return Err(LoanCalcError::InvalidPolicy(
                "stress_rate_percent cannot be negative".into(),
            ));
        }
        if !(e.min_credit_score <= e.good_credit_score
            && e.good_credit_score <= e.excellent_credit_score)
        {
            return Err(LoanCalcError::InvalidPolicy(
                "credit score thresholds must be ascending (min <= good <= excellent)".into(),
            ));
        }

        let c = &self.credit_eligibility;
        for (name, pct) in [
            ("credit_eligibility.max_dti_percent", c.max_dti_percent),
            (
                "credit_eligibility.max_credit_to_income_percent",
                c.max_credit_to_income_percent,
            ),
        ] {
            if pct <= Decimal::ZERO {
                return Err(LoanCalcError::InvalidPolicy(format!(
                    "{name} must be positive, got {pct}"
                )));
            }
        }
        if c.stress_rate_margin_percent < Decimal::ZERO {
            return Err(LoanCalcError::InvalidPolicy(
                "credit_eligibility.stress_rate_margin_percent cannot be negative".into(),
            ));
        }
        if !(c.min_credit_score <= c.good_credit_score
            && c.good_credit_score <= c.excellent_credit_score)
        {
            return Err(LoanCalcError::InvalidPolicy(
                "credit_eligibility score thresholds must be ascending".into(),
            ));
        }

        Ok(())
    }
}
