//! Consumer-credit repayment: annuity payment over possibly fractional
//! years and the simple-interest remaining amount used by refinance flows.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::annuity::{annuity_payment, monthly_rate, months_in, round_payment};
use crate::{types::*, LoanCalcError, LoanCalcResult};

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditPaymentInput {
    pub amount: Money,
    /// Repayment period; fractional years are allowed (1.5 = 18 months).
    pub period_years: Years,
    pub annual_rate_percent: Percent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditPaymentOutput {
    /// Payment rounded up to a whole currency unit.
    pub monthly_payment: Money,
    pub monthly_payment_exact: Money,
    pub number_of_payments: Decimal,
    pub total_repayment: Money,
    pub total_interest: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemainingAmountInput {
    pub initial_amount: Money,
    pub years: Years,
    #[serde(default = "default_remaining_rate")]
    pub annual_rate_percent: Percent,
}

fn default_remaining_rate() -> Percent {
    dec!(5)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemainingAmountOutput {
    pub remaining_amount: Money,
    pub accrued_interest: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Annuity payment for a consumer credit, rounded up to a whole unit.
pub fn credit_annuity_payment(
    amount: Money,
    period_years: Years,
    annual_rate_percent: Percent,
) -> LoanCalcResult<Money> {
    validate_credit(amount, period_years, annual_rate_percent)?;
    let exact = annuity_payment(amount, monthly_rate(annual_rate_percent), months_in(period_years))?;
    Ok(round_payment(exact))
}

/// Remaining amount under simple interest, truncated to whole units:
/// `initial * (1 + rate/100 * years)`.
pub fn remaining_amount(
    initial_amount: Money,
    years: Years,
    annual_rate_percent: Percent,
) -> LoanCalcResult<Money> {
    if initial_amount < Decimal::ZERO {
        return Err(LoanCalcError::invalid(
            "initial_amount",
            "Initial amount cannot be negative.",
        ));
    }
    if years < Decimal::ZERO {
        return Err(LoanCalcError::invalid("years", "Years cannot be negative."));
    }
    if annual_rate_percent < Decimal::ZERO {
        return Err(LoanCalcError::invalid(
            "annual_rate_percent",
            "Interest rate cannot be negative.",
        ));
    }

    let growth = Decimal::ONE + annual_rate_percent / dec!(100) * years;
    Ok((initial_amount * growth).trunc())
}

pub fn calculate_credit_payment(
    input: &CreditPaymentInput,
) -> LoanCalcResult<ComputationOutput<CreditPaymentOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_credit(input.amount, input.period_years, input.annual_rate_percent)?;

    let n = months_in(input.period_years);
    let exact = annuity_payment(input.amount, monthly_rate(input.annual_rate_percent), n)?;
    let rounded = round_payment(exact);

    if !n.fract().is_zero() {
        warnings.push(format!(
            "Period of {} years is not a whole number of months.",
            input.period_years
        ));
    }

    let total_repayment = rounded * n;
    let output = CreditPaymentOutput {
        monthly_payment: rounded,
        monthly_payment_exact: exact,
        number_of_payments: n,
        total_repayment,
        total_interest: total_repayment - input.amount,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "compounding": "monthly",
        "rounding": "payment rounded up to whole currency unit",
    });

    Ok(with_metadata(
        "Consumer credit annuity",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

pub fn calculate_remaining_amount(
    input: &RemainingAmountInput,
) -> LoanCalcResult<ComputationOutput<RemainingAmountOutput>> {
    let start = Instant::now();
    let remaining = remaining_amount(input.initial_amount, input.years, input.annual_rate_percent)?;

    let output = RemainingAmountOutput {
        remaining_amount: remaining,
        accrued_interest: remaining - input.initial_amount.trunc(),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Simple interest accrual",
        &serde_json::json!({ "annual_rate_percent": input.annual_rate_percent.to_string() }),
        Vec::new(),
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn validate_credit(amount: Money, period_years: Years, annual_rate_percent: Percent) -> LoanCalcResult<()> {
    if amount <= Decimal::ZERO {
        return Err(LoanCalcError::invalid("amount", "Credit amount must be positive."));
    }
    if period_years <= Decimal::ZERO {
        return Err(LoanCalcError::invalid(
            "period_years",
            "Period must be greater than zero.",
        ));
    }
    if annual_rate_percent < Decimal::ZERO {
        return Err(LoanCalcError::invalid(
            "annual_rate_percent",
            "Interest rate cannot be negative.",
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_standard_credit_payment() {
        // 100k over 5 years at 8.5% ≈ 2,051.65
        assert_eq!(credit_annuity_payment(dec!(100_000), dec!(5), dec!(8.5)).unwrap(), dec!(2052));
    }

    #[test]
    fn test_fractional_years() {
        // 50k over 18 months at 8.5% ≈ 2,968.44
        assert_eq!(credit_annuity_payment(dec!(50_000), dec!(1.5), dec!(8.5)).unwrap(), dec!(2969));
    }

    #[test]
    fn test_small_amount() {
        let p = credit_annuity_payment(dec!(1000), dec!(2), dec!(8.5)).unwrap();
        assert!(p > dec!(45) && p < dec!(55), "got {p}");
    }

    #[test]
    fn test_lower_rate_lower_payment() {
        let low = credit_annuity_payment(dec!(100_000), dec!(5), dec!(8.375)).unwrap();
        let standard = credit_annuity_payment(dec!(100_000), dec!(5), dec!(8.5)).unwrap();
        assert!(low < standard);
        assert!(standard - low < dec!(20));
    }

    #[test]
    fn test_zero_amount_rejected() {
        let err = credit_annuity_payment(Decimal::ZERO, dec!(5), dec!(8.5)).unwrap_err();
        match err {
            LoanCalcError::InvalidInput { field, .. } => assert_eq!(field, "amount"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_remaining_amount_simple_interest() {
        assert_eq!(remaining_amount(dec!(500_000), dec!(10), dec!(5)).unwrap(), dec!(750_000));
        assert_eq!(remaining_amount(dec!(400_000), dec!(3), dec!(5)).unwrap(), dec!(460_000));
    }

    #[test]
    fn test_remaining_amount_truncates() {
        // 123,457 * 1.0375 = 128,086.6375
        assert_eq!(remaining_amount(dec!(123_457), dec!(0.5), dec!(7.5)).unwrap(), dec!(128_086));
    }

    #[test]
    fn test_remaining_amount_zero_years() {
        assert_eq!(remaining_amount(dec!(200_000), Decimal::ZERO, dec!(8)).unwrap(), dec!(200_000));
    }

    #[test]
    fn test_credit_envelope_totals() {
        let out = calculate_credit_payment(&CreditPaymentInput {
            amount: dec!(100_000),
            period_years: dec!(5),
            annual_rate_percent: dec!(8.5),
        })
        .unwrap();
        let r = &out.result;
        assert_eq!(r.number_of_payments, dec!(60));
        assert_eq!(r.total_repayment, dec!(2052) * dec!(60));
        assert_eq!(r.total_interest, r.total_repayment - dec!(100_000));
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_remaining_envelope_default_rate() {
        let input: RemainingAmountInput =
            serde_json::from_str(r#"{"initial_amount": "500000", "years": "10"}"#).unwrap();
        let out = calculate_remaining_amount(&input).unwrap();
        assert_eq!(out.result.remaining_amount, dec!(750_000));
        assert_eq!(out.result.accrued_interest, dec!(250_000));
    }
}
