use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::annuity::{
    annuity_payment, checked_total, monthly_rate, months_in, round_payment, whole_months,
};
use crate::{types::*, LoanCalcError, LoanCalcResult};

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MortgagePaymentInput {
    /// Property price (the amount being purchased).
    pub property_value: Money,
    pub down_payment: Money,
    pub annual_rate_percent: Percent,
    pub period_years: u32,
    /// Emit a month-by-month amortization schedule.
    #[serde(default)]
    pub include_schedule: bool,
    /// First payment date; schedule rows carry dates only when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub month: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    pub payment: Money,
    pub interest: Money,
    pub principal: Money,
    pub balance: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MortgagePaymentOutput {
    pub loan_amount: Money,
    pub monthly_payment: Money,
    /// Payment rounded up to a whole currency unit, as displayed.
    pub monthly_payment_rounded: Money,
    pub total_payment: Money,
    pub total_interest: Money,
    pub number_of_payments: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Vec<ScheduleRow>>,
}

/// Slider limits for the monthly-payment field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentBounds {
    /// Payment at the longest allowed period.
    pub min_payment: Money,
    /// Payment at the shortest allowed period.
    pub max_payment: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentBoundsInput {
    pub principal: Money,
    #[serde(default)]
    pub down_payment: Money,
    pub annual_rate_percent: Percent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<PeriodBounds>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Monthly payment for financing `principal - down_payment` over
/// `period_years` at `annual_rate_percent`.
///
/// Pure. Returns `InvalidInput` instead of a NaN-like value when the period
/// is not positive, the rate is negative or the down payment exceeds the
/// principal; callers keep their previous value in that case.
pub fn compute_monthly_payment(
    principal: Money,
    down_payment: Money,
    period_years: Years,
    annual_rate_percent: Percent,
) -> LoanCalcResult<Money> {
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
    let loan = loan_amount(principal, down_payment)?;

    annuity_payment(loan, monthly_rate(annual_rate_percent), months_in(period_years))
}

/// Minimum and maximum monthly payment over the allowed period range.
pub fn payment_bounds(
    principal: Money,
    down_payment: Money,
    annual_rate_percent: Percent,
    bounds: &PeriodBounds,
) -> LoanCalcResult<PaymentBounds> {
    bounds.validate()?;
    let min_payment = compute_monthly_payment(
        principal,
        down_payment,
        Decimal::from(bounds.max_years),
        annual_rate_percent,
    )?;
    let max_payment = compute_monthly_payment(
        principal,
        down_payment,
        Decimal::from(bounds.min_years),
        annual_rate_percent,
    )?;

    // Keep the slider range non-empty when nothing is financed.
    let max_payment = if max_payment.is_zero() {
        Decimal::ONE
    } else {
        round_payment(max_payment)
    };

    Ok(PaymentBounds {
        min_payment: round_payment(min_payment),
        max_payment,
    })
}

pub fn calculate_payment_bounds(
    input: &PaymentBoundsInput,
) -> LoanCalcResult<ComputationOutput<PaymentBounds>> {
    let start = Instant::now();
    let bounds = input.bounds.unwrap_or_default();
    let result = payment_bounds(
        input.principal,
        input.down_payment,
        input.annual_rate_percent,
        &bounds,
    )?;

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Payment range over allowed periods",
        &bounds,
        Vec::new(),
        elapsed,
        result,
    ))
}

/// Full payment breakdown with totals and an optional amortization schedule.
pub fn calculate_mortgage_payment(
    input: &MortgagePaymentInput,
) -> LoanCalcResult<ComputationOutput<MortgagePaymentOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_input(input)?;

    let loan = loan_amount(input.property_value, input.down_payment)?;
    let years = Decimal::from(input.period_years);
    let monthly = compute_monthly_payment(
        input.property_value,
        input.down_payment,
        years,
        input.annual_rate_percent,
    )?;
    let n = whole_months(input.period_years)?;

    let total_payment = checked_total(monthly, Decimal::from(n))?;
    let total_interest = total_payment - loan;

    if !PeriodBounds::default().contains(input.period_years) {
        warnings.push(format!(
            "Period of {} years is outside the standard 1-30 year range.",
            input.period_years
        ));
    }
    if loan.is_zero() {
        warnings.push("Down payment covers the full price; nothing is financed.".into());
    }

    let schedule = if input.include_schedule {
        Some(build_schedule(
            loan,
            monthly,
            monthly_rate(input.annual_rate_percent),
            n,
            input.start_date,
        )?)
    } else {
        None
    };

    let output = MortgagePaymentOutput {
        loan_amount: loan,
        monthly_payment: monthly,
        monthly_payment_rounded: round_payment(monthly),
        total_payment,
        total_interest,
        number_of_payments: n,
        schedule,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "compounding": "monthly",
        "monthly_rate": monthly_rate(input.annual_rate_percent).to_string(),
        "rounding": "payment rounded up to whole currency unit",
    });

    Ok(with_metadata(
        "Fixed-rate annuity (level monthly payment)",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn loan_amount(principal: Money, down_payment: Money) -> LoanCalcResult<Money> {
    if principal < Decimal::ZERO {
        return Err(LoanCalcError::invalid(
            "principal",
            "Principal cannot be negative.",
        ));
    }
    if down_payment < Decimal::ZERO {
        return Err(LoanCalcError::invalid(
            "down_payment",
            "Down payment cannot be negative.",
        ));
    }
    let loan = principal - down_payment;
    if loan < Decimal::ZERO {
        return Err(LoanCalcError::invalid(
            "down_payment",
            "Down payment cannot exceed the principal.",
        ));
    }
    Ok(loan)
}

fn validate_input(input: &MortgagePaymentInput) -> LoanCalcResult<()> {
    if input.property_value <= Decimal::ZERO {
        return Err(LoanCalcError::invalid(
            "property_value",
            "Property value must be positive.",
        ));
    }
    if input.period_years == 0 {
        return Err(LoanCalcError::invalid(
            "period_years",
            "Period must be at least one year.",
        ));
    }
    if input.period_years > MAX_PERIOD_YEARS {
        return Err(LoanCalcError::invalid(
            "period_years",
            format!("Period cannot exceed {MAX_PERIOD_YEARS} years."),
        ));
    }
    Ok(())
}

fn build_schedule(
    loan: Money,
    payment: Money,
    rate: Decimal,
    months: u32,
    start_date: Option<NaiveDate>,
) -> LoanCalcResult<Vec<ScheduleRow>> {
    let mut rows = Vec::with_capacity(months as usize);
    let mut balance = loan;

    for month in 1..=months {
        let interest = balance * rate;
        let mut principal = payment - interest;
        // Final row absorbs the residue left by rounding.
        if month == months || principal > balance {
            principal = balance;
        }
        balance -= principal;

        let date = match start_date {
            Some(d) => Some(d.checked_add_months(Months::new(month - 1)).ok_or_else(|| {
                LoanCalcError::invalid("start_date", "Schedule date out of range.")
            })?),
            None => None,
        };

        rows.push(ScheduleRow {
            month,
            date,
            payment: (interest + principal).round_dp(2),
            interest: interest.round_dp(2),
            principal: principal.round_dp(2),
            balance: balance.round_dp(2),
        });
    }

    Ok(rows)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn base_input() -> MortgagePaymentInput {
        MortgagePaymentInput {
            property_value: dec!(1_000_000),
            down_payment: dec!(200_000),
            annual_rate_percent: dec!(5),
            period_years: 30,
            include_schedule: false,
            start_date: None,
        }
    }

    #[test]
    fn test_standard_30_year_payment() {
        let p = compute_monthly_payment(dec!(1_000_000), dec!(200_000), dec!(30), dec!(5)).unwrap();
        assert_eq!(round_payment(p), dec!(4295));
    }

    #[test]
    fn test_15_year_payment_higher() {
        let p15 = compute_monthly_payment(dec!(800_000), Decimal::ZERO, dec!(15), dec!(5)).unwrap();
        let p30 = compute_monthly_payment(dec!(800_000), Decimal::ZERO, dec!(30), dec!(5)).unwrap();
        assert!(p15 > p30);
        // 800k / 15y / 5% ≈ 6,326.35
        assert!((p15 - dec!(6326.35)).abs() < dec!(0.01), "got {p15}");
    }

    #[test]
    fn test_zero_rate_is_straight_line() {
        let p = compute_monthly_payment(dec!(600_000), dec!(240_000), dec!(10), Decimal::ZERO).unwrap();
        assert_eq!(p, dec!(3000));
    }

    #[test]
    fn test_zero_loan_pays_nothing() {
        let p = compute_monthly_payment(dec!(500_000), dec!(500_000), dec!(20), dec!(5)).unwrap();
        assert_eq!(p, Decimal::ZERO);
    }

    #[test]
    fn test_zero_period_rejected() {
        let err = compute_monthly_payment(dec!(500_000), Decimal::ZERO, Decimal::ZERO, dec!(5)).unwrap_err();
        match err {
            LoanCalcError::InvalidInput { field, .. } => assert_eq!(field, "period_years"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_down_payment_above_principal_rejected() {
        let err = compute_monthly_payment(dec!(100_000), dec!(200_000), dec!(10), dec!(5)).unwrap_err();
        match err {
            LoanCalcError::InvalidInput { field, .. } => assert_eq!(field, "down_payment"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_negative_rate_rejected() {
        assert!(compute_monthly_payment(dec!(100_000), Decimal::ZERO, dec!(10), dec!(-1)).is_err());
    }

    #[test]
    fn test_payment_bounds() {
        let b = payment_bounds(dec!(1_000_000), dec!(250_000), dec!(5), &PeriodBounds::default()).unwrap();
        // 750k at 5%: 30y ≈ 4,026.16, 1y ≈ 64,205.61
        assert_eq!(b.min_payment, dec!(4027));
        assert_eq!(b.max_payment, dec!(64206));
    }

    #[test]
    fn test_payment_bounds_nothing_financed() {
        let b = payment_bounds(dec!(500_000), dec!(500_000), dec!(5), &PeriodBounds::default()).unwrap();
        assert_eq!(b.min_payment, Decimal::ZERO);
        assert_eq!(b.max_payment, Decimal::ONE);
    }

    #[test]
    fn test_payment_bounds_envelope_uses_given_bounds() {
        let out = calculate_payment_bounds(&PaymentBoundsInput {
            principal: dec!(1_000_000),
            down_payment: dec!(250_000),
            annual_rate_percent: dec!(5),
            bounds: Some(PeriodBounds::new(4, 30)),
        })
        .unwrap();
        assert_eq!(out.result.min_payment, dec!(4027));
        assert!(out.result.max_payment < dec!(64206));
    }

    #[test]
    fn test_totals() {
        let out = calculate_mortgage_payment(&base_input()).unwrap().result;
        assert_eq!(out.loan_amount, dec!(800_000));
        assert_eq!(out.number_of_payments, 360);
        assert_eq!(out.monthly_payment_rounded, dec!(4295));
        assert_eq!(out.total_payment, out.monthly_payment * dec!(360));
        assert_eq!(out.total_interest, out.total_payment - dec!(800_000));
        assert!(out.schedule.is_none());
    }

    #[test]
    fn test_schedule_amortises_to_zero() {
        let mut input = base_input();
        input.period_years = 5;
        input.include_schedule = true;
        input.start_date = NaiveDate::from_ymd_opt(2025, 1, 31);
        let out = calculate_mortgage_payment(&input).unwrap().result;
        let schedule = out.schedule.unwrap();

        assert_eq!(schedule.len(), 60);
        assert_eq!(schedule.last().unwrap().balance, Decimal::ZERO);
        assert_eq!(schedule[1].date, NaiveDate::from_ymd_opt(2025, 2, 28));

        let repaid: Decimal = schedule.iter().map(|r| r.principal).sum();
        assert!((repaid - dec!(800_000)).abs() < dec!(1), "repaid {repaid}");

        // Interest share falls as the balance shrinks.
        assert!(schedule[0].interest > schedule[59].interest);
    }

    #[test]
    fn test_full_down_payment_warns() {
        let mut input = base_input();
        input.down_payment = input.property_value;
        let out = calculate_mortgage_payment(&input).unwrap();
        assert_eq!(out.result.monthly_payment, Decimal::ZERO);
        assert!(!out.warnings.is_empty());
    }

    #[test]
    fn test_zero_property_value_rejected() {
        let mut input = base_input();
        input.property_value = Decimal::ZERO;
        input.down_payment = Decimal::ZERO;
        assert!(calculate_mortgage_payment(&input).is_err());
    }

    #[test]
    fn test_high_rates_return_values() {
        for pct in [dec!(200), dec!(500)] {
            let p = compute_monthly_payment(dec!(1_000_000), Decimal::ZERO, dec!(30), pct).unwrap();
            assert!(p > Decimal::ZERO, "{pct}%: got {p}");
        }
        let mut input = base_input();
        input.annual_rate_percent = dec!(500);
        input.include_schedule = true;
        let out = calculate_mortgage_payment(&input).unwrap().result;
        assert_eq!(out.schedule.unwrap().len(), 360);
    }

    #[test]
    fn test_absurd_period_rejected() {
        let mut input = base_input();
        input.period_years = u32::MAX;
        match calculate_mortgage_payment(&input).unwrap_err() {
            LoanCalcError::InvalidInput { field, .. } => assert_eq!(field, "period_years"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_payment_bounds_rejects_invalid_range() {
        let err = payment_bounds(dec!(1_000_000), dec!(250_000), dec!(5), &PeriodBounds::new(0, 30));
        assert!(matches!(err, Err(LoanCalcError::InvalidInput { .. })));
    }

    #[test]
    fn test_metadata_populated() {
        let out = calculate_mortgage_payment(&base_input()).unwrap();
        assert!(!out.methodology.is_empty());
        assert_eq!(out.metadata.precision, "rust_decimal_128bit");
    }
}
