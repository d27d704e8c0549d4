use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::annuity::{annuity_months, annuity_payment, monthly_rate, round_payment, whole_months};
use crate::{types::*, LoanCalcError, LoanCalcResult};

/// Distance from a whole year below which the solved period snaps to it.
const SNAP_TOLERANCE_YEARS: Decimal = dec!(0.000001);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodBoundary {
    Minimum,
    Maximum,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodSolution {
    /// Whole years, truncated and clamped to the allowed range.
    pub period_years: u32,
    /// Unclamped period implied by the payment.
    pub exact_years: Years,
    /// Set when `period_years` was pulled onto a bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boundary: Option<PeriodBoundary>,
}

/// Period (in whole years, 1..=30) needed to repay `principal - down_payment`
/// with `target_monthly_payment`.
pub fn compute_period_years(
    principal: Money,
    down_payment: Money,
    target_monthly_payment: Money,
    annual_rate_percent: Percent,
) -> LoanCalcResult<PeriodSolution> {
    compute_period_years_within(
        principal,
        down_payment,
        target_monthly_payment,
        annual_rate_percent,
        &PeriodBounds::default(),
    )
}

/// As [`compute_period_years`] with an explicit period range.
///
/// A payment that never amortises the loan (it does not even cover the
/// first month's interest) yields `PeriodUnsolvable` carrying the payment
/// required at the longest allowed period.
pub fn compute_period_years_within(
    principal: Money,
    down_payment: Money,
    target_monthly_payment: Money,
    annual_rate_percent: Percent,
    bounds: &PeriodBounds,
) -> LoanCalcResult<PeriodSolution> {
    bounds.validate()?;
    if target_monthly_payment <= Decimal::ZERO {
        return Err(LoanCalcError::invalid(
            "monthly_payment",
            "Monthly payment must be positive.",
        ));
    }
    if annual_rate_percent < Decimal::ZERO {
        return Err(LoanCalcError::invalid(
            "annual_rate_percent",
            "Interest rate cannot be negative.",
        ));
    }
    if principal < Decimal::ZERO || down_payment < Decimal::ZERO {
        return Err(LoanCalcError::invalid(
            "principal",
            "Principal and down payment cannot be negative.",
        ));
    }
    let loan = principal - down_payment;
    if loan < Decimal::ZERO {
        return Err(LoanCalcError::invalid(
            "down_payment",
            "Down payment cannot exceed the principal.",
        ));
    }

    let rate = monthly_rate(annual_rate_percent);
    let months = match annuity_months(loan, rate, target_monthly_payment)? {
        Some(m) => m,
        None => {
            let longest = Decimal::from(whole_months(bounds.max_years)?);
            let minimum_payment = round_payment(annuity_payment(loan, rate, longest)?);
            debug!(
                %loan,
                %target_monthly_payment,
                %minimum_payment,
                "payment does not cover monthly interest"
            );
            return Err(LoanCalcError::PeriodUnsolvable { minimum_payment });
        }
    };

    let exact_years = months / dec!(12);
    let whole = whole_years(exact_years);

    let solved = whole.to_u32().unwrap_or(u32::MAX);
    let period_years = bounds.clamp(solved);
    let boundary = if solved < bounds.min_years {
        Some(PeriodBoundary::Minimum)
    } else if solved > bounds.max_years {
        Some(PeriodBoundary::Maximum)
    } else {
        None
    };

    Ok(PeriodSolution {
        period_years,
        exact_years,
        boundary,
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodInput {
    pub principal: Money,
    #[serde(default)]
    pub down_payment: Money,
    pub monthly_payment: Money,
    pub annual_rate_percent: Percent,
    /// Defaults to 1..=30 years.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<PeriodBounds>,
}

pub fn calculate_period(input: &PeriodInput) -> LoanCalcResult<ComputationOutput<PeriodSolution>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    let bounds = input.bounds.unwrap_or_default();

    let solution = compute_period_years_within(
        input.principal,
        input.down_payment,
        input.monthly_payment,
        input.annual_rate_percent,
        &bounds,
    )?;

    match solution.boundary {
        Some(PeriodBoundary::Minimum) => warnings.push(format!(
            "Payment repays the loan in under {} years; period set to the minimum.",
            bounds.min_years
        )),
        Some(PeriodBoundary::Maximum) => warnings.push(format!(
            "Payment needs {} years; period capped at {}.",
            solution.exact_years.round_dp(2),
            bounds.max_years
        )),
        None => {}
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Annuity period solve (logarithmic, truncated to whole years)",
        &bounds,
        warnings,
        elapsed,
        solution,
    ))
}

/// Truncate to whole years, snapping values that sit on a whole year
/// within decimal noise.
fn whole_years(exact: Years) -> Years {
    let nearest = exact.round();
    if (exact - nearest).abs() <= SNAP_TOLERANCE_YEARS {
        nearest
    } else {
        exact.trunc()
    }
}
