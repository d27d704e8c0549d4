//! Level-payment annuity math shared by the mortgage and credit calculators.
//!
//! Rates enter as annual percentages and are converted to a monthly decimal
//! rate here; everything else works in months.

use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::LoanCalcError;
use crate::types::{Money, Percent};
use crate::LoanCalcResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Monthly decimal rate from an annual percentage: `percent / 100 / 12`.
pub fn monthly_rate(annual_rate_percent: Percent) -> Decimal {
    annual_rate_percent / dec!(100) / MONTHS_PER_YEAR
}

/// Number of monthly payments in `years` (fractional years allowed).
pub fn months_in(years: Decimal) -> Decimal {
    years * MONTHS_PER_YEAR
}

/// Level monthly payment that amortises `loan` over `months` at `rate` per month.
///
/// `payment = loan * r / (1 - (1 + r)^-n)`, or `loan / n` when `r == 0`.
/// When `(1 + r)^n` exceeds the decimal range the discount term is below
/// its precision and the payment is the monthly interest `loan * r`.
pub fn annuity_payment(loan: Money, rate: Decimal, months: Decimal) -> LoanCalcResult<Money> {
    if months <= Decimal::ZERO {
        return Err(LoanCalcError::invalid(
            "period_years",
            "Number of payments must be > 0",
        ));
    }
    if rate < Decimal::ZERO {
        return Err(LoanCalcError::invalid(
            "annual_rate_percent",
            "Interest rate cannot be negative",
        ));
    }

    if rate.is_zero() {
        return Ok(loan / months);
    }

    let discount = match (Decimal::ONE + rate).checked_powd(months) {
        Some(factor) => Decimal::ONE.checked_div(factor).unwrap_or(Decimal::ZERO),
        None => Decimal::ZERO,
    };
    let denom = Decimal::ONE - discount;
    if denom.is_zero() {
        return Err(LoanCalcError::DivisionByZero {
            context: "annuity factor".into(),
        });
    }

    loan.checked_mul(rate)
        .and_then(|interest| interest.checked_div(denom))
        .ok_or_else(rate_out_of_range)
}

/// `payment * months`, failing instead of overflowing.
pub fn checked_total(payment: Money, months: Decimal) -> LoanCalcResult<Money> {
    payment.checked_mul(months).ok_or_else(rate_out_of_range)
}

/// Whole months in `years`, failing instead of overflowing.
pub fn whole_months(years: u32) -> LoanCalcResult<u32> {
    years
        .checked_mul(12)
        .ok_or_else(|| LoanCalcError::invalid("period_years", "Period is too long"))
}

fn rate_out_of_range() -> LoanCalcError {
    LoanCalcError::invalid("annual_rate_percent", "Rate out of range for this loan")
}

/// Number of months a level `payment` needs to amortise `loan` at `rate` per month.
///
/// Returns `None` when the payment never covers the monthly interest
/// (`loan * r / payment >= 1`), i.e. the logarithm would be undefined.
pub fn annuity_months(loan: Money, rate: Decimal, payment: Money) -> LoanCalcResult<Option<Decimal>> {
    if payment <= Decimal::ZERO {
        return Err(LoanCalcError::invalid(
            "monthly_payment",
            "Monthly payment must be positive",
        ));
    }

    if rate.is_zero() {
        return Ok(Some(loan / payment));
    }

    let interest_share = loan
        .checked_mul(rate)
        .and_then(|interest| interest.checked_div(payment))
        .ok_or_else(rate_out_of_range)?;
    if interest_share >= Decimal::ONE {
        return Ok(None);
    }

    let numerator = (Decimal::ONE - interest_share)
        .checked_ln()
        .ok_or_else(|| LoanCalcError::invalid("monthly_payment", "Payment out of range"))?;
    let denom = (Decimal::ONE + rate)
        .checked_ln()
        .ok_or_else(|| LoanCalcError::invalid("annual_rate_percent", "Rate out of range"))?;
    if denom.is_zero() {
        return Err(LoanCalcError::DivisionByZero {
            context: "period log factor".into(),
        });
    }

    Ok(Some(-numerator / denom))
}

/// Round a payment up to a whole currency unit. Cents are settled first so
/// decimal noise on an exact amount does not bump it by one.
pub fn round_payment(payment: Money) -> Money {
    payment.round_dp(2).ceil()
}
