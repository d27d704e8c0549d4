//! Keeps period and monthly payment consistent while the user edits one of
//! them. The edited (active) field is authoritative; only the other field is
//! recomputed, and a failed recompute leaves it at its last valid value.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::annuity::round_payment;
use crate::mortgage::payment::compute_monthly_payment;
use crate::mortgage::period::{compute_period_years_within, PeriodBoundary};
use crate::{types::*, LoanCalcError, LoanCalcResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActiveField {
    EditingPeriod,
    EditingPayment,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CalculatorStatus {
    #[default]
    Ok,
    /// Period was pulled onto a bound of the allowed range.
    AtPeriodBoundary { boundary: PeriodBoundary },
    /// Payment is too low to ever repay the loan.
    IncreasePayment { minimum_payment: Money },
    InvalidInput { field: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculatorState {
    pub principal: Money,
    pub down_payment: Money,
    pub annual_rate_percent: Percent,
    pub period_years: u32,
    pub monthly_payment: Money,
    #[serde(default)]
    pub status: CalculatorStatus,
}

/// Recompute the field that is not being edited.
pub fn recompute(state: &CalculatorState, active: ActiveField, bounds: &PeriodBounds) -> CalculatorState {
    let mut next = state.clone();

    if let Err(e) = bounds.validate() {
        next.status = invalid_status(e, "bounds");
        return next;
    }

    match active {
        ActiveField::EditingPeriod => {
            if !bounds.contains(state.period_years) {
                next.status = CalculatorStatus::InvalidInput {
                    field: "period_years".into(),
                    reason: format!(
                        "Period must be between {} and {} years.",
                        bounds.min_years, bounds.max_years
                    ),
                };
                return next;
            }
            match compute_monthly_payment(
                state.principal,
                state.down_payment,
                Decimal::from(state.period_years),
                state.annual_rate_percent,
            ) {
                Ok(p) => {
                    next.monthly_payment = round_payment(p);
                    next.status = CalculatorStatus::Ok;
                }
                Err(e) => next.status = invalid_status(e, "period_years"),
            }
        }
        ActiveField::EditingPayment => match compute_period_years_within(
            state.principal,
            state.down_payment,
            state.monthly_payment,
            state.annual_rate_percent,
            bounds,
        ) {
            Ok(solution) => {
                next.period_years = solution.period_years;
                next.status = match solution.boundary {
                    Some(boundary) => CalculatorStatus::AtPeriodBoundary { boundary },
                    None => CalculatorStatus::Ok,
                };
            }
            Err(LoanCalcError::PeriodUnsolvable { minimum_payment }) => {
                debug!(%minimum_payment, "keeping previous period");
                next.status = CalculatorStatus::IncreasePayment { minimum_payment };
            }
            Err(e) => next.status = invalid_status(e, "monthly_payment"),
        },
    }

    next
}

fn invalid_status(err: LoanCalcError, default_field: &str) -> CalculatorStatus {
    match err {
        LoanCalcError::InvalidInput { field, reason } => CalculatorStatus::InvalidInput { field, reason },
        other => CalculatorStatus::InvalidInput {
            field: default_field.into(),
            reason: other.to_string(),
        },
    }
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecomputeInput {
    pub state: CalculatorState,
    pub active_field: ActiveField,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<PeriodBounds>,
}

pub fn run_recompute(input: &RecomputeInput) -> LoanCalcResult<ComputationOutput<CalculatorState>> {
    let start = Instant::now();
    let bounds = input.bounds.unwrap_or_default();
    let next = recompute(&input.state, input.active_field, &bounds);

    let mut warnings = Vec::new();
    if let CalculatorStatus::IncreasePayment { minimum_payment } = &next.status {
        warnings.push(format!(
            "Monthly payment too low; increase it to at least {minimum_payment}."
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Active-field recompute (single writer)",
        &serde_json::json!({
            "active_field": input.active_field,
            "bounds": bounds,
        }),
        warnings,
        elapsed,
        next,
    ))
}
