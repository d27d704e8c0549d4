use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;

use loan_calc_core::mortgage::ltv::{calculate_down_payment, DownPaymentInput};
use loan_calc_core::mortgage::payment::{
    calculate_mortgage_payment, calculate_payment_bounds, MortgagePaymentInput, PaymentBoundsInput,
};
use loan_calc_core::mortgage::period::{calculate_period, PeriodInput};
use loan_calc_core::mortgage::recompute::{run_recompute, RecomputeInput};
use loan_calc_core::mortgage::{ActiveField, CalculatorState, CalculatorStatus};
use loan_calc_core::LoanPolicy;

use crate::input;

/// Arguments for the monthly payment calculation
#[derive(Args)]
pub struct PaymentArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Property price
    #[arg(long)]
    pub property_value: Option<Decimal>,

    /// Down payment
    #[arg(long, default_value = "0")]
    pub down_payment: Decimal,

    /// Annual interest rate in percent (policy default when omitted)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Repayment period in whole years
    #[arg(long)]
    pub period_years: Option<u32>,

    /// Include the month-by-month amortization schedule
    #[arg(long)]
    pub schedule: bool,

    /// First payment date (YYYY-MM-DD) for schedule rows
    #[arg(long)]
    pub start_date: Option<String>,
}

/// Arguments for solving the period from a target payment
#[derive(Args)]
pub struct PeriodArgs {
    #[arg(long)]
    pub input: Option<String>,

    #[arg(long)]
    pub property_value: Option<Decimal>,

    #[arg(long, default_value = "0")]
    pub down_payment: Decimal,

    /// Target monthly payment
    #[arg(long)]
    pub monthly_payment: Option<Decimal>,

    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Which flow's period range applies
    #[arg(long, value_enum, default_value = "mortgage")]
    pub flow: Flow,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Flow {
    Mortgage,
    Credit,
}

/// Arguments for the LTV / minimum down payment lookup
#[derive(Args)]
pub struct DownPaymentArgs {
    #[arg(long)]
    pub input: Option<String>,

    #[arg(long)]
    pub property_value: Option<Decimal>,

    /// Ownership option code: no_property, has_property, selling_property
    #[arg(long, default_value = "no_property")]
    pub ownership: String,

    /// Current down payment to clamp into the allowed range
    #[arg(long)]
    pub down_payment: Option<Decimal>,
}

/// Arguments for the monthly payment slider range
#[derive(Args)]
pub struct PaymentBoundsArgs {
    #[arg(long)]
    pub input: Option<String>,

    #[arg(long)]
    pub property_value: Option<Decimal>,

    #[arg(long, default_value = "0")]
    pub down_payment: Decimal,

    #[arg(long)]
    pub rate: Option<Decimal>,
}

/// Arguments for the active-field recompute
#[derive(Args)]
pub struct RecomputeArgs {
    #[arg(long)]
    pub input: Option<String>,

    #[arg(long)]
    pub property_value: Option<Decimal>,

    #[arg(long, default_value = "0")]
    pub down_payment: Decimal,

    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Current period in years
    #[arg(long)]
    pub period_years: Option<u32>,

    /// Current monthly payment
    #[arg(long)]
    pub monthly_payment: Option<Decimal>,

    /// Field the user is editing
    #[arg(long, value_enum)]
    pub editing: Option<Editing>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Editing {
    Period,
    Payment,
}

pub fn run_payment(args: PaymentArgs, policy: &LoanPolicy) -> Result<Value, Box<dyn std::error::Error>> {
    let payment_input: MortgagePaymentInput = match input::stdin::read_input(args.input.as_deref())? {
        Some(v) => v,
        None => MortgagePaymentInput {
            property_value: args
                .property_value
                .ok_or("--property-value is required (or provide --input)")?,
            down_payment: args.down_payment,
            annual_rate_percent: args.rate.unwrap_or(policy.default_rate_percent),
            period_years: args
                .period_years
                .ok_or("--period-years is required (or provide --input)")?,
            include_schedule: args.schedule,
            start_date: args
                .start_date
                .as_deref()
                .map(|d| d.parse::<NaiveDate>())
                .transpose()
                .map_err(|e| format!("Invalid --start-date: {e}"))?,
        },
    };

    let result = calculate_mortgage_payment(&payment_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_period(args: PeriodArgs, policy: &LoanPolicy) -> Result<Value, Box<dyn std::error::Error>> {
    let period_input: PeriodInput = match input::stdin::read_input(args.input.as_deref())? {
        Some(v) => v,
        None => PeriodInput {
            principal: args
                .property_value
                .ok_or("--property-value is required (or provide --input)")?,
            down_payment: args.down_payment,
            monthly_payment: args
                .monthly_payment
                .ok_or("--monthly-payment is required (or provide --input)")?,
            annual_rate_percent: args.rate.unwrap_or(policy.default_rate_percent),
            bounds: Some(match args.flow {
                Flow::Mortgage => policy.mortgage_period,
                Flow::Credit => policy.credit_period,
            }),
        },
    };

    let result = calculate_period(&period_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_down_payment(
    args: DownPaymentArgs,
    policy: &LoanPolicy,
) -> Result<Value, Box<dyn std::error::Error>> {
    let ltv_input: DownPaymentInput = match input::stdin::read_input(args.input.as_deref())? {
        Some(v) => v,
        None => DownPaymentInput {
            property_value: args
                .property_value
                .ok_or("--property-value is required (or provide --input)")?,
            ownership: args.ownership,
            down_payment: args.down_payment,
        },
    };

    if ltv_input.property_value > policy.max_property_value {
        return Err(format!(
            "Property value {} exceeds the maximum of {}",
            ltv_input.property_value, policy.max_property_value
        )
        .into());
    }

    let result = calculate_down_payment(&ltv_input, &policy.ltv)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_payment_bounds(
    args: PaymentBoundsArgs,
    policy: &LoanPolicy,
) -> Result<Value, Box<dyn std::error::Error>> {
    let bounds_input: PaymentBoundsInput = match input::stdin::read_input(args.input.as_deref())? {
        Some(v) => v,
        None => PaymentBoundsInput {
            principal: args
                .property_value
                .ok_or("--property-value is required (or provide --input)")?,
            down_payment: args.down_payment,
            annual_rate_percent: args.rate.unwrap_or(policy.default_rate_percent),
            bounds: Some(policy.mortgage_period),
        },
    };

    let result = calculate_payment_bounds(&bounds_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_recompute_cmd(
    args: RecomputeArgs,
    policy: &LoanPolicy,
) -> Result<Value, Box<dyn std::error::Error>> {
    let recompute_input: RecomputeInput = match input::stdin::read_input(args.input.as_deref())? {
        Some(v) => v,
        None => RecomputeInput {
            state: CalculatorState {
                principal: args
                    .property_value
                    .ok_or("--property-value is required (or provide --input)")?,
                down_payment: args.down_payment,
                annual_rate_percent: args.rate.unwrap_or(policy.default_rate_percent),
                period_years: args
                    .period_years
                    .ok_or("--period-years is required (or provide --input)")?,
                monthly_payment: args.monthly_payment.unwrap_or(Decimal::ZERO),
                status: CalculatorStatus::Ok,
            },
            active_field: match args.editing.ok_or("--editing is required (or provide --input)")? {
                Editing::Period => ActiveField::EditingPeriod,
                Editing::Payment => ActiveField::EditingPayment,
            },
            bounds: Some(policy.mortgage_period),
        },
    };

    let result = run_recompute(&recompute_input)?;
    Ok(serde_json::to_value(result)?)
}
