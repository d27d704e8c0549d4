use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use loan_calc_core::credit::annuity::{
    calculate_credit_payment, calculate_remaining_amount, CreditPaymentInput, RemainingAmountInput,
};
use loan_calc_core::LoanPolicy;

use crate::input;

/// Arguments for the consumer-credit annuity payment
#[derive(Args)]
pub struct CreditPaymentArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Credit amount
    #[arg(long)]
    pub amount: Option<Decimal>,

    /// Period in years, fractions allowed (1.5 = 18 months)
    #[arg(long)]
    pub period_years: Option<Decimal>,

    /// Annual interest rate in percent (policy default when omitted)
    #[arg(long)]
    pub rate: Option<Decimal>,
}

/// Arguments for the simple-interest remaining amount
#[derive(Args)]
pub struct RemainingAmountArgs {
    #[arg(long)]
    pub input: Option<String>,

    /// Amount originally borrowed
    #[arg(long)]
    pub initial_amount: Option<Decimal>,

    /// Years elapsed
    #[arg(long)]
    pub years: Option<Decimal>,

    #[arg(long, default_value = "5")]
    pub rate: Decimal,
}

pub fn run_credit_payment(
    args: CreditPaymentArgs,
    policy: &LoanPolicy,
) -> Result<Value, Box<dyn std::error::Error>> {
    let credit_input: CreditPaymentInput = match input::stdin::read_input(args.input.as_deref())? {
        Some(v) => v,
        None => CreditPaymentInput {
            amount: args.amount.ok_or("--amount is required (or provide --input)")?,
            period_years: args
                .period_years
                .ok_or("--period-years is required (or provide --input)")?,
            annual_rate_percent: args.rate.unwrap_or(policy.default_rate_percent),
        },
    };

    let result = calculate_credit_payment(&credit_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_remaining_amount(args: RemainingAmountArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let remaining_input: RemainingAmountInput = match input::stdin::read_input(args.input.as_deref())? {
        Some(v) => v,
        None => RemainingAmountInput {
            initial_amount: args
                .initial_amount
                .ok_or("--initial-amount is required (or provide --input)")?,
            years: args.years.ok_or("--years is required (or provide --input)")?,
            annual_rate_percent: args.rate,
        },
    };

    let result = calculate_remaining_amount(&remaining_input)?;
    Ok(serde_json::to_value(result)?)
}
