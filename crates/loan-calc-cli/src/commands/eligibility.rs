use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use loan_calc_core::eligibility::{
    assess_credit_eligibility, assess_eligibility, CreditEligibilityInput, EligibilityInput,
};
use loan_calc_core::mortgage::PropertyOwnership;
use loan_calc_core::LoanPolicy;

use crate::input;

/// Arguments for the mortgage eligibility assessment
#[derive(Args)]
pub struct EligibilityArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[arg(long)]
    pub property_value: Option<Decimal>,

    #[arg(long, default_value = "0")]
    pub down_payment: Decimal,

    #[arg(long)]
    pub rate: Option<Decimal>,

    #[arg(long)]
    pub period_years: Option<u32>,

    /// Net monthly income
    #[arg(long)]
    pub monthly_income: Option<Decimal>,

    /// Existing monthly debt payments
    #[arg(long, default_value = "0")]
    pub monthly_expenses: Decimal,

    /// Borrower age today
    #[arg(long)]
    pub age: Option<u32>,

    #[arg(long, default_value_t = 750)]
    pub credit_score: u32,

    #[arg(long, default_value = "5")]
    pub employment_years: Decimal,

    /// Ownership option code; applies that category's LTV cap
    #[arg(long)]
    pub ownership: Option<String>,
}

pub fn run_eligibility(
    args: EligibilityArgs,
    policy: &LoanPolicy,
) -> Result<Value, Box<dyn std::error::Error>> {
    let eligibility_input: EligibilityInput = match input::stdin::read_input(args.input.as_deref())? {
        Some(v) => v,
        None => EligibilityInput {
            property_value: args
                .property_value
                .ok_or("--property-value is required (or provide --input)")?,
            down_payment: args.down_payment,
            annual_rate_percent: args.rate.unwrap_or(policy.default_rate_percent),
            period_years: args
                .period_years
                .ok_or("--period-years is required (or provide --input)")?,
            monthly_income: args
                .monthly_income
                .ok_or("--monthly-income is required (or provide --input)")?,
            monthly_expenses: args.monthly_expenses,
            age: args.age.ok_or("--age is required (or provide --input)")?,
            credit_score: args.credit_score,
            employment_years: args.employment_years,
            ownership: args
                .ownership
                .as_deref()
                .map(|code| PropertyOwnership::resolve(code).0),
        },
    };

    let result = assess_eligibility(&eligibility_input, policy)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for the consumer-credit eligibility assessment
#[derive(Args)]
pub struct CreditEligibilityArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[arg(long)]
    pub amount: Option<Decimal>,

    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Repayment period; fractional years allowed
    #[arg(long)]
    pub period_years: Option<Decimal>,

    #[arg(long)]
    pub monthly_income: Option<Decimal>,

    #[arg(long, default_value = "0")]
    pub monthly_expenses: Decimal,

    /// Monthly service of debts that stay open
    #[arg(long, default_value = "0")]
    pub existing_debts: Decimal,

    #[arg(long)]
    pub age: Option<u32>,

    #[arg(long, default_value_t = 750)]
    pub credit_score: u32,

    #[arg(long, default_value = "5")]
    pub employment_years: Decimal,
}

pub fn run_credit_eligibility(
    args: CreditEligibilityArgs,
    policy: &LoanPolicy,
) -> Result<Value, Box<dyn std::error::Error>> {
    let credit_input: CreditEligibilityInput = match input::stdin::read_input(args.input.as_deref())? {
        Some(v) => v,
        None => CreditEligibilityInput {
            amount: args.amount.ok_or("--amount is required (or provide --input)")?,
            annual_rate_percent: args.rate.unwrap_or(policy.default_rate_percent),
            period_years: args
                .period_years
                .ok_or("--period-years is required (or provide --input)")?,
            monthly_income: args
                .monthly_income
                .ok_or("--monthly-income is required (or provide --input)")?,
            monthly_expenses: args.monthly_expenses,
            existing_debts: args.existing_debts,
            age: args.age.ok_or("--age is required (or provide --input)")?,
            credit_score: args.credit_score,
            employment_years: args.employment_years,
        },
    };

    let result = assess_credit_eligibility(&credit_input, policy)?;
    Ok(serde_json::to_value(result)?)
}
