use clap::Args;
use serde_json::Value;

use loan_calc_core::validation::{validate_step, FormStep, FormValues};
use loan_calc_core::LoanPolicy;

use crate::input;

/// Arguments for validating one form step
#[derive(Args)]
pub struct ValidateArgs {
    /// Form step: mortgage_first_step, credit_first_step, income, personal_data, contact
    #[arg(long)]
    pub step: String,

    /// JSON object of field values (overrides --set)
    #[arg(long)]
    pub input: Option<String>,

    /// Field value as key=value, repeatable
    #[arg(long = "set", value_name = "FIELD=VALUE")]
    pub values: Vec<String>,
}

pub fn run_validate(args: ValidateArgs, policy: &LoanPolicy) -> Result<Value, Box<dyn std::error::Error>> {
    let step: FormStep = args.step.parse()?;

    let values: FormValues = match input::stdin::read_input(args.input.as_deref())? {
        Some(v) => v,
        None => parse_pairs(&args.values)?,
    };

    let report = validate_step(step, &values, policy);
    Ok(serde_json::to_value(report)?)
}

fn parse_pairs(pairs: &[String]) -> Result<FormValues, Box<dyn std::error::Error>> {
    let mut values = FormValues::new();
    for pair in pairs {
        let (field, value) = pair
            .split_once('=')
            .ok_or_else(|| format!("Expected FIELD=VALUE, got '{pair}'"))?;
        values.set(field.trim(), value);
    }
    Ok(values)
}
