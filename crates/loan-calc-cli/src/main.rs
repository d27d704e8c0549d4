mod commands;
mod input;
mod logging;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::credit::{CreditPaymentArgs, RemainingAmountArgs};
use commands::eligibility::{CreditEligibilityArgs, EligibilityArgs};
use commands::mortgage::{DownPaymentArgs, PaymentArgs, PaymentBoundsArgs, PeriodArgs, RecomputeArgs};
use commands::validation::ValidateArgs;

/// Mortgage and consumer-credit calculations
#[derive(Parser)]
#[command(
    name = "loancalc",
    version,
    about = "Mortgage and consumer-credit calculations",
    long_about = "A CLI for mortgage and consumer-credit calculations with decimal \
                  precision. Supports monthly payments, period solving, LTV down-payment \
                  limits, active-field recompute, eligibility assessment and form-step \
                  validation."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Policy override file (JSON, or YAML by .yaml/.yml extension)
    #[arg(long, global = true)]
    policy: Option<String>,

    /// Debug logging on stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Monthly mortgage payment with totals and optional schedule
    Payment(PaymentArgs),
    /// Solve the period in years from a target monthly payment
    Period(PeriodArgs),
    /// Minimum down payment and maximum loan for an ownership category
    DownPayment(DownPaymentArgs),
    /// Monthly payment range over the allowed periods
    PaymentBounds(PaymentBoundsArgs),
    /// Recompute period or payment for the field being edited
    Recompute(RecomputeArgs),
    /// Consumer-credit annuity payment
    CreditPayment(CreditPaymentArgs),
    /// Simple-interest remaining amount of an existing loan
    RemainingAmount(RemainingAmountArgs),
    /// Mortgage eligibility assessment
    Eligibility(EligibilityArgs),
    /// Consumer-credit eligibility assessment
    CreditEligibility(CreditEligibilityArgs),
    /// Validate one application form step
    Validate(ValidateArgs),
    /// Print the effective loan policy
    Policy,
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();
    logging::init_cli_logger(cli.verbose);

    let policy = match input::policy::load_policy(cli.policy.as_deref()) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    };

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Payment(args) => commands::mortgage::run_payment(args, &policy),
        Commands::Period(args) => commands::mortgage::run_period(args, &policy),
        Commands::DownPayment(args) => commands::mortgage::run_down_payment(args, &policy),
        Commands::PaymentBounds(args) => commands::mortgage::run_payment_bounds(args, &policy),
        Commands::Recompute(args) => commands::mortgage::run_recompute_cmd(args, &policy),
        Commands::CreditPayment(args) => commands::credit::run_credit_payment(args, &policy),
        Commands::RemainingAmount(args) => commands::credit::run_remaining_amount(args),
        Commands::Eligibility(args) => commands::eligibility::run_eligibility(args, &policy),
        Commands::CreditEligibility(args) => {
            commands::eligibility::run_credit_eligibility(args, &policy)
        }
        Commands::Validate(args) => commands::validation::run_validate(args, &policy),
        Commands::Policy => commands::policy::run_policy(&policy),
        Commands::Version => {
            println!("loancalc {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
