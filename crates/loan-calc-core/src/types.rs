use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LoanCalcError;
use crate::LoanCalcResult;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Annual rates as percentages (5 = 5%), the unit every form field uses.
pub type Percent = Decimal;

/// Ratios expressed as decimals (0.75 = 75%).
pub type Ratio = Decimal;

/// Year counts, possibly fractional for consumer credit.
pub type Years = Decimal;

/// Longest period any calculation accepts.
pub const MAX_PERIOD_YEARS: u32 = 100;

/// Inclusive period range in whole years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodBounds {
    pub min_years: u32,
    pub max_years: u32,
}

impl PeriodBounds {
    pub const fn new(min_years: u32, max_years: u32) -> Self {
        Self {
            min_years,
            max_years,
        }
    }

    pub fn contains(&self, years: u32) -> bool {
        (self.min_years..=self.max_years).contains(&years)
    }

    /// Requires a validated range; panics when `min_years > max_years`.
    pub fn clamp(&self, years: u32) -> u32 {
        years.clamp(self.min_years, self.max_years)
    }

    /// `1 <= min_years <= max_years <= MAX_PERIOD_YEARS`.
    pub fn validate(&self) -> LoanCalcResult<()> {
        if self.min_years == 0 || self.min_years > self.max_years || self.max_years > MAX_PERIOD_YEARS {
            return Err(LoanCalcError::invalid(
                "bounds",
                format!(
                    "Period bounds must satisfy 1 <= min_years <= max_years <= {MAX_PERIOD_YEARS}, got {}..={}",
                    self.min_years, self.max_years
                ),
            ));
        }
        Ok(())
    }
}

impl Default for PeriodBounds {
    fn default() -> Self {
        Self::new(1, 30)
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
