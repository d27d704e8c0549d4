//! Loan-to-value policy: maximum financing per property-ownership category
//! and the minimum down payment it implies.
//!
//! Unknown ownership codes do not fail. They resolve to
//! [`PropertyOwnership::NoProperty`] (the 75% tier) and the fallback is
//! logged and reported to the caller.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::warn;

use crate::policy::LtvTable;
use crate::{types::*, LoanCalcError, LoanCalcResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyOwnership {
    /// Borrower owns no other property.
    #[default]
    NoProperty,
    /// Borrower already owns a property and keeps it.
    HasProperty,
    /// Borrower is selling a property to fund this purchase.
    SellingProperty,
}

impl PropertyOwnership {
    /// Map a front-end option code to a category, if recognised.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "no_property" | "option_1" | "1" => Some(PropertyOwnership::NoProperty),
            "has_property" | "option_2" | "2" => Some(PropertyOwnership::HasProperty),
            "selling_property" | "option_3" | "3" => Some(PropertyOwnership::SellingProperty),
            _ => None,
        }
    }

    /// Like [`from_code`](Self::from_code) but falls back to `NoProperty`.
    /// The flag is true when the fallback was used.
    pub fn resolve(code: &str) -> (Self, bool) {
        match Self::from_code(code) {
            Some(o) => (o, false),
            None => {
                warn!(code, "unknown property ownership code, using no_property");
                (PropertyOwnership::NoProperty, true)
            }
        }
    }

    /// Ratio under the default policy table.
    pub fn ltv_ratio(self) -> Ratio {
        LtvTable::default().ratio_for(self)
    }
}

impl LtvTable {
    pub fn ratio_for(&self, ownership: PropertyOwnership) -> Ratio {
        match ownership {
            PropertyOwnership::NoProperty => self.no_property,
            PropertyOwnership::HasProperty => self.has_property,
            PropertyOwnership::SellingProperty => self.selling_property,
        }
    }
}

// ---------------------------------------------------------------------------
// Pure lookups
// ---------------------------------------------------------------------------

/// Minimum down payment under the default table: `value * (1 - ltv)`.
pub fn min_down_payment(property_value: Money, ownership: PropertyOwnership) -> Money {
    min_down_payment_with(&LtvTable::default(), property_value, ownership)
}

pub fn min_down_payment_with(
    table: &LtvTable,
    property_value: Money,
    ownership: PropertyOwnership,
) -> Money {
    property_value.max(Decimal::ZERO) * (Decimal::ONE - table.ratio_for(ownership))
}

pub fn max_loan_amount(table: &LtvTable, property_value: Money, ownership: PropertyOwnership) -> Money {
    property_value.max(Decimal::ZERO) * table.ratio_for(ownership)
}

/// Pull a down payment into `[min_down_payment, property_value]`.
pub fn clamp_down_payment(
    table: &LtvTable,
    property_value: Money,
    down_payment: Money,
    ownership: PropertyOwnership,
) -> Money {
    let floor = min_down_payment_with(table, property_value, ownership);
    let ceiling = property_value.max(floor);
    down_payment.clamp(floor, ceiling)
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownPaymentInput {
    pub property_value: Money,
    /// Ownership option code as sent by the form (`no_property`, `option_2`, `3`, ...).
    #[serde(default)]
    pub ownership: String,
    /// Current down payment, clamped into the allowed range when given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub down_payment: Option<Money>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownPaymentOutput {
    pub ownership: PropertyOwnership,
    pub ltv_ratio: Ratio,
    pub max_loan_amount: Money,
    pub min_down_payment: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clamped_down_payment: Option<Money>,
    pub fallback_applied: bool,
}

pub fn calculate_down_payment(
    input: &DownPaymentInput,
    table: &LtvTable,
) -> LoanCalcResult<ComputationOutput<DownPaymentOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.property_value <= Decimal::ZERO {
        return Err(LoanCalcError::invalid(
            "property_value",
            "Property value must be positive.",
        ));
    }

    let (ownership, fallback_applied) = PropertyOwnership::resolve(&input.ownership);
    if fallback_applied {
        warnings.push(format!(
            "Unknown ownership code '{}'; applied no_property LTV.",
            input.ownership
        ));
    }

    let clamped = input
        .down_payment
        .map(|d| clamp_down_payment(table, input.property_value, d, ownership));
    if let (Some(original), Some(c)) = (input.down_payment, clamped) {
        if original != c {
            warnings.push(format!("Down payment adjusted from {original} to {c}."));
        }
    }

    let output = DownPaymentOutput {
        ownership,
        ltv_ratio: table.ratio_for(ownership),
        max_loan_amount: max_loan_amount(table, input.property_value, ownership),
        min_down_payment: min_down_payment_with(table, input.property_value, ownership),
        clamped_down_payment: clamped,
        fallback_applied,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "LTV policy lookup (ownership category)",
        table,
        warnings,
        elapsed,
        output,
    ))
}
