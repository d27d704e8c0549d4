//! Dropdown option codes sent by the forms.
//!
//! The forms have used two encodings over time: bare numbers (`"2"`) and
//! prefixed codes (`"option_2"`). Both map to the same variant. Codes that
//! match neither resolve to a neutral variant and are logged, since they
//! usually mean stored data predates a dropdown change.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Strip the legacy `option_` prefix and surrounding whitespace.
fn option_number(code: &str) -> &str {
    let code = code.trim();
    code.strip_prefix("option_").unwrap_or(code)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomeSource {
    Employee,
    SelfEmployed,
    Pension,
    Student,
    Unemployed,
    Other,
    #[default]
    Unspecified,
}

impl IncomeSource {
    pub const ALL: [IncomeSource; 7] = [
        IncomeSource::Employee,
        IncomeSource::SelfEmployed,
        IncomeSource::Pension,
        IncomeSource::Student,
        IncomeSource::Unemployed,
        IncomeSource::Other,
        IncomeSource::Unspecified,
    ];

    /// Options 2 and 3 (business owner, freelancer) share the self-employed
    /// branch of the form.
    pub fn from_option(code: &str) -> Self {
        match option_number(code) {
            "1" | "employee" => IncomeSource::Employee,
            "2" | "3" | "selfemployed" | "self_employed" => IncomeSource::SelfEmployed,
            "4" | "pension" => IncomeSource::Pension,
            "5" | "student" => IncomeSource::Student,
            "6" | "unemployed" => IncomeSource::Unemployed,
            "7" | "other" => IncomeSource::Other,
            "" => IncomeSource::Unspecified,
            unknown => {
                warn!(code = unknown, "unmapped income source option");
                IncomeSource::Unspecified
            }
        }
    }

    /// True for sources that come with an employer or business to describe.
    pub fn has_employment_details(self) -> bool {
        matches!(self, IncomeSource::Employee | IncomeSource::SelfEmployed)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Obligation {
    #[default]
    NoObligation,
    BankLoan,
    CreditCard,
    ConsumerCredit,
    Other,
}

impl Obligation {
    pub const ALL: [Obligation; 5] = [
        Obligation::NoObligation,
        Obligation::BankLoan,
        Obligation::CreditCard,
        Obligation::ConsumerCredit,
        Obligation::Other,
    ];

    pub fn from_option(code: &str) -> Self {
        match option_number(code) {
            "1" | "no_obligations" | "none" | "" => Obligation::NoObligation,
            "2" | "bank_loan" => Obligation::BankLoan,
            "3" | "credit_card" => Obligation::CreditCard,
            "4" | "consumer_credit" => Obligation::ConsumerCredit,
            "5" | "other" => Obligation::Other,
            unknown => {
                warn!(code = unknown, "unmapped obligation option");
                Obligation::NoObligation
            }
        }
    }

    /// Whether the borrower has to describe the debt (lender, payment).
    pub fn requires_details(self) -> bool {
        !matches!(self, Obligation::NoObligation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_income_numeric_and_prefixed_codes_agree() {
        for n in 1..=7 {
            let bare = n.to_string();
            let prefixed = format!("option_{n}");
            assert_eq!(IncomeSource::from_option(&bare), IncomeSource::from_option(&prefixed));
        }
    }

    #[test]
    fn test_income_mapping() {
        assert_eq!(IncomeSource::from_option("1"), IncomeSource::Employee);
        assert_eq!(IncomeSource::from_option("option_2"), IncomeSource::SelfEmployed);
        assert_eq!(IncomeSource::from_option("3"), IncomeSource::SelfEmployed);
        assert_eq!(IncomeSource::from_option("4"), IncomeSource::Pension);
        assert_eq!(IncomeSource::from_option("option_5"), IncomeSource::Student);
        assert_eq!(IncomeSource::from_option("6"), IncomeSource::Unemployed);
        assert_eq!(IncomeSource::from_option("7"), IncomeSource::Other);
    }

    #[test]
    fn test_unknown_income_is_unspecified() {
        assert_eq!(IncomeSource::from_option("option_42"), IncomeSource::Unspecified);
        assert_eq!(IncomeSource::from_option(""), IncomeSource::Unspecified);
        assert!(!IncomeSource::Unspecified.has_employment_details());
    }

    #[test]
    fn test_detail_sets() {
        let employed: Vec<IncomeSource> = IncomeSource::ALL
            .into_iter()
            .filter(|s| s.has_employment_details())
            .collect();
        assert_eq!(employed, vec![IncomeSource::Employee, IncomeSource::SelfEmployed]);

        let with_debt = Obligation::ALL.into_iter().filter(|o| o.requires_details()).count();
        assert_eq!(with_debt, 4);
    }

    #[test]
    fn test_obligation_mapping() {
        assert_eq!(Obligation::from_option("option_1"), Obligation::NoObligation);
        assert_eq!(Obligation::from_option("2"), Obligation::BankLoan);
        assert_eq!(Obligation::from_option("option_3"), Obligation::CreditCard);
        assert_eq!(Obligation::from_option("4"), Obligation::ConsumerCredit);
        assert_eq!(Obligation::from_option("5"), Obligation::Other);
        assert_eq!(Obligation::from_option("9"), Obligation::NoObligation);
        assert!(Obligation::BankLoan.requires_details());
        assert!(!Obligation::NoObligation.requires_details());
    }
}
