//! Built-in steps of the mortgage and credit application flows.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::mortgage::ltv::{min_down_payment_with, PropertyOwnership};
use crate::policy::LoanPolicy;
use crate::types::PeriodBounds;
use crate::validation::options::{IncomeSource, Obligation};
use crate::validation::schema::{
    validate, Check, Condition, ErrorKind, FieldError, FieldRule, FormValues, StepSchema,
    ValidationReport,
};
use crate::LoanCalcError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormStep {
    MortgageFirstStep,
    CreditFirstStep,
    Income,
    PersonalData,
    Contact,
}

impl FormStep {
    pub const ALL: [FormStep; 5] = [
        FormStep::MortgageFirstStep,
        FormStep::CreditFirstStep,
        FormStep::Income,
        FormStep::PersonalData,
        FormStep::Contact,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FormStep::MortgageFirstStep => "mortgage_first_step",
            FormStep::CreditFirstStep => "credit_first_step",
            FormStep::Income => "income",
            FormStep::PersonalData => "personal_data",
            FormStep::Contact => "contact",
        }
    }

    pub fn schema(self, policy: &LoanPolicy) -> StepSchema {
        match self {
            FormStep::MortgageFirstStep => mortgage_first_step(policy),
            FormStep::CreditFirstStep => credit_first_step(policy),
            FormStep::Income => income_step(),
            FormStep::PersonalData => personal_data_step(),
            FormStep::Contact => contact_step(),
        }
    }
}

impl FromStr for FormStep {
    type Err = LoanCalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "mortgage_first_step" | "mortgage" => Ok(FormStep::MortgageFirstStep),
            "credit_first_step" | "credit" => Ok(FormStep::CreditFirstStep),
            "income" => Ok(FormStep::Income),
            "personal_data" => Ok(FormStep::PersonalData),
            "contact" => Ok(FormStep::Contact),
            other => Err(LoanCalcError::invalid(
                "step",
                format!(
                    "Unknown form step '{other}'. Expected one of: {}",
                    FormStep::ALL.map(FormStep::name).join(", ")
                ),
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Step schemas
// ---------------------------------------------------------------------------

fn number(min: Option<Decimal>, max: Option<Decimal>) -> Check {
    Check::Number { min, max }
}

fn period_check(bounds: PeriodBounds) -> Check {
    number(
        Some(Decimal::from(bounds.min_years)),
        Some(Decimal::from(bounds.max_years)),
    )
}

fn income_source_is(sources: &[IncomeSource]) -> Condition {
    Condition::IncomeSourceIs {
        field: "main_income_source".into(),
        sources: sources.to_vec(),
    }
}

fn obligation_is(obligations: &[Obligation]) -> Condition {
    Condition::ObligationIs {
        field: "obligations".into(),
        obligations: obligations.to_vec(),
    }
}

pub fn mortgage_first_step(policy: &LoanPolicy) -> StepSchema {
    StepSchema {
        step: FormStep::MortgageFirstStep.name().into(),
        fields: vec![
            FieldRule::new(
                "property_value",
                vec![
                    Check::Required,
                    number(Some(Decimal::ONE), Some(policy.max_property_value)),
                ],
            ),
            FieldRule::required("city"),
            FieldRule::required("when_needed"),
            FieldRule::required("property_type"),
            FieldRule::required("first_home"),
            FieldRule::required("property_ownership"),
            FieldRule::new(
                "down_payment",
                vec![Check::Required, number(Some(Decimal::ZERO), None)],
            ),
            FieldRule::new(
                "period_years",
                vec![Check::Required, period_check(policy.mortgage_period)],
            ),
            FieldRule::new(
                "monthly_payment",
                vec![Check::Required, number(Some(Decimal::ONE), None)],
            ),
        ],
    }
}

pub fn credit_first_step(policy: &LoanPolicy) -> StepSchema {
    StepSchema {
        step: FormStep::CreditFirstStep.name().into(),
        fields: vec![
            FieldRule::required("purpose"),
            FieldRule::new(
                "loan_amount",
                vec![Check::Required, number(Some(Decimal::ONE), None)],
            ),
            FieldRule::required("when_needed"),
            FieldRule::new(
                "period_years",
                vec![Check::Required, period_check(policy.credit_period)],
            ),
            FieldRule::new(
                "monthly_payment",
                vec![Check::Required, number(Some(Decimal::ONE), None)],
            ),
        ],
    }
}

/// Borrower income. Employer details apply to employees, the business
/// registration number only to the self-employed, and debt details only
/// when an obligation is declared.
pub fn income_step() -> StepSchema {
    use IncomeSource::*;

    let employed: Vec<IncomeSource> = IncomeSource::ALL
        .into_iter()
        .filter(|s| s.has_employment_details())
        .collect();
    let with_debt: Vec<Obligation> = Obligation::ALL
        .into_iter()
        .filter(|o| o.requires_details())
        .collect();

    StepSchema {
        step: FormStep::Income.name().into(),
        fields: vec![
            FieldRule::required("main_income_source"),
            FieldRule::new(
                "monthly_income",
                vec![Check::Required, number(Some(Decimal::ZERO), None)],
            )
            .when(income_source_is(&[Employee, SelfEmployed, Pension])),
            FieldRule::required("start_date").when(income_source_is(&employed)),
            FieldRule::required("field_of_activity").when(income_source_is(&employed)),
            FieldRule::required("profession").when(income_source_is(&employed)),
            FieldRule::required("employer_name").when(income_source_is(&[Employee])),
            FieldRule::required("business_registration_number")
                .when(income_source_is(&[SelfEmployed])),
            FieldRule::required("additional_income"),
            // option_1 is "no additional income"
            FieldRule::new(
                "additional_income_amount",
                vec![Check::Required, number(Some(Decimal::ZERO), None)],
            )
            .when(Condition::NotEquals {
                field: "additional_income".into(),
                value: "option_1".into(),
            }),
            FieldRule::required("obligations"),
            FieldRule::required("obligation_bank").when(obligation_is(&[
                Obligation::BankLoan,
                Obligation::CreditCard,
                Obligation::ConsumerCredit,
            ])),
            FieldRule::new(
                "obligation_monthly_payment",
                vec![Check::Required, number(Some(Decimal::ZERO), None)],
            )
            .when(obligation_is(&with_debt)),
            FieldRule::required("obligation_end_date")
                .when(obligation_is(&[Obligation::BankLoan, Obligation::ConsumerCredit])),
        ],
    }
}

pub fn personal_data_step() -> StepSchema {
    StepSchema {
        step: FormStep::PersonalData.name().into(),
        fields: vec![
            FieldRule::required("name_surname"),
            FieldRule::required("birthday"),
            FieldRule::required("education"),
            FieldRule::required("citizenship"),
            FieldRule::required("tax_residency_other_country"),
            FieldRule::required("children_under_18"),
            FieldRule::new(
                "children_count",
                vec![Check::Required, number(Some(Decimal::ONE), None)],
            )
            .when(Condition::Equals {
                field: "children_under_18".into(),
                value: "yes".into(),
            }),
            FieldRule::required("is_public_person"),
            FieldRule::required("family_status"),
            FieldRule::required("partner_pays_mortgage").when(Condition::OneOf {
                field: "family_status".into(),
                values: vec!["married".into(), "common_law".into()],
            }),
        ],
    }
}

/// Phone or email, plus a password.
pub fn contact_step() -> StepSchema {
    StepSchema {
        step: FormStep::Contact.name().into(),
        fields: vec![
            FieldRule::new(
                "phone",
                vec![Check::RequiredUnless {
                    other: "email".into(),
                }],
            ),
            FieldRule::new(
                "email",
                vec![
                    Check::RequiredUnless {
                        other: "phone".into(),
                    },
                    Check::Email,
                ],
            ),
            FieldRule::new(
                "password",
                vec![Check::Required, Check::MinLength { length: 8 }],
            ),
        ],
    }
}

// ---------------------------------------------------------------------------
// Step validation
// ---------------------------------------------------------------------------

/// Validate a built-in step. Cross-field checks run after the field rules
/// and only on fields that passed them; their errors still take the field's
/// place in schema order.
pub fn validate_step(step: FormStep, values: &FormValues, policy: &LoanPolicy) -> ValidationReport {
    let schema = step.schema(policy);
    let mut report = validate(&schema, values);

    if step == FormStep::MortgageFirstStep {
        if let Some(error) = check_down_payment(values, policy, &report) {
            report.push(error, &schema);
        }
    }

    report
}

/// Down payment against the LTV floor of the chosen ownership category and
/// the property value ceiling.
fn check_down_payment(
    values: &FormValues,
    policy: &LoanPolicy,
    report: &ValidationReport,
) -> Option<FieldError> {
    if report.error_for("property_value").is_some() || report.error_for("down_payment").is_some() {
        return None;
    }
    let property_value = values.number("property_value")?;
    let down_payment = values.number("down_payment")?;
    let (ownership, _) =
        PropertyOwnership::resolve(values.get("property_ownership").unwrap_or_default());

    let floor = min_down_payment_with(&policy.ltv, property_value, ownership);
    if down_payment < floor {
        return Some(FieldError::new(
            "down_payment",
            ErrorKind::BelowMinimum,
            format!("Down payment must be at least {}", floor.normalize()),
        ));
    }
    if down_payment > property_value {
        return Some(FieldError::new(
            "down_payment",
            ErrorKind::AboveMaximum,
            "Down payment cannot exceed the property value",
        ));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn mortgage_values() -> FormValues {
        [
            ("property_value", "1,000,000"),
            ("city", "tel_aviv"),
            ("when_needed", "option_1"),
            ("property_type", "option_1"),
            ("first_home", "yes"),
            ("property_ownership", "no_property"),
            ("down_payment", "250,000"),
            ("period_years", "30"),
            ("monthly_payment", "4026"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_step_names_round_trip() {
        for step in FormStep::ALL {
            assert_eq!(step.name().parse::<FormStep>().unwrap(), step);
        }
        assert!("nope".parse::<FormStep>().is_err());
    }

    #[test]
    fn test_mortgage_step_valid() {
        let report = validate_step(FormStep::MortgageFirstStep, &mortgage_values(), &LoanPolicy::default());
        assert!(report.is_valid(), "{:?}", report.errors);
    }

    #[test]
    fn test_mortgage_property_value_cap() {
        let mut values = mortgage_values();
        values.set("property_value", "12,000,000");
        let report = validate_step(FormStep::MortgageFirstStep, &values, &LoanPolicy::default());
        assert_eq!(report.focus.as_deref(), Some("property_value"));
        assert_eq!(report.errors[0].kind, ErrorKind::AboveMaximum);
    }

    #[test]
    fn test_mortgage_period_uses_policy_bounds() {
        let mut values = mortgage_values();
        values.set("period_years", "3");
        let report = validate_step(FormStep::MortgageFirstStep, &values, &LoanPolicy::default());
        assert_eq!(report.error_for("period_years").map(|e| e.kind), Some(ErrorKind::BelowMinimum));

        // The credit flow accepts shorter periods.
        let credit: FormValues = [
            ("purpose", "car"),
            ("loan_amount", "50000"),
            ("when_needed", "option_1"),
            ("period_years", "3"),
            ("monthly_payment", "1500"),
        ]
        .into_iter()
        .collect();
        assert!(validate_step(FormStep::CreditFirstStep, &credit, &LoanPolicy::default()).is_valid());
    }

    #[test]
    fn test_down_payment_below_ltv_floor() {
        let mut values = mortgage_values();
        values.set("property_ownership", "has_property");
        let report = validate_step(FormStep::MortgageFirstStep, &values, &LoanPolicy::default());
        let err = report.error_for("down_payment").unwrap();
        assert_eq!(err.kind, ErrorKind::BelowMinimum);
        assert_eq!(err.message, "Down payment must be at least 500000");
    }

    #[test]
    fn test_cross_field_error_takes_focus_before_later_fields() {
        let mut values = mortgage_values();
        values.set("property_ownership", "has_property");
        values.set("period_years", "3");
        let report = validate_step(FormStep::MortgageFirstStep, &values, &LoanPolicy::default());
        let fields: Vec<&str> = report.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["down_payment", "period_years"]);
        assert_eq!(report.focus.as_deref(), Some("down_payment"));
    }

    #[test]
    fn test_down_payment_above_property_value() {
        let mut values = mortgage_values();
        values.set("down_payment", "1,100,000");
        let report = validate_step(FormStep::MortgageFirstStep, &values, &LoanPolicy::default());
        assert_eq!(report.error_for("down_payment").map(|e| e.kind), Some(ErrorKind::AboveMaximum));
    }

    #[test]
    fn test_business_number_only_for_self_employed() {
        let base = [
            ("main_income_source", "option_2"),
            ("monthly_income", "18000"),
            ("start_date", "2019-01-01"),
            ("field_of_activity", "it"),
            ("profession", "developer"),
            ("additional_income", "option_1"),
            ("obligations", "option_1"),
        ];
        let self_employed: FormValues = base.into_iter().collect();
        let report = validate_step(FormStep::Income, &self_employed, &LoanPolicy::default());
        let fields: Vec<&str> = report.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["business_registration_number"]);

        let mut employee = self_employed.clone();
        employee.set("main_income_source", "1");
        let report = validate_step(FormStep::Income, &employee, &LoanPolicy::default());
        let fields: Vec<&str> = report.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["employer_name"]);
    }

    #[test]
    fn test_unemployed_skips_employment_fields() {
        let values: FormValues = [
            ("main_income_source", "option_6"),
            ("additional_income", "option_1"),
            ("obligations", "option_1"),
        ]
        .into_iter()
        .collect();
        assert!(validate_step(FormStep::Income, &values, &LoanPolicy::default()).is_valid());
    }

    #[test]
    fn test_obligation_details_required() {
        let values: FormValues = [
            ("main_income_source", "option_4"),
            ("monthly_income", "6000"),
            ("additional_income", "option_1"),
            ("obligations", "option_2"),
        ]
        .into_iter()
        .collect();
        let report = validate_step(FormStep::Income, &values, &LoanPolicy::default());
        let fields: Vec<&str> = report.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["obligation_bank", "obligation_monthly_payment", "obligation_end_date"]
        );
    }

    #[test]
    fn test_children_count_conditional() {
        let mut values: FormValues = [
            ("name_surname", "Dana Levi"),
            ("birthday", "1990-04-02"),
            ("education", "option_3"),
            ("citizenship", "israel"),
            ("tax_residency_other_country", "no"),
            ("children_under_18", "no"),
            ("is_public_person", "no"),
            ("family_status", "single"),
        ]
        .into_iter()
        .collect();
        assert!(validate_step(FormStep::PersonalData, &values, &LoanPolicy::default()).is_valid());

        values.set("children_under_18", "yes");
        let report = validate_step(FormStep::PersonalData, &values, &LoanPolicy::default());
        assert_eq!(report.focus.as_deref(), Some("children_count"));
    }

    #[test]
    fn test_contact_step() {
        let values: FormValues = [("email", "dana@example.com"), ("password", "short")]
            .into_iter()
            .collect();
        let report = validate_step(FormStep::Contact, &values, &LoanPolicy::default());
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].field, "password");
        assert_eq!(report.errors[0].kind, ErrorKind::TooShort);
    }
}
