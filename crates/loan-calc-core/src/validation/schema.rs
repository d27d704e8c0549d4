//! Field rules, conditions and the validator that applies them to a step's
//! submitted values.

use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::validation::options::{IncomeSource, Obligation};

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

// ---------------------------------------------------------------------------
// Form values
// ---------------------------------------------------------------------------

/// Raw string values of one form step, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormValues(BTreeMap<String, String>);

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.0.insert(field.into(), value.into());
        self
    }

    /// Trimmed value, `None` when the field is absent or blank.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .get(field)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn is_filled(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    pub fn number(&self, field: &str) -> Option<Decimal> {
        self.get(field).and_then(parse_number)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Parse a number as typed into a formatted input: `1,250,000`,
/// `1 250 000` and `1_250_000` are all accepted.
pub fn parse_number(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, ',' | ' ' | '_' | '\u{a0}'))
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned).ok()
}

fn is_email(value: &str) -> bool {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(EMAIL_PATTERN).ok())
        .as_ref()
        .is_some_and(|re| re.is_match(value))
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum Check {
    Required,
    /// Inclusive range. Blank values pass; pair with `Required` to forbid them.
    Number {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<Decimal>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<Decimal>,
    },
    /// Required only while `other` is blank (phone or email).
    RequiredUnless { other: String },
    Email,
    MinLength { length: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "condition", rename_all = "snake_case")]
pub enum Condition {
    Equals {
        field: String,
        value: String,
    },
    /// Holds when `field` is filled with something other than `value`.
    NotEquals {
        field: String,
        value: String,
    },
    OneOf {
        field: String,
        values: Vec<String>,
    },
    IncomeSourceIs {
        field: String,
        sources: Vec<IncomeSource>,
    },
    ObligationIs {
        field: String,
        obligations: Vec<Obligation>,
    },
}

impl Condition {
    pub fn holds(&self, values: &FormValues) -> bool {
        match self {
            Condition::Equals { field, value } => values.get(field) == Some(value.as_str()),
            Condition::NotEquals { field, value } => {
                values.get(field).is_some_and(|v| v != value)
            }
            Condition::OneOf { field, values: allowed } => values
                .get(field)
                .is_some_and(|v| allowed.iter().any(|a| a == v)),
            Condition::IncomeSourceIs { field, sources } => {
                let source = IncomeSource::from_option(values.get(field).unwrap_or_default());
                sources.contains(&source)
            }
            Condition::ObligationIs { field, obligations } => {
                let obligation = Obligation::from_option(values.get(field).unwrap_or_default());
                obligations.contains(&obligation)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRule {
    pub field: String,
    pub checks: Vec<Check>,
    /// The rule is skipped entirely while this does not hold.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<Condition>,
}

impl FieldRule {
    pub fn new(field: &str, checks: Vec<Check>) -> Self {
        Self {
            field: field.to_string(),
            checks,
            when: None,
        }
    }

    pub fn required(field: &str) -> Self {
        Self::new(field, vec![Check::Required])
    }

    pub fn when(mut self, condition: Condition) -> Self {
        self.when = Some(condition);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepSchema {
    pub step: String,
    pub fields: Vec<FieldRule>,
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Missing,
    NotANumber,
    BelowMinimum,
    AboveMaximum,
    InvalidEmail,
    TooShort,
}

impl ErrorKind {
    /// Content key looked up by the front-end for the localised message.
    pub fn message_key(self) -> &'static str {
        match self {
            ErrorKind::Missing => "error_fill_field",
            ErrorKind::NotANumber => "error_invalid_number",
            ErrorKind::BelowMinimum => "error_min_value",
            ErrorKind::AboveMaximum => "error_max_value",
            ErrorKind::InvalidEmail => "error_invalid_email",
            ErrorKind::TooShort => "error_min_length",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub kind: ErrorKind,
    pub message_key: String,
    /// English fallback when the content key is not translated.
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            kind,
            message_key: kind.message_key().to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub step: String,
    /// In schema order, at most one per field.
    pub errors: Vec<FieldError>,
    /// First invalid field, where the form should move the cursor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus: Option<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error_for(&self, field: &str) -> Option<&FieldError> {
        self.errors.iter().find(|e| e.field == field)
    }

    /// Add an error unless the field already has one, keeping `schema`
    /// order and focus on the earliest errored field.
    pub(crate) fn push(&mut self, error: FieldError, schema: &StepSchema) {
        if self.error_for(&error.field).is_some() {
            return;
        }
        let rank = |field: &str| {
            schema
                .fields
                .iter()
                .position(|rule| rule.field == field)
                .unwrap_or(usize::MAX)
        };
        let at = self
            .errors
            .iter()
            .position(|e| rank(&e.field) > rank(&error.field))
            .unwrap_or(self.errors.len());
        self.errors.insert(at, error);
        self.focus = self.errors.first().map(|e| e.field.clone());
    }
}

// ---------------------------------------------------------------------------
// Validator
// ---------------------------------------------------------------------------

/// Apply `schema` to `values`. Each field reports its first failing check.
pub fn validate(schema: &StepSchema, values: &FormValues) -> ValidationReport {
    let mut report = ValidationReport {
        step: schema.step.clone(),
        errors: Vec::new(),
        focus: None,
    };

    for rule in &schema.fields {
        if let Some(condition) = &rule.when {
            if !condition.holds(values) {
                continue;
            }
        }
        if let Some(error) = rule
            .checks
            .iter()
            .find_map(|check| apply_check(check, &rule.field, values))
        {
            report.push(error, schema);
        }
    }

    report
}

fn apply_check(check: &Check, field: &str, values: &FormValues) -> Option<FieldError> {
    let value = values.get(field);
    match check {
        Check::Required => value
            .is_none()
            .then(|| FieldError::new(field, ErrorKind::Missing, "Please fill this field")),
        Check::RequiredUnless { other } => (value.is_none() && !values.is_filled(other))
            .then(|| FieldError::new(field, ErrorKind::Missing, "Please fill this field")),
        Check::Number { min, max } => {
            let raw = value?;
            let Some(n) = parse_number(raw) else {
                return Some(FieldError::new(
                    field,
                    ErrorKind::NotANumber,
                    "Please enter a valid number",
                ));
            };
            if let Some(min) = min {
                if n < *min {
                    return Some(FieldError::new(
                        field,
                        ErrorKind::BelowMinimum,
                        format!("Value must be at least {min}"),
                    ));
                }
            }
            if let Some(max) = max {
                if n > *max {
                    return Some(FieldError::new(
                        field,
                        ErrorKind::AboveMaximum,
                        format!("Value must not exceed {max}"),
                    ));
                }
            }
            None
        }
        Check::Email => {
            let raw = value?;
            (!is_email(raw))
                .then(|| FieldError::new(field, ErrorKind::InvalidEmail, "Invalid email address"))
        }
        Check::MinLength { length } => {
            let raw = value?;
            (raw.chars().count() < *length).then(|| {
                FieldError::new(
                    field,
                    ErrorKind::TooShort,
                    format!("Minimum {length} characters required"),
                )
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn schema() -> StepSchema {
        StepSchema {
            step: "demo".into(),
            fields: vec![
                FieldRule::new(
                    "amount",
                    vec![
                        Check::Required,
                        Check::Number {
                            min: Some(dec!(1000)),
                            max: Some(dec!(50000)),
                        },
                    ],
                ),
                FieldRule::required("purpose"),
                FieldRule::required("details").when(Condition::Equals {
                    field: "purpose".into(),
                    value: "other".into(),
                }),
            ],
        }
    }

    #[test]
    fn test_parse_number_tolerates_separators() {
        assert_eq!(parse_number("1,250,000"), Some(dec!(1250000)));
        assert_eq!(parse_number(" 1 250 000 "), Some(dec!(1250000)));
        assert_eq!(parse_number("3_500.5"), Some(dec!(3500.5)));
        assert_eq!(parse_number("12a"), None);
        assert_eq!(parse_number(""), None);
    }

    #[test]
    fn test_valid_values_pass() {
        let values: FormValues = [("amount", "25,000"), ("purpose", "car")].into_iter().collect();
        let report = validate(&schema(), &values);
        assert!(report.is_valid());
        assert_eq!(report.focus, None);
    }

    #[test]
    fn test_errors_in_schema_order_with_focus() {
        let values: FormValues = [("purpose", "")].into_iter().collect();
        let report = validate(&schema(), &values);
        let fields: Vec<&str> = report.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["amount", "purpose"]);
        assert_eq!(report.focus.as_deref(), Some("amount"));
        assert_eq!(report.errors[0].message_key, "error_fill_field");
    }

    #[test]
    fn test_first_failing_check_only() {
        let values: FormValues = [("amount", "abc"), ("purpose", "car")].into_iter().collect();
        let report = validate(&schema(), &values);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].kind, ErrorKind::NotANumber);
    }

    #[test]
    fn test_range_bounds_inclusive() {
        for (raw, kind) in [
            ("999", Some(ErrorKind::BelowMinimum)),
            ("1000", None),
            ("50000", None),
            ("50001", Some(ErrorKind::AboveMaximum)),
        ] {
            let values: FormValues = [("amount", raw), ("purpose", "car")].into_iter().collect();
            let report = validate(&schema(), &values);
            assert_eq!(report.error_for("amount").map(|e| e.kind), kind, "amount {raw}");
        }
    }

    #[test]
    fn test_condition_gates_rule() {
        let mut values: FormValues = [("amount", "5000"), ("purpose", "other")].into_iter().collect();
        let report = validate(&schema(), &values);
        assert_eq!(report.focus.as_deref(), Some("details"));

        values.set("details", "boat");
        assert!(validate(&schema(), &values).is_valid());
    }

    #[test]
    fn test_late_error_lands_in_schema_order() {
        let values: FormValues = [("amount", "5000"), ("purpose", "")].into_iter().collect();
        let mut report = validate(&schema(), &values);
        assert_eq!(report.focus.as_deref(), Some("purpose"));

        report.push(
            FieldError::new("amount", ErrorKind::AboveMaximum, "Too much"),
            &schema(),
        );
        let fields: Vec<&str> = report.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["amount", "purpose"]);
        assert_eq!(report.focus.as_deref(), Some("amount"));
    }

    #[test]
    fn test_required_unless() {
        let schema = StepSchema {
            step: "contact".into(),
            fields: vec![
                FieldRule::new("phone", vec![Check::RequiredUnless { other: "email".into() }]),
                FieldRule::new(
                    "email",
                    vec![Check::RequiredUnless { other: "phone".into() }, Check::Email],
                ),
            ],
        };
        let empty = FormValues::new();
        assert_eq!(validate(&schema, &empty).errors.len(), 2);

        let phone_only: FormValues = [("phone", "0501234567")].into_iter().collect();
        assert!(validate(&schema, &phone_only).is_valid());

        let bad_email: FormValues = [("email", "not-an-email")].into_iter().collect();
        let report = validate(&schema, &bad_email);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].kind, ErrorKind::InvalidEmail);
    }

    #[test]
    fn test_not_equals_requires_filled_value() {
        let cond = Condition::NotEquals {
            field: "x".into(),
            value: "no".into(),
        };
        assert!(!cond.holds(&FormValues::new()));
        assert!(!cond.holds(&[("x", "no")].into_iter().collect()));
        assert!(cond.holds(&[("x", "yes")].into_iter().collect()));
    }

    #[test]
    fn test_schema_deserializes_from_json() {
        let schema: StepSchema = serde_json::from_str(
            r#"{
                "step": "custom",
                "fields": [
                    {"field": "age", "checks": [{"check": "required"}, {"check": "number", "min": "18"}]},
                    {"field": "employer", "checks": [{"check": "required"}],
                     "when": {"condition": "income_source_is", "field": "source", "sources": ["employee"]}}
                ]
            }"#,
        )
        .unwrap();
        let values: FormValues = [("age", "17"), ("source", "option_1")].into_iter().collect();
        let report = validate(&schema, &values);
        assert_eq!(report.errors.len(), 2);
        assert_eq!(report.errors[0].kind, ErrorKind::BelowMinimum);
        assert_eq!(report.errors[1].field, "employer");
    }
}
