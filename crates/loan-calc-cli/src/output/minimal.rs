use serde_json::Value;

use super::{result_of, scalar};

/// Headline field of each command's result, in priority order.
const PRIORITY_KEYS: [&str; 6] = [
    "monthly_payment_rounded",
    "monthly_payment",
    "period_years",
    "min_down_payment",
    "remaining_amount",
    "approved",
];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    let result = result_of(value);

    let Value::Object(map) = result else {
        println!("{}", scalar(result));
        return;
    };

    // Validation reports: "valid" or the fields to fix.
    if let Some(Value::Array(errors)) = map.get("errors") {
        if errors.is_empty() {
            println!("valid");
        } else {
            let fields: Vec<String> = errors
                .iter()
                .filter_map(|e| e.get("field").map(scalar))
                .collect();
            println!("invalid: {}", fields.join(", "));
        }
        return;
    }

    if let Some(val) = PRIORITY_KEYS
        .iter()
        .filter_map(|k| map.get(*k))
        .find(|v| !v.is_null())
    {
        println!("{}", scalar(val));
        return;
    }

    if let Some((key, val)) = map.iter().next() {
        println!("{}: {}", key, scalar(val));
    }
}
