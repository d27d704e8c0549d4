use serde_json::Value;
use tabled::{builder::Builder, Table};

use super::{flatten, result_of, scalar};

/// Field/value table of the result, then any row arrays (amortization
/// schedule, validation errors) as their own tables, then warnings.
pub fn print_table(value: &Value) {
    let result = result_of(value);

    let mut fields = Vec::new();
    let mut row_sets: Vec<(&str, &[Value])> = Vec::new();
    if let Value::Object(map) = result {
        for (key, val) in map {
            match val {
                Value::Array(rows) if rows.iter().any(Value::is_object) => {
                    row_sets.push((key.as_str(), rows.as_slice()));
                }
                _ => flatten(key, val, &mut fields),
            }
        }
    } else {
        fields.push((String::from("value"), result));
    }

    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in &fields {
        builder.push_record([key.clone(), scalar(val)]);
    }
    println!("{}", Table::from(builder));

    for (name, rows) in row_sets {
        println!("\n{name}:");
        print_rows(rows);
    }

    if let Some(Value::Array(warnings)) = value.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = value.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_rows(rows: &[Value]) {
    if rows.is_empty() {
        println!("(empty)");
        return;
    }

    let Some(Value::Object(first)) = rows.first() else {
        return;
    };
    let headers: Vec<String> = first.keys().cloned().collect();

    let mut builder = Builder::default();
    builder.push_record(headers.clone());
    for row in rows {
        let cells: Vec<String> = headers
            .iter()
            .map(|h| row.get(h.as_str()).map(scalar).unwrap_or_default())
            .collect();
        builder.push_record(cells);
    }
    println!("{}", Table::from(builder));
}
