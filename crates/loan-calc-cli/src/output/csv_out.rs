use serde_json::Value;
use std::io;

use super::{flatten, result_of, scalar};

/// Write output as CSV to stdout.
///
/// A result carrying an amortization schedule is written as one row per
/// month; anything else as two-column `field,value` records.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());
    let result = result_of(value);

    let written = match result.get("schedule") {
        Some(Value::Array(rows)) if !rows.is_empty() => write_rows(&mut wtr, rows),
        _ => write_fields(&mut wtr, result),
    };
    if let Err(e) = written.and_then(|_| wtr.flush().map_err(csv::Error::from)) {
        eprintln!("CSV output error: {}", e);
    }
}

fn write_fields(wtr: &mut csv::Writer<io::StdoutLock<'_>>, result: &Value) -> csv::Result<()> {
    let mut fields = Vec::new();
    flatten("", result, &mut fields);

    wtr.write_record(["field", "value"])?;
    for (key, val) in fields {
        wtr.write_record([key.as_str(), &scalar(val)])?;
    }
    Ok(())
}

fn write_rows(wtr: &mut csv::Writer<io::StdoutLock<'_>>, rows: &[Value]) -> csv::Result<()> {
    let Some(Value::Object(first)) = rows.first() else {
        return Ok(());
    };
    let headers: Vec<&str> = first.keys().map(String::as_str).collect();
    wtr.write_record(&headers)?;

    for row in rows {
        let cells: Vec<String> = headers
            .iter()
            .map(|h| row.get(*h).map(scalar).unwrap_or_default())
            .collect();
        wtr.write_record(&cells)?;
    }
    Ok(())
}
