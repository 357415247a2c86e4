pub mod csv_out;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Result fields rendered as rows, in order of preference.
const ROW_FIELDS: [&str; 3] = ["schedule", "year_by_year", "yearly_breakdown"];

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => match serde_json::to_string_pretty(value) {
            Ok(s) => println!("{}", s),
            Err(e) => eprintln!("JSON serialization error: {}", e),
        },
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// The tabular part of a command's output: a bare schedule/projection array,
/// or the first non-empty row field inside the `result` envelope.
fn row_source(value: &Value) -> Option<&[Value]> {
    match value {
        Value::Array(rows) => Some(rows.as_slice()),
        Value::Object(map) => {
            let result = map.get("result")?.as_object()?;
            ROW_FIELDS.iter().find_map(|field| match result.get(*field) {
                Some(Value::Array(rows)) if !rows.is_empty() => Some(rows.as_slice()),
                _ => None,
            })
        }
        _ => None,
    }
}

fn is_row_array(value: &Value) -> bool {
    matches!(value, Value::Array(items) if items.first().map_or(false, Value::is_object))
}

fn format_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
