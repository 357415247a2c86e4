use serde_json::Value;

use super::format_scalar;

/// Headline fields, in order of priority. Searched in the result and in
/// any nested summary object.
const PRIORITY_KEYS: [&str; 8] = [
    "interest_saved",
    "time_saved_years",
    "final_balance",
    "back_end_ratio",
    "total_interest_paid",
    "inflation_adjusted_balance",
    "estimated_tax_savings",
    "front_end_ratio",
];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    // Bare schedules and projections: the final entry is the answer.
    if let Value::Array(rows) = result_obj {
        match rows.last() {
            Some(last) => println!("{}", headline(last).unwrap_or_else(|| format_scalar(last))),
            None => println!("(empty)"),
        }
        return;
    }

    match headline(result_obj) {
        Some(answer) => println!("{}", answer),
        None => println!("{}", format_scalar(result_obj)),
    }
}

fn headline(value: &Value) -> Option<String> {
    let map = value.as_object()?;
    for key in PRIORITY_KEYS {
        if let Some(val) = map.get(key).filter(|v| !v.is_null()) {
            return Some(format_scalar(val));
        }
    }
    map.values().filter(|v| v.is_object()).find_map(headline).or_else(|| {
        ["remaining_balance", "balance"]
            .iter()
            .find_map(|k| map.get(*k).map(format_scalar))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_headline_searches_nested_summary() {
        let v = json!({"comparison": {"interest_saved": "91173.43"}, "monthly_payment": "1798.65"});
        assert_eq!(headline(&v).unwrap(), "91173.43");
    }

    #[test]
    fn test_headline_for_projection_entry() {
        let v = json!({"year": 35, "balance": "900000"});
        assert_eq!(headline(&v).unwrap(), "900000");
    }
}
