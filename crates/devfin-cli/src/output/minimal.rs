use serde_json::Value;

use super::result_of;

/// Headline figures, in order of preference.
const PRIORITY_KEYS: [&str; 4] = [
    "total_pat",
    "ending_cash",
    "peak_funding_requirement",
    "total_revenue",
];

/// Print just the key answer: the first headline figure found in the
/// summary (or the result itself), else the first field.
pub fn print_minimal(value: &Value) {
    println!("{}", minimal_answer(value));
}

fn minimal_answer(value: &Value) -> String {
    let result = result_of(value);
    let source = result.get("summary").unwrap_or(result);

    let Value::Object(map) = source else {
        return format_minimal(source);
    };

    if let Some(val) = PRIORITY_KEYS
        .iter()
        .filter_map(|key| map.get(*key))
        .find(|val| !val.is_null())
    {
        return format_minimal(val);
    }

    match map.iter().next() {
        Some((key, val)) => format!("{key}: {}", format_minimal(val)),
        None => String::new(),
    }
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_summary_headline_preferred() {
        let envelope = json!({
            "result": {
                "rows": [],
                "summary": {"total_revenue": "1500", "total_pat": "120.5"}
            }
        });
        assert_eq!(minimal_answer(&envelope), "120.5");
    }

    #[test]
    fn test_falls_back_to_first_field() {
        let envelope = json!({"result": {"start_year": 2024}});
        assert_eq!(minimal_answer(&envelope), "start_year: 2024");
    }
}
