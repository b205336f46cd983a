use rust_decimal::Decimal;
use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::result_of;

/// Format output as tables: the schedule as a statement (line items down,
/// years across), then the summary, warnings and methodology.
pub fn print_table(value: &Value) {
    let result = result_of(value);

    match result.get("rows") {
        Some(Value::Array(rows)) => {
            print_statement(rows, result.get("totals"));
            if let Some(Value::Object(summary)) = result.get("summary") {
                println!("\nSummary:");
                print_field_table(summary);
            }
        }
        _ => match result {
            Value::Object(map) => print_field_table(map),
            other => println!("{other}"),
        },
    }

    if let Value::Object(envelope) = value {
        print_notes(envelope);
    }
}

fn print_statement(rows: &[Value], totals: Option<&Value>) {
    if rows.is_empty() {
        println!("(empty schedule)");
        return;
    }

    let mut header = vec!["Line item".to_string()];
    header.extend(rows.iter().map(|r| format_value(&r["year"])));
    header.push("Total".to_string());

    let mut builder = Builder::default();
    builder.push_record(header);

    let Some(Value::Object(first)) = rows.first() else {
        return;
    };
    for key in first.keys().filter(|k| k.as_str() != "year") {
        let mut record = vec![key.clone()];
        record.extend(rows.iter().map(|r| format_value(&r[key.as_str()])));
        record.push(totals.map(|t| format_value(&t[key.as_str()])).unwrap_or_default());
        builder.push_record(record);
    }

    println!("{}", Table::from(builder));
}

fn print_field_table(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.as_str(), &format_value(val)]);
    }
    println!("{}", Table::from(builder));
}

fn print_notes(envelope: &Map<String, Value>) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {w}");
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {meth}");
    }
}

/// Decimal strings are shown to two places; everything else as-is.
fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => match s.parse::<Decimal>() {
            Ok(d) => d.round_dp(2).to_string(),
            Err(_) => s.clone(),
        },
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(arr) => arr.iter().map(format_value).collect::<Vec<_>>().join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_strings_rounded() {
        assert_eq!(format_value(&Value::from("333333333.33333333333333")), "333333333.33");
        assert_eq!(format_value(&Value::from("-500000000")), "-500000000");
        assert_eq!(format_value(&Value::from("lenient")), "lenient");
        assert_eq!(format_value(&Value::from(2027)), "2027");
    }
}
