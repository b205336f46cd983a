use serde_json::{Map, Value};
use std::io;

use super::result_of;

/// Write output as CSV to stdout. A schedule prints one record per year
/// followed by a `total` record; anything else prints field/value pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let result = result_of(value);
    match (result.get("rows"), result) {
        (Some(Value::Array(rows)), _) => write_schedule_csv(&mut wtr, rows, result.get("totals")),
        (_, Value::Object(map)) => write_fields_csv(&mut wtr, map),
        (_, other) => {
            let _ = wtr.write_record([&format_csv_value(other)]);
        }
    }

    let _ = wtr.flush();
}

fn write_schedule_csv<W: io::Write>(
    wtr: &mut csv::Writer<W>,
    rows: &[Value],
    totals: Option<&Value>,
) {
    let Some(Value::Object(first)) = rows.first() else {
        return;
    };
    let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
    let _ = wtr.write_record(&headers);

    for row in rows {
        let record: Vec<String> = headers.iter().map(|h| format_csv_value(&row[*h])).collect();
        let _ = wtr.write_record(&record);
    }

    if let Some(Value::Object(totals)) = totals {
        let record: Vec<String> = headers
            .iter()
            .map(|h| match *h {
                "year" => "total".to_string(),
                key => totals.get(key).map(format_csv_value).unwrap_or_default(),
            })
            .collect();
        let _ = wtr.write_record(&record);
    }
}

fn write_fields_csv<W: io::Write>(wtr: &mut csv::Writer<W>, map: &Map<String, Value>) {
    let _ = wtr.write_record(["field", "value"]);
    for (key, val) in map {
        let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
    }
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
