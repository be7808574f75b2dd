use serde_json::Value;

use crate::types::{Field, FieldValue, Record};

/// Render one record as an SSE event block.
///
/// Fields are written in [`Field::ORDER`]. Text values are split on any line
/// ending; `data` gets one line per segment, every other field keeps only the
/// first segment. Non-text values are written as compact JSON. A block that
/// holds at least one line is terminated by a blank line; a record without
/// recognized fields renders as the empty string.
pub fn format_record(record: &Record) -> String {
    let mut block = String::new();

    for (field, value) in record.fields() {
        match value {
            FieldValue::Text(text) => {
                let lines = split_lines(text);
                let keep = if field.is_multiline() { lines.len() } else { 1 };
                for line in lines.into_iter().take(keep) {
                    push_line(&mut block, field, line);
                }
            }
            FieldValue::Json(json) => push_line(&mut block, field, &stringify(json)),
            FieldValue::Undefined => push_line(&mut block, field, "undefined"),
        }
    }

    if !block.is_empty() {
        block.push('\n');
    }
    block
}

/// Render a decoded JSON value (see [`Record::from_json`])
pub fn format_value(value: &Value) -> String {
    format_record(&Record::from_json(value))
}

/// Split on `\r\n`, `\r` or `\n`, keeping empty segments.
///
/// `"a\r\nb"` is two segments, `"a\n"` is `["a", ""]`.
pub fn split_lines(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\r' => {
                lines.push(&text[start..i]);
                i += if bytes.get(i + 1) == Some(&b'\n') { 2 } else { 1 };
                start = i;
            }
            b'\n' => {
                lines.push(&text[start..i]);
                i += 1;
                start = i;
            }
            _ => i += 1,
        }
    }

    lines.push(&text[start..]);
    lines
}

/// Compact JSON with integral floats written as integers (`1.0` -> `1`).
///
/// Object keys keep their input order.
pub fn stringify(value: &Value) -> String {
    integral_floats(value.clone()).to_string()
}

// Beyond 2^53 an f64 no longer holds every integer exactly
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

fn integral_floats(value: Value) -> Value {
    match value {
        Value::Number(number) => match number.as_f64() {
            Some(float)
                if number.is_f64() && float.fract() == 0.0 && float.abs() <= MAX_EXACT_INTEGER =>
            {
                Value::from(float as i64)
            }
            _ => Value::Number(number),
        },
        Value::Array(items) => Value::Array(items.into_iter().map(integral_floats).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key, integral_floats(value)))
                .collect(),
        ),
        other => other,
    }
}

fn push_line(block: &mut String, field: Field, value: &str) {
    block.push_str(field.name());
    block.push(':');
    block.push_str(value);
    block.push('\n');
}
