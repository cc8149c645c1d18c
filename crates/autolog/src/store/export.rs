//! Export — detail rendering of archived payloads.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};

/// Pretty-print with a 4-space indent, the layout used for detail views and
/// clipboard export.
pub fn to_pretty_json(payload: &Map<String, Value>) -> Result<String, serde_json::Error> {
    let mut out = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    payload.serialize(&mut serializer)?;
    // serde_json only ever writes valid UTF-8
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Render as indented `key: value` text, two spaces per nesting level.
pub fn to_text(payload: &Map<String, Value>) -> String {
    let mut out = String::new();
    write_object(&mut out, payload, 0);
    out
}

fn write_object(out: &mut String, obj: &Map<String, Value>, depth: usize) {
    let pad = "  ".repeat(depth);
    for (key, value) in obj {
        match value {
            Value::Object(inner) => {
                out.push_str(&format!("{}{}:\n", pad, key));
                write_object(out, inner, depth + 1);
            }
            Value::Array(items) => {
                out.push_str(&format!("{}{}:\n", pad, key));
                for item in items {
                    write_item(out, item, depth + 1);
                }
            }
            scalar => out.push_str(&format!("{}{}: {}\n", pad, key, scalar_text(scalar))),
        }
    }
}

fn write_item(out: &mut String, item: &Value, depth: usize) {
    match item {
        Value::Object(inner) => write_object(out, inner, depth),
        Value::Array(items) => {
            for nested in items {
                write_item(out, nested, depth + 1);
            }
        }
        scalar => out.push_str(&format!("{}{}\n", "  ".repeat(depth), scalar_text(scalar))),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}
