use serde_json::{Map, Value};

/// Render a JSON value the way it is shown in a table cell:
/// strings verbatim, `null`/absent as empty, anything else as compact JSON.
pub(crate) fn display_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Walk a chain of object keys. `None` if any hop is missing or not an object.
pub(crate) fn lookup<'a>(obj: &'a Map<String, Value>, path: &[&str]) -> Option<&'a Value> {
    let (last, parents) = path.split_last()?;
    let mut current = obj;
    for key in parents {
        current = current.get(*key)?.as_object()?;
    }
    current.get(*last)
}

/// Required scalar rendered for display; containers and `null` are rejected.
pub(crate) fn scalar_at(obj: &Map<String, Value>, path: &[&str]) -> Option<String> {
    match lookup(obj, path)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
