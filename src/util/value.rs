use serde_json::Value;

pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(arr) => arr
            .iter()
            .map(value_to_text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(obj) => obj
            .get("value")
            .or_else(|| obj.get("name"))
            .map(value_to_text)
            .unwrap_or_default(),
        other => other.to_string(),
    }
}
