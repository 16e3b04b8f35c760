use serde_json::Value;

/// Reduces a model's output to a single image URL.
///
/// Models disagree on shape: most return a list of URLs (the last one is the final
/// image), some a bare string, a few an object with an `image` key.
pub fn image_url(output: &Value) -> Option<String> {
    let url = match output {
        Value::Array(items) => items.last().map(as_text)?,
        Value::String(s) => s.clone(),
        Value::Object(map) => map.get("image").filter(|v| is_truthy(v)).map(as_text)?,
        _ => return None,
    };
    Some(url).filter(|u| !u.is_empty())
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        Value::Number(_) => true,
    }
}
