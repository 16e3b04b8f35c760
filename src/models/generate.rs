use crate::error::{Result, StudioError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of a successful `POST /api/generate`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerateResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

/// Body of a rejected `POST /api/generate`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// `detail` as text. Falsy values (`null`, `false`, `0`, `""`) count as absent and any other
/// non-string value is shown in its JSON form.
fn detail_field(value: &Value) -> Option<String> {
    match value.get("detail")? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) => Some(s.clone()).filter(|s| !s.is_empty()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}

impl GenerateResponse {
    pub fn new(image_url: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            image_url: Some(image_url.into()),
            prompt: Some(prompt.into()),
        }
    }

    /// Reads the display fields out of an already parsed body. Empty strings count as absent
    /// and a JSON `null` body cannot be rendered at all.
    pub fn from_value(value: &Value) -> Result<Self> {
        if value.is_null() {
            return Err(StudioError::Decode("response body is null".into()));
        }
        Ok(Self {
            image_url: string_field(value, "image_url"),
            prompt: string_field(value, "prompt"),
        })
    }
}

impl ErrorResponse {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: Some(detail.into()),
        }
    }

    pub fn from_value(value: &Value) -> Self {
        Self {
            detail: detail_field(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_fields_are_optional() {
        let body = GenerateResponse::from_value(&json!({"prompt": "a cat"})).unwrap();
        assert_eq!(body.image_url, None);
        assert_eq!(body.prompt.as_deref(), Some("a cat"));
    }

    #[test]
    fn empty_and_non_string_fields_are_ignored() {
        let body = GenerateResponse::from_value(&json!({"image_url": "", "prompt": 7})).unwrap();
        assert_eq!(body, GenerateResponse::default());
    }

    #[test]
    fn null_body_is_a_decode_failure() {
        assert!(matches!(
            GenerateResponse::from_value(&Value::Null),
            Err(StudioError::Decode(_))
        ));
    }

    #[test]
    fn detail_is_read_from_error_body() {
        assert_eq!(
            ErrorResponse::from_value(&json!({"detail": "bad input"})).detail.as_deref(),
            Some("bad input")
        );
        assert_eq!(ErrorResponse::from_value(&json!([1, 2])).detail, None);
    }

    #[test]
    fn non_string_detail_is_shown_as_json() {
        let detail = |body: Value| ErrorResponse::from_value(&body).detail;
        assert_eq!(detail(json!({"detail": 123})).as_deref(), Some("123"));
        assert_eq!(detail(json!({"detail": true})).as_deref(), Some("true"));
        assert_eq!(
            detail(json!({"detail": [{"msg": "field required"}]})).as_deref(),
            Some(r#"[{"msg":"field required"}]"#)
        );
        assert_eq!(detail(json!({"detail": 0})), None);
        assert_eq!(detail(json!({"detail": false})), None);
        assert_eq!(detail(json!({"detail": null})), None);
    }

    #[test]
    fn error_body_serializes_detail_only() {
        let body = serde_json::to_value(ErrorResponse::new("nope")).unwrap();
        assert_eq!(body, json!({"detail": "nope"}));
    }
}
