//! The API's `{data, errors?, message?}` response envelope.

use serde_json::Value;

/// Parse a response body, treating an empty body as no payload.
///
/// # Errors
///
/// Returns the JSON error for non-empty bodies that do not parse.
pub fn parse_body(text: &str) -> Result<Option<Value>, serde_json::Error> {
    if text.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(text).map(Some)
}

/// Pick the error message for a failed response.
///
/// Uses `errors[0].message`, else `message`, else `fallback`.
#[must_use]
pub fn error_message(payload: Option<&Value>, fallback: impl FnOnce() -> String) -> String {
    payload
        .and_then(|p| {
            p.pointer("/errors/0/message")
                .and_then(Value::as_str)
                .filter(|m| !m.is_empty())
                .or_else(|| p.get("message").and_then(Value::as_str).filter(|m| !m.is_empty()))
        })
        .map_or_else(fallback, str::to_string)
}

/// Return `data` when present (and not null), else the whole body.
#[must_use]
pub fn unwrap_data(payload: Value) -> Value {
    match payload {
        Value::Object(mut map) if map.get("data").is_some_and(|d| !d.is_null()) => {
            map.remove("data").unwrap_or_default()
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_parse_empty_body() {
        assert_eq!(parse_body("").unwrap(), None);
        assert_eq!(parse_body("{\"a\":1}").unwrap(), Some(json!({"a": 1})));
        assert!(parse_body("<html>").is_err());
    }

    #[test]
    fn test_error_message_priority() {
        let both = json!({"errors": [{"message": "Title is required"}], "message": "Bad Request"});
        assert_eq!(error_message(Some(&both), || "fallback".into()), "Title is required");

        let message_only = json!({"message": "Bad Request"});
        assert_eq!(error_message(Some(&message_only), || "fallback".into()), "Bad Request");

        let empty_errors = json!({"errors": [], "message": "Bad Request"});
        assert_eq!(error_message(Some(&empty_errors), || "fallback".into()), "Bad Request");

        let neither = json!({"status": "error"});
        assert_eq!(
            error_message(Some(&neither), || "Request failed (HTTP 500)".into()),
            "Request failed (HTTP 500)"
        );
        assert_eq!(error_message(None, || "none".into()), "none");
    }

    #[test]
    fn test_unwrap_data() {
        assert_eq!(unwrap_data(json!({"data": {"id": "1"}, "meta": {}})), json!({"id": "1"}));
        assert_eq!(unwrap_data(json!({"data": [1, 2]})), json!([1, 2]));
        assert_eq!(unwrap_data(json!({"id": "1"})), json!({"id": "1"}));
        assert_eq!(unwrap_data(json!({"data": null, "id": "1"})), json!({"data": null, "id": "1"}));
        assert_eq!(unwrap_data(json!([1])), json!([1]));
    }
}
