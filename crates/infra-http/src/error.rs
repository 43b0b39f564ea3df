// reqwest / HTTP status -> AppError mapping

use imhotep_core::AppError;
use reqwest::StatusCode;
use serde_json::Value;

/// Body fields that may carry a human-readable message, in lookup order
const MESSAGE_FIELDS: [&str; 3] = ["message", "detail", "error"];

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> AppError {
    if err.is_timeout() {
        return AppError::Transport(format!("request timed out: {}", err));
    }
    if err.is_decode() {
        return AppError::Transport(format!("invalid response body: {}", err));
    }
    AppError::Transport(err.to_string())
}

/// Build an API error from a non-success response body
///
/// Uses the backend's own message when the body is JSON and has one,
/// otherwise the reason phrase.
pub(crate) fn api_error(status: StatusCode, body: &str) -> AppError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| backend_message(&json))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });

    AppError::Api {
        status: status.as_u16(),
        message,
    }
}

fn backend_message(json: &Value) -> Option<String> {
    MESSAGE_FIELDS.iter().find_map(|field| match json.get(field)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::String(_) | Value::Null => None,
        // e.g. a list of validation errors
        other => Some(other.to_string()),
    })
}
