//! Response bodies returned by the HTTP API.

use serde::{Deserialize, Serialize};

/// Successful response body for `GET /user` and `GET /user-with-middleware`.
///
/// Both names are nullable because the provider allows users without them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Standard error response body returned on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable description safe to expose to callers.
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn user_response_uses_camel_case() {
        let body = UserResponse {
            first_name: Some("Ada".into()),
            last_name: None,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value, json!({"firstName": "Ada", "lastName": null}));
    }

    #[test]
    fn error_response_has_single_field() {
        let value = serde_json::to_value(ErrorResponse::new("Unauthorized")).unwrap();
        assert_eq!(value, json!({"message": "Unauthorized"}));
    }
}
