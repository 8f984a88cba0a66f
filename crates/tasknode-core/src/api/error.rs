use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Unauthorized - token may be expired")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    /// Extract the human readable part of an error body.
    ///
    /// The backend answers errors with `{"detail": ...}`. A string detail is
    /// returned as-is, structured details are rendered as JSON, and anything
    /// that is not JSON is returned truncated. An empty body falls back to the
    /// status reason phrase.
    pub fn detail(status: reqwest::StatusCode, body: &str) -> String {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
            match value.get("detail") {
                Some(serde_json::Value::String(detail)) => return detail.clone(),
                Some(detail) => return Self::truncate_body(&detail.to_string()),
                None => {}
            }
        }
        if body.trim().is_empty() {
            return status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| status.to_string());
        }
        Self::truncate_body(body)
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let detail = Self::detail(status, body);
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied(detail),
            404 => ApiError::NotFound(detail),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(detail),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, detail)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_detail_prefers_json_detail() {
        let body = r#"{"detail": "User already exists"}"#;
        assert_eq!(ApiError::detail(StatusCode::BAD_REQUEST, body), "User already exists");
    }

    #[test]
    fn test_detail_renders_structured_detail() {
        let body = r#"{"detail": [{"msg": "field required"}]}"#;
        assert_eq!(
            ApiError::detail(StatusCode::UNPROCESSABLE_ENTITY, body),
            r#"[{"msg":"field required"}]"#
        );
    }

    #[test]
    fn test_detail_falls_back_to_reason() {
        assert_eq!(ApiError::detail(StatusCode::BAD_GATEWAY, ""), "Bad Gateway");
        assert_eq!(ApiError::detail(StatusCode::BAD_GATEWAY, "upstream down"), "upstream down");
    }

    #[test]
    fn test_truncate_long_body() {
        let body = "x".repeat(MAX_ERROR_BODY_LENGTH + 20);
        let truncated = ApiError::truncate_body(&body);
        assert!(truncated.starts_with(&"x".repeat(MAX_ERROR_BODY_LENGTH)));
        assert!(truncated.ends_with("(truncated, 520 total bytes)"));
    }

    #[test]
    fn test_from_status() {
        assert!(matches!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, ""),
            ApiError::Unauthorized
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::TOO_MANY_REQUESTS, ""),
            ApiError::RateLimited
        ));
        match ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, r#"{"detail":"boom"}"#) {
            ApiError::ServerError(detail) => assert_eq!(detail, "boom"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
