//! HTTP error body
//!
//! `IntoResponse` for `AppError` lives in the API crate (orphan rule); this
//! crate only owns the serialized shape so every layer renders errors alike.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Standard error response format for HTTP APIs
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Machine-readable code, e.g. `NOT_FOUND` or `OAUTH_INVALID_STATE`
    pub code: String,
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

impl ErrorResponse {
    /// Minimal body for rejections raised outside `AppError` (e.g. extractors)
    pub fn simple(code: &str, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
            error_type: None,
            code: code.to_string(),
            recoverable: false,
            suggested_action: None,
        }
    }
}
