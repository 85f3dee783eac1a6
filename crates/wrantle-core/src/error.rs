use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// JSON error body shared by every Wrantle service.
///
/// Wire shape: `{"kind": "SNAKE_UPPER", "message": "...", "errors": {...}}`.
/// `errors` is only present for field-level validation failures.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    #[serde(skip)]
    pub status: StatusCode,
    pub kind: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<serde_json::Value>,
    /// Logged for server errors, never sent to the client.
    #[serde(skip)]
    pub source: Option<String>,
}

impl ErrorResponse {
    pub fn new(status: StatusCode, kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            kind,
            message: message.into(),
            errors: None,
            source: None,
        }
    }

    pub fn with_errors(mut self, errors: serde_json::Value) -> Self {
        self.errors = Some(errors);
        self
    }

    pub fn with_source(mut self, source: impl std::fmt::Display) -> Self {
        self.source = Some(format!("{source:#}"));
        self
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        // Server errors only. TraceLayer records method, uri and status for every request.
        if self.status.is_server_error() {
            match &self.source {
                Some(source) => tracing::error!(error = %source, kind = self.kind, "server error"),
                None => tracing::error!(kind = self.kind, message = %self.message, "server error"),
            }
        }
        (self.status, axum::Json(&self)).into_response()
    }
}
