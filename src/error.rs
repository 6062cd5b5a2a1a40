use std::time::Duration;

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use tracing::{error, warn};

/// Every way a proxied request can fail. Each kind maps to exactly one status
/// and envelope shape.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// Caller sent something unusable.
    #[error("{0}")]
    Input(String),

    /// `hint` is appended to the message verbatim.
    #[error("Upstream request timed out after {}s (timeout).{hint}", .limit.as_secs())]
    Timeout { limit: Duration, hint: &'static str },

    /// Network failure before a response arrived.
    #[error("Upstream request failed: {0}")]
    Transport(String),

    /// Upstream answered with a body that cannot be used.
    #[error("{reason} (status {status})")]
    Protocol {
        status: u16,
        reason: String,
        body_snippet: String,
        content_type: Option<String>,
    },

    /// Upstream answered with a non-2xx status.
    #[error("Upstream returned status {status}")]
    Upstream { status: u16, detail: Value },

    /// Upstream answered 2xx but flagged `ok: false`.
    #[error("{message}")]
    Logical { message: String, detail: Value },

    #[error("{message}")]
    Config { message: String, hint: String },

    #[error("{0}")]
    Unauthorized(String),

    /// Request body exceeded the upload limit.
    #[error("{0}")]
    TooLarge(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::Input(_) | ProxyError::Logical { .. } => StatusCode::BAD_REQUEST,
            ProxyError::Timeout { .. } => StatusCode::REQUEST_TIMEOUT,
            ProxyError::Transport(_) | ProxyError::Config { .. } | ProxyError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ProxyError::Protocol { .. } => StatusCode::BAD_GATEWAY,
            ProxyError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            ProxyError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ProxyError::TooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }

    pub fn timeout(limit: Duration) -> Self {
        ProxyError::Timeout {
            limit,
            hint: " Retry later.",
        }
    }

    /// Swaps a timeout's hint for one suited to file uploads; other kinds
    /// pass through.
    pub fn for_upload(self) -> Self {
        match self {
            ProxyError::Timeout { limit, .. } => ProxyError::Timeout {
                limit,
                hint: " Try reducing the file size or retry later.",
            },
            other => other,
        }
    }

    pub fn non_json(status: u16, body_snippet: String, content_type: Option<String>) -> Self {
        ProxyError::Protocol {
            status,
            reason: "Upstream returned a non-JSON response".into(),
            body_snippet,
            content_type,
        }
    }

    pub fn missing_ai_url() -> Self {
        ProxyError::Config {
            message: "AI backend URL is not configured".into(),
            hint: "Set AI_API_URL (or NEXT_PUBLIC_AI_API_URL) to the base URL of the AI service and restart".into(),
        }
    }

    fn envelope(&self) -> Value {
        let mut body = json!({ "ok": false, "error": self.to_string() });
        match self {
            ProxyError::Protocol {
                status,
                body_snippet,
                content_type,
                ..
            } => {
                body["status"] = json!(status);
                body["bodySnippet"] = json!(body_snippet);
                body["contentType"] = json!(content_type);
            }
            ProxyError::Upstream { detail, .. } | ProxyError::Logical { detail, .. } => {
                body["detail"] = detail.clone();
            }
            ProxyError::Config { hint, .. } => {
                body["hint"] = json!(hint);
            }
            _ => {}
        }
        body
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(%status, error = %self, "request failed");
        } else {
            warn!(%status, error = %self, "request rejected");
        }
        (status, Json(self.envelope())).into_response()
    }
}

impl From<JsonRejection> for ProxyError {
    fn from(r: JsonRejection) -> Self {
        ProxyError::Input(format!("Invalid JSON body: {}", r.body_text()))
    }
}

impl From<QueryRejection> for ProxyError {
    fn from(r: QueryRejection) -> Self {
        ProxyError::Input(format!("Invalid query string: {}", r.body_text()))
    }
}

impl From<MultipartRejection> for ProxyError {
    fn from(r: MultipartRejection) -> Self {
        ProxyError::Input(format!("Expected a multipart form: {}", r.body_text()))
    }
}

impl From<MultipartError> for ProxyError {
    fn from(e: MultipartError) -> Self {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return ProxyError::TooLarge(
                "Upload exceeds the size limit (MAX_UPLOAD_MB); send smaller files".into(),
            );
        }
        ProxyError::Input(format!("Malformed multipart body: {}", e.body_text()))
    }
}

impl From<sqlx::Error> for ProxyError {
    fn from(e: sqlx::Error) -> Self {
        ProxyError::Internal(e.to_string())
    }
}
