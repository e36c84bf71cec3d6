use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Codes service error variants.
///
/// Verification rejections are not errors; see `domain::types::Verification`.
#[derive(Debug, thiserror::Error)]
pub enum CodesServiceError {
    #[error("code space exhausted after {attempts} draws ({live} live codes)")]
    CodeSpaceExhausted { attempts: usize, live: usize },
    #[error("{0}")]
    InvalidInput(String),
    #[error("invalid code format: {0}")]
    InvalidFormat(String),
}

impl CodesServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CodeSpaceExhausted { .. } => "SERVICE_UNAVAILABLE",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::InvalidFormat(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for CodesServiceError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::CodeSpaceExhausted { attempts, live } => {
                tracing::error!(attempts, live, "code generation exhausted");
                (StatusCode::SERVICE_UNAVAILABLE, "Service unavailable".to_owned())
            }
            Self::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::InvalidFormat(_) => {
                tracing::error!(error = %self, kind = "INTERNAL", "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_owned())
            }
        };
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": message,
        });
        (status, axum::Json(body)).into_response()
    }
}
