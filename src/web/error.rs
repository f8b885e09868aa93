use crate::error::Error;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

/// Failure returned by a relay handler
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// No valid session or access token
    #[error("Unauthorized")]
    Unauthorized,

    /// The remote calendar call failed; `message` is what the caller sees
    #[error("{message}")]
    UpstreamFailure {
        message: &'static str,
        #[source]
        source: Error,
    },
}

impl RelayError {
    /// Wrap a remote failure, logging the detail that is kept from the caller
    pub fn upstream(message: &'static str, source: Error) -> Self {
        error!("{}: {}", message, source);
        RelayError::UpstreamFailure { message, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::Unauthorized => StatusCode::UNAUTHORIZED,
            RelayError::UpstreamFailure { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
