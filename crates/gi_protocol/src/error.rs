//! Structured error taxonomy (spec §7) with the HTTP mapping each
//! variant carries.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed request, unknown hash, unknown classification → 400/404, no state change.
    #[error("{0}")]
    Client(String),

    /// Unknown resource → 404, no state change.
    #[error("{0}")]
    NotFound(String),

    /// Bad or missing bearer token → 401.
    #[error("missing or invalid bearer token")]
    Auth,

    /// Update violates the state machine, or header identifiers don't match
    /// the running row → 400, triggers a defensive revert of the VM.
    #[error("{0}")]
    Transition(String),

    /// Any uncaught failure → 500, row is not mutated.
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Client(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Auth => StatusCode::UNAUTHORIZED,
            Self::Transition(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        Self::Internal(anyhow::Error::new(err))
    }
}
