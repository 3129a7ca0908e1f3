//! Bearer-token auth middleware (spec §6), identical contract to the
//! Evaluation Service's: the shared `sandbox_token` doubles as both the
//! API credential and the sample-encryption passphrase (spec §4.2).

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request};
use axum::middleware::Next;
use axum::response::Response;

use gi_protocol::ApiError;

use crate::state::AppState;

pub async fn require_bearer_token(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let header_value = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let token = header_value.and_then(|v| v.strip_prefix("Bearer "));

    match token {
        Some(token) if token == state.config.sandbox_token => Ok(next.run(request).await),
        _ => Err(ApiError::Auth),
    }
}
