//! Bearer-token auth middleware (spec §6: "All endpoints require
//! bearer-token auth ... Exit from handlers on auth failure is 401").
//! Grounded on axum's standard `middleware::from_fn_with_state` idiom
//! (the corpus has no HTTP auth layer of its own — its control plane is
//! ZeroMQ-based — so this is adapted from the pack's `axum`-using repos).

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
