use std::net::SocketAddr;

use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use gi_protocol::headers::{X_CANDIDATE_HASH, X_MESSAGE};
use gi_protocol::ApiError;

use crate::state::AppState;

/// `GET /vm/checkin` (spec §4.1): pull-based dispatch restricted to
/// configured Build VMs. Source IP must match a known VM or the
/// request is rejected `400`.
pub async fn checkin(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Result<Response, ApiError> {
    let ip = addr.ip().to_string();
    let vm = state
        .config
        .vm_by_ip(&ip)
        .ok_or_else(|| ApiError::Client(format!("source IP {ip} is not a configured Build VM")))?;

    if state.task_pool.is_busy(&vm.name).await {
        // Still reverting from its previous assignment; treat as "no
        // work available" rather than handing out a second task.
        return Ok(empty_checkin_response());
    }

    let candidate = gi_db::candidates::claim_pending(&state.pool, &vm.name)
        .await
        .map_err(|e| ApiError::Internal(e.into()))?;

    let Some(candidate) = candidate else {
        return Ok(empty_checkin_response());
    };

    let mut response = Response::new(Body::from(candidate.code));
    response.headers_mut().insert(
        X_CANDIDATE_HASH,
        HeaderValue::from_str(&candidate.hash).expect("hash is hex, always valid header value"),
    );
    response
        .headers_mut()
        .insert(X_MESSAGE, HeaderValue::from_static("candidate dispatched"));
    Ok(response)
}

fn empty_checkin_response() -> Response {
    (StatusCode::OK, [(X_MESSAGE, "no pending candidates")], Body::empty()).into_response()
}
