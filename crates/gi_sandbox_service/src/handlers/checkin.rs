use std::net::SocketAddr;

use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use gi_protocol::headers::{X_ANALYSIS_ID, X_MESSAGE, X_SAMPLE_SHA256};
use gi_protocol::ApiError;

use crate::state::AppState;

/// `GET /vm/checkin` (spec §4.2): as the Evaluation Service's, but
/// matched against the Analysis VM pool and responding with the
/// **encrypted** sample bytes read straight off disk.
pub async fn checkin(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Result<Response, ApiError> {
    let ip = addr.ip().to_string();
    let vm = state
        .config
        .vm_by_ip(&ip)
        .ok_or_else(|| ApiError::Client(format!("source IP {ip} is not a configured Analysis VM")))?;

    if state.task_pool.is_busy(&vm.name).await {
        return Ok(empty_checkin_response());
    }

    let analysis = gi_db::analyses::claim_pending(&state.pool, &vm.name)
        .await
        .map_err(|e| ApiError::Internal(e.into()))?;

    let Some(analysis) = analysis else {
        return Ok(empty_checkin_response());
    };

    let sample = gi_db::samples::get_by_sha256(&state.pool, &analysis.sample_sha256)
        .await
        .map_err(|e| ApiError::Internal(e.into()))?
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!(
            "analysis {} references missing sample {}",
            analysis.id,
            analysis.sample_sha256
        )))?;

    let framed = tokio::fs::read(&sample.filepath)
        .await
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("failed to read sample file: {e}")))?;

    let mut response = Response::new(Body::from(framed));
    let headers = response.headers_mut();
    headers.insert(
        X_SAMPLE_SHA256,
        HeaderValue::from_str(&sample.sha256).expect("hex digest is always a valid header value"),
    );
    headers.insert(
        X_ANALYSIS_ID,
        HeaderValue::from_str(&analysis.id.to_string()).expect("integer is always a valid header value"),
    );
    headers.insert(X_MESSAGE, HeaderValue::from_static("analysis dispatched"));
    Ok(response)
}

fn empty_checkin_response() -> Response {
    (StatusCode::OK, [(X_MESSAGE, "no pending analyses")], Body::empty()).into_response()
}
