use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;

use gi_protocol::status::AnalysisStatus;
use gi_protocol::ApiError;

use crate::handlers::report_headers;
use crate::handlers::submit_report::defensive_revert;
use crate::state::AppState;
use crate::state_machine::validate_report_headers;

#[derive(Debug, Deserialize)]
pub struct SubmitErrorRequest {
    pub error_message: String,
}

/// `POST /vm/submit/error` (spec §4.2): mirror of `vm/submit/report`,
/// moves the Analysis to `error` and stores the message.
pub async fn submit_error(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<SubmitErrorRequest>,
) -> Result<(), ApiError> {
    let (claimed_id, claimed_sha256) = report_headers::extract(&headers)?;

    let analysis = gi_db::analyses::get_by_id(&state.pool, claimed_id)
        .await
        .map_err(|e| ApiError::Internal(e.into()))?
        .ok_or_else(|| ApiError::NotFound(format!("analysis {claimed_id}")))?;

    let analysis_vm = analysis.analysis_vm.clone();

    if let Err(err) = validate_report_headers(&analysis, claimed_id, &claimed_sha256) {
        defensive_revert(&state, analysis_vm.as_deref());
        return Err(err);
    }

    gi_db::analyses::finish(&state.pool, analysis.id, AnalysisStatus::Error.as_i32(), Some(&req.error_message))
        .await
        .map_err(|e| ApiError::Internal(e.into()))?;

    defensive_revert(&state, analysis_vm.as_deref());
    Ok(())
}
