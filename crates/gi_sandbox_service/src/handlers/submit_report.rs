use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;

use gi_protocol::status::AnalysisStatus;
use gi_protocol::ApiError;

use crate::handlers::report_headers;
use crate::state::AppState;
use crate::state_machine::validate_report_headers;

/// `POST /vm/submit/report` (spec §4.2): requires matching
/// `X-Analysis-ID`/`X-Sample-SHA256`; writes the JSON body to `report`,
/// moves the Analysis to `complete`, and reverts the VM so it becomes
/// eligible for the next checkin.
pub async fn submit_report(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
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

    let report_text = String::from_utf8(body.to_vec())
        .map_err(|_| ApiError::Client("report body is not valid UTF-8".into()))?;

    tokio::fs::write(&analysis.report, report_text.as_bytes())
        .await
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("failed to write report file: {e}")))?;

    gi_db::analyses::finish(&state.pool, analysis.id, AnalysisStatus::Complete.as_i32(), None)
        .await
        .map_err(|e| ApiError::Internal(e.into()))?;

    defensive_revert(&state, analysis_vm.as_deref());
    Ok(())
}

/// Revert+start the bound VM asynchronously (spec §4.2: "triggers async
/// revert"), whether the report was accepted or rejected as a mismatch.
pub(crate) fn defensive_revert(state: &AppState, vm_name: Option<&str>) {
    let Some(vm_name) = vm_name else { return };
    let Some(vm) = state.config.vm_by_name(vm_name) else { return };
    state.task_pool.spawn_revert_then_start(vm.name.clone(), vm.snapshot.clone());
}
