use chrono::Utc;

use axum::extract::{Path, State};
use axum::Json;

use gi_protocol::dto::AnalysisSubmitResponse;
use gi_protocol::ApiError;

use crate::state::AppState;

/// `POST /submit/analysis/<hash>` (spec §4.2): infer the hash kind from
/// its length, locate the Sample, and create a `pending` Analysis whose
/// report path is precomputed as `filepath + "_YYYYMMDDHHMMSS.json"`.
pub async fn submit_analysis(
    State(state): State<AppState>,
    Path(hash): Path<String>,
) -> Result<Json<AnalysisSubmitResponse>, ApiError> {
    create_analysis(&state, &hash).await.map(Json)
}

/// Shared with `submit_sample`'s `analyze=true` path so both entry
/// points create an Analysis the same way.
pub(crate) async fn create_analysis(state: &AppState, hash: &str) -> Result<AnalysisSubmitResponse, ApiError> {
    let sample = gi_db::samples::find_by_any_hash(&state.pool, hash)
        .await
        .map_err(|e| ApiError::Internal(e.into()))?
        .ok_or_else(|| ApiError::NotFound(format!("sample {hash}")))?;

    let report = format!("{}_{}.json", sample.filepath, Utc::now().format("%Y%m%d%H%M%S"));

    let analysis = gi_db::analyses::create(&state.pool, &sample.sha256, &report)
        .await
        .map_err(|e| ApiError::Internal(e.into()))?;

    Ok(AnalysisSubmitResponse { analysis_id: analysis.id })
}
