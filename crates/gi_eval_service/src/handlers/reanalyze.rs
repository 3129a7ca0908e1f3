use axum::extract::{Path, State};
use axum::Json;

use gi_protocol::dto::SubmitResponse;
use gi_protocol::ApiError;

use crate::state::AppState;

/// `GET /reanalyze/<hash>` (spec §4.1): force a Candidate back to
/// `pending` regardless of its current status, including terminal
/// rows. Unlike `/vm/update`, this bypasses the state machine guard by
/// design — it is an operator action, not a VM report.
pub async fn reanalyze(
    State(state): State<AppState>,
    Path(hash): Path<String>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let candidate = gi_db::candidates::reanalyze(&state.pool, &hash).await.map_err(|e| match e {
        gi_db::DbError::NotFound(msg) => ApiError::NotFound(msg),
        other => ApiError::Internal(other.into()),
    })?;

    Ok(Json(SubmitResponse { candidate_hash: candidate.hash }))
}
