use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use gi_protocol::dto::CandidateInfo;
use gi_protocol::fitness::FitnessWeights;
use gi_protocol::ApiError;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct InfoQuery {
    /// Include the base64 source alongside the metadata (spec §4.1:
    /// `GET /info/<hash>[?returncode=true]`).
    #[serde(default, alias = "returncode")]
    pub include_code: bool,
}

/// `GET /info/<hash>` (spec §4.1): current Candidate state, fused
/// fitness computed on read rather than stored.
pub async fn info(
    State(state): State<AppState>,
    Path(hash): Path<String>,
    Query(query): Query<InfoQuery>,
) -> Result<Json<CandidateInfo>, ApiError> {
    let candidate = gi_db::candidates::get_by_hash(&state.pool, &hash)
        .await
        .map_err(|e| ApiError::Internal(e.into()))?
        .ok_or_else(|| ApiError::NotFound(format!("candidate {hash}")))?;

    let status = candidate
        .status()
        .map_err(|e| ApiError::Internal(anyhow::anyhow!(e)))?
        .to_string();
    let fitness = candidate.fused_fitness(FitnessWeights::default());

    Ok(Json(CandidateInfo {
        hash: candidate.hash,
        status,
        classification: candidate.classification,
        f1: candidate.f1,
        f2: candidate.f2,
        f3: candidate.f3,
        fitness,
        analysis_id: candidate.analysis_id,
        build_vm: candidate.build_vm,
        error_message: candidate.error_message,
        date_added: candidate.date_added,
        date_updated: candidate.date_updated,
        code: query.include_code.then_some(candidate.code),
    }))
}
