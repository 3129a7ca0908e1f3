use std::path::PathBuf;

use axum::extract::{Multipart, State};
use axum::Json;

use gi_protocol::dto::Tag;
use gi_protocol::ApiError;

use crate::handlers::submit_analysis::create_analysis;
use crate::state::AppState;

#[derive(Debug, serde::Serialize)]
pub struct SubmitSampleResponse {
    pub sha256: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis_id: Option<i64>,
}

/// `POST /submit/sample` (spec §4.2): read the uploaded file, hash and
/// encrypt it, and write `salt ‖ iv ‖ ciphertext` under
/// `DATA_PATH/<sha256[0:2]>/<sha256[0:4]>/<sha256>`.
pub async fn submit_sample(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<SubmitSampleResponse>, ApiError> {
    let mut file_bytes: Option<Vec<u8>> = None;
    let mut tags_raw: Option<String> = None;
    let mut analyze = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Client(format!("malformed multipart body: {e}")))?
    {
        match field.name().unwrap_or_default() {
            "file" => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::Client(format!("failed to read uploaded file: {e}")))?;
                file_bytes = Some(data.to_vec());
            }
            "tags" => {
                tags_raw = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::Client(format!("malformed tags field: {e}")))?,
                );
            }
            "analyze" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::Client(format!("malformed analyze field: {e}")))?;
                analyze = text.trim().eq_ignore_ascii_case("true") || text.trim() == "1";
            }
            _ => {}
        }
    }

    let plaintext = file_bytes.ok_or_else(|| ApiError::Client("multipart body missing 'file' field".into()))?;
    let hashes = gi_crypto::hashes::hash_all(&plaintext);

    let framed = gi_crypto::encrypt(&plaintext, &state.config.sandbox_token);
    let filepath = write_sample_file(&state.config.data_path, &hashes.sha256, &framed).await?;

    let sample = gi_db::samples::upsert(&state.pool, &hashes, &filepath)
        .await
        .map_err(|e| ApiError::Internal(e.into()))?;

    if let Some(raw) = tags_raw {
        for tag in Tag::parse_list(&raw) {
            gi_db::tags::associate_sample(&state.pool, &sample.sha256, &tag)
                .await
                .map_err(|e| ApiError::Internal(e.into()))?;
        }
    }

    let analysis_id = if analyze {
        Some(create_analysis(&state, &sample.sha256).await?.analysis_id)
    } else {
        None
    };

    Ok(Json(SubmitSampleResponse { sha256: sample.sha256, analysis_id }))
}

async fn write_sample_file(data_path: &std::path::Path, sha256: &str, framed: &[u8]) -> Result<String, ApiError> {
    let dir: PathBuf = data_path.join(&sha256[0..2]).join(&sha256[0..4]);
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("failed to create sample directory: {e}")))?;

    let path = dir.join(sha256);
    tokio::fs::write(&path, framed)
        .await
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("failed to write sample file: {e}")))?;

    Ok(path.to_string_lossy().into_owned())
}
