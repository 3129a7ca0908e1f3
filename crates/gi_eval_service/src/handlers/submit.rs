use axum::extract::State;
use axum::Json;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use sha2::{Digest, Sha256};

use gi_protocol::dto::{SubmitRequest, SubmitResponse, Tag};
use gi_protocol::ApiError;

use crate::state::AppState;

/// `POST /submit` (spec §4.1): decode base64 if possible, falling back
/// to treating the body as plaintext source; hash the decoded plaintext
/// and upsert the Candidate, resetting mutable fields on resubmission.
pub async fn submit(
    State(state): State<AppState>,
    Json(req): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let plaintext = match BASE64.decode(req.code.as_bytes()) {
        Ok(bytes) => bytes,
        Err(_) => req.code.clone().into_bytes(),
    };

    let hash = hex::encode(Sha256::digest(&plaintext));
    let canonical_code = BASE64.encode(&plaintext);

    let candidate = gi_db::candidates::submit(
        &state.pool,
        &hash,
        &canonical_code,
        req.makefile.as_deref(),
        req.unit_test.as_deref(),
        req.class.as_deref(),
    )
    .await
    .map_err(|e| ApiError::Internal(e.into()))?;

    if let Some(class) = &req.class {
        gi_db::tags::associate_candidate(&state.pool, &candidate.hash, &Tag::new("class", class))
            .await
            .map_err(|e| ApiError::Internal(e.into()))?;
    }

    Ok(Json(SubmitResponse { candidate_hash: candidate.hash }))
}

#[cfg(test)]
mod tests {
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine;
    use sha2::{Digest, Sha256};

    #[test]
    fn hash_is_over_decoded_plaintext() {
        let source = "int main(){return 0;}";
        let encoded = BASE64.encode(source);
        let decoded = BASE64.decode(encoded.as_bytes()).unwrap();
        assert_eq!(decoded, source.as_bytes());
        let hash = hex::encode(Sha256::digest(&decoded));
        assert_eq!(hash.len(), 64);
    }

    #[test]
    fn plaintext_fallback_when_not_valid_base64() {
        let source = "not-base64!!{}";
        assert!(BASE64.decode(source.as_bytes()).is_err());
    }
}
