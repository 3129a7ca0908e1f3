use axum::http::HeaderMap;

use gi_protocol::headers::{X_ANALYSIS_ID, X_SAMPLE_SHA256};
use gi_protocol::ApiError;

/// Extract and parse `X-Analysis-ID`/`X-Sample-SHA256`, required on
/// both `vm/submit/report` and `vm/submit/error` (spec §4.2).
pub fn extract(headers: &HeaderMap) -> Result<(i64, String), ApiError> {
    let analysis_id = headers
        .get(X_ANALYSIS_ID)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Client(format!("missing {X_ANALYSIS_ID} header")))?
        .parse::<i64>()
        .map_err(|_| ApiError::Client(format!("{X_ANALYSIS_ID} header is not an integer")))?;

    let sample_sha256 = headers
        .get(X_SAMPLE_SHA256)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Client(format!("missing {X_SAMPLE_SHA256} header")))?
        .to_string();

    Ok((analysis_id, sample_sha256))
}
