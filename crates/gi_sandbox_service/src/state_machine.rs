//! The single guarded entry point for Analysis header validation and
//! terminal writes (spec §4.2, §9: "all transitions routed through one
//! guarded function").

use gi_db::models::Analysis;
use gi_protocol::status::AnalysisStatus;
use gi_protocol::ApiError;

/// `vm/submit/report` and `vm/submit/error` both require `X-Analysis-ID`
/// and `X-Sample-SHA256` to match the Analysis currently bound
/// `running` — a mismatch or an already-terminal row is rejected (spec
/// §4.2: "both must match the running Analysis or the request is
/// rejected and the VM reverted").
pub fn validate_report_headers(
    analysis: &Analysis,
    claimed_analysis_id: i64,
    claimed_sample_sha256: &str,
) -> Result<(), ApiError> {
    let status = analysis
        .status()
        .map_err(|e| ApiError::Internal(anyhow::anyhow!(e)))?;

    if status != AnalysisStatus::Running {
        return Err(ApiError::Transition(format!(
            "analysis {} is not running (status={status}), report rejected",
            analysis.id
        )));
    }

    if analysis.id != claimed_analysis_id || analysis.sample_sha256 != claimed_sample_sha256 {
        return Err(ApiError::Transition(format!(
            "analysis {} header mismatch: got id={claimed_analysis_id} sha256={claimed_sample_sha256}",
            analysis.id
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn running_analysis() -> Analysis {
        Analysis {
            id: 7,
            sample_sha256: "deadbeef".to_string(),
            report: "report.json".to_string(),
            status: AnalysisStatus::Running.as_i32(),
            analysis_vm: Some("win10-02".to_string()),
            error_message: None,
            date_added: Utc::now(),
            date_updated: Utc::now(),
        }
    }

    #[test]
    fn matching_headers_are_accepted() {
        let analysis = running_analysis();
        assert!(validate_report_headers(&analysis, 7, "deadbeef").is_ok());
    }

    #[test]
    fn mismatched_analysis_id_is_rejected() {
        let analysis = running_analysis();
        assert!(validate_report_headers(&analysis, 8, "deadbeef").is_err());
    }

    #[test]
    fn mismatched_sha256_is_rejected() {
        let analysis = running_analysis();
        assert!(validate_report_headers(&analysis, 7, "other").is_err());
    }

    #[test]
    fn terminal_analysis_rejects_report() {
        let mut analysis = running_analysis();
        analysis.status = AnalysisStatus::Complete.as_i32();
        assert!(validate_report_headers(&analysis, 7, "deadbeef").is_err());
    }
}
