//! Non-standard header names exchanged between the core and the VM
//! agents (spec §6).

/// ES → Build VM: the hash of the Candidate handed out by `/vm/checkin`.
pub const X_CANDIDATE_HASH: &str = "x-candidate-hash";

/// SB → Analysis VM: the sha256 of the Sample handed out by `/vm/checkin`.
pub const X_SAMPLE_SHA256: &str = "x-sample-sha256";

/// SB → Analysis VM: the id of the Analysis handed out by `/vm/checkin`,
/// and required on `/vm/submit/report` and `/vm/submit/error`.
pub const X_ANALYSIS_ID: &str = "x-analysis-id";

/// Human-readable debugging aid set alongside the machine headers above
/// (SUPPLEMENT, ported from the original's `X-Message`).
pub const X_MESSAGE: &str = "x-message";
