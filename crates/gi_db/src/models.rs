use chrono::{DateTime, Utc};
use gi_protocol::status::{AnalysisStatus, CandidateStatus, InvalidStatus};

/// Row shape of `candidates` (spec §3). `status` is stored as the raw
/// `i32` code; callers that need the enum go through
/// [`Candidate::status`].
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Candidate {
    pub hash: String,
    pub code: String,
    pub makefile: Option<String>,
    pub unit_test: Option<String>,
    pub xml: Option<String>,
    pub classification: Option<String>,
    pub status: i32,
    pub f1: Option<f64>,
    pub f2: Option<f64>,
    pub f3: Option<f64>,
    pub analysis_id: Option<i64>,
    pub build_vm: Option<String>,
    pub error_message: Option<String>,
    pub date_added: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
}

impl Candidate {
    pub fn status(&self) -> Result<CandidateStatus, InvalidStatus> {
        CandidateStatus::try_from(self.status)
    }

    pub fn fused_fitness(&self, weights: gi_protocol::fitness::FitnessWeights) -> Option<f64> {
        gi_protocol::fitness::fused_fitness(self.f1, self.f2, self.f3, weights)
    }
}

/// Row shape of `samples` (spec §3).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Sample {
    pub sha256: String,
    pub md5: String,
    pub sha1: String,
    pub sha224: String,
    pub sha384: String,
    pub sha512: String,
    pub filepath: String,
    pub date_added: DateTime<Utc>,
}

/// Row shape of `analyses` (spec §3).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Analysis {
    pub id: i64,
    pub sample_sha256: String,
    pub report: String,
    pub status: i32,
    pub analysis_vm: Option<String>,
    pub error_message: Option<String>,
    pub date_added: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
}

impl Analysis {
    pub fn status(&self) -> Result<AnalysisStatus, InvalidStatus> {
        AnalysisStatus::try_from(self.status)
    }
}
