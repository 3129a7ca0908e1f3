//! Canonical status enums for Candidates and Analyses.
//!
//! Both are stored as small integers (see spec §3) so round-tripping
//! through Postgres uses a plain `i32` column rather than a native enum
//! type — this keeps the two services' schemas independent of each
//! other even though they share one database.

use std::fmt;

/// Candidate lifecycle status (spec §3, §4.1 state machine).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum CandidateStatus {
    Pending,
    Building,
    Analyzing,
    Complete,
    Error,
}

impl CandidateStatus {
    pub const fn as_i32(self) -> i32 {
        match self {
            Self::Pending => 0,
            Self::Building => 1,
            Self::Analyzing => 2,
            Self::Complete => 3,
            Self::Error => 4,
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Error)
    }
}

impl TryFrom<i32> for CandidateStatus {
    type Error = InvalidStatus;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Pending),
            1 => Ok(Self::Building),
            2 => Ok(Self::Analyzing),
            3 => Ok(Self::Complete),
            4 => Ok(Self::Error),
            other => Err(InvalidStatus(other)),
        }
    }
}

impl From<CandidateStatus> for i32 {
    fn from(value: CandidateStatus) -> Self {
        value.as_i32()
    }
}

impl fmt::Display for CandidateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Building => "building",
            Self::Analyzing => "analyzing",
            Self::Complete => "complete",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}

/// Analysis lifecycle status (spec §3, §4.2 ordering guarantees).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum AnalysisStatus {
    Pending,
    Running,
    Complete,
    Error,
}

impl AnalysisStatus {
    pub const fn as_i32(self) -> i32 {
        match self {
            Self::Pending => 0,
            Self::Running => 1,
            Self::Complete => 2,
            Self::Error => 3,
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Error)
    }
}

impl TryFrom<i32> for AnalysisStatus {
    type Error = InvalidStatus;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Pending),
            1 => Ok(Self::Running),
            2 => Ok(Self::Complete),
            3 => Ok(Self::Error),
            other => Err(InvalidStatus(other)),
        }
    }
}

impl From<AnalysisStatus> for i32 {
    fn from(value: AnalysisStatus) -> Self {
        value.as_i32()
    }
}

impl fmt::Display for AnalysisStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Complete => "complete",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid status code: {0}")]
pub struct InvalidStatus(pub i32);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_status_round_trips() {
        for code in 0..=4 {
            let status = CandidateStatus::try_from(code).unwrap();
            assert_eq!(i32::from(status), code);
        }
        assert!(CandidateStatus::try_from(5).is_err());
    }

    #[test]
    fn analysis_status_round_trips() {
        for code in 0..=3 {
            let status = AnalysisStatus::try_from(code).unwrap();
            assert_eq!(i32::from(status), code);
        }
        assert!(AnalysisStatus::try_from(4).is_err());
    }

    #[test]
    fn terminal_classification() {
        assert!(CandidateStatus::Complete.is_terminal());
        assert!(CandidateStatus::Error.is_terminal());
        assert!(!CandidateStatus::Building.is_terminal());
        assert!(AnalysisStatus::Complete.is_terminal());
        assert!(!AnalysisStatus::Running.is_terminal());
    }
}
