//! JSON request/response bodies exchanged over the HTTP surface (spec §4.1,
//! §4.2, §6). Kept in one shared crate so ES, SB and their tests agree on
//! field names without re-deriving them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `POST /submit` body.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitRequest {
    pub code: String,
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub makefile: Option<String>,
    #[serde(default)]
    pub unit_test: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitResponse {
    pub candidate_hash: String,
}

/// `POST /vm/update` body. All fields but `hash` are optional partial
/// updates (spec §4.1).
#[derive(Debug, Clone, Deserialize, Default)]
pub struct VmUpdateRequest {
    pub hash: String,
    #[serde(default)]
    pub status: Option<i32>,
    #[serde(default)]
    pub f1: Option<f64>,
    #[serde(default)]
    pub f2: Option<f64>,
    #[serde(default)]
    pub f3: Option<f64>,
    #[serde(default)]
    pub analysis_id: Option<i64>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub clean: Option<bool>,
    /// Raw build-tool output, used to derive F1 via
    /// `gi_protocol::fitness::count_diagnostics` when the agent reports
    /// it instead of a precomputed F1.
    #[serde(default)]
    pub build_output: Option<String>,
    #[serde(default)]
    pub num_tests: Option<u32>,
    #[serde(default)]
    pub num_passed: Option<u32>,
    /// True when the build produced no binary artifact (F1 policy, §4.1).
    #[serde(default)]
    pub no_binary: Option<bool>,
}

/// `GET /info/<hash>` response.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateInfo {
    pub hash: String,
    pub status: String,
    pub classification: Option<String>,
    pub f1: Option<f64>,
    pub f2: Option<f64>,
    pub f3: Option<f64>,
    pub fitness: Option<f64>,
    pub analysis_id: Option<i64>,
    pub build_vm: Option<String>,
    pub error_message: Option<String>,
    pub date_added: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// `POST /submit/analysis/<hash>` response.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisSubmitResponse {
    pub analysis_id: i64,
}

/// A `(key, value)` tag as used in `class=com` / `disposition=genome`
/// associations (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Parse a comma-separated `k=v,k2=v2` tag list (SB `submit/sample`, spec §4.2).
    pub fn parse_list(raw: &str) -> Vec<Tag> {
        raw.split(',')
            .filter_map(|pair| {
                let pair = pair.trim();
                if pair.is_empty() {
                    return None;
                }
                let (k, v) = pair.split_once('=')?;
                let k = k.trim();
                let v = v.trim();
                if k.is_empty() {
                    return None;
                }
                Some(Tag::new(k, v))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comma_separated_tags() {
        let tags = Tag::parse_list("class=com, disposition=genome,  bad, empty=");
        assert_eq!(
            tags,
            vec![
                Tag::new("class", "com"),
                Tag::new("disposition", "genome"),
                Tag::new("empty", ""),
            ]
        );
    }

    #[test]
    fn empty_tag_list_is_empty() {
        assert!(Tag::parse_list("").is_empty());
    }
}
