//! The Classification Scheduler's tick loop (spec §4.4), ported from
//! `genetic_improvement/monitor.py`'s `main_loop` /
//! `process_completed_analysis`. Distinct from the two HTTP services:
//! one sequential task over `analyzing` Candidates, with the CNN
//! forward pass (here, [`Classifier::classify`]) as the only
//! compute-heavy step (spec §5).

use std::sync::Arc;
use std::time::Duration;

use gi_db::candidates::CandidateUpdate;
use gi_db::models::Candidate;
use gi_db::DbPool;
use gi_protocol::status::{AnalysisStatus, CandidateStatus};
use tracing::{info, warn};

use crate::classifier::Classifier;
use crate::tokenizer::preprocess_report;

pub struct Scheduler {
    pool: DbPool,
    classifier: Arc<dyn Classifier>,
    poll_interval: Duration,
}

impl Scheduler {
    pub fn new(pool: DbPool, classifier: Arc<dyn Classifier>, poll_interval: Duration) -> Self {
        Self { pool, classifier, poll_interval }
    }

    /// Run forever, ticking at `poll_interval` (spec §4.4, §6
    /// `--poll-interval`). Errors within a tick are logged and never
    /// propagate — a bad candidate must not halt the pipeline.
    pub async fn run(self) {
        let mut interval = tokio::time::interval(self.poll_interval);
        loop {
            interval.tick().await;
            if let Err(err) = self.tick().await {
                warn!(%err, "classification scheduler tick failed");
            }
        }
    }

    pub async fn tick(&self) -> anyhow::Result<()> {
        let analyzing = gi_db::candidates::list_analyzing(&self.pool).await?;
        if analyzing.is_empty() {
            return Ok(());
        }

        for candidate in &analyzing {
            if let Err(err) = self.process_candidate(candidate).await {
                warn!(hash = %candidate.hash, %err, "failed to process candidate, leaving it in analyzing");
            }
        }
        Ok(())
    }

    /// Spec §4.4 steps 2-4, one Candidate at a time (spec §7:
    /// "the Classification Scheduler swallows per-candidate errors").
    async fn process_candidate(&self, candidate: &Candidate) -> anyhow::Result<()> {
        let Some(analysis_id) = candidate.analysis_id else {
            return self.fail(candidate, "candidate has no analysis_id").await;
        };

        let Some(analysis) = gi_db::analyses::get_by_id(&self.pool, analysis_id).await? else {
            return self.fail(candidate, &format!("analysis {analysis_id} not found")).await;
        };

        let status = analysis.status().map_err(|e| anyhow::anyhow!(e))?;

        match status {
            AnalysisStatus::Pending | AnalysisStatus::Running => {
                // Not matured yet; revisit on the next tick.
                Ok(())
            }
            AnalysisStatus::Error => {
                info!(hash = %candidate.hash, analysis_id, "analysis errored, finalizing candidate with F3=0");
                self.finish(candidate, CandidateStatus::Complete, 0.0, None).await
            }
            AnalysisStatus::Complete => self.classify_and_finish(candidate, &analysis.report).await,
        }
    }

    async fn classify_and_finish(&self, candidate: &Candidate, report_path: &str) -> anyhow::Result<()> {
        let Some(classification) = candidate.classification.as_deref() else {
            return self.fail(candidate, "no classification found").await;
        };

        let report_text = match tokio::fs::read_to_string(report_path).await {
            Ok(text) => text,
            Err(_) => return self.fail(candidate, &format!("report file not found: {report_path}")).await,
        };

        let tokens = match preprocess_report(&report_text) {
            Ok(tokens) => tokens,
            Err(err) => return self.fail(candidate, &format!("failed to preprocess report: {err}")).await,
        };

        let f3 = match self.classifier.classify(&tokens, classification) {
            Ok(f3) => f3,
            Err(err) => return self.fail(candidate, &format!("classification error: {err}")).await,
        };

        info!(hash = %candidate.hash, classification, f3, "candidate classified");
        self.finish(candidate, CandidateStatus::Complete, f3, None).await
    }

    /// Terminal write shared by every exit path: `classification
    /// written -> complete` or the error paths that still land on
    /// `complete` per spec §4.4 step 2, vs. genuine `error` from
    /// `fail`.
    async fn finish(
        &self,
        candidate: &Candidate,
        status: CandidateStatus,
        f3: f64,
        error_message: Option<&str>,
    ) -> anyhow::Result<()> {
        gi_db::candidates::apply_update(
            &self.pool,
            &candidate.hash,
            CandidateUpdate {
                status: Some(status.as_i32()),
                f3: Some(f3),
                error_message: error_message.map(str::to_string),
                ..Default::default()
            },
        )
        .await?;
        Ok(())
    }

    /// Spec §4.4 step 4 / §7 `ClassificationError`: move the Candidate
    /// to `error` with a descriptive message and F3=0.
    async fn fail(&self, candidate: &Candidate, message: &str) -> anyhow::Result<()> {
        warn!(hash = %candidate.hash, message, "classification error");
        self.finish(candidate, CandidateStatus::Error, 0.0, Some(message)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ClassifyError;

    struct AlwaysErrors;
    impl Classifier for AlwaysErrors {
        fn classify(&self, _tokens: &[String], target: &str) -> Result<f64, ClassifyError> {
            Err(ClassifyError::UnknownClass(target.to_string()))
        }
    }

    struct Fixed(f64);
    impl Classifier for Fixed {
        fn classify(&self, _tokens: &[String], _target: &str) -> Result<f64, ClassifyError> {
            Ok(self.0)
        }
    }

    fn candidate(analysis_id: Option<i64>, classification: Option<&str>) -> Candidate {
        Candidate {
            hash: "h".into(),
            code: "code".into(),
            makefile: None,
            unit_test: None,
            xml: None,
            classification: classification.map(str::to_string),
            status: CandidateStatus::Analyzing.as_i32(),
            f1: Some(1.0),
            f2: Some(1.0),
            f3: None,
            analysis_id,
            build_vm: None,
            error_message: None,
            date_added: chrono::Utc::now(),
            date_updated: chrono::Utc::now(),
        }
    }

    #[test]
    fn classifier_contract_surfaces_unknown_class() {
        let clf = AlwaysErrors;
        assert!(clf.classify(&[], "benign").is_err());
    }

    #[test]
    fn fixed_classifier_returns_configured_probability() {
        let clf = Fixed(0.42);
        assert_eq!(clf.classify(&[], "anything").unwrap(), 0.42);
    }

    #[test]
    fn candidate_without_analysis_id_is_a_malformed_state() {
        let c = candidate(None, Some("benign"));
        assert!(c.analysis_id.is_none());
    }

    #[test]
    fn candidate_without_classification_cannot_classify() {
        let c = candidate(Some(1), None);
        assert!(c.classification.is_none());
    }
}
