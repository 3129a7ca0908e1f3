//! End-to-end scheduler scenarios against a real Postgres instance
//! (spec §8), mirroring `gi_db`'s ephemeral-database test style.

use std::sync::Arc;
use std::time::Duration;

use gi_classifier::{ClassifyError, Classifier, Scheduler};
use gi_db::candidates::{self, CandidateUpdate};
use gi_db::schema::ensure_schema;
use gi_db::{analyses, DbPool};
use gi_protocol::status::{AnalysisStatus, CandidateStatus};
use sqlx::PgPool;

struct Fixed(f64);
impl Classifier for Fixed {
    fn classify(&self, _tokens: &[String], _target_class: &str) -> Result<f64, ClassifyError> {
        Ok(self.0)
    }
}

async fn insert_sample(pool: &DbPool, sha256: &str) {
    sqlx::query(
        r#"INSERT INTO samples (sha256, md5, sha1, sha224, sha384, sha512, filepath)
           VALUES ($1, 'm', 's1', 's224', 's384', 's512', '/tmp/irrelevant')"#,
    )
    .bind(sha256)
    .execute(pool)
    .await
    .unwrap();
}

#[sqlx::test]
async fn errored_analysis_finalizes_candidate_with_zero_f3(pool: PgPool) {
    ensure_schema(&pool).await.unwrap();
    insert_sample(&pool, "sha-err").await;

    let analysis = analyses::create(&pool, "sha-err", "/tmp/unused-report.json").await.unwrap();
    analyses::finish(&pool, analysis.id, AnalysisStatus::Error.as_i32(), Some("sandbox timed out"))
        .await
        .unwrap();

    candidates::submit(&pool, "cand-err", "code", None, None, Some("benign")).await.unwrap();
    candidates::apply_update(
        &pool,
        "cand-err",
        CandidateUpdate {
            status: Some(CandidateStatus::Analyzing.as_i32()),
            analysis_id: Some(analysis.id),
            f1: Some(0.8),
            f2: Some(0.5),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let classifier: Arc<dyn Classifier> = Arc::new(Fixed(0.9));
    let scheduler = Scheduler::new(pool.clone(), classifier, Duration::from_secs(1));
    scheduler.tick().await.unwrap();

    let after = candidates::get_by_hash(&pool, "cand-err").await.unwrap().unwrap();
    assert_eq!(after.status().unwrap(), CandidateStatus::Complete);
    assert_eq!(after.f3, Some(0.0));
    assert_eq!(after.f1, Some(0.8), "F1 must survive the F3 finalization untouched");
}

#[sqlx::test]
async fn completed_analysis_with_report_yields_classified_f3(pool: PgPool) {
    ensure_schema(&pool).await.unwrap();
    insert_sample(&pool, "sha-ok").await;

    let report_dir = tempdir();
    let report_path = report_dir.join("report.json");
    std::fs::write(
        &report_path,
        r#"{"dynamic": [{"Operation": "CreateFile", "Path": "C:\\x", "Result": "SUCCESS"}]}"#,
    )
    .unwrap();

    let analysis = analyses::create(&pool, "sha-ok", report_path.to_str().unwrap()).await.unwrap();
    analyses::finish(&pool, analysis.id, AnalysisStatus::Complete.as_i32(), None).await.unwrap();

    candidates::submit(&pool, "cand-ok", "code", None, None, Some("benign")).await.unwrap();
    candidates::apply_update(
        &pool,
        "cand-ok",
        CandidateUpdate {
            status: Some(CandidateStatus::Analyzing.as_i32()),
            analysis_id: Some(analysis.id),
            f1: Some(1.0),
            f2: Some(1.0),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let classifier: Arc<dyn Classifier> = Arc::new(Fixed(0.73));
    let scheduler = Scheduler::new(pool.clone(), classifier, Duration::from_secs(1));
    scheduler.tick().await.unwrap();

    let after = candidates::get_by_hash(&pool, "cand-ok").await.unwrap().unwrap();
    assert_eq!(after.status().unwrap(), CandidateStatus::Complete);
    assert_eq!(after.f3, Some(0.73));
}

#[sqlx::test]
async fn missing_report_file_moves_candidate_to_error(pool: PgPool) {
    ensure_schema(&pool).await.unwrap();
    insert_sample(&pool, "sha-missing").await;

    let analysis = analyses::create(&pool, "sha-missing", "/nonexistent/report.json").await.unwrap();
    analyses::finish(&pool, analysis.id, AnalysisStatus::Complete.as_i32(), None).await.unwrap();

    candidates::submit(&pool, "cand-missing", "code", None, None, Some("benign")).await.unwrap();
    candidates::apply_update(
        &pool,
        "cand-missing",
        CandidateUpdate {
            status: Some(CandidateStatus::Analyzing.as_i32()),
            analysis_id: Some(analysis.id),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let classifier: Arc<dyn Classifier> = Arc::new(Fixed(0.5));
    let scheduler = Scheduler::new(pool.clone(), classifier, Duration::from_secs(1));
    scheduler.tick().await.unwrap();

    let after = candidates::get_by_hash(&pool, "cand-missing").await.unwrap().unwrap();
    assert_eq!(after.status().unwrap(), CandidateStatus::Error);
    assert_eq!(after.f3, Some(0.0));
    assert!(after.error_message.unwrap().contains("report file not found"));
}

#[sqlx::test]
async fn still_running_analysis_is_left_untouched(pool: PgPool) {
    ensure_schema(&pool).await.unwrap();
    insert_sample(&pool, "sha-running").await;

    let analysis = analyses::create(&pool, "sha-running", "/tmp/unused.json").await.unwrap();
    analyses::claim_pending(&pool, "analysis-vm-1").await.unwrap();

    candidates::submit(&pool, "cand-running", "code", None, None, Some("benign")).await.unwrap();
    candidates::apply_update(
        &pool,
        "cand-running",
        CandidateUpdate {
            status: Some(CandidateStatus::Analyzing.as_i32()),
            analysis_id: Some(analysis.id),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let classifier: Arc<dyn Classifier> = Arc::new(Fixed(0.5));
    let scheduler = Scheduler::new(pool.clone(), classifier, Duration::from_secs(1));
    scheduler.tick().await.unwrap();

    let after = candidates::get_by_hash(&pool, "cand-running").await.unwrap().unwrap();
    assert_eq!(after.status().unwrap(), CandidateStatus::Analyzing, "must wait for the analysis to mature");
    assert!(after.f3.is_none());
}

fn tempdir() -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("gi_classifier_test_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
