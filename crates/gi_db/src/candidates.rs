//! Candidate queries: submit/reset, checkin dispatch, partial update and
//! the build-VM watchdog scan (spec §4.1).

use chrono::{DateTime, Duration, Utc};

use crate::error::{DbError, Result};
use crate::models::Candidate;
use crate::pool::DbPool;

/// Insert a brand-new Candidate row, or reset an existing one's mutable
/// fields while leaving associations untouched (spec §4.1 `/submit`,
/// invariant 1). Returns the row after the upsert.
pub async fn submit(
    pool: &DbPool,
    hash: &str,
    code: &str,
    makefile: Option<&str>,
    unit_test: Option<&str>,
    class: Option<&str>,
) -> Result<Candidate> {
    let row = sqlx::query_as::<_, Candidate>(
        r#"
        INSERT INTO candidates (hash, code, makefile, unit_test, classification, status)
        VALUES ($1, $2, $3, $4, $5, 0)
        ON CONFLICT (hash) DO UPDATE SET
            status = 0,
            f1 = NULL,
            f2 = NULL,
            f3 = NULL,
            analysis_id = NULL,
            build_vm = NULL,
            error_message = NULL,
            classification = COALESCE(EXCLUDED.classification, candidates.classification),
            date_updated = now()
        RETURNING *
        "#,
    )
    .bind(hash)
    .bind(code)
    .bind(makefile)
    .bind(unit_test)
    .bind(class)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// `GET /vm/checkin`: atomically claim one `pending` Candidate, FIFO by
/// `date_added` with `hash` as a deterministic tiebreak (spec §4.1).
/// Uses `FOR UPDATE SKIP LOCKED` inside a transaction so two concurrent
/// callers never receive the same row (spec §5 linearizability).
pub async fn claim_pending(pool: &DbPool, build_vm: &str) -> Result<Option<Candidate>> {
    let mut tx = pool.begin().await?;

    let hash: Option<String> = sqlx::query_scalar(
        r#"
        SELECT hash FROM candidates
        WHERE status = 0
        ORDER BY date_added ASC, hash ASC
        LIMIT 1
        FOR UPDATE SKIP LOCKED
        "#,
    )
    .fetch_optional(&mut *tx)
    .await?;

    let Some(hash) = hash else {
        tx.commit().await?;
        return Ok(None);
    };

    let row = sqlx::query_as::<_, Candidate>(
        r#"
        UPDATE candidates
        SET status = 1, build_vm = $2, date_updated = now()
        WHERE hash = $1
        RETURNING *
        "#,
    )
    .bind(&hash)
    .bind(build_vm)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(Some(row))
}

pub async fn get_by_hash(pool: &DbPool, hash: &str) -> Result<Option<Candidate>> {
    let row = sqlx::query_as::<_, Candidate>("SELECT * FROM candidates WHERE hash = $1")
        .bind(hash)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Partial field update applied after the caller has validated the
/// state-machine transition (spec §9: "all transitions routed through
/// one guarded function", implemented in the service layer; this query
/// is the mechanism that function calls into).
#[derive(Debug, Default)]
pub struct CandidateUpdate {
    pub status: Option<i32>,
    pub f1: Option<f64>,
    pub f2: Option<f64>,
    pub f3: Option<f64>,
    pub analysis_id: Option<i64>,
    pub error_message: Option<String>,
}

pub async fn apply_update(pool: &DbPool, hash: &str, update: CandidateUpdate) -> Result<Candidate> {
    let row = sqlx::query_as::<_, Candidate>(
        r#"
        UPDATE candidates
        SET status = COALESCE($2, status),
            f1 = COALESCE($3, f1),
            f2 = COALESCE($4, f2),
            f3 = COALESCE($5, f3),
            analysis_id = COALESCE($6, analysis_id),
            error_message = COALESCE($7, error_message),
            date_updated = now()
        WHERE hash = $1
        RETURNING *
        "#,
    )
    .bind(hash)
    .bind(update.status)
    .bind(update.f1)
    .bind(update.f2)
    .bind(update.f3)
    .bind(update.analysis_id)
    .bind(update.error_message)
    .fetch_optional(pool)
    .await?;

    row.ok_or_else(|| DbError::NotFound(format!("candidate {hash}")))
}

/// Reset a Candidate to `pending` regardless of current status (spec
/// §4.1 `/reanalyze`): fitnesses go null so every stage recomputes.
pub async fn reanalyze(pool: &DbPool, hash: &str) -> Result<Candidate> {
    let row = sqlx::query_as::<_, Candidate>(
        r#"
        UPDATE candidates
        SET status = 0, f1 = NULL, f2 = NULL, f3 = NULL,
            analysis_id = NULL, build_vm = NULL, error_message = NULL,
            date_updated = now()
        WHERE hash = $1
        RETURNING *
        "#,
    )
    .bind(hash)
    .fetch_optional(pool)
    .await?;

    row.ok_or_else(|| DbError::NotFound(format!("candidate {hash}")))
}

/// Candidates whose `building` row has gone stale (spec §4.1 watchdog,
/// §4.3 "takes `date_updated` from the running row as its keepalive").
pub async fn find_stale_building(pool: &DbPool, timeout: std::time::Duration) -> Result<Vec<Candidate>> {
    let cutoff: DateTime<Utc> = Utc::now() - Duration::from_std(timeout).unwrap_or(Duration::zero());
    let rows = sqlx::query_as::<_, Candidate>(
        "SELECT * FROM candidates WHERE status = 1 AND date_updated < $1",
    )
    .bind(cutoff)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Candidates currently in `analyzing`, polled by the Classification
/// Scheduler each tick (spec §4.4).
pub async fn list_analyzing(pool: &DbPool) -> Result<Vec<Candidate>> {
    let rows = sqlx::query_as::<_, Candidate>(
        "SELECT * FROM candidates WHERE status = 2 ORDER BY date_added ASC",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Candidates left `building`/`analyzing` from a previous crash (spec
/// §4.3 fleet init: "Reset any Analysis/Candidate found in non-terminal
/// running state at startup to pending").
pub async fn reset_non_terminal(pool: &DbPool) -> Result<u64> {
    let result = sqlx::query(
        r#"UPDATE candidates SET status = 0, build_vm = NULL, date_updated = now()
           WHERE status IN (1, 2)"#,
    )
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

/// Associate a Candidate with a Sample (many-to-many, spec §3), set
/// when `analysis_id` links the build output into SB.
pub async fn associate_sample(pool: &DbPool, candidate_hash: &str, sample_sha256: &str) -> Result<()> {
    sqlx::query(
        r#"INSERT INTO candidate_samples (candidate_hash, sample_sha256)
           VALUES ($1, $2) ON CONFLICT DO NOTHING"#,
    )
    .bind(candidate_hash)
    .bind(sample_sha256)
    .execute(pool)
    .await?;
    Ok(())
}
