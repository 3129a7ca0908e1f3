//! Analysis queries: creation from a submitted sample, checkin
//! dispatch, and the report/error terminal writes (spec §4.2).

use chrono::{DateTime, Duration, Utc};

use crate::error::{DbError, Result};
use crate::models::Analysis;
use crate::pool::DbPool;

/// `POST /submit/analysis/<hash>`: create a `pending` Analysis bound to
/// a Sample, with its report path precomputed (spec §4.2).
pub async fn create(pool: &DbPool, sample_sha256: &str, report: &str) -> Result<Analysis> {
    let row = sqlx::query_as::<_, Analysis>(
        r#"
        INSERT INTO analyses (sample_sha256, report, status)
        VALUES ($1, $2, 0)
        RETURNING *
        "#,
    )
    .bind(sample_sha256)
    .bind(report)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// `GET /vm/checkin` (Analysis VM pool): claim one `pending` Analysis,
/// FIFO by `date_added`, under `FOR UPDATE SKIP LOCKED` (spec §4.2,
/// §5 linearizability, mirroring `candidates::claim_pending`).
pub async fn claim_pending(pool: &DbPool, analysis_vm: &str) -> Result<Option<Analysis>> {
    let mut tx = pool.begin().await?;

    let id: Option<i64> = sqlx::query_scalar(
        r#"
        SELECT id FROM analyses
        WHERE status = 0
        ORDER BY date_added ASC, id ASC
        LIMIT 1
        FOR UPDATE SKIP LOCKED
        "#,
    )
    .fetch_optional(&mut *tx)
    .await?;

    let Some(id) = id else {
        tx.commit().await?;
        return Ok(None);
    };

    let row = sqlx::query_as::<_, Analysis>(
        r#"
        UPDATE analyses
        SET status = 1, analysis_vm = $2, date_updated = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(analysis_vm)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(Some(row))
}

pub async fn get_by_id(pool: &DbPool, id: i64) -> Result<Option<Analysis>> {
    let row = sqlx::query_as::<_, Analysis>("SELECT * FROM analyses WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Terminal write: `running -> complete` on `vm/submit/report`, or
/// `running -> error` on `vm/submit/error` (spec §4.2 ordering
/// guarantees). The caller has already validated that `id` is the row
/// currently bound to the calling VM.
pub async fn finish(pool: &DbPool, id: i64, status: i32, error_message: Option<&str>) -> Result<Analysis> {
    let row = sqlx::query_as::<_, Analysis>(
        r#"
        UPDATE analyses
        SET status = $2, error_message = COALESCE($3, error_message), date_updated = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(status)
    .bind(error_message)
    .fetch_optional(pool)
    .await?;

    row.ok_or_else(|| DbError::NotFound(format!("analysis {id}")))
}

/// Analyses whose `running` row has gone stale (SB watchdog, spec §4.3).
pub async fn find_stale_running(pool: &DbPool, timeout: std::time::Duration) -> Result<Vec<Analysis>> {
    let cutoff: DateTime<Utc> = Utc::now() - Duration::from_std(timeout).unwrap_or(Duration::zero());
    let rows = sqlx::query_as::<_, Analysis>("SELECT * FROM analyses WHERE status = 1 AND date_updated < $1")
        .bind(cutoff)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Reset Analyses stuck `running` from a previous crash back to
/// `pending` (SUPPLEMENT: ported from `sandbox_server.py`'s `init_db`,
/// folded into SB's fleet init alongside the Candidate reset).
pub async fn reset_non_terminal(pool: &DbPool) -> Result<u64> {
    let result = sqlx::query(
        r#"UPDATE analyses SET status = 0, analysis_vm = NULL, date_updated = now() WHERE status = 1"#,
    )
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}
