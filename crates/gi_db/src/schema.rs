//! `CREATE TABLE IF NOT EXISTS` schema for every table the core owns
//! (spec §3). Single source of truth, mirroring the corpus's
//! `casparian_db::schema::ensure_schema` layout: one function per
//! logical table group, all run from one entry point at startup.

use crate::error::Result;
use crate::pool::DbPool;

pub async fn ensure_schema(pool: &DbPool) -> Result<()> {
    create_candidate_tables(pool).await?;
    create_sandbox_tables(pool).await?;
    create_tag_tables(pool).await?;
    Ok(())
}

async fn create_candidate_tables(pool: &DbPool) -> Result<()> {
    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS candidates (
            hash TEXT PRIMARY KEY,
            code TEXT NOT NULL,
            makefile TEXT,
            unit_test TEXT,
            xml TEXT,
            classification TEXT,
            status INTEGER NOT NULL DEFAULT 0,
            f1 DOUBLE PRECISION,
            f2 DOUBLE PRECISION,
            f3 DOUBLE PRECISION,
            analysis_id BIGINT,
            build_vm TEXT,
            error_message TEXT,
            date_added TIMESTAMPTZ NOT NULL DEFAULT now(),
            date_updated TIMESTAMPTZ NOT NULL DEFAULT now()
        )"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"CREATE INDEX IF NOT EXISTS candidates_status_idx
           ON candidates (status, date_added, hash)"#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_sandbox_tables(pool: &DbPool) -> Result<()> {
    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS samples (
            sha256 TEXT PRIMARY KEY,
            md5 TEXT NOT NULL,
            sha1 TEXT NOT NULL,
            sha224 TEXT NOT NULL,
            sha384 TEXT NOT NULL,
            sha512 TEXT NOT NULL,
            filepath TEXT NOT NULL,
            date_added TIMESTAMPTZ NOT NULL DEFAULT now()
        )"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS analyses (
            id BIGSERIAL PRIMARY KEY,
            sample_sha256 TEXT NOT NULL REFERENCES samples(sha256),
            report TEXT NOT NULL,
            status INTEGER NOT NULL DEFAULT 0,
            analysis_vm TEXT,
            error_message TEXT,
            date_added TIMESTAMPTZ NOT NULL DEFAULT now(),
            date_updated TIMESTAMPTZ NOT NULL DEFAULT now()
        )"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"CREATE INDEX IF NOT EXISTS analyses_status_idx
           ON analyses (status, date_added, id)"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS candidate_samples (
            candidate_hash TEXT NOT NULL REFERENCES candidates(hash),
            sample_sha256 TEXT NOT NULL REFERENCES samples(sha256),
            PRIMARY KEY (candidate_hash, sample_sha256)
        )"#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_tag_tables(pool: &DbPool) -> Result<()> {
    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS tags (
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            PRIMARY KEY (key, value)
        )"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS candidate_tags (
            candidate_hash TEXT NOT NULL REFERENCES candidates(hash),
            tag_key TEXT NOT NULL,
            tag_value TEXT NOT NULL,
            PRIMARY KEY (candidate_hash, tag_key, tag_value),
            FOREIGN KEY (tag_key, tag_value) REFERENCES tags(key, value)
        )"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS sample_tags (
            sample_sha256 TEXT NOT NULL REFERENCES samples(sha256),
            tag_key TEXT NOT NULL,
            tag_value TEXT NOT NULL,
            PRIMARY KEY (sample_sha256, tag_key, tag_value),
            FOREIGN KEY (tag_key, tag_value) REFERENCES tags(key, value)
        )"#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
