//! Tag upsert and association (SUPPLEMENT, spec §3: "many-to-many with
//! `Tag`"), expanded per `SPEC_FULL.md` §8 into real upsert-and-associate
//! operations used by ES `/submit` and SB `/submit/sample`.

use crate::error::Result;
use crate::pool::DbPool;
use gi_protocol::dto::Tag;

async fn upsert_tag(pool: &DbPool, tag: &Tag) -> Result<()> {
    sqlx::query("INSERT INTO tags (key, value) VALUES ($1, $2) ON CONFLICT DO NOTHING")
        .bind(&tag.key)
        .bind(&tag.value)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn associate_candidate(pool: &DbPool, candidate_hash: &str, tag: &Tag) -> Result<()> {
    upsert_tag(pool, tag).await?;
    sqlx::query(
        r#"INSERT INTO candidate_tags (candidate_hash, tag_key, tag_value)
           VALUES ($1, $2, $3) ON CONFLICT DO NOTHING"#,
    )
    .bind(candidate_hash)
    .bind(&tag.key)
    .bind(&tag.value)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn associate_sample(pool: &DbPool, sample_sha256: &str, tag: &Tag) -> Result<()> {
    upsert_tag(pool, tag).await?;
    sqlx::query(
        r#"INSERT INTO sample_tags (sample_sha256, tag_key, tag_value)
           VALUES ($1, $2, $3) ON CONFLICT DO NOTHING"#,
    )
    .bind(sample_sha256)
    .bind(&tag.key)
    .bind(&tag.value)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn for_candidate(pool: &DbPool, candidate_hash: &str) -> Result<Vec<Tag>> {
    let rows: Vec<(String, String)> = sqlx::query_as(
        "SELECT tag_key, tag_value FROM candidate_tags WHERE candidate_hash = $1",
    )
    .bind(candidate_hash)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|(key, value)| Tag { key, value }).collect())
}

pub async fn for_sample(pool: &DbPool, sample_sha256: &str) -> Result<Vec<Tag>> {
    let rows: Vec<(String, String)> = sqlx::query_as(
        "SELECT tag_key, tag_value FROM sample_tags WHERE sample_sha256 = $1",
    )
    .bind(sample_sha256)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|(key, value)| Tag { key, value }).collect())
}
