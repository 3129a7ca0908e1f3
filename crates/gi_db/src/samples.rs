//! Sample queries: upsert-by-sha256 and lookup by any of the six
//! supported hash kinds (spec §4.2).

use gi_crypto::hashes::{HashKind, SampleHashes};

use crate::error::Result;
use crate::models::Sample;
use crate::pool::DbPool;

/// Upsert keyed on `sha256` (spec §4.2: "Upsert Sample keyed on
/// sha256"). Re-uploading the same content is a safe no-op per §5's
/// "concurrent uploads of the same sha256 are safely de-duped".
pub async fn upsert(pool: &DbPool, hashes: &SampleHashes, filepath: &str) -> Result<Sample> {
    let row = sqlx::query_as::<_, Sample>(
        r#"
        INSERT INTO samples (sha256, md5, sha1, sha224, sha384, sha512, filepath)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (sha256) DO UPDATE SET filepath = EXCLUDED.filepath
        RETURNING *
        "#,
    )
    .bind(&hashes.sha256)
    .bind(&hashes.md5)
    .bind(&hashes.sha1)
    .bind(&hashes.sha224)
    .bind(&hashes.sha384)
    .bind(&hashes.sha512)
    .bind(filepath)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn get_by_sha256(pool: &DbPool, sha256: &str) -> Result<Option<Sample>> {
    let row = sqlx::query_as::<_, Sample>("SELECT * FROM samples WHERE sha256 = $1")
        .bind(sha256)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Resolve a hex digest of unknown kind to its Sample, inferring the
/// algorithm from the string's length (spec §4.2 `/submit/analysis/<hash>`).
pub async fn find_by_any_hash(pool: &DbPool, hex_hash: &str) -> Result<Option<Sample>> {
    let Some(kind) = HashKind::from_hex_len(hex_hash.len()) else {
        return Ok(None);
    };

    let column = match kind {
        HashKind::Md5 => "md5",
        HashKind::Sha1 => "sha1",
        HashKind::Sha256 => "sha256",
        HashKind::Sha224 => "sha224",
        HashKind::Sha384 => "sha384",
        HashKind::Sha512 => "sha512",
    };

    let query = format!("SELECT * FROM samples WHERE {column} = $1");
    let row = sqlx::query_as::<_, Sample>(&query)
        .bind(hex_hash)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}
