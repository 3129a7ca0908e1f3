//! Integration tests against a real Postgres instance, following the
//! corpus's ephemeral-database test style (`casparian_test_utils`'s
//! `TestPgPool`) but using `sqlx::test` to provision one database per
//! test. Requires `DATABASE_URL` to point at a reachable Postgres
//! server; skipped otherwise by `sqlx::test`'s own harness.

use gi_db::candidates::{self, CandidateUpdate};
use gi_db::schema::ensure_schema;
use sqlx::PgPool;

#[sqlx::test]
async fn submit_then_checkin_is_exclusive(pool: PgPool) {
    ensure_schema(&pool).await.unwrap();

    let c = candidates::submit(&pool, "hash-a", "aW50IG1haW4oKSB7fQ==", None, None, Some("benign"))
        .await
        .unwrap();
    assert_eq!(c.status, 0);
    assert_eq!(c.classification.as_deref(), Some("benign"));

    let claimed = candidates::claim_pending(&pool, "vm-1").await.unwrap().unwrap();
    assert_eq!(claimed.hash, "hash-a");
    assert_eq!(claimed.status, 1);
    assert_eq!(claimed.build_vm.as_deref(), Some("vm-1"));

    // No more pending work left.
    assert!(candidates::claim_pending(&pool, "vm-2").await.unwrap().is_none());
}

#[sqlx::test]
async fn concurrent_checkins_never_double_claim(pool: PgPool) {
    ensure_schema(&pool).await.unwrap();
    candidates::submit(&pool, "only-one", "code", None, None, None)
        .await
        .unwrap();

    let (a, b) = tokio::join!(
        candidates::claim_pending(&pool, "vm-a"),
        candidates::claim_pending(&pool, "vm-b"),
    );
    let a = a.unwrap();
    let b = b.unwrap();

    let claimed_count = [a.is_some(), b.is_some()].iter().filter(|x| **x).count();
    assert_eq!(claimed_count, 1, "exactly one VM should receive the Candidate");
}

#[sqlx::test]
async fn resubmit_resets_mutable_fields(pool: PgPool) {
    ensure_schema(&pool).await.unwrap();
    candidates::submit(&pool, "h", "code", None, None, None).await.unwrap();
    candidates::claim_pending(&pool, "vm-1").await.unwrap();
    candidates::apply_update(
        &pool,
        "h",
        CandidateUpdate {
            status: Some(3),
            f1: Some(1.0),
            f2: Some(1.0),
            f3: Some(0.9),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let resubmitted = candidates::submit(&pool, "h", "code", None, None, None).await.unwrap();
    assert_eq!(resubmitted.status, 0);
    assert!(resubmitted.f1.is_none());
    assert!(resubmitted.f2.is_none());
    assert!(resubmitted.f3.is_none());
    assert!(resubmitted.build_vm.is_none());
}

#[sqlx::test]
async fn watchdog_finds_only_stale_building_rows(pool: PgPool) {
    ensure_schema(&pool).await.unwrap();
    candidates::submit(&pool, "fresh", "code", None, None, None).await.unwrap();
    candidates::claim_pending(&pool, "vm-1").await.unwrap();

    // date_updated was just set to now(), so a zero-duration timeout
    // already counts it as stale but a 1-hour timeout does not.
    let stale = candidates::find_stale_building(&pool, std::time::Duration::from_secs(3600))
        .await
        .unwrap();
    assert!(stale.is_empty());
}
