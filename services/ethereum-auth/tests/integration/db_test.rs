use std::collections::HashSet;

use chrono::{Duration, Utc};
use futures::future::join_all;

use tally_ethereum_auth::domain::repository::NonceRepository;
use tally_ethereum_auth::domain::types::NewNonce;
use tally_ethereum_auth::error::NonceError;
use tally_ethereum_auth::infra::db::DbNonceRepository;
use tally_ethereum_auth::usecase::nonce::NonceStore;
use tally_testing::TestDb;

fn store(test_db: &TestDb) -> NonceStore<DbNonceRepository> {
    NonceStore {
        nonces: DbNonceRepository {
            db: test_db.connection().clone(),
        },
    }
}

#[tokio::test]
async fn should_consume_once_against_database() {
    let test_db = TestDb::migrated(tally_migration::catalog()).await;
    let store = store(&test_db);

    let nonce = store.issue(Duration::seconds(60)).await.unwrap();
    let consumed = store.consume(&nonce.value).await.unwrap();
    assert!(consumed.used);
    assert_eq!(consumed.created_at, nonce.created_at);

    let second = store.consume(&nonce.value).await;
    assert!(
        matches!(second, Err(NonceError::AlreadyUsed)),
        "expected AlreadyUsed, got {second:?}"
    );
}

#[tokio::test]
async fn should_reject_nonce_after_ttl_elapses() {
    let test_db = TestDb::migrated(tally_migration::catalog()).await;
    let store = store(&test_db);

    let nonce = store.issue(Duration::seconds(1)).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_secs(2)).await;

    let result = store.consume(&nonce.value).await;
    assert!(
        matches!(result, Err(NonceError::Expired)),
        "expected Expired, got {result:?}"
    );
    let stored = store.inspect(&nonce.value).await.unwrap().unwrap();
    assert!(!stored.used);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn should_let_exactly_one_concurrent_consume_win() {
    let test_db = TestDb::migrated(tally_migration::catalog()).await;
    let store = store(&test_db);
    let nonce = store.issue(Duration::seconds(60)).await.unwrap();

    let results = join_all((0..8).map(|_| store.consume(&nonce.value))).await;

    let wins = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(wins, 1, "expected exactly one success, got {results:?}");
    assert!(
        results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, NonceError::AlreadyUsed)),
        "losers should see AlreadyUsed, got {results:?}"
    );
}

#[tokio::test]
async fn should_report_collision_on_duplicate_value() {
    let test_db = TestDb::migrated(tally_migration::catalog()).await;
    let repo = DbNonceRepository {
        db: test_db.connection().clone(),
    };
    let now = Utc::now();
    let new = NewNonce {
        value: "A".repeat(32),
        created_at: now,
        expires_at: now + Duration::minutes(5),
    };

    repo.insert(&new).await.unwrap();
    let result = repo.insert(&new).await;

    assert!(
        matches!(result, Err(NonceError::Collision)),
        "expected Collision, got {result:?}"
    );
}

#[tokio::test]
async fn should_issue_distinct_values() {
    let test_db = TestDb::migrated(tally_migration::catalog()).await;
    let store = store(&test_db);

    let mut values = HashSet::new();
    for _ in 0..200 {
        values.insert(store.issue(Duration::minutes(5)).await.unwrap().value);
    }

    assert_eq!(values.len(), 200);
}

#[tokio::test]
async fn should_list_recent_nonces_newest_first() {
    let test_db = TestDb::migrated(tally_migration::catalog()).await;
    let store = store(&test_db);

    let mut issued = Vec::new();
    for _ in 0..3 {
        issued.push(store.issue(Duration::minutes(5)).await.unwrap());
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    let listed = store.list(2).await.unwrap();

    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, issued[2].id);
    assert_eq!(listed[1].id, issued[1].id);
}
