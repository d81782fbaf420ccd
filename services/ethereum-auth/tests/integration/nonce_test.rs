use chrono::{Duration, Utc};

use tally_ethereum_auth::domain::types::{NONCE_LEN, NONCE_MAX_LEN, NonceStatus};
use tally_ethereum_auth::error::NonceError;
use tally_ethereum_auth::usecase::nonce::NonceStore;

use crate::helpers::{MockNonceRepo, stored_nonce};

#[tokio::test]
async fn should_issue_unused_nonce_expiring_after_ttl() {
    let repo = MockNonceRepo::empty();
    let handle = repo.nonces_handle();
    let store = NonceStore { nonces: repo };

    let nonce = store.issue(Duration::minutes(5)).await.unwrap();

    assert_eq!(nonce.value.len(), NONCE_LEN);
    assert!(nonce.value.chars().all(|c| c.is_ascii_alphanumeric()));
    assert!(!nonce.used);
    assert_eq!(nonce.expires_at - nonce.created_at, Duration::minutes(5));
    assert!(nonce.is_valid());

    let stored = handle.lock().unwrap();
    assert_eq!(stored.len(), 1, "expected exactly one nonce to be stored");
    assert_eq!(stored[0], nonce);
}

#[tokio::test]
async fn should_consume_once_then_report_already_used() {
    let store = NonceStore {
        nonces: MockNonceRepo::empty(),
    };
    let nonce = store.issue(Duration::seconds(60)).await.unwrap();

    let consumed = store.consume(&nonce.value).await.unwrap();
    assert!(consumed.used);
    assert_eq!(consumed.id, nonce.id);

    let second = store.consume(&nonce.value).await;
    assert!(
        matches!(second, Err(NonceError::AlreadyUsed)),
        "expected AlreadyUsed, got {second:?}"
    );
}

#[tokio::test]
async fn should_return_not_found_for_unknown_value() {
    let store = NonceStore {
        nonces: MockNonceRepo::empty(),
    };

    let result = store.consume("doesnotexist").await;

    assert!(
        matches!(result, Err(NonceError::NotFound)),
        "expected NotFound, got {result:?}"
    );
}

#[tokio::test]
async fn should_report_expired_even_when_already_used() {
    let store = NonceStore {
        nonces: MockNonceRepo::new(vec![
            stored_nonce(1, "stale", Duration::minutes(10), Duration::minutes(5), false),
            stored_nonce(2, "spent", Duration::minutes(10), Duration::minutes(5), true),
        ]),
    };

    for value in ["stale", "spent"] {
        let result = store.consume(value).await;
        assert!(
            matches!(result, Err(NonceError::Expired)),
            "expected Expired for {value}, got {result:?}"
        );
    }
}

#[tokio::test]
async fn should_leave_expired_nonce_unused() {
    let repo = MockNonceRepo::new(vec![stored_nonce(
        1,
        "stale",
        Duration::minutes(10),
        Duration::minutes(5),
        false,
    )]);
    let handle = repo.nonces_handle();
    let store = NonceStore { nonces: repo };

    let _ = store.consume("stale").await;

    assert!(!handle.lock().unwrap()[0].used);
}

#[tokio::test]
async fn should_issue_already_expired_nonce_for_non_positive_ttl() {
    let store = NonceStore {
        nonces: MockNonceRepo::empty(),
    };

    for ttl in [Duration::zero(), Duration::seconds(-30)] {
        let nonce = store.issue(ttl).await.unwrap();
        assert_eq!(nonce.status_at(Utc::now()), NonceStatus::Expired);
        let result = store.consume(&nonce.value).await;
        assert!(
            matches!(result, Err(NonceError::Expired)),
            "expected Expired, got {result:?}"
        );
    }
}

#[tokio::test]
async fn should_inspect_without_consuming() {
    let store = NonceStore {
        nonces: MockNonceRepo::empty(),
    };
    let nonce = store.issue(Duration::seconds(60)).await.unwrap();

    let seen = store.inspect(&nonce.value).await.unwrap().unwrap();
    assert_eq!(seen, nonce);
    assert!(store.inspect("missing").await.unwrap().is_none());

    store.consume(&nonce.value).await.unwrap();
}

#[tokio::test]
async fn should_list_newest_first() {
    let store = NonceStore {
        nonces: MockNonceRepo::new(vec![
            stored_nonce(1, "oldest", Duration::minutes(3), Duration::minutes(5), false),
            stored_nonce(2, "newest", Duration::minutes(1), Duration::minutes(5), false),
            stored_nonce(3, "middle", Duration::minutes(2), Duration::minutes(5), true),
        ]),
    };

    let listed: Vec<String> = store
        .list(2)
        .await
        .unwrap()
        .into_iter()
        .map(|n| n.value)
        .collect();

    assert_eq!(listed, vec!["newest", "middle"]);
}

#[tokio::test]
async fn should_treat_oversized_value_as_unknown() {
    let oversized = "a".repeat(NONCE_MAX_LEN + 1);
    let store = NonceStore {
        nonces: MockNonceRepo::new(vec![stored_nonce(
            1,
            &oversized,
            Duration::zero(),
            Duration::minutes(5),
            false,
        )]),
    };

    let result = store.consume(&oversized).await;

    assert!(
        matches!(result, Err(NonceError::NotFound)),
        "expected NotFound, got {result:?}"
    );
    assert!(store.inspect(&oversized).await.unwrap().is_none());
}
