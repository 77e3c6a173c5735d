mod common;

use common::{fp, harness};
use pairmint::domain::token::TokenStatus;
use pairmint::error::{ApiError, AuthError};

#[tokio::test]
async fn revoke_all_blocks_every_unused_record() {
    let h = harness();
    let device = fp("203.0.113.5", "Mozilla/5.0");

    h.service.issue_pair(9, &device).await.unwrap();
    h.service.issue_pair(9, &device).await.unwrap();
    h.service.issue_pair(10, &device).await.unwrap();

    h.service.revoke_all(9).await.unwrap();

    assert!(h.store.statuses_for_guid(9).iter().all(|s| *s == TokenStatus::Blocked));
    assert!(h.store.statuses_for_guid(10).iter().all(|s| *s == TokenStatus::Unused));
}

#[tokio::test]
async fn revocation_is_idempotent() {
    let h = harness();
    let device = fp("203.0.113.5", "Mozilla/5.0");

    h.service.issue_pair(9, &device).await.unwrap();
    h.service.revoke_all(9).await.unwrap();
    let after_first = h.store.statuses_for_guid(9);

    h.service.revoke_all(9).await.unwrap();
    assert_eq!(h.store.statuses_for_guid(9), after_first);
}

#[tokio::test]
async fn used_records_stay_used_through_revocation() {
    let h = harness();
    let device = fp("203.0.113.5", "Mozilla/5.0");

    let pair = h.service.issue_pair(9, &device).await.unwrap();
    let old_rid = h.store.record_ids()[0];
    h.service
        .rotate(&pair.access_token, &pair.refresh_token, &device)
        .await
        .unwrap();

    h.service.revoke_all(9).await.unwrap();

    assert_eq!(h.store.status_of(old_rid), Some(TokenStatus::Used));
}

#[tokio::test]
async fn identify_returns_the_subject_while_live() {
    let h = harness();
    let device = fp("203.0.113.5", "Mozilla/5.0");

    let pair = h.service.issue_pair(42, &device).await.unwrap();
    assert_eq!(h.service.identify(&pair.access_token).await.unwrap(), 42);
}

#[tokio::test]
async fn revocation_kills_a_still_valid_access_token() {
    let h = harness();
    let device = fp("203.0.113.5", "Mozilla/5.0");

    let pair = h.service.issue_pair(42, &device).await.unwrap();
    h.service.revoke_all(42).await.unwrap();

    let result = h.service.identify(&pair.access_token).await;
    assert!(matches!(result, Err(ApiError::Auth(AuthError::TokenRevoked))));
}

#[tokio::test]
async fn rotation_after_revocation_is_a_replay() {
    let h = harness();
    let device = fp("203.0.113.5", "Mozilla/5.0");

    let pair = h.service.issue_pair(42, &device).await.unwrap();
    h.service.revoke_all(42).await.unwrap();

    let result = h
        .service
        .rotate(&pair.access_token, &pair.refresh_token, &device)
        .await;
    assert!(matches!(result, Err(ApiError::Auth(AuthError::ReplayOrRevoked))));
    // no new issuance came out of the blocked record
    assert_eq!(h.store.record_count(), 1);
}

#[tokio::test]
async fn identify_with_a_foreign_token_is_rejected() {
    let h = harness();
    let result = h.service.identify("bogus.token.here").await;
    assert!(matches!(result, Err(ApiError::Auth(AuthError::InvalidAccessToken))));
}
