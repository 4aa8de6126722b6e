mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use mobile_core::credentials::{CredentialStore, MemoryStore, REFRESH_TOKEN_KEY};
use mobile_core::error::ClientError;
use mobile_core::Client;

#[tokio::test]
async fn login_returns_user_and_persists_tokens() {
    let (addr, _backend) = common::start_backend().await;
    let client = common::test_client(addr);

    let user = common::log_in(&client).await;
    assert_eq!(user.id, 1);
    assert_eq!(user.email, "kate@site.example");

    assert!(client.session.has_session().await.unwrap());
    assert_eq!(
        client.session.access_token().await.unwrap().as_deref(),
        Some("A1")
    );
    assert_eq!(
        client.session.refresh_token().await.unwrap().as_deref(),
        Some("R1")
    );
}

#[tokio::test]
async fn request_with_valid_token_needs_no_refresh() {
    let (addr, backend) = common::start_backend().await;
    let client = common::test_client(addr);
    common::log_in(&client).await;

    *backend.objects.lock().unwrap() = vec![common::site_json(1, "North Depot")];

    let sites = client.api.objects().await.expect("objects");
    assert_eq!(sites.len(), 1);
    assert_eq!(sites[0].title, "North Depot");

    assert_eq!(backend.data_hits.load(Ordering::SeqCst), 1);
    assert_eq!(backend.refresh_hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn rejected_request_refreshes_once_and_retries() {
    let (addr, backend) = common::start_backend().await;
    let client = common::test_client(addr);
    common::log_in(&client).await;

    // The backend stops accepting A1; the refresh issues A2.
    backend.expire_access();

    let sites = client.api.objects().await.expect("objects after refresh");
    assert!(sites.is_empty());

    // One rejected attempt, one refresh, one retried attempt.
    assert_eq!(backend.data_hits.load(Ordering::SeqCst), 2);
    assert_eq!(backend.refresh_hits.load(Ordering::SeqCst), 1);
    assert_eq!(
        client.session.access_token().await.unwrap().as_deref(),
        Some("A2")
    );
    assert_eq!(
        client.session.refresh_token().await.unwrap().as_deref(),
        Some("R1")
    );
}

#[tokio::test]
async fn concurrent_rejections_share_one_refresh() {
    let (addr, backend) = common::start_backend().await;
    let client = common::test_client(addr);
    common::log_in(&client).await;

    backend.expire_access();

    let (first, second) = tokio::join!(client.api.objects(), client.api.objects());
    first.expect("first request");
    second.expect("second request");

    assert_eq!(backend.refresh_hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn second_rejection_surfaces_without_looping() {
    let (addr, backend) = common::start_backend().await;
    let client = common::test_client(addr);
    common::log_in(&client).await;

    // Even a freshly refreshed token is rejected.
    backend.always_reject_data.store(true, Ordering::SeqCst);

    let err = client.api.objects().await.expect_err("should be rejected");
    assert!(matches!(err, ClientError::Api { status: 403, .. }));

    // Exactly two attempts and one refresh; no retry loop.
    assert_eq!(backend.data_hits.load(Ordering::SeqCst), 2);
    assert_eq!(backend.refresh_hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failed_refresh_is_terminal() {
    let (addr, backend) = common::start_backend().await;
    let client = common::test_client(addr);
    common::log_in(&client).await;

    backend.expire_access();
    backend.allow_refresh.store(false, Ordering::SeqCst);

    let err = client.api.objects().await.expect_err("should expire");
    assert!(matches!(err, ClientError::SessionExpired));

    assert_eq!(backend.refresh_hits.load(Ordering::SeqCst), 1);
    // No retry happened after the failed refresh.
    assert_eq!(backend.data_hits.load(Ordering::SeqCst), 1);
    // Stored credentials are left as they were; logging out is the shell's
    // decision, not the wrapper's.
    assert_eq!(
        client.session.access_token().await.unwrap().as_deref(),
        Some("A1")
    );
}

#[tokio::test]
async fn rejection_without_stored_refresh_token_expires_the_session() {
    let (addr, backend) = common::start_backend().await;
    let store = Arc::new(MemoryStore::new());
    let client = Client::new(common::test_config(addr), store.clone()).expect("build client");
    common::log_in(&client).await;

    // The keystore lost the refresh token; the next rejection has nothing
    // to recover with.
    backend.expire_access();
    store.remove(REFRESH_TOKEN_KEY).await.unwrap();

    let err = client.api.objects().await.expect_err("should expire");
    assert!(matches!(err, ClientError::SessionExpired));

    // One rejected attempt; the refresh endpoint was never called.
    assert_eq!(backend.data_hits.load(Ordering::SeqCst), 1);
    assert_eq!(backend.refresh_hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn server_error_passes_through_without_refresh() {
    let (addr, backend) = common::start_backend().await;
    let client = common::test_client(addr);
    common::log_in(&client).await;

    backend.fail_data.store(true, Ordering::SeqCst);

    let err = client.api.objects().await.expect_err("should fail");
    assert!(matches!(err, ClientError::Api { status: 500, .. }));

    assert_eq!(backend.refresh_hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn request_without_session_fails_fast() {
    let (addr, backend) = common::start_backend().await;
    let client = common::test_client(addr);

    let err = client.api.objects().await.expect_err("no session");
    assert!(matches!(err, ClientError::Unauthenticated));

    // Nothing went over the wire.
    assert_eq!(backend.data_hits.load(Ordering::SeqCst), 0);
    assert_eq!(backend.refresh_hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn rotated_refresh_token_is_persisted() {
    let (addr, backend) = common::start_backend().await;
    let client = common::test_client(addr);
    common::log_in(&client).await;

    backend.expire_access();
    backend.rotate_refresh.store(true, Ordering::SeqCst);

    client.api.objects().await.expect("objects after refresh");

    assert_eq!(
        client.session.access_token().await.unwrap().as_deref(),
        Some("A2")
    );
    assert_eq!(
        client.session.refresh_token().await.unwrap().as_deref(),
        Some("R2")
    );
}
