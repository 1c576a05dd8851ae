mod common;

use std::collections::HashMap;

use common::{FixedClock, MockServer, MockState, NOW, open_session, session};
use jammming::{
    error::Error,
    management::CredentialStore,
    types::{CallbackParams, PendingAuthorization, SessionState},
};
use reqwest::Url;
use serde_json::json;

// Decodes an `application/x-www-form-urlencoded` request body
fn form(body: &str) -> HashMap<String, String> {
    Url::parse(&format!("http://localhost/?{body}"))
        .unwrap()
        .query_pairs()
        .into_owned()
        .collect()
}

fn params(code: Option<&str>, state: Option<&str>, error: Option<&str>) -> CallbackParams {
    CallbackParams {
        code: code.map(str::to_string),
        state: state.map(str::to_string),
        error: error.map(str::to_string),
    }
}

#[tokio::test]
async fn test_ensure_token_without_session_is_unauthenticated() {
    let server = MockServer::start(MockState::default()).await;
    let dir = tempfile::tempdir().unwrap();
    let mut manager = open_session(&server.config(dir.path()), None, FixedClock::new(NOW)).await;

    assert!(matches!(
        manager.ensure_token().await,
        Err(Error::Unauthenticated)
    ));
    assert_eq!(manager.state().await.unwrap(), SessionState::NoSession);
    assert!(server.requests().is_empty());
}

#[tokio::test]
async fn test_ensure_token_is_idempotent_while_valid() {
    let server = MockServer::start(MockState::default()).await;
    let dir = tempfile::tempdir().unwrap();
    let mut manager = open_session(
        &server.config(dir.path()),
        Some(session("valid-token", Some("refresh-1"), NOW + 3600)),
        FixedClock::new(NOW),
    )
    .await;

    assert_eq!(manager.ensure_token().await.unwrap(), "valid-token");
    assert_eq!(manager.ensure_token().await.unwrap(), "valid-token");
    assert_eq!(manager.state().await.unwrap(), SessionState::Authorized);

    // No network traffic at all
    assert!(server.requests().is_empty());
}

#[tokio::test]
async fn test_token_with_61_seconds_left_is_used() {
    let server = MockServer::start(MockState::default()).await;
    let dir = tempfile::tempdir().unwrap();
    let mut manager = open_session(
        &server.config(dir.path()),
        Some(session("valid-token", Some("refresh-1"), NOW + 61)),
        FixedClock::new(NOW),
    )
    .await;

    assert_eq!(manager.ensure_token().await.unwrap(), "valid-token");
    assert!(server.token_requests().is_empty());
}

#[tokio::test]
async fn test_token_with_60_seconds_left_is_refreshed() {
    let server = MockServer::start(MockState::default()).await;
    let dir = tempfile::tempdir().unwrap();
    let mut manager = open_session(
        &server.config(dir.path()),
        Some(session("old-token", Some("refresh-1"), NOW + 60)),
        FixedClock::new(NOW),
    )
    .await;

    assert_eq!(manager.state().await.unwrap(), SessionState::Expired);
    assert_eq!(manager.ensure_token().await.unwrap(), "fresh-token");

    let requests = server.token_requests();
    assert_eq!(requests.len(), 1);
    let body = form(&requests[0].body);
    assert_eq!(body["grant_type"], "refresh_token");
    assert_eq!(body["refresh_token"], "refresh-1");
    assert_eq!(body["client_id"], "client-123");
}

#[tokio::test]
async fn test_token_with_59_seconds_left_is_refreshed() {
    let server = MockServer::start(MockState::default()).await;
    let dir = tempfile::tempdir().unwrap();
    let mut manager = open_session(
        &server.config(dir.path()),
        Some(session("old-token", Some("refresh-1"), NOW + 59)),
        FixedClock::new(NOW),
    )
    .await;

    assert_eq!(manager.ensure_token().await.unwrap(), "fresh-token");
    assert_eq!(server.token_requests().len(), 1);
}

#[tokio::test]
async fn test_clock_moving_past_margin_triggers_refresh() {
    let server = MockServer::start(MockState::default()).await;
    let dir = tempfile::tempdir().unwrap();
    let clock = FixedClock::new(NOW);
    let mut manager = open_session(
        &server.config(dir.path()),
        Some(session("valid-token", Some("refresh-1"), NOW + 3600)),
        clock.clone(),
    )
    .await;

    assert_eq!(manager.ensure_token().await.unwrap(), "valid-token");

    clock.set(NOW + 3540);
    assert_eq!(manager.ensure_token().await.unwrap(), "fresh-token");

    // The renewed session is persisted with the rotated refresh token
    let stored = CredentialStore::new(dir.path().to_path_buf())
        .load(NOW + 3540)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.access_token, "fresh-token");
    assert_eq!(stored.refresh_token.as_deref(), Some("fresh-refresh"));
    assert_eq!(stored.expires_at, NOW + 3540 + 3600);
}

#[tokio::test]
async fn test_refresh_keeps_previous_refresh_token_when_none_returned() {
    let mut state = MockState::default();
    state.token_responses.push_back((
        200,
        json!({ "access_token": "fresh-token", "expires_in": 3600 }).to_string(),
    ));
    let server = MockServer::start(state).await;
    let dir = tempfile::tempdir().unwrap();
    let mut manager = open_session(
        &server.config(dir.path()),
        Some(session("old-token", Some("refresh-1"), NOW + 10)),
        FixedClock::new(NOW),
    )
    .await;

    manager.refresh().await.unwrap();

    let current = manager.session().unwrap();
    assert_eq!(current.access_token, "fresh-token");
    assert_eq!(current.refresh_token.as_deref(), Some("refresh-1"));
}

#[tokio::test]
async fn test_failed_refresh_clears_session() {
    let mut state = MockState::default();
    state
        .token_responses
        .push_back((400, json!({ "error": "invalid_grant" }).to_string()));
    let server = MockServer::start(state).await;
    let dir = tempfile::tempdir().unwrap();
    let mut manager = open_session(
        &server.config(dir.path()),
        Some(session("old-token", Some("revoked"), NOW + 30)),
        FixedClock::new(NOW),
    )
    .await;

    assert!(matches!(
        manager.ensure_token().await,
        Err(Error::Unauthenticated)
    ));
    assert!(manager.session().is_none());
    assert_eq!(manager.state().await.unwrap(), SessionState::NoSession);

    let store = CredentialStore::new(dir.path().to_path_buf());
    assert_eq!(store.load(NOW).await.unwrap(), None);
}

#[tokio::test]
async fn test_expired_token_without_refresh_token_is_unauthenticated() {
    let server = MockServer::start(MockState::default()).await;
    let dir = tempfile::tempdir().unwrap();
    let mut manager = open_session(
        &server.config(dir.path()),
        Some(session("old-token", None, NOW + 10)),
        FixedClock::new(NOW),
    )
    .await;

    assert!(matches!(
        manager.ensure_token().await,
        Err(Error::Unauthenticated)
    ));
    assert!(manager.session().is_none());
    assert!(server.requests().is_empty());
}

#[tokio::test]
async fn test_begin_authorization_stores_pending_and_builds_url() {
    let server = MockServer::start(MockState::default()).await;
    let dir = tempfile::tempdir().unwrap();
    let config = server.config(dir.path());
    let mut manager = open_session(&config, None, FixedClock::new(NOW)).await;

    let request = manager.begin_authorization().await.unwrap();
    assert_eq!(
        manager.state().await.unwrap(),
        SessionState::PendingAuthorization
    );

    let url = Url::parse(&request.url).unwrap();
    let query: HashMap<String, String> = url.query_pairs().into_owned().collect();
    assert_eq!(query["state"], request.state);
    assert_eq!(query["code_challenge_method"], "S256");

    // The challenge in the URL belongs to the stored verifier
    let pending = CredentialStore::new(dir.path().to_path_buf())
        .take_pending()
        .await
        .unwrap()
        .unwrap();
    assert_eq!(pending.state, request.state);
    assert_eq!(pending.code_verifier.len(), 128);
    assert_eq!(
        query["code_challenge"],
        jammming::utils::generate_code_challenge(&pending.code_verifier)
    );

    // Beginning does not produce a token
    assert!(manager.session().is_none());
    assert!(server.requests().is_empty());
}

#[tokio::test]
async fn test_complete_authorization_exchanges_code() {
    let server = MockServer::start(MockState::default()).await;
    let dir = tempfile::tempdir().unwrap();
    let mut manager = open_session(&server.config(dir.path()), None, FixedClock::new(NOW)).await;

    let request = manager.begin_authorization().await.unwrap();
    let token = manager
        .complete_authorization(&params(Some("auth-code"), Some(&request.state), None))
        .await
        .unwrap();

    assert_eq!(token, "fresh-token");
    assert_eq!(manager.state().await.unwrap(), SessionState::Authorized);

    let requests = server.token_requests();
    assert_eq!(requests.len(), 1);
    let body = form(&requests[0].body);
    assert_eq!(body["grant_type"], "authorization_code");
    assert_eq!(body["code"], "auth-code");
    assert_eq!(body["code_verifier"].len(), 128);
    assert_eq!(body["redirect_uri"], "http://127.0.0.1:5173/callback");

    // Session persisted, verifier gone
    let store = CredentialStore::new(dir.path().to_path_buf());
    let stored = store.load(NOW).await.unwrap().unwrap();
    assert_eq!(stored.access_token, "fresh-token");
    assert_eq!(stored.expires_at, NOW + 3600);
    assert!(!store.has_pending().await.unwrap());
}

#[tokio::test]
async fn test_state_mismatch_is_denied_without_exchange() {
    let server = MockServer::start(MockState::default()).await;
    let dir = tempfile::tempdir().unwrap();
    let mut manager = open_session(&server.config(dir.path()), None, FixedClock::new(NOW)).await;

    manager.begin_authorization().await.unwrap();
    let result = manager
        .complete_authorization(&params(Some("auth-code"), Some("forged"), None))
        .await;

    assert!(matches!(result, Err(Error::AuthorizationDenied(_))));
    assert!(server.token_requests().is_empty());
    assert!(manager.session().is_none());

    // The pending authorization was consumed
    let store = CredentialStore::new(dir.path().to_path_buf());
    assert!(!store.has_pending().await.unwrap());
}

#[tokio::test]
async fn test_provider_error_is_denied() {
    let server = MockServer::start(MockState::default()).await;
    let dir = tempfile::tempdir().unwrap();
    let mut manager = open_session(&server.config(dir.path()), None, FixedClock::new(NOW)).await;

    let request = manager.begin_authorization().await.unwrap();
    let result = manager
        .complete_authorization(&params(None, Some(&request.state), Some("access_denied")))
        .await;

    match result {
        Err(Error::AuthorizationDenied(reason)) => assert!(reason.contains("access_denied")),
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(server.token_requests().is_empty());
}

#[tokio::test]
async fn test_complete_without_pending_is_denied() {
    let server = MockServer::start(MockState::default()).await;
    let dir = tempfile::tempdir().unwrap();
    let mut manager = open_session(&server.config(dir.path()), None, FixedClock::new(NOW)).await;

    let result = manager
        .complete_authorization(&params(Some("auth-code"), Some("whatever"), None))
        .await;

    assert!(matches!(result, Err(Error::AuthorizationDenied(_))));
    assert!(server.token_requests().is_empty());
}

#[tokio::test]
async fn test_complete_is_single_use() {
    let server = MockServer::start(MockState::default()).await;
    let dir = tempfile::tempdir().unwrap();
    let mut manager = open_session(&server.config(dir.path()), None, FixedClock::new(NOW)).await;

    let request = manager.begin_authorization().await.unwrap();
    let redirect = params(Some("auth-code"), Some(&request.state), None);
    manager.complete_authorization(&redirect).await.unwrap();

    // Replaying the same redirect finds no pending verifier
    assert!(matches!(
        manager.complete_authorization(&redirect).await,
        Err(Error::AuthorizationDenied(_))
    ));
    assert_eq!(server.token_requests().len(), 1);
}

#[tokio::test]
async fn test_rejected_code_exchange_fails() {
    let mut state = MockState::default();
    state
        .token_responses
        .push_back((400, json!({ "error": "invalid_grant" }).to_string()));
    let server = MockServer::start(state).await;
    let dir = tempfile::tempdir().unwrap();
    let mut manager = open_session(&server.config(dir.path()), None, FixedClock::new(NOW)).await;

    let request = manager.begin_authorization().await.unwrap();
    let result = manager
        .complete_authorization(&params(Some("bad-code"), Some(&request.state), None))
        .await;

    assert!(matches!(result, Err(Error::TokenExchangeFailed(_))));
    assert!(manager.session().is_none());
}

#[tokio::test]
async fn test_abandon_authorization_removes_pending() {
    let server = MockServer::start(MockState::default()).await;
    let dir = tempfile::tempdir().unwrap();
    let config = server.config(dir.path());
    let store = CredentialStore::new(dir.path().to_path_buf());
    store
        .save_pending(&PendingAuthorization {
            code_verifier: "v".repeat(128),
            state: "s".repeat(16),
        })
        .await
        .unwrap();

    let mut manager = open_session(&config, None, FixedClock::new(NOW)).await;
    manager.abandon_authorization().await.unwrap();

    assert_eq!(manager.state().await.unwrap(), SessionState::NoSession);
}

#[tokio::test]
async fn test_non_positive_lifetime_is_rejected_on_exchange() {
    let mut state = MockState::default();
    state.token_responses.push_back((
        200,
        json!({ "access_token": "fresh-token", "expires_in": 0 }).to_string(),
    ));
    let server = MockServer::start(state).await;
    let dir = tempfile::tempdir().unwrap();
    let mut manager = open_session(&server.config(dir.path()), None, FixedClock::new(NOW)).await;

    let request = manager.begin_authorization().await.unwrap();
    let result = manager
        .complete_authorization(&params(Some("auth-code"), Some(&request.state), None))
        .await;

    assert!(matches!(result, Err(Error::TokenExchangeFailed(_))));
    assert!(manager.session().is_none());
}

#[tokio::test]
async fn test_negative_lifetime_is_rejected_on_refresh() {
    let mut state = MockState::default();
    state.token_responses.push_back((
        200,
        json!({ "access_token": "fresh-token", "expires_in": -5 }).to_string(),
    ));
    let server = MockServer::start(state).await;
    let dir = tempfile::tempdir().unwrap();
    let mut manager = open_session(
        &server.config(dir.path()),
        Some(session("old-token", Some("refresh-1"), NOW + 10)),
        FixedClock::new(NOW),
    )
    .await;

    assert!(matches!(
        manager.refresh().await,
        Err(Error::TokenRefreshFailed(_))
    ));
    assert!(manager.session().is_none());
}

#[tokio::test]
async fn test_huge_lifetime_does_not_overflow() {
    let mut state = MockState::default();
    state.token_responses.push_back((
        200,
        json!({ "access_token": "fresh-token", "expires_in": i64::MAX }).to_string(),
    ));
    let server = MockServer::start(state).await;
    let dir = tempfile::tempdir().unwrap();
    let mut manager = open_session(&server.config(dir.path()), None, FixedClock::new(NOW)).await;

    let request = manager.begin_authorization().await.unwrap();
    manager
        .complete_authorization(&params(Some("auth-code"), Some(&request.state), None))
        .await
        .unwrap();

    assert_eq!(manager.session().unwrap().expires_at, i64::MAX);
    assert_eq!(manager.ensure_token().await.unwrap(), "fresh-token");
}

#[tokio::test]
async fn test_corrupt_credentials_do_not_block_opening() {
    let server = MockServer::start(MockState::default()).await;
    let dir = tempfile::tempdir().unwrap();
    let store = CredentialStore::new(dir.path().to_path_buf());
    std::fs::write(store.path(), "{\"access_token\": \"abc\"").unwrap();

    let manager = open_session(&server.config(dir.path()), None, FixedClock::new(NOW)).await;

    assert!(manager.session().is_none());
    assert_eq!(manager.state().await.unwrap(), SessionState::NoSession);
}
