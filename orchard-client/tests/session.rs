//! Login, logout and snapshot persistence

mod common;

use std::sync::Arc;

use common::{HOUR_MS, Harness, NOW, grant_json, user_json};
use orchard_client::model::prelude::*;
use orchard_client::{ApiClient, ClientConfig, ClientError, ManualClock};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn auth_body(access: &str, refresh: &str) -> serde_json::Value {
    let mut body = grant_json(access, NOW + HOUR_MS, Some(refresh));
    body["user"] = user_json("u1", 250.0);
    body["application"] = json!({"version": 1, "site_name": "Orchard", "daily_spins": 3});
    body
}

#[tokio::test]
async fn login_persists_grant_and_snapshots() {
    let h = Harness::start().await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_json(json!({"identifier": "alice", "password": "hunter2"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_body("a1", "r1")))
        .expect(1)
        .mount(&h.server)
        .await;

    let payload = h
        .client
        .login(&LoginRequest {
            identifier: "alice".into(),
            password: "hunter2".into(),
        })
        .await
        .unwrap();

    assert_eq!(payload.grant.access_token, "a1");
    assert!(h.client.is_authenticated());
    assert_eq!(h.client.credentials().refresh_token().as_deref(), Some("r1"));
    assert_eq!(h.client.cached_user().map(|u| u.balance), Some(250.0));
    assert_eq!(h.client.cached_settings().map(|s| s.daily_spins()), Some(3));
}

#[tokio::test]
async fn failed_login_reports_server_message() {
    let h = Harness::start().await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "Wrong password"})),
        )
        .mount(&h.server)
        .await;

    let err = h
        .client
        .login(&LoginRequest {
            identifier: "alice".into(),
            password: "nope".into(),
        })
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ClientError::RequestFailed {
            status: Some(401),
            message: "Wrong password".into()
        }
    );
    assert!(!h.client.is_authenticated());
}

#[tokio::test]
async fn register_sends_referral_code() {
    let h = Harness::start().await;

    Mock::given(method("POST"))
        .and(path("/register"))
        .and(body_json(json!({
            "username": "bob",
            "phone": "+15550001",
            "password": "pw",
            "referral_code": "ALICE1",
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(auth_body("a1", "r1")))
        .expect(1)
        .mount(&h.server)
        .await;

    h.client
        .register(&RegisterRequest {
            username: "bob".into(),
            phone: "+15550001".into(),
            password: "pw".into(),
            referral_code: Some("ALICE1".into()),
        })
        .await
        .unwrap();
    assert!(h.client.is_authenticated());
}

#[tokio::test]
async fn logout_clears_state_and_revokes_refresh_token() {
    let h = Harness::start().await;
    h.seed("a1", NOW + HOUR_MS, Some("r1"));
    h.client.credentials().store_user(&UserProfile::default()).unwrap();

    Mock::given(method("POST"))
        .and(path("/logout"))
        .and(body_json(json!({"refresh_token": "r1"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&h.server)
        .await;

    h.client.logout_user().await.unwrap();

    assert!(h.is_cleared());
    assert!(!h.client.is_authenticated());
    assert_eq!(
        h.client.ensure_token_valid().await,
        Err(ClientError::NoRefreshToken)
    );
}

#[tokio::test]
async fn logout_clears_state_even_when_server_fails() {
    let h = Harness::start().await;
    h.seed("a1", NOW + HOUR_MS, Some("r1"));

    Mock::given(method("POST"))
        .and(path("/logout"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&h.server)
        .await;

    h.client.logout_user().await.unwrap();
    assert!(h.is_cleared());
}

#[tokio::test]
async fn expired_access_with_refresh_token_counts_as_authenticated() {
    let h = Harness::start().await;
    h.seed("a1", NOW - 1, None);
    assert!(!h.client.is_authenticated());

    h.seed("a1", NOW - 1, Some("r1"));
    assert!(h.client.is_authenticated());
}

#[tokio::test]
async fn purchase_refreshes_user_snapshot() {
    let h = Harness::start().await;
    h.seed("a1", NOW + HOUR_MS, Some("r1"));

    Mock::given(method("POST"))
        .and(path("/products/p%201/purchase"))
        .and(body_json(json!({"quantity": 2})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "i1",
            "product_id": "p 1",
            "product_name": "Starter",
            "amount": 200.0,
            "daily_income": 5.0,
            "earned": 0.0,
            "status": "active",
            "started_at": "2025-06-15T12:00:00Z",
        })))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json("u1", 50.0)))
        .expect(1)
        .mount(&h.server)
        .await;

    let investment = h.client.purchase("p 1", 2).await.unwrap();
    assert_eq!(investment.status, InvestmentStatus::Active);
    assert_eq!(h.client.cached_user().map(|u| u.balance), Some(50.0));
}

#[tokio::test]
async fn file_storage_keeps_refresh_token_across_clients() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let clock = ManualClock::new(NOW);

    let config = || ClientConfig {
        data_dir: Some(dir.path().to_path_buf()),
        ..ClientConfig::new(server.uri()).unwrap()
    };
    let build = || {
        ApiClient::builder(config())
            .clock(Arc::new(clock.clone()))
            .file_storage()
            .unwrap()
            .build()
            .unwrap()
    };

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_body("a1", "r1")))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/refresh"))
        .and(body_json(json!({"refresh_token": "r1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(grant_json("a2", NOW + HOUR_MS, None)))
        .expect(1)
        .mount(&server)
        .await;

    let first = build();
    first
        .login(&LoginRequest {
            identifier: "alice".into(),
            password: "pw".into(),
        })
        .await
        .unwrap();
    drop(first);

    // The session store is per process, so a new client must refresh
    let second = build();
    assert_eq!(second.credentials().access_token(), None);
    assert_eq!(second.cached_user().map(|u| u.id), Some("u1".into()));
    assert_eq!(second.ensure_token_valid().await, Ok("a2".into()));
}
