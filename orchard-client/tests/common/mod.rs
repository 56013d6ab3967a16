//! Shared fixtures for client integration tests
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use orchard_client::model::TokenGrant;
use orchard_client::{ApiClient, ClientConfig, ManualClock, MemoryStore};
use serde_json::{Value, json};
use wiremock::MockServer;

/// Fixed "now" for tests, in epoch milliseconds
pub const NOW: i64 = 1_750_000_000_000;

pub const HOUR_MS: i64 = 3_600_000;

pub struct Harness {
    pub server: MockServer,
    pub client: ApiClient,
    pub clock: ManualClock,
    pub session: MemoryStore,
    pub local: MemoryStore,
    pub cookies: MemoryStore,
}

impl Harness {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let clock = ManualClock::new(NOW);
        let session = MemoryStore::new();
        let local = MemoryStore::new();
        let cookies = MemoryStore::new();

        let config = ClientConfig {
            refresh_buffer: Duration::from_millis(5_000),
            ..ClientConfig::new(server.uri()).expect("mock server uri is a valid base url")
        };
        let client = ApiClient::builder(config)
            .session_store(Arc::new(session.clone()))
            .local_store(Arc::new(local.clone()))
            .cookie_store(Arc::new(cookies.clone()))
            .clock(Arc::new(clock.clone()))
            .build()
            .expect("client builds");

        Self {
            server,
            client,
            clock,
            session,
            local,
            cookies,
        }
    }

    /// Store tokens as if a previous login had returned them
    pub fn seed(&self, access: &str, expires_at: i64, refresh: Option<&str>) {
        self.client
            .credentials()
            .store_grant(&TokenGrant {
                access_token: access.to_string(),
                access_token_expires_at: expires_at,
                refresh_token: refresh.map(str::to_string),
            })
            .expect("seed tokens");
    }

    pub fn is_cleared(&self) -> bool {
        self.session.is_empty() && self.local.is_empty() && self.cookies.is_empty()
    }
}

pub fn grant_json(access: &str, expires_at: i64, refresh: Option<&str>) -> Value {
    let mut body = json!({
        "access_token": access,
        "access_token_expires_at": expires_at,
    });
    if let Some(refresh) = refresh {
        body["refresh_token"] = json!(refresh);
    }
    body
}

pub fn user_json(id: &str, balance: f64) -> Value {
    json!({
        "id": id,
        "username": "alice",
        "balance": balance,
        "vip_level": 1,
    })
}
