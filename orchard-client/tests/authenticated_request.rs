//! Request dispatch, invalid-token retry and error mapping

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{HOUR_MS, Harness, NOW, grant_json};
use orchard_client::ClientError;
use orchard_client::RequestOptions;
use reqwest::header::{HeaderName, HeaderValue};
use serde_json::{Value, json};
use tokio::sync::Barrier;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn sends_bearer_token_and_decodes_body() {
    let h = Harness::start().await;
    h.seed("t1", NOW + HOUR_MS, Some("r1"));

    Mock::given(method("GET"))
        .and(path("/team"))
        .and(header("authorization", "Bearer t1"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"members": []})))
        .expect(1)
        .mount(&h.server)
        .await;

    let body: Value = h.client.get("/team").await.unwrap();
    assert_eq!(body, json!({"members": []}));
}

#[tokio::test]
async fn caller_headers_and_query_are_forwarded() {
    let h = Harness::start().await;
    h.seed("t1", NOW + HOUR_MS, Some("r1"));

    Mock::given(method("GET"))
        .and(path("/forum/posts"))
        .and(query_param("page", "3"))
        .and(header("x-client", "orchardctl"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&h.server)
        .await;

    let options = RequestOptions::get()
        .query("page", 3)
        .header(
            HeaderName::from_static("x-client"),
            HeaderValue::from_static("orchardctl"),
        );
    let posts: Vec<Value> = h
        .client
        .authenticated_request("/forum/posts", options)
        .await
        .unwrap();
    assert!(posts.is_empty());
}

#[tokio::test]
async fn empty_body_decodes_as_unit() {
    let h = Harness::start().await;
    h.seed("t1", NOW + HOUR_MS, Some("r1"));

    Mock::given(method("PUT"))
        .and(path("/users/me/password"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&h.server)
        .await;

    let change = orchard_client::model::prelude::PasswordChange {
        current_password: "old".into(),
        new_password: "new".into(),
    };
    h.client.change_password(&change).await.unwrap();
}

#[tokio::test]
async fn invalid_token_triggers_one_refresh_and_retry() {
    let h = Harness::start().await;
    h.seed("t1", NOW + HOUR_MS, Some("r1"));

    Mock::given(method("GET"))
        .and(path("/products"))
        .and(header("authorization", "Bearer t1"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid token"})))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .and(header("authorization", "Bearer t2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(grant_json("t2", NOW + HOUR_MS, None)))
        .expect(1)
        .mount(&h.server)
        .await;

    let products = h.client.products().await.unwrap();
    assert!(products.is_empty());
    assert_eq!(h.client.credentials().access_token().as_deref(), Some("t2"));
}

#[tokio::test]
async fn second_invalid_token_is_not_retried_again() {
    let h = Harness::start().await;
    h.seed("t1", NOW + HOUR_MS, Some("r1"));

    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"error": "INVALID TOKEN supplied"})),
        )
        .expect(2)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(grant_json("t2", NOW + HOUR_MS, None)))
        .expect(1)
        .mount(&h.server)
        .await;

    let err = h.client.products().await.unwrap_err();
    assert_eq!(
        err,
        ClientError::InvalidTokenRetryExhausted("INVALID TOKEN supplied".into())
    );
}

#[tokio::test]
async fn retry_failure_of_another_kind_is_a_request_failure() {
    let h = Harness::start().await;
    h.seed("t1", NOW + HOUR_MS, Some("r1"));

    Mock::given(method("GET"))
        .and(path("/bank"))
        .and(header("authorization", "Bearer t1"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"code": "invalid_token"})))
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/bank"))
        .and(header("authorization", "Bearer t2"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({"message": "Maintenance"})))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(grant_json("t2", NOW + HOUR_MS, None)))
        .mount(&h.server)
        .await;

    assert_eq!(
        h.client.bank_account().await,
        Err(ClientError::RequestFailed {
            status: Some(503),
            message: "Maintenance".into()
        })
    );
}

#[tokio::test]
async fn other_failures_are_not_retried() {
    let h = Harness::start().await;
    h.seed("t1", NOW + HOUR_MS, Some("r1"));

    Mock::given(method("GET"))
        .and(path("/admin/users"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"message": "Admins only"})))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/refresh"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&h.server)
        .await;

    let err = h.client.admin_users().await.unwrap_err();
    assert_eq!(err.status(), Some(403));
    assert_eq!(err.to_string(), "Admins only");
    assert!(!err.is_auth_lost());
}

#[tokio::test]
async fn failure_without_message_reports_generic_text() {
    let h = Harness::start().await;
    h.seed("t1", NOW + HOUR_MS, Some("r1"));

    Mock::given(method("GET"))
        .and(path("/transactions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>oops</html>"))
        .mount(&h.server)
        .await;

    let err = h.client.transactions().await.unwrap_err();
    assert_eq!(err.to_string(), "Request failed");
    assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn undecodable_success_body_is_invalid_response() {
    let h = Harness::start().await;
    h.seed("t1", NOW + HOUR_MS, Some("r1"));

    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"unexpected": true})))
        .mount(&h.server)
        .await;

    assert!(matches!(
        h.client.products().await,
        Err(ClientError::InvalidResponse(_))
    ));
}

#[tokio::test]
async fn blank_message_does_not_hide_error_field() {
    let h = Harness::start().await;
    h.seed("t1", NOW + HOUR_MS, Some("r1"));

    Mock::given(method("POST"))
        .and(path("/withdrawals"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({"message": "", "error": "Insufficient balance"})),
        )
        .mount(&h.server)
        .await;

    assert_eq!(
        h.client.request_withdrawal(10_000.0).await,
        Err(ClientError::RequestFailed {
            status: Some(400),
            message: "Insufficient balance".into()
        })
    );
}

#[tokio::test]
async fn truncated_error_body_reports_generic_text() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        // Read headers and the declared body so closing does not reset the socket
        loop {
            let n = stream.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&request).to_string();
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text[..end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())?
                    })
                    .unwrap_or(0);
                if request.len() >= end + 4 + length {
                    break;
                }
            }
        }
        stream
            .write_all(
                b"HTTP/1.1 500 Internal Server Error\r\n\
                  Content-Type: application/json\r\n\
                  Content-Length: 100\r\n\r\n{\"mess",
            )
            .await
            .unwrap();
        stream.shutdown().await.unwrap();
    });

    let config = orchard_client::ClientConfig::new(format!("http://{addr}")).unwrap();
    let client = orchard_client::ApiClient::new(config).unwrap();
    let err = client
        .login(&orchard_client::model::LoginRequest {
            identifier: "alice".into(),
            password: "pw".into(),
        })
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ClientError::RequestFailed {
            status: Some(500),
            message: "Request failed".into()
        }
    );
    server.await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_with_expired_token_share_one_refresh() {
    let h = Harness::start().await;
    h.seed("stale", NOW - 1, Some("r1"));

    Mock::given(method("POST"))
        .and(path("/refresh"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(grant_json("fresh", NOW + HOUR_MS, Some("r2")))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(5)
        .mount(&h.server)
        .await;

    let start = Arc::new(Barrier::new(5));
    let calls = (0..5).map(|_| {
        let client = h.client.clone();
        let start = Arc::clone(&start);
        tokio::spawn(async move {
            start.wait().await;
            client.products().await
        })
    });

    for result in futures::future::join_all(calls).await {
        assert_eq!(result.unwrap(), Ok(Vec::new()));
    }
    h.server.verify().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_invalid_token_failures_share_one_refresh() {
    let h = Harness::start().await;
    h.seed("t1", NOW + HOUR_MS, Some("r1"));

    Mock::given(method("GET"))
        .and(path("/team"))
        .and(header("authorization", "Bearer t1"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid token"})))
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/team"))
        .and(header("authorization", "Bearer t2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"members": []})))
        .expect(6)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/refresh"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(grant_json("t2", NOW + HOUR_MS, None))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&h.server)
        .await;

    let start = Arc::new(Barrier::new(6));
    let calls = (0..6).map(|_| {
        let client = h.client.clone();
        let start = Arc::clone(&start);
        tokio::spawn(async move {
            start.wait().await;
            client.get::<Value>("/team").await
        })
    });

    for result in futures::future::join_all(calls).await {
        assert_eq!(result.unwrap(), Ok(json!({"members": []})));
    }
    assert_eq!(h.client.credentials().access_token().as_deref(), Some("t2"));
    h.server.verify().await;
}
