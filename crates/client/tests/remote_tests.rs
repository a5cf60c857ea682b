//! Remote HTTP file store retrieval, including unreachable and slow servers.

mod common;

use std::time::{Duration, Instant};

use common::*;
use keyscope_client::Backend;
use keyscope_config::BasicAuth;
use wiremock::matchers::{basic_auth, method, path};

fn remote(endpoint: String, auth: Option<BasicAuth>) -> Backend {
    Backend::RemoteHttp {
        endpoint,
        basic_auth: auth,
    }
}

#[tokio::test]
async fn test_get_with_basic_auth() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/certs/server.pem"))
        .and(basic_auth("files", "files-pass"))
        .respond_with(ResponseTemplate::new(200).set_body_string("PEM DATA"))
        .mount(&server)
        .await;

    let backend = remote(
        format!("{}/", server.uri()),
        Some(BasicAuth::new("files", "files-pass")),
    );
    let store = retriever(backend, &["certs/server.pem"])
        .retrieve(&RetrieveContext::new())
        .await;

    assert_eq!(store.get_secret("certs/server.pem"), Some(&b"PEM DATA"[..]));
}

#[tokio::test]
async fn test_bare_host_port_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/k"))
        .respond_with(ResponseTemplate::new(200).set_body_string("v"))
        .mount(&server)
        .await;

    let endpoint = server.address().to_string();
    let store = retriever(remote(endpoint, None), &["k"])
        .retrieve(&RetrieveContext::new())
        .await;

    assert!(store.is_available("k"));
}

#[tokio::test]
async fn test_non_success_status_is_absent_per_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/fine"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let store = retriever(remote(server.uri(), None), &["broken", "fine"])
        .retrieve(&RetrieveContext::new())
        .await;

    assert!(!store.is_available("broken"));
    assert!(store.is_available("fine"));
}

#[tokio::test]
async fn test_unreachable_endpoint_returns_within_timeout() {
    let backend = remote("http://127.0.0.1:1".to_string(), None);
    let started = Instant::now();

    let store = retriever(backend, &["a", "b"])
        .retrieve(&RetrieveContext::new())
        .await;

    assert!(started.elapsed() < Duration::from_secs(3));
    assert_eq!(store.len(), 2);
    assert_eq!(store.available_count(), 0);
}

#[tokio::test]
async fn test_slow_key_times_out_without_blocking_the_rest() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("late")
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/quick"))
        .respond_with(ResponseTemplate::new(200).set_body_string("now"))
        .mount(&server)
        .await;

    let started = Instant::now();
    let store = retriever(remote(server.uri(), None), &["slow", "quick"])
        .retrieve(&RetrieveContext::new())
        .await;

    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(!store.is_available("slow"));
    assert_eq!(store.get_secret("quick"), Some(&b"now"[..]));
}

#[tokio::test]
async fn test_deadline_caps_request_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(10)))
        .mount(&server)
        .await;

    let ctx = RetrieveContext::new().with_timeout(Duration::from_millis(300));
    let started = Instant::now();
    let store = retriever(remote(server.uri(), None), &["a", "b", "c"])
        .retrieve(&ctx)
        .await;

    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(store.available_count(), 0);
    assert_eq!(store.len(), 3);
}

#[tokio::test]
async fn test_cancellation_interrupts_in_flight_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(10)))
        .mount(&server)
        .await;

    let ctx = RetrieveContext::new();
    let token = ctx.cancellation_token().clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        token.cancel();
    });

    let started = Instant::now();
    let store = retriever(remote(server.uri(), None), &["a", "b"])
        .retrieve(&ctx)
        .await;

    assert!(started.elapsed() < Duration::from_millis(900));
    assert_eq!(store.available_count(), 0);
}
