//! Consul KV retrieval.

mod common;

use common::*;
use keyscope_client::Backend;
use keyscope_config::BasicAuth;
use secrecy::SecretString;
use wiremock::matchers::{basic_auth, header, method, path, query_param};

fn consul(server: &MockServer, datacenter: Option<&str>, token: Option<&str>) -> Backend {
    Backend::Consul {
        endpoint: server.uri(),
        datacenter: datacenter.map(str::to_string),
        token: token.map(|t| SecretString::new(t.into())),
        basic_auth: None,
    }
}

#[tokio::test]
async fn test_raw_get_with_datacenter_and_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/kv/app/db/password"))
        .and(query_param("raw", ""))
        .and(query_param("dc", "dc1"))
        .and(header("X-Consul-Token", "consul-acl"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"pa55".to_vec()))
        .mount(&server)
        .await;

    let store = retriever(consul(&server, Some("dc1"), Some("consul-acl")), &["app/db/password"])
        .retrieve(&RetrieveContext::new())
        .await;

    assert_eq!(store.get_secret("app/db/password"), Some(&b"pa55"[..]));
}

#[tokio::test]
async fn test_not_found_is_absent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/kv/nope"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/kv/yes"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let store = retriever(consul(&server, None, None), &["nope", "yes"])
        .retrieve(&RetrieveContext::new())
        .await;

    assert!(store.contains_key("nope"));
    assert!(!store.is_available("nope"));
    assert_eq!(store.get_secret("yes"), Some(&b"ok"[..]));
}

#[tokio::test]
async fn test_basic_auth_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/kv/k"))
        .and(basic_auth("consul-user", "consul-pass"))
        .respond_with(ResponseTemplate::new(200).set_body_string("v"))
        .mount(&server)
        .await;

    let backend = Backend::Consul {
        endpoint: server.uri(),
        datacenter: None,
        token: None,
        basic_auth: Some(BasicAuth::new("consul-user", "consul-pass")),
    };
    let store = retriever(backend, &["k"]).retrieve(&RetrieveContext::new()).await;

    assert!(store.is_available("k"));
}

#[tokio::test]
async fn test_forbidden_is_absent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let store = retriever(consul(&server, None, Some("bad")), &["k"])
        .retrieve(&RetrieveContext::new())
        .await;

    assert!(!store.is_available("k"));
}
