//! Common test utilities for integration tests.
//!
//! # Invariants
//! - Settings use short timeouts so failure paths finish quickly.
//!
//! # What this does NOT handle
//! - Mock server setup (use wiremock directly in tests)

use std::time::Duration;

use base64::{Engine, engine::general_purpose};
use keyscope_client::{Backend, CredRetriever};
use keyscope_config::{LocaleSpec, RetrieveSettings};

#[allow(unused_imports)]
pub use keyscope_client::{RetrieveContext, SecretStore};
#[allow(unused_imports)]
pub use wiremock::{Mock, MockServer, ResponseTemplate};

/// One-second request and dial timeouts.
#[allow(dead_code)]
pub fn fast_settings() -> RetrieveSettings {
    RetrieveSettings {
        request_timeout: Duration::from_secs(1),
        dial_timeout: Duration::from_secs(1),
    }
}

/// Wildcard-locale retriever for `backend` and `paths`.
#[allow(dead_code)]
pub fn retriever(backend: Backend, paths: &[&str]) -> CredRetriever {
    CredRetriever::new(
        "test",
        LocaleSpec::wildcard(),
        backend,
        paths.iter().map(|p| p.to_string()).collect(),
        fast_settings(),
    )
}

#[allow(dead_code)]
pub fn b64(data: &str) -> String {
    general_purpose::STANDARD.encode(data)
}
