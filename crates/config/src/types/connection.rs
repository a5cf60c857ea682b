//! Provider selection and connection parameters.
//!
//! Responsibilities:
//! - Name the closed set of retrieval backends (`ProviderKind`).
//! - Hold per-fragment connection parameters (endpoint, basic auth, Consul
//!   datacenter and token).
//! - Hold process-wide retrieval timeouts (`RetrieveSettings`).
//!
//! Does NOT handle:
//! - Building clients from these parameters (see the client crate).
//!
//! Invariants:
//! - Durations are serialized as whole seconds.
//! - Remote providers require an endpoint; `LocalFs` ignores it.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::constants::{DEFAULT_DIAL_TIMEOUT_SECS, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::types::auth::{BasicAuth, optional_basic_auth, secret_string};

/// Module for serializing Duration as seconds (integer).
mod duration_seconds {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

/// Backend used to fetch a fragment's keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderKind {
    #[serde(rename = "localFs")]
    LocalFs,
    #[serde(rename = "etcd")]
    Etcd,
    #[serde(rename = "consul")]
    Consul,
    #[serde(rename = "remoteFs")]
    RemoteFs,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LocalFs => "localFs",
            Self::Etcd => "etcd",
            Self::Consul => "consul",
            Self::RemoteFs => "remoteFs",
        }
    }

    /// True for providers that talk to a network endpoint.
    pub fn requires_endpoint(&self) -> bool {
        match self {
            Self::LocalFs => false,
            Self::Etcd | Self::Consul | Self::RemoteFs => true,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connection parameters shared by credential and certificate fragments.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(
        default,
        deserialize_with = "optional_basic_auth::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub basic_auth: Option<BasicAuth>,
    /// Consul only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datacenter: Option<String>,
    /// Consul only.
    #[serde(
        default,
        with = "secret_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub token: Option<SecretString>,
}

impl Connection {
    /// Endpoint text, empty when unset.
    pub fn endpoint_or_empty(&self) -> &str {
        self.endpoint.as_deref().unwrap_or_default()
    }
}

/// Timeouts applied to every remote fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrieveSettings {
    /// Bound on each individual request (serialized as seconds).
    #[serde(with = "duration_seconds")]
    pub request_timeout: Duration,
    /// Bound on establishing a connection to a KV store (serialized as seconds).
    #[serde(with = "duration_seconds")]
    pub dial_timeout: Duration,
}

impl Default for RetrieveSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            dial_timeout: Duration::from_secs(DEFAULT_DIAL_TIMEOUT_SECS),
        }
    }
}
