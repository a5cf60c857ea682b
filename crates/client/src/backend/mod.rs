//! Retrieval backends.
//!
//! Responsibilities:
//! - Model the closed set of backends as `Backend`, each variant holding only
//!   the parameters its protocol needs.
//! - Open a per-call session and fetch keys one by one, in declaration order.
//! - Apply the per-key failure policy: log a warning and record the key absent.
//!
//! Does NOT handle:
//! - Choosing which fragments run (see `keyscope_config::select_fragments`).
//! - Storing results (see `store`).
//!
//! Invariants:
//! - A session lives for exactly one `fetch_all` call; clients are never shared.
//! - `fetch_all` returns one slot per requested key, in request order.
//! - Each request is bounded by `min(request_timeout, deadline - now)`.

mod consul;
mod etcd;
pub(crate) mod http;
mod local;
mod remote;

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use tracing::{debug, warn};

use keyscope_config::{BasicAuth, Connection, LocaleSpec, ProviderKind, RetrieveSettings};

use crate::context::RetrieveContext;
use crate::error::{ClientError, Result};
use consul::ConsulSession;
use etcd::EtcdSession;
use local::LocalReader;
use remote::RemoteSession;

/// Endpoint reported for local filesystem backends without an explicit root.
const LOCAL_ENDPOINT: &str = "localhost";

/// Backend a retriever fetches its keys from.
#[derive(Debug, Clone)]
pub enum Backend {
    /// Files relative to `root`, or to the working directory when unset.
    LocalFs { root: Option<PathBuf> },
    Etcd {
        endpoint: String,
        basic_auth: Option<BasicAuth>,
    },
    Consul {
        endpoint: String,
        datacenter: Option<String>,
        token: Option<SecretString>,
        basic_auth: Option<BasicAuth>,
    },
    RemoteHttp {
        endpoint: String,
        basic_auth: Option<BasicAuth>,
    },
}

impl Backend {
    /// Build the backend for `kind` from a fragment's connection parameters.
    pub fn from_connection(kind: ProviderKind, connection: &Connection) -> Self {
        let endpoint = connection.endpoint_or_empty().trim().to_string();
        let basic_auth = connection.basic_auth.clone();
        match kind {
            ProviderKind::LocalFs => Self::LocalFs { root: None },
            ProviderKind::Etcd => Self::Etcd {
                endpoint,
                basic_auth,
            },
            ProviderKind::Consul => Self::Consul {
                endpoint,
                datacenter: connection.datacenter.clone(),
                token: connection.token.clone(),
                basic_auth,
            },
            ProviderKind::RemoteFs => Self::RemoteHttp {
                endpoint,
                basic_auth,
            },
        }
    }

    /// Local filesystem backend rooted at `root` instead of the working directory.
    pub fn local_fs_at(root: impl Into<PathBuf>) -> Self {
        Self::LocalFs {
            root: Some(root.into()),
        }
    }

    pub fn kind(&self) -> ProviderKind {
        match self {
            Self::LocalFs { .. } => ProviderKind::LocalFs,
            Self::Etcd { .. } => ProviderKind::Etcd,
            Self::Consul { .. } => ProviderKind::Consul,
            Self::RemoteHttp { .. } => ProviderKind::RemoteFs,
        }
    }

    pub fn provider(&self) -> &'static str {
        self.kind().as_str()
    }

    /// Endpoint as configured; local backends report their root or `localhost`.
    pub fn endpoint(&self) -> String {
        match self {
            Self::LocalFs { root: Some(root) } => root.display().to_string(),
            Self::LocalFs { root: None } => LOCAL_ENDPOINT.to_string(),
            Self::Etcd { endpoint, .. }
            | Self::Consul { endpoint, .. }
            | Self::RemoteHttp { endpoint, .. } => endpoint.clone(),
        }
    }

    async fn open(&self, settings: &RetrieveSettings) -> Result<Session> {
        let session = match self {
            Self::LocalFs { root } => Session::LocalFs(LocalReader::open(root.as_deref())?),
            Self::Etcd {
                endpoint,
                basic_auth,
            } => {
                let session = EtcdSession::connect(endpoint, basic_auth.as_ref(), settings).await?;
                Session::Etcd(session)
            }
            Self::Consul {
                endpoint,
                datacenter,
                token,
                basic_auth,
            } => Session::Consul(ConsulSession::connect(
                endpoint,
                datacenter.as_deref(),
                token.as_ref(),
                basic_auth.as_ref(),
                settings,
            )?),
            Self::RemoteHttp {
                endpoint,
                basic_auth,
            } => Session::RemoteHttp(RemoteSession::connect(
                endpoint,
                basic_auth.as_ref(),
                settings,
            )?),
        };
        Ok(session)
    }

    /// Fetch `keys` in order. Never fails: problems are logged and the
    /// affected keys come back as `None`.
    pub(crate) async fn fetch_all(
        &self,
        keys: &[&str],
        locale: &LocaleSpec,
        settings: &RetrieveSettings,
        ctx: &RetrieveContext,
    ) -> Vec<Option<Vec<u8>>> {
        let provider = self.provider();
        let endpoint = self.endpoint();

        if keys.is_empty() {
            return Vec::new();
        }

        let open_limit = ctx.bound(settings.dial_timeout);
        let session = match bounded(ctx, open_limit, self.open(settings)).await {
            Ok(session) => session,
            Err(error) => {
                warn!(
                    provider,
                    endpoint = %endpoint,
                    locale = %locale,
                    error = %error,
                    "Failed to open provider; all keys left absent"
                );
                return vec![None; keys.len()];
            }
        };

        let mut values = Vec::with_capacity(keys.len());
        for key in keys {
            let outcome = if ctx.is_done() {
                Err(ClientError::Cancelled)
            } else {
                let limit = ctx.bound(settings.request_timeout);
                bounded(ctx, limit, session.fetch(key)).await
            };

            match outcome {
                Ok(bytes) => {
                    debug!(provider, endpoint = %endpoint, key, len = bytes.len(), "Fetched key");
                    values.push(Some(bytes));
                }
                Err(error) => {
                    warn!(
                        provider,
                        endpoint = %endpoint,
                        locale = %locale,
                        key,
                        error = %error,
                        "Failed to fetch key; value left absent"
                    );
                    values.push(None);
                }
            }
        }

        drop(session);
        debug!(provider, endpoint = %endpoint, "Closed provider session");
        values
    }
}

/// A connected backend, owned by one `fetch_all` call.
enum Session {
    LocalFs(LocalReader),
    Etcd(EtcdSession),
    Consul(ConsulSession),
    RemoteHttp(RemoteSession),
}

impl Session {
    async fn fetch(&self, key: &str) -> Result<Vec<u8>> {
        match self {
            Self::LocalFs(reader) => reader.read(key).await,
            Self::Etcd(session) => session.get(key).await,
            Self::Consul(session) => session.get(key).await,
            Self::RemoteHttp(session) => session.get(key).await,
        }
    }
}

/// Run `fut` until it completes, `limit` elapses, or `ctx` is cancelled.
async fn bounded<T>(
    ctx: &RetrieveContext,
    limit: Duration,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::select! {
        _ = ctx.cancelled() => Err(ClientError::Cancelled),
        outcome = tokio::time::timeout(limit, fut) => match outcome {
            Ok(result) => result,
            Err(_) => Err(ClientError::Timeout(limit)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connection(yaml: &str) -> Connection {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_from_connection_covers_every_provider() {
        let conn = connection(
            "endpoint: ' localhost:8500 '\ndatacenter: dc1\ntoken: t0k\nbasicAuth: u:p",
        );
        let kinds = [
            ProviderKind::LocalFs,
            ProviderKind::Etcd,
            ProviderKind::Consul,
            ProviderKind::RemoteFs,
        ];
        for kind in kinds {
            assert_eq!(Backend::from_connection(kind, &conn).kind(), kind);
        }

        match Backend::from_connection(ProviderKind::Consul, &conn) {
            Backend::Consul {
                endpoint,
                datacenter,
                token,
                basic_auth,
            } => {
                assert_eq!(endpoint, "localhost:8500");
                assert_eq!(datacenter.as_deref(), Some("dc1"));
                assert!(token.is_some());
                assert_eq!(basic_auth.unwrap().username, "u");
            }
            other => panic!("unexpected backend: {other:?}"),
        }
    }

    #[test]
    fn test_endpoint_reporting() {
        assert_eq!(
            Backend::from_connection(ProviderKind::LocalFs, &Connection::default()).endpoint(),
            "localhost"
        );
        assert_eq!(Backend::local_fs_at("/srv/app").endpoint(), "/srv/app");
        let conn = connection("endpoint: files.internal:8080");
        assert_eq!(
            Backend::from_connection(ProviderKind::RemoteFs, &conn).endpoint(),
            "files.internal:8080"
        );
    }

    #[test]
    fn test_debug_hides_credentials() {
        let conn = connection("endpoint: h:1\ntoken: consul-secret-token\nbasicAuth: u:pw-secret");
        let backend = Backend::from_connection(ProviderKind::Consul, &conn);
        let debug = format!("{backend:?}");
        assert!(!debug.contains("consul-secret-token"));
        assert!(!debug.contains("pw-secret"));
    }

    #[tokio::test]
    async fn test_invalid_endpoint_leaves_all_keys_absent() {
        let backend = Backend::RemoteHttp {
            endpoint: "ftp://nope".to_string(),
            basic_auth: None,
        };
        let values = backend
            .fetch_all(
                &["a", "b"],
                &LocaleSpec::wildcard(),
                &RetrieveSettings::default(),
                &RetrieveContext::new(),
            )
            .await;
        assert_eq!(values, vec![None, None]);
    }

    #[tokio::test]
    async fn test_cancelled_context_skips_fetches() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("present"), b"value").unwrap();

        let ctx = RetrieveContext::new();
        ctx.cancellation_token().cancel();

        let values = Backend::local_fs_at(dir.path())
            .fetch_all(
                &["present"],
                &LocaleSpec::wildcard(),
                &RetrieveSettings::default(),
                &ctx,
            )
            .await;
        assert_eq!(values, vec![None]);
    }
}
