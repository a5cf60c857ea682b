//! etcd v3 access through its JSON gateway.
//!
//! Keys and values travel base64-encoded. When basic auth is configured the
//! session first exchanges it for a token at `/v3/auth/authenticate`; that
//! token is then sent in the `Authorization` header of every range request.

use base64::{Engine, engine::general_purpose};
use reqwest::header::AUTHORIZATION;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use keyscope_config::{BasicAuth, RetrieveSettings};

use crate::backend::http::{ensure_success, http_client, normalize_endpoint};
use crate::error::{ClientError, Result};

#[derive(Serialize)]
struct AuthenticateRequest<'a> {
    name: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct AuthenticateResponse {
    #[serde(default)]
    token: Option<String>,
}

#[derive(Serialize)]
struct RangeRequest {
    key: String,
}

#[derive(Deserialize)]
struct RangeResponse {
    #[serde(default)]
    kvs: Vec<KeyValue>,
}

#[derive(Deserialize)]
struct KeyValue {
    /// Omitted by the gateway when the stored value is empty.
    #[serde(default)]
    value: Option<String>,
}

pub(crate) struct EtcdSession {
    http: reqwest::Client,
    base: String,
    token: Option<SecretString>,
}

impl EtcdSession {
    pub(crate) async fn connect(
        endpoint: &str,
        basic_auth: Option<&BasicAuth>,
        settings: &RetrieveSettings,
    ) -> Result<Self> {
        let base = normalize_endpoint(endpoint)?;
        let http = http_client(settings)?;

        let token = match basic_auth {
            Some(auth) => Some(authenticate(&http, &base, auth).await?),
            None => None,
        };

        Ok(Self { http, base, token })
    }

    pub(crate) async fn get(&self, key: &str) -> Result<Vec<u8>> {
        let url = format!("{}/v3/kv/range", self.base);
        let body = RangeRequest {
            key: general_purpose::STANDARD.encode(key),
        };

        let mut request = self.http.post(&url).json(&body);
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, token.expose_secret());
        }

        let response = ensure_success(request.send().await?)?;
        let range: RangeResponse = response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(format!("etcd range: {e}")))?;

        let Some(kv) = range.kvs.into_iter().next() else {
            return Err(ClientError::MissingKey(key.to_string()));
        };

        match kv.value {
            Some(encoded) => general_purpose::STANDARD
                .decode(encoded)
                .map_err(|e| ClientError::InvalidResponse(format!("etcd value is not base64: {e}"))),
            None => Ok(Vec::new()),
        }
    }
}

async fn authenticate(
    http: &reqwest::Client,
    base: &str,
    auth: &BasicAuth,
) -> Result<SecretString> {
    let url = format!("{base}/v3/auth/authenticate");
    debug!(url = %url, user = %auth.username, "Authenticating to etcd");

    let response = http
        .post(&url)
        .json(&AuthenticateRequest {
            name: &auth.username,
            password: auth.password(),
        })
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(ClientError::Authentication(format!(
            "etcd rejected credentials for '{}' ({status})",
            auth.username
        )));
    }

    let body: AuthenticateResponse = response
        .json()
        .await
        .map_err(|e| ClientError::InvalidResponse(format!("etcd authenticate: {e}")))?;

    body.token
        .filter(|token| !token.is_empty())
        .map(|token| SecretString::new(token.into()))
        .ok_or_else(|| ClientError::Authentication("etcd returned no token".to_string()))
}
