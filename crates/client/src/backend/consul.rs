//! Consul KV reads via `GET /v1/kv/<key>?raw`.

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};

use keyscope_config::{BasicAuth, RetrieveSettings};

use crate::backend::http::{ensure_success, http_client, key_url, normalize_endpoint};
use crate::error::{ClientError, Result};

const TOKEN_HEADER: &str = "X-Consul-Token";

pub(crate) struct ConsulSession {
    http: reqwest::Client,
    kv_base: String,
    datacenter: Option<String>,
    token: Option<SecretString>,
    basic_auth: Option<BasicAuth>,
}

impl ConsulSession {
    pub(crate) fn connect(
        endpoint: &str,
        datacenter: Option<&str>,
        token: Option<&SecretString>,
        basic_auth: Option<&BasicAuth>,
        settings: &RetrieveSettings,
    ) -> Result<Self> {
        let base = normalize_endpoint(endpoint)?;
        Ok(Self {
            http: http_client(settings)?,
            kv_base: format!("{base}/v1/kv"),
            datacenter: datacenter
                .map(str::trim)
                .filter(|dc| !dc.is_empty())
                .map(str::to_string),
            token: token.cloned(),
            basic_auth: basic_auth.cloned(),
        })
    }

    pub(crate) async fn get(&self, key: &str) -> Result<Vec<u8>> {
        let url = format!("{}?raw", key_url(&self.kv_base, key));

        let mut request = self.http.get(&url);
        if let Some(dc) = &self.datacenter {
            request = request.query(&[("dc", dc)]);
        }
        if let Some(token) = &self.token {
            request = request.header(TOKEN_HEADER, token.expose_secret());
        }
        if let Some(auth) = &self.basic_auth {
            request = request.basic_auth(&auth.username, Some(auth.password()));
        }

        let response = request.send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ClientError::MissingKey(key.to_string()));
        }
        let response = ensure_success(response)?;
        Ok(response.bytes().await?.to_vec())
    }
}
