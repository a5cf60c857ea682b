//! Remote file store: one `GET endpoint/key` per key.

use keyscope_config::{BasicAuth, RetrieveSettings};

use crate::backend::http::{ensure_success, http_client, key_url, normalize_endpoint};
use crate::error::Result;

pub(crate) struct RemoteSession {
    http: reqwest::Client,
    base: String,
    basic_auth: Option<BasicAuth>,
}

impl RemoteSession {
    pub(crate) fn connect(
        endpoint: &str,
        basic_auth: Option<&BasicAuth>,
        settings: &RetrieveSettings,
    ) -> Result<Self> {
        Ok(Self {
            http: http_client(settings)?,
            base: normalize_endpoint(endpoint)?,
            basic_auth: basic_auth.cloned(),
        })
    }

    pub(crate) async fn get(&self, key: &str) -> Result<Vec<u8>> {
        let mut request = self.http.get(key_url(&self.base, key));
        if let Some(auth) = &self.basic_auth {
            request = request.basic_auth(&auth.username, Some(auth.password()));
        }
        let response = ensure_success(request.send().await?)?;
        Ok(response.bytes().await?.to_vec())
    }
}
