//! HTTP plumbing shared by the etcd, Consul and remote file store fetchers.

use reqwest::Response;
use url::Url;

use keyscope_config::RetrieveSettings;

use crate::error::{ClientError, Result};

/// Turn a configured endpoint into a base URL without a trailing slash.
///
/// Bare `host:port` endpoints get an `http://` scheme.
pub(crate) fn normalize_endpoint(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ClientError::InvalidEndpoint("endpoint is empty".to_string()));
    }

    // The scheme is decided on the untouched text; trailing slashes are only
    // stripped once the URL is known to have a host.
    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    };

    let url = Url::parse(&candidate)
        .map_err(|e| ClientError::InvalidEndpoint(format!("cannot parse endpoint: {e}")))?;
    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(ClientError::InvalidEndpoint(format!(
                "unsupported scheme '{other}'"
            )));
        }
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(ClientError::InvalidEndpoint("endpoint has no host".to_string()));
    }

    Ok(candidate.trim_end_matches('/').to_string())
}

/// Join a base URL and a logical key.
pub(crate) fn key_url(base: &str, key: &str) -> String {
    format!("{base}/{}", key.trim_start_matches('/'))
}

/// Build a client owned by a single retrieval call.
pub(crate) fn http_client(settings: &RetrieveSettings) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .connect_timeout(settings.dial_timeout)
        .timeout(settings.request_timeout)
        .build()?;
    Ok(client)
}

/// Map non-2xx responses to `ClientError::Status`.
pub(crate) fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    Err(ClientError::Status {
        status: status.as_u16(),
        url: response.url().to_string(),
    })
}
