//! Error types for secret and certificate retrieval.
//!
//! Retrieval errors are soft: they are logged and turned into absent store
//! entries by the retrievers. They surface to callers only from helpers that
//! interpret store contents (certificate parsing) and from entry construction.

use std::time::Duration;
use thiserror::Error;

use keyscope_config::CertSlot;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur while fetching secrets or certificates.
#[derive(Error, Debug)]
pub enum ClientError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Non-success response from a backend.
    #[error("Unexpected response ({status}) from {url}")]
    Status { status: u16, url: String },

    /// The key does not exist in the backend.
    #[error("Key not found: {0}")]
    MissingKey(String),

    /// Local file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Request exceeded its time bound.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Bootstrap was cancelled or its deadline passed.
    #[error("Retrieval cancelled")]
    Cancelled,

    /// Endpoint could not be turned into a URL.
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Backend rejected the supplied credentials.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Backend response could not be decoded.
    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    /// Fragment does not name a provider.
    #[error("Fragment '{0}' does not name a provider")]
    MissingProvider(String),

    /// Certificate slot holds no material.
    #[error("No material available for {}", .0.as_str())]
    MissingCertificate(CertSlot),

    /// Certificate slot holds material that is not valid PEM.
    #[error("Invalid PEM in {}: {message}", .slot.as_str())]
    InvalidCertificate { slot: CertSlot, message: String },
}

impl ClientError {
    /// True when the backend answered but the key does not exist.
    pub fn is_missing_key(&self) -> bool {
        matches!(self, Self::MissingKey(_))
    }
}
