//! Credential and certificate entries.
//!
//! An entry owns the retrievers registered for one fragment name and the
//! store they fill. Lifecycle: construct, `bootstrap` once, read, `interrupt`.

use serde_json::json;
use tracing::info;

use keyscope_config::{CertFragment, CredFragment, RetrieveSettings};

use crate::context::RetrieveContext;
use crate::error::Result;
use crate::retriever::{CertRetriever, CredRetriever};
use crate::store::{CertStore, SecretStore};

pub const CRED_ENTRY_TYPE: &str = "CredEntry";
pub const CERT_ENTRY_TYPE: &str = "CertEntry";

const CRED_DESCRIPTION: &str = "Credentials fetched from local files or remote stores.";
const CERT_DESCRIPTION: &str = "TLS certificates and keys fetched from local files or remote stores.";

fn provider_summary(provider: &str, endpoint: String, locale: &str) -> serde_json::Value {
    json!({ "provider": provider, "endpoint": endpoint, "locale": locale })
}

/// Named credential bundle.
#[derive(Debug)]
pub struct CredEntry {
    name: String,
    description: String,
    retrievers: Vec<CredRetriever>,
    store: SecretStore,
}

impl CredEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: CRED_DESCRIPTION.to_string(),
            retrievers: Vec::new(),
            store: SecretStore::new(),
        }
    }

    pub fn from_fragment(fragment: &CredFragment, settings: RetrieveSettings) -> Result<Self> {
        let retriever = CredRetriever::from_fragment(fragment, settings)?;
        Ok(Self::new(fragment.name.clone()).with_retriever(retriever))
    }

    pub fn with_retriever(mut self, retriever: CredRetriever) -> Self {
        self.retrievers.push(retriever);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entry_type(&self) -> &'static str {
        CRED_ENTRY_TYPE
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn retrievers(&self) -> &[CredRetriever] {
        &self.retrievers
    }

    pub fn store(&self) -> &SecretStore {
        &self.store
    }

    /// Run every retriever once, in registration order.
    pub async fn bootstrap(&mut self, ctx: &RetrieveContext) {
        for retriever in &self.retrievers {
            let fetched = retriever.retrieve(ctx).await;
            self.store.absorb(fetched);
        }
        info!(
            entry = %self.name,
            entry_type = CRED_ENTRY_TYPE,
            requested = self.store.len(),
            available = self.store.available_count(),
            "Bootstrapped entry"
        );
    }

    /// Drop fetched material.
    pub fn interrupt(&mut self) {
        self.store = SecretStore::new();
        info!(entry = %self.name, entry_type = CRED_ENTRY_TYPE, "Interrupted entry");
    }

    pub fn marshal_safe(&self) -> serde_json::Value {
        let providers: Vec<_> = self
            .retrievers
            .iter()
            .map(|r| {
                let mut summary = provider_summary(r.provider(), r.endpoint(), r.locale().as_str());
                summary["paths"] = json!(r.list_paths());
                summary
            })
            .collect();
        json!({
            "name": self.name,
            "type": CRED_ENTRY_TYPE,
            "description": self.description,
            "providers": providers,
            "store": self.store.marshal_safe(),
        })
    }
}

/// Named certificate bundle.
#[derive(Debug)]
pub struct CertEntry {
    name: String,
    description: String,
    retrievers: Vec<CertRetriever>,
    store: CertStore,
}

impl CertEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: CERT_DESCRIPTION.to_string(),
            retrievers: Vec::new(),
            store: CertStore::new(),
        }
    }

    pub fn from_fragment(fragment: &CertFragment, settings: RetrieveSettings) -> Self {
        Self::new(fragment.name.clone())
            .with_retriever(CertRetriever::from_fragment(fragment, settings))
    }

    pub fn with_retriever(mut self, retriever: CertRetriever) -> Self {
        self.retrievers.push(retriever);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entry_type(&self) -> &'static str {
        CERT_ENTRY_TYPE
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn retrievers(&self) -> &[CertRetriever] {
        &self.retrievers
    }

    pub fn store(&self) -> &CertStore {
        &self.store
    }

    pub async fn bootstrap(&mut self, ctx: &RetrieveContext) {
        for retriever in &self.retrievers {
            let fetched = retriever.retrieve(ctx).await;
            self.store.absorb(fetched);
        }
        info!(
            entry = %self.name,
            entry_type = CERT_ENTRY_TYPE,
            available = self.store.available_count(),
            "Bootstrapped entry"
        );
    }

    pub fn interrupt(&mut self) {
        self.store = CertStore::new();
        info!(entry = %self.name, entry_type = CERT_ENTRY_TYPE, "Interrupted entry");
    }

    pub fn marshal_safe(&self) -> serde_json::Value {
        let providers: Vec<_> = self
            .retrievers
            .iter()
            .map(|r| provider_summary(r.provider(), r.endpoint(), r.locale().as_str()))
            .collect();
        json!({
            "name": self.name,
            "type": CERT_ENTRY_TYPE,
            "description": self.description,
            "providers": providers,
            "store": self.store.marshal_safe(),
        })
    }
}
