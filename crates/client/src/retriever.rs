//! Credential and certificate retrievers.
//!
//! A retriever pairs one selected fragment with its backend. `retrieve` is
//! called once per bootstrap and always returns a store; fetch failures show
//! up as absent slots and warnings, never as errors.

use tracing::info;

use keyscope_config::{
    CertFragment, CertPaths, CertSlot, CredFragment, LocaleSpec, RetrieveSettings,
};

use crate::backend::Backend;
use crate::context::RetrieveContext;
use crate::error::{ClientError, Result};
use crate::store::{CertStore, SecretStore};

/// Fetches a list of logical keys into a `SecretStore`.
#[derive(Debug, Clone)]
pub struct CredRetriever {
    name: String,
    locale: LocaleSpec,
    backend: Backend,
    paths: Vec<String>,
    settings: RetrieveSettings,
}

impl CredRetriever {
    pub fn new(
        name: impl Into<String>,
        locale: LocaleSpec,
        backend: Backend,
        paths: Vec<String>,
        settings: RetrieveSettings,
    ) -> Self {
        Self {
            name: name.into(),
            locale,
            backend,
            paths,
            settings,
        }
    }

    pub fn from_fragment(fragment: &CredFragment, settings: RetrieveSettings) -> Result<Self> {
        let kind = fragment
            .provider
            .ok_or_else(|| ClientError::MissingProvider(fragment.name.clone()))?;
        Ok(Self::new(
            fragment.name.clone(),
            fragment.locale.clone(),
            Backend::from_connection(kind, &fragment.connection),
            fragment.paths.clone(),
            settings,
        ))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn provider(&self) -> &'static str {
        self.backend.provider()
    }

    pub fn endpoint(&self) -> String {
        self.backend.endpoint()
    }

    pub fn locale(&self) -> &LocaleSpec {
        &self.locale
    }

    pub fn list_paths(&self) -> &[String] {
        &self.paths
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    pub async fn retrieve(&self, ctx: &RetrieveContext) -> SecretStore {
        let keys: Vec<&str> = self.paths.iter().map(String::as_str).collect();
        let values = self
            .backend
            .fetch_all(&keys, &self.locale, &self.settings, ctx)
            .await;

        let mut store = SecretStore::new();
        for (key, value) in keys.into_iter().zip(values) {
            store.insert(key, value);
        }

        info!(
            entry = %self.name,
            provider = self.provider(),
            requested = store.len(),
            available = store.available_count(),
            "Retrieved credentials"
        );
        store
    }
}

/// Fetches the configured certificate slots into a `CertStore`.
#[derive(Debug, Clone)]
pub struct CertRetriever {
    name: String,
    locale: LocaleSpec,
    backend: Backend,
    slots: CertPaths,
    settings: RetrieveSettings,
}

impl CertRetriever {
    pub fn new(
        name: impl Into<String>,
        locale: LocaleSpec,
        backend: Backend,
        slots: CertPaths,
        settings: RetrieveSettings,
    ) -> Self {
        Self {
            name: name.into(),
            locale,
            backend,
            slots,
            settings,
        }
    }

    pub fn from_fragment(fragment: &CertFragment, settings: RetrieveSettings) -> Self {
        Self::new(
            fragment.name.clone(),
            fragment.locale.clone(),
            Backend::from_connection(fragment.provider, &fragment.connection),
            fragment.paths.clone(),
            settings,
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn provider(&self) -> &'static str {
        self.backend.provider()
    }

    pub fn endpoint(&self) -> String {
        self.backend.endpoint()
    }

    pub fn locale(&self) -> &LocaleSpec {
        &self.locale
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    pub fn server_cert_path(&self) -> Option<&str> {
        self.slots.server_cert_path.as_deref()
    }

    pub fn server_key_path(&self) -> Option<&str> {
        self.slots.server_key_path.as_deref()
    }

    pub fn client_cert_path(&self) -> Option<&str> {
        self.slots.client_cert_path.as_deref()
    }

    pub fn client_key_path(&self) -> Option<&str> {
        self.slots.client_key_path.as_deref()
    }

    pub async fn retrieve(&self, ctx: &RetrieveContext) -> CertStore {
        let (slots, keys): (Vec<CertSlot>, Vec<&str>) = self.slots.configured().unzip();
        let values = self
            .backend
            .fetch_all(&keys, &self.locale, &self.settings, ctx)
            .await;

        let mut store = CertStore::new();
        for (slot, value) in slots.into_iter().zip(values) {
            store.insert(slot, value);
        }

        info!(
            entry = %self.name,
            provider = self.provider(),
            requested = keys.len(),
            available = store.available_count(),
            "Retrieved certificates"
        );
        store
    }
}
