//! Boot document schema: credential and certificate fragments.
//!
//! Responsibilities:
//! - Deserialize the `cred` list and the provider-grouped `cert` blocks.
//! - Flatten certificate blocks into one list of `CertFragment`s tagged with
//!   their provider.
//! - Validate fragments that will be used (provider present, endpoint present
//!   for remote providers).
//!
//! Does NOT handle:
//! - Deciding which fragments apply to the environment (see `selection`).
//!
//! Invariants:
//! - Fragments with an empty or null name are discarded without error.
//! - A missing, null or empty `locale` means `*::*::*::*`.

use serde::{Deserialize, Deserializer, Serialize};

use crate::locale::LocaleSpec;
use crate::types::connection::{Connection, ProviderKind};

/// Read an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Common view over fragments used by locale selection.
pub trait Fragment {
    fn name(&self) -> &str;
    fn locale(&self) -> &LocaleSpec;
}

/// One entry of the `cred` list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredFragment {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderKind>,
    #[serde(default)]
    pub locale: LocaleSpec,
    #[serde(flatten)]
    pub connection: Connection,
    #[serde(default, deserialize_with = "null_as_default")]
    pub paths: Vec<String>,
}

impl Fragment for CredFragment {
    fn name(&self) -> &str {
        &self.name
    }

    fn locale(&self) -> &LocaleSpec {
        &self.locale
    }
}

/// The four named certificate slots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertPaths {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_cert_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_key_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_cert_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_key_path: Option<String>,
}

impl CertPaths {
    /// Configured slots in fixed order, skipping empty paths.
    pub fn configured(&self) -> impl Iterator<Item = (CertSlot, &str)> {
        [
            (CertSlot::ServerCert, &self.server_cert_path),
            (CertSlot::ServerKey, &self.server_key_path),
            (CertSlot::ClientCert, &self.client_cert_path),
            (CertSlot::ClientKey, &self.client_key_path),
        ]
        .into_iter()
        .filter_map(|(slot, path)| {
            path.as_deref()
                .filter(|p| !p.trim().is_empty())
                .map(|p| (slot, p))
        })
    }
}

/// Named certificate slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CertSlot {
    ServerCert,
    ServerKey,
    ClientCert,
    ClientKey,
}

impl CertSlot {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ServerCert => "serverCert",
            Self::ServerKey => "serverKey",
            Self::ClientCert => "clientCert",
            Self::ClientKey => "clientKey",
        }
    }
}

/// A certificate fragment as written under one provider block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertBlockEntry {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub locale: LocaleSpec,
    #[serde(flatten)]
    pub connection: Connection,
    #[serde(flatten)]
    pub paths: CertPaths,
}

/// The `cert` section, grouped by provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertSection {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub local: Vec<CertBlockEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub etcd: Vec<CertBlockEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub consul: Vec<CertBlockEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub remote_file_store: Vec<CertBlockEntry>,
}

/// A certificate fragment with its provider resolved.
#[derive(Debug, Clone)]
pub struct CertFragment {
    pub name: String,
    pub locale: LocaleSpec,
    pub provider: ProviderKind,
    pub connection: Connection,
    pub paths: CertPaths,
}

impl Fragment for CertFragment {
    fn name(&self) -> &str {
        &self.name
    }

    fn locale(&self) -> &LocaleSpec {
        &self.locale
    }
}

/// Top-level boot document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BootConfig {
    #[serde(default)]
    pub cred: Vec<CredFragment>,
    #[serde(default)]
    pub cert: CertSection,
}

/// Problems found while validating named fragments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FragmentProblem {
    MissingProvider { fragment: String },
    MissingEndpoint { fragment: String, provider: ProviderKind },
}

impl BootConfig {
    /// Named credential fragments in declaration order.
    pub fn cred_fragments(&self) -> Vec<CredFragment> {
        self.cred
            .iter()
            .filter(|fragment| !fragment.name.is_empty())
            .cloned()
            .collect()
    }

    /// Named certificate fragments: local, etcd, consul, then remote file store.
    pub fn cert_fragments(&self) -> Vec<CertFragment> {
        let blocks = [
            (ProviderKind::LocalFs, &self.cert.local),
            (ProviderKind::Etcd, &self.cert.etcd),
            (ProviderKind::Consul, &self.cert.consul),
            (ProviderKind::RemoteFs, &self.cert.remote_file_store),
        ];
        blocks
            .into_iter()
            .flat_map(|(provider, entries)| {
                entries
                    .iter()
                    .filter(|entry| !entry.name.is_empty())
                    .map(move |entry| CertFragment {
                        name: entry.name.clone(),
                        locale: entry.locale.clone(),
                        provider,
                        connection: entry.connection.clone(),
                        paths: entry.paths.clone(),
                    })
            })
            .collect()
    }

    /// Check every named fragment, returning the first problem found.
    pub fn validate(&self) -> Result<(), FragmentProblem> {
        for fragment in self.cred_fragments() {
            let Some(provider) = fragment.provider else {
                return Err(FragmentProblem::MissingProvider {
                    fragment: fragment.name,
                });
            };
            check_endpoint(&fragment.name, provider, &fragment.connection)?;
        }
        for fragment in self.cert_fragments() {
            check_endpoint(&fragment.name, fragment.provider, &fragment.connection)?;
        }
        Ok(())
    }
}

fn check_endpoint(
    name: &str,
    provider: ProviderKind,
    connection: &Connection,
) -> Result<(), FragmentProblem> {
    if provider.requires_endpoint() && connection.endpoint_or_empty().trim().is_empty() {
        return Err(FragmentProblem::MissingEndpoint {
            fragment: name.to_string(),
            provider,
        });
    }
    Ok(())
}
