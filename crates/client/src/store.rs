//! Write-once stores for fetched secret and certificate material.
//!
//! Responsibilities:
//! - Hold fetched bytes as `secrecy::SecretSlice<u8>`, one slot per requested key.
//! - Expose a safe view (`marshal_safe`) that reports presence only.
//! - Parse certificate slots into rustls PEM types on demand.
//!
//! Invariants:
//! - A requested key always has a slot; `None` means the fetch failed.
//! - A slot that holds bytes is never overwritten.
//! - `Debug`, `Serialize` and `marshal_safe` never include secret bytes.

use std::collections::BTreeMap;
use std::fmt;

use rustls_pki_types::pem::PemObject;
use rustls_pki_types::{CertificateDer, PrivateKeyDer};
use secrecy::{ExposeSecret, SecretSlice};
use serde::{Serialize, Serializer};
use serde_json::json;

use keyscope_config::CertSlot;

use crate::error::{ClientError, Result};

type Slot = Option<SecretSlice<u8>>;

/// Insert unless the slot already holds bytes. Returns true if stored.
fn insert_once<K: Ord>(slots: &mut BTreeMap<K, Slot>, key: K, value: Option<Vec<u8>>) -> bool {
    match slots.get(&key) {
        Some(Some(_)) => false,
        _ => {
            slots.insert(key, value.map(SecretSlice::from));
            true
        }
    }
}

fn presence(slot: &Slot) -> serde_json::Value {
    json!({ "present": slot.is_some() })
}

/// Secret bytes keyed by logical key, in the order keys were first requested.
#[derive(Default)]
pub struct SecretStore {
    secrets: Vec<(String, Slot)>,
}

impl SecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.secrets.iter().position(|(existing, _)| existing == key)
    }

    /// Store `slot` under `key` unless bytes are already held there.
    fn put(&mut self, key: String, slot: Slot) -> bool {
        match self.position(&key) {
            Some(index) if self.secrets[index].1.is_some() => false,
            Some(index) => {
                self.secrets[index].1 = slot;
                true
            }
            None => {
                self.secrets.push((key, slot));
                true
            }
        }
    }

    /// Record the outcome for `key`. A slot that already holds bytes is kept.
    pub fn insert(&mut self, key: impl Into<String>, value: Option<Vec<u8>>) -> bool {
        self.put(key.into(), value.map(SecretSlice::from))
    }

    /// Fold another store in, keeping bytes already present here.
    pub fn absorb(&mut self, other: SecretStore) {
        for (key, slot) in other.secrets {
            self.put(key, slot);
        }
    }

    /// Bytes for `key`, or `None` when absent or never requested.
    pub fn get_secret(&self, key: &str) -> Option<&[u8]> {
        self.position(key)
            .and_then(|index| self.secrets[index].1.as_ref())
            .map(|secret| secret.expose_secret())
    }

    /// True if `key` was requested, whether or not it was fetched.
    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    pub fn is_available(&self, key: &str) -> bool {
        self.get_secret(key).is_some()
    }

    /// Requested keys, first request first.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.secrets.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }

    pub fn available_count(&self) -> usize {
        self.secrets.iter().filter(|(_, slot)| slot.is_some()).count()
    }

    /// `{key: {"present": bool}}` for every requested key, in request order.
    pub fn marshal_safe(&self) -> serde_json::Value {
        let map = self
            .secrets
            .iter()
            .map(|(key, slot)| (key.clone(), presence(slot)))
            .collect::<serde_json::Map<_, _>>();
        serde_json::Value::Object(map)
    }
}

impl fmt::Debug for SecretStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.secrets
                    .iter()
                    .map(|(key, slot)| (key, if slot.is_some() { "present" } else { "absent" })),
            )
            .finish()
    }
}

impl Serialize for SecretStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.marshal_safe().serialize(serializer)
    }
}

/// Certificate and key material in the four named slots.
#[derive(Default)]
pub struct CertStore {
    slots: BTreeMap<CertSlot, Slot>,
}

impl CertStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, slot: CertSlot, value: Option<Vec<u8>>) -> bool {
        insert_once(&mut self.slots, slot, value)
    }

    pub fn absorb(&mut self, other: CertStore) {
        for (slot, value) in other.slots {
            match self.slots.get(&slot) {
                Some(Some(_)) => {}
                _ => {
                    self.slots.insert(slot, value);
                }
            }
        }
    }

    pub fn get(&self, slot: CertSlot) -> Option<&[u8]> {
        self.slots
            .get(&slot)
            .and_then(Option::as_ref)
            .map(|secret| secret.expose_secret())
    }

    pub fn server_cert(&self) -> Option<&[u8]> {
        self.get(CertSlot::ServerCert)
    }

    pub fn server_key(&self) -> Option<&[u8]> {
        self.get(CertSlot::ServerKey)
    }

    pub fn client_cert(&self) -> Option<&[u8]> {
        self.get(CertSlot::ClientCert)
    }

    pub fn client_key(&self) -> Option<&[u8]> {
        self.get(CertSlot::ClientKey)
    }

    /// True if `slot` was requested.
    pub fn is_requested(&self, slot: CertSlot) -> bool {
        self.slots.contains_key(&slot)
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn available_count(&self) -> usize {
        self.slots.values().filter(|slot| slot.is_some()).count()
    }

    /// Certificates in the server cert slot, leaf first.
    pub fn server_cert_chain(&self) -> Result<Vec<CertificateDer<'static>>> {
        self.cert_chain(CertSlot::ServerCert)
    }

    pub fn client_cert_chain(&self) -> Result<Vec<CertificateDer<'static>>> {
        self.cert_chain(CertSlot::ClientCert)
    }

    pub fn server_private_key(&self) -> Result<PrivateKeyDer<'static>> {
        self.private_key(CertSlot::ServerKey)
    }

    pub fn client_private_key(&self) -> Result<PrivateKeyDer<'static>> {
        self.private_key(CertSlot::ClientKey)
    }

    fn cert_chain(&self, slot: CertSlot) -> Result<Vec<CertificateDer<'static>>> {
        let pem = self.get(slot).ok_or(ClientError::MissingCertificate(slot))?;
        let chain = CertificateDer::pem_slice_iter(pem)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| ClientError::InvalidCertificate {
                slot,
                message: format!("{e:?}"),
            })?;
        if chain.is_empty() {
            return Err(ClientError::InvalidCertificate {
                slot,
                message: "no certificates found".to_string(),
            });
        }
        Ok(chain)
    }

    fn private_key(&self, slot: CertSlot) -> Result<PrivateKeyDer<'static>> {
        let pem = self.get(slot).ok_or(ClientError::MissingCertificate(slot))?;
        PrivateKeyDer::from_pem_slice(pem).map_err(|e| ClientError::InvalidCertificate {
            slot,
            message: format!("{e:?}"),
        })
    }

    /// `{slot: {"present": bool}}` for every requested slot.
    pub fn marshal_safe(&self) -> serde_json::Value {
        let map = self
            .slots
            .iter()
            .map(|(slot, value)| (slot.as_str().to_string(), presence(value)))
            .collect::<serde_json::Map<_, _>>();
        serde_json::Value::Object(map)
    }
}

impl fmt::Debug for CertStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.slots.iter().map(|(slot, value)| {
                (slot.as_str(), if value.is_some() { "present" } else { "absent" })
            }))
            .finish()
    }
}

impl Serialize for CertStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.marshal_safe().serialize(serializer)
    }
}
