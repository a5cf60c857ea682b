//! Explicit entry registry and bootstrap orchestration.
//!
//! Responsibilities:
//! - Build one entry per fragment selected for the environment.
//! - Bootstrap entries sequentially in registration order.
//! - Look entries up by name for the code that consumes secrets.
//!
//! Does NOT handle:
//! - Process-wide state. The registry is a value owned by its caller.
//!
//! Invariants:
//! - At most one entry per (entry type, name).
//! - Credential entries are registered before certificate entries.

use serde_json::json;
use tracing::{info, warn};

use keyscope_config::{BootConfig, Environment, RetrieveSettings, select_fragments};

use crate::context::RetrieveContext;
use crate::entry::{CertEntry, CredEntry};
use crate::error::Result;

/// Any entry the registry can hold.
#[derive(Debug)]
pub enum RegisteredEntry {
    Cred(CredEntry),
    Cert(CertEntry),
}

impl RegisteredEntry {
    pub fn name(&self) -> &str {
        match self {
            Self::Cred(entry) => entry.name(),
            Self::Cert(entry) => entry.name(),
        }
    }

    pub fn entry_type(&self) -> &'static str {
        match self {
            Self::Cred(entry) => entry.entry_type(),
            Self::Cert(entry) => entry.entry_type(),
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Self::Cred(entry) => entry.description(),
            Self::Cert(entry) => entry.description(),
        }
    }

    pub async fn bootstrap(&mut self, ctx: &RetrieveContext) {
        match self {
            Self::Cred(entry) => entry.bootstrap(ctx).await,
            Self::Cert(entry) => entry.bootstrap(ctx).await,
        }
    }

    pub fn interrupt(&mut self) {
        match self {
            Self::Cred(entry) => entry.interrupt(),
            Self::Cert(entry) => entry.interrupt(),
        }
    }

    pub fn marshal_safe(&self) -> serde_json::Value {
        match self {
            Self::Cred(entry) => entry.marshal_safe(),
            Self::Cert(entry) => entry.marshal_safe(),
        }
    }
}

#[derive(Debug, Default)]
pub struct EntryRegistry {
    entries: Vec<RegisteredEntry>,
}

impl EntryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entry for every fragment that applies to `env`.
    pub fn from_boot(
        boot: &BootConfig,
        env: &Environment,
        settings: &RetrieveSettings,
    ) -> Result<Self> {
        let mut registry = Self::new();

        for fragment in select_fragments(boot.cred_fragments(), env) {
            let entry = CredEntry::from_fragment(&fragment, *settings)?;
            registry.register(RegisteredEntry::Cred(entry));
        }
        for fragment in select_fragments(boot.cert_fragments(), env) {
            let entry = CertEntry::from_fragment(&fragment, *settings);
            registry.register(RegisteredEntry::Cert(entry));
        }

        info!(
            entries = registry.len(),
            realm = %env.realm,
            region = %env.region,
            az = %env.az,
            domain = %env.domain,
            "Registered entries"
        );
        Ok(registry)
    }

    /// Add `entry`, replacing and returning an existing one of the same
    /// type and name.
    pub fn register(&mut self, entry: RegisteredEntry) -> Option<RegisteredEntry> {
        let existing = self.entries.iter().position(|e| {
            e.entry_type() == entry.entry_type() && e.name() == entry.name()
        });
        match existing {
            Some(index) => {
                warn!(
                    entry = entry.name(),
                    entry_type = entry.entry_type(),
                    "Replacing registered entry with the same name"
                );
                Some(std::mem::replace(&mut self.entries[index], entry))
            }
            None => {
                self.entries.push(entry);
                None
            }
        }
    }

    /// Bootstrap every entry once, in registration order.
    pub async fn bootstrap_all(&mut self, ctx: &RetrieveContext) {
        for entry in &mut self.entries {
            entry.bootstrap(ctx).await;
        }
    }

    pub fn interrupt_all(&mut self) {
        for entry in &mut self.entries {
            entry.interrupt();
        }
    }

    pub fn cred(&self, name: &str) -> Option<&CredEntry> {
        self.entries.iter().find_map(|entry| match entry {
            RegisteredEntry::Cred(cred) if cred.name() == name => Some(cred),
            _ => None,
        })
    }

    pub fn cert(&self, name: &str) -> Option<&CertEntry> {
        self.entries.iter().find_map(|entry| match entry {
            RegisteredEntry::Cert(cert) if cert.name() == name => Some(cert),
            _ => None,
        })
    }

    pub fn entries(&self) -> &[RegisteredEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `{"cred": [..], "cert": [..]}` with presence flags only.
    pub fn marshal_safe(&self) -> serde_json::Value {
        let (cred, cert): (Vec<_>, Vec<_>) = self
            .entries
            .iter()
            .partition(|entry| matches!(entry, RegisteredEntry::Cred(_)));
        json!({
            "cred": cred.iter().map(|e| e.marshal_safe()).collect::<Vec<_>>(),
            "cert": cert.iter().map(|e| e.marshal_safe()).collect::<Vec<_>>(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOOT: &str = r#"
cred:
  - name: db
    provider: localFs
    paths: [db.txt]
  - name: db
    provider: remoteFs
    locale: "prod::*::*::*"
    endpoint: files.prod:8080
    paths: [db.txt]
  - name: staging-only
    provider: localFs
    locale: "staging::*::*::*"
    paths: [x]
cert:
  local:
    - name: tls
      serverCertPath: server.pem
"#;

    fn boot() -> BootConfig {
        serde_yaml::from_str(BOOT).unwrap()
    }

    fn prod() -> Environment {
        Environment::new("prod", "us-east", "az1", "example.com")
    }

    #[test]
    fn test_from_boot_selects_most_specific_fragment() {
        let registry = EntryRegistry::from_boot(&boot(), &prod(), &RetrieveSettings::default())
            .unwrap();
        assert_eq!(registry.len(), 2);

        let db = registry.cred("db").unwrap();
        assert_eq!(db.retrievers()[0].provider(), "remoteFs");
        assert!(registry.cred("staging-only").is_none());
        assert!(registry.cert("tls").is_some());
        assert!(registry.cred("tls").is_none());
    }

    #[test]
    fn test_wildcard_fragment_used_outside_prod() {
        let env = Environment::new("dev", "", "", "");
        let registry =
            EntryRegistry::from_boot(&boot(), &env, &RetrieveSettings::default()).unwrap();
        assert_eq!(registry.cred("db").unwrap().retrievers()[0].provider(), "localFs");
    }

    #[test]
    fn test_register_replaces_same_type_and_name() {
        let mut registry = EntryRegistry::new();
        assert!(registry.register(RegisteredEntry::Cred(CredEntry::new("a"))).is_none());
        assert!(registry.register(RegisteredEntry::Cert(CertEntry::new("a"))).is_none());
        let replaced = registry.register(RegisteredEntry::Cred(
            CredEntry::new("a").with_description("second"),
        ));
        assert!(replaced.is_some());
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.cred("a").unwrap().description(), "second");
    }

    #[test]
    fn test_marshal_safe_groups_by_type() {
        let registry = EntryRegistry::from_boot(&boot(), &prod(), &RetrieveSettings::default())
            .unwrap();
        let safe = registry.marshal_safe();
        assert_eq!(safe["cred"].as_array().unwrap().len(), 1);
        assert_eq!(safe["cert"][0]["name"], "tls");
    }
}
