//! Locale specs and environment matching.
//!
//! Responsibilities:
//! - Parse `realm::region::az::domain` selectors from configuration text.
//! - Read the live deployment environment from `REALM`, `REGION`, `AZ`, `DOMAIN`.
//! - Decide whether a selector applies to an environment.
//!
//! Does NOT handle:
//! - Choosing between fragments that share a name (see `selection`).
//!
//! Invariants:
//! - Parsing never fails. A selector without exactly four components is kept
//!   as-is and never matches any environment.
//! - Matching is case-sensitive and reads the process environment on every
//!   call to `matches_current`; nothing is cached.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::constants::{
    ENV_AZ, ENV_DOMAIN, ENV_REALM, ENV_REGION, LOCALE_SEPARATOR, WILDCARD, WILDCARD_LOCALE,
};

/// The live `(realm, region, az, domain)` tuple of the running process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    pub realm: String,
    pub region: String,
    pub az: String,
    pub domain: String,
}

impl Environment {
    pub fn new(
        realm: impl Into<String>,
        region: impl Into<String>,
        az: impl Into<String>,
        domain: impl Into<String>,
    ) -> Self {
        Self {
            realm: realm.into(),
            region: region.into(),
            az: az.into(),
            domain: domain.into(),
        }
    }

    /// Read the environment variables verbatim. Unset variables are empty
    /// strings; values are not trimmed.
    pub fn from_process() -> Self {
        Self {
            realm: std::env::var(ENV_REALM).unwrap_or_default(),
            region: std::env::var(ENV_REGION).unwrap_or_default(),
            az: std::env::var(ENV_AZ).unwrap_or_default(),
            domain: std::env::var(ENV_DOMAIN).unwrap_or_default(),
        }
    }

    fn components(&self) -> [&str; 4] {
        [&self.realm, &self.region, &self.az, &self.domain]
    }
}

/// A parsed `realm::region::az::domain` selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleSpec {
    raw: String,
    components: Option<[String; 4]>,
}

impl LocaleSpec {
    /// Parse a selector. Malformed text produces a spec that never matches.
    pub fn parse(raw: &str) -> Self {
        let parts: Vec<&str> = raw.split(LOCALE_SEPARATOR).collect();
        let components = match parts.as_slice() {
            [realm, region, az, domain] => Some([
                realm.to_string(),
                region.to_string(),
                az.to_string(),
                domain.to_string(),
            ]),
            _ => None,
        };
        Self {
            raw: raw.to_string(),
            components,
        }
    }

    /// The selector that applies everywhere.
    pub fn wildcard() -> Self {
        Self::parse(WILDCARD_LOCALE)
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// True when the selector has exactly four components.
    pub fn is_valid(&self) -> bool {
        self.components.is_some()
    }

    /// True when every component is `*`.
    pub fn is_wildcard(&self) -> bool {
        self.specificity() == 0 && self.is_valid()
    }

    /// Number of literal (non-`*`) components; zero for malformed specs.
    pub fn specificity(&self) -> usize {
        self.components
            .as_ref()
            .map(|parts| parts.iter().filter(|part| part.as_str() != WILDCARD).count())
            .unwrap_or(0)
    }

    /// Component-wise comparison against `env`.
    pub fn matches(&self, env: &Environment) -> bool {
        let Some(parts) = &self.components else {
            return false;
        };
        parts
            .iter()
            .zip(env.components())
            .all(|(expected, actual)| expected == WILDCARD || expected == actual)
    }

    /// Match against the process environment as it is right now.
    pub fn matches_current(&self) -> bool {
        self.matches(&Environment::from_process())
    }
}

impl Default for LocaleSpec {
    fn default() -> Self {
        Self::wildcard()
    }
}

impl fmt::Display for LocaleSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for LocaleSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

/// A null or empty `locale` reads as absent, i.e. the wildcard.
impl<'de> Deserialize<'de> for LocaleSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw
            .filter(|raw| !raw.is_empty())
            .map(|raw| Self::parse(&raw))
            .unwrap_or_default())
    }
}
