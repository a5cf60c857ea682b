//! Credential types carried by boot configuration.
//!
//! Responsibilities:
//! - Parse `user:pass` basic-auth strings.
//! - Hold passwords and KV tokens as `secrecy::SecretString`.
//!
//! Does NOT handle:
//! - Sending credentials on the wire (see the client crate).
//!
//! Invariants:
//! - `Debug` and `Serialize` never expose the password or token; serialized
//!   forms carry `[REDACTED]` in their place.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Placeholder written wherever a secret would otherwise be serialized.
pub const REDACTED: &str = "[REDACTED]";

/// Serde helpers for optional secret strings.
pub(crate) mod secret_string {
    use secrecy::SecretString;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::REDACTED;

    pub fn serialize<S>(secret: &Option<SecretString>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match secret {
            Some(_) => serializer.serialize_str(REDACTED),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(value
            .filter(|s| !s.is_empty())
            .map(|s| SecretString::new(s.into())))
    }
}

/// Serde helper for an optional `basicAuth`; null and empty strings are unset.
pub(crate) mod optional_basic_auth {
    use serde::{Deserialize, Deserializer};

    use super::BasicAuth;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<BasicAuth>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) if !raw.is_empty() => BasicAuth::parse(&raw).map(Some).ok_or_else(|| {
                serde::de::Error::custom("basicAuth must have the form <user>:<pass>")
            }),
            _ => Ok(None),
        }
    }
}

/// HTTP basic-auth credentials parsed from `user:pass`.
#[derive(Clone)]
pub struct BasicAuth {
    pub username: String,
    pub password: SecretString,
}

impl BasicAuth {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::new(password.into().into()),
        }
    }

    /// Parse `user:pass`. The password may itself contain `:`.
    pub fn parse(raw: &str) -> Option<Self> {
        let (username, password) = raw.split_once(':')?;
        Some(Self::new(username, password))
    }

    pub fn password(&self) -> &str {
        self.password.expose_secret()
    }
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &REDACTED)
            .finish()
    }
}

impl Serialize for BasicAuth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{}:{REDACTED}", self.username))
    }
}

impl<'de> Deserialize<'de> for BasicAuth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom("basicAuth must have the form <user>:<pass>"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_splits_at_first_colon() {
        let auth = BasicAuth::parse("admin:pa:ss").unwrap();
        assert_eq!(auth.username, "admin");
        assert_eq!(auth.password(), "pa:ss");
    }

    #[test]
    fn test_parse_requires_colon() {
        assert!(BasicAuth::parse("admin").is_none());
    }

    #[test]
    fn test_empty_password_is_allowed() {
        let auth = BasicAuth::parse("admin:").unwrap();
        assert_eq!(auth.password(), "");
    }

    #[test]
    fn test_debug_does_not_expose_password() {
        let auth = BasicAuth::new("admin", "basic-secret-987");
        let debug_output = format!("{:?}", auth);
        assert!(!debug_output.contains("basic-secret-987"));
        assert!(debug_output.contains("admin"));
    }

    #[test]
    fn test_serialize_redacts_password() {
        let auth = BasicAuth::new("admin", "basic-secret-987");
        let yaml = serde_yaml::to_string(&auth).unwrap();
        assert!(!yaml.contains("basic-secret-987"));
        assert!(yaml.contains("admin:[REDACTED]"));
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct WithAuth {
        #[serde(default, deserialize_with = "optional_basic_auth::deserialize")]
        basic_auth: Option<BasicAuth>,
    }

    #[test]
    fn test_optional_basic_auth_empty_or_null_is_unset() {
        for yaml in ["basicAuth: \"\"", "basicAuth: ~", "{}"] {
            let parsed: WithAuth = serde_yaml::from_str(yaml).unwrap();
            assert!(parsed.basic_auth.is_none(), "{yaml} should leave basicAuth unset");
        }
    }

    #[test]
    fn test_optional_basic_auth_still_rejects_malformed() {
        let result: Result<WithAuth, _> = serde_yaml::from_str("basicAuth: justuser");
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_rejects_missing_colon() {
        let result: Result<BasicAuth, _> = serde_yaml::from_str("\"justuser\"");
        assert!(result.is_err());
    }
}
