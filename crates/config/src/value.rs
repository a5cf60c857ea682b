//! Generic configuration value tree.
//!
//! Responsibilities:
//! - Represent configuration nodes as a closed set of shapes so the merge
//!   engine never has to inspect types at runtime.
//! - Convert between `serde_yaml::Value` and [`Value`], including YAML tagged
//!   nodes (`!Kind {..}`), which become [`Record`]s.
//!
//! Does NOT handle:
//! - Merging trees (see `merge`).
//! - Parsing flat `key=value` override strings (see `overrides`).
//!
//! Invariants:
//! - Mapping keys are strings. Non-string YAML keys are rendered to their YAML
//!   text form during conversion.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde_yaml::value::{Tag, TaggedValue};

/// A leaf value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl Scalar {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
        }
    }
}

/// A structured record: a tagged node with ordered, named fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub kind: String,
    pub fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.fields.push((name.into(), value));
        self
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }
}

/// A configuration node.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(Scalar),
    Sequence(Vec<Value>),
    Mapping(BTreeMap<String, Value>),
    Record(Record),
}

impl Default for Value {
    fn default() -> Self {
        Self::Scalar(Scalar::Null)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Scalar(Scalar::String(value.to_string()))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Scalar(Scalar::String(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Scalar(Scalar::Int(value))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Scalar(Scalar::Bool(value))
    }
}

impl Value {
    pub fn null() -> Self {
        Self::Scalar(Scalar::Null)
    }

    pub fn mapping() -> Self {
        Self::Mapping(BTreeMap::new())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Scalar(Scalar::Null))
    }

    /// Name of the node's shape, used in merge diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Scalar(scalar) => scalar.kind(),
            Self::Sequence(_) => "sequence",
            Self::Mapping(_) => "mapping",
            Self::Record(_) => "record",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Self::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a key when this node is a mapping.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_mapping().and_then(|map| map.get(key))
    }

    /// Parse YAML text into a value tree.
    pub fn from_yaml_str(text: &str) -> Result<Self, serde_yaml::Error> {
        let yaml: serde_yaml::Value = serde_yaml::from_str(text)?;
        Ok(Self::from_yaml(yaml))
    }

    pub fn from_yaml(yaml: serde_yaml::Value) -> Self {
        match yaml {
            serde_yaml::Value::Null => Self::null(),
            serde_yaml::Value::Bool(b) => Self::Scalar(Scalar::Bool(b)),
            serde_yaml::Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Scalar(Scalar::Int(i)),
                None => Self::Scalar(Scalar::Float(n.as_f64().unwrap_or(f64::NAN))),
            },
            serde_yaml::Value::String(s) => Self::Scalar(Scalar::String(s)),
            serde_yaml::Value::Sequence(items) => {
                Self::Sequence(items.into_iter().map(Self::from_yaml).collect())
            }
            serde_yaml::Value::Mapping(map) => Self::Mapping(
                map.into_iter()
                    .map(|(key, value)| (yaml_key(key), Self::from_yaml(value)))
                    .collect(),
            ),
            serde_yaml::Value::Tagged(tagged) => {
                let TaggedValue { tag, value } = *tagged;
                let kind = tag.to_string().trim_start_matches('!').to_string();
                let fields = match value {
                    serde_yaml::Value::Mapping(map) => map
                        .into_iter()
                        .map(|(key, value)| (yaml_key(key), Self::from_yaml(value)))
                        .collect(),
                    other => vec![(String::new(), Self::from_yaml(other))],
                };
                Self::Record(Record { kind, fields })
            }
        }
    }

    pub fn into_yaml(self) -> serde_yaml::Value {
        match self {
            Self::Scalar(Scalar::Null) => serde_yaml::Value::Null,
            Self::Scalar(Scalar::Bool(b)) => serde_yaml::Value::Bool(b),
            Self::Scalar(Scalar::Int(i)) => serde_yaml::Value::Number(i.into()),
            Self::Scalar(Scalar::Float(f)) => serde_yaml::Value::Number(f.into()),
            Self::Scalar(Scalar::String(s)) => serde_yaml::Value::String(s),
            Self::Sequence(items) => {
                serde_yaml::Value::Sequence(items.into_iter().map(Self::into_yaml).collect())
            }
            Self::Mapping(map) => serde_yaml::Value::Mapping(
                map.into_iter()
                    .map(|(key, value)| (serde_yaml::Value::String(key), value.into_yaml()))
                    .collect(),
            ),
            Self::Record(Record { kind, fields }) => {
                let value = match fields.as_slice() {
                    [(name, _)] if name.is_empty() => fields
                        .into_iter()
                        .next()
                        .map(|(_, value)| value.into_yaml())
                        .unwrap_or(serde_yaml::Value::Null),
                    _ => serde_yaml::Value::Mapping(
                        fields
                            .into_iter()
                            .map(|(key, value)| {
                                (serde_yaml::Value::String(key), value.into_yaml())
                            })
                            .collect(),
                    ),
                };
                let kind = if kind.is_empty() { "record".to_string() } else { kind };
                serde_yaml::Value::Tagged(Box::new(TaggedValue {
                    tag: Tag::new(kind),
                    value,
                }))
            }
        }
    }

    /// Deserialize the tree into a typed configuration struct.
    pub fn deserialize_into<T: DeserializeOwned>(self) -> Result<T, serde_yaml::Error> {
        serde_yaml::from_value(self.into_yaml())
    }
}

fn yaml_key(key: serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s,
        other => serde_yaml::to_string(&other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_yaml_shapes() {
        let value = Value::from_yaml_str(
            r#"
name: demo
port: 8080
ratio: 0.5
enabled: true
empty: ~
paths: [a, b]
"#,
        )
        .unwrap();

        assert_eq!(value.get("name"), Some(&Value::from("demo")));
        assert_eq!(value.get("port"), Some(&Value::from(8080)));
        assert_eq!(
            value.get("ratio"),
            Some(&Value::Scalar(Scalar::Float(0.5)))
        );
        assert_eq!(value.get("enabled"), Some(&Value::from(true)));
        assert!(value.get("empty").unwrap().is_null());
        assert_eq!(
            value.get("paths").and_then(Value::as_sequence).map(<[_]>::len),
            Some(2)
        );
    }

    #[test]
    fn test_tagged_node_becomes_record() {
        let value = Value::from_yaml_str("tls: !Tls {cert: a.pem, key: b.pem}").unwrap();
        let Some(Value::Record(record)) = value.get("tls") else {
            panic!("expected record, got {value:?}");
        };
        assert_eq!(record.kind, "Tls");
        assert_eq!(record.fields[0].0, "cert");
        assert_eq!(record.field("key"), Some(&Value::from("b.pem")));
    }

    #[test]
    fn test_non_string_keys_are_rendered() {
        let value = Value::from_yaml_str("1: one\ntrue: yes").unwrap();
        assert_eq!(value.get("1"), Some(&Value::from("one")));
        assert!(value.get("true").is_some());
    }

    #[test]
    fn test_deserialize_into_struct() {
        #[derive(serde::Deserialize)]
        struct Demo {
            name: String,
            paths: Vec<String>,
        }

        let value = Value::from_yaml_str("name: demo\npaths: [a]").unwrap();
        let demo: Demo = value.deserialize_into().unwrap();
        assert_eq!(demo.name, "demo");
        assert_eq!(demo.paths, vec!["a".to_string()]);
    }

    #[test]
    fn test_record_yaml_conversion_keeps_tag() {
        let record = Record::new("Tls").with_field("cert", Value::from("a.pem"));
        let yaml = Value::Record(record.clone()).into_yaml();
        assert_eq!(Value::from_yaml(yaml), Value::Record(record));
    }
}
