//! Flat `key=value` override strings.
//!
//! Responsibilities:
//! - Parse strings such as `key1=value1,key2=value2,slice[0]=value0` into a
//!   mapping of override values.
//! - Expand dotted keys (`cred.endpoint`) into a nested tree that can be merged
//!   onto a whole boot document.
//!
//! Does NOT handle:
//! - Merging the result into a base tree (see `merge`).
//!
//! Invariants:
//! - Values are always string scalars.
//! - `name[i]` addresses the `i`-th element of the sequence under `name`; gaps
//!   left by sparse indices are `Scalar(Null)` and so leave base elements
//!   untouched when merged.
//! - A single bracket level is supported. `name[i].field` nests `field` inside
//!   the element.
//! - Errors name the offending entry and key, never the value, since override
//!   values may carry credentials.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::value::Value;

/// Largest sequence index accepted in an override key.
pub const MAX_OVERRIDE_INDEX: usize = 1024;

/// Errors produced while parsing an override string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OverrideError {
    #[error("override entry {position} is empty")]
    EmptyEntry { position: usize },

    #[error("override entry {position} is missing '=' (key: {key})")]
    MissingSeparator { position: usize, key: String },

    #[error("override entry {position} has an empty key")]
    EmptyKey { position: usize },

    #[error("override entry {position} has a malformed key: {key}")]
    InvalidKey { position: usize, key: String },

    #[error("override entry {position} has a non-numeric index in key: {key}")]
    InvalidIndex { position: usize, key: String },

    #[error("override entry {position} index exceeds {max} in key: {key}")]
    IndexOutOfRange {
        position: usize,
        key: String,
        max: usize,
    },

    #[error("override key '{key}' is used both as a scalar and as a sequence")]
    ConflictingKey { key: String },
}

struct ParsedKey {
    name: String,
    index: Option<usize>,
    suffix: Vec<String>,
}

/// Parse a flat override string into a mapping.
pub fn parse_flat_overrides(input: &str) -> Result<BTreeMap<String, Value>, OverrideError> {
    let mut out = BTreeMap::new();
    if input.trim().is_empty() {
        return Ok(out);
    }

    for (position, entry) in input.split(',').enumerate() {
        let entry = entry.trim();
        if entry.is_empty() {
            return Err(OverrideError::EmptyEntry { position });
        }
        let Some((raw_key, raw_value)) = entry.split_once('=') else {
            return Err(OverrideError::MissingSeparator {
                position,
                key: entry.to_string(),
            });
        };
        let key = parse_key(raw_key.trim(), position)?;
        let value = Value::from(raw_value.trim());
        insert_entry(&mut out, key, value)?;
    }

    Ok(out)
}

fn parse_key(raw: &str, position: usize) -> Result<ParsedKey, OverrideError> {
    if raw.is_empty() {
        return Err(OverrideError::EmptyKey { position });
    }
    let invalid = || OverrideError::InvalidKey {
        position,
        key: raw.to_string(),
    };

    let Some((name, rest)) = raw.split_once('[') else {
        if raw.contains(']') {
            return Err(invalid());
        }
        return Ok(ParsedKey {
            name: raw.to_string(),
            index: None,
            suffix: Vec::new(),
        });
    };

    if name.is_empty() {
        return Err(OverrideError::EmptyKey { position });
    }
    let Some((index, tail)) = rest.split_once(']') else {
        return Err(invalid());
    };
    if name.contains(']') || index.contains('[') || tail.contains('[') || tail.contains(']') {
        return Err(invalid());
    }
    let index: usize = index
        .trim()
        .parse()
        .map_err(|_| OverrideError::InvalidIndex {
            position,
            key: raw.to_string(),
        })?;
    if index > MAX_OVERRIDE_INDEX {
        return Err(OverrideError::IndexOutOfRange {
            position,
            key: raw.to_string(),
            max: MAX_OVERRIDE_INDEX,
        });
    }

    let suffix = match tail {
        "" => Vec::new(),
        _ => {
            let Some(path) = tail.strip_prefix('.') else {
                return Err(invalid());
            };
            let segments: Vec<String> = path.split('.').map(str::to_string).collect();
            if segments.iter().any(String::is_empty) {
                return Err(invalid());
            }
            segments
        }
    };

    Ok(ParsedKey {
        name: name.to_string(),
        index: Some(index),
        suffix,
    })
}

fn insert_entry(
    out: &mut BTreeMap<String, Value>,
    key: ParsedKey,
    value: Value,
) -> Result<(), OverrideError> {
    let conflict = || OverrideError::ConflictingKey {
        key: key.name.clone(),
    };

    let Some(index) = key.index else {
        if matches!(out.get(&key.name), Some(Value::Sequence(_))) {
            return Err(conflict());
        }
        out.insert(key.name.clone(), value);
        return Ok(());
    };

    let slot = out
        .entry(key.name.clone())
        .or_insert_with(|| Value::Sequence(Vec::new()));
    let Value::Sequence(items) = slot else {
        return Err(conflict());
    };
    if items.len() <= index {
        items.resize(index + 1, Value::null());
    }

    let element = &mut items[index];
    if key.suffix.is_empty() {
        *element = value;
        return Ok(());
    }
    if element.is_null() {
        *element = Value::mapping();
    }
    let Value::Mapping(map) = element else {
        return Err(conflict());
    };
    insert_path(map, &key.suffix, value).map_err(|_| conflict())
}

fn insert_path(
    map: &mut BTreeMap<String, Value>,
    segments: &[String],
    value: Value,
) -> Result<(), ()> {
    let Some((last, parents)) = segments.split_last() else {
        return Err(());
    };
    let mut current = map;
    for segment in parents {
        let next = current
            .entry(segment.clone())
            .or_insert_with(Value::mapping);
        let Value::Mapping(inner) = next else {
            return Err(());
        };
        current = inner;
    }
    match current.get(last) {
        Some(Value::Mapping(_)) => Err(()),
        _ => {
            current.insert(last.clone(), value);
            Ok(())
        }
    }
}

/// Expand dotted keys of a parsed override mapping into a nested tree.
///
/// `{"cred.endpoint": "x"}` becomes `{cred: {endpoint: "x"}}`.
pub fn expand_dotted(flat: &BTreeMap<String, Value>) -> Result<Value, OverrideError> {
    let mut root = BTreeMap::new();
    for (key, value) in flat {
        let segments: Vec<String> = key.split('.').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(OverrideError::InvalidKey {
                position: 0,
                key: key.clone(),
            });
        }
        insert_path(&mut root, &segments, value.clone())
            .map_err(|_| OverrideError::ConflictingKey { key: key.clone() })?;
    }
    Ok(Value::Mapping(root))
}
