//! Deep merge of a default value tree with a user-supplied override tree.
//!
//! Responsibilities:
//! - Combine layered configuration without losing fields the override does
//!   not mention.
//!
//! Does NOT handle:
//! - Producing override trees from flat strings (see `overrides`).
//!
//! Invariants:
//! - The override tree is never mutated.
//! - An absent override, or a `Scalar(Null)` override node, leaves the base as-is.
//! - Mapping keys only in the base are preserved; keys in the override replace
//!   or recursively merge; keys only in the override are added.
//! - Sequences and records merge by position. A positional element whose shape
//!   differs from the base element is discarded with a warning; merging never
//!   panics on heterogeneous input.
//! - Outside sequences and records, a shape change replaces the base node,
//!   except that a record is only ever merged with a record of the same kind.

use tracing::warn;

use crate::value::{Record, Scalar, Value};

/// Merge `overlay` into `base` in place.
pub fn merge(base: &mut Value, overlay: Option<&Value>) {
    if let Some(overlay) = overlay {
        merge_node(base, overlay, "$");
    }
}

/// Return a merged copy of `base`.
pub fn merged(base: &Value, overlay: Option<&Value>) -> Value {
    let mut out = base.clone();
    merge(&mut out, overlay);
    out
}

fn merge_node(base: &mut Value, overlay: &Value, path: &str) {
    if overlay.is_null() {
        return;
    }

    match (&mut *base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                if value.is_null() {
                    continue;
                }
                match base_map.get_mut(key) {
                    Some(existing) => merge_node(existing, value, &format!("{path}.{key}")),
                    None => {
                        base_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (Value::Sequence(base_items), Value::Sequence(overlay_items)) => {
            merge_sequence(base_items, overlay_items, path);
        }
        (Value::Record(base_record), Value::Record(overlay_record))
            if base_record.kind == overlay_record.kind =>
        {
            merge_record(base_record, overlay_record, path);
        }
        (Value::Record(base_record), other) => {
            warn!(
                path,
                base = %base_record.kind,
                override_kind = other.kind(),
                "Discarding override for record with mismatched type"
            );
        }
        (slot, other) => *slot = other.clone(),
    }
}

fn merge_sequence(base: &mut Vec<Value>, overlay: &[Value], path: &str) {
    for (index, item) in overlay.iter().enumerate() {
        let item_path = format!("{path}[{index}]");
        match base.get_mut(index) {
            Some(_) if item.is_null() => {}
            Some(existing) if same_shape(existing, item) => {
                merge_node(existing, item, &item_path);
            }
            Some(existing) => {
                warn!(
                    path = %item_path,
                    base = existing.kind(),
                    override_kind = item.kind(),
                    "Discarding sequence element with mismatched type"
                );
            }
            None => base.push(item.clone()),
        }
    }
}

fn merge_record(base: &mut Record, overlay: &Record, path: &str) {
    for (index, (name, item)) in overlay.fields.iter().enumerate() {
        let field_path = format!("{path}.{name}");
        match base.fields.get_mut(index) {
            Some(_) if item.is_null() => {}
            Some((base_name, existing))
                if base_name.as_str() == name.as_str() && same_shape(existing, item) =>
            {
                merge_node(existing, item, &field_path);
            }
            Some((base_name, existing)) => {
                warn!(
                    path = %field_path,
                    base_field = %base_name,
                    base = existing.kind(),
                    override_kind = item.kind(),
                    "Discarding record field with mismatched name or type"
                );
            }
            None => {
                warn!(
                    path = %field_path,
                    record = %base.kind,
                    "Discarding record field not present in base"
                );
            }
        }
    }
}

fn same_shape(base: &Value, overlay: &Value) -> bool {
    match (base, overlay) {
        (Value::Scalar(Scalar::Null), _) => true,
        (Value::Scalar(a), Value::Scalar(b)) => a.kind() == b.kind(),
        (Value::Sequence(_), Value::Sequence(_)) => true,
        (Value::Mapping(_), Value::Mapping(_)) => true,
        (Value::Record(a), Value::Record(b)) => a.kind == b.kind,
        _ => false,
    }
}
