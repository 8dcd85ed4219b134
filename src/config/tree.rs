//! Dotted-path access and layered merging over YAML trees.

use serde_yaml::{Mapping, Value};

/// Split a dotted key path into components.
pub fn split_key(key: &str) -> Vec<&str> {
    key.split('.').collect()
}

/// Render a mapping key as a path component.
pub fn key_component(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

fn child<'a>(node: &'a Value, part: &str) -> Option<&'a Value> {
    match node {
        Value::Mapping(map) => map.get(part),
        Value::Sequence(seq) => part.parse::<usize>().ok().and_then(|i| seq.get(i)),
        Value::Tagged(tagged) => child(&tagged.value, part),
        _ => None,
    }
}

fn child_mut<'a>(node: &'a mut Value, part: &str) -> Option<&'a mut Value> {
    match node {
        Value::Mapping(map) => map.get_mut(part),
        Value::Sequence(seq) => part.parse::<usize>().ok().and_then(|i| seq.get_mut(i)),
        Value::Tagged(tagged) => child_mut(&mut tagged.value, part),
        _ => None,
    }
}

/// Look up a node by path components.
pub fn get_path<'a, S: AsRef<str>>(root: &'a Value, parts: &[S]) -> Option<&'a Value> {
    parts
        .iter()
        .try_fold(root, |node, part| child(node, part.as_ref()))
}

/// Look up a node by dotted key.
pub fn get<'a>(root: &'a Value, key: &str) -> Option<&'a Value> {
    get_path(root, &split_key(key))
}

/// Whether a dotted key exists (a `null` value counts as present).
pub fn contains(root: &Value, key: &str) -> bool {
    get(root, key).is_some()
}

/// Insert a value at a path, creating intermediate mappings.
///
/// An intermediate node that is not a mapping is replaced by one.
pub fn insert_nested(map: &mut Mapping, parts: &[&str], value: Value) {
    let Some((first, rest)) = parts.split_first() else {
        return;
    };
    let key = Value::String((*first).to_string());

    if rest.is_empty() {
        map.insert(key, value);
        return;
    }

    let nested = map
        .entry(key)
        .or_insert_with(|| Value::Mapping(Mapping::new()));
    if !nested.is_mapping() {
        *nested = Value::Mapping(Mapping::new());
    }
    if let Value::Mapping(nested_map) = nested {
        insert_nested(nested_map, rest, value);
    }
}

/// Set a dotted key on a tree, creating intermediate mappings.
///
/// A non-mapping root is replaced by an empty mapping first. Sequence
/// elements are addressed by index and must already exist.
pub fn set(root: &mut Value, key: &str, value: Value) {
    let parts = split_key(key);
    if let Some((last, parents)) = parts.split_last()
        && let Some(Value::Sequence(seq)) = get_path_mut(root, parents)
        && let Ok(index) = last.parse::<usize>()
        && let Some(slot) = seq.get_mut(index)
    {
        *slot = value;
        return;
    }

    if !root.is_mapping() {
        *root = Value::Mapping(Mapping::new());
    }
    if let Value::Mapping(map) = root {
        insert_nested(map, &parts, value);
    }
}

fn get_path_mut<'a>(root: &'a mut Value, parts: &[&str]) -> Option<&'a mut Value> {
    parts
        .iter()
        .try_fold(root, |node, part| child_mut(node, part))
}

/// Remove a dotted key, returning the removed value.
pub fn remove(root: &mut Value, key: &str) -> Option<Value> {
    let parts = split_key(key);
    let (last, parents) = parts.split_last()?;
    match get_path_mut(root, parents)? {
        Value::Mapping(map) => map.shift_remove(*last),
        Value::Sequence(seq) => {
            let index = last.parse::<usize>().ok()?;
            (index < seq.len()).then(|| seq.remove(index))
        }
        _ => None,
    }
}

/// Merge `overlay` into `base`.
///
/// Mappings merge key by key; anything else in `overlay` replaces `base`.
pub fn merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}
