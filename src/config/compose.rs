//! Layered config composition: defaults list, primary file, group selection.

use crate::config::overrides::{Override, OverrideKind};
use crate::config::tree;
use crate::constants::{CONFIG_EXTENSION, keys};
use crate::error::{Error, Result};
use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};
use tracing::debug;

/// One entry of a `defaults:` list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultEntry {
    /// Position of the primary file's own content.
    SelfMarker,
    /// A config file merged at the root.
    Root(String),
    /// A group option merged under the group key; `None` disables the group.
    Group {
        /// Group name (a sub-directory of the config directory).
        group: String,
        /// Selected option file name.
        option: Option<String>,
    },
}

/// Path of a config file inside the config directory, adding `.yaml` if absent.
pub fn config_file(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    if path.extension().is_some_and(|ext| ext == CONFIG_EXTENSION) {
        path
    } else {
        dir.join(format!("{name}.{CONFIG_EXTENSION}"))
    }
}

/// Load a YAML config file. An empty file is an empty mapping.
pub fn load_yaml(path: &Path) -> Result<Value> {
    if !path.is_file() {
        return Err(Error::ConfigNotFound {
            path: path.to_path_buf(),
        });
    }

    let contents = std::fs::read_to_string(path).map_err(|e| Error::ConfigRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let value: Value = serde_yaml::from_str(&contents).map_err(|e| Error::ConfigParse {
        path: path.to_path_buf(),
        source: e,
    })?;

    match value {
        Value::Null => Ok(Value::Mapping(Mapping::new())),
        Value::Mapping(_) => Ok(value),
        _ => Err(Error::ConfigValidation {
            message: format!("{} must contain a mapping at the top level", path.display()),
        }),
    }
}

/// Parse the `defaults:` list of a primary config.
pub fn parse_defaults(value: Option<&Value>, path: &Path) -> Result<Vec<DefaultEntry>> {
    let invalid = |detail: String| Error::ConfigValidation {
        message: format!("invalid defaults list in {}: {detail}", path.display()),
    };

    let Some(value) = value else {
        return Ok(Vec::new());
    };
    let Value::Sequence(items) = value else {
        return Err(invalid("expected a list".to_string()));
    };

    items
        .iter()
        .map(|item| match item {
            Value::String(name) if name == keys::SELF_MARKER => Ok(DefaultEntry::SelfMarker),
            Value::String(name) => Ok(DefaultEntry::Root(name.clone())),
            Value::Mapping(map) if map.len() == 1 => {
                let (group, option) = map
                    .iter()
                    .next()
                    .ok_or_else(|| invalid("empty entry".to_string()))?;
                let Value::String(group) = group else {
                    return Err(invalid("group names must be strings".to_string()));
                };
                let option = match option {
                    Value::Null => None,
                    Value::String(s) => Some(s.clone()),
                    other => Some(tree::key_component(other)),
                };
                Ok(DefaultEntry::Group {
                    group: group.clone(),
                    option,
                })
            }
            other => Err(invalid(format!("unsupported entry {other:?}"))),
        })
        .collect()
}

/// Result of composing the layered files.
#[derive(Debug)]
pub struct Composition<'a> {
    /// Merged tree, before value overrides and interpolation.
    pub tree: Value,
    /// Overrides that were not consumed as group selections.
    pub remaining: Vec<&'a Override>,
}

/// Compose `<dir>/<name>.yaml` with its defaults list.
///
/// Top-level overrides naming a defaults group (`group=option`) select a
/// different option file; `+group=option` appends a group that has a
/// sub-directory in `dir`. All other overrides are returned untouched.
pub fn compose<'a>(dir: &Path, name: &str, overrides: &'a [Override]) -> Result<Composition<'a>> {
    let primary_path = config_file(dir, name);
    let mut primary = load_yaml(&primary_path)?;
    debug!("Loading primary config: {}", primary_path.display());

    let defaults_value = match &mut primary {
        Value::Mapping(map) => map.shift_remove(keys::DEFAULTS),
        _ => None,
    };
    let mut entries = parse_defaults(defaults_value.as_ref(), &primary_path)?;

    let mut remaining = Vec::new();
    for o in overrides {
        if !select_group(&mut entries, dir, o) {
            remaining.push(o);
        }
    }

    if !entries.contains(&DefaultEntry::SelfMarker) {
        entries.push(DefaultEntry::SelfMarker);
    }

    let mut composed = Value::Mapping(Mapping::new());
    let mut primary = Some(primary);
    for entry in &entries {
        match entry {
            DefaultEntry::SelfMarker => {
                if let Some(own) = primary.take() {
                    tree::merge(&mut composed, own);
                }
            }
            DefaultEntry::Root(file) => {
                let path = config_file(dir, file);
                debug!("Merging config: {}", path.display());
                tree::merge(&mut composed, load_yaml(&path)?);
            }
            DefaultEntry::Group {
                group,
                option: Some(option),
            } => {
                let path = config_file(&dir.join(group), option);
                debug!("Merging group '{group}': {}", path.display());
                let mut wrapped = Value::Mapping(Mapping::new());
                tree::set(&mut wrapped, &group.replace('/', "."), load_yaml(&path)?);
                tree::merge(&mut composed, wrapped);
            }
            DefaultEntry::Group { option: None, .. } => {}
        }
    }

    if let Value::Mapping(map) = &mut composed {
        map.shift_remove(keys::FRAMEWORK);
    }

    Ok(Composition {
        tree: composed,
        remaining,
    })
}

/// Try to consume an override as a group selection.
fn select_group(entries: &mut Vec<DefaultEntry>, dir: &Path, o: &Override) -> bool {
    if !o.is_top_level() || o.kind == OverrideKind::Delete {
        return false;
    }
    let option = match &o.value {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Null) => None,
        _ => return false,
    };

    let position = entries.iter().position(
        |entry| matches!(entry, DefaultEntry::Group { group, .. } if *group == o.key),
    );

    match (position, o.kind) {
        (Some(index), OverrideKind::Set | OverrideKind::ForceAdd) => {
            if let Some(DefaultEntry::Group { option: slot, .. }) = entries.get_mut(index) {
                *slot = option;
            }
            true
        }
        (None, OverrideKind::Add | OverrideKind::ForceAdd) if dir.join(&o.key).is_dir() => {
            entries.push(DefaultEntry::Group {
                group: o.key.clone(),
                option,
            });
            true
        }
        _ => false,
    }
}
