//! Command-line `key=value` overrides.

use crate::config::tree;
use crate::error::{Error, Result};
use serde_yaml::Value;
use std::fmt;
use std::str::FromStr;

/// How an override treats the target key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideKind {
    /// `key=value`: the key must already exist.
    Set,
    /// `+key=value`: the key must not exist yet.
    Add,
    /// `++key=value`: add or replace.
    ForceAdd,
    /// `~key` or `~key=value`: remove the key.
    Delete,
}

/// A single parsed override.
#[derive(Debug, Clone, PartialEq)]
pub struct Override {
    /// Override semantics.
    pub kind: OverrideKind,
    /// Dotted key path.
    pub key: String,
    /// Parsed value; `None` only for a bare delete.
    pub value: Option<Value>,
    text: String,
}

impl Override {
    /// The override exactly as written.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the key has a single component (candidate for group selection).
    pub fn is_top_level(&self) -> bool {
        !self.key.contains('.')
    }

    /// Apply this override to a composed tree.
    pub fn apply(&self, root: &mut Value) -> Result<()> {
        let exists = tree::contains(root, &self.key);
        match self.kind {
            OverrideKind::Set => {
                if !exists {
                    return Err(self.reject(format!(
                        "key not found in config, use +{}=... to add it",
                        self.key
                    )));
                }
                tree::set(root, &self.key, self.value.clone().unwrap_or(Value::Null));
            }
            OverrideKind::Add => {
                if exists {
                    return Err(self.reject(format!(
                        "key already exists, use ++{}=... to replace it",
                        self.key
                    )));
                }
                tree::set(root, &self.key, self.value.clone().unwrap_or(Value::Null));
            }
            OverrideKind::ForceAdd => {
                tree::set(root, &self.key, self.value.clone().unwrap_or(Value::Null));
            }
            OverrideKind::Delete => {
                let current = tree::get(root, &self.key)
                    .ok_or_else(|| self.reject("key not found in config".to_string()))?;
                if let Some(expected) = &self.value
                    && current != expected
                {
                    return Err(self.reject(format!(
                        "current value does not match '{}'",
                        render_scalar(expected)
                    )));
                }
                tree::remove(root, &self.key);
            }
        }
        Ok(())
    }

    fn reject(&self, reason: String) -> Error {
        Error::ConfigOverride {
            text: self.text.clone(),
            reason,
        }
    }
}

impl fmt::Display for Override {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl FromStr for Override {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (kind, rest) = if let Some(rest) = s.strip_prefix("++") {
            (OverrideKind::ForceAdd, rest)
        } else if let Some(rest) = s.strip_prefix('+') {
            (OverrideKind::Add, rest)
        } else if let Some(rest) = s.strip_prefix('~') {
            (OverrideKind::Delete, rest)
        } else {
            (OverrideKind::Set, s)
        };

        let (key, raw_value) = match rest.split_once('=') {
            Some((key, value)) => (key.trim(), Some(value)),
            None if kind == OverrideKind::Delete => (rest.trim(), None),
            None => return Err(format!("'{s}' is not of the form key=value")),
        };

        validate_key(key).map_err(|reason| format!("'{s}': {reason}"))?;

        Ok(Self {
            kind,
            key: key.to_string(),
            value: raw_value.map(parse_value),
            text: s.to_string(),
        })
    }
}

fn validate_key(key: &str) -> std::result::Result<(), String> {
    if key.is_empty() {
        return Err("key is empty".to_string());
    }
    if key.split('.').any(str::is_empty) {
        return Err(format!("key '{key}' has an empty component"));
    }
    if let Some(c) = key
        .chars()
        .find(|c| !(c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '/' | '@')))
    {
        return Err(format!("key '{key}' contains invalid character '{c}'"));
    }
    Ok(())
}

/// Parse an override value as a YAML scalar or flow collection.
///
/// An empty value is the empty string; text that is not valid YAML is kept
/// as a plain string.
pub fn parse_value(raw: &str) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Value::String(String::new());
    }
    serde_yaml::from_str(trimmed).unwrap_or_else(|_| Value::String(trimmed.to_string()))
}

/// Render a scalar for messages and string concatenation.
pub fn render_scalar(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn yaml(s: &str) -> Value {
        serde_yaml::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_kinds() {
        let o: Override = "exp_name=run1".parse().unwrap();
        assert_eq!(o.kind, OverrideKind::Set);
        assert_eq!(o.key, "exp_name");
        assert_eq!(o.value, Some(Value::from("run1")));

        let o: Override = "+dataset.extra=1".parse().unwrap();
        assert_eq!(o.kind, OverrideKind::Add);

        let o: Override = "++work_dir=/tmp/w".parse().unwrap();
        assert_eq!(o.kind, OverrideKind::ForceAdd);

        let o: Override = "~dataset.factor".parse().unwrap();
        assert_eq!(o.kind, OverrideKind::Delete);
        assert_eq!(o.value, None);
    }

    #[test]
    fn test_parse_typed_values() {
        let o: Override = "dataset.factor=2".parse().unwrap();
        assert_eq!(o.value, Some(Value::from(2)));
        let o: Override = "dataset.factor=0.5".parse().unwrap();
        assert_eq!(o.value, Some(Value::from(0.5)));
        let o: Override = "flag=true".parse().unwrap();
        assert_eq!(o.value, Some(Value::from(true)));
        let o: Override = "name=".parse().unwrap();
        assert_eq!(o.value, Some(Value::from("")));
        let o: Override = "list=[1, 2]".parse().unwrap();
        assert_eq!(o.value, Some(yaml("[1, 2]")));
        let o: Override = "path=${base_dir}/x".parse().unwrap();
        assert_eq!(o.value, Some(Value::from("${base_dir}/x")));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!("no_equals".parse::<Override>().is_err());
        assert!("=value".parse::<Override>().is_err());
        assert!("a..b=1".parse::<Override>().is_err());
        assert!("a b=1".parse::<Override>().is_err());
    }

    #[test]
    fn test_set_requires_existing_key() {
        let mut root = yaml("exp_name: base\n");
        let o: Override = "exp_name=run1".parse().unwrap();
        o.apply(&mut root).unwrap();
        assert_eq!(tree::get(&root, "exp_name"), Some(&Value::from("run1")));

        let o: Override = "missing=1".parse().unwrap();
        assert!(matches!(
            o.apply(&mut root),
            Err(Error::ConfigOverride { .. })
        ));
    }

    #[test]
    fn test_add_and_force_add() {
        let mut root = yaml("a: 1\n");
        let add: Override = "+b.c=2".parse().unwrap();
        add.apply(&mut root).unwrap();
        assert_eq!(tree::get(&root, "b.c"), Some(&Value::from(2)));
        assert!(add.apply(&mut root).is_err());

        let force: Override = "++b.c=3".parse().unwrap();
        force.apply(&mut root).unwrap();
        assert_eq!(tree::get(&root, "b.c"), Some(&Value::from(3)));
    }

    #[test]
    fn test_delete() {
        let mut root = yaml("a: 1\nb: 2\n");
        let o: Override = "~a".parse().unwrap();
        o.apply(&mut root).unwrap();
        assert_eq!(root, yaml("b: 2\n"));
        assert!(o.apply(&mut root).is_err());

        let mismatch: Override = "~b=3".parse().unwrap();
        assert!(mismatch.apply(&mut root).is_err());
        let matching: Override = "~b=2".parse().unwrap();
        matching.apply(&mut root).unwrap();
    }
}
