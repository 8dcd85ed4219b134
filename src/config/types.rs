//! Typed view over a resolved configuration.

use crate::config::tree;
use crate::constants::keys;
use crate::error::{Error, Result};
use serde_yaml::Value;
use std::path::{Path, PathBuf};

/// A fully resolved, immutable run configuration.
///
/// The complete tree is kept for the runtime snapshot; the keys the launcher
/// itself needs are extracted and validated up front.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    tree: Value,
    dataset_name: String,
    case_name: String,
    exp_name: String,
    factor: f64,
    work_dir: Option<PathBuf>,
}

impl RunConfig {
    /// Build from a resolved tree, checking the required keys.
    pub fn from_resolved(tree: Value) -> Result<Self> {
        let dataset_name = required_name(&tree, keys::DATASET_NAME)?;
        let case_name = required_name(&tree, keys::CASE_NAME)?;
        let exp_name = required_name(&tree, keys::EXP_NAME)?;
        let factor = required_factor(&tree)?;
        let work_dir = match tree::get(&tree, keys::WORK_DIR) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.is_empty() => None,
            Some(Value::String(s)) => Some(PathBuf::from(s)),
            Some(other) => {
                return Err(Error::ConfigValidation {
                    message: format!("work_dir must be a string, got {other:?}"),
                });
            }
        };

        Ok(Self {
            tree,
            dataset_name,
            case_name,
            exp_name,
            factor,
            work_dir,
        })
    }

    /// The complete resolved tree.
    pub fn tree(&self) -> &Value {
        &self.tree
    }

    /// Dataset name.
    pub fn dataset_name(&self) -> &str {
        &self.dataset_name
    }

    /// Case name.
    pub fn case_name(&self) -> &str {
        &self.case_name
    }

    /// Experiment name.
    pub fn exp_name(&self) -> &str {
        &self.exp_name
    }

    /// Image downsampling factor (always finite and positive).
    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Explicit working directory, if configured.
    pub fn work_dir(&self) -> Option<&Path> {
        self.work_dir.as_deref()
    }

    /// Base directory for this run: `work_dir`, or `fallback` when unset.
    ///
    /// A relative `work_dir` is taken relative to `fallback`.
    pub fn base_dir(&self, fallback: &Path) -> PathBuf {
        self.work_dir
            .as_ref()
            .map_or_else(|| fallback.to_path_buf(), |dir| fallback.join(dir))
    }
}

fn required<'a>(tree: &'a Value, key: &str) -> Result<&'a Value> {
    match tree::get(tree, key) {
        None | Some(Value::Null) => Err(Error::ConfigMissing {
            key: key.to_string(),
        }),
        Some(value) => Ok(value),
    }
}

fn required_name(tree: &Value, key: &str) -> Result<String> {
    let name = match required(tree, key)? {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        other => {
            return Err(Error::ConfigValidation {
                message: format!("{key} must be a string, got {other:?}"),
            });
        }
    };

    if name.is_empty() {
        return Err(Error::ConfigValidation {
            message: format!("{key} must not be empty"),
        });
    }
    Ok(name)
}

fn required_factor(tree: &Value) -> Result<f64> {
    let value = required(tree, keys::DATASET_FACTOR)?;
    let factor = value.as_f64().ok_or_else(|| Error::ConfigValidation {
        message: format!("{} must be a number, got {value:?}", keys::DATASET_FACTOR),
    })?;

    if !factor.is_finite() || factor <= 0.0 {
        return Err(Error::ConfigValidation {
            message: format!(
                "{} must be a positive number, got {factor}",
                keys::DATASET_FACTOR
            ),
        });
    }
    Ok(factor)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    fn yaml(s: &str) -> Value {
        serde_yaml::from_str(s).unwrap()
    }

    const VALID: &str = "dataset_name: nerf_synthetic\ncase_name: lego\nexp_name: base\ndataset:\n  factor: 2\n";

    #[test]
    fn test_from_resolved_extracts_fields() {
        let config = RunConfig::from_resolved(yaml(VALID)).unwrap();
        assert_eq!(config.dataset_name(), "nerf_synthetic");
        assert_eq!(config.case_name(), "lego");
        assert_eq!(config.exp_name(), "base");
        assert_eq!(config.factor(), 2.0);
        assert!(config.work_dir().is_none());
    }

    #[test]
    fn test_missing_keys_are_reported_by_name() {
        for key in ["dataset_name", "case_name", "exp_name", "dataset.factor"] {
            let mut tree = yaml(VALID);
            tree::remove(&mut tree, key);
            let err = RunConfig::from_resolved(tree).unwrap_err();
            assert!(
                matches!(&err, Error::ConfigMissing { key: k } if k == key),
                "unexpected error for {key}: {err}"
            );
        }
    }

    #[test]
    fn test_null_counts_as_missing() {
        let mut tree = yaml(VALID);
        tree::set(&mut tree, "case_name", Value::Null);
        assert!(matches!(
            RunConfig::from_resolved(tree),
            Err(Error::ConfigMissing { .. })
        ));
    }

    #[test]
    fn test_numeric_names_are_accepted() {
        let mut tree = yaml(VALID);
        tree::set(&mut tree, "case_name", Value::from(24));
        let config = RunConfig::from_resolved(tree).unwrap();
        assert_eq!(config.case_name(), "24");
    }

    #[test]
    fn test_factor_must_be_positive_number() {
        for bad in ["0", "-1", "four", ".nan"] {
            let mut tree = yaml(VALID);
            tree::set(&mut tree, "dataset.factor", yaml(bad));
            assert!(matches!(
                RunConfig::from_resolved(tree),
                Err(Error::ConfigValidation { .. })
            ));
        }
    }

    #[test]
    fn test_base_dir_prefers_work_dir() {
        let fallback = Path::new("/cwd");
        let config = RunConfig::from_resolved(yaml(VALID)).unwrap();
        assert_eq!(config.base_dir(fallback), PathBuf::from("/cwd"));

        let mut tree = yaml(VALID);
        tree::set(&mut tree, "work_dir", Value::from("/srv/recon"));
        let config = RunConfig::from_resolved(tree).unwrap();
        assert_eq!(config.base_dir(fallback), PathBuf::from("/srv/recon"));

        let mut tree = yaml(VALID);
        tree::set(&mut tree, "work_dir", Value::from("rel"));
        let config = RunConfig::from_resolved(tree).unwrap();
        assert_eq!(config.base_dir(fallback), PathBuf::from("/cwd/rel"));
    }
}
