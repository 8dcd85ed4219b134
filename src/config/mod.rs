//! Layered run configuration.
//!
//! Resolution order: defaults list, primary file, group selections, value
//! overrides, then eager interpolation. The result is an immutable
//! [`RunConfig`].

mod compose;
mod interpolate;
mod overrides;
pub mod tree;
mod types;

pub use compose::{Composition, DefaultEntry, compose, config_file, load_yaml, parse_defaults};
pub use interpolate::resolve;
pub use overrides::{Override, OverrideKind, parse_value};
pub use types::RunConfig;

use crate::error::Result;
use serde_yaml::Value;
use std::path::PathBuf;
use tracing::debug;

/// Where to find the layered configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSource {
    /// Directory containing the primary config and its groups.
    pub dir: PathBuf,
    /// Primary config name.
    pub name: String,
}

/// Compose, override and interpolate, without checking required keys.
pub fn resolve_tree(source: &ConfigSource, overrides: &[Override]) -> Result<Value> {
    let Composition {
        mut tree,
        remaining,
    } = compose(&source.dir, &source.name, overrides)?;

    for o in remaining {
        debug!("Applying override: {o}");
        o.apply(&mut tree)?;
    }

    resolve(&tree)
}

/// Resolve the run configuration and validate the keys the run requires.
pub fn resolve_config(source: &ConfigSource, overrides: &[Override]) -> Result<RunConfig> {
    RunConfig::from_resolved(resolve_tree(source, overrides)?)
}
