//! Settings type definitions.

use crate::constants::{DEFAULT_CONFIG_NAME, DEFAULT_CONFIG_PATH, launch};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete tool settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Where layered configs are found.
    pub conf: ConfSettings,

    /// Image list behavior.
    pub images: ImageSettings,

    /// Executable lookup.
    pub launch: LaunchSettings,
}

/// Location of the layered YAML configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ConfSettings {
    /// Directory containing the primary config and its groups.
    pub config_path: PathBuf,

    /// Primary config name, with or without `.yaml`.
    pub config_name: String,
}

impl Default for ConfSettings {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
            config_name: DEFAULT_CONFIG_NAME.to_string(),
        }
    }
}

/// Order applied to an image list loaded from the registered `.npy` index.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ImageOrder {
    /// Sort every list lexicographically, discarding a registered order.
    #[default]
    Sorted,
    /// Keep the order stored in the registered list.
    Registered,
}

impl std::fmt::Display for ImageOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sorted => write!(f, "sorted"),
            Self::Registered => write!(f, "registered"),
        }
    }
}

/// Image list settings.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ImageSettings {
    /// Ordering policy for registered lists.
    pub order: ImageOrder,
}

/// Executable lookup settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LaunchSettings {
    /// Build directories, relative to the base directory, searched in order.
    pub build_dirs: Vec<String>,

    /// Executable name inside each build directory.
    pub executable: String,
}

impl Default for LaunchSettings {
    fn default() -> Self {
        Self {
            build_dirs: launch::BUILD_DIRS.iter().map(ToString::to_string).collect(),
            executable: launch::EXECUTABLE.to_string(),
        }
    }
}
