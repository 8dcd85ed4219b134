//! Error types for recon-launch.

use std::path::PathBuf;

/// Result type alias for recon-launch operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for recon-launch.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration directory could not be determined.
    #[error("could not determine configuration directory for this platform")]
    ConfigDirNotFound,

    /// Failed to read the settings file.
    #[error("failed to read settings file '{path}'")]
    SettingsRead {
        /// Path to the settings file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the settings file.
    #[error("failed to parse settings file '{path}'")]
    SettingsParse {
        /// Path to the settings file.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: toml::de::Error,
    },

    /// Settings parsed but hold unusable values.
    #[error("invalid settings in '{path}': {message}")]
    SettingsInvalid {
        /// Path to the settings file.
        path: PathBuf,
        /// What is wrong.
        message: String,
    },

    /// Failed to write the settings file.
    #[error("failed to write settings file '{path}'")]
    SettingsWrite {
        /// Path to the settings file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize settings.
    #[error("failed to serialize settings")]
    SettingsSerialize {
        /// Underlying serialization error.
        #[source]
        source: toml::ser::Error,
    },

    /// Primary or group config file does not exist.
    #[error("config file not found: {path}")]
    ConfigNotFound {
        /// Expected path of the config file.
        path: PathBuf,
    },

    /// Failed to read a config file.
    #[error("failed to read config file '{path}'")]
    ConfigRead {
        /// Path to the config file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse a config file.
    #[error("failed to parse config file '{path}'")]
    ConfigParse {
        /// Path to the config file.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_yaml::Error,
    },

    /// A required configuration key is absent.
    #[error("missing required config key '{key}'")]
    ConfigMissing {
        /// Dotted key path.
        key: String,
    },

    /// A command-line override could not be applied.
    #[error("invalid override '{text}': {reason}")]
    ConfigOverride {
        /// Override as given on the command line.
        text: String,
        /// Why it was rejected.
        reason: String,
    },

    /// An interpolation could not be resolved.
    #[error("cannot resolve interpolation '{expr}' at '{key}': {reason}")]
    ConfigInterpolation {
        /// Dotted path of the node holding the interpolation.
        key: String,
        /// Interpolation expression.
        expr: String,
        /// Why resolution failed.
        reason: String,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    /// Failed to create a workspace directory.
    #[error("failed to create directory '{path}'")]
    DirectoryCreate {
        /// Directory path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to copy a source file into the record directory.
    #[error("failed to back up '{path}'")]
    BackupCopy {
        /// Source file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Image directory does not exist and no registered list is present.
    #[error("image directory not found: {path}")]
    ImageDirNotFound {
        /// Expected image directory.
        path: PathBuf,
    },

    /// No images were found.
    #[error("no images found in {path}")]
    EmptyImageSet {
        /// Image directory that was searched.
        path: PathBuf,
    },

    /// Registered image list could not be decoded.
    #[error("invalid registered image list '{path}': {reason}")]
    RegisteredList {
        /// Path to the `.npy` file.
        path: PathBuf,
        /// Description of the decoding failure.
        reason: String,
    },

    /// Failed to write `image_list.txt`.
    #[error("failed to write image list '{path}'")]
    ImageListWrite {
        /// Path to the image list.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize the runtime config.
    #[error("failed to serialize runtime config")]
    SnapshotSerialize {
        /// Underlying serialization error.
        #[source]
        source: serde_yaml::Error,
    },

    /// Failed to write the runtime config.
    #[error("failed to write runtime config '{path}'")]
    SnapshotWrite {
        /// Target path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// No executable was found at any candidate path.
    #[error("cannot find executable, searched: {}", display_paths(searched))]
    ExecutableNotFound {
        /// Candidate paths in search order.
        searched: Vec<PathBuf>,
    },

    /// Failed to spawn the executable.
    #[error("failed to launch '{path}'")]
    Launch {
        /// Executable path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to render output for display.
    #[error("failed to render output: {message}")]
    Render {
        /// Error message.
        message: String,
    },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_executable_not_found_lists_candidates() {
        let err = Error::ExecutableNotFound {
            searched: vec![
                PathBuf::from("/w/build/main"),
                PathBuf::from("/w/cmake-build-release/main"),
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("/w/build/main"));
        assert!(msg.contains("/w/cmake-build-release/main"));
    }

    #[test]
    fn test_config_missing_names_key() {
        let err = Error::ConfigMissing {
            key: "dataset.factor".to_string(),
        };
        assert_eq!(err.to_string(), "missing required config key 'dataset.factor'");
    }
}
