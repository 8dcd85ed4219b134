//! Application-wide constants.
//!
//! File names and directory conventions shared with the native solver live
//! here so the layout can be changed in one place.

/// Application name used for config directories and user-facing messages.
pub const APP_NAME: &str = "recon-launch";

/// Settings file name inside the platform config directory.
pub const SETTINGS_FILE_NAME: &str = "config.toml";

/// Environment variable naming an explicit settings file.
pub const SETTINGS_ENV: &str = "RECON_LAUNCH_SETTINGS";

/// Default directory holding the layered YAML configs.
pub const DEFAULT_CONFIG_PATH: &str = "confs";

/// Default primary config name (without extension).
pub const DEFAULT_CONFIG_NAME: &str = "default";

/// Extension of layered config files.
pub const CONFIG_EXTENSION: &str = "yaml";

/// Runtime config snapshot file name.
pub const RUNTIME_CONFIG_FILE: &str = "runtime_config.yaml";

/// Workspace directory names.
pub mod layout {
    /// Dataset root under the base directory.
    pub const DATA_DIR: &str = "data";

    /// Experiment root under the base directory.
    pub const EXP_DIR: &str = "exp";

    /// Backup directory under the experiment directory.
    pub const RECORD_DIR: &str = "record";
}

/// Image discovery constants.
pub mod images {
    /// Output file listing the image paths.
    pub const IMAGE_LIST_FILE: &str = "image_list.txt";

    /// Cached, curated list of image file names.
    pub const REGISTERED_LIST_FILE: &str = "registered_image_list.npy";

    /// Full-resolution image directory name.
    pub const FULL_RES_DIR: &str = "images";

    /// Prefix for downsampled image directories (`images_<factor>`).
    pub const DOWNSAMPLED_PREFIX: &str = "images_";

    /// Factors in this band select the full-resolution set.
    pub const UNIT_FACTOR_RANGE: std::ops::RangeInclusive<f64> = 0.999..=1.001;

    /// File-name suffixes that count as images. Matching is case-sensitive.
    pub const SUFFIXES: &[&str] = &[".jpg", ".png", ".JPG", ".jpeg"];
}

/// Launcher defaults.
pub mod launch {
    /// Build output directories searched in order.
    pub const BUILD_DIRS: &[&str] = &["build", "cmake-build-release"];

    /// Executable file name inside each build directory.
    pub const EXECUTABLE: &str = "main";

    /// Exit code used when interrupted before the solver starts (128 + SIGINT).
    pub const INTERRUPTED_EXIT_CODE: i32 = 130;

    /// Base added to a signal number when the child is killed by a signal.
    pub const SIGNAL_EXIT_BASE: i32 = 128;
}

/// Keys the resolved configuration must provide.
pub mod keys {
    /// Dataset name.
    pub const DATASET_NAME: &str = "dataset_name";
    /// Case (scene) name.
    pub const CASE_NAME: &str = "case_name";
    /// Experiment name.
    pub const EXP_NAME: &str = "exp_name";
    /// Optional explicit base directory.
    pub const WORK_DIR: &str = "work_dir";
    /// Dataset group.
    pub const DATASET: &str = "dataset";
    /// Image downsampling factor.
    pub const DATASET_FACTOR: &str = "dataset.factor";
    /// Injected dataset path.
    pub const DATA_PATH: &str = "data_path";
    /// Injected base directory.
    pub const BASE_DIR: &str = "base_dir";
    /// Injected experiment directory.
    pub const BASE_EXP_DIR: &str = "base_exp_dir";
    /// Defaults list in a primary config.
    pub const DEFAULTS: &str = "defaults";
    /// Marker for the primary config's position in the defaults list.
    pub const SELF_MARKER: &str = "_self_";
    /// Framework-reserved key stripped from the result.
    pub const FRAMEWORK: &str = "hydra";
}
