//! Reading and writing the tool's `config.toml`.

use crate::error::{Error, Result};
use crate::settings::{Settings, settings_file_path};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// What `config init` found or did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    /// Default settings were written to this new file.
    Created(PathBuf),
    /// A settings file was already present and left untouched.
    Existing(PathBuf),
}

/// Read settings from `path`. A missing file yields the defaults.
pub fn load_settings_file(path: &Path) -> Result<Settings> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("No settings file at {}, using defaults", path.display());
            return Ok(Settings::default());
        }
        Err(source) => {
            return Err(Error::SettingsRead {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let settings: Settings = toml::from_str(&contents).map_err(|source| Error::SettingsParse {
        path: path.to_path_buf(),
        source,
    })?;
    check_settings(&settings).map_err(|message| Error::SettingsInvalid {
        path: path.to_path_buf(),
        message,
    })?;

    debug!("Loaded settings from {}", path.display());
    Ok(settings)
}

fn check_settings(settings: &Settings) -> std::result::Result<(), String> {
    if settings.conf.config_name.trim().is_empty() {
        return Err("conf.config_name must not be empty".to_string());
    }
    if settings.launch.build_dirs.is_empty() {
        return Err("launch.build_dirs must name at least one directory".to_string());
    }
    if settings.launch.executable.trim().is_empty() {
        return Err("launch.executable must not be empty".to_string());
    }
    Ok(())
}

/// Settings in effect for this user.
///
/// Falls back to the defaults when the platform has no config directory.
pub fn load_default_settings() -> Result<Settings> {
    match settings_file_path() {
        Ok(path) => load_settings_file(&path),
        Err(Error::ConfigDirNotFound) => {
            debug!("No config directory on this platform, using default settings");
            Ok(Settings::default())
        }
        Err(e) => Err(e),
    }
}

/// Settings as TOML, the form `config show` prints and `config init` writes.
pub fn render_settings(settings: &Settings) -> Result<String> {
    toml::to_string_pretty(settings).map_err(|source| Error::SettingsSerialize { source })
}

/// Write settings to `path`, creating its directory.
pub fn save_settings(settings: &Settings, path: &Path) -> Result<()> {
    let contents = render_settings(settings)?;
    let failed = |source| Error::SettingsWrite {
        path: path.to_path_buf(),
        source,
    };

    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(failed)?;
    }
    std::fs::write(path, contents).map_err(failed)
}

/// Write the default settings to `path` unless a file is already there.
pub fn init_settings_file(path: &Path) -> Result<InitOutcome> {
    if path.exists() {
        return Ok(InitOutcome::Existing(path.to_path_buf()));
    }
    save_settings(&Settings::default(), path)?;
    Ok(InitOutcome::Created(path.to_path_buf()))
}
