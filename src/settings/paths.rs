//! Location of the settings file.

use crate::constants::{APP_NAME, SETTINGS_ENV, SETTINGS_FILE_NAME};
use crate::error::{Error, Result};
use directories::ProjectDirs;
use std::ffi::OsString;
use std::path::PathBuf;

/// Path of the settings file.
///
/// `RECON_LAUNCH_SETTINGS` names the file explicitly. Otherwise it is
/// `config.toml` in the platform config directory:
/// - Linux: `~/.config/recon-launch/`
/// - macOS: `~/Library/Application Support/recon-launch/`
/// - Windows: `%APPDATA%\recon-launch\config\`
pub fn settings_file_path() -> Result<PathBuf> {
    settings_path_from(std::env::var_os(SETTINGS_ENV))
}

fn settings_path_from(explicit: Option<OsString>) -> Result<PathBuf> {
    if let Some(path) = explicit.filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.config_dir().join(SETTINGS_FILE_NAME))
        .ok_or(Error::ConfigDirNotFound)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_path_wins() {
        let path = settings_path_from(Some(OsString::from("/etc/recon/site.toml"))).unwrap();
        assert_eq!(path, PathBuf::from("/etc/recon/site.toml"));
    }

    #[test]
    fn test_platform_path_ends_in_app_dir() {
        for explicit in [None, Some(OsString::new())] {
            let path = settings_path_from(explicit).unwrap();
            assert!(path.ends_with("config.toml"));
            assert!(path.to_string_lossy().contains("recon-launch"));
        }
    }
}
