//! Derived workspace paths.

use crate::config::RunConfig;
use crate::constants::layout::{DATA_DIR, EXP_DIR, RECORD_DIR};
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Directories a run reads from and writes into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    /// Root of the project and the workspace.
    pub base_dir: PathBuf,
    /// `base_dir/data/<dataset_name>/<case_name>`.
    pub data_path: PathBuf,
    /// `base_dir/exp/<case_name>/<exp_name>`.
    pub base_exp_dir: PathBuf,
    /// `base_exp_dir/record`.
    pub record_dir: PathBuf,
}

impl Workspace {
    /// Derive the workspace paths for a configuration.
    pub fn new(base_dir: &Path, config: &RunConfig) -> Self {
        let data_path = base_dir
            .join(DATA_DIR)
            .join(config.dataset_name())
            .join(config.case_name());
        let base_exp_dir = base_dir
            .join(EXP_DIR)
            .join(config.case_name())
            .join(config.exp_name());
        let record_dir = base_exp_dir.join(RECORD_DIR);

        Self {
            base_dir: base_dir.to_path_buf(),
            data_path,
            base_exp_dir,
            record_dir,
        }
    }

    /// Create the data, experiment and record directories.
    ///
    /// Existing directories are left as they are.
    pub fn prepare(&self) -> Result<()> {
        for dir in [&self.data_path, &self.base_exp_dir, &self.record_dir] {
            std::fs::create_dir_all(dir).map_err(|e| Error::DirectoryCreate {
                path: dir.clone(),
                source: e,
            })?;
        }
        Ok(())
    }
}
