//! Runtime config snapshot for the solver.

use crate::config::{RunConfig, tree};
use crate::constants::{RUNTIME_CONFIG_FILE, keys};
use crate::error::{Error, Result};
use crate::workspace::Workspace;
use serde_yaml::Value;
use std::path::{Path, PathBuf};

fn path_value(path: &Path) -> Value {
    Value::String(path.to_string_lossy().into_owned())
}

/// The resolved config with the derived workspace paths injected.
pub fn build_snapshot(config: &RunConfig, workspace: &Workspace) -> Value {
    let mut snapshot = config.tree().clone();
    tree::set(
        &mut snapshot,
        &format!("{}.{}", keys::DATASET, keys::DATA_PATH),
        path_value(&workspace.data_path),
    );
    tree::set(&mut snapshot, keys::BASE_DIR, path_value(&workspace.base_dir));
    tree::set(
        &mut snapshot,
        keys::BASE_EXP_DIR,
        path_value(&workspace.base_exp_dir),
    );
    snapshot
}

/// Snapshot targets: the record copy, then the copy the solver reads.
pub fn snapshot_targets(workspace: &Workspace) -> [PathBuf; 2] {
    [
        workspace.record_dir.join(RUNTIME_CONFIG_FILE),
        workspace.base_dir.join(RUNTIME_CONFIG_FILE),
    ]
}

/// Serialize once and write identical bytes to every target.
pub fn write_snapshot(snapshot: &Value, targets: &[PathBuf]) -> Result<()> {
    let contents =
        serde_yaml::to_string(snapshot).map_err(|e| Error::SnapshotSerialize { source: e })?;

    for target in targets {
        std::fs::write(target, &contents).map_err(|e| Error::SnapshotWrite {
            path: target.clone(),
            source: e,
        })?;
    }
    Ok(())
}
