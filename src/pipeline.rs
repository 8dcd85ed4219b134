//! The prepare-then-launch sequence.

use crate::config::{ConfigSource, Override, RunConfig, resolve_config};
use crate::error::Result;
use crate::images::{ImageList, make_image_list};
use crate::launcher;
use crate::settings::{ImageOrder, LaunchSettings, Settings};
use crate::snapshot;
use crate::workspace::{BACKUP_RULES, BackupSummary, Workspace, backup_sources};
use std::path::{Path, PathBuf};
use tracing::info;

/// Everything a run needs besides the overrides.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Layered config location.
    pub source: ConfigSource,
    /// Directory the tool was started from; the base directory when the
    /// config has no `work_dir`.
    pub invocation_dir: PathBuf,
    /// Ordering policy for registered image lists.
    pub image_order: ImageOrder,
    /// Executable lookup.
    pub launch: LaunchSettings,
}

impl RunOptions {
    /// Combine settings with command-line choices.
    ///
    /// A relative config path is taken relative to `invocation_dir`.
    pub fn new(
        settings: &Settings,
        config_path: Option<&Path>,
        config_name: Option<&str>,
        keep_registered_order: bool,
        invocation_dir: &Path,
    ) -> Self {
        let dir = config_path.unwrap_or(settings.conf.config_path.as_path());
        let image_order = if keep_registered_order {
            ImageOrder::Registered
        } else {
            settings.images.order
        };

        Self {
            source: ConfigSource {
                dir: invocation_dir.join(dir),
                name: config_name
                    .unwrap_or(settings.conf.config_name.as_str())
                    .to_string(),
            },
            invocation_dir: invocation_dir.to_path_buf(),
            image_order,
            launch: settings.launch.clone(),
        }
    }
}

/// Result of preparing a workspace.
#[derive(Debug, Clone)]
pub struct Prepared {
    /// Resolved configuration.
    pub config: RunConfig,
    /// Workspace paths.
    pub workspace: Workspace,
    /// Source backup outcome.
    pub backup: BackupSummary,
    /// Image list that was written.
    pub images: ImageList,
    /// Where the runtime config was written.
    pub snapshots: Vec<PathBuf>,
}

/// Resolve the config and prepare the workspace for the solver.
pub fn prepare(options: &RunOptions, overrides: &[Override]) -> Result<Prepared> {
    let config = resolve_config(&options.source, overrides)?;
    let base_dir = config.base_dir(&options.invocation_dir);
    info!("Working directory is {}", base_dir.display());

    let workspace = Workspace::new(&base_dir, &config);
    workspace.prepare()?;
    info!("Data path: {}", workspace.data_path.display());
    info!("Experiment directory: {}", workspace.base_exp_dir.display());

    let backup = backup_sources(&workspace.base_dir, &workspace.record_dir, BACKUP_RULES)?;
    info!(
        "Backed up {} source file(s) to {}",
        backup.copied,
        workspace.record_dir.display()
    );

    let images = make_image_list(&workspace.data_path, config.factor(), options.image_order)?;

    let runtime = snapshot::build_snapshot(&config, &workspace);
    let snapshots = snapshot::snapshot_targets(&workspace).to_vec();
    snapshot::write_snapshot(&runtime, &snapshots)?;
    for target in &snapshots {
        info!("Runtime config written to {}", target.display());
    }

    Ok(Prepared {
        config,
        workspace,
        backup,
        images,
        snapshots,
    })
}

/// Find the solver for a prepared workspace and run it to completion.
///
/// Returns the exit code to report for the whole run.
pub fn launch_solver(prepared: &Prepared, launch: &LaunchSettings) -> Result<i32> {
    let base_dir = &prepared.workspace.base_dir;
    let executable = launcher::find_executable(base_dir, &launch.build_dirs, &launch.executable)?;
    let status = launcher::launch(&executable, base_dir)?;
    let code = launcher::exit_code(status);
    info!("Solver exited with code {code}");
    Ok(code)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_options_prefer_cli_values() {
        let settings = Settings::default();
        let options = RunOptions::new(
            &settings,
            Some(Path::new("/abs/confs")),
            Some("dtu"),
            true,
            Path::new("/cwd"),
        );
        assert_eq!(options.source.dir, PathBuf::from("/abs/confs"));
        assert_eq!(options.source.name, "dtu");
        assert_eq!(options.image_order, ImageOrder::Registered);
    }

    #[test]
    fn test_options_fall_back_to_settings() {
        let mut settings = Settings::default();
        settings.images.order = ImageOrder::Registered;
        let options = RunOptions::new(&settings, None, None, false, Path::new("/cwd"));
        assert_eq!(options.source.dir, PathBuf::from("/cwd/confs"));
        assert_eq!(options.source.name, "default");
        assert_eq!(options.image_order, ImageOrder::Registered);
        assert_eq!(options.invocation_dir, PathBuf::from("/cwd"));
    }
}
