//! Solver executable lookup and launch.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

static CHILD_RUNNING: AtomicBool = AtomicBool::new(false);

/// Whether a solver process is currently running in the foreground.
///
/// The interrupt handler leaves Ctrl+C to the child while this is set.
pub fn child_running() -> bool {
    CHILD_RUNNING.load(Ordering::SeqCst)
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .is_ok_and(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Candidate executable paths in search order.
pub fn candidates(base_dir: &Path, build_dirs: &[String], executable: &str) -> Vec<PathBuf> {
    build_dirs
        .iter()
        .map(|dir| base_dir.join(dir).join(executable))
        .collect()
}

/// First candidate that is an executable file.
pub fn find_executable(base_dir: &Path, build_dirs: &[String], executable: &str) -> Result<PathBuf> {
    let searched = candidates(base_dir, build_dirs, executable);

    for path in &searched {
        if is_executable(path) {
            return Ok(path.clone());
        }
        if path.exists() {
            warn!("Skipping non-executable candidate: {}", path.display());
        }
    }

    Err(Error::ExecutableNotFound { searched })
}

/// Run `executable` with no arguments in `working_dir` and wait for it.
///
/// The environment and standard streams are inherited.
pub fn launch(executable: &Path, working_dir: &Path) -> Result<ExitStatus> {
    info!("Launching {}", executable.display());

    // Set before spawning and cleared on every path out.
    CHILD_RUNNING.store(true, Ordering::SeqCst);
    let status = Command::new(executable)
        .current_dir(working_dir)
        .spawn()
        .and_then(|mut child| child.wait());
    CHILD_RUNNING.store(false, Ordering::SeqCst);

    status.map_err(|e| Error::Launch {
        path: executable.to_path_buf(),
        source: e,
    })
}

/// Process exit code that mirrors a child's exit status.
///
/// A child killed by a signal maps to `128 + signal`.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return crate::constants::launch::SIGNAL_EXIT_BASE + signal;
        }
    }

    1
}
