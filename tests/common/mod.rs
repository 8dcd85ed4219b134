//! Shared fixtures for integration tests.

#![allow(dead_code, clippy::unwrap_used)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Write `contents` to `base/rel`, creating parents.
pub fn write(base: &Path, rel: &str, contents: &str) -> PathBuf {
    let path = base.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, contents).unwrap();
    path
}

/// Install an executable shell script at `base/rel`.
#[cfg(unix)]
pub fn install_script(base: &Path, rel: &str, script: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = write(base, rel, script);
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// A project tree with layered configs, sources and a small image set.
///
/// Layout:
/// - `confs/default.yaml` selecting `confs/dataset/blender.yaml` (factor 2)
/// - `CMakeLists.txt`, `main.cu`, `src/render.cpp`, `src/field/grid.h`
/// - `data/nerf_synthetic/lego/images_2/{r_1.png, r_0.png, sub/r_2.jpg}`
pub fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();

    write(
        root,
        "confs/default.yaml",
        "defaults:\n  - dataset: blender\n\n\
         dataset_name: nerf_synthetic\n\
         case_name: lego\n\
         exp_name: ${case_name}_f${dataset.factor}\n\
         train:\n  iters: 100\n",
    );
    write(root, "confs/dataset/blender.yaml", "factor: 2\nwhite_bkgd: true\n");
    write(root, "confs/dataset/llff.yaml", "factor: 4\n");

    write(root, "CMakeLists.txt", "project(solver)\n");
    write(root, "main.cu", "int main() {}\n");
    write(root, "src/render.cpp", "// render\n");
    write(root, "src/field/grid.h", "// grid\n");
    write(root, "src/notes.md", "not backed up\n");

    let images = "data/nerf_synthetic/lego/images_2";
    write(root, &format!("{images}/r_1.png"), "");
    write(root, &format!("{images}/r_0.png"), "");
    write(root, &format!("{images}/sub/r_2.jpg"), "");
    write(root, &format!("{images}/thumbs.db"), "");

    dir
}
