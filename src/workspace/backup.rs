//! Source snapshot into the experiment record directory.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// Which file names a rule accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMatcher {
    /// Exactly this file name.
    Name(&'static str),
    /// Any of these extensions (case-sensitive).
    Extensions(&'static [&'static str]),
}

impl FileMatcher {
    fn matches(self, path: &Path) -> bool {
        match self {
            Self::Name(name) => path.file_name().is_some_and(|n| n == name),
            Self::Extensions(exts) => path
                .extension()
                .is_some_and(|ext| exts.iter().any(|e| ext == *e)),
        }
    }
}

/// Files at exactly `depth` levels below `base_dir/root` accepted by `matcher`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackupRule {
    /// Directory relative to the base directory (`""` for the base itself).
    pub root: &'static str,
    /// Nesting depth; 1 means direct children of `root`.
    pub depth: usize,
    /// File name filter.
    pub matcher: FileMatcher,
}

const SOURCE_EXTENSIONS: &[&str] = &["cpp", "h", "cu"];

/// Build file and C/C++/CUDA sources up to three levels under `src/`.
pub const BACKUP_RULES: &[BackupRule] = &[
    BackupRule {
        root: "",
        depth: 1,
        matcher: FileMatcher::Name("CMakeLists.txt"),
    },
    BackupRule {
        root: "",
        depth: 1,
        matcher: FileMatcher::Extensions(SOURCE_EXTENSIONS),
    },
    BackupRule {
        root: "src",
        depth: 1,
        matcher: FileMatcher::Extensions(SOURCE_EXTENSIONS),
    },
    BackupRule {
        root: "src",
        depth: 2,
        matcher: FileMatcher::Extensions(SOURCE_EXTENSIONS),
    },
    BackupRule {
        root: "src",
        depth: 3,
        matcher: FileMatcher::Extensions(SOURCE_EXTENSIONS),
    },
];

/// Outcome of a backup pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackupSummary {
    /// Number of files copied.
    pub copied: usize,
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}

impl BackupRule {
    /// Matching files, sorted by path.
    pub fn matches(&self, base_dir: &Path) -> Result<Vec<PathBuf>> {
        let root = base_dir.join(self.root);
        if !root.is_dir() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        let walker = WalkDir::new(&root)
            .min_depth(self.depth)
            .max_depth(self.depth)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_hidden(e));
        for entry in walker {
            let entry = entry.map_err(|e| Error::Io(e.into()))?;
            let file_type = entry.file_type();
            let is_file =
                file_type.is_file() || (file_type.is_symlink() && entry.path().is_file());
            if is_file && self.matcher.matches(entry.path()) {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }
}

/// Copy every file matched by `rules` from `base_dir` into `record_dir`.
///
/// Relative paths are preserved and earlier copies are overwritten.
pub fn backup_sources(
    base_dir: &Path,
    record_dir: &Path,
    rules: &[BackupRule],
) -> Result<BackupSummary> {
    let mut summary = BackupSummary::default();

    for rule in rules {
        for file in rule.matches(base_dir)? {
            let Ok(relative) = file.strip_prefix(base_dir) else {
                continue;
            };
            let target = record_dir.join(relative);

            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent).map_err(|e| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
            std::fs::copy(&file, &target).map_err(|e| Error::BackupCopy {
                path: file.clone(),
                source: e,
            })?;
            debug!("Backed up {}", relative.display());
            summary.copied += 1;
        }
    }

    Ok(summary)
}
