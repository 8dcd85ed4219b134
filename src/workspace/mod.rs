//! Workspace directories and source backup.

mod backup;
mod layout;

pub use backup::{BACKUP_RULES, BackupRule, BackupSummary, FileMatcher, backup_sources};
pub use layout::Workspace;
