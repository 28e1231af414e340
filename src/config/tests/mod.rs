//! Config module tests
//!
//! Contains test suites for file handling:
//! - Reader (labels, modifiers, scalars, failure policy)
//! - Writer (line patching, secondary regeneration, carry-over, rollback)
//! - Transactions (atomic commit, backups, read-only toggle)

#[cfg(test)]
mod reader_tests;

use std::fs;
use tempfile::TempDir;

use super::{ConfigFiles, PRIMARY_TEMPLATE, SECONDARY_TEMPLATE};

/// Helper: a game config directory holding the packaged files.
fn create_test_install() -> (TempDir, ConfigFiles) {
    let temp_dir = TempDir::new().unwrap();
    let files = ConfigFiles::in_dir(temp_dir.path());
    fs::write(files.primary(), PRIMARY_TEMPLATE).unwrap();
    fs::write(files.secondary(), SECONDARY_TEMPLATE).unwrap();
    (temp_dir, files)
}

/// Helper: lines of a file on disk, without line endings.
fn read_lines(path: &std::path::Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}
