// Copyright 2025 Eric Jingryd (tidynest@proton.me)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Config file transactions with automatic backups
//!
//! Every write goes to a temporary file that is renamed over the target, so
//! a config file is never left half-written. The original bytes are kept in
//! memory for rollback, and optionally copied to a timestamped backup.

use atomic_write_file::AtomicWriteFile;
use chrono::Local;
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

use crate::config::ConfigError;

/// Timestamp format used in backup file names.
pub const BACKUP_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H%M%S";

/// Length of a formatted timestamp ("2025-10-10_221500").
const TIMESTAMP_WIDTH: usize = 17;

/// Atomic write of one config file with a rollback point.
///
/// # Lifecycle
///
/// 1. `begin()` - Snapshots the current file and writes the backup
/// 2. `commit()` - Replaces the file atomically
/// 3. `rollback()` - Restores the snapshot (also after a commit)
///
/// # Example
///
/// ```no_run
/// use asylum_keybind_manager::config::ConfigTransaction;
/// use std::path::Path;
///
/// let path = Path::new("UserInput.ini");
/// let mut tx = ConfigTransaction::begin(path, Some(Path::new("backups")))?;
/// tx.commit(b"; new content\r\n")?;
/// # Ok::<(), asylum_keybind_manager::config::ConfigError>(())
/// ```
#[derive(Debug)]
pub struct ConfigTransaction {
    path: PathBuf,
    backup_path: Option<PathBuf>,
    /// File content when the transaction began; `None` if it did not exist
    snapshot: Option<Vec<u8>>,
    committed: bool,
}

impl ConfigTransaction {
    /// Begins a transaction on `path`.
    ///
    /// With a backup directory the current content is copied there first.
    ///
    /// # Errors
    ///
    /// Returns an error if the current file cannot be read or the backup
    /// cannot be written. Nothing has been modified in that case.
    pub fn begin(path: &Path, backup_dir: Option<&Path>) -> Result<Self, ConfigError> {
        let snapshot = if path.exists() {
            Some(fs::read(path)?)
        } else {
            None
        };

        let backup_path = match (backup_dir, &snapshot) {
            (Some(dir), Some(content)) => Some(create_timestamped_backup(path, dir, content)?),
            _ => None,
        };

        Ok(Self {
            path: path.to_path_buf(),
            backup_path,
            snapshot,
            committed: false,
        })
    }

    /// Writes `content` atomically over the target file.
    ///
    /// # Errors
    ///
    /// `ConfigError::AlreadyCommitted` on a second call, or
    /// `ConfigError::WriteFailed` if the temp file cannot be written or
    /// renamed. The original file is untouched on failure.
    pub fn commit(&mut self, content: &[u8]) -> Result<(), ConfigError> {
        if self.committed {
            return Err(ConfigError::AlreadyCommitted);
        }

        write_atomic(&self.path, content)?;
        self.committed = true;

        debug!(path = %self.path.display(), bytes = content.len(), "Committed config write");
        Ok(())
    }

    /// Restores the file to its state when the transaction began.
    ///
    /// A file that did not exist before is removed.
    pub fn rollback(&self) -> Result<(), ConfigError> {
        match &self.snapshot {
            Some(content) => write_atomic(&self.path, content)?,
            None if self.path.exists() => fs::remove_file(&self.path)?,
            None => {}
        }

        warn!(path = %self.path.display(), "Rolled back config write");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Backup written by `begin()`, if any.
    pub fn backup_path(&self) -> Option<&Path> {
        self.backup_path.as_deref()
    }

    pub fn is_committed(&self) -> bool {
        self.committed
    }
}

/// Atomically replaces `path` with `content` (temp file + rename).
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<(), ConfigError> {
    let mut file = AtomicWriteFile::options().open(path).map_err(|e| {
        ConfigError::WriteFailed(format!("Failed to open {} for atomic write: {}", path.display(), e))
    })?;

    file.write_all(content)
        .map_err(|e| ConfigError::WriteFailed(format!("Failed to write content: {}", e)))?;

    file.commit()
        .map_err(|e| ConfigError::WriteFailed(format!("Failed to commit atomic write: {}", e)))?;

    Ok(())
}

/// Copies `content` to `<backup_dir>/<file name>.<timestamp>`.
///
/// A second backup within the same second gets a `-N` suffix instead of
/// overwriting the first.
pub fn create_timestamped_backup(
    path: &Path,
    backup_dir: &Path,
    content: &[u8],
) -> Result<PathBuf, ConfigError> {
    if !backup_dir.exists() {
        fs::create_dir_all(backup_dir)
            .map_err(|_| ConfigError::BackupDirNotWritable(backup_dir.to_path_buf()))?;
    }

    let original_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| ConfigError::BackupFailed(format!("{} has no file name", path.display())))?;

    let timestamp = Local::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
    let mut backup_path = backup_dir.join(format!("{}.{}", original_name, timestamp));
    let mut attempt = 1;
    while backup_path.exists() {
        backup_path = backup_dir.join(format!("{}.{}-{}", original_name, timestamp, attempt));
        attempt += 1;
    }

    fs::write(&backup_path, content)
        .map_err(|e| ConfigError::BackupFailed(format!("{}: {}", backup_path.display(), e)))?;

    info!(backup = %backup_path.display(), "Created backup");
    Ok(backup_path)
}

/// Backups of `file_name` in `backup_dir`, oldest first.
///
/// A missing backup directory simply has no backups.
pub fn list_backups(backup_dir: &Path, file_name: &str) -> Result<Vec<PathBuf>, ConfigError> {
    if !backup_dir.exists() {
        return Ok(Vec::new());
    }

    let prefix = format!("{}.", file_name);
    let mut backups = Vec::new();
    for entry in fs::read_dir(backup_dir)? {
        let path = entry?.path();
        let is_backup = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with(&prefix));
        if is_backup && path.is_file() {
            backups.push(path);
        }
    }

    backups.sort_by_cached_key(|path| backup_sort_key(path, &prefix));
    Ok(backups)
}

/// Deletes all but the `keep` newest backups of `file_name`.
///
/// # Returns
///
/// Number of backups deleted
pub fn cleanup_old_backups(
    backup_dir: &Path,
    file_name: &str,
    keep: usize,
) -> Result<usize, ConfigError> {
    let backups = list_backups(backup_dir, file_name)?;
    let excess = backups.len().saturating_sub(keep);

    for path in &backups[..excess] {
        fs::remove_file(path)?;
        debug!(backup = %path.display(), "Removed old backup");
    }

    if excess > 0 {
        info!(file = file_name, deleted = excess, kept = keep, "Pruned old backups");
    }
    Ok(excess)
}

/// Orders backups by timestamp, then by collision suffix ("-2" before "-10").
pub(crate) fn backup_sort_key(path: &Path, prefix: &str) -> (String, u32) {
    let stamp = path
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.strip_prefix(prefix))
        .unwrap_or_default();

    let width = TIMESTAMP_WIDTH;
    match (stamp.get(..width), stamp.get(width..).and_then(|s| s.strip_prefix('-'))) {
        (Some(timestamp), Some(suffix)) => (timestamp.to_string(), suffix.parse().unwrap_or(0)),
        _ => (stamp.to_string(), 0),
    }
}

/// Sets or clears the read-only flag on a file.
pub fn set_read_only(path: &Path, read_only: bool) -> Result<(), ConfigError> {
    let mut permissions = fs::metadata(path)?.permissions();

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = permissions.mode();
        permissions.set_mode(if read_only { mode & !0o222 } else { mode | 0o200 });
    }
    #[cfg(not(unix))]
    permissions.set_readonly(read_only);

    fs::set_permissions(path, permissions)?;
    debug!(path = %path.display(), read_only, "Changed read-only flag");
    Ok(())
}

/// Keeps a file writable while it is regenerated.
///
/// Clears the read-only flag on creation and sets it again on drop, on the
/// success path and on every error path alike.
#[derive(Debug)]
pub struct ReadOnlyGuard {
    path: PathBuf,
}

impl ReadOnlyGuard {
    /// Makes `path` writable if it exists.
    pub fn release(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            set_read_only(path, false)?;
        }
        Ok(Self {
            path: path.to_path_buf(),
        })
    }
}

impl Drop for ReadOnlyGuard {
    fn drop(&mut self) {
        if !self.path.exists() {
            return;
        }
        if let Err(e) = set_read_only(&self.path, true) {
            warn!(path = %self.path.display(), error = %e, "Failed to mark file read-only");
        }
    }
}
