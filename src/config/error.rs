use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during configuration management.
///
/// Every variant is fatal to the operation that produced it. Failures to
/// parse a single scalar value are not errors; the reader logs them and
/// leaves the field unset.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file does not exist.
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
    /// Configuration file exists but could not be read.
    #[error("Failed to read {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A line the layout expects is past the end of the file.
    #[error("{path} has no line {line}; the file is truncated or not a game config")]
    MissingLine { path: PathBuf, line: usize },
    /// A managed line does not have the expected shape.
    #[error("Malformed config line {line}: {reason}")]
    MalformedLine { line: usize, reason: String },
    /// A template is missing a section the writer anchors on.
    #[error("Template is missing anchor '{0}'")]
    MissingAnchor(String),
    /// Attempted to commit a transaction twice.
    #[error("Transaction already committed")]
    AlreadyCommitted,
    /// Backup directory cannot be created or written to.
    #[error("Backup directory not writable: {0}")]
    BackupDirNotWritable(PathBuf),
    /// Failed to create backup file.
    #[error("Failed to create backup: {0}")]
    BackupFailed(String),
    /// Atomic write operation failed.
    #[error("Atomic write failed: {0}")]
    WriteFailed(String),
    /// Launcher settings file could not be parsed.
    #[error("Invalid launcher settings: {0}")]
    SettingsInvalid(String),
    /// Generic I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
