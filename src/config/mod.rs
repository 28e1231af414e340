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

//! Game config file management with atomic writes and backup support.
//!
//! This module owns everything that touches `UserInput.ini` (primary) and
//! `BmInput.ini` (secondary). Key features:
//!
//! - **Single layout table**: reader and writer share one `FileLayout`
//! - **Lossless carry-over**: custom binds below the sentinel survive every
//!   regeneration of the secondary file
//! - **Atomic writes**: temp-file-then-rename, with timestamped backups
//! - **Paired rollback**: a failed secondary write restores the primary file
//!
//! # Example
//!
//! ```no_run
//! use asylum_keybind_manager::config::{
//!     CarryOverPolicy, ConfigFiles, ConfigReader, ConfigWriter, FileLayout,
//! };
//! use asylum_keybind_manager::core::{Action, TokenRegistry};
//!
//! let files = ConfigFiles::in_dir("/games/asylum/BmGame/Config");
//! let layout = FileLayout::default();
//!
//! let reader = ConfigReader::new(&layout, TokenRegistry::standard());
//! let (mut state, scalars) = reader.read(files.primary(), files.secondary())?;
//!
//! state.assign(Action::Crouch, "Ctrl + Space");
//! ConfigWriter::new(&layout, CarryOverPolicy::Legacy).write(&state, &scalars, &files)?;
//! # Ok::<(), asylum_keybind_manager::config::ConfigError>(())
//! ```

use std::{
    borrow::Cow,
    path::{Path, PathBuf},
};

pub mod document;
mod error;
pub mod ini;
pub mod layout;
pub mod line;
pub mod reader;
pub mod settings;
pub mod transaction;
pub mod writer;

pub use document::{CarriedRegion, CarryOverPolicy, ConfigDocument, TextEncoding};
pub use error::ConfigError;
pub use layout::{ActionSlot, FileLayout};
pub use reader::ConfigReader;
pub use settings::LauncherSettings;
pub use transaction::{cleanup_old_backups, list_backups, ConfigTransaction, ReadOnlyGuard};
pub use writer::ConfigWriter;

pub const PRIMARY_FILE_NAME: &str = "UserInput.ini";
pub const SECONDARY_FILE_NAME: &str = "BmInput.ini";
pub const BACKUP_DIR_NAME: &str = "backups";

/// Backups kept per config file when nothing else is configured.
pub const DEFAULT_MAX_BACKUPS: usize = 10;

/// Packaged primary file, restored on reset.
pub const PRIMARY_TEMPLATE: &str = include_str!("../../resources/UserInput.ini");

/// Packaged secondary file, the base of every regeneration.
pub const SECONDARY_TEMPLATE: &str = include_str!("../../resources/BmInput.ini");

/// Paths and templates for one game install.
///
/// Built with `in_dir` and adjusted with the `with_*` methods.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConfigFiles {
    primary: PathBuf,
    secondary: PathBuf,
    backup_dir: Option<PathBuf>,
    /// Backups kept per file; `None` keeps all of them
    max_backups: Option<usize>,
    primary_template: Cow<'static, str>,
    secondary_template: Cow<'static, str>,
}

impl ConfigFiles {
    /// The two config files in `dir`, with backups in `dir/backups` and the
    /// packaged templates.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            primary: dir.join(PRIMARY_FILE_NAME),
            secondary: dir.join(SECONDARY_FILE_NAME),
            backup_dir: Some(dir.join(BACKUP_DIR_NAME)),
            max_backups: Some(DEFAULT_MAX_BACKUPS),
            primary_template: Cow::Borrowed(PRIMARY_TEMPLATE),
            secondary_template: Cow::Borrowed(SECONDARY_TEMPLATE),
        }
    }

    /// Sets the backup directory; `None` disables backups.
    pub fn with_backups(mut self, backup_dir: Option<PathBuf>) -> Self {
        self.backup_dir = backup_dir;
        self
    }

    /// Sets how many backups are kept per file; `None` keeps all of them.
    pub fn with_max_backups(mut self, max_backups: Option<usize>) -> Self {
        self.max_backups = max_backups;
        self
    }

    /// Replaces the packaged templates.
    pub fn with_templates(
        mut self,
        primary: impl Into<Cow<'static, str>>,
        secondary: impl Into<Cow<'static, str>>,
    ) -> Self {
        self.primary_template = primary.into();
        self.secondary_template = secondary.into();
        self
    }

    pub fn primary(&self) -> &Path {
        &self.primary
    }

    pub fn secondary(&self) -> &Path {
        &self.secondary
    }

    pub fn backup_dir(&self) -> Option<&Path> {
        self.backup_dir.as_deref()
    }

    pub fn max_backups(&self) -> Option<usize> {
        self.max_backups
    }

    pub fn primary_template(&self) -> &str {
        &self.primary_template
    }

    pub fn secondary_template(&self) -> &str {
        &self.secondary_template
    }

    /// Backups of both files, oldest first.
    pub fn backups(&self) -> Result<Vec<PathBuf>, ConfigError> {
        let Some(dir) = self.backup_dir() else {
            return Ok(Vec::new());
        };

        let mut backups = list_backups(dir, PRIMARY_FILE_NAME)?;
        backups.extend(list_backups(dir, SECONDARY_FILE_NAME)?);
        backups.sort_by_cached_key(|path| {
            let prefix = path
                .file_name()
                .and_then(|name| name.to_str())
                .and_then(|name| name.split_once(".ini."))
                .map(|(file, _)| format!("{}.ini.", file))
                .unwrap_or_default();
            transaction::backup_sort_key(path, &prefix)
        });
        Ok(backups)
    }

    /// Deletes backups beyond `max_backups` for each file.
    ///
    /// # Returns
    ///
    /// Number of backups deleted
    pub fn prune_backups(&self) -> Result<usize, ConfigError> {
        let (Some(dir), Some(keep)) = (self.backup_dir(), self.max_backups) else {
            return Ok(0);
        };

        let mut deleted = 0;
        for file_name in [PRIMARY_FILE_NAME, SECONDARY_FILE_NAME] {
            deleted += cleanup_old_backups(dir, file_name, keep)?;
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests;
