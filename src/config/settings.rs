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

//! Launcher settings (`settings.toml`)
//!
//! ```toml
//! config_dir = "~/Documents/Eidos/Batman Arkham Asylum/BmGame/Config"
//! carry_over_policy = "legacy"
//! create_backups = true
//! max_backups = 10
//! ```
//!
//! Every field is optional; a missing file means all defaults.

use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

use crate::config::{document::CarryOverPolicy, ConfigError, ConfigFiles, DEFAULT_MAX_BACKUPS};

/// Where the game keeps its input configs on a default install.
pub const DEFAULT_CONFIG_DIR: &str = "~/Documents/Eidos/Batman Arkham Asylum/BmGame/Config";

/// Settings file location when none is given on the command line.
pub const DEFAULT_SETTINGS_PATH: &str = "~/.config/asylum-keybind-manager/settings.toml";

fn default_config_dir() -> String {
    DEFAULT_CONFIG_DIR.to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_backups() -> usize {
    DEFAULT_MAX_BACKUPS
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LauncherSettings {
    /// Directory holding `UserInput.ini` and `BmInput.ini`; `~` is expanded
    #[serde(default = "default_config_dir")]
    pub config_dir: String,

    /// How carried-over lines lose their leading character
    #[serde(default)]
    pub carry_over_policy: CarryOverPolicy,

    /// Copy each file to `backups/` before it is rewritten
    #[serde(default = "default_true")]
    pub create_backups: bool,

    /// Backups kept per config file; 0 keeps every backup
    #[serde(default = "default_max_backups")]
    pub max_backups: usize,
}

impl Default for LauncherSettings {
    fn default() -> Self {
        Self {
            config_dir: default_config_dir(),
            carry_over_policy: CarryOverPolicy::default(),
            create_backups: true,
            max_backups: DEFAULT_MAX_BACKUPS,
        }
    }
}

impl LauncherSettings {
    /// Loads settings from `path`, falling back to defaults if it does not
    /// exist.
    ///
    /// # Errors
    ///
    /// `ConfigError::SettingsInvalid` if the file is not valid TOML for
    /// these settings, `ConfigError::Io` if it cannot be read.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "No settings file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let settings: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::SettingsInvalid(format!("{}: {}", path.display(), e)))?;

        info!(path = %path.display(), "Loaded launcher settings");
        Ok(settings)
    }

    /// `DEFAULT_SETTINGS_PATH` with `~` expanded.
    pub fn default_path() -> PathBuf {
        expand(DEFAULT_SETTINGS_PATH)
    }

    /// The config directory with `~` expanded.
    pub fn config_dir(&self) -> PathBuf {
        expand(&self.config_dir)
    }

    /// File set for the configured directory.
    pub fn config_files(&self) -> ConfigFiles {
        let files = ConfigFiles::in_dir(self.config_dir())
            .with_max_backups((self.max_backups > 0).then_some(self.max_backups));
        if self.create_backups {
            files
        } else {
            files.with_backups(None)
        }
    }
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let settings = LauncherSettings::load(&temp_dir.path().join("nope.toml")).unwrap();
        assert_eq!(settings, LauncherSettings::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.toml");
        fs::write(&path, "carry_over_policy = \"dot_prefix_only\"\n").unwrap();

        let settings = LauncherSettings::load(&path).unwrap();
        assert_eq!(settings.carry_over_policy, CarryOverPolicy::DotPrefixOnly);
        assert_eq!(settings.config_dir, DEFAULT_CONFIG_DIR);
        assert!(settings.create_backups);
        assert_eq!(settings.max_backups, DEFAULT_MAX_BACKUPS);
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.toml");
        fs::write(&path, "create_backups = \"sometimes\"\n").unwrap();

        match LauncherSettings::load(&path) {
            Err(ConfigError::SettingsInvalid(_)) => {}
            other => panic!("Expected SettingsInvalid, got: {:?}", other),
        }
    }

    #[test]
    fn test_config_files_respects_backup_flag() {
        let settings = LauncherSettings {
            config_dir: "/games/asylum".to_string(),
            create_backups: false,
            ..LauncherSettings::default()
        };

        let files = settings.config_files();
        assert_eq!(files.primary(), Path::new("/games/asylum/UserInput.ini"));
        assert_eq!(files.backup_dir(), None);
    }

    #[test]
    fn test_config_files_backup_retention() {
        let mut settings = LauncherSettings {
            config_dir: "/games/asylum".to_string(),
            max_backups: 3,
            ..LauncherSettings::default()
        };
        assert_eq!(settings.config_files().max_backups(), Some(3));

        // Zero keeps every backup
        settings.max_backups = 0;
        assert_eq!(settings.config_files().max_backups(), None);
    }
}
