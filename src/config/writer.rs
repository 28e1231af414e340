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

//! Writes bindings and scalar settings back to the game's config files
//!
//! # Primary file
//!
//! Patched line by line: each slot's key token and modifier flags, the
//! console command and the two FOV commands. Every other line is kept as is.
//!
//! # Secondary file
//!
//! Regenerated from its template on every write: the two mouse lines are
//! replaced and the keyboard block is rebuilt from the primary file, custom
//! binds included. The file is read-only outside of this.
//!
//! Both files are replaced atomically. `write()` restores the primary file
//! if the secondary one cannot be written, so the pair never disagrees.

use tracing::{debug, error, info, warn};

use crate::config::{
    document::{CarriedRegion, CarryOverPolicy, ConfigDocument},
    layout::FileLayout,
    line::{encode_modifier, read_token, replace_embedded, replace_token},
    transaction::{ConfigTransaction, ReadOnlyGuard},
    ConfigError, ConfigFiles,
};
use crate::core::{BindState, Binding, ScalarSettings};

/// Serialises a `BindState` and `ScalarSettings` into the config files.
#[derive(Clone, Copy, Debug)]
pub struct ConfigWriter<'a> {
    layout: &'a FileLayout,
    policy: CarryOverPolicy,
}

impl<'a> ConfigWriter<'a> {
    pub fn new(layout: &'a FileLayout, policy: CarryOverPolicy) -> Self {
        Self { layout, policy }
    }

    /// Rebuilds one bind line for `binding`.
    ///
    /// The key token is replaced in place and the modifier flags are
    /// normalised so at most one of them is true.
    ///
    /// # Errors
    ///
    /// `ConfigError::MalformedLine` if the line has no quoted token at the
    /// token column.
    pub fn encode_binding(
        &self,
        line: &str,
        index: usize,
        binding: &Binding,
    ) -> Result<String, ConfigError> {
        let replaced = replace_token(line, self.layout.token_column, &binding.raw_token)
            .ok_or_else(|| ConfigError::MalformedLine {
                line: index,
                reason: format!("no quoted key token at column {}", self.layout.token_column),
            })?;

        Ok(encode_modifier(&replaced, binding.modifier).into_owned())
    }

    /// Applies bindings and FOV values to a primary document in memory.
    pub fn render_primary(
        &self,
        state: &BindState,
        scalars: &ScalarSettings,
        primary: &mut ConfigDocument,
    ) -> Result<(), ConfigError> {
        for binding in state.iter() {
            let Some(slot) = self.layout.slot(binding.action) else {
                continue;
            };

            for index in slot.lines() {
                let line = self.encode_binding(primary.require_line(index)?, index, binding)?;
                debug!(action = %binding.action, label = %binding.label, line = index + 1, "Binding key");
                primary.set_line(index, line)?;
            }
        }

        self.render_console_line(primary)?;

        let [line_a, line_b] = self.layout.fov_lines;
        for (index, value) in [(line_a, scalars.fov_slider_a), (line_b, scalars.fov_slider_b)] {
            if let Some(fov) = value {
                let line = primary.require_line(index)?;
                let updated = replace_embedded(line, &format!("fov {}", fov))
                    .ok_or_else(|| malformed_command(index))?;
                primary.set_line(index, updated)?;
            }
        }

        Ok(())
    }

    /// Points the console command at the console line's own key.
    fn render_console_line(&self, primary: &mut ConfigDocument) -> Result<(), ConfigError> {
        let index = self.layout.console_line;
        let line = primary.require_line(index)?;
        let token = read_token(line, self.layout.token_column);

        let updated = replace_embedded(line, &format!("set console TypeKey {}", token))
            .ok_or_else(|| malformed_command(index))?;
        primary.set_line(index, updated)
    }

    /// Writes the primary file and returns the rendered document together
    /// with the transaction that can undo it.
    pub fn write_primary(
        &self,
        state: &BindState,
        scalars: &ScalarSettings,
        files: &ConfigFiles,
    ) -> Result<(ConfigDocument, ConfigTransaction), ConfigError> {
        let path = files.primary();
        let result = ConfigDocument::load(path).and_then(|mut document| {
            self.render_primary(state, scalars, &mut document)?;
            let mut transaction = ConfigTransaction::begin(path, files.backup_dir())?;
            transaction.commit(&document.to_bytes())?;
            Ok((document, transaction))
        });

        match &result {
            Ok(_) => info!(path = %path.display(), "Wrote controls"),
            Err(e) => error!(path = %path.display(), error = %e, "Failed to write controls"),
        }
        result
    }

    /// Regenerates a secondary document from its template.
    ///
    /// # Errors
    ///
    /// `ConfigError::MissingLine` if the template is too short for the
    /// scalar lines, `ConfigError::MissingAnchor` if it lacks the carry-over
    /// anchors.
    pub fn render_secondary(
        &self,
        scalars: &ScalarSettings,
        template: &ConfigDocument,
        primary: &ConfigDocument,
    ) -> Result<ConfigDocument, ConfigError> {
        let mut document = template.clone();

        // An unknown sensitivity keeps the template's value
        if let Some(sensitivity) = scalars.mouse_sensitivity {
            document.set_line(
                self.layout.sensitivity_line,
                format!("{}={}.0", self.layout.sensitivity_key, sensitivity),
            )?;
        }
        document.set_line(
            self.layout.smoothing_line,
            format!("{}={}", self.layout.smoothing_key, scalars.mouse_smoothing),
        )?;

        let region = CarriedRegion::from_primary(primary, self.layout, self.policy);
        if !region.has_sentinel() {
            warn!(sentinel = %self.layout.sentinel, "Primary config has no custom bind sentinel");
        }
        debug!(
            lines = region.lines().len(),
            custom = region.custom_lines().len(),
            "Carrying primary lines into secondary config"
        );
        region.splice_into(&document, self.layout)
    }

    /// Regenerates the secondary file from `primary`.
    pub fn write_secondary(
        &self,
        scalars: &ScalarSettings,
        primary: &ConfigDocument,
        files: &ConfigFiles,
    ) -> Result<(), ConfigError> {
        let path = files.secondary();
        let template = ConfigDocument::parse(files.secondary_template());
        let result = self
            .render_secondary(scalars, &template, primary)
            .and_then(|document| commit_secondary(&document, files));

        match &result {
            Ok(()) => info!(path = %path.display(), "Regenerated secondary config"),
            Err(e) => error!(path = %path.display(), error = %e, "Failed to write secondary config"),
        }
        result
    }

    /// Writes both files.
    ///
    /// The primary file is written first. If the secondary file then fails,
    /// the primary file is restored and the secondary error is returned.
    pub fn write(
        &self,
        state: &BindState,
        scalars: &ScalarSettings,
        files: &ConfigFiles,
    ) -> Result<(), ConfigError> {
        let (primary, transaction) = self.write_primary(state, scalars, files)?;

        if let Err(e) = self.write_secondary(scalars, &primary, files) {
            if let Err(rollback) = transaction.rollback() {
                error!(error = %rollback, "Failed to restore primary config after secondary failure");
            }
            return Err(e);
        }

        info!("Wrote settings to both config files");
        prune_backups(files);
        Ok(())
    }

    /// Regenerates the secondary file from the primary file on disk.
    ///
    /// Used when only mouse settings changed.
    pub fn write_mouse(&self, scalars: &ScalarSettings, files: &ConfigFiles) -> Result<(), ConfigError> {
        let primary = ConfigDocument::load(files.primary()).inspect_err(|e| {
            error!(path = %files.primary().display(), error = %e, "Failed to load primary config");
        })?;
        self.write_secondary(scalars, &primary, files)?;
        prune_backups(files);
        Ok(())
    }

    /// Overwrites both files with the packaged templates.
    ///
    /// The secondary file is marked read-only again afterwards.
    pub fn restore_templates(&self, files: &ConfigFiles) -> Result<(), ConfigError> {
        let primary = ConfigDocument::parse(files.primary_template());
        let secondary = ConfigDocument::parse(files.secondary_template());

        let mut primary_tx = ConfigTransaction::begin(files.primary(), files.backup_dir())?;
        primary_tx.commit(&primary.to_bytes())?;

        if let Err(e) = commit_secondary(&secondary, files) {
            error!(error = %e, "Failed to restore secondary config");
            if let Err(rollback) = primary_tx.rollback() {
                error!(error = %rollback, "Failed to restore primary config after secondary failure");
            }
            return Err(e);
        }

        info!("Restored default config files");
        prune_backups(files);
        Ok(())
    }
}

/// Replaces the secondary file while it is temporarily writable.
fn commit_secondary(document: &ConfigDocument, files: &ConfigFiles) -> Result<(), ConfigError> {
    let _guard = ReadOnlyGuard::release(files.secondary())?;
    let mut transaction = ConfigTransaction::begin(files.secondary(), files.backup_dir())?;
    transaction.commit(&document.to_bytes())
}

/// Applies the backup retention limit; a failure here never fails the write.
fn prune_backups(files: &ConfigFiles) {
    if let Err(e) = files.prune_backups() {
        warn!(error = %e, "Failed to prune old backups");
    }
}

fn malformed_command(index: usize) -> ConfigError {
    ConfigError::MalformedLine {
        line: index,
        reason: "no quoted command after the first comma".to_string(),
    }
}
