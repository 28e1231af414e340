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

//! Reads bindings and scalar settings from the game's config files
//!
//! Failure policy:
//! - A missing or unreadable file, or a managed line past the end of the
//!   primary file, is fatal. It is logged and returned to the caller.
//! - A single scalar that does not parse is logged as a warning and left
//!   unset; the rest of the configuration is still usable.

use std::path::Path;
use tracing::{error, info, warn};

use crate::config::{
    document::ConfigDocument,
    ini,
    layout::FileLayout,
    line::{decode_modifier, embedded_value, read_token},
    ConfigError,
};
use crate::core::{join_label, BindState, ScalarSettings, TokenRegistry, UNBOUND};

/// Turns the primary/secondary file pair into a `BindState` and scalars.
#[derive(Clone, Copy, Debug)]
pub struct ConfigReader<'a> {
    layout: &'a FileLayout,
    registry: &'static TokenRegistry,
}

impl<'a> ConfigReader<'a> {
    pub fn new(layout: &'a FileLayout, registry: &'static TokenRegistry) -> Self {
        Self { layout, registry }
    }

    /// Reads both files.
    ///
    /// # Errors
    ///
    /// Any file that is missing, unreadable or too short for the layout.
    pub fn read(
        &self,
        primary: &Path,
        secondary: &Path,
    ) -> Result<(BindState, ScalarSettings), ConfigError> {
        let primary_doc = ConfigDocument::load(primary).inspect_err(|e| {
            error!(path = %primary.display(), error = %e, "Failed to load primary config");
        })?;
        let state = self.read_bindings(&primary_doc).inspect_err(|e| {
            error!(path = %primary.display(), error = %e, "Failed to read bindings");
        })?;

        let secondary_doc = ConfigDocument::load(secondary).inspect_err(|e| {
            error!(path = %secondary.display(), error = %e, "Failed to load secondary config");
        })?;
        let scalars = self.read_scalars(&primary_doc, &secondary_doc);

        info!(
            bound = state.len() - state.unbound_actions().len(),
            unbound = state.unbound_actions().len(),
            "Read controls from config"
        );
        Ok((state, scalars))
    }

    /// One binding per layout slot, taken from the slot's primary line.
    pub fn read_bindings(&self, primary: &ConfigDocument) -> Result<BindState, ConfigError> {
        let labels = self
            .layout
            .slots
            .iter()
            .map(|slot| {
                let line = primary.require_line(slot.line)?;
                Ok((slot.action, self.decode_label(line)))
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(BindState::from_labels(self.registry, labels))
    }

    /// Display label for a bind line: modifier prefix plus human key name.
    ///
    /// An empty token reads as unbound.
    pub fn decode_label(&self, line: &str) -> String {
        let token = read_token(line, self.layout.token_column);
        if token.is_empty() || token == UNBOUND {
            return UNBOUND.to_string();
        }

        let modifier = decode_modifier(line);
        join_label(modifier, self.registry.to_human(token))
    }

    /// Mouse settings from the secondary file and the two FOV sliders from
    /// the primary file.
    pub fn read_scalars(
        &self,
        primary: &ConfigDocument,
        secondary: &ConfigDocument,
    ) -> ScalarSettings {
        let section = &self.layout.mouse_section;

        let mouse_sensitivity =
            match ini::find_value(secondary.lines(), section, &self.layout.sensitivity_key) {
                Some(value) => parse_sensitivity(value),
                None => {
                    warn!(key = %self.layout.sensitivity_key, "Mouse sensitivity not found");
                    None
                }
            };

        let mouse_smoothing =
            match ini::find_value(secondary.lines(), section, &self.layout.smoothing_key) {
                Some(value) => value.eq_ignore_ascii_case("true"),
                None => {
                    warn!(key = %self.layout.smoothing_key, "Mouse smoothing not found");
                    false
                }
            };

        let [a, b] = self.layout.fov_lines;
        ScalarSettings {
            mouse_sensitivity,
            mouse_smoothing,
            fov_slider_a: self.read_slider(primary, a),
            fov_slider_b: self.read_slider(primary, b),
        }
    }

    /// Numeric value embedded in a FOV line (`"fov 90"` or `"90"`).
    pub fn read_slider(&self, primary: &ConfigDocument, line: usize) -> Option<u32> {
        let Some(value) = primary.line(line).and_then(embedded_value) else {
            warn!(line, "FOV line has no quoted value");
            return None;
        };

        let number = value.trim();
        let number = number.strip_prefix("fov").unwrap_or(number).trim();
        match number.parse() {
            Ok(fov) => Some(fov),
            Err(e) => {
                warn!(line, value, error = %e, "Ignoring unparsable FOV value");
                None
            }
        }
    }
}

/// Whole-number part of a sensitivity value ("30.0" -> 30).
fn parse_sensitivity(value: &str) -> Option<u32> {
    let whole = value.split('.').next().unwrap_or(value).trim();
    match whole.parse() {
        Ok(sensitivity) => Some(sensitivity),
        Err(e) => {
            warn!(value, error = %e, "Ignoring unparsable mouse sensitivity");
            None
        }
    }
}
