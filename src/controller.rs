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

//! Controller - Mediates between the config files and whatever drives them
//!
//! # Responsibilities
//!
//! - Load bindings and scalar settings through `ConfigReader`
//! - Capture new binds, rejecting keys on the deny-list
//! - Track which half of the configuration has unsaved changes
//! - Apply changes through `ConfigWriter`, or reset to the packaged defaults
//!
//! # Architecture
//!
//! The Controller owns the in-memory `BindState` snapshot but knows nothing
//! about how it is presented. The CLI drives it today; a GUI would hold one
//! per window.

use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{
    CarryOverPolicy, ConfigError, ConfigFiles, ConfigReader, ConfigWriter, FileLayout,
    LauncherSettings,
};
use crate::core::{split_label, Action, BindState, Binding, ScalarSettings, TokenRegistry, UNBOUND};

/// Errors from a user-initiated change
#[derive(Debug, Error)]
pub enum ControllerError {
    /// The key is reserved by the system and cannot be bound
    #[error("Key '{0}' is reserved and cannot be bound")]
    BannedKey(String),

    /// The value is outside what the game accepts
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Which of the two custom FOV keys a value belongs to
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FovSlider {
    A,
    B,
}

/// Range accepted for the FOV sliders.
pub const FOV_RANGE: (u32, u32) = (1, 180);

/// Range accepted for mouse sensitivity.
pub const SENSITIVITY_RANGE: (u32, u32) = (0, 100);

/// Headless controller over one game install
pub struct Controller {
    files: ConfigFiles,
    layout: FileLayout,
    policy: CarryOverPolicy,
    registry: &'static TokenRegistry,
    /// Snapshot of the bindings as last read or edited
    state: BindState,
    scalars: ScalarSettings,
    controls_dirty: bool,
    mouse_dirty: bool,
}

impl Controller {
    /// Creates a Controller for the install described by `settings` and
    /// loads its current configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Controller)` - Both config files were read
    /// * `Err(ConfigError)` - A config file is missing, unreadable or truncated
    ///
    /// # Example
    ///
    /// ```no_run
    /// use asylum_keybind_manager::config::LauncherSettings;
    /// use asylum_keybind_manager::controller::Controller;
    ///
    /// let settings = LauncherSettings::load(&LauncherSettings::default_path())?;
    /// let controller = Controller::open(&settings)?;
    /// println!("{} actions unbound", controller.bindings().unbound_actions().len());
    /// # Ok::<(), asylum_keybind_manager::config::ConfigError>(())
    /// ```
    pub fn open(settings: &LauncherSettings) -> Result<Self, ConfigError> {
        Self::new(settings.config_files(), settings.carry_over_policy)
    }

    /// Creates a Controller over an explicit file set.
    pub fn new(files: ConfigFiles, policy: CarryOverPolicy) -> Result<Self, ConfigError> {
        let registry = TokenRegistry::standard();
        let mut controller = Self {
            files,
            layout: FileLayout::default(),
            policy,
            registry,
            state: BindState::new(registry),
            scalars: ScalarSettings::default(),
            controls_dirty: false,
            mouse_dirty: false,
        };
        controller.load()?;
        Ok(controller)
    }

    /// Reads both config files, replacing the in-memory snapshot
    ///
    /// Call this on startup and after the files were edited outside the
    /// controller. Unsaved changes are discarded.
    ///
    /// # Returns
    ///
    /// Number of actions that have a key
    pub fn load(&mut self) -> Result<usize, ConfigError> {
        let reader = ConfigReader::new(&self.layout, self.registry);
        let (state, scalars) = reader.read(self.files.primary(), self.files.secondary())?;

        self.state = state;
        self.scalars = scalars;
        self.controls_dirty = false;
        self.mouse_dirty = false;

        Ok(self.state.len() - self.state.unbound_actions().len())
    }

    /// Binds `label` to `action`
    ///
    /// The label is normalised first ("ctrl + space" becomes "Ctrl + Space"),
    /// then any other action holding a colliding label becomes unbound.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<Action>)` - Actions that lost their key
    /// * `Err(ControllerError::BannedKey)` - The key part is on the deny-list;
    ///   nothing was changed
    pub fn assign(&mut self, action: Action, label: &str) -> Result<Vec<Action>, ControllerError> {
        let label = self.registry.canonical_label(label);
        let label = label.as_str();
        if label.is_empty() || label == UNBOUND {
            self.unbind(action);
            return Ok(Vec::new());
        }

        let (_, key) = split_label(label);
        if self.registry.is_banned(key) {
            warn!(action = %action, key, "Refusing to bind reserved key");
            return Err(ControllerError::BannedKey(key.to_string()));
        }

        if self.state.label(action) == label {
            return Ok(Vec::new());
        }

        let revoked = self.state.assign(action, label);
        for holder in &revoked {
            info!(action = %holder, key = label, "Unbound after key was reassigned");
        }
        self.controls_dirty = true;
        Ok(revoked)
    }

    /// Resets one action to "Unbound".
    pub fn unbind(&mut self, action: Action) {
        if self.state.is_assigned(action) {
            self.state.unbind(action);
            self.controls_dirty = true;
        }
    }

    pub fn set_mouse_sensitivity(&mut self, value: u32) -> Result<(), ControllerError> {
        check_range("Mouse sensitivity", value, SENSITIVITY_RANGE)?;
        if self.scalars.mouse_sensitivity != Some(value) {
            self.scalars.mouse_sensitivity = Some(value);
            self.mouse_dirty = true;
        }
        Ok(())
    }

    pub fn set_mouse_smoothing(&mut self, enabled: bool) {
        if self.scalars.mouse_smoothing != enabled {
            self.scalars.mouse_smoothing = enabled;
            self.mouse_dirty = true;
        }
    }

    /// Sets the FOV applied by one of the custom FOV keys.
    pub fn set_fov(&mut self, slider: FovSlider, value: u32) -> Result<(), ControllerError> {
        check_range("FOV", value, FOV_RANGE)?;
        let current = match slider {
            FovSlider::A => &mut self.scalars.fov_slider_a,
            FovSlider::B => &mut self.scalars.fov_slider_b,
        };
        if *current != Some(value) {
            *current = Some(value);
            self.controls_dirty = true;
        }
        Ok(())
    }

    /// Writes bindings, FOV values and mouse settings to both files
    ///
    /// Either both files are rewritten or, on error, the primary file is
    /// restored and the snapshot stays dirty.
    pub fn apply(&mut self) -> Result<(), ConfigError> {
        self.writer().write(&self.state, &self.scalars, &self.files)?;
        self.controls_dirty = false;
        self.mouse_dirty = false;
        Ok(())
    }

    /// Regenerates the secondary file with the current mouse settings only.
    ///
    /// Pending binding changes stay pending.
    pub fn apply_mouse(&mut self) -> Result<(), ConfigError> {
        self.writer().write_mouse(&self.scalars, &self.files)?;
        self.mouse_dirty = false;
        Ok(())
    }

    /// Restores both files from the packaged templates and reloads them.
    pub fn reset_to_defaults(&mut self) -> Result<(), ConfigError> {
        self.writer().restore_templates(&self.files)?;
        self.load()?;
        info!("Configuration reset to defaults");
        Ok(())
    }

    /// Bindings whose action name, display name or key contains `query`
    ///
    /// Search is case-insensitive; an empty query returns every binding in
    /// presentation order.
    pub fn find_bindings(&self, query: &str) -> Vec<&Binding> {
        let query = query.trim().to_lowercase();
        self.state
            .iter()
            .filter(|binding| {
                query.is_empty()
                    || binding.action.name().contains(&query)
                    || binding.action.display_name().to_lowercase().contains(&query)
                    || binding.label.to_lowercase().contains(&query)
            })
            .collect()
    }

    pub fn bindings(&self) -> &BindState {
        &self.state
    }

    pub fn scalars(&self) -> &ScalarSettings {
        &self.scalars
    }

    pub fn files(&self) -> &ConfigFiles {
        &self.files
    }

    pub fn registry(&self) -> &'static TokenRegistry {
        self.registry
    }

    /// True if anything changed since the last load or apply.
    pub fn is_dirty(&self) -> bool {
        self.controls_dirty || self.mouse_dirty
    }

    /// Backups of both config files, oldest first.
    pub fn backups(&self) -> Result<Vec<PathBuf>, ConfigError> {
        self.files.backups()
    }

    fn writer(&self) -> ConfigWriter<'_> {
        ConfigWriter::new(&self.layout, self.policy)
    }
}

fn check_range(field: &'static str, value: u32, (min, max): (u32, u32)) -> Result<(), ControllerError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ControllerError::OutOfRange { field, value, min, max })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PRIMARY_TEMPLATE, SECONDARY_TEMPLATE};
    use std::fs;
    use tempfile::TempDir;

    /// Helper: a controller over a fresh copy of the packaged files.
    fn create_test_controller() -> (TempDir, Controller) {
        let temp_dir = TempDir::new().unwrap();
        let files = ConfigFiles::in_dir(temp_dir.path());
        fs::write(files.primary(), PRIMARY_TEMPLATE).unwrap();
        fs::write(files.secondary(), SECONDARY_TEMPLATE).unwrap();

        let controller = Controller::new(files, CarryOverPolicy::Legacy).unwrap();
        (temp_dir, controller)
    }

    #[test]
    fn test_open_loads_current_config() {
        let (_temp_dir, controller) = create_test_controller();

        assert_eq!(controller.bindings().label(Action::MoveForward), "W");
        assert_eq!(controller.scalars().mouse_sensitivity, Some(30));
        assert!(!controller.is_dirty());
    }

    #[test]
    fn test_open_missing_install_fails() {
        let temp_dir = TempDir::new().unwrap();
        let result = Controller::new(ConfigFiles::in_dir(temp_dir.path()), CarryOverPolicy::Legacy);
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_assign_revokes_previous_holder() {
        let (_temp_dir, mut controller) = create_test_controller();

        let revoked = controller.assign(Action::Map, "W").unwrap();
        assert_eq!(revoked, vec![Action::MoveForward]);
        assert_eq!(controller.bindings().label(Action::Map), "W");
        assert!(!controller.bindings().is_assigned(Action::MoveForward));
        assert!(controller.is_dirty());
    }

    #[test]
    fn test_assign_same_label_is_not_a_change() {
        let (_temp_dir, mut controller) = create_test_controller();

        let revoked = controller.assign(Action::MoveForward, "W").unwrap();
        assert!(revoked.is_empty());
        assert!(!controller.is_dirty());
    }

    #[test]
    fn test_assign_banned_key_is_rejected() {
        let (_temp_dir, mut controller) = create_test_controller();

        match controller.assign(Action::Map, "Ctrl + LWin") {
            Err(ControllerError::BannedKey(key)) => assert_eq!(key, "LWin"),
            other => panic!("Expected BannedKey, got: {:?}", other),
        }
        assert_eq!(controller.bindings().label(Action::Map), "M");
        assert!(!controller.is_dirty());
    }

    #[test]
    fn test_assign_ignores_case_of_typed_label() {
        let (temp_dir, mut controller) = create_test_controller();

        controller.assign(Action::Crouch, "Ctrl + Space").unwrap();
        let revoked = controller.assign(Action::Zoom, "ctrl + space").unwrap();
        assert_eq!(revoked, vec![Action::Crouch], "Same key combination, different case");
        assert_eq!(controller.bindings().label(Action::Zoom), "Ctrl + Space");

        controller.apply().unwrap();
        let reloaded = Controller::new(ConfigFiles::in_dir(temp_dir.path()), CarryOverPolicy::Legacy)
            .unwrap();
        assert_eq!(reloaded.bindings(), controller.bindings());
        assert!(!reloaded.bindings().is_assigned(Action::Crouch));
    }

    #[test]
    fn test_assign_same_key_in_other_case_is_not_a_change() {
        let (_temp_dir, mut controller) = create_test_controller();

        assert!(controller.assign(Action::MoveForward, "w").unwrap().is_empty());
        assert!(!controller.is_dirty());
    }

    #[test]
    fn test_assign_unbound_label_unbinds() {
        let (_temp_dir, mut controller) = create_test_controller();

        controller.assign(Action::Zoom, "unbound").unwrap();
        assert!(!controller.bindings().is_assigned(Action::Zoom));
    }

    #[test]
    fn test_out_of_range_values_are_rejected() {
        let (_temp_dir, mut controller) = create_test_controller();

        assert!(matches!(
            controller.set_fov(FovSlider::A, 0),
            Err(ControllerError::OutOfRange { field: "FOV", .. })
        ));
        assert!(matches!(
            controller.set_mouse_sensitivity(101),
            Err(ControllerError::OutOfRange { .. })
        ));
        assert!(!controller.is_dirty());
    }

    #[test]
    fn test_apply_persists_changes() {
        let (temp_dir, mut controller) = create_test_controller();

        controller.assign(Action::Crouch, "Shift + C").unwrap();
        controller.set_fov(FovSlider::B, 100).unwrap();
        controller.set_mouse_sensitivity(12).unwrap();
        controller.set_mouse_smoothing(false);
        controller.apply().unwrap();
        assert!(!controller.is_dirty());

        let reloaded = Controller::new(ConfigFiles::in_dir(temp_dir.path()), CarryOverPolicy::Legacy)
            .unwrap();
        assert_eq!(reloaded.bindings().label(Action::Crouch), "Shift + C");
        assert_eq!(reloaded.scalars().fov_slider_b, Some(100));
        assert_eq!(reloaded.scalars().mouse_sensitivity, Some(12));
        assert!(!reloaded.scalars().mouse_smoothing);
    }

    #[test]
    fn test_apply_mouse_keeps_binding_changes_pending() {
        let (temp_dir, mut controller) = create_test_controller();

        controller.assign(Action::Map, "Tab").unwrap();
        controller.set_mouse_sensitivity(45).unwrap();
        controller.apply_mouse().unwrap();
        assert!(controller.is_dirty(), "Binding change is still unsaved");

        let reloaded = Controller::new(ConfigFiles::in_dir(temp_dir.path()), CarryOverPolicy::Legacy)
            .unwrap();
        assert_eq!(reloaded.scalars().mouse_sensitivity, Some(45));
        assert_eq!(reloaded.bindings().label(Action::Map), "M");
    }

    #[test]
    fn test_reset_to_defaults_reloads_templates() {
        let (_temp_dir, mut controller) = create_test_controller();

        controller.assign(Action::Map, "Tab").unwrap();
        controller.apply().unwrap();
        assert_eq!(controller.bindings().label(Action::Map), "Tab");

        controller.reset_to_defaults().unwrap();
        assert_eq!(controller.bindings().label(Action::Map), "M");
        assert!(fs::metadata(controller.files().secondary())
            .unwrap()
            .permissions()
            .readonly());
    }

    #[test]
    fn test_find_bindings() {
        let (_temp_dir, controller) = create_test_controller();

        assert_eq!(controller.find_bindings("").len(), Action::ALL.len());

        let gadgets: Vec<_> = controller
            .find_bindings("GADGET")
            .iter()
            .map(|b| b.action)
            .collect();
        assert!(gadgets.contains(&Action::NextGadget));
        assert!(gadgets.contains(&Action::UseGadgetStrike));
        assert!(!gadgets.contains(&Action::Map));
    }

    #[test]
    fn test_backups_after_apply() {
        let (_temp_dir, mut controller) = create_test_controller();
        assert!(controller.backups().unwrap().is_empty());

        controller.assign(Action::Map, "Tab").unwrap();
        controller.apply().unwrap();
        assert_eq!(controller.backups().unwrap().len(), 2);
    }

    #[test]
    fn test_repeated_apply_keeps_backups_bounded() {
        let (_temp_dir, mut controller) = create_test_controller();

        for fov in 60..80 {
            controller.set_fov(FovSlider::A, fov).unwrap();
            controller.apply().unwrap();
        }

        let limit = controller.files().max_backups().unwrap();
        assert_eq!(controller.backups().unwrap().len(), 2 * limit);
    }
}
