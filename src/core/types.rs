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

//! src/core/types.rs
//!
//! Core type definitions for keybinding management
//!
//! This module defines the fundamental types used throughout the application:
//! - `Modifier`: The single modifier a binding may carry (Shift, Ctrl, Alt)
//! - `Action`: Every game action the launcher exposes for rebinding
//! - `Binding`: One action together with its human-readable label
//! - `ScalarSettings`: Mouse and FOV values that live outside the bind lines
//!
//! Labels are what the user sees ("Ctrl + Space"). The engine token that ends
//! up in the config file ("SpaceBar") is derived through the token registry.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::registry::TokenRegistry;

/// Label of an action with no key assigned.
pub const UNBOUND: &str = "Unbound";

/// Separator between a modifier and the key in a display label.
pub const LABEL_SEPARATOR: &str = " + ";

/// Modifier carried by a binding
///
/// The engine format stores three independent boolean flags, but only one of
/// them is ever meaningful. A binding holds at most one modifier.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Modifier {
    /// Plain key press
    #[default]
    None,
    /// Shift key
    Shift,
    /// Control key
    Ctrl,
    /// Alt key
    Alt,
}

impl Modifier {
    /// Parses the modifier part of a label ("Shift", "ctrl", "ALT").
    pub fn from_label(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "shift" => Some(Modifier::Shift),
            "ctrl" | "control" => Some(Modifier::Ctrl),
            "alt" => Some(Modifier::Alt),
            _ => None,
        }
    }

    /// Name of the boolean flag in the engine config (`Control=true`).
    pub fn flag_name(self) -> Option<&'static str> {
        match self {
            Modifier::None => None,
            Modifier::Shift => Some("Shift"),
            Modifier::Ctrl => Some("Control"),
            Modifier::Alt => Some("Alt"),
        }
    }

    /// Prefix placed in front of the key in a display label.
    pub fn label_prefix(self) -> &'static str {
        match self {
            Modifier::None => "",
            Modifier::Shift => "Shift + ",
            Modifier::Ctrl => "Ctrl + ",
            Modifier::Alt => "Alt + ",
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Modifier::None => write!(f, "None"),
            Modifier::Shift => write!(f, "Shift"),
            Modifier::Ctrl => write!(f, "Ctrl"),
            Modifier::Alt => write!(f, "Alt"),
        }
    }
}

/// Splits a display label into its modifier and key parts.
///
/// Only a known modifier name in front of the first `+` counts as a prefix,
/// so keys that contain a plus sign themselves ("Num +") stay intact.
///
/// # Example
/// ```
/// use asylum_keybind_manager::core::{split_label, Modifier};
///
/// assert_eq!(split_label("Ctrl + Space"), (Modifier::Ctrl, "Space"));
/// assert_eq!(split_label("Num +"), (Modifier::None, "Num +"));
/// ```
pub fn split_label(label: &str) -> (Modifier, &str) {
    if let Some(pos) = label.find('+') {
        if let Some(modifier) = Modifier::from_label(&label[..pos]) {
            let key = label[pos + 1..].trim();
            if !key.is_empty() {
                return (modifier, key);
            }
        }
    }
    (Modifier::None, label)
}

/// Builds a display label from a modifier and a key.
pub fn join_label(modifier: Modifier, key: &str) -> String {
    format!("{}{}", modifier.label_prefix(), key)
}

/// A rebindable game action
///
/// The declaration order is the order the launcher presents actions in, and
/// the order `BindState` iterates them.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    MoveForward,
    MoveBackward,
    StrafeLeft,
    StrafeRight,
    RunGlideUse,
    Crouch,
    Zoom,
    Grapple,
    ToggleCrouch,
    DetectiveMode,
    UseGadgetStrike,
    CapeTakedown,
    Counter,
    GadgetSecondary,
    PreviousGadget,
    NextGadget,
    CapeStun,
    SpeedRun,
    DebugMenu,
    OpenConsole,
    ToggleHud,
    ResetFov,
    CustomFov1,
    CustomFov2,
    CentreCamera,
    Map,
}

impl Action {
    /// Every action, in presentation order.
    pub const ALL: [Action; 26] = [
        Action::MoveForward,
        Action::MoveBackward,
        Action::StrafeLeft,
        Action::StrafeRight,
        Action::RunGlideUse,
        Action::Crouch,
        Action::Zoom,
        Action::Grapple,
        Action::ToggleCrouch,
        Action::DetectiveMode,
        Action::UseGadgetStrike,
        Action::CapeTakedown,
        Action::Counter,
        Action::GadgetSecondary,
        Action::PreviousGadget,
        Action::NextGadget,
        Action::CapeStun,
        Action::SpeedRun,
        Action::DebugMenu,
        Action::OpenConsole,
        Action::ToggleHud,
        Action::ResetFov,
        Action::CustomFov1,
        Action::CustomFov2,
        Action::CentreCamera,
        Action::Map,
    ];

    /// Position of this action in `Action::ALL`.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Stable identifier used on the command line and in serialised data.
    pub fn name(self) -> &'static str {
        match self {
            Action::MoveForward => "move-forward",
            Action::MoveBackward => "move-backward",
            Action::StrafeLeft => "strafe-left",
            Action::StrafeRight => "strafe-right",
            Action::RunGlideUse => "run-glide-use",
            Action::Crouch => "crouch",
            Action::Zoom => "zoom",
            Action::Grapple => "grapple",
            Action::ToggleCrouch => "toggle-crouch",
            Action::DetectiveMode => "detective-mode",
            Action::UseGadgetStrike => "use-gadget-strike",
            Action::CapeTakedown => "cape-takedown",
            Action::Counter => "counter",
            Action::GadgetSecondary => "gadget-secondary",
            Action::PreviousGadget => "previous-gadget",
            Action::NextGadget => "next-gadget",
            Action::CapeStun => "cape-stun",
            Action::SpeedRun => "speed-run",
            Action::DebugMenu => "debug-menu",
            Action::OpenConsole => "open-console",
            Action::ToggleHud => "toggle-hud",
            Action::ResetFov => "reset-fov",
            Action::CustomFov1 => "custom-fov-1",
            Action::CustomFov2 => "custom-fov-2",
            Action::CentreCamera => "centre-camera",
            Action::Map => "map",
        }
    }

    /// Looks an action up by its `name()`; case-insensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Action::ALL
            .into_iter()
            .find(|action| action.name().eq_ignore_ascii_case(name))
    }

    /// Title shown next to the bind button.
    pub fn display_name(self) -> &'static str {
        match self {
            Action::MoveForward => "Move Forward",
            Action::MoveBackward => "Move Backward",
            Action::StrafeLeft => "Strafe Left",
            Action::StrafeRight => "Strafe Right",
            Action::RunGlideUse => "Run / Glide / Use",
            Action::Crouch => "Crouch",
            Action::Zoom => "Zoom",
            Action::Grapple => "Grapple",
            Action::ToggleCrouch => "Toggle Crouch",
            Action::DetectiveMode => "Detective Mode",
            Action::UseGadgetStrike => "Use Gadget / Strike",
            Action::CapeTakedown => "Cape / Takedown",
            Action::Counter => "Counter",
            Action::GadgetSecondary => "Gadget Secondary",
            Action::PreviousGadget => "Previous Gadget",
            Action::NextGadget => "Next Gadget",
            Action::CapeStun => "Cape Stun",
            Action::SpeedRun => "Speedrun Timer",
            Action::DebugMenu => "Debug Menu",
            Action::OpenConsole => "Open Console",
            Action::ToggleHud => "Toggle HUD",
            Action::ResetFov => "Reset FOV",
            Action::CustomFov1 => "Custom FOV 1",
            Action::CustomFov2 => "Custom FOV 2",
            Action::CentreCamera => "Centre Camera",
            Action::Map => "Map",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// One action and the key currently assigned to it
///
/// `modifier` and `raw_token` are derived from `label` and are kept in sync by
/// `Binding::new`; build a new value rather than editing the label in place.
///
/// # Example
/// ```ignore
/// let binding = Binding::new(Action::Crouch, "Ctrl + Space", TokenRegistry::standard());
/// // binding.modifier == Modifier::Ctrl, binding.raw_token == "SpaceBar"
/// ```
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Binding {
    /// The action this binding drives
    pub action: Action,

    /// Human-readable label, e.g. "Ctrl + Space" or "Unbound"
    pub label: String,

    /// Modifier parsed from the label prefix
    pub modifier: Modifier,

    /// Engine token for the key part of the label
    pub raw_token: String,
}

impl Binding {
    pub fn new(action: Action, label: impl Into<String>, registry: &TokenRegistry) -> Self {
        let label = label.into();
        let (modifier, key) = split_label(&label);
        // Unknown keys are written without their spaces ("Mouse Thumb 3" → "MouseThumb3")
        let compact: String = key.split_whitespace().collect();
        let raw_token = registry.to_config(&compact).to_string();

        Self {
            action,
            modifier,
            raw_token,
            label,
        }
    }

    /// An action with no key assigned.
    pub fn unbound(action: Action) -> Self {
        Self {
            action,
            label: UNBOUND.to_string(),
            modifier: Modifier::None,
            raw_token: UNBOUND.to_string(),
        }
    }

    /// False when the label is the "Unbound" sentinel.
    pub fn is_assigned(&self) -> bool {
        self.label != UNBOUND
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.action.display_name(), self.label)
    }
}

/// Settings that are not key bindings
///
/// Numeric values are `None` when they could not be parsed from the files;
/// the writer leaves the corresponding config text untouched in that case.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ScalarSettings {
    /// Whole-number mouse sensitivity (written back as "<n>.0")
    pub mouse_sensitivity: Option<u32>,

    /// Engine-side mouse smoothing
    pub mouse_smoothing: bool,

    /// FOV applied by the first custom FOV key
    pub fov_slider_a: Option<u32>,

    /// FOV applied by the second custom FOV key
    pub fov_slider_b: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifier_display() {
        assert_eq!(format!("{}", Modifier::Shift), "Shift");
        assert_eq!(format!("{}", Modifier::Ctrl), "Ctrl");
        assert_eq!(Modifier::Ctrl.flag_name(), Some("Control"));
        assert_eq!(Modifier::None.flag_name(), None);
    }

    #[test]
    fn test_action_index_matches_declaration_order() {
        for (i, action) in Action::ALL.iter().enumerate() {
            assert_eq!(action.index(), i, "{:?} out of order", action);
        }
    }

    #[test]
    fn test_action_names_round_trip() {
        for action in Action::ALL {
            assert_eq!(Action::from_name(action.name()), Some(action));
        }
        assert_eq!(Action::from_name("MOVE-FORWARD"), Some(Action::MoveForward));
        assert_eq!(Action::from_name("fly"), None);
    }
}
