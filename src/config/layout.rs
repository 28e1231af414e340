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

//! Fixed line layout of the game's input config files
//!
//! The engine reads `UserInput.ini` by position, so every action lives on a
//! known zero-based line. This table is the only place those numbers appear;
//! the reader and the writer both go through it.
//!
//! # Primary file (`UserInput.ini`)
//!
//! ```text
//! .Bindings=(Name="SpaceBar",Command="GBA_RunGlideUse",Control=false,Shift=false,Alt=false)
//! ^                ^ token column (17)
//! ```
//!
//! # Secondary file (`BmInput.ini`)
//!
//! Regenerated from a template. Two scalar lines are patched and the
//! keyboard block starting at `carry_insert_line` is replaced by the lines
//! carried over from the primary file, up to the line before
//! `resume_section`.

use crate::core::Action;

/// Where one action lives in the primary file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ActionSlot {
    pub action: Action,
    /// Line the reader takes the label from
    pub line: usize,
    /// Extra lines the writer keeps bound to the same key
    pub mirrors: Vec<usize>,
}

impl ActionSlot {
    fn new(action: Action, line: usize) -> Self {
        Self {
            action,
            line,
            mirrors: Vec::new(),
        }
    }

    fn mirrored(action: Action, line: usize, mirror: usize) -> Self {
        Self {
            action,
            line,
            mirrors: vec![mirror],
        }
    }

    /// Primary line followed by its mirrors.
    pub fn lines(&self) -> impl Iterator<Item = usize> + '_ {
        std::iter::once(self.line).chain(self.mirrors.iter().copied())
    }
}

/// Line positions and anchors for both config files
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FileLayout {
    /// Column where the quoted key token starts on a bind line
    pub token_column: usize,
    /// One slot per action
    pub slots: Vec<ActionSlot>,
    /// Bind line whose command opens the console with its own key
    pub console_line: usize,
    /// Bind lines carrying `fov <n>` commands for the two FOV sliders
    pub fov_lines: [usize; 2],

    /// Comment marking the start of user-authored binds in the primary file
    pub sentinel: String,
    /// Appended to the sentinel when it is copied into the secondary file
    pub sentinel_note: String,
    /// First primary line copied into the secondary file
    pub carry_start_line: usize,

    /// Section holding the mouse settings in the secondary file
    pub mouse_section: String,
    pub sensitivity_key: String,
    pub smoothing_key: String,
    /// Secondary lines overwritten with the mouse settings
    pub sensitivity_line: usize,
    pub smoothing_line: usize,
    /// Secondary line where carried-over lines are inserted
    pub carry_insert_line: usize,
    /// Template section that follows the carried-over block
    pub resume_section: String,
}

impl FileLayout {
    /// Slot for an action.
    pub fn slot(&self, action: Action) -> Option<&ActionSlot> {
        self.slots.iter().find(|s| s.action == action)
    }
}

impl Default for FileLayout {
    /// Layout of the shipped `UserInput.ini` / `BmInput.ini`.
    fn default() -> Self {
        Self {
            token_column: 17,
            slots: vec![
                ActionSlot::new(Action::MoveForward, 5),
                ActionSlot::new(Action::MoveBackward, 6),
                ActionSlot::new(Action::StrafeLeft, 7),
                ActionSlot::new(Action::StrafeRight, 8),
                ActionSlot::new(Action::RunGlideUse, 9),
                ActionSlot::new(Action::Crouch, 10),
                ActionSlot::new(Action::Zoom, 11),
                ActionSlot::mirrored(Action::Grapple, 12, 35),
                ActionSlot::new(Action::ToggleCrouch, 13),
                ActionSlot::new(Action::DetectiveMode, 18),
                ActionSlot::new(Action::UseGadgetStrike, 19),
                ActionSlot::new(Action::CapeTakedown, 17),
                ActionSlot::new(Action::Counter, 22),
                ActionSlot::mirrored(Action::GadgetSecondary, 25, 49),
                ActionSlot::mirrored(Action::PreviousGadget, 14, 37),
                ActionSlot::mirrored(Action::NextGadget, 15, 38),
                ActionSlot::new(Action::CapeStun, 50),
                ActionSlot::new(Action::SpeedRun, 59),
                ActionSlot::new(Action::DebugMenu, 60),
                ActionSlot::new(Action::OpenConsole, 53),
                ActionSlot::new(Action::ToggleHud, 54),
                ActionSlot::new(Action::ResetFov, 55),
                ActionSlot::new(Action::CustomFov1, 56),
                ActionSlot::new(Action::CustomFov2, 57),
                ActionSlot::new(Action::CentreCamera, 58),
                ActionSlot::new(Action::Map, 16),
            ],
            console_line: 53,
            fov_lines: [56, 57],
            sentinel: "; Add your own custom keybinds below this line.".to_string(),
            sentinel_note: "(Automatically carried over from UserInput.ini, DO NOT MODIFY!)"
                .to_string(),
            carry_start_line: 5,
            mouse_section: "Engine.PlayerInput".to_string(),
            sensitivity_key: "MouseSensitivity".to_string(),
            smoothing_key: "bEnableMouseSmoothing".to_string(),
            sensitivity_line: 5,
            smoothing_line: 7,
            carry_insert_line: 209,
            resume_section: "[Engine.DebugCameraInput]".to_string(),
        }
    }
}
