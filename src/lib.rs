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

//! Arkham Asylum Keybinding Manager
//!
//! Reads and writes the game's input configuration: `UserInput.ini`, which
//! holds the key binds at fixed line positions, and `BmInput.ini`, which the
//! engine actually loads and which is regenerated from a template.
//!
//! # Features
//!
//! - **Collision handling:** Binding a key already in use unbinds the old holder
//! - **Modifier keys:** Shift, Ctrl and Alt prefixes encoded as engine flags
//! - **Custom binds:** Hand-written binds below the sentinel comment survive
//!   every regeneration of `BmInput.ini`
//! - **Automatic Backups:** Timestamped backups before every config change
//! - **Atomic Operations:** Temp-file-then-rename writes with paired rollback
//!
//! # Architecture
//!
//! - **`core`:** Business logic (actions, token registry, bind state)
//! - **`config`:** File operations (layout table, reader, writer, backups, settings)
//! - **`controller`:** Headless controller a front end drives
//!
//! # Examples
//!
//! ## Reading the current bindings
//!
//! ```no_run
//! use asylum_keybind_manager::config::{ConfigFiles, ConfigReader, FileLayout};
//! use asylum_keybind_manager::core::{Action, TokenRegistry};
//!
//! let files = ConfigFiles::in_dir("/games/asylum/BmGame/Config");
//! let layout = FileLayout::default();
//! let reader = ConfigReader::new(&layout, TokenRegistry::standard());
//!
//! let (state, scalars) = reader.read(files.primary(), files.secondary())?;
//! println!("Jump is on {}", state.label(Action::RunGlideUse));
//! println!("Sensitivity {:?}", scalars.mouse_sensitivity);
//! # Ok::<(), asylum_keybind_manager::config::ConfigError>(())
//! ```
//!
//! ## Rebinding through the controller
//!
//! ```no_run
//! use asylum_keybind_manager::config::LauncherSettings;
//! use asylum_keybind_manager::controller::Controller;
//! use asylum_keybind_manager::core::Action;
//!
//! let settings = LauncherSettings::load(&LauncherSettings::default_path())?;
//! let mut controller = Controller::open(&settings)?;
//!
//! let revoked = controller.assign(Action::Crouch, "Ctrl + C")?;
//! for action in revoked {
//!     println!("{} is now unbound", action);
//! }
//! controller.apply()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod controller;
pub mod core;

// Re-export commonly used types for convenience
pub use config::{ConfigError, ConfigFiles, LauncherSettings};
pub use controller::{Controller, ControllerError};
pub use core::{Action, BindState, Binding, Modifier, ScalarSettings};
