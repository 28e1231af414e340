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

//! src/core/mod.rs
//!
//! Core business logic module
//!
//! This module contains the fundamental data structures and algorithms
//! for keybinding management, including:
//! - Type definitions for actions, bindings and modifiers
//! - The engine token registry and banned-key filter
//! - Bind state with HashMap-based collision handling
//!
//! All business logic is isolated from file I/O so it can be unit tested
//! without touching the game's config directory.

pub mod bind_state;
pub mod registry;
pub mod types;

pub use bind_state::BindState;
pub use registry::{TokenPair, TokenRegistry};
pub use types::*;

#[cfg(test)]
mod tests;
