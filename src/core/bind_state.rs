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

//! In-memory binding state with key collision handling
//!
//! A physical key can only trigger one action. Assigning a key to an action
//! revokes it from every other action that holds it, the same way a real
//! keyboard would behave.
//!
//! # Performance
//! - Lookup by action: O(1) (bindings are stored in `Action::ALL` order)
//! - Collision check: O(1) average case via a HashMap keyed on the
//!   lowercase key part of each label

use std::collections::HashMap;

use crate::core::registry::TokenRegistry;
use crate::core::types::{split_label, Action, Binding, UNBOUND};

/// Ordered bindings for every action plus a reverse index for collisions.
///
/// The state always holds exactly one binding per `Action`, so lookups by
/// action cannot miss.
#[derive(Clone, Debug)]
pub struct BindState {
    registry: &'static TokenRegistry,
    /// One binding per action, in `Action::ALL` order
    bindings: Vec<Binding>,
    /// Lowercase key part of each assigned label → actions using it
    by_key: HashMap<String, Vec<Action>>,
}

impl BindState {
    /// Creates a state where every action is unbound.
    pub fn new(registry: &'static TokenRegistry) -> Self {
        Self {
            registry,
            bindings: Action::ALL.into_iter().map(Binding::unbound).collect(),
            by_key: HashMap::new(),
        }
    }

    /// Builds a state from labels read out of a config file.
    ///
    /// Labels are taken as-is: collisions already present in the file are
    /// preserved, since the file is the source of truth at load time.
    /// Actions missing from `labels` stay unbound.
    pub fn from_labels<I, S>(registry: &'static TokenRegistry, labels: I) -> Self
    where
        I: IntoIterator<Item = (Action, S)>,
        S: Into<String>,
    {
        let mut state = Self::new(registry);
        for (action, label) in labels {
            state.put(Binding::new(action, label, registry));
        }
        state
    }

    /// Assigns `label` to `action`, revoking it from any other holder.
    ///
    /// An existing binding is reset to "Unbound" when its label equals
    /// `label`, when it equals the key part of `label` (ignoring case), or
    /// when its own key part equals `label`. So "Space" revokes both "Space"
    /// and "Shift + Space", while "Ctrl + Space" revokes "Ctrl + Space" and
    /// the plain "Space".
    ///
    /// Returns the actions that lost their binding, in presentation order.
    /// Assigning the same label twice is a no-op the second time.
    pub fn assign(&mut self, action: Action, label: &str) -> Vec<Action> {
        let mut revoked = Vec::new();

        if label != UNBOUND {
            let (_, trimmed) = split_label(label);

            let candidates = self
                .by_key
                .get(&index_key(label))
                .cloned()
                .unwrap_or_default();

            for holder in candidates {
                if holder == action {
                    continue;
                }
                let existing = &self.bindings[holder.index()].label;
                let collides = existing == label
                    || existing.eq_ignore_ascii_case(trimmed)
                    || split_label(existing).1 == label;

                if collides {
                    self.put(Binding::unbound(holder));
                    revoked.push(holder);
                }
            }
            revoked.sort();
        }

        self.put(Binding::new(action, label, self.registry));
        revoked
    }

    /// Resets an action to "Unbound".
    pub fn unbind(&mut self, action: Action) {
        self.put(Binding::unbound(action));
    }

    /// Binding for an action.
    pub fn get(&self, action: Action) -> &Binding {
        &self.bindings[action.index()]
    }

    /// Display label for an action.
    pub fn label(&self, action: Action) -> &str {
        &self.get(action).label
    }

    /// False when the action is unbound.
    pub fn is_assigned(&self, action: Action) -> bool {
        self.get(action).is_assigned()
    }

    /// Actions currently holding a label that collides with `label`'s key.
    pub fn holders_of(&self, label: &str) -> Vec<Action> {
        let mut holders = self
            .by_key
            .get(&index_key(label))
            .cloned()
            .unwrap_or_default();
        holders.sort();
        holders
    }

    /// Actions with no key assigned.
    pub fn unbound_actions(&self) -> Vec<Action> {
        self.bindings
            .iter()
            .filter(|b| !b.is_assigned())
            .map(|b| b.action)
            .collect()
    }

    /// Iterates bindings in presentation order.
    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.iter()
    }

    /// The registry labels are translated with.
    pub fn registry(&self) -> &'static TokenRegistry {
        self.registry
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Replaces the binding for `binding.action`, keeping the index in sync.
    fn put(&mut self, binding: Binding) {
        let action = binding.action;
        let previous = &self.bindings[action.index()];

        if previous.is_assigned() {
            let key = index_key(&previous.label);
            if let Some(holders) = self.by_key.get_mut(&key) {
                holders.retain(|a| *a != action);
                if holders.is_empty() {
                    self.by_key.remove(&key);
                }
            }
        }

        if binding.is_assigned() {
            self.by_key
                .entry(index_key(&binding.label))
                .or_default()
                .push(action);
        }

        self.bindings[action.index()] = binding;
    }
}

impl PartialEq for BindState {
    fn eq(&self, other: &Self) -> bool {
        self.bindings == other.bindings
    }
}

impl Eq for BindState {}

/// Index key for a label: the lowercase key part, modifier dropped.
fn index_key(label: &str) -> String {
    split_label(label).1.to_lowercase()
}
