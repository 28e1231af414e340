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

//! Engine token registry
//!
//! Maps engine key tokens ("SpaceBar") to the labels the launcher shows
//! ("Space") and back. Keys whose token already reads well ("W", "F1") are not
//! listed: both lookups pass unknown input through unchanged, so callers never
//! have to special-case them.
//!
//! The registry also owns the deny-list of platform key identifiers that must
//! never be captured as a new bind.

use crate::core::types::{join_label, split_label, UNBOUND};

/// One engine token and its display label.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TokenPair {
    /// Token as written in the engine config (case-sensitive)
    pub config_token: &'static str,
    /// Label shown to the user (matched case-insensitively, spaces ignored)
    pub human_label: &'static str,
}

const fn pair(config_token: &'static str, human_label: &'static str) -> TokenPair {
    TokenPair {
        config_token,
        human_label,
    }
}

/// Engine tokens that need a friendlier label.
///
/// Insertion order matters: the first match wins in both directions.
const STANDARD_PAIRS: &[TokenPair] = &[
    pair("LeftMouseButton", "Left Mouse"),
    pair("RightMouseButton", "Right Mouse"),
    pair("MouseScrollUp", "Mousewheel Up"),
    pair("MouseScrollDown", "Mousewheel Down"),
    pair("LeftControl", "Ctrl"),
    pair("MiddleMouseButton", "Middle Mouse"),
    pair("ThumbMouseButton", "Mouse Thumb 1"),
    pair("ThumbMouseButton2", "Mouse Thumb 2"),
    pair("SpaceBar", "Space"),
    pair("CapsLock", "Caps"),
    pair("Backslash", "\\"),
    pair("RightAlt", "Right Alt"),
    pair("Underscore", "-"),
    pair("Equals", "="),
    pair("LeftBracket", "["),
    pair("RightBracket", "]"),
    pair("Semicolon", ";"),
    pair("Comma", ","),
    pair("Period", "."),
    pair("Slash", "/"),
    pair("PageUp", "Page Up"),
    pair("PageDown", "Page Down"),
    pair("Divide", "Num /"),
    pair("Multiply", "Num *"),
    pair("NumpadZero", "Num 0"),
    pair("NumpadOne", "Num 1"),
    pair("NumpadTwo", "Num 2"),
    pair("NumpadThree", "Num 3"),
    pair("NumpadFour", "Num 4"),
    pair("NumpadFive", "Num 5"),
    pair("NumpadSix", "Num 6"),
    pair("NumpadSeven", "Num 7"),
    pair("NumpadEight", "Num 8"),
    pair("NumpadNine", "Num 9"),
    pair("Add", "Num +"),
    pair("Decimal", "Num ."),
    pair("Zero", "0"),
    pair("One", "1"),
    pair("Two", "2"),
    pair("Three", "3"),
    pair("Four", "4"),
    pair("Five", "5"),
    pair("Six", "6"),
    pair("Seven", "7"),
    pair("Eight", "8"),
    pair("Nine", "9"),
    pair("TAB", "Tab"),
    pair("LeftShift", "Shift"),
    pair("LeftAlt", "Alt"),
];

/// Platform key identifiers the engine reserves or mishandles.
///
/// Covers OEM/system keys, the Windows keys, lock keys and the numpad
/// operator keys as reported by the keyboard capture layer.
const BANNED_KEYS: &[&str] = &[
    "OEM8", "OEM6", "OEM5", "LWIN", "RWIN", "OEM7", "SCROLL", "OEM1", "OEMTILDE",
    "NUMLOCK", "MULTIPLY", "DIVIDE", "SUBTRACT", "ADD", "DECIMAL", "PAUSE", "CLEAR",
];

static STANDARD: TokenRegistry = TokenRegistry::new(STANDARD_PAIRS, BANNED_KEYS);

/// Bidirectional token/label lookup plus the banned-key filter
///
/// Immutable and cheap to share; the process-wide instance is
/// `TokenRegistry::standard()`.
#[derive(Debug)]
pub struct TokenRegistry {
    pairs: &'static [TokenPair],
    banned: &'static [&'static str],
}

impl TokenRegistry {
    /// Creates a registry over static tables.
    pub const fn new(pairs: &'static [TokenPair], banned: &'static [&'static str]) -> Self {
        Self { pairs, banned }
    }

    /// The registry for the game's engine tokens.
    pub fn standard() -> &'static TokenRegistry {
        &STANDARD
    }

    /// Converts an engine token to its display label.
    ///
    /// Lookup is case-sensitive. Unknown tokens are returned unchanged.
    pub fn to_human<'a>(&self, config_token: &'a str) -> &'a str {
        self.pairs
            .iter()
            .find(|p| p.config_token == config_token)
            .map(|p| p.human_label)
            .unwrap_or(config_token)
    }

    /// Converts a display label (without modifier) to its engine token.
    ///
    /// Spaces are ignored on both sides and case does not matter, so "num/"
    /// and "Num /" both resolve to "Divide". Unknown labels are returned
    /// unchanged.
    pub fn to_config<'a>(&self, human_label: &'a str) -> &'a str {
        self.pairs
            .iter()
            .find(|p| eq_ignoring_spaces(p.human_label, human_label))
            .map(|p| p.config_token)
            .unwrap_or(human_label)
    }

    /// Normalises a user-typed label to the form the reader produces.
    ///
    /// The modifier is spelled "Shift", "Ctrl" or "Alt", a known key takes its
    /// registry label, and an unknown key loses its spaces. Unknown names of
    /// up to three characters ("w", "f10") are upper-cased. Two labels for
    /// the same physical key combination always normalise to the same string.
    ///
    /// # Example
    /// ```
    /// use asylum_keybind_manager::core::TokenRegistry;
    ///
    /// let registry = TokenRegistry::standard();
    /// assert_eq!(registry.canonical_label("control + space"), "Ctrl + Space");
    /// assert_eq!(registry.canonical_label("shift+w"), "Shift + W");
    /// ```
    pub fn canonical_label(&self, label: &str) -> String {
        let label = label.trim();
        if label.eq_ignore_ascii_case(UNBOUND) {
            return UNBOUND.to_string();
        }

        let (modifier, key) = split_label(label);
        let compact: String = key.split_whitespace().collect();
        let human = self.to_human(self.to_config(&compact));

        let known = self.pairs.iter().any(|p| p.human_label == human);
        if !known && human.len() <= 3 && human.chars().all(|c| c.is_ascii_alphanumeric()) {
            join_label(modifier, &human.to_ascii_uppercase())
        } else {
            join_label(modifier, human)
        }
    }

    /// True if the key identifier is on the deny-list (case-insensitive).
    pub fn is_banned(&self, key_identifier: &str) -> bool {
        let key = key_identifier.trim();
        self.banned.iter().any(|banned| banned.eq_ignore_ascii_case(key))
    }

    /// All token pairs in insertion order.
    pub fn pairs(&self) -> impl Iterator<Item = &TokenPair> {
        self.pairs.iter()
    }

    /// The deny-list in declaration order.
    pub fn banned_keys(&self) -> &[&'static str] {
        self.banned
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Compares two strings ignoring spaces and ASCII case.
fn eq_ignoring_spaces(a: &str, b: &str) -> bool {
    let mut a = a.chars().filter(|c| *c != ' ');
    let mut b = b.chars().filter(|c| *c != ' ');
    loop {
        match (a.next(), b.next()) {
            (None, None) => return true,
            (Some(x), Some(y)) if x.eq_ignore_ascii_case(&y) => continue,
            _ => return false,
        }
    }
}
