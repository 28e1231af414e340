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

//! Field access on a single bind line
//!
//! A bind line is opaque apart from three things:
//! - the key token, starting at a fixed column and ending at the next quote
//! - the embedded value: the first quoted string after the first comma
//!   (the command, e.g. `"fov 90"`)
//! - `Name=true|false` flags such as `Shift=false`
//!
//! Token and embedded value are replaced by slicing, so the rest of the line
//! is kept byte for byte. Flags are matched as whole words with a regex;
//! `bIgnoreShift=` is its own flag and never counts as `Shift=`.

use regex::{Captures, Regex};
use std::borrow::Cow;
use std::ops::Range;
use std::sync::OnceLock;

use crate::core::Modifier;

/// `Name=true|false` flag pattern
static FLAG_PATTERN: OnceLock<Regex> = OnceLock::new();

/// Get the compiled flag pattern
#[allow(clippy::expect_used)]
fn flag_pattern() -> &'static Regex {
    FLAG_PATTERN.get_or_init(|| {
        Regex::new(r"\b([A-Za-z]+)=((?i:true|false))\b").expect("flag pattern should be valid regex")
    })
}

/// Flags that encode the binding's modifier, in decode priority order.
const MODIFIER_FLAGS: [(&str, Modifier); 3] = [
    ("Shift", Modifier::Shift),
    ("Control", Modifier::Ctrl),
    ("Alt", Modifier::Alt),
];

/// Flag that tells the engine to ignore the Shift state.
const IGNORE_SHIFT_FLAG: &str = "bIgnoreShift";

/// Byte range of the key token: from `column` up to the next quote.
///
/// Returns `None` if the line is shorter than `column` or has no closing
/// quote after it.
pub fn token_range(line: &str, column: usize) -> Option<Range<usize>> {
    let tail = line.get(column..)?;
    let end = tail.find('"')?;
    Some(column..column + end)
}

/// Key token of a bind line, read leniently.
///
/// Lines shorter than `column` are read from the start; without a closing
/// quote the token runs to the end of the line.
pub fn read_token(line: &str, column: usize) -> &str {
    let tail = match line.get(column..) {
        Some(tail) if line.len() > column => tail,
        _ => line,
    };
    tail.split('"').next().unwrap_or(tail)
}

/// Replaces the key token, keeping everything around it.
pub fn replace_token(line: &str, column: usize, token: &str) -> Option<String> {
    let range = token_range(line, column)?;
    Some(splice(line, range, token))
}

/// Byte range of the embedded value: the first quoted string after the
/// first comma, without its quotes.
pub fn embedded_range(line: &str) -> Option<Range<usize>> {
    let comma = line.find(',')?;
    let open = comma + line[comma..].find('"')? + 1;
    let close = open + line[open..].find('"')?;
    Some(open..close)
}

/// The embedded value (`fov 90` in `...,Command="fov 90",...`).
pub fn embedded_value(line: &str) -> Option<&str> {
    embedded_range(line).map(|range| &line[range])
}

/// Replaces the embedded value, keeping everything around it.
pub fn replace_embedded(line: &str, value: &str) -> Option<String> {
    let range = embedded_range(line)?;
    Some(splice(line, range, value))
}

/// Value of a whole-word `name=true|false` flag; case-insensitive value.
pub fn flag(line: &str, name: &str) -> Option<bool> {
    flag_pattern()
        .captures_iter(line)
        .find(|caps| &caps[1] == name)
        .map(|caps| caps[2].eq_ignore_ascii_case("true"))
}

/// Modifier encoded by the line's flags.
///
/// Shift wins over Control, which wins over Alt. Shift is ignored when the
/// line also sets `bIgnoreShift=true`.
pub fn decode_modifier(line: &str) -> Modifier {
    let ignore_shift = flag(line, IGNORE_SHIFT_FLAG) == Some(true);

    MODIFIER_FLAGS
        .iter()
        .filter(|(_, modifier)| !(ignore_shift && *modifier == Modifier::Shift))
        .find(|(name, _)| flag(line, name) == Some(true))
        .map(|(_, modifier)| *modifier)
        .unwrap_or(Modifier::None)
}

/// Rewrites the modifier flags so exactly `modifier` is true.
///
/// Flags missing from the line are not added; a line without any modifier
/// flag is returned unchanged.
pub fn encode_modifier(line: &str, modifier: Modifier) -> Cow<'_, str> {
    let target = modifier.flag_name();

    flag_pattern().replace_all(line, |caps: &Captures| {
        let name = &caps[1];
        if MODIFIER_FLAGS.iter().any(|(known, _)| *known == name) {
            format!("{}={}", name, Some(name) == target)
        } else {
            caps[0].to_string()
        }
    })
}

fn splice(line: &str, range: Range<usize>, replacement: &str) -> String {
    let mut out = String::with_capacity(line.len() + replacement.len());
    out.push_str(&line[..range.start]);
    out.push_str(replacement);
    out.push_str(&line[range.end..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINE: &str =
        r#".Bindings=(Name="SpaceBar",Command="GBA_Jump",Control=false,Shift=false,Alt=false)"#;

    #[test]
    fn test_read_token() {
        assert_eq!(read_token(LINE, 17), "SpaceBar");
        assert_eq!(read_token("short", 17), "short");
    }

    #[test]
    fn test_replace_token_keeps_rest_of_line() {
        let line = replace_token(LINE, 17, "W").unwrap();
        assert_eq!(
            line,
            r#".Bindings=(Name="W",Command="GBA_Jump",Control=false,Shift=false,Alt=false)"#
        );
    }

    #[test]
    fn test_replace_token_needs_closing_quote() {
        assert_eq!(replace_token(".Bindings=(Name=\"W", 17, "Q"), None);
        assert_eq!(replace_token("too short", 17, "Q"), None);
    }

    #[test]
    fn test_embedded_value() {
        assert_eq!(embedded_value(LINE), Some("GBA_Jump"));
        assert_eq!(embedded_value("no comma here"), None);
    }

    #[test]
    fn test_flag_is_whole_word() {
        let line = r#".Bindings=(Name="X",Command="Y",Shift=false,bIgnoreShift=true)"#;
        assert_eq!(flag(line, "Shift"), Some(false));
        assert_eq!(flag(line, "bIgnoreShift"), Some(true));
        assert_eq!(flag(line, "Alt"), None);
    }

    #[test]
    fn test_flag_value_is_case_insensitive() {
        assert_eq!(flag("Control=True", "Control"), Some(true));
        assert_eq!(flag("Control=FALSE", "Control"), Some(false));
    }

    #[test]
    fn test_encode_modifier_without_flags_is_unchanged() {
        let line = r#".Bindings=(Name="F3",Command="fov 90")"#;
        assert!(matches!(encode_modifier(line, Modifier::Alt), Cow::Borrowed(_)));
    }
}
