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

//! Section/key lookup in the secondary config file
//!
//! Only enough INI to find `key=value` inside a `[Section]`. Comment lines
//! (`;`) and anything else that does not parse are skipped.

use nom::{
    bytes::complete::{take_till1, take_until},
    character::complete::{char, space0},
    combinator::rest,
    sequence::{delimited, preceded, separated_pair},
    IResult, Parser,
};

/// Parse a section header: `[Engine.PlayerInput]`
pub fn section_header(input: &str) -> IResult<&str, &str> {
    preceded(space0, delimited(char('['), take_until("]"), char(']')))
        .map(str::trim)
        .parse(input)
}

/// Parse a key/value line: `MouseSensitivity=30.0`
///
/// Key and value are trimmed; the value runs to the end of the line.
pub fn key_value(input: &str) -> IResult<&str, (&str, &str)> {
    separated_pair(
        preceded(space0, take_till1(|c: char| c == '=' || c == ';' || c == '[')),
        char('='),
        rest,
    )
    .map(|(key, value): (&str, &str)| (key.trim(), value.trim()))
    .parse(input)
}

/// Value of `key` in `[section]`; both names compared case-insensitively.
///
/// The first match wins. Returns `None` if the section or key is missing.
pub fn find_value<'a, S: AsRef<str>>(lines: &'a [S], section: &str, key: &str) -> Option<&'a str> {
    let mut in_section = false;

    for line in lines {
        let line = line.as_ref();

        if let Ok((_, name)) = section_header(line) {
            in_section = name.eq_ignore_ascii_case(section);
            continue;
        }
        if !in_section {
            continue;
        }
        if let Ok((_, (k, value))) = key_value(line) {
            if k.eq_ignore_ascii_case(key) {
                return Some(value);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &[&str] = &[
        "[Engine.Console]",
        "MouseSensitivity=99.0",
        "",
        "[Engine.PlayerInput]",
        "; MouseSensitivity=1.0",
        "MouseSensitivity = 30.0",
        "bEnableMouseSmoothing=true",
        "[Engine.DebugCameraInput]",
        "bEnableMouseSmoothing=false",
    ];

    #[test]
    fn test_section_header() {
        assert_eq!(section_header("[Engine.PlayerInput]"), Ok(("", "Engine.PlayerInput")));
        assert!(section_header("MouseSensitivity=30.0").is_err());
    }

    #[test]
    fn test_key_value() {
        assert_eq!(key_value("MouseSensitivity = 30.0"), Ok(("", ("MouseSensitivity", "30.0"))));
        assert!(key_value("; comment=1").is_err());
        assert!(key_value("no equals sign").is_err());
    }

    #[test]
    fn test_find_value_is_scoped_to_section() {
        assert_eq!(find_value(SAMPLE, "Engine.PlayerInput", "MouseSensitivity"), Some("30.0"));
        assert_eq!(find_value(SAMPLE, "engine.playerinput", "benablemousesmoothing"), Some("true"));
        assert_eq!(find_value(SAMPLE, "Engine.DebugCameraInput", "bEnableMouseSmoothing"), Some("false"));
    }

    #[test]
    fn test_find_value_missing() {
        assert_eq!(find_value(SAMPLE, "Engine.PlayerInput", "Nope"), None);
        assert_eq!(find_value(SAMPLE, "Engine.Missing", "MouseSensitivity"), None);
    }
}
