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

//! Line-addressable config documents and the custom-bind carry-over region
//!
//! A `ConfigDocument` is the whole file as an ordered list of lines. Lines the
//! writer does not manage are never touched, and the text encoding and line
//! ending of the source are kept when the document is rendered again.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::{layout::FileLayout, ConfigError};

/// Text encoding detected from the byte order mark.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum TextEncoding {
    #[default]
    Utf8,
    Utf8Bom,
    Utf16Le,
}

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const UTF16LE_BOM: &[u8] = &[0xFF, 0xFE];

/// An ordered sequence of config lines, addressable by zero-based index.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConfigDocument {
    /// Where the document was loaded from, for error messages
    path: Option<PathBuf>,
    lines: Vec<String>,
    line_ending: &'static str,
    encoding: TextEncoding,
}

impl ConfigDocument {
    /// Splits text into lines. CRLF input is rendered back as CRLF.
    pub fn parse(content: &str) -> Self {
        let line_ending = if content.contains("\r\n") { "\r\n" } else { "\n" };

        Self {
            path: None,
            lines: content.lines().map(str::to_string).collect(),
            line_ending,
            encoding: TextEncoding::Utf8,
        }
    }

    /// Reads a document from disk.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if the file does not exist and
    /// `ConfigError::ReadFailed` if it cannot be read or decoded.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let bytes = fs::read(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;

        let (content, encoding) = decode(&bytes).map_err(|reason| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, reason),
        })?;

        let mut document = Self::parse(&content);
        document.encoding = encoding;
        document.path = Some(path.to_path_buf());

        debug!(path = %path.display(), lines = document.len(), "Loaded config document");
        Ok(document)
    }

    /// Line at `index`, if the document is long enough.
    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    /// Line at `index`, or `ConfigError::MissingLine`.
    pub fn require_line(&self, index: usize) -> Result<&str, ConfigError> {
        self.line(index).ok_or_else(|| self.missing(index))
    }

    /// Replaces the line at `index`.
    pub fn set_line(&mut self, index: usize, line: String) -> Result<(), ConfigError> {
        match self.lines.get_mut(index) {
            Some(slot) => {
                *slot = line;
                Ok(())
            }
            None => Err(self.missing(index)),
        }
    }

    /// Index of the first line at or after `from` whose trimmed text is `text`.
    pub fn find_line(&self, from: usize, text: &str) -> Option<usize> {
        self.lines
            .iter()
            .enumerate()
            .skip(from)
            .find(|(_, line)| line.trim() == text)
            .map(|(index, _)| index)
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Joins the lines back into text; every line is terminated.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.lines.iter().map(|l| l.len() + 2).sum());
        for line in &self.lines {
            out.push_str(line);
            out.push_str(self.line_ending);
        }
        out
    }

    /// Renders the document in the encoding it was loaded with.
    pub fn to_bytes(&self) -> Vec<u8> {
        let text = self.render();
        match self.encoding {
            TextEncoding::Utf8 => text.into_bytes(),
            TextEncoding::Utf8Bom => [UTF8_BOM, text.as_bytes()].concat(),
            TextEncoding::Utf16Le => {
                let mut bytes = UTF16LE_BOM.to_vec();
                bytes.extend(text.encode_utf16().flat_map(u16::to_le_bytes));
                bytes
            }
        }
    }

    /// Builds a document with this document's encoding and line ending.
    fn with_lines(&self, lines: Vec<String>) -> Self {
        Self {
            path: self.path.clone(),
            lines,
            line_ending: self.line_ending,
            encoding: self.encoding,
        }
    }

    fn missing(&self, line: usize) -> ConfigError {
        ConfigError::MissingLine {
            path: self.path.clone().unwrap_or_default(),
            line,
        }
    }
}

fn decode(bytes: &[u8]) -> Result<(String, TextEncoding), String> {
    if let Some(rest) = bytes.strip_prefix(UTF16LE_BOM) {
        if rest.len() % 2 != 0 {
            return Err("odd byte count in UTF-16 file".to_string());
        }
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        let text = String::from_utf16(&units).map_err(|e| e.to_string())?;
        return Ok((text, TextEncoding::Utf16Le));
    }

    if let Some(rest) = bytes.strip_prefix(UTF8_BOM) {
        let text = String::from_utf8(rest.to_vec()).map_err(|e| e.to_string())?;
        return Ok((text, TextEncoding::Utf8Bom));
    }

    let text = String::from_utf8(bytes.to_vec()).map_err(|e| e.to_string())?;
    Ok((text, TextEncoding::Utf8))
}

/// How a leading character is stripped from lines copied into the
/// secondary file
///
/// Primary bind lines start with `.` (append) while the secondary file uses
/// plain `Bindings=`. The two policies differ only for non-comment lines
/// above the sentinel that do not start with `.`.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CarryOverPolicy {
    /// Above the sentinel drop the first character of every non-comment
    /// line; below it drop only a leading `.`
    #[default]
    Legacy,
    /// Drop a leading `.` everywhere and nothing else
    DotPrefixOnly,
}

/// Lines carried from the primary file into the regenerated secondary file
///
/// Starts at the layout's carry start line and runs to the end of the
/// primary file, so user-authored binds below the sentinel survive every
/// regeneration. Comment lines are copied unchanged; the sentinel itself is
/// annotated so nobody edits the derived copy by hand.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CarriedRegion {
    lines: Vec<String>,
    /// Index into `lines` of the annotated sentinel, if one was found
    sentinel: Option<usize>,
}

impl CarriedRegion {
    pub fn from_primary(
        primary: &ConfigDocument,
        layout: &FileLayout,
        policy: CarryOverPolicy,
    ) -> Self {
        let mut lines = Vec::new();
        let mut sentinel = None;

        for line in primary.lines().iter().skip(layout.carry_start_line) {
            if line.contains(layout.sentinel.as_str()) {
                sentinel = Some(lines.len());
                lines.push(format!("{} {}", layout.sentinel, layout.sentinel_note));
            } else if line.contains(';') {
                lines.push(line.clone());
            } else {
                let custom = sentinel.is_some();
                lines.push(strip_leading(line, custom, policy).to_string());
            }
        }

        Self { lines, sentinel }
    }

    /// Every carried line, in order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Lines after the sentinel (the user's own binds).
    pub fn custom_lines(&self) -> &[String] {
        match self.sentinel {
            Some(index) => &self.lines[index + 1..],
            None => &[],
        }
    }

    pub fn has_sentinel(&self) -> bool {
        self.sentinel.is_some()
    }

    /// Replaces the template's keyboard block with the carried lines.
    ///
    /// Output is the template up to `carry_insert_line`, the carried lines,
    /// then the template again from the line just before `resume_section`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingAnchor` if the template is shorter than the
    /// insertion line or has no `resume_section` after it.
    pub fn splice_into(
        &self,
        template: &ConfigDocument,
        layout: &FileLayout,
    ) -> Result<ConfigDocument, ConfigError> {
        let insert_at = layout.carry_insert_line;
        if template.len() < insert_at {
            return Err(ConfigError::MissingAnchor(format!("line {}", insert_at)));
        }

        let resume = template
            .find_line(insert_at, &layout.resume_section)
            .ok_or_else(|| ConfigError::MissingAnchor(layout.resume_section.clone()))?;
        // Keep the separator line in front of the section
        let resume_from = resume.saturating_sub(1).max(insert_at);

        let tail = &template.lines()[resume_from..];
        let mut lines = Vec::with_capacity(insert_at + self.lines.len() + tail.len());
        lines.extend_from_slice(&template.lines()[..insert_at]);
        lines.extend(self.lines.iter().cloned());
        lines.extend_from_slice(tail);

        Ok(template.with_lines(lines))
    }
}

fn strip_leading(line: &str, custom: bool, policy: CarryOverPolicy) -> &str {
    match policy {
        CarryOverPolicy::DotPrefixOnly => line.strip_prefix('.').unwrap_or(line),
        CarryOverPolicy::Legacy if custom => line.strip_prefix('.').unwrap_or(line),
        CarryOverPolicy::Legacy => {
            let mut chars = line.chars();
            match chars.next() {
                Some(_) => chars.as_str(),
                None => line,
            }
        }
    }
}
