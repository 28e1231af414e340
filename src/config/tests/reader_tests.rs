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

use std::fs;
use tempfile::TempDir;

use super::{create_test_install, read_lines};
use crate::config::{ConfigDocument, ConfigError, ConfigReader, FileLayout};
use crate::core::{Action, Modifier, TokenRegistry, UNBOUND};

// ============================================================================
// Bindings
// ============================================================================

#[test]
fn test_read_packaged_defaults() {
    let (_temp_dir, files) = create_test_install();
    let layout = FileLayout::default();
    let reader = ConfigReader::new(&layout, TokenRegistry::standard());

    let (state, scalars) = reader.read(files.primary(), files.secondary()).unwrap();

    assert_eq!(state.label(Action::MoveForward), "W");
    assert_eq!(state.label(Action::RunGlideUse), "Space");
    assert_eq!(state.label(Action::Crouch), "Ctrl");
    assert_eq!(state.label(Action::Zoom), "Middle Mouse");
    assert_eq!(state.label(Action::PreviousGadget), "Mousewheel Up");
    assert_eq!(state.label(Action::OpenConsole), "Tilde");
    assert_eq!(state.label(Action::CustomFov1), "F3");
    assert!(state.unbound_actions().is_empty(), "Defaults bind every action");

    assert_eq!(scalars.mouse_sensitivity, Some(30));
    assert!(scalars.mouse_smoothing);
    assert_eq!(scalars.fov_slider_a, Some(90));
    assert_eq!(scalars.fov_slider_b, Some(110));
}

#[test]
fn test_raw_tokens_survive_translation() {
    let (_temp_dir, files) = create_test_install();
    let layout = FileLayout::default();
    let reader = ConfigReader::new(&layout, TokenRegistry::standard());

    let (state, _) = reader.read(files.primary(), files.secondary()).unwrap();

    // The binding's engine token matches what is on its line
    let lines = read_lines(files.primary());
    for slot in &layout.slots {
        let line = &lines[slot.line];
        let token = &line[17..17 + line[17..].find('"').unwrap()];
        assert_eq!(state.get(slot.action).raw_token, token, "{:?}", slot.action);
    }
}

#[test]
fn test_modifier_priority_shift_over_control() {
    let layout = FileLayout::default();
    let reader = ConfigReader::new(&layout, TokenRegistry::standard());

    let line = r#".Bindings=(Name="E",Command="GBA_Grapple",Control=true,Shift=true,Alt=true)"#;
    assert_eq!(reader.decode_label(line), "Shift + E");

    let line = r#".Bindings=(Name="E",Command="GBA_Grapple",Control=true,Shift=false,Alt=true)"#;
    assert_eq!(reader.decode_label(line), "Ctrl + E");

    let line = r#".Bindings=(Name="E",Command="GBA_Grapple",Control=false,Shift=false,Alt=true)"#;
    assert_eq!(reader.decode_label(line), "Alt + E");
}

#[test]
fn test_unknown_token_passes_through() {
    let layout = FileLayout::default();
    let reader = ConfigReader::new(&layout, TokenRegistry::standard());

    let line = r#".Bindings=(Name="MouseThumb3",Command="GBA_Zoom",Control=false,Shift=false,Alt=false)"#;
    assert_eq!(reader.decode_label(line), "MouseThumb3");
}

#[test]
fn test_mirror_lines_are_not_read() {
    let (_temp_dir, files) = create_test_install();
    let layout = FileLayout::default();

    // Mirror of Grapple disagrees with the primary slot
    let mut lines = read_lines(files.primary());
    lines[35] = lines[35].replacen("Name=\"E\"", "Name=\"Z\"", 1);
    fs::write(files.primary(), lines.join("\r\n") + "\r\n").unwrap();

    let reader = ConfigReader::new(&layout, TokenRegistry::standard());
    let (state, _) = reader.read(files.primary(), files.secondary()).unwrap();
    assert_eq!(state.label(Action::Grapple), "E");
    assert_eq!(state.get(Action::Grapple).modifier, Modifier::None);
}

// ============================================================================
// Scalars
// ============================================================================

#[test]
fn test_unparsable_scalars_are_skipped() {
    let (_temp_dir, files) = create_test_install();
    let layout = FileLayout::default();

    let mut primary = read_lines(files.primary());
    primary[56] = primary[56].replace("fov 90", "fov wide");
    fs::write(files.primary(), primary.join("\r\n")).unwrap();

    let secondary = fs::read_to_string(files.secondary())
        .unwrap()
        .replace("MouseSensitivity=30.0", "MouseSensitivity=fast")
        .replace("bEnableMouseSmoothing=true", "bEnableMouseSmoothing=FALSE");
    fs::write(files.secondary(), secondary).unwrap();

    let reader = ConfigReader::new(&layout, TokenRegistry::standard());
    let (state, scalars) = reader.read(files.primary(), files.secondary()).unwrap();

    assert_eq!(scalars.mouse_sensitivity, None);
    assert!(!scalars.mouse_smoothing);
    assert_eq!(scalars.fov_slider_a, None);
    assert_eq!(scalars.fov_slider_b, Some(110));

    // Bindings are unaffected
    assert_eq!(state.label(Action::CustomFov1), "F3");
}

#[test]
fn test_slider_without_fov_prefix() {
    let layout = FileLayout::default();
    let reader = ConfigReader::new(&layout, TokenRegistry::standard());

    let mut lines = vec![String::new(); 58];
    lines[57] = r#".Bindings=(Name="F4",Command="75",Control=false)"#.to_string();
    let document = ConfigDocument::parse(&lines.join("\n"));

    assert_eq!(reader.read_slider(&document, 57), Some(75));
}

// ============================================================================
// Failure policy
// ============================================================================

#[test]
fn test_missing_primary_is_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let layout = FileLayout::default();
    let reader = ConfigReader::new(&layout, TokenRegistry::standard());

    let primary = temp_dir.path().join("UserInput.ini");
    let result = reader.read(&primary, &temp_dir.path().join("BmInput.ini"));

    match result {
        Err(ConfigError::NotFound(path)) => assert_eq!(path, primary),
        other => panic!("Expected NotFound error, got: {:?}", other),
    }
}

#[test]
fn test_missing_secondary_is_fatal() {
    let (_temp_dir, files) = create_test_install();
    fs::remove_file(files.secondary()).unwrap();

    let layout = FileLayout::default();
    let reader = ConfigReader::new(&layout, TokenRegistry::standard());

    assert!(matches!(
        reader.read(files.primary(), files.secondary()),
        Err(ConfigError::NotFound(_))
    ));
}

#[test]
fn test_truncated_primary_is_fatal() {
    let (_temp_dir, files) = create_test_install();
    let lines = read_lines(files.primary());
    fs::write(files.primary(), lines[..20].join("\r\n")).unwrap();

    let layout = FileLayout::default();
    let reader = ConfigReader::new(&layout, TokenRegistry::standard());

    match reader.read(files.primary(), files.secondary()) {
        Err(ConfigError::MissingLine { line, .. }) => assert!(line >= 20),
        other => panic!("Expected MissingLine error, got: {:?}", other),
    }
}

#[test]
fn test_read_utf16_primary() {
    let (_temp_dir, files) = create_test_install();
    let text = fs::read_to_string(files.primary()).unwrap();

    let mut bytes = vec![0xFF, 0xFE];
    bytes.extend(text.encode_utf16().flat_map(u16::to_le_bytes));
    fs::write(files.primary(), bytes).unwrap();

    let layout = FileLayout::default();
    let reader = ConfigReader::new(&layout, TokenRegistry::standard());
    let (state, _) = reader.read(files.primary(), files.secondary()).unwrap();

    assert_eq!(state.label(Action::RunGlideUse), "Space");
    assert_ne!(state.label(Action::Map), UNBOUND);
}
