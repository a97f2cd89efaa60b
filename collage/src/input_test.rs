use super::*;

// =============================================================
// Tool
// =============================================================

#[test]
fn tool_default_is_select() {
    assert_eq!(Tool::default(), Tool::Select);
}

#[test]
fn tool_debug_format() {
    assert_eq!(format!("{:?}", Tool::Select), "Select");
    assert_eq!(format!("{:?}", Tool::Pan), "Pan");
}

// =============================================================
// Modifiers
// =============================================================

#[test]
fn modifiers_default_all_false() {
    let m = Modifiers::default();
    assert!(!m.shift && !m.ctrl && !m.alt && !m.meta);
    assert!(!m.command());
}

#[test]
fn command_is_ctrl_or_meta() {
    assert!(Modifiers { ctrl: true, ..Default::default() }.command());
    assert!(Modifiers { meta: true, ..Default::default() }.command());
    assert!(!Modifiers { shift: true, alt: true, ..Default::default() }.command());
}

// =============================================================
// Key
// =============================================================

#[test]
fn key_comparison_ignores_case() {
    assert!(Key::new("Z").is("z"));
    assert!(Key::new("escape").is("Escape"));
    assert!(!Key::new("y").is("z"));
}

// =============================================================
// UiState
// =============================================================

#[test]
fn ui_state_defaults() {
    let ui = UiState::default();
    assert_eq!(ui.tool, Tool::Select);
    assert!(!ui.snap_to_grid);
    assert!(!ui.space_held);
    assert!(!ui.text_input_focused);
    assert!(!ui.pans_on_primary());
}

#[test]
fn pans_on_primary_with_pan_tool_or_space() {
    let pan_tool = UiState { tool: Tool::Pan, ..Default::default() };
    assert!(pan_tool.pans_on_primary());
    let space = UiState { space_held: true, ..Default::default() };
    assert!(space.pans_on_primary());
}

// =============================================================
// InputState
// =============================================================

#[test]
fn input_state_default_is_idle() {
    let state = InputState::default();
    assert!(matches!(state, InputState::Idle));
    assert!(!state.is_active());
}

#[test]
fn gestures_are_active() {
    assert!(InputState::Panning.is_active());
    assert!(InputState::CropDragging { handle: CropHandle::Move }.is_active());
    let drag = InputState::DraggingItem {
        id: ItemId::new_v4(),
        start_canvas: Point::default(),
        orig_x: 0.0,
        orig_y: 0.0,
    };
    assert!(drag.is_active());
}
