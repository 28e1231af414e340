use crate::core::{Action, BindState, Modifier, TokenRegistry, UNBOUND};

/// Helper to build a state with a few keys assigned
fn test_state() -> BindState {
    BindState::from_labels(
        TokenRegistry::standard(),
        [
            (Action::MoveForward, "W"),
            (Action::MoveBackward, "S"),
            (Action::Crouch, "Ctrl"),
            (Action::RunGlideUse, "Space"),
            (Action::Zoom, "Shift + Space"),
        ],
    )
}

#[test]
fn test_new_state_is_fully_unbound() {
    let state = BindState::new(TokenRegistry::standard());

    assert_eq!(state.len(), Action::ALL.len());
    assert_eq!(state.unbound_actions().len(), Action::ALL.len());
    assert!(state.iter().all(|b| b.label == UNBOUND));
}

#[test]
fn test_iteration_follows_presentation_order() {
    let state = test_state();
    let order: Vec<Action> = state.iter().map(|b| b.action).collect();

    assert_eq!(order, Action::ALL.to_vec());
}

#[test]
fn test_assign_free_key() {
    let mut state = test_state();

    let revoked = state.assign(Action::Map, "M");

    assert!(revoked.is_empty());
    assert_eq!(state.label(Action::Map), "M");
    assert!(state.is_assigned(Action::Map));
}

#[test]
fn test_assign_taken_key_unbinds_previous_holder() {
    let mut state = test_state();

    let revoked = state.assign(Action::Grapple, "W");

    assert_eq!(revoked, vec![Action::MoveForward]);
    assert_eq!(state.label(Action::Grapple), "W");
    assert_eq!(state.label(Action::MoveForward), UNBOUND);
    assert!(!state.is_assigned(Action::MoveForward));

    // No third action is affected
    assert_eq!(state.label(Action::MoveBackward), "S");
    assert_eq!(state.label(Action::Crouch), "Ctrl");
}

#[test]
fn test_plain_key_revokes_modified_variants() {
    let mut state = test_state();

    // "Space" is held plain by RunGlideUse and with Shift by Zoom
    let revoked = state.assign(Action::DetectiveMode, "Space");

    assert_eq!(revoked, vec![Action::RunGlideUse, Action::Zoom]);
    assert_eq!(state.label(Action::DetectiveMode), "Space");
}

#[test]
fn test_modified_key_revokes_plain_key_only() {
    let mut state = test_state();

    let revoked = state.assign(Action::DetectiveMode, "Ctrl + Space");

    // The plain "Space" goes, "Shift + Space" is a different combination
    assert_eq!(revoked, vec![Action::RunGlideUse]);
    assert_eq!(state.label(Action::Zoom), "Shift + Space");
    assert_eq!(state.get(Action::DetectiveMode).modifier, Modifier::Ctrl);
    assert_eq!(state.get(Action::DetectiveMode).raw_token, "SpaceBar");
}

#[test]
fn test_collision_is_case_insensitive_on_key() {
    let mut state = test_state();

    let revoked = state.assign(Action::Map, "Shift + w");

    assert_eq!(revoked, vec![Action::MoveForward]);
}

#[test]
fn test_assign_is_idempotent() {
    let mut once = test_state();
    once.assign(Action::Grapple, "E");

    let mut twice = test_state();
    twice.assign(Action::Grapple, "E");
    let revoked = twice.assign(Action::Grapple, "E");

    assert!(revoked.is_empty());
    assert_eq!(once, twice);
}

#[test]
fn test_assign_unbound_sentinel() {
    let mut state = test_state();

    let revoked = state.assign(Action::MoveForward, UNBOUND);

    assert!(revoked.is_empty());
    assert!(!state.is_assigned(Action::MoveForward));
    // Other unbound actions are untouched
    assert!(!state.is_assigned(Action::Map));
}

#[test]
fn test_unbind_clears_index() {
    let mut state = test_state();

    state.unbind(Action::MoveForward);
    assert!(state.holders_of("W").is_empty());

    let revoked = state.assign(Action::Map, "W");
    assert!(revoked.is_empty());
}

#[test]
fn test_holders_of() {
    let state = test_state();

    assert_eq!(
        state.holders_of("Space"),
        vec![Action::RunGlideUse, Action::Zoom]
    );
    assert!(state.holders_of("Q").is_empty());
}

#[test]
fn test_rebinding_same_action_moves_index() {
    let mut state = test_state();

    state.assign(Action::MoveForward, "Up");
    assert!(state.holders_of("W").is_empty());
    assert_eq!(state.holders_of("Up"), vec![Action::MoveForward]);
}
