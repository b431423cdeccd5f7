pub mod common;

use guillotine::types::modifier::ModifierCombination;

use crate::common::{KC_LSHIFT, KC_RSHIFT, create_test_keyboard, reports, run_key_sequence};

#[test]
fn test_layer_tap_key_tap() {
    let keyboard = key_sequence_test!(
        keyboard: create_test_keyboard(),
        sequence: [
            [0, 0, true, 0],
            [0, 0, false, 100],
        ],
        expected_reports: [
            [0, [kc8!(Quote), 0, 0, 0, 0, 0]],
            [0, [0, 0, 0, 0, 0, 0]],
        ]
    );
    assert!(!keyboard.layer_state().is_active(2));
}

#[test]
fn test_layer_tap_key_tap_just_before_timeout() {
    key_sequence_test!(
        keyboard: create_test_keyboard(),
        sequence: [
            [0, 1, true, 0],
            [0, 1, false, 199],
        ],
        expected_reports: [
            [0, [kc8!(Comma), 0, 0, 0, 0, 0]],
            [0, [0, 0, 0, 0, 0, 0]],
        ]
    );
}

#[test]
fn test_layer_tap_key_timeout_is_hold() {
    // Held for the timeout, no tap is sent
    let keyboard = key_sequence_test!(
        keyboard: create_test_keyboard(),
        sequence: [
            [0, 0, true, 0],
            [0, 0, false, 200],
        ],
        expected_reports: []
    );
    assert!(!keyboard.layer_state().is_active(2));
}

#[test]
fn test_layer_tap_key_hold() {
    let keyboard = key_sequence_test!(
        keyboard: create_test_keyboard(),
        sequence: [
            [0, 0, true, 0],
            [0, 8, true, 50],   // 7 on layer 2
            [0, 8, false, 10],
            [1, 7, true, 10],   // Shifted equal on layer 2
            [1, 7, false, 10],
        ],
        expected_reports: [
            [0, [kc8!(Kc7), 0, 0, 0, 0, 0]],
            [0, [0, 0, 0, 0, 0, 0]],
            [KC_LSHIFT, [kc8!(Equal), 0, 0, 0, 0, 0]],
            [0, [0, 0, 0, 0, 0, 0]],
        ]
    );
    assert!(keyboard.layer_state().is_active(2));

    // Releasing the held key turns the layer off, without a tap
    let keyboard = key_sequence_test!(
        keyboard: keyboard,
        sequence: [
            [0, 0, false, 10],
        ],
        expected_reports: []
    );
    assert!(!keyboard.layer_state().is_active(2));
}

#[test]
fn test_layer_tap_key_hold_on_no_key() {
    // (0, 1) is `No` on layer 2, it shadows FN3 of the base layer
    let mut keyboard = create_test_keyboard();
    let outputs = run_key_sequence(
        &mut keyboard,
        &key_sequence![
            [0, 0, true, 0],
            [0, 1, true, 300],
            [0, 1, false, 10],
            [0, 0, false, 10],
        ],
    );
    assert!(outputs.is_empty());
    assert!(!keyboard.layer_state().is_active(3));
}

#[test]
fn test_other_key_press_commits_hold() {
    // The second key is pressed well before the hold timeout
    key_sequence_test!(
        keyboard: create_test_keyboard(),
        sequence: [
            [0, 2, true, 0],
            [0, 11, true, 20],  // Shifted 0 on layer 4
            [0, 11, false, 20],
            [0, 2, false, 20],
        ],
        expected_reports: [
            [KC_LSHIFT, [kc8!(Kc0), 0, 0, 0, 0, 0]],
            [0, [0, 0, 0, 0, 0, 0]],
        ]
    );
}

#[test]
fn test_shifted_digits_layer() {
    key_sequence_test!(
        keyboard: create_test_keyboard(),
        sequence: [
            [0, 1, true, 0],
            [1, 8, true, 250],  // Shifted 4
            [1, 8, false, 10],
            [2, 10, true, 10],  // Shifted 3
            [2, 10, false, 10],
            [0, 1, false, 10],
        ],
        expected_reports: [
            [KC_LSHIFT, [kc8!(Kc4), 0, 0, 0, 0, 0]],
            [0, [0, 0, 0, 0, 0, 0]],
            [KC_LSHIFT, [kc8!(Kc3), 0, 0, 0, 0, 0]],
            [0, [0, 0, 0, 0, 0, 0]],
        ]
    );
}

#[test]
fn test_mods_tap_key_tap() {
    key_sequence_test!(
        keyboard: create_test_keyboard(),
        sequence: [
            [2, 0, true, 0],
            [2, 0, false, 50],
            [2, 11, true, 50],
            [2, 11, false, 50],
        ],
        expected_reports: [
            [0, [kc8!(Semicolon), 0, 0, 0, 0, 0]],
            [0, [0, 0, 0, 0, 0, 0]],
            [0, [kc8!(Z), 0, 0, 0, 0, 0]],
            [0, [0, 0, 0, 0, 0, 0]],
        ]
    );
}

#[test]
fn test_mods_tap_key_hold_with_other_key() {
    key_sequence_test!(
        keyboard: create_test_keyboard(),
        sequence: [
            [2, 0, true, 0],
            [1, 0, true, 50],   // A
            [1, 0, false, 50],
            [2, 0, false, 50],
        ],
        expected_reports: [
            [KC_LSHIFT, [0, 0, 0, 0, 0, 0]],
            [KC_LSHIFT, [kc8!(A), 0, 0, 0, 0, 0]],
            [KC_LSHIFT, [0, 0, 0, 0, 0, 0]],
            [0, [0, 0, 0, 0, 0, 0]],
        ]
    );
}

#[test]
fn test_mods_tap_key_hold_timeout() {
    key_sequence_test!(
        keyboard: create_test_keyboard(),
        sequence: [
            [2, 11, true, 0],
            [2, 11, false, 300],
        ],
        expected_reports: [
            [KC_RSHIFT, [0, 0, 0, 0, 0, 0]],
            [0, [0, 0, 0, 0, 0, 0]],
        ]
    );
}

#[test]
fn test_two_mods_tap_keys() {
    // Both shifts are held, the first one is committed by the second press
    key_sequence_test!(
        keyboard: create_test_keyboard(),
        sequence: [
            [2, 0, true, 0],
            [2, 11, true, 30],
            [1, 7, true, 30],   // D
            [1, 7, false, 30],
            [2, 11, false, 30],
            [2, 0, false, 30],
        ],
        expected_reports: [
            [KC_LSHIFT, [0, 0, 0, 0, 0, 0]],
            [KC_LSHIFT | KC_RSHIFT, [0, 0, 0, 0, 0, 0]],
            [KC_LSHIFT | KC_RSHIFT, [kc8!(D), 0, 0, 0, 0, 0]],
            [KC_LSHIFT | KC_RSHIFT, [0, 0, 0, 0, 0, 0]],
            [KC_LSHIFT, [0, 0, 0, 0, 0, 0]],
            [0, [0, 0, 0, 0, 0, 0]],
        ]
    );
}

#[test]
fn test_hold_timeout_fires_without_events() {
    let mut keyboard = create_test_keyboard();
    let outputs = run_key_sequence(&mut keyboard, &key_sequence![[2, 0, true, 0]]);
    assert!(outputs.is_empty());

    let deadline = keyboard.next_timeout().unwrap();
    assert_eq!(deadline.as_millis(), 200);
    let outputs = keyboard.poll(deadline);
    assert_eq!(
        reports(&outputs)[0].modifier,
        ModifierCombination::LSHIFT.to_hid_modifiers().into_bits()
    );
    assert_eq!(keyboard.next_timeout(), None);
}

#[test]
fn test_shifted_keys_rollover() {
    // `$` then `%` on the shifted digits layer, releasing `$` keeps `%` shifted
    key_sequence_test!(
        keyboard: create_test_keyboard(),
        sequence: [
            [0, 1, true, 0],
            [1, 8, true, 250],  // Shifted 4
            [1, 9, true, 10],   // Shifted 5
            [1, 8, false, 10],
            [1, 9, false, 10],
            [0, 1, false, 10],
        ],
        expected_reports: [
            [KC_LSHIFT, [kc8!(Kc4), 0, 0, 0, 0, 0]],
            [KC_LSHIFT, [kc8!(Kc4), kc8!(Kc5), 0, 0, 0, 0]],
            [KC_LSHIFT, [0, kc8!(Kc5), 0, 0, 0, 0]],
            [0, [0, 0, 0, 0, 0, 0]],
        ]
    );
}

#[test]
fn test_shifted_key_with_mods_tap_key_held() {
    // Shift held by FN5 stays after the shifted key is released
    key_sequence_test!(
        keyboard: create_test_keyboard(),
        sequence: [
            [2, 0, true, 0],
            [0, 2, true, 10],   // FN4, commits FN5 as hold
            [1, 7, true, 250],  // Shifted slash on layer 4
            [1, 7, false, 10],
            [0, 2, false, 10],
            [2, 0, false, 10],
        ],
        expected_reports: [
            [KC_LSHIFT, [0, 0, 0, 0, 0, 0]],
            [KC_LSHIFT, [kc8!(Slash), 0, 0, 0, 0, 0]],
            [KC_LSHIFT, [0, 0, 0, 0, 0, 0]],
            [0, [0, 0, 0, 0, 0, 0]],
        ]
    );
}
