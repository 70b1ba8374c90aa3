pub mod common;

use cantor::config::{BehaviorConfig, TapHoldConfig};
use cantor::layout;
use cantor::tap_hold::TapHoldMode;

fn tap_hold_config(mode: TapHoldMode) -> BehaviorConfig {
    BehaviorConfig {
        tap_hold: TapHoldConfig {
            mode,
            ..TapHoldConfig::default()
        },
        ..layout::behavior_config()
    }
}

mod tap_hold_test {
    use super::*;
    use crate::common::{KC_LALT, KC_LCTRL, KC_LSHIFT, create_test_keyboard, create_test_keyboard_with_config};

    #[test]
    fn test_taphold_tap() {
        key_sequence_test! {
            keyboard: create_test_keyboard(),
            sequence: [
                [1, 4, true, 10],  // Press mt!(T, LCtrl)
                [1, 4, false, 100], // Release T before hold timeout
            ],
            expected_reports: [
                [0, [kc8!(T), 0, 0, 0, 0, 0]],
                [0, [0, 0, 0, 0, 0, 0]],
            ]
        }
    }

    #[test]
    fn test_taphold_hold() {
        key_sequence_test! {
            keyboard: create_test_keyboard(),
            sequence: [
                [1, 4, true, 10],  // Press mt!(T, LCtrl)
                [1, 4, false, 300], // Release after the tapping term
            ],
            expected_reports: [
                [KC_LCTRL, [0, 0, 0, 0, 0, 0]],
                [0, [0, 0, 0, 0, 0, 0]],
            ]
        }
    }

    #[test]
    fn test_taphold_nested_tap_is_permissive_hold() {
        key_sequence_test! {
            keyboard: create_test_keyboard(),
            sequence: [
                [1, 4, true, 10], // Press mt!(T, LCtrl)
                [2, 1, true, 20], // Press P
                [2, 1, false, 30], // Release P, T is still down
                [1, 4, false, 40], // Release T
            ],
            expected_reports: [
                [KC_LCTRL, [0, 0, 0, 0, 0, 0]],
                [KC_LCTRL, [kc8!(P), 0, 0, 0, 0, 0]],
                [KC_LCTRL, [0, 0, 0, 0, 0, 0]],
                [0, [0, 0, 0, 0, 0, 0]],
            ]
        }
    }

    #[test]
    fn test_taphold_rolling_keeps_order() {
        key_sequence_test! {
            keyboard: create_test_keyboard(),
            sequence: [
                [1, 4, true, 10], // Press mt!(T, LCtrl)
                [2, 1, true, 20], // Press P
                [1, 4, false, 50], // Release T first
                [2, 1, false, 40], // Release P
            ],
            expected_reports: [
                [0, [kc8!(T), 0, 0, 0, 0, 0]],
                [0, [kc8!(T), kc8!(P), 0, 0, 0, 0]],
                [0, [0, kc8!(P), 0, 0, 0, 0]],
                [0, [0, 0, 0, 0, 0, 0]],
            ]
        }
    }

    #[test]
    fn test_taphold_rolling_two_dual_role_keys() {
        key_sequence_test! {
            keyboard: create_test_keyboard(),
            sequence: [
                [1, 3, true, 10], // Press mt!(N, LShift)
                [1, 4, true, 20], // Press mt!(T, LCtrl) within the rolling term
                [1, 4, false, 30], // Release T
                [1, 3, false, 30], // Release N
            ],
            expected_reports: [
                [0, [kc8!(N), 0, 0, 0, 0, 0]],
                [0, [kc8!(N), kc8!(T), 0, 0, 0, 0]],
                [0, [kc8!(N), 0, 0, 0, 0, 0]],
                [0, [0, 0, 0, 0, 0, 0]],
            ]
        }
    }

    #[test]
    fn test_taphold_slow_nested_dual_role_is_hold() {
        key_sequence_test! {
            keyboard: create_test_keyboard(),
            sequence: [
                [1, 3, true, 10], // Press mt!(N, LShift)
                [1, 4, true, 100], // Press mt!(T, LCtrl), well after the rolling term
                [1, 4, false, 30], // Release T
                [1, 3, false, 30], // Release N
            ],
            expected_reports: [
                [KC_LSHIFT, [0, 0, 0, 0, 0, 0]],
                [KC_LSHIFT, [kc8!(T), 0, 0, 0, 0, 0]],
                [KC_LSHIFT, [0, 0, 0, 0, 0, 0]],
                [0, [0, 0, 0, 0, 0, 0]],
            ]
        }
    }

    #[test]
    fn test_taphold_multi_hold() {
        key_sequence_test! {
            keyboard: create_test_keyboard(),
            sequence: [
                [1, 2, true, 10], // Press mt!(S, LAlt)
                [1, 4, true, 10], // Press mt!(T, LCtrl)
                [2, 4, true, 270], // Press D after hold timeout
                [2, 4, false, 20], // Release D
                [1, 2, false, 90], // Release S
                [1, 4, false, 20], // Release T
            ],
            expected_reports: [
                [KC_LALT, [0, 0, 0, 0, 0, 0]],
                [KC_LALT | KC_LCTRL, [0, 0, 0, 0, 0, 0]],
                [KC_LALT | KC_LCTRL, [kc8!(D), 0, 0, 0, 0, 0]],
                [KC_LALT | KC_LCTRL, [0, 0, 0, 0, 0, 0]],
                [KC_LCTRL, [0, 0, 0, 0, 0, 0]],
                [0, [0, 0, 0, 0, 0, 0]],
            ]
        }
    }

    #[test]
    fn test_taphold_hold_then_tap() {
        key_sequence_test! {
            keyboard: create_test_keyboard(),
            sequence: [
                [1, 3, true, 10], // Press mt!(N, LShift)
                [1, 3, false, 300], // Release after the tapping term
                [1, 3, true, 10], // Press again
                [1, 3, false, 50], // Quick release is a tap
            ],
            expected_reports: [
                [KC_LSHIFT, [0, 0, 0, 0, 0, 0]],
                [0, [0, 0, 0, 0, 0, 0]],
                [0, [kc8!(N), 0, 0, 0, 0, 0]],
                [0, [0, 0, 0, 0, 0, 0]],
            ]
        }
    }

    #[test]
    fn test_normal_mode_nested_tap_is_tap() {
        key_sequence_test! {
            keyboard: create_test_keyboard_with_config(tap_hold_config(TapHoldMode::Normal)),
            sequence: [
                [1, 4, true, 10], // Press mt!(T, LCtrl)
                [2, 1, true, 20], // Press P
                [2, 1, false, 30], // Release P
                [1, 4, false, 40], // Release T before the tapping term
            ],
            expected_reports: [
                [0, [kc8!(T), 0, 0, 0, 0, 0]],
                [0, [kc8!(T), kc8!(P), 0, 0, 0, 0]],
                [0, [kc8!(T), 0, 0, 0, 0, 0]],
                [0, [0, 0, 0, 0, 0, 0]],
            ]
        }
    }

    #[test]
    fn test_hold_on_other_press() {
        key_sequence_test! {
            keyboard: create_test_keyboard_with_config(tap_hold_config(TapHoldMode::HoldOnOtherPress)),
            sequence: [
                [1, 4, true, 10], // Press mt!(T, LCtrl)
                [2, 1, true, 20], // Press P, T is held right away
                [1, 4, false, 20], // Release T
                [2, 1, false, 20], // Release P
            ],
            expected_reports: [
                [KC_LCTRL, [0, 0, 0, 0, 0, 0]],
                [KC_LCTRL, [kc8!(P), 0, 0, 0, 0, 0]],
                [0, [kc8!(P), 0, 0, 0, 0, 0]],
                [0, [0, 0, 0, 0, 0, 0]],
            ]
        }
    }
}
