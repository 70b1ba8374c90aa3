pub mod common;

mod tap_dance_test {
    use super::*;
    use crate::common::{KC_LSHIFT, create_test_keyboard};

    #[test]
    fn test_tap_dance_single_tap() {
        key_sequence_test! {
            keyboard: create_test_keyboard(),
            sequence: [
                [3, 8, true, 10], // Press lt!(FN, Q)
                [2, 0, true, 240], // Press td!(TPL)
                [2, 0, false, 30],
                [3, 8, false, 20],
            ],
            expected_reports: [
                [0, [kc8!(Minus), 0, 0, 0, 0, 0]],
                [0, [0, 0, 0, 0, 0, 0]],
            ]
        }
    }

    #[test]
    fn test_tap_dance_double_tap() {
        key_sequence_test! {
            keyboard: create_test_keyboard(),
            sequence: [
                [3, 8, true, 10], // Press lt!(FN, Q)
                [2, 0, true, 240], // Tap td!(TPL)
                [2, 0, false, 30],
                [2, 0, true, 40], // Tap it again
                [2, 0, false, 30],
                [3, 8, false, 50],
            ],
            expected_reports: [
                [KC_LSHIFT, [kc8!(Equal), 0, 0, 0, 0, 0]],
                [0, [0, 0, 0, 0, 0, 0]],
            ]
        }
    }

    #[test]
    fn test_tap_dance_hold() {
        key_sequence_test! {
            keyboard: create_test_keyboard(),
            sequence: [
                [3, 8, true, 10], // Press lt!(FN, Q)
                [2, 0, true, 240], // Press td!(TPL)
                [2, 0, false, 300], // Release it after the term
                [3, 8, false, 20],
            ],
            expected_reports: [
                [0, [kc8!(Minus), 0, 0, 0, 0, 0]],
                [0, [0, 0, 0, 0, 0, 0]],
            ]
        }
    }

    #[test]
    fn test_tap_dance_interrupted() {
        key_sequence_test! {
            keyboard: create_test_keyboard(),
            sequence: [
                [3, 8, true, 10], // Press lt!(FN, Q)
                [2, 0, true, 240], // Tap td!(TPL)
                [2, 0, false, 30],
                [0, 7, true, 20], // Press F9 before the dance is over
                [0, 7, false, 30],
                [3, 8, false, 20],
            ],
            expected_reports: [
                [0, [kc8!(Minus), 0, 0, 0, 0, 0]],
                [0, [0, 0, 0, 0, 0, 0]],
                [0, [kc8!(F9), 0, 0, 0, 0, 0]],
                [0, [0, 0, 0, 0, 0, 0]],
            ]
        }
    }
}
