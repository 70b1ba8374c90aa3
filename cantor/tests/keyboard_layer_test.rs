pub mod common;

mod layer_test {
    use cantor::event::KeyboardEvent;
    use cantor::hid::Report;
    use cantor::keycode::ConsumerKey;
    use cantor::layout::{BASE, NUMNAV};
    use cantor::timer::Instant;

    use super::*;
    use crate::common::{create_test_keyboard, run_key_sequence};

    #[test]
    fn test_layer_tap_tap() {
        key_sequence_test! {
            keyboard: create_test_keyboard(),
            sequence: [
                [3, 7, true, 10], // Tap lt!(NUMNAV, Space)
                [3, 7, false, 50],
            ],
            expected_reports: [
                [0, [kc8!(Space), 0, 0, 0, 0, 0]],
                [0, [0, 0, 0, 0, 0, 0]],
            ]
        }
    }

    #[test]
    fn test_layer_tap_hold_with_nested_tap() {
        key_sequence_test! {
            keyboard: create_test_keyboard(),
            sequence: [
                [3, 7, true, 10], // Press lt!(NUMNAV, Space)
                [0, 4, true, 90], // Press 7
                [0, 4, false, 50],
                [3, 7, false, 50],
                [0, 4, true, 50], // Back on the base layer
                [0, 4, false, 50],
            ],
            expected_reports: [
                [0, [kc8!(Kc7), 0, 0, 0, 0, 0]],
                [0, [0, 0, 0, 0, 0, 0]],
                [0, [kc8!(G), 0, 0, 0, 0, 0]],
                [0, [0, 0, 0, 0, 0, 0]],
            ]
        }
    }

    #[test]
    fn test_layer_transparent_key() {
        key_sequence_test! {
            keyboard: create_test_keyboard(),
            sequence: [
                [3, 7, true, 10], // Press lt!(NUMNAV, Space)
                [1, 5, true, 240], // Transparent on NUMNAV, K from base
                [1, 5, false, 50],
                [3, 7, false, 50],
            ],
            expected_reports: [
                [0, [kc8!(K), 0, 0, 0, 0, 0]],
                [0, [0, 0, 0, 0, 0, 0]],
            ]
        }
    }

    #[test]
    fn test_key_released_after_its_layer() {
        key_sequence_test! {
            keyboard: create_test_keyboard(),
            sequence: [
                [3, 7, true, 10], // Press lt!(NUMNAV, Space)
                [0, 4, true, 240], // Press 7
                [3, 7, false, 30], // Release the layer first
                [0, 4, false, 30], // Still releases 7
            ],
            expected_reports: [
                [0, [kc8!(Kc7), 0, 0, 0, 0, 0]],
                [0, [0, 0, 0, 0, 0, 0]],
            ]
        }
    }

    #[test]
    fn test_layer_state() {
        let mut keyboard = create_test_keyboard();
        let t = Instant::from_millis;
        keyboard.process(KeyboardEvent::key(3, 7, true, t(10))); // Press lt!(NUMNAV, Space)
        assert_eq!(keyboard.keymap().layer_state().highest(), BASE);
        keyboard.tick(t(210));
        assert_eq!(keyboard.keymap().layer_state().highest(), NUMNAV);
        keyboard.process(KeyboardEvent::key(3, 7, false, t(300)));
        assert_eq!(keyboard.keymap().layer_state().highest(), BASE);
    }

    #[test]
    fn test_media_key() {
        let mut keyboard = create_test_keyboard();
        let sequence = key_sequence![
            [3, 7, true, 10],   // Press lt!(NUMNAV, Space)
            [1, 11, true, 240], // Press volume down
            [1, 11, false, 30],
            [3, 7, false, 30],
        ];
        let usages: Vec<u16> = run_key_sequence(&mut keyboard, &sequence)
            .into_iter()
            .map(|report| match report {
                Report::MediaKeyboardReport(r) => r.usage_id,
                _ => panic!("Only media reports expected"),
            })
            .collect();
        assert_eq!(usages, [ConsumerKey::VolumeDecrement as u16, 0]);
    }
}
