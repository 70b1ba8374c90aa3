extern crate cantor;

#[macro_export]
macro_rules! key_sequence_test {
    (keyboard: $keyboard:expr, sequence: [$([$row:expr, $col:expr, $pressed:expr, $delay:expr]),* $(,)?], expected_reports: [$([$modifier:expr, $keys:expr]),* $(,)?]) => {
        {
            let mut keyboard = $keyboard;
            let sequence = vec![
                $(
                    $crate::common::TestKeyPress {
                        row: $row,
                        col: $col,
                        pressed: $pressed,
                        delay: $delay,
                    },
                )*
            ];
            let expected_reports = vec![
                $(
                    cantor::descriptor::KeyboardReport {
                        modifier: $modifier,
                        keycodes: $keys,
                        leds: 0,
                        reserved: 0,
                    },
                )*
            ];

            $crate::common::run_key_sequence_test(&mut keyboard, &sequence, &expected_reports);
        }
    };
}

// a rust macro to map a key name to its hid code as u8
#[macro_export]
macro_rules! kc8 {
    ($key: ident) => {
        cantor::keycode::HidKeyCode::$key as u8
    };
}

// a rust macro to create a key sequence to simulate key presses
#[macro_export]
macro_rules! key_sequence {
    ($([$row:expr, $col:expr, $pressed:expr, $delay:expr]),* $(,)?) => {
        vec![
            $(
                $crate::common::TestKeyPress {
                    row: $row,
                    col: $col,
                    pressed: $pressed,
                    delay: $delay,
                },
            )*
        ]
    };
}
