extern crate guillotine;

#[macro_export]
macro_rules! key_sequence_test {
    (keyboard: $keyboard:expr, sequence: [$([$row:expr, $col:expr, $pressed:expr, $delay:expr]),* $(,)?], expected_reports: [$([$modifier:expr, $keys:expr]),* $(,)?]) => {{
        let mut keyboard = $keyboard;
        let sequence = $crate::key_sequence![$([$row, $col, $pressed, $delay]),*];
        let expected_reports: Vec<guillotine::hid::KeyboardReport> = $crate::key_report![$([$modifier, $keys]),*];

        let outputs = $crate::common::run_key_sequence(&mut keyboard, &sequence);
        assert_eq!(expected_reports, $crate::common::reports(&outputs));
        keyboard
    }};
}

// a rust macro to map a key name to its keycode as u8
#[macro_export]
macro_rules! kc8 {
    ($key: ident) => {
        guillotine::types::keycode::KeyCode::$key as u8
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

// a rust macro to create a key report that simulates key status change in hid
#[macro_export]
macro_rules! key_report {
    ($([$modifier:expr, $keys:expr]),* $(,)?) => {
        vec![
            $(
                guillotine::hid::KeyboardReport {
                    modifier: $modifier,
                    keycodes: $keys,
                    leds: 0,
                    reserved: 0,
                },
            )*
        ]
    };
}
