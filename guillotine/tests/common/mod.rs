pub mod test_macro;

use embassy_time::{Duration, Instant};
use guillotine::config::BehaviorConfig;
use guillotine::event::KeyEvent;
use guillotine::hid::KeyboardReport;
use guillotine::keyboard::{Keyboard, KeyboardOutput};
use guillotine::layout::{COL, GUILLOTINE, NUM_LAYER, ROW};

// Init logger for tests
#[ctor::ctor]
pub fn init_log() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

pub(crate) const KC_LSHIFT: u8 = 1 << 1;
pub(crate) const KC_LALT: u8 = 1 << 2;
pub(crate) const KC_LGUI: u8 = 1 << 3;
pub(crate) const KC_RSHIFT: u8 = 1 << 5;
pub(crate) const KC_RGUI: u8 = 1 << 7;

#[derive(Debug, Clone)]
pub struct TestKeyPress {
    pub row: u8,
    pub col: u8,
    pub pressed: bool,
    pub delay: u64, // Delay before this key event in milliseconds
}

pub fn create_test_keyboard() -> Keyboard<'static, ROW, COL, NUM_LAYER> {
    Keyboard::new(&GUILLOTINE, BehaviorConfig::default())
}

// Run a sequence of key events, the delay of each event is relative to the previous one.
// Hold timeouts which expire between two events are fired like the timer of the keyboard task does.
pub fn run_key_sequence<const R: usize, const C: usize, const L: usize>(
    keyboard: &mut Keyboard<'static, R, C, L>,
    key_sequence: &[TestKeyPress],
) -> Vec<KeyboardOutput> {
    let mut outputs = Vec::new();
    let mut now = Instant::from_millis(0);

    for key in key_sequence {
        now += Duration::from_millis(key.delay);
        while let Some(deadline) = keyboard.next_timeout() {
            if deadline > now {
                break;
            }
            outputs.extend(keyboard.poll(deadline));
        }
        outputs.extend(keyboard.process(
            KeyEvent {
                row: key.row,
                col: key.col,
                pressed: key.pressed,
            },
            now,
        ));
    }

    outputs
}

/// Keep reports only
pub fn reports(outputs: &[KeyboardOutput]) -> Vec<KeyboardReport> {
    outputs
        .iter()
        .filter_map(|output| match output {
            KeyboardOutput::Report(report) => Some(*report),
            _ => None,
        })
        .collect()
}
