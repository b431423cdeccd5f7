pub mod common;

use embassy_futures::block_on;
use embassy_futures::select::{Either, select};
use guillotine::Runnable;
use guillotine::channel::{KEY_EVENT_CHANNEL, KEYBOARD_REPORT_CHANNEL};
use guillotine::event::KeyEvent;
use guillotine::hid::Report;

use crate::common::create_test_keyboard;

async fn receive_keycode() -> u8 {
    let Report::KeyboardReport(report) = KEYBOARD_REPORT_CHANNEL.receive().await;
    report.keycodes[0]
}

#[test]
fn test_keyboard_task() {
    let mut keyboard = create_test_keyboard();
    KEY_EVENT_CHANNEL.clear();
    KEYBOARD_REPORT_CHANNEL.clear();

    let result = block_on(select(keyboard.run(), async {
        // Plain key
        KEY_EVENT_CHANNEL.send(KeyEvent::press(1, 0)).await;
        KEY_EVENT_CHANNEL.send(KeyEvent::release(1, 0)).await;
        let a = (receive_keycode().await, receive_keycode().await);

        // Tap of a dual-role key, released while the hold timer is running
        KEY_EVENT_CHANNEL.send(KeyEvent::press(0, 0)).await;
        KEY_EVENT_CHANNEL.send(KeyEvent::release(0, 0)).await;
        let quote = (receive_keycode().await, receive_keycode().await);

        (a, quote)
    }));

    match result {
        Either::First(_) => panic!("Keyboard task stopped"),
        Either::Second((a, quote)) => {
            assert_eq!(a, (kc8!(A), 0));
            assert_eq!(quote, (kc8!(Quote), 0));
        }
    }
}
