//! HID reports produced by the keyboard.

use usbd_hid::descriptor::generator_prelude::*;

/// KeyboardReport describes a report and its companion descriptor that can be
/// used to send keyboard button presses to a host and receive the status of the
/// keyboard LEDs.
#[gen_hid_descriptor(
    (collection = APPLICATION, usage_page = GENERIC_DESKTOP, usage = KEYBOARD) = {
        (usage_page = KEYBOARD, usage_min = 0xE0, usage_max = 0xE7) = {
            #[packed_bits = 8] #[item_settings(data,variable,absolute)] modifier=input;
        };
        (logical_min = 0,) = {
            #[item_settings(constant,variable,absolute)] reserved=input;
        };
        (usage_page = LEDS, usage_min = 0x01, usage_max = 0x05) = {
            #[packed_bits = 5] #[item_settings(data,variable,absolute)] leds=output;
        };
        (usage_page = KEYBOARD, usage_min = 0x00, usage_max = 0xDD) = {
            #[item_settings(data,array,absolute)] keycodes=input;
        };
    }
)]
#[allow(dead_code)]
#[derive(Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyboardReport {
    pub modifier: u8, // HidModifiers
    pub reserved: u8,
    pub leds: u8,
    pub keycodes: [u8; 6],
}

impl KeyboardReport {
    /// A report with no key and no modifier held
    pub fn is_empty(&self) -> bool {
        self.modifier == 0 && self.keycodes.iter().all(|k| *k == 0)
    }
}

/// Reports sent from the keyboard to the HID reporter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Report {
    /// Normal keyboard hid report
    KeyboardReport(KeyboardReport),
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_report_descriptor_is_boot_compatible() {
        // Usage page generic desktop, usage keyboard
        assert_eq!(&KeyboardReport::desc()[..4], &[0x05, 0x01, 0x09, 0x06]);
        assert!(KeyboardReport::default().is_empty());
    }
}
