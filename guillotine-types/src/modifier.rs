use core::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not};

use bitfield_struct::bitfield;
use serde::{Deserialize, Serialize};

/// To represent all combinations of modifiers, at least 5 bits are needed.
/// 1 bit for Left/Right, 4 bits for modifier type. Represented in LSB format.
///
/// | bit4 | bit3 | bit2 | bit1 | bit0 |
/// | --- | --- | --- | --- | --- |
/// | L/R | GUI | ALT |SHIFT| CTRL|
#[bitfield(u8, order = Lsb, defmt = cfg(feature = "defmt"))]
#[derive(Serialize, Deserialize, Eq, PartialEq)]
pub struct ModifierCombination {
    #[bits(1)]
    pub ctrl: bool,
    #[bits(1)]
    pub shift: bool,
    #[bits(1)]
    pub alt: bool,
    #[bits(1)]
    pub gui: bool,
    #[bits(1)]
    pub right: bool,
    #[bits(3)]
    _reserved: u8,
}

impl BitOr for ModifierCombination {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self::from_bits(self.into_bits() | rhs.into_bits())
    }
}

impl ModifierCombination {
    pub const LCTRL: Self = Self::new_from(false, false, false, false, true);
    pub const LSHIFT: Self = Self::new_from(false, false, false, true, false);
    pub const LALT: Self = Self::new_from(false, false, true, false, false);
    pub const LGUI: Self = Self::new_from(false, true, false, false, false);
    pub const RCTRL: Self = Self::new_from(true, false, false, false, true);
    pub const RSHIFT: Self = Self::new_from(true, false, false, true, false);
    pub const RALT: Self = Self::new_from(true, false, true, false, false);
    pub const RGUI: Self = Self::new_from(true, true, false, false, false);

    pub const fn new_from(right: bool, gui: bool, alt: bool, shift: bool, ctrl: bool) -> Self {
        ModifierCombination::new()
            .with_right(right)
            .with_gui(gui)
            .with_alt(alt)
            .with_shift(shift)
            .with_ctrl(ctrl)
    }

    /// Get modifier hid report bits from modifier combination
    pub fn to_hid_modifiers(self) -> HidModifiers {
        if !self.right() {
            HidModifiers::new()
                .with_left_ctrl(self.ctrl())
                .with_left_shift(self.shift())
                .with_left_alt(self.alt())
                .with_left_gui(self.gui())
        } else {
            HidModifiers::new()
                .with_right_ctrl(self.ctrl())
                .with_right_shift(self.shift())
                .with_right_alt(self.alt())
                .with_right_gui(self.gui())
        }
    }
}

/// The modifier byte of a HID keyboard report, one bit per modifier key.
#[bitfield(u8, order = Lsb, defmt = cfg(feature = "defmt"))]
#[derive(Eq, PartialEq)]
pub struct HidModifiers {
    #[bits(1)]
    pub left_ctrl: bool,
    #[bits(1)]
    pub left_shift: bool,
    #[bits(1)]
    pub left_alt: bool,
    #[bits(1)]
    pub left_gui: bool,
    #[bits(1)]
    pub right_ctrl: bool,
    #[bits(1)]
    pub right_shift: bool,
    #[bits(1)]
    pub right_alt: bool,
    #[bits(1)]
    pub right_gui: bool,
}

impl BitOr for HidModifiers {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self::from_bits(self.into_bits() | rhs.into_bits())
    }
}
impl BitAnd for HidModifiers {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self::from_bits(self.into_bits() & rhs.into_bits())
    }
}
impl Not for HidModifiers {
    type Output = Self;

    fn not(self) -> Self::Output {
        Self::from_bits(!self.into_bits())
    }
}
impl BitAndAssign for HidModifiers {
    fn bitand_assign(&mut self, rhs: Self) {
        *self = *self & rhs;
    }
}
impl BitOrAssign for HidModifiers {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = *self | rhs;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_left_right_hid_bits() {
        assert_eq!(ModifierCombination::LSHIFT.to_hid_modifiers().into_bits(), 1 << 1);
        assert_eq!(ModifierCombination::RSHIFT.to_hid_modifiers().into_bits(), 1 << 5);
        assert_eq!(ModifierCombination::LGUI.to_hid_modifiers().into_bits(), 1 << 3);
        assert_eq!(ModifierCombination::RGUI.to_hid_modifiers().into_bits(), 1 << 7);
    }

    #[test]
    fn test_hid_modifiers_ops() {
        let mut m = HidModifiers::new().with_left_shift(true);
        m |= HidModifiers::new().with_left_gui(true);
        assert_eq!(m.into_bits(), 0b1010);
        m &= !HidModifiers::new().with_left_shift(true);
        assert_eq!(m.into_bits(), 0b1000);
    }
}
