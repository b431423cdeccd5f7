//! The guillotine layout: right-handed Dvorak on a 4x12 matrix.
//!
//! Columns 5 and 6 of the upper three rows have no physical key, they are `No` on every layer.
//!
//! | layer | reached by | content |
//! | --- | --- | --- |
//! | 0 | | Dvorak letters |
//! | 1 | FN0 held, FN1 toggled | function keys, arrows, paging |
//! | 2 | FN2 held | number pad |
//! | 3 | FN3 held | shifted digits |
//! | 4 | FN4 held | brackets and symbols |
//! | 5 | FN11 held | misc and bootloader |

use crate::keymap::KeyMap;
use crate::types::action::{FnAction, FunctionId, KeyAction, MacroId};
use crate::types::keycode::KeyCode;
use crate::types::modifier::ModifierCombination;
use crate::{a, fk, k, layer, shifted};

pub const ROW: usize = 4;
pub const COL: usize = 12;
pub const NUM_LAYER: usize = 6;

#[rustfmt::skip]
pub static KEYMAP: [[[KeyAction; COL]; ROW]; NUM_LAYER] = [
    layer!([
        [fk!(2), fk!(3), fk!(4), k!(P), k!(Y), a!(No), a!(No), k!(F), k!(G), k!(C), k!(R), k!(L)],
        [k!(A), k!(O), k!(E), k!(U), k!(I), a!(No), a!(No), k!(D), k!(H), k!(T), k!(N), k!(S)],
        [fk!(5), k!(Q), k!(J), k!(K), k!(X), a!(No), a!(No), k!(B), k!(M), k!(W), k!(V), fk!(6)],
        [k!(LCtrl), k!(LAlt), k!(LGui), fk!(0), fk!(11), k!(Escape), fk!(1), k!(Space), fk!(0), k!(RGui), k!(RAlt), k!(RCtrl)]
    ]),
    layer!([
        [k!(F1), k!(F2), k!(F3), k!(F4), k!(F5), a!(No), a!(No), a!(No), fk!(8), k!(PageDown), k!(PageUp), fk!(9)],
        [k!(F6), k!(F7), k!(F8), k!(F9), k!(F10), a!(No), a!(No), a!(No), k!(Left), k!(Down), k!(Up), k!(Right)],
        [k!(F11), k!(F12), k!(F13), k!(F14), k!(F15), a!(No), a!(No), a!(No), a!(No), k!(End), k!(Home), k!(F13)],
        [a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), k!(Escape), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent)]
    ]),
    layer!([
        [fk!(2), a!(No), a!(No), a!(No), a!(No), a!(No), a!(No), a!(No), k!(Kc7), k!(Kc8), k!(Kc9), k!(Kc0)],
        [a!(No), a!(No), a!(No), a!(No), a!(No), a!(No), a!(No), shifted!(Equal), k!(Kc4), k!(Kc5), k!(Kc6), k!(Equal)],
        [a!(No), a!(No), a!(No), a!(No), a!(No), a!(No), a!(No), k!(Minus), k!(Kc1), k!(Kc2), k!(Kc3), a!(No)],
        [a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), k!(Enter), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent)]
    ]),
    layer!([
        [a!(No), fk!(3), a!(No), a!(No), a!(No), a!(No), a!(No), a!(No), shifted!(Kc7), shifted!(Kc8), a!(No), a!(No)],
        [a!(No), a!(No), a!(No), a!(No), a!(No), a!(No), a!(No), a!(No), shifted!(Kc4), shifted!(Kc5), shifted!(Kc6), a!(No)],
        [a!(No), a!(No), a!(No), a!(No), a!(No), a!(No), a!(No), a!(No), shifted!(Kc1), shifted!(Kc2), shifted!(Kc3), a!(No)],
        [a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent)]
    ]),
    layer!([
        [a!(No), a!(No), fk!(4), a!(No), a!(No), a!(No), a!(No), a!(No), shifted!(LeftBracket), shifted!(RightBracket), shifted!(Kc9), shifted!(Kc0)],
        [a!(No), a!(No), a!(No), a!(No), a!(No), a!(No), a!(No), shifted!(Slash), k!(LeftBracket), k!(RightBracket), k!(Grave), shifted!(Grave)],
        [a!(No), a!(No), a!(No), a!(No), a!(No), a!(No), a!(No), shifted!(Minus), k!(Slash), k!(Backslash), shifted!(Backslash), a!(No)],
        [a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent)]
    ]),
    layer!([
        [a!(No), a!(No), a!(No), a!(No), a!(No), a!(No), a!(No), a!(No), a!(No), a!(No), a!(No), k!(Backspace)],
        [a!(No), a!(No), a!(No), a!(No), a!(No), a!(No), a!(No), a!(No), k!(Help), k!(Escape), k!(F13), k!(Enter)],
        [a!(No), a!(No), a!(No), a!(No), fk!(7), a!(No), a!(No), a!(No), a!(No), a!(No), a!(No), a!(No)],
        [a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), fk!(11), a!(Transparent), a!(Transparent), fk!(10), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent)]
    ]),
];

/// `fk!(n)` in [`KEYMAP`] refers to `FN_ACTIONS[n]`
pub static FN_ACTIONS: [FnAction; 12] = [
    FnAction::MomentaryLayer(1),
    FnAction::ToggleLayer(1),
    FnAction::LayerTapKey(2, KeyCode::Quote),
    FnAction::LayerTapKey(3, KeyCode::Comma),
    FnAction::LayerTapKey(4, KeyCode::Dot),
    FnAction::ModsTapKey(ModifierCombination::LSHIFT, KeyCode::Semicolon),
    FnAction::ModsTapKey(ModifierCombination::RSHIFT, KeyCode::Z),
    FnAction::Function(FunctionId::Bootloader),
    FnAction::Macro(MacroId::GuiLeft),
    FnAction::Macro(MacroId::GuiRight),
    FnAction::Macro(MacroId::AltDel),
    FnAction::LayerTapKey(5, KeyCode::Tab),
];

pub static GUILLOTINE: KeyMap<'static, ROW, COL, NUM_LAYER> = KeyMap::new(&KEYMAP, &FN_ACTIONS);
