use heapless::Vec;

use crate::types::action::MacroId;
use crate::types::keycode::KeyCode;

/// Maximum number of operations a macro plays on one key event
pub const MACRO_MAX_OPERATIONS: usize = 4;

/// A step of a macro sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MacroOperation {
    /// Marks the end of a macro sequence
    End,
    /// Press a key and keep it pressed
    Press(KeyCode),
    /// Release a pressed key
    Release(KeyCode),
}

impl MacroOperation {
    /// Swap press and release
    pub fn mirror(self) -> Self {
        match self {
            MacroOperation::Press(k) => MacroOperation::Release(k),
            MacroOperation::Release(k) => MacroOperation::Press(k),
            MacroOperation::End => MacroOperation::End,
        }
    }
}

const GUI_LEFT: [MacroOperation; 3] = [
    MacroOperation::Press(KeyCode::LGui),
    MacroOperation::Press(KeyCode::Left),
    MacroOperation::End,
];

const GUI_RIGHT: [MacroOperation; 3] = [
    MacroOperation::Press(KeyCode::RGui),
    MacroOperation::Press(KeyCode::Right),
    MacroOperation::End,
];

const ALT_DEL: [MacroOperation; 3] = [
    MacroOperation::Press(KeyCode::LAlt),
    MacroOperation::Press(KeyCode::Backspace),
    MacroOperation::End,
];

/// Sequence played when the macro key is pressed.
/// The release sequence is always the mirror of it, so no key is left pressed.
fn press_sequence(id: MacroId) -> &'static [MacroOperation] {
    match id {
        MacroId::GuiLeft => &GUI_LEFT,
        MacroId::GuiRight => &GUI_RIGHT,
        MacroId::AltDel => &ALT_DEL,
    }
}

/// Get the operations of macro `id` for a press (`pressed == true`) or a release.
///
/// Unknown macro ids give an empty sequence.
pub fn play(id: u8, pressed: bool) -> Vec<MacroOperation, MACRO_MAX_OPERATIONS> {
    let mut operations = Vec::new();
    let Some(macro_id) = MacroId::from_repr(id) else {
        debug!("Macro {} is not defined", id);
        return operations;
    };

    let steps = press_sequence(macro_id);
    let len = steps
        .iter()
        .position(|op| *op == MacroOperation::End)
        .unwrap_or(steps.len());

    if pressed {
        for op in &steps[..len] {
            operations.push(*op).ok();
        }
    } else {
        for op in steps[..len].iter().rev() {
            operations.push(op.mirror()).ok();
        }
    }

    operations
}
