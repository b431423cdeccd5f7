use serde::{Deserialize, Serialize};

/// Position of a key in the matrix
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyPos {
    pub row: u8,
    pub col: u8,
}

/// A key state change at (row, col), sent by the matrix scanner
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyEvent {
    pub row: u8,
    pub col: u8,
    pub pressed: bool,
}

impl KeyEvent {
    pub const fn press(row: u8, col: u8) -> Self {
        Self { row, col, pressed: true }
    }

    pub const fn release(row: u8, col: u8) -> Self {
        Self {
            row,
            col,
            pressed: false,
        }
    }

    pub const fn pos(&self) -> KeyPos {
        KeyPos {
            row: self.row,
            col: self.col,
        }
    }
}
