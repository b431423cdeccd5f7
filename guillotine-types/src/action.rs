//! Keyboard actions and behaviors.
//!
//! Actions describe what happens when a key is pressed, from simple key
//! presses to dual-role keys, layer switching, macros and functions.
//!
//! Key types:
//! - [`Action`] - Single operations that keyboards send or execute
//! - [`KeyAction`] - What a keymap cell holds
//! - [`FnAction`] - Entries of the fn action table, referenced by [`KeyAction::Fn`]

use strum::FromRepr;

use crate::keycode::KeyCode;
use crate::modifier::ModifierCombination;

/// A KeyAction is the action at a keyboard position, stored in keymap.
/// It can be a single action like triggering a key, or a composite keyboard action like tap/hold
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyAction {
    /// No action.
    No,
    /// Transparent action, next layer will be checked.
    Transparent,
    /// A single action, such as triggering a key, or activating a layer. Action is triggered when pressed and cancelled when released.
    Single(Action),
    /// Tap hold action, `(tap, hold)`.
    TapHold(Action, Action),
    /// Reference to the fn action table, `Fn(n)` is the `FNn` key.
    Fn(u8),
}

impl KeyAction {
    pub fn is_tap_hold(&self) -> bool {
        matches!(self, KeyAction::TapHold(_, _))
    }
}

/// A single basic action that a keyboard can execute.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    /// Default action, no action.
    No,
    /// A normal key stroke.
    Key(KeyCode),
    /// Key stroke with modifier combination triggered, the modifiers are sent in the same report as the key.
    KeyWithModifier(KeyCode, ModifierCombination),
    /// Modifier combination, registered while the key is held.
    Modifier(ModifierCombination),
    /// Activate a layer while the key is held
    LayerOn(u8),
    /// Toggle a layer, triggered on release
    LayerToggle(u8),
    /// Play the macro with the given id
    TriggerMacro(u8),
    /// Run the function with the given id
    Function(u8),
}

/// Macro ids used by the fn action table.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, FromRepr)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MacroId {
    /// GUI + Left, move left by word
    GuiLeft = 0,
    /// GUI + Right, move right by word
    GuiRight = 1,
    /// Alt + Backspace, delete backwards by word
    AltDel = 2,
}

/// Function ids used by the fn action table.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, FromRepr)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FunctionId {
    /// Reset the controller into its bootloader
    Bootloader = 0,
}

/// An entry of the fn action table.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FnAction {
    /// Turn the layer on while the key is held
    MomentaryLayer(u8),
    /// Turn the layer on and off
    ToggleLayer(u8),
    /// Turn the layer on while held, send the key on tap
    LayerTapKey(u8, KeyCode),
    /// Register the modifiers while held, send the key on tap
    ModsTapKey(ModifierCombination, KeyCode),
    /// Play a macro
    Macro(MacroId),
    /// Run a function
    Function(FunctionId),
}

impl FnAction {
    /// Convert the fn action to the key action processed by the keyboard.
    pub const fn to_key_action(self) -> KeyAction {
        match self {
            FnAction::MomentaryLayer(layer) => KeyAction::Single(Action::LayerOn(layer)),
            FnAction::ToggleLayer(layer) => KeyAction::Single(Action::LayerToggle(layer)),
            FnAction::LayerTapKey(layer, key) => KeyAction::TapHold(Action::Key(key), Action::LayerOn(layer)),
            FnAction::ModsTapKey(modifiers, key) => KeyAction::TapHold(Action::Key(key), Action::Modifier(modifiers)),
            FnAction::Macro(id) => KeyAction::Single(Action::TriggerMacro(id as u8)),
            FnAction::Function(id) => KeyAction::Single(Action::Function(id as u8)),
        }
    }

    /// The layer this action switches, if any.
    pub const fn layer(self) -> Option<u8> {
        match self {
            FnAction::MomentaryLayer(layer) | FnAction::ToggleLayer(layer) | FnAction::LayerTapKey(layer, _) => {
                Some(layer)
            }
            _ => None,
        }
    }
}
