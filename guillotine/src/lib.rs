//! # Guillotine
//!
//! A right-handed Dvorak layout for the Atreus keyboard, and the keyboard core running it.
//!
//! Key events from the matrix are resolved against six layers and a table of twelve fn actions,
//! which provide momentary and toggled layers, dual-role (tap-hold) keys, macros and a bootloader key.
//! The resulting HID keyboard reports are sent to [`channel::KEYBOARD_REPORT_CHANNEL`].

#![cfg_attr(not(test), no_std)]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod boot;
pub mod channel;
pub mod config;
pub mod event;
pub mod hid;
pub mod keyboard;
pub mod keyboard_macro;
pub mod keymap;
pub mod layout;
mod layout_macro;
pub mod tap_hold;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
pub use guillotine_types as types;

pub type RawMutex = CriticalSectionRawMutex;

/// Capacity of the key event channel
pub const EVENT_CHANNEL_SIZE: usize = 16;
/// Capacity of the report channel
pub const REPORT_CHANNEL_SIZE: usize = 16;

/// A long running task
pub trait Runnable {
    fn run(&mut self) -> impl core::future::Future<Output = ()>;
}
