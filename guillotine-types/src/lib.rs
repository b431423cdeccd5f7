//! # Guillotine Types
//!
//! Fundamental type definitions shared by the guillotine keymap.
//!
//! - [`action`] - Keymap cells, fn action table entries, macro and function ids
//! - [`keycode`] - HID keycodes used by the layout
//! - [`modifier`] - Modifier combinations and the HID modifier byte

#![cfg_attr(not(test), no_std)]

pub mod action;
pub mod keycode;
pub mod modifier;
