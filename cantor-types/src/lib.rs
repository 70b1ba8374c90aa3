//! # Cantor Types
//!
//! Value types shared by the cantor keymap engine and its layout tables.
//!
//! ## Modules
//!
//! - [`action`] - What a key position does: plain keys, dual-role keys, layer operations, macros, unicode
//! - [`keycode`] - HID keycodes, consumer and system control keys, ascii conversion
//! - [`modifier`] - The 8-bit HID modifier bitfield

#![no_std]

pub mod action;
pub mod keycode;
pub mod modifier;
