//! Input resolution engine for the Cantor split keyboard.
//!
//! Raw key events from the matrix are resolved against a layered keymap into USB HID reports:
//! combos, dual-role keys, tap dances, caps word, custom shifted keys, text macros and unicode
//! input all happen here. The engine is synchronous, [`runner::KeyboardRunner::poll`] is meant to
//! be called from the main loop about once per millisecond.
//!
//! ## Feature flags
#![doc = document_features::document_features!()]
#![cfg_attr(not(test), no_std)]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod caps_word;
pub mod combo;
pub mod config;
pub mod custom_shift;
pub mod descriptor;
pub mod emitter;
pub mod event;
pub mod event_queue;
pub mod hid;
pub mod keyboard;
pub mod keyboard_macros;
pub mod keymap;
pub mod layer;
pub mod layout;
pub mod layout_macro;
pub mod runner;
pub mod tap_dance;
pub mod tap_hold;
pub mod timer;

pub use cantor_types::{action, keycode, modifier};
pub use cantor_types as types;
