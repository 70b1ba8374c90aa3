//! Key actions.
//!
//! - [`Action`] - A single operation, executed when a key is pressed and undone when it is released
//! - [`KeyAction`] - What a key position does, including dual-role keys that have to be resolved first

use crate::keycode::{HidKeyCode, KeyCode};
use crate::modifier::HidModifiers;

/// How a layer key changes the layer state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LayerOp {
    /// Active while the key is held (MO)
    Momentary,
    /// Flip persistent membership on press (TG)
    Toggle,
    /// Active for the next non-layer key only (OSL)
    OneShot,
    /// Clear all other layers and activate this one (TO)
    SwitchTo,
}

/// A single operation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    /// A plain key, modifier keycodes are registered as modifiers
    Key(KeyCode),
    /// A key sent together with extra modifiers, eg. `(` is shift + 9
    KeyWithModifier(KeyCode, HidModifiers),
    /// Hold modifiers while pressed
    Modifier(HidModifiers),
    /// Apply modifiers to the next key press only
    OneShotModifier(HidModifiers),
    Layer(LayerOp, u8),
    /// Run the macro with the given index
    Macro(u8),
    /// Type a code point via the host's unicode input method
    Unicode(u32),
    /// Type the first code point, or the second one when shifted
    UnicodePair(u32, u32),
    CapsWordToggle,
    /// Ask the platform to jump to the bootloader
    Bootloader,
}

impl Action {
    /// The keyboard page code this action emits, if any
    pub fn hid_keycode(&self) -> Option<HidKeyCode> {
        match self {
            Action::Key(k) | Action::KeyWithModifier(k, _) => k.hid(),
            _ => None,
        }
    }

    /// Layer and modifier actions don't produce characters by themselves
    pub fn is_layer_or_modifier(&self) -> bool {
        match self {
            Action::Layer(_, _) | Action::Modifier(_) | Action::OneShotModifier(_) => true,
            Action::Key(KeyCode::Hid(k)) => k.is_modifier(),
            _ => false,
        }
    }
}

/// KeyAction is the action at a keyboard position, stored in the keymap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyAction {
    /// No action
    No,
    /// Use the action of the layer below
    Transparent,
    Single(Action),
    /// Tap: the action, hold: the modifiers
    ModTap(Action, HidModifiers),
    /// Tap: the action, hold: momentarily activate the layer
    LayerTap(Action, u8),
    /// Tap dance with the given index
    TapDance(u8),
}

impl KeyAction {
    /// Dual-role keys need the tap/hold resolver
    pub fn is_tap_hold(&self) -> bool {
        matches!(self, KeyAction::ModTap(_, _) | KeyAction::LayerTap(_, _))
    }

    /// The action that is executed on a plain press or a tap
    pub fn tap_action(&self) -> Option<Action> {
        match self {
            KeyAction::Single(a) | KeyAction::ModTap(a, _) | KeyAction::LayerTap(a, _) => Some(*a),
            _ => None,
        }
    }
}
