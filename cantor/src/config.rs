//! Behavior configuration.
//!
//! The defaults are the compile-time constants below; a keymap can override any of them
//! through [`BehaviorConfig`].

use heapless::Vec;

use crate::combo::{COMBO_MAX_NUM, Combo};
use crate::custom_shift::{CUSTOM_SHIFT_MAX_NUM, CustomShift};
use crate::emitter::UnicodeMode;
use crate::keyboard_macros::{DEFAULT_MACROS, MACRO_MAX_NUM, Macro};
use crate::tap_dance::{TAP_DANCE_MAX_NUM, TapDance};
use crate::tap_hold::TapHoldMode;
use crate::timer::Duration;

/// Hold threshold for mod-tap and layer-tap keys
pub const TAPPING_TERM: Duration = Duration::from_millis(200);
/// Window for combo recognition
pub const COMBO_TERM: Duration = Duration::from_millis(40);
/// Window after `q` in which a vowel gets a `u` inserted before it
pub const QU_TIMEOUT: Duration = Duration::from_millis(500);
/// Caps word turns itself off after this much inactivity
pub const CAPS_WORD_IDLE: Duration = Duration::from_millis(5000);
/// Two dual-role keys pressed closer than this are a roll, not a chord
pub const ROLLING_TERM: Duration = Duration::from_millis(35);
/// Quiet time after a lost report before all keys are released on the host
pub const HID_WATCHDOG: Duration = Duration::from_millis(250);
/// Nested press and release inside a dual-role key means hold
pub const PERMISSIVE_HOLD: bool = true;
/// Rolling dual-role keys resolve as taps
pub const ROLLING_TAP: bool = true;

/// Configurations for all keyboard behaviors
#[derive(Clone, Debug, Default)]
pub struct BehaviorConfig {
    pub tap_hold: TapHoldConfig,
    pub combo: CombosConfig,
    pub caps_word: CapsWordConfig,
    pub custom_shift: CustomShiftConfig,
    pub macros: MacrosConfig,
    pub tap_dance: TapDanceConfig,
    pub unicode: UnicodeConfig,
}

/// Configurations for tap hold behavior
#[derive(Clone, Copy, Debug)]
pub struct TapHoldConfig {
    pub tapping_term: Duration,
    pub mode: TapHoldMode,
    pub rolling_tap: bool,
    pub rolling_term: Duration,
}

impl Default for TapHoldConfig {
    fn default() -> Self {
        Self {
            tapping_term: TAPPING_TERM,
            mode: if PERMISSIVE_HOLD {
                TapHoldMode::PermissiveHold
            } else {
                TapHoldMode::Normal
            },
            rolling_tap: ROLLING_TAP,
            rolling_term: ROLLING_TERM,
        }
    }
}

/// Config for combo behavior
#[derive(Clone, Debug)]
pub struct CombosConfig {
    pub combos: Vec<Combo, COMBO_MAX_NUM>,
    /// Window used by combos that don't set their own
    pub timeout: Duration,
}

impl Default for CombosConfig {
    fn default() -> Self {
        Self {
            combos: Vec::new(),
            timeout: COMBO_TERM,
        }
    }
}

/// Config for caps word
#[derive(Clone, Debug)]
pub struct CapsWordConfig {
    pub idle_timeout: Duration,
    /// Macros that keep caps word on, typed in upper case
    pub continue_macros: Vec<u8, MACRO_MAX_NUM>,
}

impl Default for CapsWordConfig {
    fn default() -> Self {
        Self {
            idle_timeout: CAPS_WORD_IDLE,
            continue_macros: Vec::from_iter(0..DEFAULT_MACROS.len() as u8),
        }
    }
}

/// Config for custom shift keys
#[derive(Clone, Debug, Default)]
pub struct CustomShiftConfig {
    pub keys: Vec<CustomShift, CUSTOM_SHIFT_MAX_NUM>,
}

/// Config for text macros and the timed `qu`
#[derive(Clone, Debug)]
pub struct MacrosConfig {
    pub macros: Vec<Macro, MACRO_MAX_NUM>,
    pub qu_enabled: bool,
    pub qu_timeout: Duration,
}

impl Default for MacrosConfig {
    fn default() -> Self {
        Self {
            macros: Vec::from_iter(DEFAULT_MACROS.iter().copied()),
            qu_enabled: true,
            qu_timeout: QU_TIMEOUT,
        }
    }
}

/// Config for tap dance keys
#[derive(Clone, Debug)]
pub struct TapDanceConfig {
    pub tap_dances: Vec<TapDance, TAP_DANCE_MAX_NUM>,
    pub tapping_term: Duration,
}

impl Default for TapDanceConfig {
    fn default() -> Self {
        Self {
            tap_dances: Vec::new(),
            tapping_term: TAPPING_TERM,
        }
    }
}

/// How code points are typed on the host
#[derive(Clone, Copy, Debug, Default)]
pub struct UnicodeConfig {
    pub mode: UnicodeMode,
}
