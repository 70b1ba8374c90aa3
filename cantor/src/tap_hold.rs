//! Tap or hold resolution of dual-role keys.
//!
//! While a mod-tap or layer-tap key is undecided, later events are held back in a lookahead
//! buffer. Every new event is offered to [`decide`]; once the key is decided, the buffered events
//! are replayed in their original order.

use cantor_types::action::{Action, KeyAction};

use crate::config::TapHoldConfig;
use crate::event::{KeyPos, KeyboardEvent};
use crate::timer::Instant;

/// Max number of events held back behind an undecided key
pub const LOOKAHEAD_SIZE: usize = 16;

/// When other keys make a dual-role key a hold
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TapHoldMode {
    /// Another key pressed and released within the dual-role key
    #[default]
    PermissiveHold,
    /// Any other key pressed
    HoldOnOtherPress,
    /// Only the tapping term decides
    Normal,
}

/// A dual-role key that is waiting for a decision
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PendingKey {
    pub event: KeyboardEvent,
    pub action: KeyAction,
}

impl PendingKey {
    pub fn pos(&self) -> KeyPos {
        self.event.pos
    }

    pub fn press_time(&self) -> Instant {
        self.event.time
    }

    pub fn tap(&self) -> Option<Action> {
        self.action.tap_action()
    }
}

/// What to do with the event offered to [`decide`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TapHoldDecision {
    /// The key is a tap. The event still has to be processed after the replay.
    Tap,
    /// The key is a hold. The event still has to be processed after the replay.
    Hold,
    /// Still undecided, put the event in the lookahead
    Buffer,
    /// Unrelated to the pending key, process the event right away
    Ignore,
}

/// A press held back behind the pending key, as seen by [`decide`]
#[derive(Clone, Copy, Debug)]
pub struct BufferedPress {
    pub event: KeyboardEvent,
    pub action: KeyAction,
}

/// Decide the pending key given the next event.
///
/// `action` is what `event`'s key does on the current layers, `buffered` looks up a press in the
/// lookahead and `lookahead_full` tells whether anything more can be held back.
pub fn decide(
    config: &TapHoldConfig,
    pending: &PendingKey,
    event: &KeyboardEvent,
    action: KeyAction,
    buffered: Option<BufferedPress>,
    lookahead_full: bool,
) -> TapHoldDecision {
    // Time first: anything at or after the deadline sees an already held key
    if event.time.has_reached(pending.press_time() + config.tapping_term) {
        return TapHoldDecision::Hold;
    }

    let decision = if event.pressed {
        match action {
            // A layer key in the middle of a roll would be typed on the wrong layer
            KeyAction::Single(Action::Layer(_, _)) => TapHoldDecision::Hold,
            _ if config.mode == TapHoldMode::HoldOnOtherPress => TapHoldDecision::Hold,
            _ => TapHoldDecision::Buffer,
        }
    } else if event.pos == pending.pos() {
        TapHoldDecision::Tap
    } else if let Some(nested) = buffered {
        match config.mode {
            TapHoldMode::Normal => TapHoldDecision::Buffer,
            _ if is_roll(config, pending, &nested) => TapHoldDecision::Buffer,
            _ => TapHoldDecision::Hold,
        }
    } else {
        // Released a key that was down before the pending one
        TapHoldDecision::Ignore
    };

    if decision == TapHoldDecision::Buffer && lookahead_full {
        warn!("Lookahead full, resolving {:?} as hold", pending.pos());
        return TapHoldDecision::Hold;
    }
    decision
}

/// Two dual-role keys pressed in quick succession are typed as letters
fn is_roll(config: &TapHoldConfig, pending: &PendingKey, nested: &BufferedPress) -> bool {
    config.rolling_tap
        && nested.action.is_tap_hold()
        && nested.event.time.duration_since(pending.press_time()) <= config.rolling_term
}
