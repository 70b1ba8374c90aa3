use cantor_types::action::Action;
use cantor_types::keycode::HidKeyCode;

use crate::emitter::Emitter;
use crate::timer::{Duration, Instant, Timer};

// Max number of macros
pub const MACRO_MAX_NUM: usize = 8;

/// One piece of a text macro
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MacroItem {
    /// Ascii text, typed in the case chosen when the macro runs
    Text(&'static str),
    /// A code point typed through the host, lower and upper case
    Unicode(u32, u32),
}

/// A text macro is a sequence of items
pub type Macro = &'static [MacroItem];

/// `qu`, `th` and `où`
pub const DEFAULT_MACROS: [Macro; 3] = [
    &[MacroItem::Text("qu")],
    &[MacroItem::Text("th")],
    &[MacroItem::Text("o"), MacroItem::Unicode(0xF9, 0xD9)],
];

/// Case a macro is typed in
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MacroCase {
    Lower,
    /// First character upper case
    Title,
    Upper,
}

/// Type `m` in `case`
pub fn play(m: Macro, case: MacroCase, emitter: &mut Emitter) {
    let mut first = true;
    for item in m {
        match item {
            MacroItem::Text(s) => {
                for c in s.bytes() {
                    let upper = case == MacroCase::Upper || (case == MacroCase::Title && first);
                    let c = if upper { c.to_ascii_uppercase() } else { c.to_ascii_lowercase() };
                    emitter.send_char(c, true);
                    first = false;
                }
            }
            MacroItem::Unicode(lower_cp, upper_cp) => {
                let upper = case == MacroCase::Upper || (case == MacroCase::Title && first);
                emitter.send_unicode(if upper { *upper_cp } else { *lower_cp });
                first = false;
            }
        }
    }
    emitter.refresh();
}

/// Vowels that get a `u` typed in front of them right after a `q`
pub fn is_qu_vowel(action: &Action) -> bool {
    match action {
        Action::UnicodePair(lower, _) => matches!(lower, 0xE8 | 0xE9 | 0xEA),
        _ => matches!(
            action.hid_keycode(),
            Some(HidKeyCode::A | HidKeyCode::E | HidKeyCode::I | HidKeyCode::O | HidKeyCode::Y)
        ),
    }
}

/// Types `qu` when `q` is followed by a vowel in time
#[derive(Debug, Default)]
pub struct QuTimer {
    timer: Timer,
}

impl QuTimer {
    pub const fn new() -> Self {
        Self { timer: Timer::new() }
    }

    /// `q` was typed at `now`
    pub fn arm(&mut self, now: Instant, timeout: Duration) {
        self.timer.start(now, timeout);
    }

    pub fn is_armed(&self) -> bool {
        self.timer.is_armed()
    }

    /// Press of `action`, returns whether a `u` should be typed before it.
    /// Anything that types something disarms the timer.
    pub fn on_press(&mut self, action: &Action, now: Instant) -> bool {
        if action.is_layer_or_modifier() {
            return false;
        }
        let running = self.timer.is_running(now);
        self.timer.cancel();
        running && is_qu_vowel(action)
    }

    pub fn expire(&mut self, now: Instant) {
        if self.timer.poll_expired(now) {
            trace!("Qu timer expired");
        }
    }
}
