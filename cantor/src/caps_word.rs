use cantor_types::action::Action;
use cantor_types::keycode::{HidKeyCode, KeyCode};
use cantor_types::modifier::HidModifiers;

use crate::timer::{Duration, Instant, Timer};

/// What a key does to an active caps word
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CapsWordEffect {
    /// A letter, typed shifted
    Shift,
    /// Part of the word but typed as is
    Plain,
    /// Doesn't affect caps word
    Neutral,
    /// The word is over, the key is typed unshifted
    End,
}

/// Capitalizes letters until something that isn't part of a word is typed
#[derive(Debug, Default)]
pub struct CapsWord {
    active: bool,
    idle: Timer,
}

impl CapsWord {
    pub const fn new() -> Self {
        Self {
            active: false,
            idle: Timer::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn activate(&mut self, now: Instant, idle_timeout: Duration) {
        debug!("Caps word on");
        self.active = true;
        self.idle.start(now, idle_timeout);
    }

    pub fn deactivate(&mut self) {
        if self.active {
            debug!("Caps word off");
        }
        self.active = false;
        self.idle.cancel();
    }

    /// Returns the new state
    pub fn toggle(&mut self, now: Instant, idle_timeout: Duration) -> bool {
        if self.active {
            self.deactivate();
        } else {
            self.activate(now, idle_timeout);
        }
        self.active
    }

    /// Classify a key press. Keys that keep the word going refresh the idle timeout,
    /// a key that ends it turns caps word off.
    ///
    /// `held` are the modifiers held by keys, `continue_macros` the macros that are part of a word.
    pub fn on_press(
        &mut self,
        action: &Action,
        held: HidModifiers,
        continue_macros: &[u8],
        now: Instant,
        idle_timeout: Duration,
    ) -> CapsWordEffect {
        if !self.active {
            return CapsWordEffect::Neutral;
        }
        let effect = classify(action, held, continue_macros);
        match effect {
            CapsWordEffect::Shift | CapsWordEffect::Plain => self.idle.start(now, idle_timeout),
            CapsWordEffect::End => self.deactivate(),
            CapsWordEffect::Neutral => (),
        }
        effect
    }

    /// Turn off after the idle timeout, returns true if it did
    pub fn expire(&mut self, now: Instant) -> bool {
        if self.active && self.idle.poll_expired(now) {
            debug!("Caps word timed out");
            self.active = false;
            return true;
        }
        false
    }
}

fn classify(action: &Action, held: HidModifiers, continue_macros: &[u8]) -> CapsWordEffect {
    match action {
        // Shifted symbols like `!` or `(` end the word, `_` is the only one that continues it
        Action::KeyWithModifier(KeyCode::Hid(code), mods)
            if mods.has_shift() && !code.is_letter() && *code != HidKeyCode::Minus =>
        {
            CapsWordEffect::End
        }
        Action::Key(KeyCode::Hid(code)) | Action::KeyWithModifier(KeyCode::Hid(code), _) => {
            if code.is_modifier() {
                CapsWordEffect::Neutral
            } else if code.is_letter() {
                // Shortcuts like ctrl+c end the word
                if (held & !HidModifiers::SHIFT).is_empty() {
                    CapsWordEffect::Shift
                } else {
                    CapsWordEffect::End
                }
            } else if code.is_caps_word_continue_key() {
                CapsWordEffect::Plain
            } else {
                CapsWordEffect::End
            }
        }
        Action::UnicodePair(lower, _) if char::from_u32(*lower).is_some_and(char::is_alphabetic) => {
            CapsWordEffect::Shift
        }
        Action::UnicodePair(_, _) => CapsWordEffect::End,
        Action::Macro(i) if continue_macros.contains(i) => CapsWordEffect::Plain,
        Action::Macro(_) | Action::Unicode(_) => CapsWordEffect::End,
        _ => CapsWordEffect::Neutral,
    }
}

#[cfg(test)]
mod test {
    use cantor_types::action::LayerOp;

    use super::*;

    const IDLE: Duration = Duration::from_millis(5000);

    fn key(code: HidKeyCode) -> Action {
        Action::Key(KeyCode::Hid(code))
    }

    fn t(ms: u32) -> Instant {
        Instant::from_millis(ms)
    }

    #[test]
    fn test_word_keys() {
        let mut cw = CapsWord::new();
        let none = HidModifiers::new();
        assert_eq!(cw.on_press(&key(HidKeyCode::A), none, &[], t(0), IDLE), CapsWordEffect::Neutral);
        cw.activate(t(0), IDLE);
        assert_eq!(cw.on_press(&key(HidKeyCode::S), none, &[], t(1), IDLE), CapsWordEffect::Shift);
        assert_eq!(
            cw.on_press(&key(HidKeyCode::Kc3), none, &[], t(2), IDLE),
            CapsWordEffect::Plain
        );
        let unds = Action::KeyWithModifier(KeyCode::Hid(HidKeyCode::Minus), HidModifiers::LSHIFT);
        assert_eq!(cw.on_press(&unds, none, &[], t(3), IDLE), CapsWordEffect::Plain);
        assert_eq!(
            cw.on_press(&Action::Layer(LayerOp::Momentary, 1), none, &[], t(4), IDLE),
            CapsWordEffect::Neutral
        );
        assert_eq!(cw.on_press(&Action::Macro(1), none, &[0, 1, 2], t(5), IDLE), CapsWordEffect::Plain);
        assert_eq!(cw.on_press(&key(HidKeyCode::Space), none, &[], t(6), IDLE), CapsWordEffect::End);
        assert!(!cw.is_active());
    }

    #[test]
    fn test_shortcut_ends_word() {
        let mut cw = CapsWord::new();
        cw.activate(t(0), IDLE);
        assert_eq!(
            cw.on_press(&key(HidKeyCode::C), HidModifiers::LCTRL, &[], t(1), IDLE),
            CapsWordEffect::End
        );
        cw.activate(t(2), IDLE);
        assert_eq!(
            cw.on_press(&key(HidKeyCode::C), HidModifiers::LSHIFT, &[], t(3), IDLE),
            CapsWordEffect::Shift
        );
    }

    #[test]
    fn test_shifted_symbol_ends_word() {
        let mut cw = CapsWord::new();
        let none = HidModifiers::new();
        cw.activate(t(0), IDLE);
        let exlm = Action::KeyWithModifier(KeyCode::Hid(HidKeyCode::Kc1), HidModifiers::LSHIFT);
        assert_eq!(cw.on_press(&exlm, none, &[], t(1), IDLE), CapsWordEffect::End);
        assert!(!cw.is_active());
    }

    #[test]
    fn test_unicode_pair_letters() {
        let mut cw = CapsWord::new();
        let none = HidModifiers::new();
        cw.activate(t(0), IDLE);
        // â / Â
        assert_eq!(
            cw.on_press(&Action::UnicodePair(0xE2, 0xC2), none, &[], t(1), IDLE),
            CapsWordEffect::Shift
        );
        // # / …
        assert_eq!(
            cw.on_press(&Action::UnicodePair(0x23, 0x2026), none, &[], t(2), IDLE),
            CapsWordEffect::End
        );
        assert!(!cw.is_active());
    }

    #[test]
    fn test_idle_timeout_refreshed() {
        let mut cw = CapsWord::new();
        cw.activate(t(0), IDLE);
        cw.on_press(&key(HidKeyCode::A), HidModifiers::new(), &[], t(4000), IDLE);
        assert!(!cw.expire(t(8999)));
        assert!(cw.expire(t(9000)));
        assert!(!cw.is_active());
    }
}
