use cantor_types::action::Action;

// Max number of custom shift keys
pub const CUSTOM_SHIFT_MAX_NUM: usize = 16;

/// A key that types something else than its normal shifted symbol
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CustomShift {
    pub trigger: Action,
    /// Sent with shift suppressed, so it carries any modifiers it needs itself
    pub shifted: Action,
}

impl CustomShift {
    pub const fn new(trigger: Action, shifted: Action) -> Self {
        Self { trigger, shifted }
    }
}

/// The replacement for `action` when shift is active, if there is one
pub fn lookup(table: &[CustomShift], action: Action) -> Option<Action> {
    table.iter().find(|c| c.trigger == action).map(|c| c.shifted)
}

#[cfg(test)]
mod test {
    use cantor_types::keycode::{HidKeyCode, KeyCode};
    use cantor_types::modifier::HidModifiers;

    use super::*;

    #[test]
    fn test_lookup() {
        let dot = Action::Key(KeyCode::Hid(HidKeyCode::Dot));
        let comma = Action::Key(KeyCode::Hid(HidKeyCode::Comma));
        let colon = Action::KeyWithModifier(KeyCode::Hid(HidKeyCode::Semicolon), HidModifiers::LSHIFT);
        let table = [
            CustomShift::new(dot, Action::Key(KeyCode::Hid(HidKeyCode::Semicolon))),
            CustomShift::new(comma, colon),
        ];
        assert_eq!(lookup(&table, comma), Some(colon));
        assert_eq!(lookup(&table, Action::Key(KeyCode::Hid(HidKeyCode::A))), None);
    }
}
