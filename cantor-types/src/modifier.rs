use core::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not};

use bitfield_struct::bitfield;

/// Modifier byte of a boot keyboard report, bit 0 is left ctrl and bit 7 is right gui.
#[bitfield(u8, order = Lsb)]
#[derive(Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HidModifiers {
    #[bits(1)]
    pub left_ctrl: bool,
    #[bits(1)]
    pub left_shift: bool,
    #[bits(1)]
    pub left_alt: bool,
    #[bits(1)]
    pub left_gui: bool,
    #[bits(1)]
    pub right_ctrl: bool,
    #[bits(1)]
    pub right_shift: bool,
    #[bits(1)]
    pub right_alt: bool,
    #[bits(1)]
    pub right_gui: bool,
}

impl BitOr for HidModifiers {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self::from_bits(self.into_bits() | rhs.into_bits())
    }
}

impl BitAnd for HidModifiers {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self::from_bits(self.into_bits() & rhs.into_bits())
    }
}

impl Not for HidModifiers {
    type Output = Self;

    fn not(self) -> Self::Output {
        Self::from_bits(!self.into_bits())
    }
}

impl BitAndAssign for HidModifiers {
    fn bitand_assign(&mut self, rhs: Self) {
        *self = *self & rhs;
    }
}

impl BitOrAssign for HidModifiers {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = *self | rhs;
    }
}

impl HidModifiers {
    pub const LCTRL: Self = Self::new().with_left_ctrl(true);
    pub const LSHIFT: Self = Self::new().with_left_shift(true);
    pub const LALT: Self = Self::new().with_left_alt(true);
    pub const LGUI: Self = Self::new().with_left_gui(true);
    pub const RCTRL: Self = Self::new().with_right_ctrl(true);
    pub const RSHIFT: Self = Self::new().with_right_shift(true);
    pub const RALT: Self = Self::new().with_right_alt(true);
    pub const RGUI: Self = Self::new().with_right_gui(true);

    /// Both shift bits
    pub const SHIFT: Self = Self::new().with_left_shift(true).with_right_shift(true);

    pub const fn is_empty(self) -> bool {
        self.into_bits() == 0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.into_bits() & other.into_bits() == other.into_bits()
    }

    pub const fn intersects(self, other: Self) -> bool {
        self.into_bits() & other.into_bits() != 0
    }

    pub const fn has_shift(self) -> bool {
        self.intersects(Self::SHIFT)
    }

    /// Union usable in const contexts, where `|` is not available
    pub const fn union(self, other: Self) -> Self {
        Self::from_bits(self.into_bits() | other.into_bits())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_modifier_bits() {
        assert_eq!(HidModifiers::LCTRL.into_bits(), 0x01);
        assert_eq!(HidModifiers::LSHIFT.into_bits(), 0x02);
        assert_eq!(HidModifiers::RGUI.into_bits(), 0x80);
        assert_eq!((HidModifiers::LSHIFT | HidModifiers::RALT).into_bits(), 0x42);
    }

    #[test]
    fn test_shift_mask() {
        let mods = HidModifiers::LCTRL | HidModifiers::RSHIFT;
        assert!(mods.has_shift());
        assert_eq!(mods & !HidModifiers::SHIFT, HidModifiers::LCTRL);
        assert!(!HidModifiers::LCTRL.has_shift());
        assert!(mods.contains(HidModifiers::LCTRL));
        assert!(!mods.contains(HidModifiers::LCTRL | HidModifiers::LALT));
    }
}
