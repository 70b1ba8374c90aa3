use crate::timer::Instant;

/// Row used for the virtual positions of combos, the column is the combo index
pub const COMBO_ROW: u8 = 0xFF;

/// A switch in the matrix
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyPos {
    pub row: u8,
    pub col: u8,
}

impl KeyPos {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// Virtual position a combo emits on
    pub const fn combo(index: usize) -> Self {
        Self {
            row: COMBO_ROW,
            col: index as u8,
        }
    }

    pub const fn combo_index(&self) -> Option<usize> {
        if self.row == COMBO_ROW { Some(self.col as usize) } else { None }
    }
}

/// A raw key change reported by the matrix
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyboardEvent {
    pub pos: KeyPos,
    pub pressed: bool,
    pub time: Instant,
}

impl KeyboardEvent {
    pub const fn key(row: u8, col: u8, pressed: bool, time: Instant) -> Self {
        Self {
            pos: KeyPos { row, col },
            pressed,
            time,
        }
    }
}
