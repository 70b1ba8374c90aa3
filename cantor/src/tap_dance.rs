use cantor_types::action::Action;

use crate::event::KeyPos;
use crate::timer::{Duration, Instant, Timer};

// Max number of tap dances
pub const TAP_DANCE_MAX_NUM: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TapDance {
    /// Single tap, or the first press held past the term
    pub tap: Action,
    pub double: Action,
}

impl TapDance {
    pub const fn new(tap: Action, double: Action) -> Self {
        Self { tap, double }
    }
}

/// How a finished dance is executed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DanceOutcome {
    /// Press and release the action right away
    Tap(Action),
    /// Press the action, it's released with the key
    Hold(Action),
}

#[derive(Clone, Copy, Debug)]
struct DanceState {
    index: u8,
    pos: KeyPos,
    count: u8,
    pressed: bool,
    timer: Timer,
}

/// Tracks the tap dance that is in progress, there is at most one
#[derive(Debug, Default)]
pub struct TapDancer {
    state: Option<DanceState>,
}

impl TapDancer {
    pub const fn new() -> Self {
        Self { state: None }
    }

    pub fn is_active(&self) -> bool {
        self.state.is_some()
    }

    /// The dance key at `pos` is undecided
    pub fn is_dancing(&self, index: u8, pos: KeyPos) -> bool {
        matches!(self.state, Some(s) if s.index == index && s.pos == pos)
    }

    /// Press of a tap dance key. Returns the outcome if this press finishes the dance.
    pub fn on_press(
        &mut self,
        dances: &[TapDance],
        index: u8,
        pos: KeyPos,
        time: Instant,
        term: Duration,
    ) -> Option<DanceOutcome> {
        if let Some(state) = self.state.as_mut().filter(|s| s.index == index && s.pos == pos && !s.pressed) {
            state.count += 1;
            debug!("Tap dance {} tap {}", index, state.count);
            self.state = None;
            return dances.get(index as usize).map(|d| DanceOutcome::Hold(d.double));
        }

        if dances.get(index as usize).is_none() {
            warn!("Tap dance {} is not defined", index);
            return None;
        }
        let mut timer = Timer::new();
        timer.start(time, term);
        self.state = Some(DanceState {
            index,
            pos,
            count: 1,
            pressed: true,
            timer,
        });
        None
    }

    /// Release of a key, returns whether the dance took it
    pub fn on_release(&mut self, pos: KeyPos, time: Instant, term: Duration) -> bool {
        match self.state.as_mut() {
            Some(state) if state.pos == pos && state.pressed => {
                state.pressed = false;
                state.timer.start(time, term);
                true
            }
            _ => false,
        }
    }

    /// Another key was pressed, the dance ends with what it has so far
    pub fn interrupt(&mut self, dances: &[TapDance]) -> Option<(KeyPos, DanceOutcome)> {
        self.finish(dances)
    }

    /// The term has passed since the last press or release
    pub fn expire(&mut self, dances: &[TapDance], now: Instant) -> Option<(KeyPos, DanceOutcome)> {
        match self.state {
            Some(s) if s.timer.is_expired(now) => self.finish(dances),
            _ => None,
        }
    }

    fn finish(&mut self, dances: &[TapDance]) -> Option<(KeyPos, DanceOutcome)> {
        let state = self.state.take()?;
        let dance = dances.get(state.index as usize)?;
        let outcome = if state.pressed {
            DanceOutcome::Hold(dance.tap)
        } else {
            DanceOutcome::Tap(dance.tap)
        };
        debug!("Tap dance {} finished: {:?}", state.index, outcome);
        Some((state.pos, outcome))
    }
}
