use cantor_types::action::Action;
use heapless::Vec;

use crate::event::{KeyPos, KeyboardEvent};
use crate::event_queue::EventQueue;
use crate::timer::{Duration, Instant, Timer};

// Max number of combos
pub const COMBO_MAX_NUM: usize = 16;
// Max number of keys in a combo
pub const COMBO_MAX_LENGTH: usize = 4;

/// What a combo key is recognized by
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ComboTrigger {
    /// A fixed matrix position
    Pos(KeyPos),
    /// Any position whose tap action is this action on the active layers
    Action(Action),
}

impl ComboTrigger {
    fn matches(&self, pos: KeyPos, action: Option<Action>) -> bool {
        match self {
            ComboTrigger::Pos(p) => *p == pos,
            ComboTrigger::Action(a) => action == Some(*a),
        }
    }
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Combo {
    pub triggers: Vec<ComboTrigger, COMBO_MAX_LENGTH>,
    pub action: Action,
    /// Overrides the default combo window
    pub timeout: Option<Duration>,
}

impl Combo {
    pub fn new<I: IntoIterator<Item = ComboTrigger>>(triggers: I, action: Action) -> Self {
        Self {
            triggers: Vec::from_iter(triggers),
            action,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Bitmask of the triggers matched by `keys`, none if some key doesn't belong to this combo
    fn matched(&self, keys: impl Iterator<Item = (KeyPos, Option<Action>)>) -> Option<u8> {
        let mut state = 0u8;
        for (pos, action) in keys {
            let idx = self
                .triggers
                .iter()
                .enumerate()
                .position(|(i, t)| state & (1 << i) == 0 && t.matches(pos, action))?;
            state |= 1 << idx;
        }
        Some(state)
    }

    fn done(&self, state: u8) -> bool {
        state.count_ones() as usize == self.triggers.len()
    }
}

/// A withheld press
#[derive(Clone, Copy, Debug)]
struct BufferedKey {
    event: KeyboardEvent,
    action: Option<Action>,
}

/// A fired combo whose keys aren't all released yet
#[derive(Clone, Debug)]
struct ActiveCombo {
    index: usize,
    held: Vec<KeyPos, COMBO_MAX_LENGTH>,
    /// The combo's virtual key was released by the first key up
    released: bool,
}

/// Recognizes combos in the raw event stream.
///
/// Presses that might start a combo are withheld until the combo completes, the window closes
/// or some other key makes it impossible. Everything the matcher lets through, replayed presses
/// and the virtual combo keys included, is pushed into the output queue in order.
#[derive(Default)]
pub struct ComboMatcher {
    buffer: Vec<BufferedKey, COMBO_MAX_LENGTH>,
    timer: Timer,
    active: Vec<ActiveCombo, COMBO_MAX_NUM>,
}

impl ComboMatcher {
    pub const fn new() -> Self {
        Self {
            buffer: Vec::new(),
            timer: Timer::new(),
            active: Vec::new(),
        }
    }

    /// Presses are being withheld
    pub fn is_buffering(&self) -> bool {
        !self.buffer.is_empty()
    }

    /// Feed a raw event. `action` is the tap action of the key on the current layers.
    pub fn process<const N: usize>(
        &mut self,
        combos: &[Combo],
        default_timeout: Duration,
        event: KeyboardEvent,
        action: Option<Action>,
        out: &mut EventQueue<N>,
    ) {
        if event.pressed {
            self.process_press(combos, default_timeout, event, action, out);
        } else {
            self.process_release(combos, event, out);
        }
    }

    fn process_press<const N: usize>(
        &mut self,
        combos: &[Combo],
        default_timeout: Duration,
        event: KeyboardEvent,
        action: Option<Action>,
        out: &mut EventQueue<N>,
    ) {
        let key = BufferedKey { event, action };
        if !self.buffer.is_empty() {
            if self.candidates(combos, Some(key)).next().is_none() {
                // This key can't be part of whatever the buffer was heading for
                self.finalize(combos, out);
            } else {
                // Can't fail, a candidate never has more keys than triggers
                let _ = self.buffer.push(key);
                self.fire_if_complete(combos, out);
                return;
            }
        }

        let window = self
            .candidates(combos, Some(key))
            .map(|(i, _)| combos[i].timeout.unwrap_or(default_timeout))
            .max();
        match window {
            Some(window) => {
                let _ = self.buffer.push(key);
                self.timer.start(event.time, window);
                self.fire_if_complete(combos, out);
            }
            None => push(out, event),
        }
    }

    fn process_release<const N: usize>(&mut self, combos: &[Combo], event: KeyboardEvent, out: &mut EventQueue<N>) {
        // The release of any key that isn't held for a fired combo ends the window, it must not
        // overtake the withheld presses
        if self.is_buffering() && !self.active.iter().any(|c| c.held.contains(&event.pos)) {
            self.finalize(combos, out);
        }

        if let Some(i) = self.active.iter().position(|c| c.held.contains(&event.pos)) {
            let combo = &mut self.active[i];
            combo.held.retain(|p| *p != event.pos);
            if !combo.released {
                combo.released = true;
                debug!("Combo {} released", combo.index);
                push(out, KeyboardEvent {
                    pos: KeyPos::combo(combo.index),
                    pressed: false,
                    time: event.time,
                });
            }
            if combo.held.is_empty() {
                self.active.swap_remove(i);
            }
            return;
        }

        push(out, event);
    }

    /// Close the window once it has passed at `now`
    pub fn expire<const N: usize>(&mut self, combos: &[Combo], now: Instant, out: &mut EventQueue<N>) {
        if self.timer.poll_expired(now) && !self.buffer.is_empty() {
            debug!("Combo window closed");
            self.finalize(combos, out);
        }
    }

    /// Combos that the buffered keys plus `extra` are a part of, with their trigger state
    fn candidates<'c>(
        &'c self,
        combos: &'c [Combo],
        extra: Option<BufferedKey>,
    ) -> impl Iterator<Item = (usize, u8)> + 'c {
        combos.iter().enumerate().filter_map(move |(i, combo)| {
            let keys = self.buffer.iter().chain(extra.iter()).map(|k| (k.event.pos, k.action));
            combo.matched(keys).map(|state| (i, state))
        })
    }

    /// Fire when a combo is complete and no longer one could still be completed
    fn fire_if_complete<const N: usize>(&mut self, combos: &[Combo], out: &mut EventQueue<N>) {
        let mut complete = None;
        for (i, state) in self.candidates(combos, None) {
            if !combos[i].done(state) {
                return;
            }
            if complete.is_none() {
                complete = Some(i);
            }
        }
        if let Some(i) = complete {
            self.fire(i, out);
        }
    }

    /// Fire the combo that exactly matches the buffer, or let the withheld presses through
    fn finalize<const N: usize>(&mut self, combos: &[Combo], out: &mut EventQueue<N>) {
        self.timer.cancel();
        let matched = self
            .candidates(combos, None)
            .filter(|(i, state)| combos[*i].done(*state))
            .map(|(i, _)| i)
            .next();
        match matched {
            Some(i) => self.fire(i, out),
            None => {
                for key in self.buffer.iter() {
                    push(out, key.event);
                }
                self.buffer.clear();
            }
        }
    }

    fn fire<const N: usize>(&mut self, index: usize, out: &mut EventQueue<N>) {
        self.timer.cancel();
        let time = self.buffer.last().map(|k| k.event.time).unwrap_or_default();
        let held = self.buffer.iter().map(|k| k.event.pos).collect();
        self.buffer.clear();
        debug!("Combo {} triggered", index);
        if self
            .active
            .push(ActiveCombo {
                index,
                held,
                released: false,
            })
            .is_err()
        {
            warn!("Too many active combos, combo {} ignored", index);
            return;
        }
        push(out, KeyboardEvent {
            pos: KeyPos::combo(index),
            pressed: true,
            time,
        });
    }
}

fn push<const N: usize>(out: &mut EventQueue<N>, event: KeyboardEvent) {
    if out.push(event).is_err() {
        error!("Event queue full, dropping {:?}", event);
    }
}

#[cfg(test)]
mod test {
    use std::vec::Vec as StdVec;

    use cantor_types::keycode::{HidKeyCode, KeyCode};

    use super::*;
    use crate::timer::Instant;

    const TERM: Duration = Duration::from_millis(40);

    fn key(code: HidKeyCode) -> Action {
        Action::Key(KeyCode::Hid(code))
    }

    fn combos() -> [Combo; 3] {
        [
            Combo::new([ComboTrigger::Pos(KeyPos::new(0, 0)), ComboTrigger::Pos(KeyPos::new(0, 1))], key(HidKeyCode::Tab)),
            Combo::new(
                [ComboTrigger::Action(key(HidKeyCode::J)), ComboTrigger::Action(key(HidKeyCode::X))],
                key(HidKeyCode::Delete),
            ),
            Combo::new(
                [
                    ComboTrigger::Action(key(HidKeyCode::J)),
                    ComboTrigger::Action(key(HidKeyCode::X)),
                    ComboTrigger::Pos(KeyPos::new(1, 0)),
                ],
                key(HidKeyCode::Escape),
            ),
        ]
    }

    fn ev(row: u8, col: u8, pressed: bool, t: u32) -> KeyboardEvent {
        KeyboardEvent::key(row, col, pressed, Instant::from_millis(t))
    }

    fn drain(out: &mut EventQueue<16>) -> StdVec<(KeyPos, bool, u32)> {
        let mut v = StdVec::new();
        while let Some(e) = out.pop_front() {
            v.push((e.pos, e.pressed, e.time.as_millis()));
        }
        v
    }

    #[test]
    fn test_combo_fires_and_consumes_keys() {
        let combos = combos();
        let mut m = ComboMatcher::new();
        let mut out = EventQueue::<16>::new();
        m.process(&combos, TERM, ev(0, 0, true, 0), None, &mut out);
        assert!(out.is_empty());
        m.process(&combos, TERM, ev(0, 1, true, 10), None, &mut out);
        assert_eq!(drain(&mut out), [(KeyPos::combo(0), true, 10)]);
        m.process(&combos, TERM, ev(0, 1, false, 50), None, &mut out);
        m.process(&combos, TERM, ev(0, 0, false, 60), None, &mut out);
        assert_eq!(drain(&mut out), [(KeyPos::combo(0), false, 50)]);
    }

    #[test]
    fn test_window_expiry_replays_presses() {
        let combos = combos();
        let mut m = ComboMatcher::new();
        let mut out = EventQueue::<16>::new();
        m.process(&combos, TERM, ev(0, 0, true, 0), None, &mut out);
        m.expire(&combos, Instant::from_millis(39), &mut out);
        assert!(out.is_empty());
        m.expire(&combos, Instant::from_millis(40), &mut out);
        assert_eq!(drain(&mut out), [(KeyPos::new(0, 0), true, 0)]);
        assert!(!m.is_buffering());
    }

    #[test]
    fn test_release_before_completion_replays() {
        let combos = combos();
        let mut m = ComboMatcher::new();
        let mut out = EventQueue::<16>::new();
        m.process(&combos, TERM, ev(0, 0, true, 0), None, &mut out);
        m.process(&combos, TERM, ev(0, 0, false, 20), None, &mut out);
        assert_eq!(
            drain(&mut out),
            [(KeyPos::new(0, 0), true, 0), (KeyPos::new(0, 0), false, 20)]
        );
    }

    #[test]
    fn test_other_key_flushes_buffer() {
        let combos = combos();
        let mut m = ComboMatcher::new();
        let mut out = EventQueue::<16>::new();
        m.process(&combos, TERM, ev(0, 0, true, 0), None, &mut out);
        m.process(&combos, TERM, ev(2, 2, true, 5), Some(key(HidKeyCode::A)), &mut out);
        assert_eq!(
            drain(&mut out),
            [(KeyPos::new(0, 0), true, 0), (KeyPos::new(2, 2), true, 5)]
        );
    }

    #[test]
    fn test_other_release_flushes_buffer() {
        let combos = combos();
        let mut m = ComboMatcher::new();
        let mut out = EventQueue::<16>::new();
        m.process(&combos, TERM, ev(2, 2, true, 0), Some(key(HidKeyCode::A)), &mut out);
        m.process(&combos, TERM, ev(0, 0, true, 5), None, &mut out);
        m.process(&combos, TERM, ev(2, 2, false, 10), None, &mut out);
        assert_eq!(
            drain(&mut out),
            [
                (KeyPos::new(2, 2), true, 0),
                (KeyPos::new(0, 0), true, 5),
                (KeyPos::new(2, 2), false, 10)
            ]
        );
        assert!(!m.is_buffering());
    }

    #[test]
    fn test_longer_combo_waits() {
        let combos = combos();
        let mut m = ComboMatcher::new();
        let mut out = EventQueue::<16>::new();
        m.process(&combos, TERM, ev(2, 0, true, 0), Some(key(HidKeyCode::J)), &mut out);
        m.process(&combos, TERM, ev(2, 1, true, 5), Some(key(HidKeyCode::X)), &mut out);
        // J+X+Esc position could still complete
        assert!(out.is_empty());
        m.expire(&combos, Instant::from_millis(40), &mut out);
        assert_eq!(drain(&mut out), [(KeyPos::combo(1), true, 5)]);

        m.process(&combos, TERM, ev(2, 0, false, 60), None, &mut out);
        m.process(&combos, TERM, ev(2, 1, false, 61), None, &mut out);
        m.process(&combos, TERM, ev(2, 0, true, 100), Some(key(HidKeyCode::J)), &mut out);
        m.process(&combos, TERM, ev(2, 1, true, 105), Some(key(HidKeyCode::X)), &mut out);
        m.process(&combos, TERM, ev(1, 0, true, 110), None, &mut out);
        assert_eq!(
            drain(&mut out),
            [(KeyPos::combo(1), false, 60), (KeyPos::combo(2), true, 110)]
        );
    }
}
