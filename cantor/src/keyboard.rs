//! The key processing pipeline.
//!
//! Raw events go through the combo matcher first. What comes out of it is queued for the
//! tap/hold stage, which holds events back while a dual-role key is undecided. Decided events
//! are turned into actions on the emitter.

use cantor_types::action::{Action, KeyAction, LayerOp};
use cantor_types::keycode::{HidKeyCode, KeyCode};
use cantor_types::modifier::HidModifiers;
use heapless::{Deque, Vec};

use crate::caps_word::{CapsWord, CapsWordEffect};
use crate::combo::ComboMatcher;
use crate::config::BehaviorConfig;
use crate::custom_shift;
use crate::emitter::Emitter;
use crate::event::{KeyPos, KeyboardEvent};
use crate::event_queue::EventQueue;
use crate::hid::{Report, ReportSource};
use crate::keyboard_macros::{self, MacroCase, QuTimer};
use crate::keymap::KeyMap;
use crate::layer::LayerActivation;
use crate::tap_dance::{DanceOutcome, TapDancer};
use crate::tap_hold::{self, BufferedPress, LOOKAHEAD_SIZE, PendingKey, TapHoldDecision};
use crate::timer::Instant;

/// Capacity of the queue between the combo and tap/hold stages
pub const EVENT_QUEUE_SIZE: usize = 64;
/// Max number of keys that are down at the same time
pub const ACTIVE_KEYS_MAX: usize = 32;

/// Requests for the platform, outside of HID
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlatformCommand {
    /// Reboot into the bootloader
    Bootloader,
}

/// What a pressed key did, undone when the key is released
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum Activation {
    Key,
    Modifier(HidModifiers),
    Layer(u8),
    Consumer,
    System,
    /// Nothing to undo
    Done,
}

pub struct Keyboard<'a, const ROW: usize, const COL: usize, const NUM_LAYER: usize> {
    keymap: KeyMap<'a, ROW, COL, NUM_LAYER>,
    behavior: BehaviorConfig,
    emitter: Emitter,
    combos: ComboMatcher,
    /// Events past the combo matcher
    incoming: EventQueue<EVENT_QUEUE_SIZE>,
    /// The undecided dual-role key
    pending: Option<PendingKey>,
    /// Events that arrived while `pending` was undecided
    lookahead: Deque<KeyboardEvent, LOOKAHEAD_SIZE>,
    tap_dance: TapDancer,
    caps_word: CapsWord,
    qu: QuTimer,
    /// Keys that are down, with what they did
    active_keys: Vec<(KeyPos, Activation), ACTIVE_KEYS_MAX>,
    platform_command: Option<PlatformCommand>,
}

impl<'a, const ROW: usize, const COL: usize, const NUM_LAYER: usize> Keyboard<'a, ROW, COL, NUM_LAYER> {
    pub fn new(layers: &'a [[[KeyAction; COL]; ROW]; NUM_LAYER], behavior: BehaviorConfig) -> Self {
        let emitter = Emitter::new(behavior.unicode.mode);
        Self {
            keymap: KeyMap::new(layers),
            behavior,
            emitter,
            combos: ComboMatcher::new(),
            incoming: EventQueue::new(),
            pending: None,
            lookahead: Deque::new(),
            tap_dance: TapDancer::new(),
            caps_word: CapsWord::new(),
            qu: QuTimer::new(),
            active_keys: Vec::new(),
            platform_command: None,
        }
    }

    pub fn keymap(&self) -> &KeyMap<'a, ROW, COL, NUM_LAYER> {
        &self.keymap
    }

    pub fn emitter(&self) -> &Emitter {
        &self.emitter
    }

    pub fn behavior(&self) -> &BehaviorConfig {
        &self.behavior
    }

    pub fn caps_word_active(&self) -> bool {
        self.caps_word.is_active()
    }

    /// A dual-role key is waiting for its decision
    pub fn has_pending_key(&self) -> bool {
        self.pending.is_some()
    }

    pub fn take_platform_command(&mut self) -> Option<PlatformCommand> {
        self.platform_command.take()
    }

    /// Process a raw key event. Deadlines up to the event's time are handled first.
    pub fn process(&mut self, event: KeyboardEvent) {
        self.tick(event.time);
        trace!("Processing {:?}", event);
        let action = if event.pressed {
            self.action_at(event.pos).tap_action()
        } else {
            None
        };
        self.combos.process(
            &self.behavior.combo.combos,
            self.behavior.combo.timeout,
            event,
            action,
            &mut self.incoming,
        );
        self.drain();
    }

    /// Handle every deadline that has passed at `now`
    pub fn tick(&mut self, now: Instant) {
        self.combos.expire(&self.behavior.combo.combos, now, &mut self.incoming);
        self.drain();

        // Replayed keys can be dual-role too, so this can take a few rounds
        while let Some(pending) = self.pending {
            let deadline = pending.press_time() + self.behavior.tap_hold.tapping_term;
            if !now.has_reached(deadline) {
                break;
            }
            self.resolve(TapHoldDecision::Hold);
            self.drain();
        }

        if let Some((pos, outcome)) = self.tap_dance.expire(&self.behavior.tap_dance.tap_dances, now) {
            self.finish_dance(pos, outcome, now);
        }

        if self.caps_word.expire(now) {
            self.emitter.del_weak_mods(HidModifiers::LSHIFT);
            self.emitter.refresh();
        }

        // A key still waiting for its tap is checked against the timer at its press time
        if self.pending.is_none() && !self.combos.is_buffering() {
            self.qu.expire(now);
        }
    }

    /// Run events through the tap/hold stage
    fn drain(&mut self) {
        while let Some(event) = self.incoming.pop_front() {
            let Some(pending) = self.pending else {
                self.handle_event(event);
                continue;
            };

            let action = self.action_at(event.pos);
            let buffered = if event.pressed {
                None
            } else {
                self.lookahead
                    .iter()
                    .find(|e| e.pressed && e.pos == event.pos)
                    .map(|e| BufferedPress {
                        event: *e,
                        action: self.action_at(e.pos),
                    })
            };
            let decision = tap_hold::decide(
                &self.behavior.tap_hold,
                &pending,
                &event,
                action,
                buffered,
                self.lookahead.is_full(),
            );
            match decision {
                TapHoldDecision::Buffer => {
                    if self.lookahead.push_back(event).is_err() {
                        error!("Lookahead overflow, dropping {:?}", event);
                    }
                }
                TapHoldDecision::Ignore => self.handle_event(event),
                TapHoldDecision::Tap | TapHoldDecision::Hold => {
                    // The deciding event runs after the replay
                    self.requeue(event);
                    self.resolve(decision);
                }
            }
        }
    }

    fn requeue(&mut self, event: KeyboardEvent) {
        if self.incoming.push_front(event).is_err() {
            error!("Event queue full, dropping {:?}", event);
        }
    }

    /// Execute the decision for the pending key and replay the lookahead in front of everything.
    /// A tap acts as if it happened when the key was pressed.
    fn resolve(&mut self, decision: TapHoldDecision) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        while let Some(event) = self.lookahead.pop_back() {
            self.requeue(event);
        }

        let pos = pending.pos();
        match (decision, pending.action) {
            (TapHoldDecision::Hold, KeyAction::ModTap(_, mods)) => {
                debug!("{:?} held: {:?}", pos, mods);
                self.emitter.register_mod(mods);
                self.activate(pos, Activation::Modifier(mods));
            }
            (TapHoldDecision::Hold, KeyAction::LayerTap(_, layer)) => {
                debug!("{:?} held: layer {}", pos, layer);
                self.keymap.activate_layer(layer, LayerActivation::Momentary);
                self.activate(pos, Activation::Layer(layer));
            }
            _ => {
                debug!("{:?} tapped", pos);
                if let Some(action) = pending.tap() {
                    self.press_action(pos, action, pending.press_time());
                }
            }
        }
    }

    fn handle_event(&mut self, event: KeyboardEvent) {
        if let Some((pos, outcome)) = self.tap_dance.expire(&self.behavior.tap_dance.tap_dances, event.time) {
            self.finish_dance(pos, outcome, event.time);
        }
        if event.pressed {
            self.handle_press(event);
        } else {
            self.handle_release(event);
        }
    }

    fn handle_press(&mut self, event: KeyboardEvent) {
        let action = self.action_at(event.pos);
        let same_dance = matches!(action, KeyAction::TapDance(i) if self.tap_dance.is_dancing(i, event.pos));
        if !same_dance {
            if let Some((pos, outcome)) = self.tap_dance.interrupt(&self.behavior.tap_dance.tap_dances) {
                self.finish_dance(pos, outcome, event.time);
            }
        }

        match action {
            KeyAction::No | KeyAction::Transparent => debug!("No action at {:?}", event.pos),
            KeyAction::Single(a) => self.press_action(event.pos, a, event.time),
            KeyAction::ModTap(_, _) | KeyAction::LayerTap(_, _) => {
                self.pending = Some(PendingKey { event, action });
            }
            KeyAction::TapDance(index) => {
                let outcome = self.tap_dance.on_press(
                    &self.behavior.tap_dance.tap_dances,
                    index,
                    event.pos,
                    event.time,
                    self.behavior.tap_dance.tapping_term,
                );
                if let Some(outcome) = outcome {
                    self.finish_dance(event.pos, outcome, event.time);
                }
            }
        }
    }

    fn handle_release(&mut self, event: KeyboardEvent) {
        if self
            .tap_dance
            .on_release(event.pos, event.time, self.behavior.tap_dance.tapping_term)
        {
            return;
        }
        self.release_pos(event.pos);
    }

    fn finish_dance(&mut self, pos: KeyPos, outcome: DanceOutcome, time: Instant) {
        match outcome {
            DanceOutcome::Tap(action) => {
                self.press_action(pos, action, time);
                self.release_pos(pos);
            }
            DanceOutcome::Hold(action) => self.press_action(pos, action, time),
        }
    }

    /// The action at `pos`, including the virtual positions of combos
    fn action_at(&self, pos: KeyPos) -> KeyAction {
        match pos.combo_index() {
            Some(i) => self
                .behavior
                .combo
                .combos
                .get(i)
                .map(|c| KeyAction::Single(c.action))
                .unwrap_or(KeyAction::No),
            None => self.keymap.get_action(pos),
        }
    }

    /// Press a single action for the key at `pos`
    fn press_action(&mut self, pos: KeyPos, action: Action, time: Instant) {
        if self.caps_word.is_active() {
            let effect = self.caps_word.on_press(
                &action,
                self.emitter.mods().strong,
                &self.behavior.caps_word.continue_macros,
                time,
                self.behavior.caps_word.idle_timeout,
            );
            match effect {
                CapsWordEffect::Shift => self.emitter.add_weak_mods(HidModifiers::LSHIFT),
                CapsWordEffect::Plain | CapsWordEffect::End => self.emitter.del_weak_mods(HidModifiers::LSHIFT),
                CapsWordEffect::Neutral => (),
            }
        }

        if self.behavior.macros.qu_enabled && self.qu.on_press(&action, time) {
            debug!("Typing u after q");
            let none = HidModifiers::new();
            self.emitter.tap_key(HidKeyCode::U, none, none);
        }

        let activation = self.execute(pos, action, time);

        if self.behavior.macros.qu_enabled && action.hid_keycode() == Some(HidKeyCode::Q) {
            self.qu.arm(time, self.behavior.macros.qu_timeout);
        }
        if activation != Activation::Done {
            self.activate(pos, activation);
        }
        if !action.is_layer_or_modifier() {
            self.keymap.pop_oneshot_layer();
        }
    }

    fn execute(&mut self, pos: KeyPos, action: Action, time: Instant) -> Activation {
        match action {
            Action::Key(KeyCode::Hid(code)) if code.is_modifier() => {
                let mods = code.to_hid_modifiers();
                self.emitter.register_mod(mods);
                Activation::Modifier(mods)
            }
            Action::Key(KeyCode::Hid(HidKeyCode::No)) => Activation::Done,
            Action::Key(KeyCode::Hid(_)) | Action::KeyWithModifier(KeyCode::Hid(_), _) => self.press_key(pos, action),
            Action::Key(KeyCode::Consumer(key)) | Action::KeyWithModifier(KeyCode::Consumer(key), _) => {
                self.emitter.register_consumer(key);
                Activation::Consumer
            }
            Action::Key(KeyCode::SystemControl(key)) | Action::KeyWithModifier(KeyCode::SystemControl(key), _) => {
                self.emitter.register_system(key);
                Activation::System
            }
            Action::Modifier(mods) => {
                self.emitter.register_mod(mods);
                Activation::Modifier(mods)
            }
            Action::OneShotModifier(mods) => {
                self.emitter.set_oneshot_mods(mods);
                Activation::Done
            }
            Action::Layer(LayerOp::Momentary, layer) => {
                self.keymap.activate_layer(layer, LayerActivation::Momentary);
                Activation::Layer(layer)
            }
            Action::Layer(LayerOp::Toggle, layer) => {
                self.keymap.toggle_layer(layer);
                Activation::Done
            }
            Action::Layer(LayerOp::OneShot, layer) => {
                self.keymap.activate_layer(layer, LayerActivation::OneShot);
                Activation::Done
            }
            Action::Layer(LayerOp::SwitchTo, layer) => {
                self.keymap.switch_to_layer(layer);
                Activation::Done
            }
            Action::Macro(index) => {
                self.play_macro(index);
                Activation::Done
            }
            Action::Unicode(cp) => {
                self.emitter.send_unicode(cp);
                self.emitter.clear_oneshot_mods();
                Activation::Done
            }
            Action::UnicodePair(lower, upper) => {
                let cp = if self.caps_word.is_active() || self.emitter.shift_active() {
                    upper
                } else {
                    lower
                };
                self.emitter.send_unicode(cp);
                self.emitter.clear_oneshot_mods();
                Activation::Done
            }
            Action::CapsWordToggle => {
                let on = self
                    .caps_word
                    .toggle(time, self.behavior.caps_word.idle_timeout);
                if !on {
                    self.emitter.del_weak_mods(HidModifiers::LSHIFT);
                    self.emitter.refresh();
                }
                Activation::Done
            }
            Action::Bootloader => {
                info!("Bootloader requested");
                self.platform_command = Some(PlatformCommand::Bootloader);
                Activation::Done
            }
        }
    }

    /// Register a keyboard key, replaced by its custom shifted action while shift is active
    fn press_key(&mut self, pos: KeyPos, action: Action) -> Activation {
        let none = HidModifiers::new();
        let (action, suppress) = match custom_shift::lookup(&self.behavior.custom_shift.keys, action) {
            Some(shifted) if self.emitter.shift_active() => (shifted, HidModifiers::SHIFT),
            _ => (action, none),
        };
        match action {
            Action::Key(KeyCode::Hid(code)) => self.emitter.register_key(pos, code, none, suppress),
            Action::KeyWithModifier(KeyCode::Hid(code), mods) => self.emitter.register_key(pos, code, mods, suppress),
            other => {
                warn!("Custom shift to {:?} is not a keyboard key", other);
                return Activation::Done;
            }
        }
        Activation::Key
    }

    fn play_macro(&mut self, index: u8) {
        let Some(m) = self.behavior.macros.macros.get(index as usize).copied() else {
            warn!("Macro {} is not defined", index);
            return;
        };
        let case = if self.caps_word.is_active() {
            MacroCase::Upper
        } else if self.emitter.shift_active() {
            self.emitter.clear_shift();
            MacroCase::Title
        } else {
            MacroCase::Lower
        };
        keyboard_macros::play(m, case, &mut self.emitter);
        self.emitter.clear_oneshot_mods();
    }

    fn activate(&mut self, pos: KeyPos, activation: Activation) {
        if self.active_keys.push((pos, activation)).is_err() {
            warn!("Too many keys down, {:?} won't be released", pos);
        }
    }

    /// Undo what the key at `pos` did when it was pressed
    fn release_pos(&mut self, pos: KeyPos) {
        let Some(idx) = self.active_keys.iter().position(|(p, _)| *p == pos) else {
            trace!("Release of {:?} with nothing to undo", pos);
            return;
        };
        let (_, activation) = self.active_keys.swap_remove(idx);
        match activation {
            Activation::Key => self.emitter.unregister_key(pos),
            Activation::Modifier(mods) => {
                // Another key may hold the same modifier
                let held = self.held_mods();
                self.emitter.unregister_mod(mods & !held);
            }
            Activation::Layer(layer) => self.keymap.deactivate_layer(layer, LayerActivation::Momentary),
            Activation::Consumer => self.emitter.unregister_consumer(),
            Activation::System => self.emitter.unregister_system(),
            Activation::Done => (),
        }
    }

    fn held_mods(&self) -> HidModifiers {
        self.active_keys
            .iter()
            .fold(HidModifiers::new(), |acc, (_, a)| match a {
                Activation::Modifier(m) => acc | *m,
                _ => acc,
            })
    }
}

impl<const ROW: usize, const COL: usize, const NUM_LAYER: usize> ReportSource for Keyboard<'_, ROW, COL, NUM_LAYER> {
    fn pop_report(&mut self) -> Option<Report> {
        self.emitter.pop_report()
    }
}
