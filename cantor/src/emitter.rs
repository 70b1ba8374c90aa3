//! Turns resolved key actions into HID reports.
//!
//! The emitter owns the modifier state and the six key slots of the boot report. Every
//! change produces one report, which goes into an outbox drained by the HID reporter.

use cantor_types::keycode::{ConsumerKey, HidKeyCode, SystemControlKey, from_ascii};
use cantor_types::modifier::HidModifiers;
use heapless::Deque;
use usbd_hid::descriptor::{MediaKeyboardReport, SystemControlReport};

use crate::descriptor::KeyboardReport;
use crate::event::KeyPos;
use crate::hid::{Report, ReportSource};

/// Capacity of the report outbox
pub const REPORT_QUEUE_SIZE: usize = 128;

/// Position used for keys that are tapped by the engine itself
pub(crate) const TAP_POS: KeyPos = KeyPos::new(0xFE, 0);

/// The three modifier layers. The host sees `strong | weak | oneshot`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModState {
    /// Modifiers held by keys: modifier keys and held mod-taps
    pub strong: HidModifiers,
    /// Modifiers applied by the engine, eg. caps word's shift
    pub weak: HidModifiers,
    /// Modifiers waiting for the next key
    pub oneshot: HidModifiers,
}

impl ModState {
    pub fn effective(&self) -> HidModifiers {
        self.strong | self.weak | self.oneshot
    }
}

/// How code points are entered on the host
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UnicodeMode {
    /// IBus: ctrl+shift+u, hex digits, space
    #[default]
    Linux,
    /// WinCompose: ralt, u, hex digits, enter
    WinCompose,
}

pub struct Emitter {
    mods: ModState,
    /// Keys in the report, and the position that registered each of them
    slots: [Option<(KeyPos, HidKeyCode)>; 6],
    last_keyboard_report: KeyboardReport,
    outbox: Deque<Report, REPORT_QUEUE_SIZE>,
    unicode_mode: UnicodeMode,
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new(UnicodeMode::default())
    }
}

impl Emitter {
    pub fn new(unicode_mode: UnicodeMode) -> Self {
        Self {
            mods: ModState::default(),
            slots: [None; 6],
            last_keyboard_report: KeyboardReport::default(),
            outbox: Deque::new(),
            unicode_mode,
        }
    }

    pub fn mods(&self) -> ModState {
        self.mods
    }

    /// Shift is active in any of the modifier layers
    pub fn shift_active(&self) -> bool {
        self.mods.effective().has_shift()
    }

    pub fn register_mod(&mut self, mods: HidModifiers) {
        self.mods.strong |= mods;
        self.send_keyboard_report(HidModifiers::new(), HidModifiers::new());
    }

    pub fn unregister_mod(&mut self, mods: HidModifiers) {
        self.mods.strong &= !mods;
        self.send_keyboard_report(HidModifiers::new(), HidModifiers::new());
    }

    /// Weak modifiers go out with the next report, they don't produce one on their own
    pub fn add_weak_mods(&mut self, mods: HidModifiers) {
        self.mods.weak |= mods;
    }

    pub fn del_weak_mods(&mut self, mods: HidModifiers) {
        self.mods.weak &= !mods;
    }

    pub fn set_oneshot_mods(&mut self, mods: HidModifiers) {
        self.mods.oneshot |= mods;
    }

    pub fn clear_oneshot_mods(&mut self) {
        self.mods.oneshot = HidModifiers::new();
    }

    /// Drop shift from every modifier layer, until a shift key is pressed again
    pub fn clear_shift(&mut self) {
        self.mods.strong &= !HidModifiers::SHIFT;
        self.mods.weak &= !HidModifiers::SHIFT;
        self.mods.oneshot &= !HidModifiers::SHIFT;
    }

    /// Press `code` for the key at `pos`.
    ///
    /// `implicit` is added to and `suppress` removed from the modifiers of this report only.
    /// One-shot modifiers are used up by this key.
    pub fn register_key(&mut self, pos: KeyPos, code: HidKeyCode, implicit: HidModifiers, suppress: HidModifiers) {
        let slot = self
            .slots
            .iter()
            .position(|s| matches!(s, Some((p, _)) if *p == pos))
            .or_else(|| self.slots.iter().position(|s| s.is_none()));
        match slot {
            Some(i) => self.slots[i] = Some((pos, code)),
            None => {
                warn!("Six keys already in the report, {:?} not registered", code);
                return;
            }
        }
        self.send_keyboard_report(implicit, suppress);
        self.mods.oneshot = HidModifiers::new();
    }

    /// Release whatever the key at `pos` registered
    pub fn unregister_key(&mut self, pos: KeyPos) {
        let mut changed = false;
        for slot in self.slots.iter_mut() {
            if matches!(slot, Some((p, _)) if *p == pos) {
                *slot = None;
                changed = true;
            }
        }
        if changed {
            self.send_keyboard_report(HidModifiers::new(), HidModifiers::new());
        }
    }

    /// Press and release `code`, with the same modifier rules as [`Emitter::register_key`]
    pub fn tap_key(&mut self, code: HidKeyCode, implicit: HidModifiers, suppress: HidModifiers) {
        self.register_key(TAP_POS, code, implicit, suppress);
        self.unregister_key(TAP_POS);
    }

    /// Tap out an ascii string.
    ///
    /// With `preserve_case`, the shift state of the keyboard is ignored and only the case of
    /// each character decides whether it is shifted.
    pub fn send_string(&mut self, s: &str, preserve_case: bool) {
        for c in s.bytes() {
            self.send_char(c, preserve_case);
        }
        self.refresh();
    }

    /// Tap one ascii character. The report after the tap still lacks any shift that
    /// `preserve_case` masked, call [`Emitter::refresh`] when done typing.
    pub fn send_char(&mut self, c: u8, preserve_case: bool) {
        let base = if preserve_case {
            self.mods.effective() & !HidModifiers::SHIFT
        } else {
            self.mods.effective()
        };
        let (code, shifted) = from_ascii(c);
        if code == HidKeyCode::No {
            warn!("Can't type {} as a key", c);
            return;
        }
        let mods = if shifted { base | HidModifiers::LSHIFT } else { base };
        self.push_keyboard_report(self.compose(mods, Some(code)));
        self.push_keyboard_report(self.compose(base, None));
    }

    /// Send the live state, if it differs from what the host has
    pub fn refresh(&mut self) {
        self.send_keyboard_report(HidModifiers::new(), HidModifiers::new());
    }

    /// Type a code point through the host input method
    pub fn send_unicode(&mut self, cp: u32) {
        debug!("Sending unicode U+{:X}", cp);
        let none = HidModifiers::new();
        match self.unicode_mode {
            UnicodeMode::Linux => {
                let prefix = HidModifiers::LCTRL | HidModifiers::LSHIFT;
                self.push_keyboard_report(self.compose(prefix, None));
                self.push_keyboard_report(self.compose(prefix, Some(HidKeyCode::U)));
                self.push_keyboard_report(self.compose(none, None));
                self.send_hex(cp);
                self.tap_raw(HidKeyCode::Space);
            }
            UnicodeMode::WinCompose => {
                self.tap_raw(HidKeyCode::RAlt);
                self.tap_raw(HidKeyCode::U);
                self.send_hex(cp);
                self.tap_raw(HidKeyCode::Enter);
            }
        }
        self.send_keyboard_report(none, none);
    }

    /// Lower case hex, at least four digits
    fn send_hex(&mut self, cp: u32) {
        let digits = ((32 - cp.leading_zeros()).div_ceil(4)).max(4);
        for i in (0..digits).rev() {
            let nibble = ((cp >> (i * 4)) & 0xF) as u8;
            self.tap_raw(HidKeyCode::from_hex_digit(nibble));
        }
    }

    /// Tap a key with no modifiers at all
    fn tap_raw(&mut self, code: HidKeyCode) {
        let none = HidModifiers::new();
        if code.is_modifier() {
            self.push_keyboard_report(self.compose(code.to_hid_modifiers(), None));
        } else {
            self.push_keyboard_report(self.compose(none, Some(code)));
        }
        self.push_keyboard_report(self.compose(none, None));
    }

    pub fn register_consumer(&mut self, key: ConsumerKey) {
        self.push_report(Report::MediaKeyboardReport(MediaKeyboardReport { usage_id: key as u16 }));
    }

    pub fn unregister_consumer(&mut self) {
        self.push_report(Report::MediaKeyboardReport(MediaKeyboardReport { usage_id: 0 }));
    }

    pub fn register_system(&mut self, key: SystemControlKey) {
        self.push_report(Report::SystemControlReport(SystemControlReport { usage_id: key as u8 }));
    }

    pub fn unregister_system(&mut self) {
        self.push_report(Report::SystemControlReport(SystemControlReport { usage_id: 0 }));
    }

    /// Report for the current state, with per-report modifier adjustments
    fn send_keyboard_report(&mut self, implicit: HidModifiers, suppress: HidModifiers) {
        let mods = (self.mods.effective() & !suppress) | implicit;
        self.push_keyboard_report(self.compose(mods, None));
    }

    /// Held keys plus an optional extra key
    fn compose(&self, mods: HidModifiers, extra: Option<HidKeyCode>) -> KeyboardReport {
        let mut keycodes = [0u8; 6];
        for (dst, slot) in keycodes.iter_mut().zip(self.slots.iter()) {
            if let Some((_, code)) = slot {
                *dst = *code as u8;
            }
        }
        if let Some(code) = extra {
            match keycodes.iter_mut().find(|k| **k == 0) {
                Some(free) => *free = code as u8,
                None => warn!("No free slot for {:?}", code),
            }
        }
        KeyboardReport {
            modifier: mods.into_bits(),
            reserved: 0,
            leds: 0,
            keycodes,
        }
    }

    fn push_keyboard_report(&mut self, report: KeyboardReport) {
        // Consecutive identical reports don't tell the host anything
        if report.same_state(&self.last_keyboard_report) {
            return;
        }
        self.last_keyboard_report = KeyboardReport {
            modifier: report.modifier,
            reserved: report.reserved,
            leds: report.leds,
            keycodes: report.keycodes,
        };
        self.push_report(Report::KeyboardReport(report));
    }

    fn push_report(&mut self, report: Report) {
        if self.outbox.push_back(report).is_err() {
            error!("Report queue is full, dropping report");
        }
    }
}

impl ReportSource for Emitter {
    fn pop_report(&mut self) -> Option<Report> {
        self.outbox.pop_front()
    }
}
