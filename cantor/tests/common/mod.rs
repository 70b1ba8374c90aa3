pub mod test_macro;

use cantor::config::BehaviorConfig;
use cantor::descriptor::KeyboardReport;
use cantor::event::KeyboardEvent;
use cantor::hid::{Report, ReportSource};
use cantor::keyboard::Keyboard;
use cantor::layout::{self, COL, KEYMAP, NUM_LAYER, ROW};
use cantor::timer::Instant;
use log::debug;

// Init logger for tests
#[ctor::ctor]
pub fn init_log() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

#[allow(dead_code)]
pub(crate) const KC_LCTRL: u8 = 1 << 0;
#[allow(dead_code)]
pub(crate) const KC_LSHIFT: u8 = 1 << 1;
#[allow(dead_code)]
pub(crate) const KC_LALT: u8 = 1 << 2;
#[allow(dead_code)]
pub(crate) const KC_LGUI: u8 = 1 << 3;
#[allow(dead_code)]
pub(crate) const KC_RSHIFT: u8 = 1 << 5;

/// Time of the first event
const START: u32 = 1000;
/// Quiet time after the last event, long enough for every timeout to pass
const SETTLE: u32 = 6000;

#[derive(Debug, Clone)]
pub struct TestKeyPress {
    pub row: u8,
    pub col: u8,
    pub pressed: bool,
    pub delay: u32, // Delay before this key event in milliseconds
}

/// Feed a key sequence to the keyboard, let every timer expire and return everything it sent
pub fn run_key_sequence<const ROW_: usize, const COL_: usize, const NUM_LAYER_: usize>(
    keyboard: &mut Keyboard<'_, ROW_, COL_, NUM_LAYER_>,
    key_sequence: &[TestKeyPress],
) -> Vec<Report> {
    let mut now = START;
    for key in key_sequence {
        now += key.delay;
        keyboard.process(KeyboardEvent::key(key.row, key.col, key.pressed, Instant::from_millis(now)));
    }
    keyboard.tick(Instant::from_millis(now + SETTLE));

    let mut reports = Vec::new();
    while let Some(report) = keyboard.pop_report() {
        reports.push(report);
    }
    reports
}

// run a keyboard test, input is a seq of key input with delay, the keyboard reports must match exactly
pub fn run_key_sequence_test<const ROW_: usize, const COL_: usize, const NUM_LAYER_: usize>(
    keyboard: &mut Keyboard<'_, ROW_, COL_, NUM_LAYER_>,
    key_sequence: &[TestKeyPress],
    expected_reports: &[KeyboardReport],
) {
    let reports: Vec<KeyboardReport> = run_key_sequence(keyboard, key_sequence)
        .into_iter()
        .filter_map(|report| match report {
            Report::KeyboardReport(r) => Some(r),
            _ => {
                debug!("skipping a non-keyboard report");
                None
            }
        })
        .collect();

    for (i, (expected, report)) in expected_reports.iter().zip(reports.iter()).enumerate() {
        assert_eq!(expected, report, "on #{} reports, expected left but actually right", i);
    }
    assert_eq!(
        expected_reports.len(),
        reports.len(),
        "expected {} reports, got {:?}",
        expected_reports.len(),
        reports
    );
}

pub fn create_test_keyboard_with_config(config: BehaviorConfig) -> Keyboard<'static, ROW, COL, NUM_LAYER> {
    Keyboard::new(&KEYMAP, config)
}

/// The Cantor keymap with its behavior
pub fn create_test_keyboard() -> Keyboard<'static, ROW, COL, NUM_LAYER> {
    create_test_keyboard_with_config(layout::behavior_config())
}
