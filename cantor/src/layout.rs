//! The Cantor keymap.
//!
//! A 3x6 split with three thumb keys per side, laid out as a 4x12 matrix whose last row only
//! has the thumb keys in columns 3 to 8. The host is expected to use the US international
//! layout, AltGr characters are sent as keys with right alt.

use cantor_types::action::{Action, KeyAction};
use cantor_types::keycode::{HidKeyCode, KeyCode, SystemControlKey};
use cantor_types::modifier::HidModifiers;
use heapless::Vec;

use crate::combo::{COMBO_MAX_NUM, Combo, ComboTrigger};
use crate::config::{BehaviorConfig, CombosConfig, CustomShiftConfig, TapDanceConfig};
use crate::custom_shift::{CUSTOM_SHIFT_MAX_NUM, CustomShift};
use crate::tap_dance::TapDance;
use crate::{algr, k, lt, mc, media, mt, shifted, td, uc};

pub const ROW: usize = 4;
pub const COL: usize = 12;
pub const NUM_LAYER: usize = 4;

pub const BASE: u8 = 0;
pub const NUMNAV: u8 = 1;
pub const SYM: u8 = 2;
pub const FN: u8 = 3;

const _______: KeyAction = KeyAction::Transparent;
const XXXXXXX: KeyAction = KeyAction::No;

const fn key(code: HidKeyCode) -> Action {
    Action::Key(KeyCode::Hid(code))
}

const fn shift(code: HidKeyCode) -> Action {
    Action::KeyWithModifier(KeyCode::Hid(code), HidModifiers::LSHIFT)
}

const fn ralt(code: HidKeyCode) -> Action {
    Action::KeyWithModifier(KeyCode::Hid(code), HidModifiers::RALT)
}

/// ’
pub const RSQU: Action = ralt(HidKeyCode::Kc0);
pub const DQUO: Action = shift(HidKeyCode::Quote);
/// `#`, or `…` when shifted
pub const U_HASH: Action = Action::UnicodePair(0x23, 0x2026);
pub const EXLM: Action = shift(HidKeyCode::Kc1);
pub const LPRN: Action = shift(HidKeyCode::Kc9);
pub const RPRN: Action = shift(HidKeyCode::Kc0);
pub const UNDS: Action = shift(HidKeyCode::Minus);

/// `@`, left shift when held
const AT: KeyAction = KeyAction::ModTap(shift(HidKeyCode::Kc2), HidModifiers::LSHIFT);

/// Index of `TPL` in the tap dances
pub const TPL: u8 = 0;

pub static KEYMAP: [[[KeyAction; COL]; ROW]; NUM_LAYER] = [
    // Base
    [
        [
            k!(Escape), KeyAction::Single(RSQU), k!(B), k!(H), k!(G), KeyAction::Single(DQUO),
            KeyAction::Single(U_HASH), k!(Dot), k!(Slash), k!(J), k!(X), KeyAction::Single(EXLM),
        ],
        [
            KeyAction::Single(LPRN), mt!(C, HidModifiers::LGUI), mt!(S, HidModifiers::LALT), mt!(N, HidModifiers::LSHIFT), mt!(T, HidModifiers::LCTRL), k!(K),
            k!(Comma), mt!(A, HidModifiers::RCTRL), mt!(E, HidModifiers::RSHIFT), mt!(I, HidModifiers::LALT), mt!(M, HidModifiers::RGUI), KeyAction::Single(RPRN),
        ],
        [
            k!(LeftBracket), k!(P), k!(F), k!(L), k!(D), k!(V),
            k!(Minus), k!(U), k!(O), k!(Y), k!(W), k!(RightBracket),
        ],
        [
            XXXXXXX, XXXXXXX, XXXXXXX, k!(Z), lt!(SYM, R), KeyAction::Single(UNDS),
            k!(Enter), lt!(NUMNAV, Space), lt!(FN, Q), XXXXXXX, XXXXXXX, XXXXXXX,
        ],
    ],
    // Numbers and navigation
    [
        [
            _______, shifted!(Kc8), k!(Kc9), k!(Kc8), k!(Kc7), k!(Slash),
            media!(BrightnessDown), k!(PageDown), k!(Up), k!(PageUp), media!(BrightnessUp), media!(VolumeIncrement),
        ],
        [
            algr!(Equal), k!(Kc0), k!(Kc6), mt!(Kc5, HidModifiers::LSHIFT), k!(Kc4), _______,
            k!(Home), k!(Left), k!(Down), k!(Right), k!(End), media!(VolumeDecrement),
        ],
        [
            algr!(Equal, shift), _______, k!(Kc3), k!(Kc2), k!(Kc1), k!(Dot),
            algr!(M, shift), media!(PrevTrack), media!(PlayPause), media!(NextTrack), media!(StopPlay), media!(Mute),
        ],
        [
            XXXXXXX, XXXXXXX, XXXXXXX, _______, _______, _______,
            _______, _______, _______, XXXXXXX, XXXXXXX, XXXXXXX,
        ],
    ],
    // Symbols and accents
    [
        [
            k!(Escape), k!(Quote), algr!(Kc5), shifted!(Backslash), shifted!(Kc5), algr!(Quote, shift),
            algr!(Z), uc!(0xE2, 0xC2), uc!(0xEA, 0xCA), uc!(0xEE, 0xCE), algr!(M), algr!(N),
        ],
        [
            algr!(LeftBracket), algr!(Comma), shifted!(Kc4), AT, shifted!(Grave), shifted!(Kc6),
            uc!(0xE0, 0xC0), algr!(Q), uc!(0xE8, 0xC8), algr!(E), algr!(W), algr!(RightBracket),
        ],
        [
            algr!(Slash), algr!(Kc1), algr!(Semicolon, shift), k!(Backslash), shifted!(Kc7), algr!(X),
            uc!(0xFB, 0xDB), uc!(0xF9, 0xD9), algr!(P), uc!(0xF4, 0xD4), algr!(K), algr!(L),
        ],
        [
            XXXXXXX, XXXXXXX, XXXXXXX, _______, _______, _______,
            _______, algr!(Space), _______, XXXXXXX, XXXXXXX, XXXXXXX,
        ],
    ],
    // Function keys, macros
    [
        [
            _______, mc!(0), mc!(1), mc!(2), _______, _______,
            _______, k!(F9), k!(F10), k!(F11), k!(F12), _______,
        ],
        [
            _______, _______, _______, k!(LShift), _______, _______,
            _______, k!(F5), k!(F6), k!(F7), k!(F8), _______,
        ],
        [
            td!(TPL), _______, _______, _______, _______, _______,
            _______, k!(F1), k!(F2), k!(F3), k!(F4), _______,
        ],
        [
            XXXXXXX, XXXXXXX, XXXXXXX, _______, _______, _______,
            _______, _______, _______, XXXXXXX, XXXXXXX, XXXXXXX,
        ],
    ],
];

pub fn combos() -> Vec<Combo, COMBO_MAX_NUM> {
    use ComboTrigger::Action as A;
    Vec::from_iter([
        Combo::new([A(key(HidKeyCode::B)), A(key(HidKeyCode::H))], key(HidKeyCode::Tab)),
        Combo::new([A(RSQU), A(key(HidKeyCode::B))], shift(HidKeyCode::Tab)),
        Combo::new([A(key(HidKeyCode::Slash)), A(key(HidKeyCode::J))], key(HidKeyCode::Backspace)),
        Combo::new([A(key(HidKeyCode::J)), A(key(HidKeyCode::X))], key(HidKeyCode::Delete)),
        Combo::new([A(U_HASH), A(key(HidKeyCode::Dot))], key(HidKeyCode::PrintScreen)),
        Combo::new([A(LPRN), A(RPRN)], Action::CapsWordToggle),
        Combo::new([A(DQUO), A(U_HASH)], Action::Bootloader),
        Combo::new(
            [A(key(HidKeyCode::Comma)), A(key(HidKeyCode::Minus))],
            Action::Key(KeyCode::SystemControl(SystemControlKey::Sleep)),
        ),
    ])
}

/// Shift + `.` types `;`, not `!`. `!` has its own key on the base layer.
pub fn custom_shift_keys() -> Vec<CustomShift, CUSTOM_SHIFT_MAX_NUM> {
    Vec::from_iter([
        CustomShift::new(key(HidKeyCode::Dot), key(HidKeyCode::Semicolon)),
        CustomShift::new(key(HidKeyCode::Comma), shift(HidKeyCode::Semicolon)),
        CustomShift::new(DQUO, key(HidKeyCode::Equal)),
        CustomShift::new(key(HidKeyCode::Minus), shift(HidKeyCode::Equal)),
        CustomShift::new(LPRN, shift(HidKeyCode::Comma)),
        CustomShift::new(RPRN, shift(HidKeyCode::Dot)),
        CustomShift::new(UNDS, UNDS),
        CustomShift::new(key(HidKeyCode::Slash), shift(HidKeyCode::Kc8)),
        CustomShift::new(RSQU, key(HidKeyCode::Grave)),
        CustomShift::new(EXLM, shift(HidKeyCode::Slash)),
    ])
}

/// Behavior of the Cantor keymap, defaults plus its combos, custom shift keys and `TPL`
pub fn behavior_config() -> BehaviorConfig {
    BehaviorConfig {
        combo: CombosConfig {
            combos: combos(),
            ..Default::default()
        },
        custom_shift: CustomShiftConfig {
            keys: custom_shift_keys(),
        },
        tap_dance: TapDanceConfig {
            tap_dances: Vec::from_iter([TapDance::new(key(HidKeyCode::Minus), shift(HidKeyCode::Equal))]),
            ..Default::default()
        },
        ..Default::default()
    }
}
