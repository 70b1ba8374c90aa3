/// Create a layer in keymap
#[macro_export]
macro_rules! layer {
    ([$([$($x: expr), +]), +]) => {
        [$([$($x), +]),+]
    };
}

/// Create a normal key. For example, `k!(A)` represents `KeyAction::Single(Action::Key(KeyCode::Hid(HidKeyCode::A)))`
#[macro_export]
macro_rules! k {
    ($k: ident) => {
        $crate::action::KeyAction::Single($crate::action::Action::Key($crate::keycode::KeyCode::Hid(
            $crate::keycode::HidKeyCode::$k,
        )))
    };
}

/// Create a normal action: `KeyAction`
#[macro_export]
macro_rules! a {
    ($a: ident) => {
        $crate::action::KeyAction::$a
    };
}

/// Create a normal key with modifier action
#[macro_export]
macro_rules! wm {
    ($x: ident, $m: expr) => {
        $crate::action::KeyAction::Single($crate::action::Action::KeyWithModifier(
            $crate::keycode::KeyCode::Hid($crate::keycode::HidKeyCode::$x),
            $m,
        ))
    };
}

/// Create a shifted key
#[macro_export]
macro_rules! shifted {
    ($x: ident) => {
        $crate::wm!($x, $crate::modifier::HidModifiers::LSHIFT)
    };
}

/// Create an AltGr key, the way the US international layout types extra characters
#[macro_export]
macro_rules! algr {
    ($x: ident) => {
        $crate::wm!($x, $crate::modifier::HidModifiers::RALT)
    };
    ($x: ident, shift) => {
        $crate::wm!(
            $x,
            $crate::modifier::HidModifiers::RALT.union($crate::modifier::HidModifiers::LSHIFT)
        )
    };
}

/// Create a consumer key, eg. `media!(Mute)`
#[macro_export]
macro_rules! media {
    ($k: ident) => {
        $crate::action::KeyAction::Single($crate::action::Action::Key($crate::keycode::KeyCode::Consumer(
            $crate::keycode::ConsumerKey::$k,
        )))
    };
}

/// Create a layer activate action. For example, `mo!(1)` activates layer 1.
#[macro_export]
macro_rules! mo {
    ($x: expr) => {
        $crate::action::KeyAction::Single($crate::action::Action::Layer($crate::action::LayerOp::Momentary, $x))
    };
}

/// Create a layer toggle action
#[macro_export]
macro_rules! tg {
    ($x: expr) => {
        $crate::action::KeyAction::Single($crate::action::Action::Layer($crate::action::LayerOp::Toggle, $x))
    };
}

/// Create a switch-to action: deactivate every other layer and activate layer `n`
#[macro_export]
macro_rules! to {
    ($x: expr) => {
        $crate::action::KeyAction::Single($crate::action::Action::Layer($crate::action::LayerOp::SwitchTo, $x))
    };
}

/// Create an oneshot layer key in keymap
#[macro_export]
macro_rules! osl {
    ($x: expr) => {
        $crate::action::KeyAction::Single($crate::action::Action::Layer($crate::action::LayerOp::OneShot, $x))
    };
}

/// Create an oneshot modifier key in keymap
#[macro_export]
macro_rules! osm {
    ($m: expr) => {
        $crate::action::KeyAction::Single($crate::action::Action::OneShotModifier($m))
    };
}

/// Create a layer activate action or tap key(tap/hold)
#[macro_export]
macro_rules! lt {
    ($x: expr, $k: ident) => {
        $crate::action::KeyAction::LayerTap(
            $crate::action::Action::Key($crate::keycode::KeyCode::Hid($crate::keycode::HidKeyCode::$k)),
            $x,
        )
    };
}

/// Create a modifier-tap-hold action
#[macro_export]
macro_rules! mt {
    ($k: ident, $m: expr) => {
        $crate::action::KeyAction::ModTap(
            $crate::action::Action::Key($crate::keycode::KeyCode::Hid($crate::keycode::HidKeyCode::$k)),
            $m,
        )
    };
}

/// Create a unicode key, lower case first
#[macro_export]
macro_rules! uc {
    ($lower: expr, $upper: expr) => {
        $crate::action::KeyAction::Single($crate::action::Action::UnicodePair($lower, $upper))
    };
    ($cp: expr) => {
        $crate::action::KeyAction::Single($crate::action::Action::Unicode($cp))
    };
}

/// Create a text macro key
#[macro_export]
macro_rules! mc {
    ($x: expr) => {
        $crate::action::KeyAction::Single($crate::action::Action::Macro($x))
    };
}

/// Create a tap dance key
#[macro_export]
macro_rules! td {
    ($x: expr) => {
        $crate::action::KeyAction::TapDance($x)
    };
}
