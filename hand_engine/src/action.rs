//! Action commands: the engine's only output.
//!
//! Each command describes intent; turning it into an OS call is the job of
//! an [`Actuator`](crate::actuator::Actuator).

use std::fmt;

use crate::mode::Mode;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MouseButton { Left, Right }

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollDirection { Up, Down }

/// Held modifier keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Modifier { Shift }

/// A key the virtual keyboard can emit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeySymbol {
    Char(char),
    Space,
    Backspace,
    Enter,
}

impl fmt::Display for KeySymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySymbol::Char(c)   => write!(f, "{}", c),
            KeySymbol::Space     => f.write_str("space"),
            KeySymbol::Backspace => f.write_str("backspace"),
            KeySymbol::Enter     => f.write_str("enter"),
        }
    }
}

/// One control action emitted for a frame.
#[derive(Clone, Debug, PartialEq)]
pub enum ActionCommand {
    /// Relative pointer nudge in screen pixels.
    MoveCursorBy(i32, i32),
    /// Absolute pointer position in screen pixels (smoothed motion).
    MoveCursorTo(i32, i32),
    Click(MouseButton),
    DoubleClick,
    Scroll(ScrollDirection),
    SetVolumePercent(u8),
    SetBrightnessPercent(u8),
    /// Already cased according to the keyboard's caps state.
    KeyPress(KeySymbol),
    ToggleCapsLock,
    SwitchMode(Mode),
}

impl fmt::Display for ActionCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionCommand::MoveCursorBy(dx, dy)    => write!(f, "move by {:+} {:+}", dx, dy),
            ActionCommand::MoveCursorTo(x, y)      => write!(f, "move to {} {}", x, y),
            ActionCommand::Click(MouseButton::Left)  => f.write_str("click left"),
            ActionCommand::Click(MouseButton::Right) => f.write_str("click right"),
            ActionCommand::DoubleClick             => f.write_str("double click"),
            ActionCommand::Scroll(ScrollDirection::Up)   => f.write_str("scroll up"),
            ActionCommand::Scroll(ScrollDirection::Down) => f.write_str("scroll down"),
            ActionCommand::SetVolumePercent(p)     => write!(f, "volume {}%", p),
            ActionCommand::SetBrightnessPercent(p) => write!(f, "brightness {}%", p),
            ActionCommand::KeyPress(k)             => write!(f, "key {}", k),
            ActionCommand::ToggleCapsLock          => f.write_str("caps lock"),
            ActionCommand::SwitchMode(m)           => write!(f, "mode {}", m),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_forms() {
        assert_eq!(ActionCommand::MoveCursorBy(50, 0).to_string(), "move by +50 +0");
        assert_eq!(ActionCommand::SetVolumePercent(40).to_string(), "volume 40%");
        assert_eq!(ActionCommand::KeyPress(KeySymbol::Char('A')).to_string(), "key A");
        assert_eq!(ActionCommand::KeyPress(KeySymbol::Backspace).to_string(), "key backspace");
        assert_eq!(ActionCommand::SwitchMode(Mode::Keyboard).to_string(), "mode keyboard");
    }
}
