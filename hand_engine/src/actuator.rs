//! Actuator capability: where commands meet the operating system.
//!
//! The engine never calls a platform API itself.  Whoever runs the frame
//! loop hands it something implementing [`Actuator`].

use log::debug;
use thiserror::Error;

use crate::action::{ActionCommand, KeySymbol, Modifier, MouseButton, ScrollDirection};

#[derive(Debug, Error)]
pub enum ActuatorError {
    /// The backing API is missing on this system (no audio endpoint, no
    /// controllable display, …).
    #[error("{0} is unavailable")]
    Unavailable(&'static str),

    #[error("rejected: {0}")]
    Rejected(String),
}

/// Device-control operations consumed by the engine's commands.
pub trait Actuator {
    fn set_volume_percent(&mut self, percent: u8) -> Result<(), ActuatorError>;
    fn volume_percent(&self) -> Result<u8, ActuatorError>;

    fn set_brightness_percent(&mut self, percent: u8) -> Result<(), ActuatorError>;
    fn brightness_percent(&self) -> Result<u8, ActuatorError>;

    fn move_relative(&mut self, dx: i32, dy: i32) -> Result<(), ActuatorError>;
    fn move_to(&mut self, x: i32, y: i32) -> Result<(), ActuatorError>;
    fn click(&mut self, button: MouseButton) -> Result<(), ActuatorError>;
    fn double_click(&mut self) -> Result<(), ActuatorError>;
    /// Positive scrolls up.
    fn scroll(&mut self, delta: i32) -> Result<(), ActuatorError>;

    fn press(&mut self, key: KeySymbol) -> Result<(), ActuatorError>;
    fn press_and_hold(&mut self, modifier: Modifier) -> Result<(), ActuatorError>;
    fn release(&mut self, modifier: Modifier) -> Result<(), ActuatorError>;
}

/// Carry out one command.
///
/// Upper-case characters are typed as shift-hold / lower-case press /
/// shift-release; the shift is released even when the press fails.
pub fn apply<A: Actuator + ?Sized>(
    actuator:      &mut A,
    command:       &ActionCommand,
    scroll_amount: i32,
) -> Result<(), ActuatorError> {
    match *command {
        ActionCommand::MoveCursorBy(dx, dy)    => actuator.move_relative(dx, dy),
        ActionCommand::MoveCursorTo(x, y)      => actuator.move_to(x, y),
        ActionCommand::Click(button)           => actuator.click(button),
        ActionCommand::DoubleClick             => actuator.double_click(),
        ActionCommand::Scroll(ScrollDirection::Up)   => actuator.scroll(scroll_amount),
        ActionCommand::Scroll(ScrollDirection::Down) => actuator.scroll(-scroll_amount),
        ActionCommand::SetVolumePercent(p)     => actuator.set_volume_percent(p.min(100)),
        ActionCommand::SetBrightnessPercent(p) => actuator.set_brightness_percent(p.min(100)),
        ActionCommand::KeyPress(KeySymbol::Char(c)) if c.is_uppercase() => {
            actuator.press_and_hold(Modifier::Shift)?;
            let lower = c.to_lowercase().next().unwrap_or(c);
            let pressed = actuator.press(KeySymbol::Char(lower));
            let released = actuator.release(Modifier::Shift);
            pressed.and(released)
        }
        ActionCommand::KeyPress(key)           => actuator.press(key),
        // Caps state lives in the engine and already shapes the characters
        // it emits; the mode is engine-internal too.
        ActionCommand::ToggleCapsLock | ActionCommand::SwitchMode(_) => {
            debug!("{}: no actuator call", command);
            Ok(())
        }
    }
}

/// Accepts every command and reports neutral levels.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullActuator;

impl Actuator for NullActuator {
    fn set_volume_percent(&mut self, _p: u8) -> Result<(), ActuatorError>     { Ok(()) }
    fn volume_percent(&self) -> Result<u8, ActuatorError>                     { Ok(0) }
    fn set_brightness_percent(&mut self, _p: u8) -> Result<(), ActuatorError> { Ok(()) }
    fn brightness_percent(&self) -> Result<u8, ActuatorError>                 { Ok(0) }
    fn move_relative(&mut self, _dx: i32, _dy: i32) -> Result<(), ActuatorError> { Ok(()) }
    fn move_to(&mut self, _x: i32, _y: i32) -> Result<(), ActuatorError>      { Ok(()) }
    fn click(&mut self, _b: MouseButton) -> Result<(), ActuatorError>         { Ok(()) }
    fn double_click(&mut self) -> Result<(), ActuatorError>                   { Ok(()) }
    fn scroll(&mut self, _delta: i32) -> Result<(), ActuatorError>            { Ok(()) }
    fn press(&mut self, _key: KeySymbol) -> Result<(), ActuatorError>         { Ok(()) }
    fn press_and_hold(&mut self, _m: Modifier) -> Result<(), ActuatorError>   { Ok(()) }
    fn release(&mut self, _m: Modifier) -> Result<(), ActuatorError>          { Ok(()) }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Records every call as a string; optionally fails one operation.
    #[derive(Default)]
    pub(crate) struct Recorder {
        pub calls:   Vec<String>,
        pub fail_on: Option<&'static str>,
    }

    impl Recorder {
        fn log(&mut self, op: &'static str, detail: String) -> Result<(), ActuatorError> {
            if self.fail_on == Some(op) {
                return Err(ActuatorError::Unavailable(op));
            }
            self.calls.push(format!("{} {}", op, detail).trim_end().to_string());
            Ok(())
        }
    }

    impl Actuator for Recorder {
        fn set_volume_percent(&mut self, p: u8) -> Result<(), ActuatorError> { self.log("volume", p.to_string()) }
        fn volume_percent(&self) -> Result<u8, ActuatorError> { Ok(0) }
        fn set_brightness_percent(&mut self, p: u8) -> Result<(), ActuatorError> { self.log("brightness", p.to_string()) }
        fn brightness_percent(&self) -> Result<u8, ActuatorError> { Ok(0) }
        fn move_relative(&mut self, dx: i32, dy: i32) -> Result<(), ActuatorError> { self.log("move_relative", format!("{} {}", dx, dy)) }
        fn move_to(&mut self, x: i32, y: i32) -> Result<(), ActuatorError> { self.log("move_to", format!("{} {}", x, y)) }
        fn click(&mut self, b: MouseButton) -> Result<(), ActuatorError> { self.log("click", format!("{:?}", b)) }
        fn double_click(&mut self) -> Result<(), ActuatorError> { self.log("double_click", String::new()) }
        fn scroll(&mut self, delta: i32) -> Result<(), ActuatorError> { self.log("scroll", delta.to_string()) }
        fn press(&mut self, key: KeySymbol) -> Result<(), ActuatorError> { self.log("press", key.to_string()) }
        fn press_and_hold(&mut self, m: Modifier) -> Result<(), ActuatorError> { self.log("hold", format!("{:?}", m)) }
        fn release(&mut self, m: Modifier) -> Result<(), ActuatorError> { self.log("release", format!("{:?}", m)) }
    }

    #[test]
    fn upper_case_goes_through_shift() {
        let mut r = Recorder::default();
        apply(&mut r, &ActionCommand::KeyPress(KeySymbol::Char('A')), 120).unwrap();
        assert_eq!(r.calls, vec!["hold Shift", "press a", "release Shift"]);
    }

    #[test]
    fn lower_case_and_specials_press_directly() {
        let mut r = Recorder::default();
        apply(&mut r, &ActionCommand::KeyPress(KeySymbol::Char('a')), 120).unwrap();
        apply(&mut r, &ActionCommand::KeyPress(KeySymbol::Char(';')), 120).unwrap();
        apply(&mut r, &ActionCommand::KeyPress(KeySymbol::Enter), 120).unwrap();
        assert_eq!(r.calls, vec!["press a", "press ;", "press enter"]);
    }

    #[test]
    fn shift_released_when_press_fails() {
        let mut r = Recorder { fail_on: Some("press"), ..Recorder::default() };
        assert!(apply(&mut r, &ActionCommand::KeyPress(KeySymbol::Char('Q')), 120).is_err());
        assert_eq!(r.calls, vec!["hold Shift", "release Shift"]);
    }

    #[test]
    fn scroll_direction_sets_sign() {
        let mut r = Recorder::default();
        apply(&mut r, &ActionCommand::Scroll(ScrollDirection::Up), 120).unwrap();
        apply(&mut r, &ActionCommand::Scroll(ScrollDirection::Down), 120).unwrap();
        assert_eq!(r.calls, vec!["scroll 120", "scroll -120"]);
    }

    #[test]
    fn engine_internal_commands_make_no_calls() {
        let mut r = Recorder::default();
        apply(&mut r, &ActionCommand::ToggleCapsLock, 120).unwrap();
        apply(&mut r, &ActionCommand::SwitchMode(crate::mode::Mode::Volume), 120).unwrap();
        assert!(r.calls.is_empty());
    }

    #[test]
    fn failure_is_reported() {
        let mut r = Recorder { fail_on: Some("volume"), ..Recorder::default() };
        let err = apply(&mut r, &ActionCommand::SetVolumePercent(40), 120).unwrap_err();
        assert_eq!(err.to_string(), "volume is unavailable");
    }
}
