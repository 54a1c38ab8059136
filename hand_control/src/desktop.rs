//! `SimulatedDesktop`: an in-process stand-in for the OS actuators.
//!
//! It keeps the state real audio, display and input APIs would change, so
//! the overlay can show what the gestures did without touching the host.

use std::collections::HashSet;

use hand_engine::{Actuator, ActuatorError, KeySymbol, Modifier, MouseButton};
use log::{debug, info};

#[derive(Debug, Clone)]
pub struct SimulatedDesktop {
    pub volume:       u8,
    pub brightness:   u8,
    pub cursor:       (i32, i32),
    pub screen:       (i32, i32),
    /// Sum of all scroll deltas, positive = up.
    pub scrolled:     i64,
    pub left_clicks:  u32,
    pub right_clicks: u32,
    pub double_clicks: u32,
    pub typed:        String,
    held:             HashSet<Modifier>,
    brightness_available: bool,
}

impl SimulatedDesktop {
    pub fn new(screen_w: i32, screen_h: i32) -> Self {
        SimulatedDesktop {
            volume:        50,
            brightness:    50,
            cursor:        (screen_w / 2, screen_h / 2),
            screen:        (screen_w, screen_h),
            scrolled:      0,
            left_clicks:   0,
            right_clicks:  0,
            double_clicks: 0,
            typed:         String::new(),
            held:          HashSet::new(),
            brightness_available: true,
        }
    }

    /// Behave like a machine with no controllable display.
    pub fn without_brightness(mut self) -> Self {
        self.brightness_available = false;
        self
    }

    pub fn is_held(&self, m: Modifier) -> bool { self.held.contains(&m) }

    /// Last `n` typed characters, for the status line.
    pub fn typed_tail(&self, n: usize) -> String {
        let skip = self.typed.chars().count().saturating_sub(n);
        self.typed.chars().skip(skip).map(|c| if c == '\n' { '|' } else { c }).collect()
    }

    fn clamp_cursor(&mut self) {
        self.cursor.0 = self.cursor.0.clamp(0, self.screen.0 - 1);
        self.cursor.1 = self.cursor.1.clamp(0, self.screen.1 - 1);
    }
}

impl Actuator for SimulatedDesktop {
    fn set_volume_percent(&mut self, percent: u8) -> Result<(), ActuatorError> {
        if percent != self.volume {
            info!("volume {}% → {}%", self.volume, percent);
        }
        self.volume = percent.min(100);
        Ok(())
    }

    fn volume_percent(&self) -> Result<u8, ActuatorError> { Ok(self.volume) }

    fn set_brightness_percent(&mut self, percent: u8) -> Result<(), ActuatorError> {
        if !self.brightness_available {
            return Err(ActuatorError::Unavailable("display brightness"));
        }
        if percent != self.brightness {
            info!("brightness {}% → {}%", self.brightness, percent);
        }
        self.brightness = percent.min(100);
        Ok(())
    }

    fn brightness_percent(&self) -> Result<u8, ActuatorError> {
        if !self.brightness_available {
            return Err(ActuatorError::Unavailable("display brightness"));
        }
        Ok(self.brightness)
    }

    fn move_relative(&mut self, dx: i32, dy: i32) -> Result<(), ActuatorError> {
        self.cursor.0 += dx;
        self.cursor.1 += dy;
        self.clamp_cursor();
        debug!("cursor → {:?}", self.cursor);
        Ok(())
    }

    fn move_to(&mut self, x: i32, y: i32) -> Result<(), ActuatorError> {
        self.cursor = (x, y);
        self.clamp_cursor();
        Ok(())
    }

    fn click(&mut self, button: MouseButton) -> Result<(), ActuatorError> {
        match button {
            MouseButton::Left  => self.left_clicks += 1,
            MouseButton::Right => self.right_clicks += 1,
        }
        info!("{:?} click at {:?}", button, self.cursor);
        Ok(())
    }

    fn double_click(&mut self) -> Result<(), ActuatorError> {
        self.double_clicks += 1;
        info!("double click at {:?}", self.cursor);
        Ok(())
    }

    fn scroll(&mut self, delta: i32) -> Result<(), ActuatorError> {
        self.scrolled += i64::from(delta);
        Ok(())
    }

    fn press(&mut self, key: KeySymbol) -> Result<(), ActuatorError> {
        match key {
            KeySymbol::Char(c) if self.is_held(Modifier::Shift) => self.typed.extend(c.to_uppercase()),
            KeySymbol::Char(c)   => self.typed.push(c),
            KeySymbol::Space     => self.typed.push(' '),
            KeySymbol::Enter     => self.typed.push('\n'),
            KeySymbol::Backspace => { self.typed.pop(); }
        }
        info!("key {}", key);
        Ok(())
    }

    fn press_and_hold(&mut self, modifier: Modifier) -> Result<(), ActuatorError> {
        self.held.insert(modifier);
        Ok(())
    }

    fn release(&mut self, modifier: Modifier) -> Result<(), ActuatorError> {
        if !self.held.remove(&modifier) {
            return Err(ActuatorError::Rejected(format!("{:?} was not held", modifier)));
        }
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
