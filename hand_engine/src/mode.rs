//! Control mode state machine.
//!
//! ```text
//!   Pointer ──► Volume ──► Brightness ──► Keyboard ──┐
//!      ▲                                             │
//!      └─────────────────────────────────────────────┘
//! ```
//!
//! The only transition is "advance to the next mode", triggered by dwelling
//! the index fingertip inside the selector region with index up and middle
//! down.  There is no terminal state.

use std::fmt;
use std::time::{Duration, Instant};

use log::info;
use serde::{Deserialize, Serialize};

use crate::action::ActionCommand;
use crate::cooldown::{ActionId, CooldownTimer};
use crate::digits::DigitState;
use crate::landmark::{LandmarkFrame, Rect};

// ════════════════════════════════════════════════════════════════════════════
// Mode
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Pointer,
    Volume,
    Brightness,
    Keyboard,
}

impl Mode {
    /// Cycle order.
    pub const ALL: [Mode; 4] = [Mode::Pointer, Mode::Volume, Mode::Brightness, Mode::Keyboard];

    pub fn next(self) -> Mode {
        match self {
            Mode::Pointer    => Mode::Volume,
            Mode::Volume     => Mode::Brightness,
            Mode::Brightness => Mode::Keyboard,
            Mode::Keyboard   => Mode::Pointer,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Mode::Pointer    => "pointer",
            Mode::Volume     => "volume",
            Mode::Brightness => "brightness",
            Mode::Keyboard   => "keyboard",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name()) }
}

// ════════════════════════════════════════════════════════════════════════════
// ModeSelector
// ════════════════════════════════════════════════════════════════════════════

/// Active mode plus the dwell region that advances it.
#[derive(Debug, Clone)]
pub struct ModeSelector {
    active:   Mode,
    region:   Rect,
    cooldown: Duration,
}

impl ModeSelector {
    pub fn new(initial: Mode, region: Rect, cooldown: Duration) -> Self {
        ModeSelector { active: initial, region, cooldown }
    }

    pub fn mode(&self) -> Mode { self.active }
    pub fn region(&self) -> &Rect { &self.region }

    /// Whether the index fingertip is inside the selector region.
    pub fn in_region(&self, frame: &LandmarkFrame) -> bool {
        self.region.contains(frame.index_tip())
    }

    /// Advance the mode if this frame holds the trigger pose over the region
    /// and the mode-switch cooldown has expired.
    pub fn update(
        &mut self,
        frame:  &LandmarkFrame,
        digits: DigitState,
        now:    Instant,
        timer:  &mut CooldownTimer,
    ) -> Option<ActionCommand> {
        if !(digits.index() && !digits.middle() && self.in_region(frame)) {
            return None;
        }
        if !timer.try_fire(ActionId::ModeSwitch, now, self.cooldown) {
            return None;
        }
        self.active = self.active.next();
        info!("mode → {}", self.active);
        Some(ActionCommand::SwitchMode(self.active))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmark::{Handedness, Point, LANDMARK_COUNT, INDEX_TIP};

    fn frame_with_tip(x: f32, y: f32) -> LandmarkFrame {
        let mut p = [Point::new(600.0, 500.0); LANDMARK_COUNT];
        p[INDEX_TIP] = Point::new(x, y);
        LandmarkFrame::from_array(p, Handedness::Right)
    }

    fn selector() -> ModeSelector {
        ModeSelector::new(Mode::Pointer, Rect::new(1050.0, 20.0, 150.0, 100.0), Duration::from_millis(500))
    }

    const POINT: [u8; 5] = [0, 1, 0, 0, 0];

    #[test]
    fn cycles_through_all_modes_and_wraps() {
        let mut m = Mode::Pointer;
        let mut seen = Vec::new();
        for _ in 0..5 {
            seen.push(m);
            m = m.next();
        }
        assert_eq!(seen, vec![Mode::Pointer, Mode::Volume, Mode::Brightness, Mode::Keyboard, Mode::Pointer]);
        assert_eq!(Mode::ALL.iter().map(|m| m.next()).collect::<Vec<_>>(),
                   vec![Mode::Volume, Mode::Brightness, Mode::Keyboard, Mode::Pointer]);
    }

    #[test]
    fn dwell_in_region_switches_once_per_cooldown() {
        let t0 = Instant::now();
        let mut timer = CooldownTimer::new();
        let mut sel = selector();
        let f = frame_with_tip(1100.0, 60.0);
        let d = DigitState::from_pattern(POINT);

        assert_eq!(sel.update(&f, d, t0, &mut timer), Some(ActionCommand::SwitchMode(Mode::Volume)));
        assert_eq!(sel.update(&f, d, t0 + Duration::from_millis(100), &mut timer), None);
        assert_eq!(sel.mode(), Mode::Volume);
        assert_eq!(
            sel.update(&f, d, t0 + Duration::from_millis(500), &mut timer),
            Some(ActionCommand::SwitchMode(Mode::Brightness))
        );
    }

    #[test]
    fn outside_region_or_wrong_pose_does_nothing() {
        let t0 = Instant::now();
        let mut timer = CooldownTimer::new();
        let mut sel = selector();

        let outside = frame_with_tip(500.0, 60.0);
        assert_eq!(sel.update(&outside, DigitState::from_pattern(POINT), t0, &mut timer), None);

        let inside = frame_with_tip(1100.0, 60.0);
        let two_up = DigitState::from_pattern([0, 1, 1, 0, 0]);
        assert_eq!(sel.update(&inside, two_up, t0, &mut timer), None);
        assert_eq!(sel.mode(), Mode::Pointer);
        assert!(timer.ready(ActionId::ModeSwitch, t0));
    }

    #[test]
    fn serde_uses_lowercase_names() {
        assert_eq!(serde_json::to_string(&Mode::Brightness).unwrap(), "\"brightness\"");
        let m: Mode = serde_json::from_str("\"keyboard\"").unwrap();
        assert_eq!(m, Mode::Keyboard);
    }
}
