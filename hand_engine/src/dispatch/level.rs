//! Volume and brightness: continuous "set" from a pinch width.
//!
//! Trigger pose: pinky up, middle and ring down, with a hand whose bounding
//! box falls inside the plausibility window.  The quantized percentage is an
//! absolute target; releasing the pose leaves the level where it was.

use log::debug;

use crate::action::ActionCommand;
use crate::config::{AreaWindow, LevelConfig};
use crate::digits::DigitState;
use crate::distance::{DistanceMapper, LevelReading};
use crate::landmark::LandmarkFrame;
use crate::mode::Mode;

pub struct LevelDispatcher {
    mapper:          DistanceMapper,
    window:          AreaWindow,
    volume_pair:     [usize; 2],
    brightness_pair: [usize; 2],
    /// Reading from the most recent triggering frame, for meters.
    last:            Option<LevelReading>,
}

impl LevelDispatcher {
    pub fn new(mapper: DistanceMapper, cfg: &LevelConfig) -> Self {
        LevelDispatcher {
            mapper,
            window:          cfg.area_window,
            volume_pair:     cfg.volume_pair,
            brightness_pair: cfg.brightness_pair,
            last:            None,
        }
    }

    /// Reading of the current frame, `None` when the pose was not held.
    pub fn reading(&self) -> Option<&LevelReading> { self.last.as_ref() }

    /// Forget the last reading (hand lost or mode left).
    pub fn reset(&mut self) { self.last = None; }

    pub fn dispatch(&mut self, frame: &LandmarkFrame, digits: DigitState, mode: Mode) -> Option<ActionCommand> {
        self.reset();

        let [a, b] = match mode {
            Mode::Volume     => self.volume_pair,
            Mode::Brightness => self.brightness_pair,
            _                => return None,
        };

        if !(digits.pinky() && !digits.middle() && !digits.ring()) {
            return None;
        }
        let score = frame.bbox().area_score();
        if !self.window.contains(score) {
            debug!("hand size {} outside plausibility window", score);
            return None;
        }

        let reading = self.mapper.map(frame.point(a), frame.point(b));
        self.last = Some(reading);

        Some(match mode {
            Mode::Volume => ActionCommand::SetVolumePercent(reading.percent),
            _            => ActionCommand::SetBrightnessPercent(reading.percent),
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
