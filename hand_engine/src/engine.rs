//! Engine: one frame in, a handful of commands out.
//!
//! ```text
//!   Option<LandmarkFrame> ──► classify ──► ModeSelector ──► active dispatcher
//!                                              │                   │
//!                                              └──── commands ◄────┘
//! ```
//!
//! Everything that survives from one frame to the next lives in
//! [`EngineState`].  There are no globals, so two engines never interfere.

use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::action::ActionCommand;
use crate::actuator::{self, Actuator};
use crate::config::{ConfigError, EngineConfig};
use crate::cooldown::{ActionId, CooldownTimer};
use crate::digits::{self, DigitState};
use crate::dispatch::{KeyButton, KeyboardDispatcher, LevelDispatcher, PointerDispatcher};
use crate::distance::{DistanceMapper, LevelReading};
use crate::landmark::{LandmarkFrame, Point, Rect};
use crate::mode::{Mode, ModeSelector};

// ════════════════════════════════════════════════════════════════════════════
// EngineState
// ════════════════════════════════════════════════════════════════════════════

/// Cross-frame state.  Each field is written by exactly one dispatcher.
pub struct EngineState {
    timer:    CooldownTimer,
    selector: ModeSelector,
    pointer:  PointerDispatcher,
    level:    LevelDispatcher,
    keyboard: KeyboardDispatcher,
    /// Classification of the most recent frame with a hand.
    digits:   Option<DigitState>,
    hovered:  Option<KeyButton>,
}

/// Outcome of [`Engine::run_frame`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameReport {
    pub commands: Vec<ActionCommand>,
    pub applied:  usize,
    pub failed:   usize,
}

// ════════════════════════════════════════════════════════════════════════════
// Engine
// ════════════════════════════════════════════════════════════════════════════

pub struct Engine {
    config: EngineConfig,
    state:  EngineState,
}

impl Engine {
    /// Validate `config` and build a fresh engine in `config.initial_mode`.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let cd = &config.cooldowns;
        let state = EngineState {
            timer:    CooldownTimer::new(),
            selector: ModeSelector::new(config.initial_mode, config.mode_selector, cd.duration(ActionId::ModeSwitch)),
            pointer:  PointerDispatcher::new(config.pointer, *cd),
            level:    LevelDispatcher::new(DistanceMapper::new(config.calibration), &config.level),
            keyboard: KeyboardDispatcher::new(&config.keyboard, cd)?,
            digits:   None,
            hovered:  None,
        };
        Ok(Engine { config, state })
    }

    /// Process one frame.  `None` (no hand detected) produces nothing.
    pub fn process(&mut self, frame: Option<&LandmarkFrame>, now: Instant) -> Vec<ActionCommand> {
        let s = &mut self.state;
        s.level.reset();
        s.hovered = None;

        let Some(frame) = frame else {
            s.digits = None;
            return Vec::new();
        };

        let digits = digits::classify(frame);
        s.digits = Some(digits);
        s.pointer.observe(frame.index_tip());

        let mut out = Vec::new();
        if let Some(cmd) = s.selector.update(frame, digits, now, &mut s.timer) {
            out.push(cmd);
        }

        // The selector region belongs to the mode switch alone.
        if s.selector.in_region(frame) {
            return out;
        }

        let mode = s.selector.mode();
        let cmd = match mode {
            Mode::Pointer => s.pointer.dispatch(frame, digits, now, &mut s.timer),
            Mode::Volume | Mode::Brightness => s.level.dispatch(frame, digits, mode),
            Mode::Keyboard => {
                s.hovered = s.keyboard.hovered(frame).cloned();
                s.keyboard.dispatch(frame, digits, now, &mut s.timer)
            }
        };
        if let Some(cmd) = cmd {
            debug!("[{}] {} → {}", mode, digits, cmd);
            out.push(cmd);
        }
        out
    }

    /// Process one frame and hand the commands to `actuator`.
    ///
    /// A failing command is logged and counted; the rest still run.
    pub fn run_frame(
        &mut self,
        frame:    Option<&LandmarkFrame>,
        now:      Instant,
        actuator: &mut dyn Actuator,
    ) -> FrameReport {
        let commands = self.process(frame, now);
        let mut report = FrameReport::default();
        for cmd in &commands {
            match actuator::apply(&mut *actuator, cmd, self.config.pointer.scroll_amount) {
                Ok(()) => report.applied += 1,
                Err(e) => {
                    warn!("dropped {}: {}", cmd, e);
                    report.failed += 1;
                }
            }
        }
        report.commands = commands;
        report
    }

    // ── accessors ─────────────────────────────────────────────────────────

    pub fn mode(&self) -> Mode { self.state.selector.mode() }
    pub fn mode_region(&self) -> &Rect { self.state.selector.region() }
    pub fn caps_lock(&self) -> bool { self.state.keyboard.caps_lock() }
    pub fn digits(&self) -> Option<DigitState> { self.state.digits }
    pub fn level_reading(&self) -> Option<&LevelReading> { self.state.level.reading() }
    pub fn hovered_key(&self) -> Option<&KeyButton> { self.state.hovered.as_ref() }
    pub fn keyboard(&self) -> &KeyboardDispatcher { &self.state.keyboard }
    pub fn config(&self) -> &EngineConfig { &self.config }

    /// Time left before `id` may fire again.
    pub fn cooldown_remaining(&self, id: ActionId, now: Instant) -> Duration {
        self.state.timer.remaining(id, now)
    }

    pub fn previous_cursor_position(&self) -> Option<Point> {
        self.state.pointer.previous_cursor_position()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
