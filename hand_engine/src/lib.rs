//! # hand_engine
//!
//! Gesture interpretation for a single tracked hand: 21 landmarks in,
//! device-control commands out.  Detection and the OS-side effects are
//! external; the engine only decides.
//!
//! ## Modes
//!
//! Dwelling the index fingertip in the mode-selector region (index up,
//! middle down) advances `Pointer → Volume → Brightness → Keyboard → Pointer`.
//! While the fingertip is in that region no other gesture is dispatched.
//!
//! ## Gesture → Action mapping
//!
//! Digits are written thumb first, `1` = extended.
//!
//! | Mode | Digits | Action |
//! |---|---|---|
//! | Pointer | `0 1 1 0 0` | Move cursor (fixed nudge, or smoothed absolute) |
//! | Pointer | `0 0 1 0 0` | Left click |
//! | Pointer | `0 1 0 0 0` | Right click |
//! | Pointer | `0 1 1 0 1` | Double click |
//! | Pointer | `0 1 1 1 x` | Scroll (up when pinky is extended) |
//! | Volume | `x x 0 0 1` | Set volume from thumb–index pinch width |
//! | Brightness | `x x 0 0 1` | Set brightness from the configured pinch pair |
//! | Keyboard | `x 1 0 x x` | Press the key under the index fingertip |
//!
//! Discrete actions are debounced by [`CooldownTimer`]; nothing in the
//! engine sleeps.
//!
//! ## Usage
//!
//! ```no_run
//! use std::time::Instant;
//! use hand_engine::{Engine, EngineConfig, NullActuator};
//!
//! let mut engine = Engine::new(EngineConfig::default()).unwrap();
//! let mut out = NullActuator;
//! // once per camera frame:
//! let report = engine.run_frame(None, Instant::now(), &mut out);
//! assert!(report.commands.is_empty());
//! ```

pub mod action;
pub mod actuator;
pub mod config;
pub mod cooldown;
pub mod digits;
pub mod dispatch;
pub mod distance;
pub mod engine;
pub mod landmark;
pub mod mode;

pub use action::{ActionCommand, KeySymbol, Modifier, MouseButton, ScrollDirection};
pub use actuator::{apply, Actuator, ActuatorError, NullActuator};
pub use config::{ConfigError, EngineConfig, PointerMotion};
pub use cooldown::{ActionId, CooldownTimer};
pub use digits::{classify, DigitState};
pub use distance::{Calibration, DistanceMapper, Extent, LevelReading};
pub use engine::{Engine, EngineState, FrameReport};
pub use landmark::{Handedness, LandmarkFrame, Point, Rect};
pub use mode::{Mode, ModeSelector};
