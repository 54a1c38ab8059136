//! Engine configuration.
//!
//! Loaded once at startup.  Every section derives serde with
//! `#[serde(default)]`, so a JSON file only needs the values it overrides:
//!
//! ```json
//! { "initial_mode": "volume", "calibration": { "d_max": 220 } }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cooldown::ActionId;
use crate::dispatch::keyboard::KeyboardLayout;
use crate::distance::Calibration;
use crate::landmark::{Point, Rect, INDEX_TIP, LANDMARK_COUNT, THUMB_TIP};
use crate::mode::Mode;

// ════════════════════════════════════════════════════════════════════════════
// ConfigError
// ════════════════════════════════════════════════════════════════════════════

/// Fatal configuration problems; the engine refuses to start on any of them.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io { path: String, #[source] source: std::io::Error },

    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("calibration interval [{d_min}, {d_max}] is empty or not finite")]
    Calibration { d_min: f32, d_max: f32 },

    #[error("smoothing step {0} must be between 1 and 100 and divide 100")]
    SmoothingStep(u8),

    #[error("plausibility window ({min}, {max}) is empty")]
    AreaWindow { min: i64, max: i64 },

    #[error("{0} has zero size")]
    EmptyRect(&'static str),

    #[error("pointer smoothening {0} must be >= 1")]
    Smoothening(f32),

    #[error("keyboard layout is empty")]
    EmptyLayout,

    #[error("lower and upper keyboard layouts differ in shape")]
    LayoutMismatch,

    #[error("unknown keyboard key label {0:?}")]
    UnknownKey(String),

    #[error("landmark id {0} is out of range (0–20)")]
    LandmarkId(usize),
}

// ════════════════════════════════════════════════════════════════════════════
// Sections
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub w: f32,
    pub h: f32,
}

/// Per-action cooldowns in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CooldownConfig {
    pub mode_switch_ms:     u64,
    pub left_click_ms:      u64,
    pub right_click_ms:     u64,
    pub double_click_ms:    u64,
    pub key_press_ms:       u64,
    pub caps_toggle_ms:     u64,
    /// Minimum spacing of scroll events; 0 emits one per frame.
    pub scroll_interval_ms: u64,
}

impl Default for CooldownConfig {
    fn default() -> Self {
        CooldownConfig {
            mode_switch_ms:     500,
            left_click_ms:      300,
            right_click_ms:     300,
            double_click_ms:    300,
            key_press_ms:       300,
            caps_toggle_ms:     300,
            scroll_interval_ms: 33,
        }
    }
}

impl CooldownConfig {
    pub fn duration(&self, id: ActionId) -> Duration {
        let ms = match id {
            ActionId::ModeSwitch  => self.mode_switch_ms,
            ActionId::LeftClick   => self.left_click_ms,
            ActionId::RightClick  => self.right_click_ms,
            ActionId::DoubleClick => self.double_click_ms,
            ActionId::KeyPress    => self.key_press_ms,
            ActionId::CapsToggle  => self.caps_toggle_ms,
            ActionId::Scroll      => self.scroll_interval_ms,
        };
        Duration::from_millis(ms)
    }
}

/// How the pointer follows the index fingertip.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerMotion {
    /// Fixed-size relative nudges past a dead zone.
    #[default]
    Nudge,
    /// Absolute camera → screen mapping with exponential smoothing.
    Smoothed,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointerConfig {
    pub motion:          PointerMotion,
    /// Per-axis displacement (px) that must be exceeded before a nudge.
    pub dead_zone:       f32,
    /// Nudge size in screen pixels.
    pub nudge_step:      i32,
    /// Negate horizontal nudges (mirrored front camera).
    pub invert_x:        bool,
    pub invert_y:        bool,
    /// Wheel units per scroll event.
    pub scroll_amount:   i32,
    /// Camera border (px) excluded from the smoothed mapping.
    pub frame_reduction: f32,
    /// Smoothed motion moves 1/smoothening of the way each frame.
    pub smoothening:     f32,
    pub camera:          Size,
    pub screen:          Size,
}

impl Default for PointerConfig {
    fn default() -> Self {
        PointerConfig {
            motion:          PointerMotion::Nudge,
            dead_zone:       10.0,
            nudge_step:      50,
            invert_x:        true,
            invert_y:        false,
            scroll_amount:   120,
            frame_reduction: 100.0,
            smoothening:     7.0,
            camera:          Size { w: 1250.0, h: 720.0 },
            screen:          Size { w: 1920.0, h: 1080.0 },
        }
    }
}

/// Hand-size plausibility window over [`BoundingBox::area_score`]; both
/// bounds exclusive.
///
/// [`BoundingBox::area_score`]: crate::landmark::BoundingBox::area_score
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaWindow {
    pub min: i64,
    pub max: i64,
}

impl AreaWindow {
    pub fn contains(&self, score: i64) -> bool { self.min < score && score < self.max }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    pub area_window:     AreaWindow,
    /// Landmarks whose separation sets the volume.
    pub volume_pair:     [usize; 2],
    /// Landmarks whose separation sets the brightness.
    pub brightness_pair: [usize; 2],
}

impl Default for LevelConfig {
    fn default() -> Self {
        LevelConfig {
            area_window:     AreaWindow { min: 150, max: 1000 },
            volume_pair:     [THUMB_TIP, INDEX_TIP],
            brightness_pair: [THUMB_TIP, INDEX_TIP],
        }
    }
}

/// Virtual keyboard grid.  Key (row i, column j) has its top-left corner at
/// `origin + (j * pitch.x, i * pitch.y)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyboardConfig {
    pub origin:   Point,
    pub key_size: Size,
    pub pitch:    Point,
    pub lower:    Vec<Vec<String>>,
    pub upper:    Vec<Vec<String>>,
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        let upper = rows(&[
            "Q W E R T Y U I O P",
            "A S D F G H J K L ;",
            "Z X C V B N M , . /",
            "CAP SPC <-- ENT",
        ]);
        let lower = rows(&[
            "q w e r t y u i o p",
            "a s d f g h j k l ;",
            "z x c v b n m , . /",
            "CAP SPC <-- ENT",
        ]);
        KeyboardConfig {
            origin:   Point::new(50.0, 50.0),
            key_size: Size { w: 85.0, h: 85.0 },
            pitch:    Point::new(100.0, 100.0),
            lower,
            upper,
        }
    }
}

fn rows(lines: &[&str]) -> Vec<Vec<String>> {
    lines.iter().map(|l| l.split_whitespace().map(str::to_string).collect()).collect()
}

// ════════════════════════════════════════════════════════════════════════════
// EngineConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub initial_mode:  Mode,
    pub calibration:   Calibration,
    pub cooldowns:     CooldownConfig,
    /// Dwell region that advances the mode.
    pub mode_selector: Rect,
    pub pointer:       PointerConfig,
    pub level:         LevelConfig,
    pub keyboard:      KeyboardConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            initial_mode:  Mode::Pointer,
            calibration:   Calibration::default(),
            cooldowns:     CooldownConfig::default(),
            mode_selector: Rect::new(1050.0, 20.0, 150.0, 100.0),
            pointer:       PointerConfig::default(),
            level:         LevelConfig::default(),
            keyboard:      KeyboardConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let cfg: EngineConfig = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse and validate a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject anything the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let Calibration { d_min, d_max, smoothing_step, .. } = self.calibration;
        if !(d_min.is_finite() && d_max.is_finite() && d_min < d_max) {
            return Err(ConfigError::Calibration { d_min, d_max });
        }
        if smoothing_step == 0 || smoothing_step > 100 || 100 % smoothing_step != 0 {
            return Err(ConfigError::SmoothingStep(smoothing_step));
        }

        let AreaWindow { min, max } = self.level.area_window;
        if min >= max {
            return Err(ConfigError::AreaWindow { min, max });
        }
        for id in self.level.volume_pair.iter().chain(self.level.brightness_pair.iter()) {
            if *id >= LANDMARK_COUNT {
                return Err(ConfigError::LandmarkId(*id));
            }
        }

        if self.mode_selector.is_empty() {
            return Err(ConfigError::EmptyRect("mode selector region"));
        }
        if !(self.pointer.smoothening >= 1.0) {
            return Err(ConfigError::Smoothening(self.pointer.smoothening));
        }

        let kb = &self.keyboard;
        if !(kb.key_size.w > 0.0 && kb.key_size.h > 0.0) {
            return Err(ConfigError::EmptyRect("keyboard key"));
        }
        let shape = |layout: &Vec<Vec<String>>| layout.iter().map(Vec::len).collect::<Vec<_>>();
        if shape(&kb.lower) != shape(&kb.upper) {
            return Err(ConfigError::LayoutMismatch);
        }
        KeyboardLayout::build(kb, false)?;
        KeyboardLayout::build(kb, true)?;
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        EngineConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_json_overrides_only_named_fields() {
        let cfg = EngineConfig::from_json_str(
            r#"{ "initial_mode": "volume", "calibration": { "d_max": 220 },
                 "cooldowns": { "left_click_ms": 150 } }"#,
        ).unwrap();
        assert_eq!(cfg.initial_mode, Mode::Volume);
        assert_eq!(cfg.calibration.d_max, 220.0);
        assert_eq!(cfg.calibration.d_min, 50.0);
        assert_eq!(cfg.cooldowns.duration(ActionId::LeftClick), Duration::from_millis(150));
        assert_eq!(cfg.cooldowns.duration(ActionId::ModeSwitch), Duration::from_millis(500));
    }

    #[test]
    fn round_trips_through_pretty_json() {
        let cfg = EngineConfig::default();
        let back = EngineConfig::from_json_str(&cfg.to_json_pretty().unwrap()).unwrap();
        assert_eq!(cfg, back);
    }

    #[test]
    fn inverted_calibration_is_fatal() {
        let err = EngineConfig::from_json_str(r#"{ "calibration": { "d_min": 180, "d_max": 50 } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Calibration { .. }));
        let err = EngineConfig::from_json_str(r#"{ "calibration": { "d_min": 90, "d_max": 90 } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Calibration { .. }));
    }

    #[test]
    fn step_must_divide_100() {
        for step in [0u8, 30, 101] {
            let mut cfg = EngineConfig::default();
            cfg.calibration.smoothing_step = step;
            assert!(matches!(cfg.validate(), Err(ConfigError::SmoothingStep(s)) if s == step));
        }
    }

    #[test]
    fn empty_keyboard_is_fatal() {
        let mut cfg = EngineConfig::default();
        cfg.keyboard.lower.clear();
        cfg.keyboard.upper.clear();
        assert!(matches!(cfg.validate(), Err(ConfigError::EmptyLayout)));
    }

    #[test]
    fn mismatched_layouts_are_fatal() {
        let mut cfg = EngineConfig::default();
        cfg.keyboard.upper[0].pop();
        assert!(matches!(cfg.validate(), Err(ConfigError::LayoutMismatch)));
    }

    #[test]
    fn unknown_multi_char_label_is_fatal() {
        let mut cfg = EngineConfig::default();
        cfg.keyboard.lower[3][0] = "TAB".into();
        cfg.keyboard.upper[3][0] = "TAB".into();
        assert!(matches!(cfg.validate(), Err(ConfigError::UnknownKey(k)) if k == "TAB"));
    }

    #[test]
    fn area_window_and_landmark_ids_checked() {
        let mut cfg = EngineConfig::default();
        cfg.level.area_window = AreaWindow { min: 500, max: 500 };
        assert!(matches!(cfg.validate(), Err(ConfigError::AreaWindow { .. })));

        let mut cfg = EngineConfig::default();
        cfg.level.brightness_pair = [4, 21];
        assert!(matches!(cfg.validate(), Err(ConfigError::LandmarkId(21))));
    }

    #[test]
    fn area_window_is_exclusive() {
        let w = AreaWindow { min: 150, max: 1000 };
        assert!(!w.contains(150));
        assert!(w.contains(151));
        assert!(w.contains(300));
        assert!(!w.contains(1000));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = EngineConfig::load("/nonexistent/hand_engine.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/hand_engine.json"));
    }
}
