//! Virtual keyboard: fixed grid of buttons hit-tested against the index tip.
//!
//! Two layouts share one geometry; the caps flag picks which one is live.
//! A key fires when the index tip is over it with index up and middle down,
//! gated by the shared key-press cooldown so a lingering fingertip does not
//! auto-repeat.

use std::time::{Duration, Instant};

use log::debug;

use crate::action::{ActionCommand, KeySymbol};
use crate::config::{ConfigError, CooldownConfig, KeyboardConfig};
use crate::cooldown::{ActionId, CooldownTimer};
use crate::digits::DigitState;
use crate::landmark::{LandmarkFrame, Point, Rect};

// ════════════════════════════════════════════════════════════════════════════
// Keys
// ════════════════════════════════════════════════════════════════════════════

/// What a button does when fired.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    Symbol(KeySymbol),
    CapsLock,
}

impl KeyAction {
    /// Interpret a layout label: one character, or `SPC`, `<--`, `ENT`, `CAP`.
    pub fn parse(label: &str) -> Option<KeyAction> {
        let action = match label {
            "SPC" => KeyAction::Symbol(KeySymbol::Space),
            "<--" => KeyAction::Symbol(KeySymbol::Backspace),
            "ENT" => KeyAction::Symbol(KeySymbol::Enter),
            "CAP" => KeyAction::CapsLock,
            _ => {
                let mut chars = label.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => KeyAction::Symbol(KeySymbol::Char(c)),
                    _ => return None,
                }
            }
        };
        Some(action)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct KeyButton {
    pub label:  String,
    pub rect:   Rect,
    pub action: KeyAction,
}

// ════════════════════════════════════════════════════════════════════════════
// KeyboardLayout
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct KeyboardLayout {
    keys: Vec<KeyButton>,
}

impl KeyboardLayout {
    /// Lay out the lower (`caps = false`) or upper case grid.
    pub fn build(cfg: &KeyboardConfig, caps: bool) -> Result<Self, ConfigError> {
        let rows = if caps { &cfg.upper } else { &cfg.lower };
        let mut keys = Vec::new();
        for (i, row) in rows.iter().enumerate() {
            for (j, label) in row.iter().enumerate() {
                let action = KeyAction::parse(label)
                    .ok_or_else(|| ConfigError::UnknownKey(label.clone()))?;
                let origin = Point::new(
                    cfg.origin.x + j as f32 * cfg.pitch.x,
                    cfg.origin.y + i as f32 * cfg.pitch.y,
                );
                keys.push(KeyButton {
                    label: label.clone(),
                    rect:  Rect::new(origin.x, origin.y, cfg.key_size.w, cfg.key_size.h),
                    action,
                });
            }
        }
        if keys.is_empty() {
            return Err(ConfigError::EmptyLayout);
        }
        Ok(KeyboardLayout { keys })
    }

    pub fn keys(&self) -> &[KeyButton] { &self.keys }

    /// First button whose rectangle contains `p`.
    pub fn hit_test(&self, p: Point) -> Option<&KeyButton> {
        self.keys.iter().find(|k| k.rect.contains(p))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// KeyboardDispatcher
// ════════════════════════════════════════════════════════════════════════════

pub struct KeyboardDispatcher {
    lower:     KeyboardLayout,
    upper:     KeyboardLayout,
    caps_lock: bool,
    key_cooldown:  Duration,
    caps_cooldown: Duration,
}

impl KeyboardDispatcher {
    pub fn new(cfg: &KeyboardConfig, cooldowns: &CooldownConfig) -> Result<Self, ConfigError> {
        Ok(KeyboardDispatcher {
            lower:         KeyboardLayout::build(cfg, false)?,
            upper:         KeyboardLayout::build(cfg, true)?,
            caps_lock:     false,
            key_cooldown:  cooldowns.duration(ActionId::KeyPress),
            caps_cooldown: cooldowns.duration(ActionId::CapsToggle),
        })
    }

    pub fn caps_lock(&self) -> bool { self.caps_lock }

    /// Layout currently in effect.
    pub fn layout(&self) -> &KeyboardLayout {
        if self.caps_lock { &self.upper } else { &self.lower }
    }

    /// Button under the index fingertip, if any.
    pub fn hovered(&self, frame: &LandmarkFrame) -> Option<&KeyButton> {
        self.layout().hit_test(frame.index_tip())
    }

    pub fn dispatch(
        &mut self,
        frame:  &LandmarkFrame,
        digits: DigitState,
        now:    Instant,
        timer:  &mut CooldownTimer,
    ) -> Option<ActionCommand> {
        if !(digits.index() && !digits.middle()) {
            return None;
        }
        let action = self.hovered(frame)?.action;

        match action {
            KeyAction::CapsLock => {
                if !(timer.ready(ActionId::KeyPress, now) && timer.ready(ActionId::CapsToggle, now)) {
                    debug!("caps toggle suppressed by cooldown");
                    return None;
                }
                timer.arm(ActionId::KeyPress, now, self.key_cooldown);
                timer.arm(ActionId::CapsToggle, now, self.caps_cooldown);
                self.caps_lock = !self.caps_lock;
                Some(ActionCommand::ToggleCapsLock)
            }
            KeyAction::Symbol(sym) => {
                if !timer.try_fire(ActionId::KeyPress, now, self.key_cooldown) {
                    debug!("key {} suppressed by cooldown", sym);
                    return None;
                }
                Some(ActionCommand::KeyPress(sym))
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
