//! Pointer motion, clicks and scrolling (Pointer mode only).
//!
//! | Digits (T I M R P) | Action |
//! |---|---|
//! | `0 1 1 0 0` | move |
//! | `0 0 1 0 0` | left click |
//! | `0 1 0 0 0` | right click |
//! | `0 1 1 0 1` | double click |
//! | `0 1 1 1 1` | scroll up |
//! | `0 1 1 1 0` | scroll down |
//!
//! Nudge motion is deliberately not proportional: each axis either stays
//! still (displacement inside the dead zone) or jumps a fixed step, which
//! keeps landmark jitter from wandering the cursor.

use std::time::{Duration, Instant};

use log::debug;

use crate::action::{ActionCommand, MouseButton, ScrollDirection};
use crate::config::{CooldownConfig, PointerConfig, PointerMotion};
use crate::cooldown::{ActionId, CooldownTimer};
use crate::digits::{DigitState, Pattern, Slot::{Any, Down, Up}};
use crate::landmark::{LandmarkFrame, Point};

const MOVE:         Pattern = [Down, Up,   Up,   Down, Down];
const LEFT_CLICK:   Pattern = [Down, Down, Up,   Down, Down];
const RIGHT_CLICK:  Pattern = [Down, Up,   Down, Down, Down];
const DOUBLE_CLICK: Pattern = [Down, Up,   Up,   Down, Up  ];
const SCROLL:       Pattern = [Down, Up,   Up,   Up,   Any ];

pub struct PointerDispatcher {
    cfg:       PointerConfig,
    cooldowns: CooldownConfig,
    /// Raw index tip of the latest frame with a hand, in any mode.
    previous:  Option<Point>,
    /// The observation before `previous`; motion is measured against it.
    before:    Option<Point>,
    /// Last emitted absolute position in smoothed mode.
    smoothed:  Option<Point>,
}

impl PointerDispatcher {
    pub fn new(cfg: PointerConfig, cooldowns: CooldownConfig) -> Self {
        PointerDispatcher { cfg, cooldowns, previous: None, before: None, smoothed: None }
    }

    pub fn previous_cursor_position(&self) -> Option<Point> { self.previous }

    /// Record the raw index tip.  Called on every frame that has a hand,
    /// whatever the mode, so motion never measures against a stale point.
    pub fn observe(&mut self, tip: Point) {
        self.before = self.previous.replace(tip);
    }

    /// Act on the frame last passed to [`observe`](Self::observe).
    pub fn dispatch(
        &mut self,
        frame:  &LandmarkFrame,
        digits: DigitState,
        now:    Instant,
        timer:  &mut CooldownTimer,
    ) -> Option<ActionCommand> {
        let tip  = frame.index_tip();
        let prev = self.before;

        if digits.matches(&MOVE) {
            return match self.cfg.motion {
                PointerMotion::Nudge    => self.nudge(tip, prev?),
                PointerMotion::Smoothed => Some(self.smooth(tip)),
            };
        }

        if digits.matches(&LEFT_CLICK) {
            return self.fire(ActionId::LeftClick, now, timer, ActionCommand::Click(MouseButton::Left));
        }
        if digits.matches(&RIGHT_CLICK) {
            return self.fire(ActionId::RightClick, now, timer, ActionCommand::Click(MouseButton::Right));
        }
        if digits.matches(&DOUBLE_CLICK) {
            return self.fire(ActionId::DoubleClick, now, timer, ActionCommand::DoubleClick);
        }

        if digits.matches(&SCROLL) {
            let dir = if digits.pinky() { ScrollDirection::Up } else { ScrollDirection::Down };
            return self.fire(ActionId::Scroll, now, timer, ActionCommand::Scroll(dir));
        }

        None
    }

    fn fire(
        &self,
        id:      ActionId,
        now:     Instant,
        timer:   &mut CooldownTimer,
        command: ActionCommand,
    ) -> Option<ActionCommand> {
        let cooldown: Duration = self.cooldowns.duration(id);
        if timer.try_fire(id, now, cooldown) {
            Some(command)
        } else {
            debug!("{} suppressed by cooldown", command);
            None
        }
    }

    // ── motion strategies ─────────────────────────────────────────────────

    fn nudge(&self, tip: Point, prev: Point) -> Option<ActionCommand> {
        let step = self.cfg.nudge_step;
        let flip = |invert: bool| if invert { -1 } else { 1 };

        let dx = dead_zone_sign(tip.x - prev.x, self.cfg.dead_zone) * step * flip(self.cfg.invert_x);
        let dy = dead_zone_sign(tip.y - prev.y, self.cfg.dead_zone) * step * flip(self.cfg.invert_y);

        if dx == 0 && dy == 0 {
            return None;
        }
        Some(ActionCommand::MoveCursorBy(dx, dy))
    }

    fn smooth(&mut self, tip: Point) -> ActionCommand {
        let PointerConfig { frame_reduction: fr, smoothening, camera, screen, .. } = self.cfg;

        let mut target = Point::new(
            interp(tip.x, fr, camera.w - fr, 0.0, screen.w),
            interp(tip.y, fr, camera.h - fr, 0.0, screen.h),
        );
        if self.cfg.invert_x { target.x = screen.w - target.x; }
        if self.cfg.invert_y { target.y = screen.h - target.y; }

        let p = self.smoothed.unwrap_or(target);
        let c = Point::new(
            p.x + (target.x - p.x) / smoothening,
            p.y + (target.y - p.y) / smoothening,
        );
        self.smoothed = Some(c);
        ActionCommand::MoveCursorTo(c.x.round() as i32, c.y.round() as i32)
    }
}

/// −1, 0 or +1: zero unless `delta` strictly exceeds the dead zone.
fn dead_zone_sign(delta: f32, dead_zone: f32) -> i32 {
    if delta > dead_zone {
        1
    } else if delta < -dead_zone {
        -1
    } else {
        0
    }
}

/// Clamped linear interpolation (degenerate input ranges map to `y0`).
fn interp(x: f32, x0: f32, x1: f32, y0: f32, y1: f32) -> f32 {
    if x1 <= x0 || x <= x0 { return y0; }
    if x >= x1 { return y1; }
    y0 + (x - x0) * (y1 - y0) / (x1 - x0)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
