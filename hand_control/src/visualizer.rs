//! Software-rendered overlay using `minifb`.
//!
//! The window stands in for the camera image, so engine coordinates map
//! 1:1 onto pixels.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┬────────┐
//! │ VOL / BRI read-back   FPS                                │  MODE  │
//! │ ┌─┐                                                      └────────┤
//! │ │█│ level meter      [keyboard grid in Keyboard mode]             │
//! │ │█│                                                               │
//! │ └─┘                       hand skeleton + bounding box            │
//! │                                                                   │
//! │ status bar                                                        │
//! └───────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};

use anyhow::Context;
use hand_engine::landmark::{TIP_IDS, WRIST};
use hand_engine::{ActionId, Extent, LandmarkFrame, Mode, Point, Rect};
use minifb::{Key, KeyRepeat, MouseMode, Window, WindowOptions};

use crate::app::AppState;
use crate::source::SimInput;

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const WIN_W:       usize = 1250;
pub const WIN_H:       usize = 720;
const STATUS_Y:        usize = WIN_H - 40;
const METER_X:         usize = 50;
const METER_W:         usize = 35;
const BG_COLOR:        u32   = 0xFF1A1A2E;
const TEXT_BG:         u32   = 0xFF0F3460;
const KEY_COLOR:       u32   = 0xFF3A3A5A;
const HOVER_COLOR:     u32   = 0xFFAF00AF;
const REGION_COLOR:    u32   = 0xFFFFD700;
const BONE_COLOR:      u32   = 0xFF66CCFF;
const JOINT_COLOR:     u32   = 0xFFFF4466;
const BOX_COLOR:       u32   = 0xFF00FF66;
const METER_COLOR:     u32   = 0xFF3366FF;
const FLOOR_COLOR:     u32   = 0xFF00CC44;
const CEILING_COLOR:   u32   = 0xFFFF3333;
const TEXT_COLOR:      u32   = 0xFFEEEEEE;
const DIM_COLOR:       u32   = 0xFF888888;

/// Ends of the measured landmark pair and the point half-way between them.
fn pinch_marker(frame: &LandmarkFrame, pair: [usize; 2]) -> (Point, Point, Point) {
    let (a, b) = (frame.point(pair[0]), frame.point(pair[1]));
    (a, b, a.midpoint(&b))
}

/// Pairs of landmark ids connected in the skeleton drawing.
fn bones() -> impl Iterator<Item = (usize, usize)> {
    TIP_IDS.iter().flat_map(|&tip| {
        let base = tip - 3;
        [(WRIST, base), (base, base + 1), (base + 1, base + 2), (base + 2, tip)]
    })
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window:      Window,
    buf:         Vec<u32>,
    sim_tx:      Sender<SimInput>,
    /// Whether window input drives the simulated hand.
    interactive: bool,
    last_mouse:  Option<(f32, f32)>,
}

impl Visualizer {
    pub fn new(sim_tx: Sender<SimInput>, interactive: bool) -> anyhow::Result<Self> {
        let mut window = Window::new(
            "Hand Control — Gesture Overlay",
            WIN_W, WIN_H,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        ).context("failed to open overlay window")?;

        window.limit_update_rate(Some(Duration::from_millis(16))); // ~60fps

        Ok(Visualizer {
            window,
            buf: vec![BG_COLOR; WIN_W * WIN_H],
            sim_tx,
            interactive,
            last_mouse: None,
        })
    }

    /// Returns false when the window should close.
    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Poll mouse and keyboard and translate them to [`SimInput`] events.
    /// Returns false when the user asked to quit (Escape).
    pub fn poll_input(&mut self) -> bool {
        if !self.window.is_open() { return false; }
        if self.window.is_key_pressed(Key::Escape, KeyRepeat::No) { return false; }
        if !self.interactive { return true; }

        if let Some(m) = self.window.get_mouse_pos(MouseMode::Clamp) {
            if self.last_mouse != Some(m) {
                self.last_mouse = Some(m);
                let _ = self.sim_tx.send(SimInput::Pointer(Point::new(m.0, m.1)));
            }
        }

        let one_shot = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);
        let held     = |k: Key| self.window.is_key_pressed(k, KeyRepeat::Yes);

        let digit_keys = [Key::Key1, Key::Key2, Key::Key3, Key::Key4, Key::Key5];
        for (i, &k) in digit_keys.iter().enumerate() {
            if one_shot(k) {
                let _ = self.sim_tx.send(SimInput::ToggleDigit(i));
            }
        }
        if one_shot(Key::P) { let _ = self.sim_tx.send(SimInput::TogglePinch); }
        if one_shot(Key::H) { let _ = self.sim_tx.send(SimInput::ToggleVisible); }

        if held(Key::LeftBracket)  { let _ = self.sim_tx.send(SimInput::Pinch(-5.0)); }
        if held(Key::RightBracket) { let _ = self.sim_tx.send(SimInput::Pinch(5.0)); }
        if held(Key::Minus)        { let _ = self.sim_tx.send(SimInput::Scale(-0.05)); }
        if held(Key::Equal)        { let _ = self.sim_tx.send(SimInput::Scale(0.05)); }

        true
    }

    /// Render one frame.
    pub fn render(&mut self, app: &AppState) {
        self.buf.fill(BG_COLOR);
        let engine = app.engine();

        // ── Mode selector region ──────────────────────────────────────────
        let region = *engine.mode_region();
        let cooling = engine.cooldown_remaining(ActionId::ModeSwitch, Instant::now()) > Duration::ZERO;
        let region_color = if cooling { DIM_COLOR } else { REGION_COLOR };
        self.draw_rect_border(&region, region_color);
        let label_x = (region.x + 10.0).max(0.0) as usize;
        let label_y = (region.y + region.h / 2.0 - 5.0).max(0.0) as usize;
        self.draw_text(&engine.mode().name().to_uppercase(), label_x, label_y, 2, region_color);

        // ── Mode-specific panels ──────────────────────────────────────────
        match engine.mode() {
            Mode::Keyboard => self.draw_keyboard(app),
            Mode::Volume | Mode::Brightness => self.draw_meter(app),
            Mode::Pointer => {}
        }

        // ── Hand ──────────────────────────────────────────────────────────
        if let Some(frame) = app.frame() {
            self.draw_hand(frame);
            let level = &engine.config().level;
            let pair = match engine.mode() {
                Mode::Volume     => Some(level.volume_pair),
                Mode::Brightness => Some(level.brightness_pair),
                _ => None,
            };
            if let Some(pair) = pair {
                self.draw_pinch(frame, pair, engine.level_reading().map(|r| r.extent));
            }
        }

        // ── Read-back and counters ────────────────────────────────────────
        let (vol, bri) = app.levels();
        let show = |v: Option<u8>| v.map_or("--".to_string(), |p| format!("{}%", p));
        let levels = format!("VOL {}   BRI {}", show(vol), show(bri));
        self.draw_text(&levels, 10, 10, 2, TEXT_COLOR);
        self.draw_text(&format!("FPS {:.0}", app.fps()), 10, 30, 2, TEXT_COLOR);
        if let Some(d) = engine.digits() {
            self.draw_text(&format!("DIGITS {}", d), 10, 50, 2, DIM_COLOR);
        }

        // ── Status bar ────────────────────────────────────────────────────
        self.fill_rect(0, STATUS_Y, WIN_W, WIN_H - STATUS_Y, TEXT_BG);
        let caps = if engine.caps_lock() { "CAPS" } else { "caps" };
        let line = format!("{}   [{}] typed: {}", app.status, caps, app.desktop().typed_tail(30));
        self.draw_text(&line, 10, STATUS_Y + 6, 2, TEXT_COLOR);

        self.draw_label(
            "mouse=index tip  1-5=toggle finger  [ ]=pinch  p=pinch on/off  - ==size  h=hide  esc=quit",
            10, WIN_H - 10, DIM_COLOR,
        );

        self.window.update_with_buffer(&self.buf, WIN_W, WIN_H).ok();
    }

    // ── Keyboard ──────────────────────────────────────────────────────────

    fn draw_keyboard(&mut self, app: &AppState) {
        let engine = app.engine();
        let hovered = engine.hovered_key().map(|k| k.rect);
        for key in engine.keyboard().layout().keys() {
            let color = if hovered == Some(key.rect) { HOVER_COLOR } else { KEY_COLOR };
            self.fill_rect_f(&key.rect, color);
            self.draw_rect_border(&key.rect, TEXT_COLOR);

            let scale = if key.label.chars().count() == 1 { 4 } else { 2 };
            let text_w = key.label.chars().count() * 4 * scale;
            let x = key.rect.x + (key.rect.w - text_w as f32) / 2.0;
            let y = key.rect.y + (key.rect.h - 5.0 * scale as f32) / 2.0;
            if x >= 0.0 && y >= 0.0 {
                self.draw_text(&key.label, x as usize, y as usize, scale, TEXT_COLOR);
            }
        }
    }

    // ── Level meter ───────────────────────────────────────────────────────

    fn draw_meter(&mut self, app: &AppState) {
        let cal = app.engine().config().calibration;
        let top    = cal.bar_high.min(cal.bar_low).max(0.0) as usize;
        let bottom = cal.bar_high.max(cal.bar_low).max(0.0) as usize;
        self.draw_border(METER_X, top, METER_W, bottom.saturating_sub(top), METER_COLOR);

        let Some(reading) = app.engine().level_reading() else { return };
        let bar = (reading.bar.max(0.0) as usize).clamp(top, bottom);
        let color = match reading.extent {
            Extent::Floor   => FLOOR_COLOR,
            Extent::Ceiling => CEILING_COLOR,
            Extent::Within  => METER_COLOR,
        };
        self.fill_rect(METER_X, bar, METER_W, bottom - bar, color);
        self.draw_text(&format!("{}%", reading.percent), METER_X, bottom + 10, 3, color);
    }

    // ── Hand ──────────────────────────────────────────────────────────────

    fn draw_hand(&mut self, frame: &LandmarkFrame) {
        let bb = frame.bbox();
        // Padded like a detector's preview box.
        let padded = Rect::new(bb.xmin - 20.0, bb.ymin - 20.0, bb.width() + 40.0, bb.height() + 40.0);
        self.draw_rect_border(&padded, BOX_COLOR);

        for (a, b) in bones() {
            self.draw_line(frame.point(a), frame.point(b), BONE_COLOR);
        }
        for p in frame.points() {
            self.draw_dot(*p, 3, JOINT_COLOR);
        }
        self.draw_dot(frame.index_tip(), 7, HOVER_COLOR);
    }

    /// Line across the measured pair with a marker at its midpoint, green
    /// once the pinch is closed down to the floor.
    fn draw_pinch(&mut self, frame: &LandmarkFrame, pair: [usize; 2], extent: Option<Extent>) {
        let (a, b, mid) = pinch_marker(frame, pair);
        self.draw_line(a, b, HOVER_COLOR);
        self.draw_dot(a, 6, HOVER_COLOR);
        self.draw_dot(b, 6, HOVER_COLOR);
        let color = if extent == Some(Extent::Floor) { FLOOR_COLOR } else { HOVER_COLOR };
        self.draw_dot(mid, 8, color);
    }

    // ── Primitive drawing helpers ─────────────────────────────────────────

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y+h).min(WIN_H) {
            for col in x..(x+w).min(WIN_W) {
                self.buf[row * WIN_W + col] = color;
            }
        }
    }

    fn draw_border(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        if w == 0 || h == 0 { return; }
        for col in x..(x+w).min(WIN_W) {
            self.set_pixel(col, y, color);
            self.set_pixel(col, y + h - 1, color);
        }
        for row in y..(y+h).min(WIN_H) {
            self.set_pixel(x, row, color);
            self.set_pixel(x + w - 1, row, color);
        }
    }

    /// Clip a float rectangle to the window as (x, y, w, h).
    fn clip(r: &Rect) -> Option<(usize, usize, usize, usize)> {
        let x0 = r.x.max(0.0);
        let y0 = r.y.max(0.0);
        let x1 = (r.x + r.w).min(WIN_W as f32);
        let y1 = (r.y + r.h).min(WIN_H as f32);
        if x1 <= x0 || y1 <= y0 { return None; }
        Some((x0 as usize, y0 as usize, (x1 - x0) as usize, (y1 - y0) as usize))
    }

    fn fill_rect_f(&mut self, r: &Rect, color: u32) {
        if let Some((x, y, w, h)) = Self::clip(r) {
            self.fill_rect(x, y, w, h, color);
        }
    }

    fn draw_rect_border(&mut self, r: &Rect, color: u32) {
        if let Some((x, y, w, h)) = Self::clip(r) {
            self.draw_border(x, y, w, h, color);
        }
    }

    fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x < WIN_W && y < WIN_H {
            self.buf[y * WIN_W + x] = color;
        }
    }

    fn set_pixel_i(&mut self, x: isize, y: isize, color: u32) {
        if x >= 0 && y >= 0 {
            self.set_pixel(x as usize, y as usize, color);
        }
    }

    fn draw_dot(&mut self, c: Point, r: isize, color: u32) {
        let (cx, cy) = (c.x as isize, c.y as isize);
        for dy in -r..=r {
            for dx in -r..=r {
                if dx * dx + dy * dy <= r * r {
                    self.set_pixel_i(cx + dx, cy + dy, color);
                }
            }
        }
    }

    /// Bresenham line between two points.
    fn draw_line(&mut self, a: Point, b: Point, color: u32) {
        let (mut x, mut y) = (a.x as isize, a.y as isize);
        let (x1, y1) = (b.x as isize, b.y as isize);
        let dx = (x1 - x).abs();
        let dy = -(y1 - y).abs();
        let sx = if x < x1 { 1 } else { -1 };
        let sy = if y < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.set_pixel_i(x, y, color);
            if x == x1 && y == y1 { break; }
            let e2 = 2 * err;
            if e2 >= dy { err += dy; x += sx; }
            if e2 <= dx { err += dx; y += sy; }
        }
    }

    fn draw_label(&mut self, text: &str, x: usize, y: usize, color: u32) {
        self.draw_text(text, x, y, 1, color);
    }

    /// Minimal bitmap font: 3×5 glyphs, each pixel drawn `scale`×`scale`.
    fn draw_text(&mut self, text: &str, x: usize, y: usize, scale: usize, color: u32) {
        let mut cx = x;
        for ch in text.chars() {
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        self.fill_rect(cx + col * scale, y + row * scale, scale, scale, color);
                    }
                }
            }
            cx += 4 * scale; // 3 wide + 1 gap
            if cx + 4 * scale > WIN_W { break; }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        ';' => [0b000, 0b010, 0b000, 0b010, 0b100],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '<' => [0b001, 0b010, 0b100, 0b010, 0b001],
        '>' => [0b100, 0b010, 0b001, 0b010, 0b100],
        '[' => [0b110, 0b100, 0b100, 0b100, 0b110],
        ']' => [0b011, 0b001, 0b001, 0b001, 0b011],
        '(' => [0b010, 0b100, 0b100, 0b100, 0b010],
        ')' => [0b010, 0b001, 0b001, 0b001, 0b010],
        '%' => [0b101, 0b001, 0b010, 0b100, 0b101],
        '|' => [0b010, 0b010, 0b010, 0b010, 0b010],
        '"' => [0b101, 0b101, 0b000, 0b000, 0b000],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skeleton_covers_every_landmark() {
        let mut seen = [false; hand_engine::landmark::LANDMARK_COUNT];
        for (a, b) in bones() {
            seen[a] = true;
            seen[b] = true;
        }
        assert!(seen.iter().all(|&s| s));
        assert_eq!(bones().count(), 20);
    }

    #[test]
    fn pinch_marker_sits_between_thumb_and_index() {
        use hand_engine::landmark::{INDEX_TIP, LANDMARK_COUNT, THUMB_TIP};
        use hand_engine::Handedness;

        let mut p = [Point::new(500.0, 500.0); LANDMARK_COUNT];
        p[THUMB_TIP] = Point::new(400.0, 300.0);
        p[INDEX_TIP] = Point::new(480.0, 240.0);
        let frame = LandmarkFrame::from_array(p, Handedness::Right);

        let (a, b, mid) = pinch_marker(&frame, [THUMB_TIP, INDEX_TIP]);
        assert_eq!((a, b), (p[THUMB_TIP], p[INDEX_TIP]));
        assert_eq!(mid, Point::new(440.0, 270.0));
    }

    #[test]
    fn keyboard_labels_have_glyphs() {
        let cfg = hand_engine::EngineConfig::default().keyboard;
        let fallback = char_glyph('\u{1}');
        for label in cfg.lower.iter().chain(cfg.upper.iter()).flatten() {
            for c in label.chars() {
                assert_ne!(char_glyph(c), fallback, "no glyph for {:?}", c);
            }
        }
    }
}
