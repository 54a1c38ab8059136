//! Hand sources: simulation, recorded replay, and LeapMotion hardware.
//!
//! Every source runs on its own thread and delivers one
//! `Option<LandmarkFrame>` per camera frame (`None` = no hand seen).  The
//! channel holds a single frame.  Live sources drop a new frame when the
//! engine has not taken the previous one yet; a replay waits instead, so a
//! recording always plays back whole.

use std::fs;
use std::path::Path;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TrySendError};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use hand_engine::{Handedness, LandmarkFrame, Point};
use log::{debug, info, warn};
use serde::Deserialize;

use crate::sim::SimPose;

// ════════════════════════════════════════════════════════════════════════════
// HandSource trait
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver landmark frames over a channel.
pub trait HandSource: Send + 'static {
    fn run(self: Box<Self>, tx: SyncSender<Option<LandmarkFrame>>);
}

/// Spawn a hand source on its own thread and return the receiving end.
pub fn spawn_hand_source<S: HandSource>(source: S) -> Receiver<Option<LandmarkFrame>> {
    let (tx, rx) = mpsc::sync_channel(1);
    thread::spawn(move || Box::new(source).run(tx));
    rx
}

/// Hand `frame` to the consumer, dropping it if the slot is still full.
///
/// Returns `false` once the consumer has gone away.
pub fn offer(tx: &SyncSender<Option<LandmarkFrame>>, frame: Option<LandmarkFrame>) -> bool {
    match tx.try_send(frame) {
        Ok(()) => true,
        Err(TrySendError::Full(_)) => {
            debug!("engine busy, frame dropped");
            true
        }
        Err(TrySendError::Disconnected(_)) => false,
    }
}

fn frame_interval(fps: f32) -> Duration {
    Duration::from_secs_f32(1.0 / fps.clamp(1.0, 240.0))
}

// ════════════════════════════════════════════════════════════════════════════
// SimHandSource: mouse + keyboard driven synthetic hand
// ════════════════════════════════════════════════════════════════════════════

/// Raw input event from the overlay window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SimInput {
    /// Mouse moved; the index fingertip follows it.
    Pointer(Point),
    /// Keys 1–5: flip thumb … pinky.
    ToggleDigit(usize),
    /// `[` / `]`: narrow or widen the thumb–index pinch.
    Pinch(f32),
    /// `P`: switch between a free thumb and a pinch-controlled one.
    TogglePinch,
    /// `-` / `=`: shrink or grow the hand.
    Scale(f32),
    /// `H`: hide or show the hand.
    ToggleVisible,
}

/// Synthesizes a frame at a fixed camera rate from the current [`SimPose`],
/// updated by [`SimInput`] events from the window.
pub struct SimHandSource {
    rx:       Receiver<SimInput>,
    pose:     SimPose,
    interval: Duration,
}

const PINCH_START: f32 = 115.0;

impl SimHandSource {
    pub fn new(rx: Receiver<SimInput>, fps: f32) -> Self {
        SimHandSource { rx, pose: SimPose::default(), interval: frame_interval(fps) }
    }
}

/// Fold one input event into the pose.
pub fn apply_input(pose: &mut SimPose, input: SimInput) {
    match input {
        SimInput::Pointer(p)     => pose.tip = p,
        SimInput::ToggleDigit(i) => pose.toggle(i),
        SimInput::Pinch(delta)   => {
            let w = pose.pinch.unwrap_or(PINCH_START);
            pose.pinch = Some((w + delta).max(0.0));
        }
        SimInput::TogglePinch    => {
            pose.pinch = match pose.pinch {
                Some(_) => None,
                None    => Some(PINCH_START),
            };
        }
        SimInput::Scale(delta)   => pose.scale = (pose.scale + delta).clamp(0.3, 4.0),
        SimInput::ToggleVisible  => pose.visible = !pose.visible,
    }
}

impl HandSource for SimHandSource {
    fn run(self: Box<Self>, tx: SyncSender<Option<LandmarkFrame>>) {
        let SimHandSource { rx, mut pose, interval } = *self;
        let mut next = Instant::now();
        loop {
            let wait = next.saturating_duration_since(Instant::now());
            match rx.recv_timeout(wait) {
                Ok(input) => {
                    apply_input(&mut pose, input);
                    continue;
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => return,
            }
            next += interval;
            if !offer(&tx, pose.frame()) {
                return;
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ReplayHandSource: JSON-lines recording
// ════════════════════════════════════════════════════════════════════════════

/// One recorded line: `{"points": [[x, y], …], "handedness": "right"}`.
#[derive(Debug, Deserialize)]
struct RecordedFrame {
    points:     Vec<[f32; 2]>,
    #[serde(default)]
    handedness: Handedness,
}

/// Parse one recording line.  `null` is a frame with no hand; a hand with
/// the wrong number of points counts as no hand too.
pub fn parse_line(line: &str) -> Result<Option<LandmarkFrame>, serde_json::Error> {
    let rec: Option<RecordedFrame> = serde_json::from_str(line)?;
    Ok(rec.and_then(|r| {
        let n = r.points.len();
        let points = r.points.into_iter().map(|[x, y]| Point::new(x, y)).collect();
        let frame = LandmarkFrame::new(points, r.handedness);
        if frame.is_none() {
            warn!("recorded hand has {} landmarks, treating as no hand", n);
        }
        frame
    }))
}

/// Plays back a recording at a fixed rate, then ends.
pub struct ReplayHandSource {
    lines:    Vec<String>,
    interval: Duration,
}

impl ReplayHandSource {
    pub fn open(path: &Path, fps: f32) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read recording {}", path.display()))?;
        Ok(Self::from_text(&text, fps))
    }

    pub fn from_text(text: &str, fps: f32) -> Self {
        ReplayHandSource {
            lines:    text.lines().map(str::to_string).collect(),
            interval: frame_interval(fps),
        }
    }

    /// All frames in the recording, skipping malformed lines.
    pub fn frames(&self) -> Vec<Option<LandmarkFrame>> {
        self.lines
            .iter()
            .enumerate()
            .filter(|(_, l)| !l.trim().is_empty())
            .filter_map(|(i, l)| match parse_line(l) {
                Ok(f)  => Some(f),
                Err(e) => {
                    warn!("recording line {}: {}", i + 1, e);
                    None
                }
            })
            .collect()
    }
}

impl HandSource for ReplayHandSource {
    fn run(self: Box<Self>, tx: SyncSender<Option<LandmarkFrame>>) {
        let frames = self.frames();
        info!("replaying {} frames", frames.len());
        for frame in frames {
            if tx.send(frame).is_err() {
                return;
            }
            thread::sleep(self.interval);
        }
        info!("replay finished");
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LeapHandSource: real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Hand source backed by a LeapMotion controller.
///
/// Requires the `leap` feature flag and the LeapC shared library installed.
/// Joint positions are millimetres above the device; they are projected
/// onto a virtual camera image so the engine's pixel thresholds apply:
/// x grows to the right of the device, y grows downward from `TOP_MM`.
#[cfg(feature = "leap")]
pub struct LeapHandSource {
    pub camera: hand_engine::config::Size,
}

#[cfg(feature = "leap")]
impl HandSource for LeapHandSource {
    fn run(self: Box<Self>, tx: SyncSender<Option<LandmarkFrame>>) {
        use leaprs::*;

        const PX_PER_MM: f32 = 2.5;
        const TOP_MM:    f32 = 450.0;

        let mut connection = match Connection::create(ConnectionConfig::default()) {
            Ok(c)  => c,
            Err(e) => {
                log::error!("failed to create LeapC connection: {:?}", e);
                return;
            }
        };
        if let Err(e) = connection.open() {
            log::error!("failed to open LeapMotion device: {:?}", e);
            return;
        }
        info!("LeapMotion connected");

        let cx = self.camera.w / 2.0;
        macro_rules! px {
            ($joint:expr) => {{
                let v = $joint;
                Point::new(cx + v.x * PX_PER_MM, (TOP_MM - v.y) * PX_PER_MM)
            }};
        }

        loop {
            let msg = match connection.poll(100) {
                Ok(m)  => m,
                Err(_) => continue,
            };
            let Event::Tracking(frame) = msg.event() else { continue };

            let landmarks = frame.hands().next().and_then(|h| {
                let digits: Vec<_> = h.digits().collect();
                if digits.len() < 5 { return None; }

                // Wrist: centroid of the four finger metacarpal bases.
                let (mut wx, mut wy) = (0.0, 0.0);
                for d in &digits[1..] {
                    let p = px!(d.metacarpal().prev_joint());
                    wx += p.x / 4.0;
                    wy += p.y / 4.0;
                }

                let mut pts = Vec::with_capacity(21);
                pts.push(Point::new(wx, wy));
                for d in &digits {
                    pts.push(px!(d.proximal().prev_joint()));
                    pts.push(px!(d.intermediate().prev_joint()));
                    pts.push(px!(d.distal().prev_joint()));
                    pts.push(px!(d.distal().next_joint()));
                }
                let handedness = if h.hand_type() == HandType::Left {
                    Handedness::Left
                } else {
                    Handedness::Right
                };
                LandmarkFrame::new(pts, handedness)
            });

            if !offer(&tx, landmarks) {
                return;
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
