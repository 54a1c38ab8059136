//! Top-level application loop.
//!
//! `AppState` owns the `Engine` and the `SimulatedDesktop` it drives.  It
//! consumes one hand frame at a time and the visualizer reads it back each
//! render.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::{Duration, Instant};

use anyhow::Context;
use hand_engine::{Actuator, Engine, EngineConfig, FrameReport, LandmarkFrame};
use log::info;

use crate::desktop::SimulatedDesktop;
use crate::source::{spawn_hand_source, ReplayHandSource, SimHandSource, SimInput};
use crate::visualizer::Visualizer;

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Where hand frames come from.
#[derive(Clone, Debug, PartialEq)]
pub enum SourceKind {
    /// Synthetic hand driven from the overlay window.
    Sim,
    /// JSON-lines recording.
    Replay(PathBuf),
    /// LeapMotion controller.
    #[cfg(feature = "leap")]
    Leap,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub source: SourceKind,
    /// Camera frame rate for the simulator and replays.
    pub fps:    f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            engine: EngineConfig::default(),
            #[cfg(feature = "leap")]
            source: SourceKind::Leap,
            #[cfg(not(feature = "leap"))]
            source: SourceKind::Sim,
            fps:    30.0,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// FpsMeter
// ════════════════════════════════════════════════════════════════════════════

/// Frames per second from consecutive processing times, lightly smoothed.
#[derive(Debug, Default, Clone, Copy)]
pub struct FpsMeter {
    last: Option<Instant>,
    fps:  f32,
}

impl FpsMeter {
    pub fn tick(&mut self, now: Instant) {
        if let Some(prev) = self.last {
            let dt = now.saturating_duration_since(prev).as_secs_f32();
            if dt > 0.0 {
                let inst = 1.0 / dt;
                self.fps = if self.fps == 0.0 { inst } else { self.fps * 0.8 + inst * 0.2 };
            }
        }
        self.last = Some(now);
    }

    pub fn fps(&self) -> f32 { self.fps }
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    engine:  Engine,
    desktop: SimulatedDesktop,
    fps:     FpsMeter,
    /// Most recent frame, for drawing.
    frame:   Option<LandmarkFrame>,
    pub status:  String,
    pub failures: usize,
}

impl AppState {
    pub fn new(cfg: EngineConfig) -> anyhow::Result<Self> {
        let screen = cfg.pointer.screen;
        let engine = Engine::new(cfg).context("invalid engine configuration")?;
        info!("engine ready in {} mode", engine.mode());
        Ok(AppState {
            status:   format!("Ready, mode: {}", engine.mode()),
            engine,
            desktop:  SimulatedDesktop::new(screen.w as i32, screen.h as i32),
            fps:      FpsMeter::default(),
            frame:    None,
            failures: 0,
        })
    }

    // ── process one hand frame ───────────────────────────────────────────

    pub fn handle_frame(&mut self, frame: Option<LandmarkFrame>, now: Instant) -> FrameReport {
        let report = self.engine.run_frame(frame.as_ref(), now, &mut self.desktop);
        self.fps.tick(now);
        self.frame = frame;
        self.failures += report.failed;

        if let Some(last) = report.commands.last() {
            self.status = if report.failed > 0 {
                format!("{} (FAILED)", last)
            } else {
                format!("{}", last)
            };
        }
        report
    }

    // ── accessors for the render loop ─────────────────────────────────────

    pub fn engine(&self)  -> &Engine            { &self.engine }
    pub fn desktop(&self) -> &SimulatedDesktop  { &self.desktop }
    pub fn frame(&self)   -> Option<&LandmarkFrame> { self.frame.as_ref() }
    pub fn fps(&self)     -> f32                { self.fps.fps() }

    /// Volume and brightness as read back from the actuator.
    pub fn levels(&self) -> (Option<u8>, Option<u8>) {
        (self.desktop.volume_percent().ok(), self.desktop.brightness_percent().ok())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run(): the main application loop
// ════════════════════════════════════════════════════════════════════════════

fn open_source(cfg: &AppConfig, sim_rx: Receiver<SimInput>) -> anyhow::Result<Receiver<Option<LandmarkFrame>>> {
    let fps = cfg.fps;
    Ok(match &cfg.source {
        SourceKind::Sim => spawn_hand_source(SimHandSource::new(sim_rx, fps)),
        SourceKind::Replay(path) => {
            info!("replaying {}", path.display());
            spawn_hand_source(ReplayHandSource::open(path, fps)?)
        }
        #[cfg(feature = "leap")]
        SourceKind::Leap => {
            spawn_hand_source(crate::source::LeapHandSource { camera: cfg.engine.pointer.camera })
        }
    })
}

/// Run the application until the window closes or the source ends.
pub fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let (sim_tx, sim_rx) = mpsc::channel::<SimInput>();
    let frames = open_source(&cfg, sim_rx)?;

    let mut vis = Visualizer::new(sim_tx, cfg.source == SourceKind::Sim)?;
    let mut app = AppState::new(cfg.engine)?;

    while vis.is_open() {
        if !vis.poll_input() { break; }

        match frames.try_recv() {
            Ok(frame) => { app.handle_frame(frame, Instant::now()); }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                info!("hand source finished");
                // Leave the last state on screen briefly.
                std::thread::sleep(Duration::from_millis(500));
                break;
            }
        }

        vis.render(&app);
    }

    info!("typed: {:?}", app.desktop().typed);
    if app.failures > 0 {
        info!("{} commands failed", app.failures);
    }
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use hand_engine::{DigitState, Mode, Point};
    use crate::sim::SimPose;

    fn ms(n: u64) -> Duration { Duration::from_millis(n) }

    fn pose(bits: [u8; 5], tip: Point) -> Option<LandmarkFrame> {
        SimPose { tip, digits: DigitState::from_pattern(bits), ..SimPose::default() }.frame()
    }

    #[test]
    fn invalid_config_is_an_error() {
        let mut cfg = EngineConfig::default();
        cfg.calibration.smoothing_step = 7;
        let err = AppState::new(cfg).err().unwrap();
        assert!(format!("{:#}", err).contains("invalid engine configuration"));
    }

    #[test]
    fn nudging_moves_the_simulated_cursor() {
        let mut app = AppState::new(EngineConfig::default()).unwrap();
        let t0 = Instant::now();
        app.handle_frame(pose([0, 1, 1, 0, 0], Point::new(300.0, 300.0)), t0);
        app.handle_frame(pose([0, 1, 1, 0, 0], Point::new(280.0, 300.0)), t0 + ms(33));
        assert_eq!(app.desktop().cursor, (1010, 540));
        assert_eq!(app.status, "move by +50 +0");
    }

    #[test]
    fn mode_switch_then_volume_pinch() {
        let mut app = AppState::new(EngineConfig::default()).unwrap();
        let t0 = Instant::now();
        app.handle_frame(pose([0, 1, 0, 0, 0], Point::new(1100.0, 60.0)), t0);
        assert_eq!(app.engine().mode(), Mode::Volume);

        let pinch = SimPose {
            tip:    Point::new(600.0, 400.0),
            digits: DigitState::from_pattern([0, 1, 0, 0, 1]),
            pinch:  Some(140.0),
            ..SimPose::default()
        };
        let report = app.handle_frame(pinch.frame(), t0 + ms(33));
        assert_eq!(report.applied, 1);
        assert_eq!(app.levels().0, Some(70));
    }

    #[test]
    fn unavailable_brightness_is_counted() {
        let mut app = AppState::new(EngineConfig { initial_mode: Mode::Brightness, ..EngineConfig::default() }).unwrap();
        app.desktop = app.desktop.clone().without_brightness();
        let pinch = SimPose {
            digits: DigitState::from_pattern([0, 1, 0, 0, 1]),
            pinch:  Some(100.0),
            ..SimPose::default()
        };
        let report = app.handle_frame(pinch.frame(), Instant::now());
        assert_eq!(report.failed, 1);
        assert_eq!(app.failures, 1);
        assert!(app.status.ends_with("(FAILED)"));
        assert_eq!(app.levels().1, None);
    }

    #[test]
    fn lost_hand_keeps_status() {
        let mut app = AppState::new(EngineConfig::default()).unwrap();
        app.handle_frame(pose([0, 0, 1, 0, 0], Point::new(300.0, 300.0)), Instant::now());
        let status = app.status.clone();
        app.handle_frame(None, Instant::now());
        assert_eq!(app.status, status);
        assert!(app.frame().is_none());
    }

    #[test]
    fn fps_meter_tracks_frame_rate() {
        let mut m = FpsMeter::default();
        let t0 = Instant::now();
        for i in 0..50u64 {
            m.tick(t0 + ms(i * 40));
        }
        assert!((m.fps() - 25.0).abs() < 0.5, "{}", m.fps());
    }
}
