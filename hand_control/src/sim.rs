//! Synthetic hands for simulation mode.
//!
//! [`synthesize`] builds a 21-point hand whose classification is exactly the
//! requested digit vector, so every gesture can be exercised with a mouse
//! and a few number keys.

use hand_engine::landmark::*;
use hand_engine::DigitState;

/// Everything the simulator needs to draw one hand.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimPose {
    /// Where the index fingertip goes (camera pixels).
    pub tip:        Point,
    pub digits:     DigitState,
    /// Thumb-to-index tip distance.  `None` leaves the thumb in its rest
    /// position; `Some` moves the thumb tip to that distance left of the
    /// index tip, overriding the thumb's digit state.
    pub pinch:      Option<f32>,
    /// Hand size multiplier; 1.0 gives an area score of about 330.
    pub scale:      f32,
    pub handedness: Handedness,
    /// A hidden hand produces no frame.
    pub visible:    bool,
}

impl Default for SimPose {
    fn default() -> Self {
        SimPose {
            tip:        Point::new(625.0, 360.0),
            digits:     DigitState::from_pattern([0, 1, 1, 0, 0]),
            pinch:      None,
            scale:      1.0,
            handedness: Handedness::Right,
            visible:    true,
        }
    }
}

impl SimPose {
    /// Flip one finger (0 = thumb).
    pub fn toggle(&mut self, finger: usize) {
        if let Some(d) = self.digits.0.get_mut(finger) {
            *d = !*d;
        }
    }

    /// The frame this pose produces, `None` when hidden.
    pub fn frame(&self) -> Option<LandmarkFrame> {
        self.visible.then(|| synthesize(self))
    }
}

// Rest geometry of an upright right hand, palm to camera, relative to the
// index knuckle.  Finger chains are (MCP, PIP, DIP, TIP).
const COLUMNS: [f32; 4] = [0.0, 35.0, 70.0, 100.0];
const EXTENDED: [f32; 4] = [0.0, -40.0, -70.0, -100.0];
const CURLED:   [f32; 4] = [0.0, -40.0, -15.0,   -5.0];

/// Build the landmarks for `pose`.
pub fn synthesize(pose: &SimPose) -> LandmarkFrame {
    let mut p = [Point::default(); LANDMARK_COUNT];
    let up = pose.digits.0;

    p[WRIST]     = Point::new(40.0, 120.0);
    p[THUMB_CMC] = Point::new(10.0, 90.0);
    p[THUMB_MCP] = Point::new(-10.0, 60.0);
    p[THUMB_IP]  = Point::new(-25.0, 40.0);
    p[THUMB_TIP] = if up[0] { Point::new(-55.0, 20.0) } else { Point::new(5.0, 30.0) };

    for (f, &x) in COLUMNS.iter().enumerate() {
        let chain = if up[f + 1] { &EXTENDED } else { &CURLED };
        let mcp = INDEX_MCP + 4 * f;
        for (j, &y) in chain.iter().enumerate() {
            p[mcp + j] = Point::new(x, y);
        }
    }

    // Scale about the knuckle, then move the index tip onto `tip`.
    let s = pose.scale.max(0.1);
    let mirror = if pose.handedness == Handedness::Left { -1.0 } else { 1.0 };
    let anchor = p[INDEX_TIP];
    for q in p.iter_mut() {
        q.x = pose.tip.x + (q.x - anchor.x) * s * mirror;
        q.y = pose.tip.y + (q.y - anchor.y) * s;
    }

    if let Some(w) = pose.pinch {
        p[THUMB_TIP] = Point::new(pose.tip.x - w * mirror, pose.tip.y);
    }

    LandmarkFrame::from_array(p, pose.handedness)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use hand_engine::{classify, EngineConfig};

    fn every_pattern() -> impl Iterator<Item = [bool; 5]> {
        (0u8..32).map(|bits| {
            let mut up = [false; 5];
            for (i, u) in up.iter_mut().enumerate() {
                *u = bits & (1 << i) != 0;
            }
            up
        })
    }

    #[test]
    fn classification_round_trips_for_all_patterns() {
        for up in every_pattern() {
            for handedness in [Handedness::Right, Handedness::Left] {
                let pose = SimPose { digits: DigitState(up), handedness, ..SimPose::default() };
                assert_eq!(classify(&synthesize(&pose)).0, up, "{:?} {:?}", up, handedness);
            }
        }
    }

    #[test]
    fn index_tip_lands_on_target() {
        let pose = SimPose { tip: Point::new(100.0, 80.0), scale: 1.7, ..SimPose::default() };
        assert_eq!(synthesize(&pose).index_tip(), Point::new(100.0, 80.0));
    }

    #[test]
    fn default_size_is_plausible_and_scale_grows_it() {
        let window = EngineConfig::default().level.area_window;
        let normal = synthesize(&SimPose::default()).bbox().area_score();
        assert!(window.contains(normal), "area {}", normal);

        let big = synthesize(&SimPose { scale: 3.0, ..SimPose::default() }).bbox().area_score();
        assert!(!window.contains(big), "area {}", big);
    }

    #[test]
    fn pinch_sets_thumb_index_distance() {
        let pose = SimPose {
            digits: DigitState::from_pattern([0, 1, 0, 0, 1]),
            pinch:  Some(75.0),
            ..SimPose::default()
        };
        let frame = synthesize(&pose);
        let d = frame.point(THUMB_TIP).distance_to(&frame.point(INDEX_TIP));
        assert!((d - 75.0).abs() < 1e-3);
        let got = classify(&frame);
        assert_eq!(&got.0[1..], &pose.digits.0[1..]);
    }

    #[test]
    fn hidden_hand_has_no_frame() {
        let mut pose = SimPose::default();
        pose.visible = false;
        assert!(pose.frame().is_none());
        pose.toggle(4);
        assert!(pose.digits.pinky());
    }
}
