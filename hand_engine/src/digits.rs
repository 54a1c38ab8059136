//! Digit state classification: which fingers are extended.
//!
//! A direct geometric test, re-evaluated every frame with no smoothing:
//!
//! * **Thumb**: up when its tip lies laterally further from the hand's
//!   center than the IP joint below it (the thumb folds sideways across the
//!   palm as seen by a front camera).
//! * **Index … pinky**: up when the tip is higher on screen (smaller y)
//!   than the PIP joint two landmarks back along the same finger.

use std::fmt;

use crate::landmark::{LandmarkFrame, TIP_IDS};

// ════════════════════════════════════════════════════════════════════════════
// DigitState
// ════════════════════════════════════════════════════════════════════════════

/// Extended/curled flags in the order `[thumb, index, middle, ring, pinky]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DigitState(pub [bool; 5]);

impl DigitState {
    /// Build from a 0/1 array, e.g. `[0, 1, 1, 0, 0]`.
    pub fn from_pattern(bits: [u8; 5]) -> Self {
        DigitState(bits.map(|b| b != 0))
    }

    pub fn thumb(&self)  -> bool { self.0[0] }
    pub fn index(&self)  -> bool { self.0[1] }
    pub fn middle(&self) -> bool { self.0[2] }
    pub fn ring(&self)   -> bool { self.0[3] }
    pub fn pinky(&self)  -> bool { self.0[4] }

    pub fn matches(&self, pattern: &Pattern) -> bool {
        self.0.iter().zip(pattern.iter()).all(|(&up, slot)| slot.accepts(up))
    }
}

impl fmt::Display for DigitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for up in self.0 {
            f.write_str(if up { "1" } else { "0" })?;
        }
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Pattern
// ════════════════════════════════════════════════════════════════════════════

/// One position of a [`Pattern`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slot {
    Up,
    Down,
    /// Either state.
    Any,
}

impl Slot {
    fn accepts(self, up: bool) -> bool {
        match self {
            Slot::Up   => up,
            Slot::Down => !up,
            Slot::Any  => true,
        }
    }
}

/// A digit-state template, thumb first.
pub type Pattern = [Slot; 5];

// ════════════════════════════════════════════════════════════════════════════
// classify
// ════════════════════════════════════════════════════════════════════════════

/// Classify a complete landmark frame.
pub fn classify(frame: &LandmarkFrame) -> DigitState {
    let mut up = [false; 5];

    // Thumb: lateral extension relative to the hand's center column.
    let cx = frame.bbox().center().x;
    let tip = frame.point(TIP_IDS[0]);
    let ip  = frame.point(TIP_IDS[0] - 1);
    up[0] = (tip.x - cx).abs() > (ip.x - cx).abs();

    for (i, &tip_id) in TIP_IDS.iter().enumerate().skip(1) {
        up[i] = frame.point(tip_id).y < frame.point(tip_id - 2).y;
    }

    DigitState(up)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmark::*;

    /// Upright right hand, palm to camera.  Finger chains run upward from
    /// the knuckle row at y=300; `up` selects which fingertips sit above
    /// their PIP joints.
    fn hand(up: [bool; 5]) -> LandmarkFrame {
        let mut p = [Point::default(); LANDMARK_COUNT];
        p[WRIST] = Point::new(300.0, 420.0);

        // Thumb runs out to the left of the palm when extended.
        p[THUMB_CMC] = Point::new(270.0, 390.0);
        p[THUMB_MCP] = Point::new(250.0, 360.0);
        p[THUMB_IP]  = Point::new(235.0, 340.0);
        p[THUMB_TIP] = if up[0] { Point::new(205.0, 320.0) } else { Point::new(265.0, 330.0) };

        let columns = [(INDEX_MCP, 260.0), (MIDDLE_MCP, 295.0), (RING_MCP, 330.0), (PINKY_MCP, 360.0)];
        for (i, &(mcp, x)) in columns.iter().enumerate() {
            p[mcp]     = Point::new(x, 300.0);
            p[mcp + 1] = Point::new(x, 260.0);
            if up[i + 1] {
                p[mcp + 2] = Point::new(x, 230.0);
                p[mcp + 3] = Point::new(x, 200.0);
            } else {
                p[mcp + 2] = Point::new(x, 285.0);
                p[mcp + 3] = Point::new(x, 295.0);
            }
        }
        LandmarkFrame::from_array(p, Handedness::Right)
    }

    #[test]
    fn all_up_and_all_down() {
        assert_eq!(classify(&hand([true; 5])), DigitState([true; 5]));
        assert_eq!(classify(&hand([false; 5])), DigitState([false; 5]));
    }

    #[test]
    fn each_finger_is_independent() {
        for i in 0..5 {
            let mut up = [false; 5];
            up[i] = true;
            assert_eq!(classify(&hand(up)).0, up, "finger {}", i);
        }
    }

    #[test]
    fn thumb_test_is_mirror_symmetric() {
        // Mirror the extended-thumb hand horizontally around x = 300.
        let f = hand([true, false, false, false, false]);
        let mirrored: Vec<Point> = f.points().iter().map(|p| Point::new(600.0 - p.x, p.y)).collect();
        let m = LandmarkFrame::new(mirrored, Handedness::Left).unwrap();
        assert!(classify(&m).thumb());
    }

    #[test]
    fn pattern_matching_with_wildcards() {
        use Slot::*;
        let scroll: Pattern = [Down, Up, Up, Up, Any];
        assert!(DigitState::from_pattern([0, 1, 1, 1, 0]).matches(&scroll));
        assert!(DigitState::from_pattern([0, 1, 1, 1, 1]).matches(&scroll));
        assert!(!DigitState::from_pattern([1, 1, 1, 1, 1]).matches(&scroll));
    }

    #[test]
    fn display_is_bit_string() {
        assert_eq!(DigitState::from_pattern([0, 1, 1, 0, 1]).to_string(), "01101");
    }
}
