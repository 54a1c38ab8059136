//! Landmark frames: one detected hand's 21 points in image pixel space.
//!
//! Index order follows the fixed anatomical scheme every MediaPipe-style
//! detector reports (wrist = 0, thumb tip = 4, …, pinky tip = 20).  A frame
//! is built once per processed camera image and dropped after dispatch.

use serde::{Deserialize, Serialize};

// ════════════════════════════════════════════════════════════════════════════
// Landmark indices
// ════════════════════════════════════════════════════════════════════════════

pub const WRIST:      usize = 0;
pub const THUMB_CMC:  usize = 1;
pub const THUMB_MCP:  usize = 2;
pub const THUMB_IP:   usize = 3;
pub const THUMB_TIP:  usize = 4;
pub const INDEX_MCP:  usize = 5;
pub const INDEX_PIP:  usize = 6;
pub const INDEX_DIP:  usize = 7;
pub const INDEX_TIP:  usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP:   usize = 13;
pub const RING_PIP:   usize = 14;
pub const RING_DIP:   usize = 15;
pub const RING_TIP:   usize = 16;
pub const PINKY_MCP:  usize = 17;
pub const PINKY_PIP:  usize = 18;
pub const PINKY_DIP:  usize = 19;
pub const PINKY_TIP:  usize = 20;

/// Number of landmarks in a complete hand.
pub const LANDMARK_COUNT: usize = 21;

/// Fingertip ids, thumb first.
pub const TIP_IDS: [usize; 5] = [THUMB_TIP, INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];

// ════════════════════════════════════════════════════════════════════════════
// Point
// ════════════════════════════════════════════════════════════════════════════

/// A pixel-space position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self { Point { x, y } }

    /// Euclidean distance in pixels.
    pub fn distance_to(&self, other: &Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Midpoint of the segment to `other`.
    pub fn midpoint(&self, other: &Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Rect / BoundingBox
// ════════════════════════════════════════════════════════════════════════════

/// Axis-aligned screen rectangle given by its top-left corner and size.
///
/// Used for the mode-selector dwell region and virtual keyboard buttons.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self { Rect { x, y, w, h } }

    /// Inclusive containment on all four edges.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.w && p.y >= self.y && p.y <= self.y + self.h
    }

    pub fn is_empty(&self) -> bool { !(self.w > 0.0 && self.h > 0.0) }
}

/// Min/max box over all 21 landmark coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub xmin: f32,
    pub ymin: f32,
    pub xmax: f32,
    pub ymax: f32,
}

impl BoundingBox {
    fn around(points: &[Point]) -> Self {
        let mut bb = BoundingBox {
            xmin: f32::INFINITY,
            ymin: f32::INFINITY,
            xmax: f32::NEG_INFINITY,
            ymax: f32::NEG_INFINITY,
        };
        for p in points {
            bb.xmin = bb.xmin.min(p.x);
            bb.ymin = bb.ymin.min(p.y);
            bb.xmax = bb.xmax.max(p.x);
            bb.ymax = bb.ymax.max(p.y);
        }
        bb
    }

    pub fn width(&self)  -> f32 { self.xmax - self.xmin }
    pub fn height(&self) -> f32 { self.ymax - self.ymin }

    pub fn center(&self) -> Point {
        Point::new((self.xmin + self.xmax) / 2.0, (self.ymin + self.ymax) / 2.0)
    }

    /// Box area in hundreds of square pixels, truncated to an integer.
    ///
    /// This is the quantity the hand-size plausibility window is expressed in.
    pub fn area_score(&self) -> i64 {
        let w = self.width().max(0.0) as i64;
        let h = self.height().max(0.0) as i64;
        (w * h) / 100
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Handedness
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handedness {
    Left,
    Right,
    #[default]
    Unknown,
}

// ════════════════════════════════════════════════════════════════════════════
// LandmarkFrame
// ════════════════════════════════════════════════════════════════════════════

/// One hand's landmarks for one frame, plus the derived bounding box.
///
/// A frame can only be constructed from a complete set of 21 points, so
/// every consumer may index any landmark id without checking.
#[derive(Clone, Debug, PartialEq)]
pub struct LandmarkFrame {
    points:     [Point; LANDMARK_COUNT],
    bbox:       BoundingBox,
    handedness: Handedness,
}

impl LandmarkFrame {
    /// Build a frame from detector output.
    ///
    /// Returns `None` unless exactly 21 points were supplied; a partial hand
    /// is treated the same as no hand at all.
    pub fn new(points: Vec<Point>, handedness: Handedness) -> Option<Self> {
        let points: [Point; LANDMARK_COUNT] = points.try_into().ok()?;
        let bbox = BoundingBox::around(&points);
        Some(LandmarkFrame { points, bbox, handedness })
    }

    /// Build a frame from a fixed-size array; cannot fail.
    pub fn from_array(points: [Point; LANDMARK_COUNT], handedness: Handedness) -> Self {
        let bbox = BoundingBox::around(&points);
        LandmarkFrame { points, bbox, handedness }
    }

    /// Landmark `id` (0–20).  Panics on an out-of-range id, which is a
    /// programming error since all ids are compile-time constants.
    pub fn point(&self, id: usize) -> Point { self.points[id] }

    pub fn points(&self) -> &[Point; LANDMARK_COUNT] { &self.points }
    pub fn bbox(&self) -> &BoundingBox { &self.bbox }
    pub fn handedness(&self) -> Handedness { self.handedness }

    pub fn index_tip(&self) -> Point { self.points[INDEX_TIP] }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(n: usize) -> Vec<Point> {
        (0..n).map(|i| Point::new(100.0 + i as f32 * 10.0, 400.0 - i as f32 * 5.0)).collect()
    }

    #[test]
    fn complete_set_builds_frame() {
        let f = LandmarkFrame::new(ring(21), Handedness::Right).unwrap();
        assert_eq!(f.point(WRIST), Point::new(100.0, 400.0));
        assert_eq!(f.index_tip(), Point::new(180.0, 360.0));
        assert_eq!(f.handedness(), Handedness::Right);
    }

    #[test]
    fn partial_or_oversized_set_is_rejected() {
        assert!(LandmarkFrame::new(Vec::new(), Handedness::Unknown).is_none());
        assert!(LandmarkFrame::new(ring(20), Handedness::Unknown).is_none());
        assert!(LandmarkFrame::new(ring(22), Handedness::Unknown).is_none());
    }

    #[test]
    fn bbox_is_min_max_over_points() {
        let f = LandmarkFrame::new(ring(21), Handedness::Unknown).unwrap();
        let bb = f.bbox();
        assert_eq!((bb.xmin, bb.xmax), (100.0, 300.0));
        assert_eq!((bb.ymin, bb.ymax), (300.0, 400.0));
        // 200 × 100 / 100
        assert_eq!(bb.area_score(), 200);
        assert_eq!(bb.center(), Point::new(200.0, 350.0));
    }

    #[test]
    fn rect_contains_is_inclusive() {
        let r = Rect::new(10.0, 10.0, 20.0, 20.0);
        assert!(r.contains(Point::new(10.0, 30.0)));
        assert!(r.contains(Point::new(20.0, 20.0)));
        assert!(!r.contains(Point::new(30.1, 20.0)));
        assert!(Rect::new(0.0, 0.0, 0.0, 5.0).is_empty());
    }

    #[test]
    fn distance_is_euclidean() {
        assert_eq!(Point::new(0.0, 0.0).distance_to(&Point::new(30.0, 40.0)), 50.0);
    }
}
