//! Distance mapping: fingertip separation to a quantized percentage.
//!
//! Shared by the volume and brightness controls.  The pixel distance between
//! two landmarks is interpolated from the calibration interval
//! `[d_min, d_max]` into `[0, 100]`, clamped, truncated, then snapped to the
//! nearest multiple of the smoothing step so landmark jitter doesn't make the
//! level flicker between adjacent values.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::landmark::Point;

// ════════════════════════════════════════════════════════════════════════════
// Calibration
// ════════════════════════════════════════════════════════════════════════════

/// Calibration interval and meter geometry.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Calibration {
    /// Distance (px) that maps to 0 %.
    pub d_min:          f32,
    /// Distance (px) that maps to 100 %.
    pub d_max:          f32,
    /// Output is always a multiple of this; must divide 100.
    pub smoothing_step: u8,
    /// Meter bar y at 0 %.
    pub bar_low:        f32,
    /// Meter bar y at 100 %.
    pub bar_high:       f32,
}

impl Default for Calibration {
    fn default() -> Self {
        Calibration {
            d_min:          50.0,
            d_max:          180.0,
            smoothing_step: 10,
            bar_low:        400.0,
            bar_high:       150.0,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LevelReading
// ════════════════════════════════════════════════════════════════════════════

/// Where a distance falls relative to the calibration interval.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Extent {
    /// At or below `d_min`: as low as it goes.
    Floor,
    Within,
    /// At or above `d_max`: as high as it goes.
    Ceiling,
}

/// Result of mapping one distance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LevelReading {
    pub distance: f32,
    pub percent:  u8,
    /// Meter bar position, for overlays only.
    pub bar:      f32,
    pub extent:   Extent,
}

// ════════════════════════════════════════════════════════════════════════════
// DistanceMapper
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug)]
pub struct DistanceMapper {
    cal: Calibration,
}

impl DistanceMapper {
    /// The calibration is assumed validated (`d_min < d_max`, step divides
    /// 100); see [`crate::config::EngineConfig::validate`].
    pub fn new(cal: Calibration) -> Self { DistanceMapper { cal } }

    pub fn calibration(&self) -> &Calibration { &self.cal }

    /// Map the distance between two landmarks.
    pub fn map(&self, a: Point, b: Point) -> LevelReading {
        self.map_distance(a.distance_to(&b))
    }

    pub fn map_distance(&self, distance: f32) -> LevelReading {
        let Calibration { d_min, d_max, smoothing_step, bar_low, bar_high } = self.cal;

        let raw = interp(distance, d_min, d_max, 0.0, 100.0);
        let percent = quantize(raw.trunc() as u32, smoothing_step.max(1) as u32);

        let extent = if distance <= d_min {
            Extent::Floor
        } else if distance >= d_max {
            Extent::Ceiling
        } else {
            Extent::Within
        };

        LevelReading {
            distance,
            percent,
            bar: interp(distance, d_min, d_max, bar_low, bar_high),
            extent,
        }
    }
}

/// Clamped linear interpolation of `x` from `[x0, x1]` into `[y0, y1]`.
fn interp(x: f32, x0: f32, x1: f32, y0: f32, y1: f32) -> f32 {
    if x <= x0 { return y0; }
    if x >= x1 { return y1; }
    y0 + (x - x0) * (y1 - y0) / (x1 - x0)
}

/// Nearest multiple of `step`; exact halves go to the even multiple.
fn quantize(value: u32, step: u32) -> u8 {
    let (q, rem) = (value / step, value % step);
    let up = match (rem * 2).cmp(&step) {
        Ordering::Greater => true,
        Ordering::Less    => false,
        Ordering::Equal   => q % 2 == 1,
    };
    let snapped = (q + u32::from(up)) * step;
    snapped.min(100) as u8
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn mapper() -> DistanceMapper { DistanceMapper::new(Calibration::default()) }

    #[test]
    fn interval_ends_map_to_0_and_100() {
        let m = mapper();
        assert_eq!(m.map_distance(50.0).percent, 0);
        assert_eq!(m.map_distance(180.0).percent, 100);
    }

    #[test]
    fn clamped_outside_interval() {
        let m = mapper();
        assert_eq!(m.map_distance(0.0).percent, 0);
        assert_eq!(m.map_distance(12.0).extent, Extent::Floor);
        assert_eq!(m.map_distance(900.0).percent, 100);
        assert_eq!(m.map_distance(900.0).extent, Extent::Ceiling);
        assert_eq!(m.map_distance(115.0).extent, Extent::Within);
    }

    #[test]
    fn monotonic_and_quantized() {
        let m = mapper();
        let mut last = 0;
        let mut d = 40.0;
        while d <= 200.0 {
            let p = m.map_distance(d).percent;
            assert!(p >= last, "not monotonic at {}", d);
            assert_eq!(p % 10, 0, "not a multiple of the step at {}", d);
            last = p;
            d += 0.5;
        }
    }

    #[test]
    fn midpoint_snaps_to_50() {
        // 115 px is exactly half-way through [50, 180].
        assert_eq!(mapper().map_distance(115.0).percent, 50);
        // 63 px → 10 % raw
        assert_eq!(mapper().map_distance(63.0).percent, 10);
    }

    #[test]
    fn exact_halves_round_to_even() {
        let m = mapper();
        // Raw 25 / 45 / 65 / 85 %.
        assert_eq!(m.map_distance(82.5).percent, 20);
        assert_eq!(m.map_distance(108.5).percent, 40);
        assert_eq!(m.map_distance(134.5).percent, 60);
        assert_eq!(m.map_distance(160.5).percent, 80);

        assert_eq!(quantize(5, 10), 0);
        assert_eq!(quantize(15, 10), 20);
        assert_eq!(quantize(35, 10), 40);
        assert_eq!(quantize(36, 10), 40);
        assert_eq!(quantize(34, 10), 30);
    }

    #[test]
    fn custom_step() {
        let m = DistanceMapper::new(Calibration { smoothing_step: 25, ..Calibration::default() });
        for d in [50.0, 70.0, 100.0, 140.0, 180.0] {
            assert_eq!(m.map_distance(d).percent % 25, 0);
        }
        assert_eq!(m.map_distance(180.0).percent, 100);
    }

    #[test]
    fn bar_runs_inverse() {
        let m = mapper();
        assert_eq!(m.map_distance(50.0).bar, 400.0);
        assert_eq!(m.map_distance(180.0).bar, 150.0);
        assert_eq!(m.map_distance(115.0).bar, 275.0);
    }

    #[test]
    fn map_uses_point_distance() {
        let r = mapper().map(Point::new(0.0, 0.0), Point::new(30.0, 40.0));
        assert_eq!(r.distance, 50.0);
        assert_eq!(r.percent, 0);
    }
}
