use serde::{Deserialize, Serialize};

use super::units::Unit;

/// Smallest accepted city dimension, in main units. Zero or negative
/// input would divide the zoom-bounds math by zero, so dimensions are
/// clamped here before they reach it.
pub const MIN_CITY_SIZE: f64 = 0.01;

/// City dimensions in the active unit's main scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CitySize {
    pub x: f64,
    pub y: f64,
}

impl CitySize {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: sanitize(x),
            y: sanitize(y),
        }
    }

    /// Dimensions in meters for the given unit.
    pub fn meters(&self, unit: &Unit) -> (f64, f64) {
        (self.x * unit.scale, self.y * unit.scale)
    }

    /// Convert to another unit through meters, rounding to 2 decimals.
    /// Rounding drift over a single round trip is below the rounding
    /// granularity, so toggling units twice restores the original value.
    pub fn converted(&self, from: &Unit, to: &Unit) -> Self {
        let (x_m, y_m) = self.meters(from);
        Self {
            x: sanitize(round2(x_m / to.scale)),
            y: sanitize(round2(y_m / to.scale)),
        }
    }
}

impl Default for CitySize {
    fn default() -> Self {
        Self { x: 15.0, y: 15.0 }
    }
}

fn sanitize(v: f64) -> f64 {
    if v.is_finite() {
        v.max(MIN_CITY_SIZE)
    } else {
        MIN_CITY_SIZE
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::units::UNITS;

    #[test]
    fn rejects_degenerate_dimensions() {
        let c = CitySize::new(0.0, -3.0);
        assert_eq!(c.x, MIN_CITY_SIZE);
        assert_eq!(c.y, MIN_CITY_SIZE);
        let c = CitySize::new(f64::NAN, f64::INFINITY);
        assert_eq!(c.x, MIN_CITY_SIZE);
        assert_eq!(c.y, MIN_CITY_SIZE);
    }

    #[test]
    fn unit_toggle_round_trips() {
        let miles = &UNITS[0];
        let km = &UNITS[1];
        let original = CitySize::new(15.0, 7.5);
        let there = original.converted(miles, km);
        let back = there.converted(km, miles);
        assert!((back.x - original.x).abs() < 0.01);
        assert!((back.y - original.y).abs() < 0.01);
    }

    #[test]
    fn conversion_preserves_meters() {
        let miles = &UNITS[0];
        let km = &UNITS[1];
        let c = CitySize::new(10.0, 10.0);
        let converted = c.converted(miles, km);
        // 10 mi = 16.0934 km, rounded to 16.09
        assert!((converted.x - 16.09).abs() < 1e-9);
    }
}
