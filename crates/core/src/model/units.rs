/// A measurement system: the main unit sets city dimensions and grid
/// spacing, the sub-unit is what the scale bar shows at close zoom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Unit {
    pub label: &'static str,
    pub short: &'static str,
    /// Meters per main unit.
    pub scale: f64,
    pub sub: &'static str,
    /// Meters per sub-unit.
    pub sub_scale: f64,
    /// Close-up distance in meters that fills the screen at maximum zoom.
    pub close_up_meters: f64,
    /// Sub-unit quantity at which the scale bar switches to main units.
    pub scale_bar_threshold: f64,
}

pub const FOOT_IN_METERS: f64 = 0.3048;

/// The available measurement systems. Exactly one is active at a time,
/// selected by index; `next_index` cycles through them.
pub const UNITS: [Unit; 2] = [
    Unit {
        label: "miles",
        short: "mi",
        scale: 1609.34,
        sub: "ft",
        sub_scale: FOOT_IN_METERS,
        close_up_meters: 300.0 * FOOT_IN_METERS,
        scale_bar_threshold: 2000.0,
    },
    Unit {
        label: "km",
        short: "km",
        scale: 1000.0,
        sub: "m",
        sub_scale: 1.0,
        close_up_meters: 100.0,
        scale_bar_threshold: 1000.0,
    },
];

/// Look up a unit by persisted index. Out-of-range indices wrap so a
/// stale persisted value can never panic.
pub fn unit(index: usize) -> &'static Unit {
    &UNITS[index % UNITS.len()]
}

pub fn next_index(index: usize) -> usize {
    (index + 1) % UNITS.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_sane() {
        for u in &UNITS {
            assert!(u.scale > 0.0);
            assert!(u.sub_scale > 0.0);
            assert!(u.sub_scale < u.scale, "{} sub-unit must be finer", u.label);
            assert!(u.close_up_meters > 0.0);
        }
    }

    #[test]
    fn index_wraps() {
        assert_eq!(unit(0).short, "mi");
        assert_eq!(unit(1).short, "km");
        assert_eq!(unit(2).short, "mi");
        assert_eq!(next_index(1), 0);
    }
}
