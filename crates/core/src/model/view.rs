use serde::{Deserialize, Serialize};

use super::city::CitySize;
use super::units::Unit;

/// Pan/zoom state for the main viewport.
///
/// `zoom` is pixels per meter. `offset_x`/`offset_y` are the screen-pixel
/// translation applied after scaling, so world point `w` lands at screen
/// pixel `offset + w * zoom`. The invariant that offsets satisfy
/// [`clamp_offset`] and zoom lies within [`ZoomBounds`] is enforced by the
/// state store — nothing mutates these fields directly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub offset_x: f64,
    pub offset_y: f64,
    pub zoom: f64,
    /// Transient drag bookkeeping. Persisted for parity with the stored
    /// view blob but reset on session start.
    #[serde(default)]
    pub is_panning: bool,
    #[serde(default)]
    pub start_pan_x: f64,
    #[serde(default)]
    pub start_pan_y: f64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            offset_x: 0.0,
            offset_y: 0.0,
            zoom: 1.0,
            is_panning: false,
            start_pan_x: 0.0,
            start_pan_y: 0.0,
        }
    }
}

impl ViewState {
    /// Screen pixel → world meters under the current view.
    pub fn screen_to_world(&self, px: f64, py: f64) -> (f64, f64) {
        (
            (px - self.offset_x) / self.zoom,
            (py - self.offset_y) / self.zoom,
        )
    }
}

/// Legal zoom range for a given city, unit, and viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomBounds {
    /// The whole city exactly fits, limited by the tighter axis.
    pub min_zoom: f64,
    /// The unit's close-up distance fills the screen, limited by the
    /// looser axis.
    pub max_zoom: f64,
}

impl ZoomBounds {
    pub fn compute(city: CitySize, unit: &Unit, viewport_w: f64, viewport_h: f64) -> Self {
        let (city_w_m, city_h_m) = city.meters(unit);
        let min_zoom = (viewport_w / city_w_m).min(viewport_h / city_h_m);
        let max_zoom = (viewport_w / unit.close_up_meters).max(viewport_h / unit.close_up_meters);
        Self { min_zoom, max_zoom }
    }

    pub fn clamp(&self, zoom: f64) -> f64 {
        zoom.max(self.min_zoom).min(self.max_zoom)
    }

    pub fn contains(&self, zoom: f64) -> bool {
        zoom >= self.min_zoom && zoom <= self.max_zoom
    }
}

/// Constrain a candidate pan offset so the city never detaches from the
/// viewport: each axis is clamped to `[min(0, viewport - city_px), 0]`.
///
/// When the city is smaller than the viewport on an axis the range
/// collapses to `[0, 0]`; centering in that case is the caller's job
/// (see [`center_offset`]). Pure and idempotent — this is the single
/// invariant-enforcement point every write path funnels through.
pub fn clamp_offset(
    offset_x: f64,
    offset_y: f64,
    zoom: f64,
    viewport_w: f64,
    viewport_h: f64,
    city: CitySize,
    unit: &Unit,
) -> (f64, f64) {
    let (city_w_m, city_h_m) = city.meters(unit);
    let city_w_px = city_w_m * zoom;
    let city_h_px = city_h_m * zoom;
    let min_offset_x = (viewport_w - city_w_px).min(0.0);
    let min_offset_y = (viewport_h - city_h_px).min(0.0);
    (
        offset_x.min(0.0).max(min_offset_x),
        offset_y.min(0.0).max(min_offset_y),
    )
}

/// Offset that centers the city in the viewport at the given zoom.
pub fn center_offset(
    zoom: f64,
    viewport_w: f64,
    viewport_h: f64,
    city: CitySize,
    unit: &Unit,
) -> (f64, f64) {
    let (city_w_m, city_h_m) = city.meters(unit);
    (
        (viewport_w - city_w_m * zoom) / 2.0,
        (viewport_h - city_h_m * zoom) / 2.0,
    )
}

/// Solve the new offset so the world point under screen pixel `(px, py)`
/// stays under it after changing zoom. Output is pre-clamp.
pub fn zoom_to_point(view: &ViewState, new_zoom: f64, px: f64, py: f64) -> (f64, f64) {
    let (world_x, world_y) = view.screen_to_world(px, py);
    (px - world_x * new_zoom, py - world_y * new_zoom)
}

/// Map a normalized slider position `t` in [0, 1] to a zoom level,
/// logarithmically, so the slider feels linear across the exponential
/// zoom range.
pub fn slider_to_zoom(t: f64, bounds: &ZoomBounds) -> f64 {
    let log_min = bounds.min_zoom.ln();
    let log_max = bounds.max_zoom.ln();
    (log_min + t.clamp(0.0, 1.0) * (log_max - log_min)).exp()
}

/// Inverse of [`slider_to_zoom`]. Returns 0 when the range is degenerate
/// (min and max zoom coincide).
pub fn zoom_to_slider(zoom: f64, bounds: &ZoomBounds) -> f64 {
    let log_min = bounds.min_zoom.ln();
    let log_max = bounds.max_zoom.ln();
    let span = log_max - log_min;
    if span.abs() < f64::EPSILON {
        return 0.0;
    }
    ((zoom.ln() - log_min) / span).clamp(0.0, 1.0)
}
