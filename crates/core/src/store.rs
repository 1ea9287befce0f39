//! Explicit state container for the viewer.
//!
//! The original design kept view/city/unit state ambient and coupled to
//! persistence side effects; here all of it lives in [`MapStore`], every
//! mutation funnels through the clamp functions, and persistence is an
//! observer that drains dirty flags.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::city::CitySize;
use crate::model::units::{self, Unit};
use crate::model::view::{self, ViewState, ZoomBounds};

pub const KEY_VIEW: &str = "view";
pub const KEY_CITY_SIZE: &str = "citySize";
pub const KEY_UNIT_INDEX: &str = "unitIndex";
pub const KEY_MINIMAP_MAX_SIZE: &str = "minimapMaxSize";

/// Every key the persistence collaborator reads at startup and writes on
/// change. Absent keys fall back to defaults; there is no schema version.
pub const PERSIST_KEYS: [&str; 4] = [KEY_VIEW, KEY_CITY_SIZE, KEY_UNIT_INDEX, KEY_MINIMAP_MAX_SIZE];

pub const MINIMAP_MIN_SIZE: f64 = 80.0;
pub const MINIMAP_MAX_SIZE: f64 = 400.0;
const DEFAULT_MINIMAP_SIZE: f64 = 180.0;

/// Relative tolerance for "is the user fully zoomed out". Zoom is written
/// back from `min_zoom` verbatim, so this only has to absorb float noise
/// from recomputing the bounds.
const FIT_EPSILON: f64 = 1e-9;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unknown persistence key `{0}`")]
    UnknownKey(String),
    #[error("failed to decode persisted value: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Which parts of the state changed since the persistence observer last
/// drained them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirtyFlags {
    pub view: bool,
    pub city_size: bool,
    pub unit_index: bool,
    pub minimap_max_size: bool,
}

impl DirtyFlags {
    pub fn any(&self) -> bool {
        self.view || self.city_size || self.unit_index || self.minimap_max_size
    }
}

/// The shared mutable state of the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapState {
    pub view: ViewState,
    pub city_size: CitySize,
    pub unit_index: usize,
    pub minimap_max_size: f64,
}

impl Default for MapState {
    fn default() -> Self {
        Self {
            view: ViewState::default(),
            city_size: CitySize::default(),
            unit_index: 0,
            minimap_max_size: DEFAULT_MINIMAP_SIZE,
        }
    }
}

/// Single source of truth consumed by the renderer, minimap, and scale
/// bar. All writers go through methods here so no offset or zoom can ever
/// bypass the clamp.
#[derive(Debug, Clone, Default)]
pub struct MapStore {
    state: MapState,
    dirty: DirtyFlags,
    /// The default view (zoom 1, offset 0,0) is a placeholder until first
    /// layout, when it snaps to min zoom, centered — unless a persisted
    /// view already replaced it.
    fitted_once: bool,
}

impl MapStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &MapState {
        &self.state
    }

    pub fn view(&self) -> &ViewState {
        &self.state.view
    }

    pub fn city_size(&self) -> CitySize {
        self.state.city_size
    }

    pub fn unit(&self) -> &'static Unit {
        units::unit(self.state.unit_index)
    }

    pub fn minimap_max_size(&self) -> f64 {
        self.state.minimap_max_size
    }

    pub fn bounds(&self, viewport_w: f64, viewport_h: f64) -> ZoomBounds {
        ZoomBounds::compute(self.state.city_size, self.unit(), viewport_w, viewport_h)
    }

    /// Set zoom and offset together, clamping both. The only mutation
    /// path for zoom.
    pub fn set_view_clamped(
        &mut self,
        zoom: f64,
        offset_x: f64,
        offset_y: f64,
        viewport_w: f64,
        viewport_h: f64,
    ) {
        let zoom = self.bounds(viewport_w, viewport_h).clamp(zoom);
        let (ox, oy) = view::clamp_offset(
            offset_x,
            offset_y,
            zoom,
            viewport_w,
            viewport_h,
            self.state.city_size,
            self.unit(),
        );
        let next = ViewState {
            zoom,
            offset_x: ox,
            offset_y: oy,
            ..self.state.view
        };
        if next != self.state.view {
            self.state.view = next;
            self.dirty.view = true;
        }
    }

    /// Set only the pan offset, clamped at the current zoom. Returns
    /// whether anything changed, which continuous repeat uses to
    /// self-terminate at the boundary.
    pub fn set_offset_clamped(
        &mut self,
        offset_x: f64,
        offset_y: f64,
        viewport_w: f64,
        viewport_h: f64,
    ) -> bool {
        let (ox, oy) = view::clamp_offset(
            offset_x,
            offset_y,
            self.state.view.zoom,
            viewport_w,
            viewport_h,
            self.state.city_size,
            self.unit(),
        );
        let changed = ox != self.state.view.offset_x || oy != self.state.view.offset_y;
        if changed {
            self.state.view.offset_x = ox;
            self.state.view.offset_y = oy;
            self.dirty.view = true;
        }
        changed
    }

    pub fn set_panning(&mut self, panning: bool, start_x: f64, start_y: f64) {
        self.state.view.is_panning = panning;
        self.state.view.start_pan_x = start_x;
        self.state.view.start_pan_y = start_y;
        self.dirty.view = true;
    }

    /// Apply a new city size. "Fit to screen" is sticky: if the view was
    /// fully zoomed out, it snaps to the new min zoom and recenters;
    /// otherwise zoom is preserved and the offset re-clamped.
    pub fn set_city_size(&mut self, size: CitySize, viewport_w: f64, viewport_h: f64) {
        let size = CitySize::new(size.x, size.y);
        if size == self.state.city_size {
            return;
        }
        let was_fit = self.is_fit(viewport_w, viewport_h);
        self.state.city_size = size;
        self.dirty.city_size = true;
        self.refit(was_fit, viewport_w, viewport_h);
    }

    /// Swap to the next unit, converting the city size through meters so
    /// its physical extent is unchanged. Size and index change together.
    pub fn toggle_unit(&mut self, viewport_w: f64, viewport_h: f64) {
        let was_fit = self.is_fit(viewport_w, viewport_h);
        let old_unit = self.unit();
        let new_index = units::next_index(self.state.unit_index);
        let new_unit = units::unit(new_index);
        self.state.city_size = self.state.city_size.converted(old_unit, new_unit);
        self.state.unit_index = new_index;
        self.dirty.city_size = true;
        self.dirty.unit_index = true;
        self.refit(was_fit, viewport_w, viewport_h);
    }

    pub fn set_minimap_max_size(&mut self, px: f64) {
        let px = px.clamp(MINIMAP_MIN_SIZE, MINIMAP_MAX_SIZE);
        if px != self.state.minimap_max_size {
            self.state.minimap_max_size = px;
            self.dirty.minimap_max_size = true;
        }
    }

    /// Re-establish the view invariants for the current viewport size.
    /// Called on startup (after persisted state lands) and on resize;
    /// zoom only changes if it no longer satisfies the bounds. At min
    /// zoom the city is centered.
    pub fn ensure_fit(&mut self, viewport_w: f64, viewport_h: f64) {
        let bounds = self.bounds(viewport_w, viewport_h);
        if !self.fitted_once {
            self.fitted_once = true;
            self.center(bounds.min_zoom, viewport_w, viewport_h);
            return;
        }
        let zoom = bounds.clamp(self.state.view.zoom);
        if zoom <= bounds.min_zoom * (1.0 + FIT_EPSILON) {
            self.center(bounds.min_zoom, viewport_w, viewport_h);
        } else {
            self.set_view_clamped(
                zoom,
                self.state.view.offset_x,
                self.state.view.offset_y,
                viewport_w,
                viewport_h,
            );
        }
    }

    pub fn take_dirty(&mut self) -> DirtyFlags {
        std::mem::take(&mut self.dirty)
    }

    /// Apply a persisted value over the defaults. Clamping happens later
    /// in `ensure_fit`, once the viewport size is known. Does not mark
    /// dirty — loading is not a change.
    pub fn apply_persisted(&mut self, key: &str, json: &str) -> Result<(), StoreError> {
        match key {
            KEY_VIEW => {
                let mut v: ViewState = serde_json::from_str(json)?;
                v.is_panning = false;
                self.state.view = v;
                self.fitted_once = true;
            }
            KEY_CITY_SIZE => {
                let c: CitySize = serde_json::from_str(json)?;
                self.state.city_size = CitySize::new(c.x, c.y);
            }
            KEY_UNIT_INDEX => {
                let i: usize = serde_json::from_str(json)?;
                self.state.unit_index = i % crate::model::units::UNITS.len();
            }
            KEY_MINIMAP_MAX_SIZE => {
                let px: f64 = serde_json::from_str(json)?;
                self.state.minimap_max_size = px.clamp(MINIMAP_MIN_SIZE, MINIMAP_MAX_SIZE);
            }
            other => return Err(StoreError::UnknownKey(other.to_string())),
        }
        Ok(())
    }

    /// Serialize one persisted key's current value.
    pub fn to_persist(&self, key: &str) -> Result<String, StoreError> {
        let json = match key {
            KEY_VIEW => serde_json::to_string(&self.state.view)?,
            KEY_CITY_SIZE => serde_json::to_string(&self.state.city_size)?,
            KEY_UNIT_INDEX => serde_json::to_string(&self.state.unit_index)?,
            KEY_MINIMAP_MAX_SIZE => serde_json::to_string(&self.state.minimap_max_size)?,
            other => return Err(StoreError::UnknownKey(other.to_string())),
        };
        Ok(json)
    }

    fn is_fit(&self, viewport_w: f64, viewport_h: f64) -> bool {
        let bounds = self.bounds(viewport_w, viewport_h);
        self.state.view.zoom <= bounds.min_zoom * (1.0 + FIT_EPSILON)
    }

    fn refit(&mut self, was_fit: bool, viewport_w: f64, viewport_h: f64) {
        if was_fit {
            let bounds = self.bounds(viewport_w, viewport_h);
            self.center(bounds.min_zoom, viewport_w, viewport_h);
        } else {
            self.set_view_clamped(
                self.state.view.zoom,
                self.state.view.offset_x,
                self.state.view.offset_y,
                viewport_w,
                viewport_h,
            );
        }
    }

    /// Snap to the given zoom and center the city. The centered offset is
    /// written clamp-exempt: at min zoom the clamp range collapses to
    /// `[0, 0]`, which would pin the city to the top-left instead.
    fn center(&mut self, zoom: f64, viewport_w: f64, viewport_h: f64) {
        let (ox, oy) = view::center_offset(
            zoom,
            viewport_w,
            viewport_h,
            self.state.city_size,
            self.unit(),
        );
        let next = ViewState {
            zoom,
            offset_x: ox,
            offset_y: oy,
            ..self.state.view
        };
        if next != self.state.view {
            self.state.view = next;
            self.dirty.view = true;
        }
    }
}
