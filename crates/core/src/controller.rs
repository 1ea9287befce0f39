//! Translates wheel/drag/keyboard/slider/button events into clamped
//! state mutations on the [`MapStore`].
//!
//! Stateless interactions (wheel, discrete steps, slider) are free
//! functions; the drag sessions and the continuous-repeat timer carry
//! state and live on [`Controller`]. Drag moves always recompute from the
//! start-of-drag snapshot so floating-point error never accumulates
//! across move events.

use crate::model::view;
use crate::store::MapStore;
use crate::views::minimap;

/// Discrete pan distance in screen pixels per key press or button click.
pub const PAN_STEP_PX: f64 = 80.0;
/// Multiplicative zoom change per key press or button click.
pub const ZOOM_STEP: f64 = 1.2;
/// Fractional zoom change per wheel notch.
pub const WHEEL_ZOOM_INTENSITY: f64 = 0.1;
/// Seconds between repeats of a held pan/zoom button.
pub const REPEAT_INTERVAL: f64 = 0.06;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanDirection {
    Up,
    Down,
    Left,
    Right,
}

impl PanDirection {
    /// Offset delta for one step. Panning "up" moves the content down,
    /// revealing the area above, so the offset grows.
    fn offset_delta(self) -> (f64, f64) {
        match self {
            PanDirection::Up => (0.0, PAN_STEP_PX),
            PanDirection::Down => (0.0, -PAN_STEP_PX),
            PanDirection::Left => (PAN_STEP_PX, 0.0),
            PanDirection::Right => (-PAN_STEP_PX, 0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

/// One held-button action being repeated at a fixed interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RepeatAction {
    Pan(PanDirection),
    Zoom(ZoomDirection),
}

/// Drag-session state machine shared by the main-canvas pan, the minimap
/// navigation drag, and the minimap resize handles. `Idle → Active` on
/// press (capturing the start snapshot), `Active → Idle` on release.
/// Presses while `Active` are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Active {
        start_x: f64,
        start_y: f64,
        start_offset_x: f64,
        start_offset_y: f64,
    },
}

/// Which minimap edge a resize drag grabbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeAxis {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ResizeDrag {
    axis: ResizeAxis,
    start: f64,
    start_size: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Repeat {
    action: RepeatAction,
    last_tick: f64,
}

/// Zoom by ±10% keeping the world point under the cursor fixed, then
/// clamp. `cursor` is in viewport-local pixels.
pub fn wheel_zoom(
    store: &mut MapStore,
    zoom_in: bool,
    cursor: (f64, f64),
    viewport_w: f64,
    viewport_h: f64,
) {
    let bounds = store.bounds(viewport_w, viewport_h);
    let factor = if zoom_in {
        1.0 + WHEEL_ZOOM_INTENSITY
    } else {
        1.0 - WHEEL_ZOOM_INTENSITY
    };
    let new_zoom = bounds.clamp(store.view().zoom * factor);
    let (ox, oy) = view::zoom_to_point(store.view(), new_zoom, cursor.0, cursor.1);
    store.set_view_clamped(new_zoom, ox, oy, viewport_w, viewport_h);
}

/// One discrete pan step. Returns whether the offset actually moved.
pub fn pan_step(
    store: &mut MapStore,
    direction: PanDirection,
    viewport_w: f64,
    viewport_h: f64,
) -> bool {
    let (dx, dy) = direction.offset_delta();
    store.set_offset_clamped(
        store.view().offset_x + dx,
        store.view().offset_y + dy,
        viewport_w,
        viewport_h,
    )
}

/// One discrete zoom step (×1.2 / ÷1.2) about the viewport center.
/// Returns whether the zoom actually changed.
pub fn zoom_step(
    store: &mut MapStore,
    direction: ZoomDirection,
    viewport_w: f64,
    viewport_h: f64,
) -> bool {
    let bounds = store.bounds(viewport_w, viewport_h);
    let new_zoom = match direction {
        ZoomDirection::In => bounds.clamp(store.view().zoom * ZOOM_STEP),
        ZoomDirection::Out => bounds.clamp(store.view().zoom / ZOOM_STEP),
    };
    apply_zoom_about_center(store, new_zoom, viewport_w, viewport_h)
}

/// Apply a normalized [0, 1] slider position as a zoom level
/// (logarithmic mapping), re-centered on the current viewport center.
pub fn apply_slider(store: &mut MapStore, t: f64, viewport_w: f64, viewport_h: f64) {
    let bounds = store.bounds(viewport_w, viewport_h);
    let new_zoom = view::slider_to_zoom(t, &bounds);
    apply_zoom_about_center(store, new_zoom, viewport_w, viewport_h);
}

/// Current slider position for the stored zoom.
pub fn slider_value(store: &MapStore, viewport_w: f64, viewport_h: f64) -> f64 {
    let bounds = store.bounds(viewport_w, viewport_h);
    view::zoom_to_slider(store.view().zoom, &bounds)
}

fn apply_zoom_about_center(
    store: &mut MapStore,
    new_zoom: f64,
    viewport_w: f64,
    viewport_h: f64,
) -> bool {
    let before = store.view().zoom;
    let center = (viewport_w / 2.0, viewport_h / 2.0);
    let (ox, oy) = view::zoom_to_point(store.view(), new_zoom, center.0, center.1);
    store.set_view_clamped(new_zoom, ox, oy, viewport_w, viewport_h);
    store.view().zoom != before
}

/// Owns the drag state machines and the continuous-repeat timer.
#[derive(Debug, Clone, Default)]
pub struct Controller {
    pan_drag: DragState,
    minimap_drag: DragState,
    minimap_resize: Option<ResizeDrag>,
    repeat: Option<Repeat>,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Main-canvas pan drag ───────────────────────────────────────────

    pub fn begin_pan(&mut self, store: &mut MapStore, px: f64, py: f64) {
        if matches!(self.pan_drag, DragState::Active { .. }) {
            return;
        }
        self.pan_drag = DragState::Active {
            start_x: px,
            start_y: py,
            start_offset_x: store.view().offset_x,
            start_offset_y: store.view().offset_y,
        };
        store.set_panning(true, px, py);
    }

    /// Recompute the offset from the drag-start snapshot, not the
    /// previous move, then clamp.
    pub fn pan_move(
        &mut self,
        store: &mut MapStore,
        px: f64,
        py: f64,
        viewport_w: f64,
        viewport_h: f64,
    ) {
        let DragState::Active {
            start_x,
            start_y,
            start_offset_x,
            start_offset_y,
        } = self.pan_drag
        else {
            return;
        };
        store.set_offset_clamped(
            start_offset_x + (px - start_x),
            start_offset_y + (py - start_y),
            viewport_w,
            viewport_h,
        );
    }

    pub fn end_pan(&mut self, store: &mut MapStore) {
        if matches!(self.pan_drag, DragState::Active { .. }) {
            self.pan_drag = DragState::Idle;
            store.set_panning(false, 0.0, 0.0);
        }
    }

    pub fn is_panning(&self) -> bool {
        matches!(self.pan_drag, DragState::Active { .. })
    }

    // ── Minimap navigation drag ────────────────────────────────────────

    /// Press on the minimap: recenter immediately and enter the drag so
    /// subsequent moves keep recentering.
    pub fn begin_minimap_drag(
        &mut self,
        store: &mut MapStore,
        local_x: f64,
        local_y: f64,
        viewport_w: f64,
        viewport_h: f64,
    ) {
        if matches!(self.minimap_drag, DragState::Active { .. }) {
            return;
        }
        self.minimap_drag = DragState::Active {
            start_x: local_x,
            start_y: local_y,
            start_offset_x: store.view().offset_x,
            start_offset_y: store.view().offset_y,
        };
        self.minimap_move(store, local_x, local_y, viewport_w, viewport_h);
    }

    pub fn minimap_move(
        &mut self,
        store: &mut MapStore,
        local_x: f64,
        local_y: f64,
        viewport_w: f64,
        viewport_h: f64,
    ) {
        if !matches!(self.minimap_drag, DragState::Active { .. }) {
            return;
        }
        let geom = minimap::geometry(store.city_size(), store.unit(), store.minimap_max_size());
        let (ox, oy) = minimap::center_view_offsets(
            &geom,
            store.view().zoom,
            local_x,
            local_y,
            viewport_w,
            viewport_h,
        );
        store.set_offset_clamped(ox, oy, viewport_w, viewport_h);
    }

    pub fn end_minimap_drag(&mut self) {
        self.minimap_drag = DragState::Idle;
    }

    pub fn is_minimap_dragging(&self) -> bool {
        matches!(self.minimap_drag, DragState::Active { .. })
    }

    // ── Minimap resize handles ─────────────────────────────────────────

    pub fn begin_minimap_resize(&mut self, store: &MapStore, axis: ResizeAxis, pointer: f64) {
        if self.minimap_resize.is_some() {
            return;
        }
        self.minimap_resize = Some(ResizeDrag {
            axis,
            start: pointer,
            start_size: store.minimap_max_size(),
        });
    }

    /// Dragging the left/top handle away from the minimap grows it, so
    /// the delta sign is inverted.
    pub fn minimap_resize_move(&mut self, store: &mut MapStore, pointer: f64) {
        let Some(drag) = self.minimap_resize else {
            return;
        };
        let delta = drag.start - pointer;
        store.set_minimap_max_size(drag.start_size + delta);
    }

    pub fn end_minimap_resize(&mut self) {
        self.minimap_resize = None;
    }

    pub fn minimap_resize_axis(&self) -> Option<ResizeAxis> {
        self.minimap_resize.map(|d| d.axis)
    }

    // ── Continuous pan/zoom repeat ─────────────────────────────────────

    /// Begin repeating `action` every [`REPEAT_INTERVAL`] seconds. The
    /// first repeat fires one interval after `now`; the press itself
    /// already applied a single step.
    pub fn start_repeat(&mut self, action: RepeatAction, now: f64) {
        match self.repeat {
            Some(r) if r.action == action => {}
            _ => self.repeat = Some(Repeat {
                action,
                last_tick: now,
            }),
        }
    }

    pub fn stop_repeat(&mut self) {
        self.repeat = None;
    }

    pub fn repeat_active(&self) -> bool {
        self.repeat.is_some()
    }

    /// Advance the repeat timer. Fires at most one step per call; if the
    /// step produces no change (already at the clamp or zoom boundary)
    /// the repeat self-terminates rather than busy-looping at the edge.
    pub fn tick(&mut self, store: &mut MapStore, now: f64, viewport_w: f64, viewport_h: f64) {
        let Some(repeat) = &mut self.repeat else {
            return;
        };
        if now - repeat.last_tick < REPEAT_INTERVAL {
            return;
        }
        repeat.last_tick = now;
        let changed = match repeat.action {
            RepeatAction::Pan(dir) => pan_step(store, dir, viewport_w, viewport_h),
            RepeatAction::Zoom(dir) => zoom_step(store, dir, viewport_w, viewport_h),
        };
        if !changed {
            self.repeat = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CitySize;

    const VW: f64 = 1000.0;
    const VH: f64 = 800.0;

    fn zoomed_in_store() -> MapStore {
        let mut store = MapStore::new();
        store.ensure_fit(VW, VH);
        // Zoom in well past min so panning has room on both axes.
        let zoom = store.bounds(VW, VH).min_zoom * 8.0;
        store.set_view_clamped(zoom, -4000.0, -3000.0, VW, VH);
        store
    }

    #[test]
    fn wheel_zoom_keeps_cursor_anchored() {
        let mut store = zoomed_in_store();
        let cursor = (330.0, 410.0);
        let before = store.view().screen_to_world(cursor.0, cursor.1);
        wheel_zoom(&mut store, true, cursor, VW, VH);
        let after = store.view().screen_to_world(cursor.0, cursor.1);
        assert!((before.0 - after.0).abs() < 1e-6);
        assert!((before.1 - after.1).abs() < 1e-6);
    }

    #[test]
    fn wheel_zoom_clamps_at_max() {
        let mut store = zoomed_in_store();
        let bounds = store.bounds(VW, VH);
        for _ in 0..200 {
            wheel_zoom(&mut store, true, (500.0, 400.0), VW, VH);
        }
        assert!((store.view().zoom - bounds.max_zoom).abs() < 1e-9);
    }

    #[test]
    fn drag_recomputes_from_start_snapshot() {
        let mut store = zoomed_in_store();
        let mut ctl = Controller::new();
        let start = *store.view();
        ctl.begin_pan(&mut store, 100.0, 100.0);
        assert!(store.view().is_panning);
        // Many jittery moves ending back at a net delta of (+7, -3).
        for i in 0..500 {
            let wobble = f64::from(i % 13) * 0.37;
            ctl.pan_move(&mut store, 100.0 + wobble, 100.0 - wobble, VW, VH);
        }
        ctl.pan_move(&mut store, 107.0, 97.0, VW, VH);
        assert!((store.view().offset_x - (start.offset_x + 7.0)).abs() < 1e-12);
        assert!((store.view().offset_y - (start.offset_y - 3.0)).abs() < 1e-12);
        ctl.end_pan(&mut store);
        assert!(!store.view().is_panning);
    }

    #[test]
    fn reentrant_press_is_ignored_while_active() {
        let mut store = zoomed_in_store();
        let mut ctl = Controller::new();
        ctl.begin_pan(&mut store, 10.0, 10.0);
        let snapshot = ctl.pan_drag;
        ctl.begin_pan(&mut store, 999.0, 999.0);
        assert_eq!(ctl.pan_drag, snapshot);
    }

    #[test]
    fn repeat_fires_on_interval_and_stops_at_boundary() {
        let mut store = zoomed_in_store();
        let mut ctl = Controller::new();
        // Pan left increases offset_x toward its max of 0.
        ctl.start_repeat(RepeatAction::Pan(PanDirection::Left), 0.0);
        let mut now = 0.0;
        let mut steps = 0;
        while ctl.repeat_active() && steps < 10_000 {
            now += REPEAT_INTERVAL;
            ctl.tick(&mut store, now, VW, VH);
            steps += 1;
        }
        assert!(steps < 10_000, "repeat never self-terminated");
        assert_eq!(store.view().offset_x, 0.0);
        assert!(!ctl.repeat_active());
    }

    #[test]
    fn repeat_respects_interval() {
        let mut store = zoomed_in_store();
        let mut ctl = Controller::new();
        let before = store.view().offset_x;
        ctl.start_repeat(RepeatAction::Pan(PanDirection::Left), 0.0);
        ctl.tick(&mut store, REPEAT_INTERVAL / 2.0, VW, VH);
        assert_eq!(store.view().offset_x, before, "fired before the interval");
        ctl.tick(&mut store, REPEAT_INTERVAL, VW, VH);
        assert!(store.view().offset_x > before);
    }

    #[test]
    fn zoom_step_centers_on_viewport_center() {
        let mut store = zoomed_in_store();
        let center = (VW / 2.0, VH / 2.0);
        let before = store.view().screen_to_world(center.0, center.1);
        assert!(zoom_step(&mut store, ZoomDirection::In, VW, VH));
        let after = store.view().screen_to_world(center.0, center.1);
        assert!((before.0 - after.0).abs() < 1e-6);
        assert!((before.1 - after.1).abs() < 1e-6);
    }

    #[test]
    fn slider_maps_full_range() {
        let mut store = zoomed_in_store();
        let bounds = store.bounds(VW, VH);
        apply_slider(&mut store, 1.0, VW, VH);
        assert!((store.view().zoom - bounds.max_zoom).abs() < 1e-9);
        apply_slider(&mut store, 0.0, VW, VH);
        assert!((store.view().zoom - bounds.min_zoom).abs() < 1e-9);
        apply_slider(&mut store, 0.5, VW, VH);
        let expected = (bounds.min_zoom * bounds.max_zoom).sqrt();
        assert!((store.view().zoom - expected).abs() < 1e-9);
    }

    #[test]
    fn resize_handle_inverts_delta_and_clamps() {
        let mut store = MapStore::new();
        let mut ctl = Controller::new();
        ctl.begin_minimap_resize(&store, ResizeAxis::Horizontal, 500.0);
        // Dragging left (smaller x) grows the minimap.
        ctl.minimap_resize_move(&mut store, 440.0);
        assert_eq!(store.minimap_max_size(), 240.0);
        // Far beyond the limit clamps.
        ctl.minimap_resize_move(&mut store, -5000.0);
        assert_eq!(store.minimap_max_size(), crate::store::MINIMAP_MAX_SIZE);
        ctl.end_minimap_resize();
        assert!(ctl.minimap_resize_axis().is_none());
    }

    #[test]
    fn city_size_change_while_fit_recenters() {
        let mut store = MapStore::new();
        store.ensure_fit(VW, VH);
        store.set_city_size(CitySize::new(40.0, 5.0), VW, VH);
        let bounds = store.bounds(VW, VH);
        assert!((store.view().zoom - bounds.min_zoom).abs() < 1e-12);
    }
}
