//! Bridge for a JS host that brings its own canvas: the host forwards
//! pointer/wheel/key events in, reads render commands back as JSON, and
//! owns the persistence store (IndexedDB, localStorage, whatever).

use std::sync::Mutex;

use city_canvas_core::controller::{self, Controller, PanDirection, RepeatAction, ZoomDirection};
use city_canvas_core::model::CitySize;
use city_canvas_core::store::{MapStore, PERSIST_KEYS};
use city_canvas_core::views::{grid, minimap, scale_bar};
use city_canvas_protocol::Viewport;
use wasm_bindgen::prelude::*;

#[derive(Default)]
struct Session {
    store: MapStore,
    controller: Controller,
}

static SESSION: Mutex<Option<Session>> = Mutex::new(None);

fn with_session<R>(f: impl FnOnce(&mut Session) -> Result<R, JsError>) -> Result<R, JsError> {
    let mut guard = SESSION.lock().unwrap_or_else(|e| e.into_inner());
    f(guard.get_or_insert_with(Session::default))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, JsError> {
    serde_json::to_string(value).map_err(|e| JsError::new(&e.to_string()))
}

fn parse_pan(direction: &str) -> Result<PanDirection, JsError> {
    match direction {
        "up" => Ok(PanDirection::Up),
        "down" => Ok(PanDirection::Down),
        "left" => Ok(PanDirection::Left),
        "right" => Ok(PanDirection::Right),
        other => Err(JsError::new(&format!("unknown pan direction: {other}"))),
    }
}

fn parse_zoom(direction: &str) -> Result<ZoomDirection, JsError> {
    match direction {
        "in" => Ok(ZoomDirection::In),
        "out" => Ok(ZoomDirection::Out),
        other => Err(JsError::new(&format!("unknown zoom direction: {other}"))),
    }
}

/// Discard any existing session and start fresh with defaults.
#[wasm_bindgen]
pub fn reset() {
    let mut guard = SESSION.lock().unwrap_or_else(|e| e.into_inner());
    *guard = Some(Session::default());
}

/// Load one persisted value (JSON) before the first layout. Unknown keys
/// and undecodable values are errors the host may ignore.
#[wasm_bindgen]
pub fn load_persisted(key: &str, json: &str) -> Result<(), JsError> {
    with_session(|s| {
        s.store
            .apply_persisted(key, json)
            .map_err(|e| JsError::new(&e.to_string()))
    })
}

/// Establish the view invariants for the given viewport. Call once after
/// loading persisted state and again on every canvas resize.
#[wasm_bindgen]
pub fn ensure_fit(viewport_w: f64, viewport_h: f64) -> Result<(), JsError> {
    with_session(|s| {
        s.store.ensure_fit(viewport_w, viewport_h);
        Ok(())
    })
}

/// Current `{ offset_x, offset_y, zoom, ... }` as JSON.
#[wasm_bindgen]
pub fn view_state() -> Result<String, JsError> {
    with_session(|s| to_json(s.store.view()))
}

/// Render commands for the main grid surface, as JSON.
#[wasm_bindgen]
pub fn render_grid(viewport_w: f64, viewport_h: f64, dpr: f64) -> Result<String, JsError> {
    with_session(|s| {
        let viewport = Viewport {
            width: viewport_w,
            height: viewport_h,
            dpr,
        };
        let commands = grid::render_grid(
            s.store.city_size(),
            s.store.unit(),
            s.store.view(),
            &viewport,
        );
        to_json(&commands)
    })
}

/// Render commands for the minimap surface (minimap-local coordinates).
#[wasm_bindgen]
pub fn render_minimap(viewport_w: f64, viewport_h: f64) -> Result<String, JsError> {
    with_session(|s| {
        let viewport = Viewport::new(viewport_w, viewport_h);
        let commands = minimap::render_minimap(
            s.store.city_size(),
            s.store.unit(),
            s.store.view(),
            s.store.minimap_max_size(),
            &viewport,
        );
        to_json(&commands)
    })
}

/// Minimap panel size in pixels, `[width, height]`, so the host can place
/// and size its canvas element.
#[wasm_bindgen]
pub fn minimap_size() -> Result<Vec<f64>, JsError> {
    with_session(|s| {
        let geom = minimap::geometry(
            s.store.city_size(),
            s.store.unit(),
            s.store.minimap_max_size(),
        );
        Ok(vec![geom.width, geom.height])
    })
}

/// The selected scale bar `{ length_px, label }` as JSON.
#[wasm_bindgen]
pub fn scale_bar_spec() -> Result<String, JsError> {
    with_session(|s| to_json(&scale_bar::select(s.store.view().zoom, s.store.unit())))
}

// ── Interaction ────────────────────────────────────────────────────────

#[wasm_bindgen]
pub fn wheel_zoom(
    zoom_in: bool,
    cursor_x: f64,
    cursor_y: f64,
    viewport_w: f64,
    viewport_h: f64,
) -> Result<(), JsError> {
    with_session(|s| {
        controller::wheel_zoom(
            &mut s.store,
            zoom_in,
            (cursor_x, cursor_y),
            viewport_w,
            viewport_h,
        );
        Ok(())
    })
}

#[wasm_bindgen]
pub fn begin_pan(x: f64, y: f64) -> Result<(), JsError> {
    with_session(|s| {
        s.controller.begin_pan(&mut s.store, x, y);
        Ok(())
    })
}

#[wasm_bindgen]
pub fn pan_move(x: f64, y: f64, viewport_w: f64, viewport_h: f64) -> Result<(), JsError> {
    with_session(|s| {
        s.controller.pan_move(&mut s.store, x, y, viewport_w, viewport_h);
        Ok(())
    })
}

#[wasm_bindgen]
pub fn end_pan() -> Result<(), JsError> {
    with_session(|s| {
        s.controller.end_pan(&mut s.store);
        Ok(())
    })
}

/// Pointer down on the minimap, coordinates local to the minimap panel.
#[wasm_bindgen]
pub fn begin_minimap_drag(
    local_x: f64,
    local_y: f64,
    viewport_w: f64,
    viewport_h: f64,
) -> Result<(), JsError> {
    with_session(|s| {
        s.controller
            .begin_minimap_drag(&mut s.store, local_x, local_y, viewport_w, viewport_h);
        Ok(())
    })
}

#[wasm_bindgen]
pub fn minimap_move(
    local_x: f64,
    local_y: f64,
    viewport_w: f64,
    viewport_h: f64,
) -> Result<(), JsError> {
    with_session(|s| {
        s.controller
            .minimap_move(&mut s.store, local_x, local_y, viewport_w, viewport_h);
        Ok(())
    })
}

#[wasm_bindgen]
pub fn end_minimap_drag() -> Result<(), JsError> {
    with_session(|s| {
        s.controller.end_minimap_drag();
        Ok(())
    })
}

/// `axis` is "horizontal" (left handle) or "vertical" (top handle);
/// `pointer` is the matching page coordinate.
#[wasm_bindgen]
pub fn begin_minimap_resize(axis: &str, pointer: f64) -> Result<(), JsError> {
    with_session(|s| {
        let axis = match axis {
            "horizontal" => controller::ResizeAxis::Horizontal,
            "vertical" => controller::ResizeAxis::Vertical,
            other => return Err(JsError::new(&format!("unknown resize axis: {other}"))),
        };
        s.controller.begin_minimap_resize(&s.store, axis, pointer);
        Ok(())
    })
}

#[wasm_bindgen]
pub fn minimap_resize_move(pointer: f64) -> Result<(), JsError> {
    with_session(|s| {
        s.controller.minimap_resize_move(&mut s.store, pointer);
        Ok(())
    })
}

#[wasm_bindgen]
pub fn end_minimap_resize() -> Result<(), JsError> {
    with_session(|s| {
        s.controller.end_minimap_resize();
        Ok(())
    })
}

/// One keyboard/button pan step.
#[wasm_bindgen]
pub fn pan_step(direction: &str, viewport_w: f64, viewport_h: f64) -> Result<bool, JsError> {
    with_session(|s| {
        let dir = parse_pan(direction)?;
        Ok(controller::pan_step(&mut s.store, dir, viewport_w, viewport_h))
    })
}

/// One keyboard/button zoom step about the viewport center.
#[wasm_bindgen]
pub fn zoom_step(direction: &str, viewport_w: f64, viewport_h: f64) -> Result<bool, JsError> {
    with_session(|s| {
        let dir = parse_zoom(direction)?;
        Ok(controller::zoom_step(&mut s.store, dir, viewport_w, viewport_h))
    })
}

/// Start repeating a held button: `kind` is "pan" or "zoom", `direction`
/// as in [`pan_step`]/[`zoom_step`]. `now` is seconds (monotonic).
#[wasm_bindgen]
pub fn start_repeat(kind: &str, direction: &str, now: f64) -> Result<(), JsError> {
    with_session(|s| {
        let action = match kind {
            "pan" => RepeatAction::Pan(parse_pan(direction)?),
            "zoom" => RepeatAction::Zoom(parse_zoom(direction)?),
            other => return Err(JsError::new(&format!("unknown repeat kind: {other}"))),
        };
        s.controller.start_repeat(action, now);
        Ok(())
    })
}

#[wasm_bindgen]
pub fn stop_repeat() -> Result<(), JsError> {
    with_session(|s| {
        s.controller.stop_repeat();
        Ok(())
    })
}

/// Advance the repeat timer; the host calls this from its animation
/// frame. Returns whether a repeat is still running (so the host knows
/// to keep scheduling frames).
#[wasm_bindgen]
pub fn tick(now: f64, viewport_w: f64, viewport_h: f64) -> Result<bool, JsError> {
    with_session(|s| {
        s.controller.tick(&mut s.store, now, viewport_w, viewport_h);
        Ok(s.controller.repeat_active())
    })
}

/// Logarithmic zoom slider: apply a [0, 1] position.
#[wasm_bindgen]
pub fn apply_slider(t: f64, viewport_w: f64, viewport_h: f64) -> Result<(), JsError> {
    with_session(|s| {
        controller::apply_slider(&mut s.store, t, viewport_w, viewport_h);
        Ok(())
    })
}

/// Current slider position for the stored zoom.
#[wasm_bindgen]
pub fn slider_value(viewport_w: f64, viewport_h: f64) -> Result<f64, JsError> {
    with_session(|s| Ok(controller::slider_value(&s.store, viewport_w, viewport_h)))
}

// ── Settings ───────────────────────────────────────────────────────────

#[wasm_bindgen]
pub fn set_city_size(x: f64, y: f64, viewport_w: f64, viewport_h: f64) -> Result<(), JsError> {
    with_session(|s| {
        s.store
            .set_city_size(CitySize::new(x, y), viewport_w, viewport_h);
        Ok(())
    })
}

#[wasm_bindgen]
pub fn toggle_unit(viewport_w: f64, viewport_h: f64) -> Result<String, JsError> {
    with_session(|s| {
        s.store.toggle_unit(viewport_w, viewport_h);
        Ok(s.store.unit().label.to_string())
    })
}

#[wasm_bindgen]
pub fn set_minimap_max_size(px: f64) -> Result<(), JsError> {
    with_session(|s| {
        s.store.set_minimap_max_size(px);
        Ok(())
    })
}

// ── Persistence observer ───────────────────────────────────────────────

/// Drain the dirty flags: returns the keys whose values changed since the
/// last drain, as a JSON string array. The host follows up with
/// [`persist_value`] for each.
#[wasm_bindgen]
pub fn dirty_keys() -> Result<String, JsError> {
    with_session(|s| {
        let dirty = s.store.take_dirty();
        let keys: Vec<&str> = PERSIST_KEYS
            .into_iter()
            .zip([
                dirty.view,
                dirty.city_size,
                dirty.unit_index,
                dirty.minimap_max_size,
            ])
            .filter_map(|(key, is_dirty)| is_dirty.then_some(key))
            .collect();
        to_json(&keys)
    })
}

/// Serialize one persisted key's current value for the host's store.
#[wasm_bindgen]
pub fn persist_value(key: &str) -> Result<String, JsError> {
    with_session(|s| {
        s.store
            .to_persist(key)
            .map_err(|e| JsError::new(&e.to_string()))
    })
}
