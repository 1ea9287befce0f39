use city_canvas_protocol::{Rect, RenderCommand, ThemeToken, Viewport};

use crate::model::city::CitySize;
use crate::model::units::Unit;
use crate::model::view::ViewState;

/// Padding between the minimap frame and the city drawing, px.
pub const MINIMAP_BORDER: f64 = 8.0;

/// Resize handle dimensions, px.
const HANDLE_LENGTH: f64 = 28.0;
const HANDLE_THICKNESS: f64 = 4.0;

/// Resolved minimap layout for one city/unit/max-size combination.
///
/// `width`/`height` are the overall panel dimensions; the city occupies
/// `draw_width × draw_height` starting at `(offset_x, offset_y)`. `scale`
/// converts world meters to minimap pixels and is uniform on both axes,
/// so the city's aspect ratio is always preserved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinimapGeometry {
    pub width: f64,
    pub height: f64,
    pub draw_width: f64,
    pub draw_height: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    pub scale: f64,
}

/// Fit the city into a square of side `max_size` (minus the border),
/// preserving aspect ratio. The longer city axis spans the full
/// available extent; the shorter one shrinks proportionally.
pub fn geometry(city: CitySize, unit: &Unit, max_size: f64) -> MinimapGeometry {
    let (city_w_m, city_h_m) = city.meters(unit);
    let available = (max_size - 2.0 * MINIMAP_BORDER).max(1.0);
    let scale = (available / city_w_m).min(available / city_h_m);
    let draw_width = city_w_m * scale;
    let draw_height = city_h_m * scale;
    MinimapGeometry {
        width: draw_width + 2.0 * MINIMAP_BORDER,
        height: draw_height + 2.0 * MINIMAP_BORDER,
        draw_width,
        draw_height,
        offset_x: MINIMAP_BORDER,
        offset_y: MINIMAP_BORDER,
        scale,
    }
}

/// Minimap-local rectangle covering the part of the city currently
/// visible in the main viewport.
///
/// When the whole city fits on an axis the indicator spans the full city
/// extent on that axis instead of overshooting; otherwise it is clamped
/// inside the city drawing so a pre-clamp offset mid-gesture never paints
/// the indicator over the border.
pub fn viewport_rect(geom: &MinimapGeometry, view: &ViewState, main_viewport: &Viewport) -> Rect {
    // Visible world region in meters, top-left plus extent.
    let world_x = -view.offset_x / view.zoom;
    let world_y = -view.offset_y / view.zoom;
    let world_w = main_viewport.width / view.zoom;
    let world_h = main_viewport.height / view.zoom;

    let (x, w) = project_axis(world_x, world_w, geom.draw_width, geom.scale);
    let (y, h) = project_axis(world_y, world_h, geom.draw_height, geom.scale);
    Rect::new(geom.offset_x + x, geom.offset_y + y, w, h)
}

fn project_axis(world_pos: f64, world_extent: f64, draw_extent: f64, scale: f64) -> (f64, f64) {
    let extent = world_extent * scale;
    if extent >= draw_extent {
        return (0.0, draw_extent);
    }
    let pos = (world_pos * scale).clamp(0.0, draw_extent - extent);
    (pos, extent)
}

/// Pre-clamp main-view offsets that center the world point under minimap
/// pixel `(local_x, local_y)` in the main viewport. The caller clamps.
pub fn center_view_offsets(
    geom: &MinimapGeometry,
    zoom: f64,
    local_x: f64,
    local_y: f64,
    viewport_w: f64,
    viewport_h: f64,
) -> (f64, f64) {
    let world_x = (local_x - geom.offset_x) / geom.scale;
    let world_y = (local_y - geom.offset_y) / geom.scale;
    (
        viewport_w / 2.0 - world_x * zoom,
        viewport_h / 2.0 - world_y * zoom,
    )
}

/// Render the minimap panel: frame, city fill, a dimming mask over the
/// off-screen portion, the viewport indicator, and the two resize
/// handles. Coordinates are minimap-local; the host positions the panel.
pub fn render_minimap(
    city: CitySize,
    unit: &Unit,
    view: &ViewState,
    max_size: f64,
    main_viewport: &Viewport,
) -> Vec<RenderCommand> {
    let geom = geometry(city, unit, max_size);
    let view_rect = viewport_rect(&geom, view, main_viewport);

    let mut commands = Vec::with_capacity(12);
    commands.push(RenderCommand::BeginGroup {
        id: "minimap".into(),
        label: Some("Minimap".into()),
    });

    commands.push(RenderCommand::DrawRect {
        rect: Rect::new(0.0, 0.0, geom.width, geom.height),
        color: ThemeToken::Surface,
        border_color: Some(ThemeToken::MinimapBorder),
    });
    let city_rect = Rect::new(geom.offset_x, geom.offset_y, geom.draw_width, geom.draw_height);
    commands.push(RenderCommand::DrawRect {
        rect: city_rect,
        color: ThemeToken::MinimapCityFill,
        border_color: None,
    });

    push_mask(&mut commands, city_rect, view_rect);

    commands.push(RenderCommand::DrawRect {
        rect: view_rect,
        color: ThemeToken::MinimapViewport,
        border_color: Some(ThemeToken::MinimapViewport),
    });

    // Resize handles on the left and top edges, centered.
    commands.push(RenderCommand::DrawRect {
        rect: Rect::new(
            0.0,
            (geom.height - HANDLE_LENGTH) / 2.0,
            HANDLE_THICKNESS,
            HANDLE_LENGTH,
        ),
        color: ThemeToken::MinimapHandle,
        border_color: None,
    });
    commands.push(RenderCommand::DrawRect {
        rect: Rect::new(
            (geom.width - HANDLE_LENGTH) / 2.0,
            0.0,
            HANDLE_LENGTH,
            HANDLE_THICKNESS,
        ),
        color: ThemeToken::MinimapHandle,
        border_color: None,
    });

    commands.push(RenderCommand::EndGroup);
    commands
}

/// Dim everything in `city` outside `inner` with up to four strips.
fn push_mask(commands: &mut Vec<RenderCommand>, city: Rect, inner: Rect) {
    let strips = [
        // Left and right of the indicator, full city height.
        Rect::new(city.x, city.y, inner.x - city.x, city.h),
        Rect::new(
            inner.right(),
            city.y,
            city.right() - inner.right(),
            city.h,
        ),
        // Above and below, spanning only the indicator's width.
        Rect::new(inner.x, city.y, inner.w, inner.y - city.y),
        Rect::new(
            inner.x,
            inner.bottom(),
            inner.w,
            city.bottom() - inner.bottom(),
        ),
    ];
    for strip in strips {
        if strip.w > f64::EPSILON && strip.h > f64::EPSILON {
            commands.push(RenderCommand::DrawRect {
                rect: strip,
                color: ThemeToken::MinimapMask,
                border_color: None,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::units::UNITS;
    use crate::model::view::ZoomBounds;

    const MILES: &Unit = &UNITS[0];
    const KM: &Unit = &UNITS[1];

    #[test]
    fn geometry_preserves_aspect_ratio() {
        let geom = geometry(CitySize::new(20.0, 10.0), KM, 200.0);
        assert!((geom.draw_width - 184.0).abs() < 1e-9);
        assert!((geom.draw_height - 92.0).abs() < 1e-9);
        assert!((geom.width - 200.0).abs() < 1e-9);
        assert!((geom.height - 108.0).abs() < 1e-9);
        let ratio = geom.draw_width / geom.draw_height;
        assert!((ratio - 2.0).abs() < 1e-9);
    }

    #[test]
    fn tall_city_limits_on_height() {
        let geom = geometry(CitySize::new(5.0, 25.0), KM, 300.0);
        assert!((geom.draw_height - 284.0).abs() < 1e-9);
        assert!((geom.draw_width - 284.0 / 5.0).abs() < 1e-9);
        assert!(geom.height > geom.width);
    }

    #[test]
    fn viewport_rect_spans_city_at_min_zoom() {
        let city = CitySize::new(15.0, 15.0);
        let vp = Viewport::new(1000.0, 800.0);
        let bounds = ZoomBounds::compute(city, MILES, vp.width, vp.height);
        let view = ViewState {
            zoom: bounds.min_zoom,
            ..ViewState::default()
        };
        let geom = geometry(city, MILES, 200.0);
        let rect = viewport_rect(&geom, &view, &vp);
        // Whole city visible on the tighter axis: indicator covers it.
        assert!((rect.h - geom.draw_height).abs() < 1e-9);
        assert!((rect.y - geom.offset_y).abs() < 1e-9);
        // The looser axis shows more than the city, so it collapses too.
        assert!((rect.w - geom.draw_width).abs() < 1e-9);
    }

    #[test]
    fn viewport_rect_tracks_offset_when_zoomed_in() {
        let city = CitySize::new(10.0, 10.0);
        let vp = Viewport::new(1000.0, 800.0);
        let zoom = 0.5; // city is 5000x5000 px, much larger than viewport
        let view = ViewState {
            zoom,
            offset_x: -2000.0,
            offset_y: -1000.0,
            ..ViewState::default()
        };
        let geom = geometry(city, KM, 200.0);
        let rect = viewport_rect(&geom, &view, &vp);
        let expected_x = geom.offset_x + (2000.0 / zoom) * geom.scale;
        let expected_w = (vp.width / zoom) * geom.scale;
        assert!((rect.x - expected_x).abs() < 1e-9);
        assert!((rect.w - expected_w).abs() < 1e-9);
        assert!(rect.x >= geom.offset_x);
        assert!(rect.right() <= geom.offset_x + geom.draw_width + 1e-9);
    }

    #[test]
    fn viewport_rect_never_escapes_city_drawing() {
        let city = CitySize::new(10.0, 10.0);
        let vp = Viewport::new(1000.0, 800.0);
        let geom = geometry(city, KM, 200.0);
        // Pre-clamp offsets way past the city edge.
        let view = ViewState {
            zoom: 0.5,
            offset_x: 9999.0,
            offset_y: -99999.0,
            ..ViewState::default()
        };
        let rect = viewport_rect(&geom, &view, &vp);
        assert!(rect.x >= geom.offset_x - 1e-9);
        assert!(rect.y >= geom.offset_y - 1e-9);
        assert!(rect.right() <= geom.offset_x + geom.draw_width + 1e-9);
        assert!(rect.bottom() <= geom.offset_y + geom.draw_height + 1e-9);
    }

    #[test]
    fn clicked_point_lands_at_viewport_center() {
        let city = CitySize::new(10.0, 10.0);
        let (vw, vh) = (1000.0, 800.0);
        let zoom = 0.5;
        let geom = geometry(city, KM, 200.0);
        // Click the middle of the city drawing.
        let local = (
            geom.offset_x + geom.draw_width / 2.0,
            geom.offset_y + geom.draw_height / 2.0,
        );
        let (ox, oy) = center_view_offsets(&geom, zoom, local.0, local.1, vw, vh);
        let view = ViewState {
            zoom,
            offset_x: ox,
            offset_y: oy,
            ..ViewState::default()
        };
        let (wx, wy) = view.screen_to_world(vw / 2.0, vh / 2.0);
        assert!((wx - 5000.0).abs() < 1e-6);
        assert!((wy - 5000.0).abs() < 1e-6);
    }

    #[test]
    fn render_emits_mask_and_indicator() {
        let city = CitySize::new(10.0, 10.0);
        let vp = Viewport::new(1000.0, 800.0);
        let view = ViewState {
            zoom: 0.5,
            offset_x: -2000.0,
            offset_y: -2000.0,
            ..ViewState::default()
        };
        let cmds = render_minimap(city, KM, &view, 200.0, &vp);
        let masks = cmds
            .iter()
            .filter(|c| matches!(c, RenderCommand::DrawRect { color, .. }
                if *color == ThemeToken::MinimapMask))
            .count();
        assert_eq!(masks, 4);
        assert!(cmds.iter().any(|c| matches!(c,
            RenderCommand::DrawRect { color, .. } if *color == ThemeToken::MinimapViewport)));
        let handles = cmds
            .iter()
            .filter(|c| matches!(c, RenderCommand::DrawRect { color, .. }
                if *color == ThemeToken::MinimapHandle))
            .count();
        assert_eq!(handles, 2);
    }
}
