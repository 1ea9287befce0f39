use city_canvas_protocol::{Point, Rect, RenderCommand, ThemeToken, Viewport};

use crate::model::city::CitySize;
use crate::model::units::Unit;
use crate::model::view::ViewState;

/// Screen-pixel stroke widths; divided by zoom inside the transform so
/// lines render at constant thickness at any zoom level.
const MINOR_WIDTH_PX: f64 = 1.0;
const MAJOR_WIDTH_PX: f64 = 2.0;

/// Loop guard against float error dropping the final grid line.
const GRID_EPSILON: f64 = 1e-4;

/// Render the coordinate grid for the main viewport.
///
/// Pushes a single affine transform combining pan, zoom, and the
/// vertical flip so world (0,0) is the city's bottom-left, then draws
/// the city background, minor grid lines every quarter main unit, and
/// heavier major lines every main unit. Pure — safe to re-invoke on
/// every state change.
pub fn render_grid(
    city: CitySize,
    unit: &Unit,
    view: &ViewState,
    _viewport: &Viewport,
) -> Vec<RenderCommand> {
    let (city_w_m, city_h_m) = city.meters(unit);
    if city_w_m <= 0.0 || city_h_m <= 0.0 {
        return Vec::new();
    }

    let major_dist = unit.scale;
    let minor_dist = unit.scale / 4.0;
    let line_estimate = ((city_w_m + city_h_m) / minor_dist) as usize + 8;
    let mut commands = Vec::with_capacity(line_estimate);

    commands.push(RenderCommand::BeginGroup {
        id: "city-grid".into(),
        label: Some("City grid".into()),
    });

    // World Y grows upward, screen Y downward: scale by -zoom and push
    // the origin down by the city's pixel height.
    commands.push(RenderCommand::PushTransform {
        translate: Point::new(view.offset_x, view.offset_y + city_h_m * view.zoom),
        scale: Point::new(view.zoom, -view.zoom),
    });

    commands.push(RenderCommand::DrawRect {
        rect: Rect::new(0.0, 0.0, city_w_m, city_h_m),
        color: ThemeToken::CityFill,
        border_color: None,
    });

    push_grid_lines(
        &mut commands,
        city_w_m,
        city_h_m,
        minor_dist,
        ThemeToken::GridMinor,
        MINOR_WIDTH_PX / view.zoom,
    );
    push_grid_lines(
        &mut commands,
        city_w_m,
        city_h_m,
        major_dist,
        ThemeToken::GridMajor,
        MAJOR_WIDTH_PX / view.zoom,
    );

    commands.push(RenderCommand::PopTransform);
    commands.push(RenderCommand::EndGroup);
    commands
}

fn push_grid_lines(
    commands: &mut Vec<RenderCommand>,
    city_w_m: f64,
    city_h_m: f64,
    spacing: f64,
    color: ThemeToken,
    width: f64,
) {
    let mut x = 0.0;
    while x <= city_w_m + GRID_EPSILON {
        commands.push(RenderCommand::DrawLine {
            from: Point::new(x, 0.0),
            to: Point::new(x, city_h_m),
            color,
            width,
        });
        x += spacing;
    }
    let mut y = 0.0;
    while y <= city_h_m + GRID_EPSILON {
        commands.push(RenderCommand::DrawLine {
            from: Point::new(0.0, y),
            to: Point::new(city_w_m, y),
            color,
            width,
        });
        y += spacing;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::units::UNITS;

    fn line_count(cmds: &[RenderCommand], token: ThemeToken) -> usize {
        cmds.iter()
            .filter(|c| matches!(c, RenderCommand::DrawLine { color, .. } if *color == token))
            .count()
    }

    #[test]
    fn one_km_city_has_expected_grid() {
        let km = &UNITS[1];
        let view = ViewState {
            zoom: 0.5,
            ..ViewState::default()
        };
        let vp = Viewport::new(800.0, 600.0);
        let cmds = render_grid(CitySize::new(1.0, 1.0), km, &view, &vp);

        // Quarter-unit lines at 0, 250, 500, 750, 1000 m on each axis.
        assert_eq!(line_count(&cmds, ThemeToken::GridMinor), 10);
        // Main-unit lines at 0 and 1000 m on each axis.
        assert_eq!(line_count(&cmds, ThemeToken::GridMajor), 4);
        assert!(
            cmds.iter()
                .any(|c| matches!(c, RenderCommand::DrawRect { color, .. }
                    if *color == ThemeToken::CityFill))
        );
    }

    #[test]
    fn line_width_compensates_for_zoom() {
        let km = &UNITS[1];
        let vp = Viewport::new(800.0, 600.0);
        for zoom in [0.1, 1.0, 4.0] {
            let view = ViewState {
                zoom,
                ..ViewState::default()
            };
            let cmds = render_grid(CitySize::new(2.0, 2.0), km, &view, &vp);
            let minor_width = cmds.iter().find_map(|c| match c {
                RenderCommand::DrawLine { color, width, .. }
                    if *color == ThemeToken::GridMinor =>
                {
                    Some(*width)
                }
                _ => None,
            });
            // width * zoom is the on-screen thickness.
            assert!((minor_width.unwrap_or(0.0) * zoom - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn transform_flips_vertical_axis() {
        let miles = &UNITS[0];
        let view = ViewState {
            offset_x: -40.0,
            offset_y: 25.0,
            zoom: 0.2,
            ..ViewState::default()
        };
        let vp = Viewport::new(800.0, 600.0);
        let cmds = render_grid(CitySize::new(3.0, 2.0), miles, &view, &vp);
        let Some(RenderCommand::PushTransform { translate, scale }) = cmds
            .iter()
            .find(|c| matches!(c, RenderCommand::PushTransform { .. }))
        else {
            panic!("grid must push its transform");
        };
        assert!((scale.x - 0.2).abs() < 1e-12);
        assert!((scale.y + 0.2).abs() < 1e-12);
        // World (0, 0) lands at screen (offset_x, offset_y + city_h_px):
        // the city's bottom-left.
        let city_h_px = 2.0 * miles.scale * view.zoom;
        assert!((translate.x - view.offset_x).abs() < 1e-12);
        assert!((translate.y - (view.offset_y + city_h_px)).abs() < 1e-9);
    }
}
