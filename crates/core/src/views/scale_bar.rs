use city_canvas_protocol::{Point, RenderCommand, TextAlign, ThemeToken, Viewport};
use serde::Serialize;

use crate::model::units::Unit;

/// Widest the bar is allowed to render, px.
pub const MAX_BAR_PX: f64 = 200.0;

/// End-tick height and label offset for the rendered widget, px.
const TICK_HEIGHT: f64 = 6.0;
const MARGIN: f64 = 16.0;
const LABEL_GAP: f64 = 8.0;
const LINE_WIDTH: f64 = 2.0;
const FONT_SIZE: f64 = 12.0;

/// Round sub-unit quantities, ascending. The scan stops at the first
/// entry that no longer fits, so order matters.
const SUB_QUANTITIES: [f64; 12] = [
    1.0, 2.0, 5.0, 10.0, 20.0, 50.0, 100.0, 200.0, 500.0, 1000.0, 1500.0, 2000.0,
];

/// Round main-unit quantities, used once the sub-unit pick reaches the
/// unit's switch-over threshold.
const MAIN_QUANTITIES: [f64; 9] = [0.25, 0.5, 1.0, 2.0, 5.0, 10.0, 20.0, 50.0, 100.0];

/// A selected scale bar: its on-screen length and caption.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScaleBarSpec {
    pub length_px: f64,
    pub label: String,
}

/// Pick the bar to show for the current zoom.
///
/// Scans the sub-unit quantities ascending and keeps the largest whose
/// rendered length fits in [`MAX_BAR_PX`]. When that pick reaches the
/// unit's threshold (2000 ft, 1000 m) the bar switches to main units and
/// the same scan runs over the main-unit quantities. If even the
/// smallest quantity overflows the budget it is used anyway so the bar
/// never disappears.
pub fn select(zoom: f64, unit: &Unit) -> ScaleBarSpec {
    let px_per_sub = unit.sub_scale * zoom;
    let quantity = largest_fitting(&SUB_QUANTITIES, px_per_sub);
    if quantity < unit.scale_bar_threshold {
        return ScaleBarSpec {
            length_px: quantity * px_per_sub,
            label: format!("{} {}", format_quantity(quantity), unit.sub),
        };
    }
    let px_per_main = unit.scale * zoom;
    let quantity = largest_fitting(&MAIN_QUANTITIES, px_per_main);
    ScaleBarSpec {
        length_px: quantity * px_per_main,
        label: format!("{} {}", format_quantity(quantity), unit.short),
    }
}

fn largest_fitting(quantities: &[f64], px_per_unit: f64) -> f64 {
    let mut best = quantities[0];
    for &q in quantities {
        if q * px_per_unit > MAX_BAR_PX {
            break;
        }
        best = q;
    }
    best
}

fn format_quantity(q: f64) -> String {
    if q.fract() == 0.0 {
        format!("{}", q as i64)
    } else {
        format!("{q}")
    }
}

/// Render the bar in the viewport's bottom-left corner: a horizontal
/// line with end ticks and the caption above it.
pub fn render_scale_bar(spec: &ScaleBarSpec, viewport: &Viewport) -> Vec<RenderCommand> {
    let x = MARGIN;
    let y = viewport.height - MARGIN;
    vec![
        RenderCommand::BeginGroup {
            id: "scale-bar".into(),
            label: None,
        },
        RenderCommand::DrawLine {
            from: Point::new(x, y),
            to: Point::new(x + spec.length_px, y),
            color: ThemeToken::ScaleBarLine,
            width: LINE_WIDTH,
        },
        RenderCommand::DrawLine {
            from: Point::new(x, y - TICK_HEIGHT),
            to: Point::new(x, y),
            color: ThemeToken::ScaleBarLine,
            width: LINE_WIDTH,
        },
        RenderCommand::DrawLine {
            from: Point::new(x + spec.length_px, y - TICK_HEIGHT),
            to: Point::new(x + spec.length_px, y),
            color: ThemeToken::ScaleBarLine,
            width: LINE_WIDTH,
        },
        RenderCommand::DrawText {
            position: Point::new(x + spec.length_px / 2.0, y - TICK_HEIGHT - LABEL_GAP),
            text: spec.label.clone(),
            color: ThemeToken::ScaleBarText,
            font_size: FONT_SIZE,
            align: TextAlign::Center,
        },
        RenderCommand::EndGroup,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::units::UNITS;

    const MILES: &Unit = &UNITS[0];
    const KM: &Unit = &UNITS[1];

    #[test]
    fn close_zoom_picks_sub_unit() {
        // At zoom 1 a foot is 0.3048 px: 500 ft = 152.4 px fits, 1000 ft
        // does not.
        let spec = select(1.0, MILES);
        assert_eq!(spec.label, "500 ft");
        assert!((spec.length_px - 152.4).abs() < 1e-9);
        assert!(spec.length_px <= MAX_BAR_PX);
    }

    #[test]
    fn far_zoom_switches_to_main_unit() {
        // At zoom 0.01 the full 2000 ft candidate fits, which crosses the
        // threshold into miles: 10 mi = 160.934 px.
        let spec = select(0.01, MILES);
        assert_eq!(spec.label, "10 mi");
        assert!((spec.length_px - 160.934).abs() < 1e-9);
    }

    #[test]
    fn metric_threshold_is_1000() {
        // 1000 m at zoom 0.1 is 100 px, so the sub pick reaches the
        // metric threshold and the bar reads in km.
        let spec = select(0.1, KM);
        assert_eq!(spec.label, "2 km");
        assert!((spec.length_px - 200.0).abs() < 1e-9);
    }

    #[test]
    fn fractional_main_quantities_keep_their_decimals() {
        // At zoom 0.3 a mile is 482.8 px, so only the quarter-mile
        // candidate fits.
        let spec = select(0.3, MILES);
        assert_eq!(spec.label, "0.25 mi");
        assert!((spec.length_px - 0.25 * 1609.34 * 0.3).abs() < 1e-9);
    }

    #[test]
    fn bar_never_disappears_at_extreme_zoom() {
        // Even when 1 ft is wider than the budget the smallest candidate
        // is returned.
        let spec = select(1000.0, MILES);
        assert_eq!(spec.label, "1 ft");
        assert!(spec.length_px > MAX_BAR_PX);
    }

    #[test]
    fn selection_is_monotone_in_zoom() {
        // Zooming out never shrinks the physical distance the bar spans.
        let mut last_meters = 0.0;
        for zoom in [2.0, 1.0, 0.5, 0.1, 0.05, 0.01] {
            let spec = select(zoom, KM);
            let meters = spec.length_px / zoom;
            assert!(meters >= last_meters, "zoom={zoom}");
            last_meters = meters;
        }
    }

    #[test]
    fn render_places_bar_at_bottom_left() {
        let vp = Viewport::new(1000.0, 800.0);
        let spec = select(1.0, MILES);
        let cmds = render_scale_bar(&spec, &vp);
        let Some(RenderCommand::DrawLine { from, to, .. }) = cmds
            .iter()
            .find(|c| matches!(c, RenderCommand::DrawLine { .. }))
        else {
            panic!("bar line missing");
        };
        assert_eq!(from.x, MARGIN);
        assert_eq!(from.y, vp.height - MARGIN);
        assert!((to.x - from.x - spec.length_px).abs() < 1e-9);
        assert!(cmds.iter().any(|c| matches!(c, RenderCommand::DrawText { text, .. }
            if *text == spec.label)));
    }
}
