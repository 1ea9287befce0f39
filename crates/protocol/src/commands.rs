use serde::{Deserialize, Serialize};

use crate::theme::ThemeToken;
use crate::types::{Point, Rect};

/// A single, stateless render instruction.
///
/// The core emits a `Vec<RenderCommand>` for each surface (main grid,
/// minimap, scale bar). Renderers consume the list sequentially — each
/// command carries all the data it needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RenderCommand {
    /// Draw a filled rectangle, optionally with a border.
    DrawRect {
        rect: Rect,
        color: ThemeToken,
        border_color: Option<ThemeToken>,
    },

    /// Draw a line segment. `width` is in the coordinate space of the
    /// active transform, so a width of `1.0 / zoom` renders one screen
    /// pixel wide regardless of zoom.
    DrawLine {
        from: Point,
        to: Point,
        color: ThemeToken,
        width: f64,
    },

    /// Draw a text string at a position.
    DrawText {
        position: Point,
        text: String,
        color: ThemeToken,
        font_size: f64,
        align: TextAlign,
    },

    /// Restrict subsequent drawing to a rectangular region.
    SetClip { rect: Rect },

    /// Remove the active clip region.
    ClearClip,

    /// Push an affine transform (applied to all subsequent commands until
    /// the matching `PopTransform`). Negative scale components are legal
    /// and flip the corresponding axis — the grid view uses a negative Y
    /// scale so world (0,0) sits at the city's bottom-left.
    PushTransform { translate: Point, scale: Point },

    /// Pop the most recent transform.
    PopTransform,

    /// Begin a logical group (e.g. the minimap). Renderers may use this
    /// for batching or layer separation.
    BeginGroup { id: String, label: Option<String> },

    /// End the current group.
    EndGroup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_roundtrip_through_json() {
        let cmds = vec![
            RenderCommand::PushTransform {
                translate: Point::new(10.0, 20.0),
                scale: Point::new(2.0, -2.0),
            },
            RenderCommand::DrawRect {
                rect: Rect::new(0.0, 0.0, 100.0, 50.0),
                color: ThemeToken::CityFill,
                border_color: Some(ThemeToken::Border),
            },
            RenderCommand::PopTransform,
        ];
        let json = serde_json::to_string(&cmds).expect("serialize");
        let back: Vec<RenderCommand> = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.len(), 3);
        assert!(matches!(
            back[0],
            RenderCommand::PushTransform { scale, .. } if scale.y == -2.0
        ));
    }
}
