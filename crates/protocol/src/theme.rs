use serde::{Deserialize, Serialize};

/// Semantic color tokens resolved by the renderer's active theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThemeToken {
    Background,
    Surface,
    Border,

    CityFill,
    GridMinor,
    GridMajor,

    TextPrimary,
    TextSecondary,
    TextMuted,

    // Toolbar
    ToolbarBackground,
    ToolbarText,

    // Minimap
    MinimapCityFill,
    MinimapBorder,
    MinimapMask,
    MinimapViewport,
    MinimapHandle,

    // Scale bar
    ScaleBarLine,
    ScaleBarText,
}
