use city_canvas_protocol::ThemeToken;

/// Resolved RGBA color for egui rendering.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl ResolvedColor {
    const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_color32(self) -> egui::Color32 {
        egui::Color32::from_rgba_unmultiplied(self.r, self.g, self.b, self.a)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeMode {
    Dark,
    Light,
}

pub fn resolve(token: ThemeToken, mode: ThemeMode) -> egui::Color32 {
    match mode {
        ThemeMode::Dark => resolve_dark(token),
        ThemeMode::Light => resolve_light(token),
    }
    .to_color32()
}

fn resolve_dark(token: ThemeToken) -> ResolvedColor {
    // Catppuccin Mocha palette
    use ThemeToken::*;
    match token {
        Background => ResolvedColor::rgb(0x11, 0x11, 0x1b), // Crust
        Surface => ResolvedColor::rgb(0x18, 0x18, 0x25),    // Mantle
        Border => ResolvedColor::rgb(0x31, 0x32, 0x44),     // Surface0

        CityFill => ResolvedColor::rgb(0x1e, 0x1e, 0x2e), // Base
        GridMinor => ResolvedColor::rgb(0x31, 0x32, 0x44), // Surface0
        GridMajor => ResolvedColor::rgb(0x45, 0x47, 0x5a), // Surface1

        TextPrimary => ResolvedColor::rgb(0xcd, 0xd6, 0xf4), // Text
        TextSecondary => ResolvedColor::rgb(0xba, 0xc2, 0xde), // Subtext1
        TextMuted => ResolvedColor::rgb(0xa6, 0xad, 0xc8),   // Subtext0

        ToolbarBackground => ResolvedColor::rgb(0x18, 0x18, 0x25),
        ToolbarText => ResolvedColor::rgb(0xcd, 0xd6, 0xf4),

        MinimapCityFill => ResolvedColor::rgb(0x1e, 0x1e, 0x2e), // Base
        MinimapBorder => ResolvedColor::rgb(0x45, 0x47, 0x5a),   // Surface1
        MinimapMask => ResolvedColor::rgba(0x00, 0x00, 0x00, 90),
        MinimapViewport => ResolvedColor::rgba(0x89, 0xb4, 0xfa, 60), // Blue
        MinimapHandle => ResolvedColor::rgb(0xb4, 0xbe, 0xfe),        // Lavender

        ScaleBarLine => ResolvedColor::rgb(0xcd, 0xd6, 0xf4),
        ScaleBarText => ResolvedColor::rgb(0xba, 0xc2, 0xde),
    }
}

fn resolve_light(token: ThemeToken) -> ResolvedColor {
    // Pale map palette
    use ThemeToken::*;
    match token {
        Background => ResolvedColor::rgb(0xf8, 0xf8, 0xf8),
        Surface => ResolvedColor::rgb(0xff, 0xff, 0xff),
        Border => ResolvedColor::rgb(0xd2, 0xd2, 0xdc),

        CityFill => ResolvedColor::rgb(0xe0, 0xe7, 0xef),
        GridMinor => ResolvedColor::rgb(0xbb, 0xbb, 0xbb),
        GridMajor => ResolvedColor::rgb(0xaa, 0xaa, 0xaa),

        TextPrimary => ResolvedColor::rgb(0x14, 0x14, 0x1e),
        TextSecondary => ResolvedColor::rgb(0x50, 0x50, 0x64),
        TextMuted => ResolvedColor::rgb(0x64, 0x64, 0x6e),

        ToolbarBackground => ResolvedColor::rgb(0xf0, 0xf0, 0xf5),
        ToolbarText => ResolvedColor::rgb(0x28, 0x28, 0x32),

        MinimapCityFill => ResolvedColor::rgb(0xe0, 0xe7, 0xef),
        MinimapBorder => ResolvedColor::rgb(0xc0, 0xc0, 0xcc),
        MinimapMask => ResolvedColor::rgba(0x00, 0x00, 0x00, 64),
        MinimapViewport => ResolvedColor::rgba(0x2a, 0x5c, 0xff, 70),
        MinimapHandle => ResolvedColor::rgb(0x2a, 0x5c, 0xff),

        ScaleBarLine => ResolvedColor::rgb(0x28, 0x28, 0x32),
        ScaleBarText => ResolvedColor::rgb(0x50, 0x50, 0x64),
    }
}
