use eframe::egui::Color32;
use palette::{Darken, Hsl, IntoColor, Srgb, named};

// ---------------------------------------------------------------------------
// Trace colours
// ---------------------------------------------------------------------------

/// Colours used for curves and peak annotations.
///
/// Kept as a small closed set so figure descriptions stay independent of the
/// renderer; [`TraceColor::to_color32`] maps them for egui.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceColor {
    Orange,
    Black,
    Green,
    Magenta,
    Blue,
    Red,
    Grey,
}

impl TraceColor {
    fn srgb(self) -> Srgb<u8> {
        match self {
            TraceColor::Orange => named::ORANGE,
            TraceColor::Black => named::BLACK,
            TraceColor::Green => named::GREEN,
            TraceColor::Magenta => named::MAGENTA,
            TraceColor::Blue => named::BLUE,
            TraceColor::Red => named::RED,
            TraceColor::Grey => named::GRAY,
        }
    }

    pub fn to_color32(self) -> Color32 {
        let rgb = self.srgb();
        Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
    }

    /// Same hue, darkened for marker outlines and label text.
    pub fn shaded(self, amount: f32) -> Color32 {
        let rgb: Srgb = self.srgb().into_format();
        let hsl: Hsl = rgb.into_color();
        let dark: Srgb = hsl.darken(amount).into_color();
        Color32::from_rgb(
            (dark.red * 255.0) as u8,
            (dark.green * 255.0) as u8,
            (dark.blue * 255.0) as u8,
        )
    }
}

/// Black reference traces vanish on egui's dark theme; swap them for a light
/// grey there.
pub fn visible_on(color: TraceColor, dark_mode: bool) -> Color32 {
    match (color, dark_mode) {
        (TraceColor::Black, true) => Color32::LIGHT_GRAY,
        (other, _) => other.to_color32(),
    }
}
