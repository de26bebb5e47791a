use std::str::FromStr;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Srgb<u8>> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            let rgb8: Srgb<u8> = rgb.into_format();
            rgb8
        })
        .collect()
}

/// Same as [`generate_palette`], as `#rrggbb` strings for chart specs.
pub fn palette_hex(n: usize) -> Vec<String> {
    generate_palette(n)
        .into_iter()
        .map(|c| format!("#{:02x}{:02x}{:02x}", c.red, c.green, c.blue))
        .collect()
}

// ---------------------------------------------------------------------------
// Hex string → Color32
// ---------------------------------------------------------------------------

/// Parse `#rrggbb` (leading `#` optional). Malformed input gives grey.
pub fn to_color32(hex: &str) -> Color32 {
    match Srgb::<u8>::from_str(hex.trim()) {
        Ok(c) => Color32::from_rgb(c.red, c.green, c.blue),
        Err(_) => {
            log::debug!("Unparsable colour '{hex}', using grey");
            Color32::GRAY
        }
    }
}
