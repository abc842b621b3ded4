use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            to_color32(rgb)
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    let rgb: Srgb<u8> = rgb.into_format();
    Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
}

/// Blue for -1, white for 0, red for +1; grey for undefined values.
pub fn diverging(value: f64) -> Color32 {
    if !value.is_finite() {
        return Color32::GRAY;
    }
    let t = value.clamp(-1.0, 1.0) as f32;
    let white = LinSrgb::new(1.0, 1.0, 1.0);
    let end = if t < 0.0 {
        LinSrgb::new(0.02, 0.12, 0.55)
    } else {
        LinSrgb::new(0.60, 0.03, 0.03)
    };
    let rgb: Srgb = Srgb::from_linear(white.mix(end, t.abs()));
    to_color32(rgb)
}

// ---------------------------------------------------------------------------
// Color mapping: language → Color32
// ---------------------------------------------------------------------------

/// Maps each language of the dataset to a stable, distinct colour.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map from the (sorted) distinct languages.
    pub fn new<'a>(languages: impl ExactSizeIterator<Item = &'a String>) -> Self {
        let palette = generate_palette(languages.len());
        let mapping: BTreeMap<String, Color32> = languages
            .zip(palette)
            .map(|(lang, c)| (lang.clone(), c))
            .collect();

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a language label.
    pub fn color_for(&self, label: &str) -> Color32 {
        self.mapping.get(label).copied().unwrap_or(self.default_color)
    }
}
