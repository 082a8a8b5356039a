//! Color values and RGB helpers
//!
//! Colors travel as CSS `rgb(r,g,b)` strings in the produced options. Palette
//! entries and color-mapping overrides use the structured forms below.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// CSS form without spaces: `rgb(20,178,204)`
    pub fn to_css(self) -> String {
        format!("rgb({},{},{})", self.r, self.g, self.b)
    }

    /// Parse `rgb(r,g,b)`; spaces are tolerated
    pub fn parse(css: &str) -> Option<Rgb> {
        let inner = css.trim().strip_prefix("rgb(")?.strip_suffix(')')?;
        let mut parts = inner.split(',').map(|p| p.trim().parse::<u8>());
        let rgb = Rgb::new(parts.next()?.ok()?, parts.next()?.ok()?, parts.next()?.ok()?);
        parts.next().is_none().then_some(rgb)
    }

    /// Move each channel toward white by `percent` of the remaining distance
    pub fn lighter(self, percent: f64) -> Rgb {
        let channel = |c: u8| {
            let c = f64::from(c);
            (((255.0 - c) * percent).round() + c).clamp(0.0, 255.0) as u8
        };
        Rgb::new(channel(self.r), channel(self.g), channel(self.b))
    }
}

/// Lighten a CSS color string; unparsable input is returned unchanged
pub fn lighter_css(css: &str, percent: f64) -> String {
    match Rgb::parse(css) {
        Some(rgb) => rgb.lighter(percent).to_css(),
        None => css.to_string(),
    }
}

/// Color reference: palette slot by guid or an explicit RGB value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum ColorItem {
    Guid(String),
    Rgb(Rgb),
}

/// Palette entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteItem {
    pub guid: String,
    pub fill: Rgb,
}

impl PaletteItem {
    pub fn new(guid: impl Into<String>, fill: Rgb) -> Self {
        PaletteItem {
            guid: guid.into(),
            fill,
        }
    }
}

/// Fill of the palette entry with `guid`, falling back to the slot at
/// `index` modulo the palette length.
pub fn color_by_guid(palette: &[PaletteItem], guid: &str, index: usize) -> Option<Rgb> {
    palette
        .iter()
        .find(|item| item.guid == guid)
        .or_else(|| (!palette.is_empty()).then(|| &palette[index % palette.len()]))
        .map(|item| item.fill)
}

/// Resolve a color item against a palette into a CSS string
pub fn resolve_css(palette: &[PaletteItem], color: &ColorItem, index: usize) -> String {
    match color {
        ColorItem::Rgb(rgb) => rgb.to_css(),
        ColorItem::Guid(guid) => color_by_guid(palette, guid, index)
            .map(Rgb::to_css)
            .unwrap_or_default(),
    }
}

/// Number of gradient steps between white and the base color
pub const GRADIENT_STEPS: usize = 7;

/// White-to-`base` gradient: white first, `base` last, 8 entries in total
pub fn heatmap_gradient(base: Rgb) -> Vec<String> {
    let steps = GRADIENT_STEPS as f64;
    let channel = |c: u8, i: usize| {
        let c = f64::from(c);
        (c + (255.0 - c) * i as f64 / steps).trunc() as u8
    };
    (0..=GRADIENT_STEPS)
        .rev()
        .map(|i| Rgb::new(channel(base.r, i), channel(base.g, i), channel(base.b, i)).to_css())
        .collect()
}
