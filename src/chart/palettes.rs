//! Palette registry
//!
//! Loads the default color palette and the fixed chart colors from
//! palettes.json (embedded at compile time).

use super::colors::{PaletteItem, Rgb};
use once_cell::sync::Lazy;
use serde::Deserialize;

/// Embedded palettes.json content
const PALETTES_JSON: &str = include_str!("../../palettes.json");

/// Global palette registry, initialized lazily on first access
pub static PALETTE_REGISTRY: Lazy<PaletteRegistry> = Lazy::new(|| {
    PaletteRegistry::from_json(PALETTES_JSON).unwrap_or_else(|e| {
        tracing::error!("Failed to load palettes.json: {}", e);
        PaletteRegistry::fallback()
    })
});

/// Palettes and fixed colors used by the chart builders
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaletteRegistry {
    default: Vec<PaletteItem>,
    heatmap_base: Rgb,
    null_cell: Rgb,
    null_pattern: String,
    transparent: String,
}

impl PaletteRegistry {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    fn fallback() -> Self {
        PaletteRegistry {
            default: vec![PaletteItem::new("1", Rgb::new(20, 178, 204))],
            heatmap_base: Rgb::new(0, 110, 145),
            null_cell: Rgb::new(216, 216, 216),
            null_pattern: "url(#gd-heatmap-null-pattern)".to_string(),
            transparent: "rgba(0,0,0,0)".to_string(),
        }
    }

    /// Default palette used when the configuration supplies none
    pub fn default_palette(&self) -> &[PaletteItem] {
        &self.default
    }

    /// Base color of the heatmap gradient when no custom palette is set
    pub fn heatmap_base(&self) -> Rgb {
        self.heatmap_base
    }

    /// Border color of heatmap cells without a value
    pub fn null_cell(&self) -> Rgb {
        self.null_cell
    }

    /// Fill of heatmap cells without a value
    pub fn null_pattern(&self) -> &str {
        &self.null_pattern
    }

    pub fn transparent(&self) -> &str {
        &self.transparent
    }
}

/// Active palette: the configured one if non-empty, else the default
pub fn palette_or_default(custom: Option<&[PaletteItem]>) -> &[PaletteItem] {
    match custom {
        Some(palette) if !palette.is_empty() => palette,
        _ => PALETTE_REGISTRY.default_palette(),
    }
}
