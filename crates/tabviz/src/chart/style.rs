//! Themes, colour palettes and style normalization.

use std::fmt;

use palette::{Hsluv, IntoColor, LinSrgb, Mix, Srgb};
use serde::{Deserialize, Serialize};

/// An opaque sRGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn hex(value: u32) -> Self {
        Self::rgb((value >> 16) as u8, (value >> 8) as u8, value as u8)
    }

    /// `#rrggbb` notation.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    fn to_linear(self) -> LinSrgb {
        Srgb::new(self.r, self.g, self.b).into_format::<f32>().into_linear()
    }

    fn from_linear(color: LinSrgb) -> Self {
        let srgb: Srgb<u8> = Srgb::<f32>::from_linear(color).into_format::<u8>();
        Self::rgb(srgb.red, srgb.green, srgb.blue)
    }

    /// Blend towards `other` by `t` in linear light.
    pub fn mix(self, other: Color, t: f64) -> Color {
        Color::from_linear(self.to_linear().mix(other.to_linear(), t.clamp(0.0, 1.0) as f32))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Overall look of a figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Default,
    Whitegrid,
    Darkgrid,
    White,
    Dark,
}

/// Colours derived from a theme.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThemeColors {
    pub background: Color,
    pub panel: Color,
    pub grid: Option<Color>,
    pub axis: Color,
    pub text: Color,
    /// Draw all four panel edges instead of only the left and bottom axes.
    pub frame: bool,
}

impl Theme {
    pub fn colors(&self) -> ThemeColors {
        match self {
            Theme::Default => ThemeColors {
                background: Color::WHITE,
                panel: Color::WHITE,
                grid: None,
                axis: Color::hex(0x333333),
                text: Color::hex(0x222222),
                frame: true,
            },
            Theme::Whitegrid => ThemeColors {
                background: Color::WHITE,
                panel: Color::WHITE,
                grid: Some(Color::hex(0xdddddd)),
                axis: Color::hex(0xcccccc),
                text: Color::hex(0x262626),
                frame: true,
            },
            Theme::Darkgrid => ThemeColors {
                background: Color::WHITE,
                panel: Color::hex(0xeaeaf2),
                grid: Some(Color::WHITE),
                axis: Color::hex(0xeaeaf2),
                text: Color::hex(0x262626),
                frame: false,
            },
            Theme::White => ThemeColors {
                background: Color::WHITE,
                panel: Color::WHITE,
                grid: None,
                axis: Color::hex(0x262626),
                text: Color::hex(0x262626),
                frame: false,
            },
            Theme::Dark => ThemeColors {
                background: Color::hex(0x1e1e1e),
                panel: Color::hex(0x2b2b2b),
                grid: Some(Color::hex(0x444444)),
                axis: Color::hex(0xbbbbbb),
                text: Color::hex(0xeeeeee),
                frame: true,
            },
        }
    }
}

impl std::str::FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "default" => Ok(Theme::Default),
            "whitegrid" => Ok(Theme::Whitegrid),
            "darkgrid" => Ok(Theme::Darkgrid),
            "white" => Ok(Theme::White),
            "dark" => Ok(Theme::Dark),
            _ => Err(format!(
                "Unknown theme: {}. Use default, whitegrid, darkgrid, white, or dark.",
                s
            )),
        }
    }
}

const VIRIDIS: &[u32] = &[
    0x440154, 0x482878, 0x3e4989, 0x31688e, 0x26828e, 0x1f9e89, 0x35b779, 0x6ece58, 0xb5de2b,
    0xfde725,
];
const PLASMA: &[u32] = &[
    0x0d0887, 0x46039f, 0x7201a8, 0x9c179e, 0xbd3786, 0xd8576b, 0xed7953, 0xfb9f3a, 0xfdca26,
    0xf0f921,
];
const SET1: &[u32] = &[
    0xe41a1c, 0x377eb8, 0x4daf4a, 0x984ea3, 0xff7f00, 0xffff33, 0xa65628, 0xf781bf, 0x999999,
];
const SET2: &[u32] = &[
    0x66c2a5, 0xfc8d62, 0x8da0cb, 0xe78ac3, 0xa6d854, 0xffd92f, 0xe5c494, 0xb3b3b3,
];
const PASTEL1: &[u32] = &[
    0xfbb4ae, 0xb3cde3, 0xccebc5, 0xdecbe4, 0xfed9a6, 0xffffcc, 0xe5d8bd, 0xfddaec, 0xf2f2f2,
];

/// Named colour palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaletteName {
    #[default]
    Viridis,
    Plasma,
    Set1,
    Set2,
    Pastel1,
    Husl,
}

impl PaletteName {
    /// `n` colours for categorical series.
    ///
    /// Continuous maps are sampled evenly, qualitative lists cycle, and
    /// `husl` spaces hues evenly at constant perceived lightness.
    pub fn colors(&self, n: usize) -> Vec<Color> {
        match self {
            PaletteName::Viridis | PaletteName::Plasma => (0..n)
                .map(|i| {
                    let t = if n <= 1 { 0.0 } else { i as f64 / (n - 1) as f64 };
                    self.sample(t)
                })
                .collect(),
            PaletteName::Set1 | PaletteName::Set2 | PaletteName::Pastel1 => {
                let stops = self.stops();
                (0..n).map(|i| Color::hex(stops[i % stops.len()])).collect()
            }
            PaletteName::Husl => (0..n).map(|i| husl(i, n)).collect(),
        }
    }

    /// Colour at position `t` in [0, 1] along the palette, for continuous scales.
    pub fn sample(&self, t: f64) -> Color {
        if *self == PaletteName::Husl {
            return husl_ramp(t);
        }
        let stops = self.stops();
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let pos = t * (stops.len() - 1) as f64;
        let lower = pos.floor() as usize;
        let upper = (lower + 1).min(stops.len() - 1);
        Color::hex(stops[lower]).mix(Color::hex(stops[upper]), pos - lower as f64)
    }

    fn stops(&self) -> &'static [u32] {
        match self {
            PaletteName::Viridis => VIRIDIS,
            PaletteName::Plasma => PLASMA,
            PaletteName::Set1 => SET1,
            PaletteName::Set2 => SET2,
            PaletteName::Pastel1 | PaletteName::Husl => PASTEL1,
        }
    }
}

fn husl(i: usize, n: usize) -> Color {
    let hue = 12.0 + (i as f32 / n.max(1) as f32) * 360.0;
    hsluv_to_color(hue, 90.0, 65.0)
}

fn husl_ramp(t: f64) -> Color {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    hsluv_to_color(260.0 - 240.0 * t as f32, 85.0, 30.0 + 50.0 * t as f32)
}

fn hsluv_to_color(hue: f32, saturation: f32, lightness: f32) -> Color {
    let rgb: Srgb = Hsluv::new(hue, saturation, lightness).into_color();
    let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color::rgb(channel(rgb.red), channel(rgb.green), channel(rgb.blue))
}

impl std::str::FromStr for PaletteName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "viridis" => Ok(PaletteName::Viridis),
            "plasma" => Ok(PaletteName::Plasma),
            "set1" => Ok(PaletteName::Set1),
            "set2" => Ok(PaletteName::Set2),
            "pastel1" => Ok(PaletteName::Pastel1),
            "husl" => Ok(PaletteName::Husl),
            _ => Err(format!("Unknown palette: {}", s)),
        }
    }
}

/// Largest accepted figure side, in inches.
pub const MAX_FIGURE_INCHES: f64 = 100.0;

/// Whether `(width, height)` in inches is a usable figure or panel size.
pub fn is_valid_figure_size((w, h): (f64, f64)) -> bool {
    let side = |v: f64| v.is_finite() && v > 0.0 && v <= MAX_FIGURE_INCHES;
    side(w) && side(h)
}

/// Style options as supplied by a caller; every field is optional.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub theme: Option<Theme>,
    pub palette: Option<PaletteName>,
    pub font_family: Option<String>,
    /// Font size in points.
    pub font_size: Option<f64>,
    /// Figure width and height in inches.
    pub figure_size: Option<(f64, f64)>,
    pub line_width: Option<f64>,
    pub marker_size: Option<f64>,
    /// Fill/marker opacity in [0, 1].
    pub opacity: Option<f64>,
}

impl StyleConfig {
    /// Fill unset options with defaults.
    pub fn normalize(&self) -> Style {
        let defaults = Style::default();
        let positive = |v: Option<f64>, d: f64| v.filter(|x| x.is_finite() && *x > 0.0).unwrap_or(d);
        let figure_size = self
            .figure_size
            .filter(|size| is_valid_figure_size(*size))
            .unwrap_or(defaults.figure_size);

        Style {
            theme: self.theme.unwrap_or(defaults.theme),
            palette: self.palette.unwrap_or(defaults.palette),
            font_family: self
                .font_family
                .clone()
                .filter(|f| !f.trim().is_empty())
                .unwrap_or(defaults.font_family),
            font_size: positive(self.font_size, defaults.font_size),
            figure_size,
            line_width: positive(self.line_width, defaults.line_width),
            marker_size: positive(self.marker_size, defaults.marker_size),
            opacity: self
                .opacity
                .filter(|o| o.is_finite())
                .map(|o| o.clamp(0.0, 1.0))
                .unwrap_or(defaults.opacity),
        }
    }
}

/// A fully specified style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub theme: Theme,
    pub palette: PaletteName,
    pub font_family: String,
    pub font_size: f64,
    pub figure_size: (f64, f64),
    pub line_width: f64,
    pub marker_size: f64,
    pub opacity: f64,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            theme: Theme::Default,
            palette: PaletteName::Viridis,
            font_family: "sans-serif".to_string(),
            font_size: 12.0,
            figure_size: (8.0, 6.0),
            line_width: 2.0,
            marker_size: 4.0,
            opacity: 0.8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_fills_defaults() {
        let style = StyleConfig::default().normalize();
        assert_eq!(style, Style::default());
        assert_eq!(style.font_family, "sans-serif");
        assert_eq!(style.figure_size, (8.0, 6.0));
    }

    #[test]
    fn test_oversized_figure_falls_back() {
        let config = StyleConfig {
            figure_size: Some((1000.0, 1000.0)),
            ..Default::default()
        };
        assert_eq!(config.normalize().figure_size, (8.0, 6.0));

        let config = StyleConfig {
            figure_size: Some((MAX_FIGURE_INCHES, 2.0)),
            ..Default::default()
        };
        assert_eq!(config.normalize().figure_size, (MAX_FIGURE_INCHES, 2.0));
    }

    #[test]
    fn test_normalize_keeps_overrides() {
        let config = StyleConfig {
            theme: Some(Theme::Dark),
            font_size: Some(9.0),
            opacity: Some(1.5),
            line_width: Some(-1.0),
            ..StyleConfig::default()
        };
        let style = config.normalize();
        assert_eq!(style.theme, Theme::Dark);
        assert_eq!(style.font_size, 9.0);
        assert_eq!(style.opacity, 1.0);
        assert_eq!(style.line_width, 2.0);
    }

    #[test]
    fn test_palette_endpoints() {
        let colors = PaletteName::Viridis.colors(2);
        assert_eq!(colors[0], Color::hex(0x440154));
        assert_eq!(colors[1], Color::hex(0xfde725));
    }

    #[test]
    fn test_qualitative_palettes_cycle() {
        let colors = PaletteName::Set2.colors(10);
        assert_eq!(colors[0], colors[8]);
        assert_eq!(colors[0].to_hex(), "#66c2a5");
    }

    #[test]
    fn test_husl_distinct() {
        let colors = PaletteName::Husl.colors(6);
        for i in 0..colors.len() {
            for j in (i + 1)..colors.len() {
                assert_ne!(colors[i], colors[j]);
            }
        }
    }

    #[test]
    fn test_style_from_json() {
        let config: StyleConfig =
            serde_json::from_str(r#"{"theme": "darkgrid", "palette": "set1", "figure_size": [4, 3]}"#)
                .unwrap();
        let style = config.normalize();
        assert_eq!(style.theme, Theme::Darkgrid);
        assert_eq!(style.palette, PaletteName::Set1);
        assert_eq!(style.figure_size, (4.0, 3.0));
    }
}
