//! Band styles for filled contour plots.

use serde::{Deserialize, Serialize};

use crate::canvas::Rgba;
use crate::error::{RenderError, RenderResult};

/// Parse hex color string to RGB
pub fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some((r, g, b))
}

/// Which ends of the level range keep their end colour beyond the range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Extend {
    #[default]
    Neither,
    Min,
    Max,
    Both,
}

impl Extend {
    fn below(self) -> bool {
        matches!(self, Extend::Min | Extend::Both)
    }

    fn above(self) -> bool {
        matches!(self, Extend::Max | Extend::Both)
    }
}

/// Explicit contour levels and one colour per band.
///
/// `levels` holds n+1 ascending boundaries, `colors` n hex colours. Band `i`
/// covers `[levels[i], levels[i + 1])`; the top band also includes its upper
/// boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandStyle {
    pub levels: Vec<f64>,
    pub colors: Vec<String>,
    #[serde(default)]
    pub extend: Extend,
}

impl BandStyle {
    pub fn new(levels: Vec<f64>, colors: Vec<String>, extend: Extend) -> RenderResult<Self> {
        let style = Self {
            levels,
            colors,
            extend,
        };
        style.validate()?;
        Ok(style)
    }

    pub fn validate(&self) -> RenderResult<()> {
        if self.colors.is_empty() {
            return Err(RenderError::InvalidStyle("no colours".to_string()));
        }
        if self.levels.len() != self.colors.len() + 1 {
            return Err(RenderError::InvalidStyle(format!(
                "{} levels for {} colours, expected {}",
                self.levels.len(),
                self.colors.len(),
                self.colors.len() + 1
            )));
        }
        if self.levels.iter().any(|l| !l.is_finite()) {
            return Err(RenderError::InvalidStyle("levels must be finite".to_string()));
        }
        if self.levels.windows(2).any(|w| w[0] >= w[1]) {
            return Err(RenderError::InvalidStyle(
                "levels must be strictly ascending".to_string(),
            ));
        }
        if let Some(bad) = self.colors.iter().find(|c| hex_to_rgb(c).is_none()) {
            return Err(RenderError::InvalidStyle(format!("bad colour {:?}", bad)));
        }
        Ok(())
    }

    pub fn band_count(&self) -> usize {
        self.colors.len()
    }

    /// Band index for `value`, or `None` when it is NaN or outside a
    /// non-extended end.
    pub fn band_for(&self, value: f64) -> Option<usize> {
        if value.is_nan() {
            return None;
        }
        let n = self.band_count();
        let (lo, hi) = (self.levels[0], self.levels[n]);
        if value < lo {
            return self.extend.below().then_some(0);
        }
        if value > hi {
            return self.extend.above().then_some(n - 1);
        }
        // first boundary strictly above value, minus one
        let upper = self.levels.partition_point(|&l| l <= value);
        Some(upper.saturating_sub(1).min(n - 1))
    }

    pub fn color_for(&self, value: f64) -> Option<Rgba> {
        self.band_for(value).map(|i| self.band_color(i))
    }

    /// Colour of band `index`; black if the style was never validated.
    pub fn band_color(&self, index: usize) -> Rgba {
        self.colors
            .get(index)
            .and_then(|c| hex_to_rgb(c))
            .map(|(r, g, b)| Rgba::opaque(r, g, b))
            .unwrap_or(Rgba::BLACK)
    }
}
