//! Mapping between data coordinates and panel pixels.

use serde::{Deserialize, Serialize};

use crate::error::{RenderError, RenderResult};
use crate::layout::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scale {
    #[default]
    Linear,
    Log,
}

/// Data ranges shown by a panel. `y` grows upwards; only `x` may be log.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Axes {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    pub x_scale: Scale,
}

impl Axes {
    pub fn linear(x: (f64, f64), y: (f64, f64)) -> RenderResult<Self> {
        Self::new(x, y, Scale::Linear)
    }

    pub fn new(x: (f64, f64), y: (f64, f64), x_scale: Scale) -> RenderResult<Self> {
        let axes = Self {
            x_min: x.0,
            x_max: x.1,
            y_min: y.0,
            y_max: y.1,
            x_scale,
        };
        axes.validate()?;
        Ok(axes)
    }

    pub fn validate(&self) -> RenderResult<()> {
        let finite = [self.x_min, self.x_max, self.y_min, self.y_max]
            .iter()
            .all(|v| v.is_finite());
        if !finite || self.x_min >= self.x_max || self.y_min >= self.y_max {
            return Err(RenderError::InvalidAxes(format!(
                "x {}..{}, y {}..{}",
                self.x_min, self.x_max, self.y_min, self.y_max
            )));
        }
        if self.x_scale == Scale::Log && self.x_min <= 0.0 {
            return Err(RenderError::InvalidAxes(format!(
                "log x axis needs a positive minimum, got {}",
                self.x_min
            )));
        }
        Ok(())
    }

    fn x_fraction(&self, x: f64) -> Option<f64> {
        match self.x_scale {
            Scale::Linear => Some((x - self.x_min) / (self.x_max - self.x_min)),
            Scale::Log if x > 0.0 => {
                let (lo, hi) = (self.x_min.log10(), self.x_max.log10());
                Some((x.log10() - lo) / (hi - lo))
            }
            Scale::Log => None,
        }
    }

    /// Pixel position of a data point; may fall outside `rect`.
    ///
    /// `None` for non-finite input or non-positive `x` on a log axis.
    pub fn to_pixel(&self, x: f64, y: f64, rect: Rect) -> Option<(f64, f64)> {
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        let fx = self.x_fraction(x)?;
        let fy = (y - self.y_min) / (self.y_max - self.y_min);
        let px = rect.x as f64 + fx * rect.width as f64;
        let py = rect.y as f64 + (1.0 - fy) * rect.height as f64;
        Some((px, py))
    }

    /// Data coordinates at the centre of pixel (`px`, `py`).
    pub fn from_pixel(&self, px: usize, py: usize, rect: Rect) -> (f64, f64) {
        let fx = (px as f64 + 0.5 - rect.x as f64) / rect.width.max(1) as f64;
        let fy = 1.0 - (py as f64 + 0.5 - rect.y as f64) / rect.height.max(1) as f64;
        let x = match self.x_scale {
            Scale::Linear => self.x_min + fx * (self.x_max - self.x_min),
            Scale::Log => {
                let (lo, hi) = (self.x_min.log10(), self.x_max.log10());
                10f64.powf(lo + fx * (hi - lo))
            }
        };
        (x, self.y_min + fy * (self.y_max - self.y_min))
    }

    /// Grid line positions along x: every decade on a log axis, tenths otherwise.
    pub fn x_grid(&self) -> Vec<f64> {
        match self.x_scale {
            Scale::Linear => tenths(self.x_min, self.x_max),
            Scale::Log => {
                let first = self.x_min.log10().ceil() as i32;
                let last = self.x_max.log10().floor() as i32;
                (first..=last).map(|e| 10f64.powi(e)).collect()
            }
        }
    }

    pub fn y_grid(&self) -> Vec<f64> {
        tenths(self.y_min, self.y_max)
    }

    /// Labelled positions along x: every other grid line, or at most
    /// [`MAX_LOG_TICKS`] evenly spaced decades on a log axis.
    pub fn x_ticks(&self) -> Vec<f64> {
        let grid = self.x_grid();
        let step = match self.x_scale {
            Scale::Linear => 2,
            Scale::Log => grid.len().div_ceil(MAX_LOG_TICKS).max(1),
        };
        grid.into_iter().step_by(step).collect()
    }

    pub fn y_ticks(&self) -> Vec<f64> {
        self.y_grid().into_iter().step_by(2).collect()
    }
}

/// Upper bound on labelled decades along a log axis.
pub const MAX_LOG_TICKS: usize = 7;

fn tenths(lo: f64, hi: f64) -> Vec<f64> {
    (0..=10).map(|i| lo + (hi - lo) * i as f64 / 10.0).collect()
}
