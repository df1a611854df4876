//! Filled contour rendering.
//!
//! Every pixel of the panel is mapped back to data space, bilinearly
//! interpolated from the grid and painted with the colour of its band. That
//! gives the same picture as polygonal filled contours at the resolution of
//! the output image, and handles non-uniform grid spacing directly.

use rayon::prelude::*;

use crate::axes::{Axes, Scale};
use crate::canvas::{Canvas, Rgba};
use crate::error::{RenderError, RenderResult};
use crate::layout::Rect;
use crate::panel::tick_label;
use crate::style::BandStyle;
use crate::text::{TextPainter, LABEL_SIZE};

/// Values on a rectilinear grid: `values[row * x.len() + col]`, rows along `y`.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid2D {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub values: Vec<f64>,
}

fn check_axis(name: &str, coords: &[f64]) -> RenderResult<()> {
    if coords.len() < 2 {
        return Err(RenderError::InvalidGrid(format!(
            "{} axis needs at least 2 points, got {}",
            name,
            coords.len()
        )));
    }
    if coords.iter().any(|c| !c.is_finite()) || coords.windows(2).any(|w| w[0] >= w[1]) {
        return Err(RenderError::InvalidGrid(format!(
            "{} axis must be finite and strictly increasing",
            name
        )));
    }
    Ok(())
}

impl Grid2D {
    pub fn new(x: Vec<f64>, y: Vec<f64>, values: Vec<f64>) -> RenderResult<Self> {
        check_axis("x", &x)?;
        check_axis("y", &y)?;
        if values.len() != x.len() * y.len() {
            return Err(RenderError::InvalidGrid(format!(
                "{} values for a {}x{} grid",
                values.len(),
                y.len(),
                x.len()
            )));
        }
        Ok(Self { x, y, values })
    }

    fn at(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.x.len() + col]
    }

    /// Bilinear interpolation; `None` outside the grid.
    ///
    /// A cell with a NaN corner yields its nearest corner's value.
    pub fn sample(&self, x: f64, y: f64) -> Option<f64> {
        let (i, tx) = locate(&self.x, x)?;
        let (j, ty) = locate(&self.y, y)?;

        let v00 = self.at(j, i);
        let v01 = self.at(j, i + 1);
        let v10 = self.at(j + 1, i);
        let v11 = self.at(j + 1, i + 1);

        if [v00, v01, v10, v11].iter().any(|v| v.is_nan()) {
            let row = if ty < 0.5 { j } else { j + 1 };
            let col = if tx < 0.5 { i } else { i + 1 };
            return Some(self.at(row, col));
        }

        let bottom = v00 + (v01 - v00) * tx;
        let top = v10 + (v11 - v10) * tx;
        Some(bottom + (top - bottom) * ty)
    }
}

/// Cell index and fractional position of `v` on an ascending axis.
fn locate(coords: &[f64], v: f64) -> Option<(usize, f64)> {
    let n = coords.len();
    if !(v >= coords[0] && v <= coords[n - 1]) {
        return None;
    }
    let upper = coords.partition_point(|&c| c <= v).clamp(1, n - 1);
    let i = upper - 1;
    let t = (v - coords[i]) / (coords[i + 1] - coords[i]);
    Some((i, t))
}

/// Paint `grid` into `rect` with band colours.
///
/// Pixels outside the grid or whose value has no band are left untouched.
pub fn render_filled(
    grid: &Grid2D,
    style: &BandStyle,
    axes: &Axes,
    canvas: &mut Canvas,
    rect: Rect,
) -> RenderResult<()> {
    style.validate()?;
    axes.validate()?;

    let (x_end, y_end) = (
        rect.right().min(canvas.width()),
        rect.bottom().min(canvas.height()),
    );
    let rows: Vec<Vec<(usize, Rgba)>> = (rect.y..y_end)
        .into_par_iter()
        .map(|py| {
            (rect.x..x_end)
                .filter_map(|px| {
                    let (x, y) = axes.from_pixel(px, py, rect);
                    let color = grid.sample(x, y).and_then(|v| style.color_for(v))?;
                    Some((px, color))
                })
                .collect()
        })
        .collect();

    for (row, py) in rows.into_iter().zip(rect.y..) {
        for (px, color) in row {
            canvas.set_pixel(px as i64, py as i64, color);
        }
    }
    canvas.stroke_rect(rect, Rgba::BLACK);
    Ok(())
}

/// Width of the bar itself within a colour bar strip.
pub const COLORBAR_BAR_WIDTH: usize = 14;
const COLORBAR_LABEL_GAP: usize = 4;

/// Strip width that fits the bar and its widest level label.
pub fn colorbar_width(style: &BandStyle) -> RenderResult<usize> {
    let text = TextPainter::new(LABEL_SIZE)?;
    let widest = style
        .levels
        .iter()
        .map(|&l| text.width(&tick_label(l, Scale::Linear)))
        .max()
        .unwrap_or(0);
    Ok(COLORBAR_BAR_WIDTH + COLORBAR_LABEL_GAP + widest)
}

/// Vertical colour bar, lowest band at the bottom, one equal slot per band.
///
/// The bar takes the left [`COLORBAR_BAR_WIDTH`] pixels of `rect`; level
/// values are written beside each boundary when the rest of `rect` is wide
/// enough for them (see [`colorbar_width`]).
pub fn draw_colorbar(style: &BandStyle, canvas: &mut Canvas, rect: Rect) -> RenderResult<()> {
    style.validate()?;
    let n = style.band_count();
    let bar = Rect::new(rect.x, rect.y, COLORBAR_BAR_WIDTH.min(rect.width), rect.height);
    for band in 0..n {
        let top = bar.y + bar.height * (n - band - 1) / n;
        let bottom = bar.y + bar.height * (n - band) / n;
        canvas.fill_rect(
            Rect::new(bar.x, top, bar.width, bottom - top),
            style.band_color(band),
        );
    }
    canvas.stroke_rect(bar, Rgba::BLACK);

    if rect.width < colorbar_width(style)? || rect.height == 0 {
        return Ok(());
    }
    let text = TextPainter::new(LABEL_SIZE)?;
    let half_line = text.line_height() as i64 / 2;
    let x = (bar.right() + COLORBAR_LABEL_GAP) as i64;
    for (i, &level) in style.levels.iter().enumerate() {
        let y = (bar.bottom() - bar.height * i / n) as i64;
        let mark = y.min(bar.bottom() as i64 - 1);
        canvas.line(bar.right() as i64 - 1, mark, x - 2, mark, Rgba::BLACK);
        text.draw(canvas, &tick_label(level, Scale::Linear), x, y - half_line, Rgba::BLACK);
    }
    Ok(())
}
