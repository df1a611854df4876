//! Titles, axis labels and tick values around a plot area.

use crate::axes::{Axes, Scale};
use crate::canvas::{Canvas, Rgba};
use crate::error::RenderResult;
use crate::layout::Rect;
use crate::text::{TextPainter, LABEL_SIZE, TITLE_SIZE};

const TITLE_BAND: usize = 22;
const TICK_BAND: usize = 18;
const LABEL_BAND: usize = 18;
const TICK_COLUMN: usize = 44;
const RIGHT_PAD: usize = 14;
const TICK_LENGTH: i64 = 4;

/// Text drawn around one panel. Empty strings are left out along with the
/// room they would take.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanelText {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
}

impl PanelText {
    pub fn new(
        title: impl Into<String>,
        x_label: impl Into<String>,
        y_label: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            x_label: x_label.into(),
            y_label: y_label.into(),
        }
    }

    fn left_margin(&self) -> usize {
        TICK_COLUMN + if self.y_label.is_empty() { 0 } else { LABEL_BAND }
    }

    fn top_margin(&self) -> usize {
        if self.title.is_empty() {
            0
        } else {
            TITLE_BAND
        }
    }

    fn bottom_margin(&self) -> usize {
        TICK_BAND + if self.x_label.is_empty() { 0 } else { LABEL_BAND }
    }

    /// The part of `cell` left for data once room for the text is taken.
    pub fn plot_area(&self, cell: Rect) -> Rect {
        let (left, top) = (self.left_margin(), self.top_margin());
        Rect::new(
            cell.x + left.min(cell.width),
            cell.y + top.min(cell.height),
            cell.width.saturating_sub(left + RIGHT_PAD),
            cell.height.saturating_sub(top + self.bottom_margin()),
        )
    }

    /// Draw the title above `plot`, tick marks and values along its left and
    /// bottom edges, and the axis labels outside those.
    pub fn draw(&self, axes: &Axes, canvas: &mut Canvas, plot: Rect) -> RenderResult<()> {
        if plot.width == 0 || plot.height == 0 {
            return Ok(());
        }
        let labels = TextPainter::new(LABEL_SIZE)?;
        let line = labels.line_height() as i64;

        if !self.title.is_empty() {
            let title = TextPainter::new(TITLE_SIZE)?;
            let band = Rect::new(
                plot.x,
                plot.y.saturating_sub(TITLE_BAND),
                plot.width,
                TITLE_BAND.min(plot.y),
            );
            title.draw_centered(canvas, &self.title, band, Rgba::BLACK);
        }

        let bottom = plot.bottom() as i64 - 1;
        for x in axes.x_ticks() {
            let Some((px, _)) = axes.to_pixel(x, axes.y_min, plot) else {
                continue;
            };
            let px = (px.round() as i64).min(plot.right() as i64 - 1);
            canvas.line(px, bottom, px, bottom + TICK_LENGTH, Rgba::BLACK);
            let text = tick_label(x, axes.x_scale);
            let half = labels.width(&text) as i64 / 2;
            labels.draw(canvas, &text, px - half, bottom + TICK_LENGTH + 2, Rgba::BLACK);
        }

        let left = plot.x as i64;
        for y in axes.y_ticks() {
            let Some((_, py)) = axes.to_pixel(axes.x_min, y, plot) else {
                continue;
            };
            let py = (py.round() as i64).min(plot.bottom() as i64 - 1);
            canvas.line(left - TICK_LENGTH, py, left, py, Rgba::BLACK);
            let text = tick_label(y, Scale::Linear);
            let x = left - TICK_LENGTH - 2 - labels.width(&text) as i64;
            labels.draw(canvas, &text, x, py - line / 2, Rgba::BLACK);
        }

        if !self.x_label.is_empty() {
            let band = Rect::new(plot.x, plot.bottom() + TICK_BAND, plot.width, LABEL_BAND);
            labels.draw_centered(canvas, &self.x_label, band, Rgba::BLACK);
        }
        if !self.y_label.is_empty() {
            let band = Rect::new(
                plot.x.saturating_sub(self.left_margin()),
                plot.y,
                LABEL_BAND,
                plot.height,
            );
            labels.draw_vertical(canvas, &self.y_label, band, Rgba::BLACK);
        }
        Ok(())
    }
}

/// Short text for an axis or colour bar value: `1e<n>` on a log axis,
/// otherwise the value rounded to six decimals without trailing zeros.
pub fn tick_label(value: f64, scale: Scale) -> String {
    match scale {
        Scale::Log => format!("1e{}", value.log10().round() as i32),
        Scale::Linear => {
            let rounded = (value * 1e6).round() / 1e6;
            // avoid "-0"
            format!("{}", if rounded == 0.0 { 0.0 } else { rounded })
        }
    }
}
