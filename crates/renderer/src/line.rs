//! Line plots on linear or semilog axes.

use crate::axes::Axes;
use crate::canvas::{Canvas, Rgba};
use crate::error::{RenderError, RenderResult};
use crate::layout::Rect;
use crate::text::{TextPainter, LABEL_SIZE};

/// Default colour cycle for successive series.
pub const SERIES_COLORS: [Rgba; 6] = [
    Rgba::opaque(31, 119, 180),
    Rgba::opaque(255, 127, 14),
    Rgba::opaque(44, 160, 44),
    Rgba::opaque(214, 39, 40),
    Rgba::opaque(148, 103, 189),
    Rgba::opaque(140, 86, 75),
];

#[derive(Debug, Clone, PartialEq)]
pub struct LineSeries {
    pub label: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub color: Rgba,
}

impl LineSeries {
    pub fn new(label: impl Into<String>, x: Vec<f64>, y: Vec<f64>, color: Rgba) -> RenderResult<Self> {
        if x.len() != y.len() {
            return Err(RenderError::InvalidGrid(format!(
                "series has {} x values and {} y values",
                x.len(),
                y.len()
            )));
        }
        Ok(Self {
            label: label.into(),
            x,
            y,
            color,
        })
    }
}

/// Clip segment to `rect` (Liang-Barsky). `None` when fully outside.
fn clip(
    (x0, y0): (f64, f64),
    (x1, y1): (f64, f64),
    rect: Rect,
) -> Option<((f64, f64), (f64, f64))> {
    let (xmin, ymin) = (rect.x as f64, rect.y as f64);
    let (xmax, ymax) = ((rect.right() as f64) - 1.0, (rect.bottom() as f64) - 1.0);
    let (dx, dy) = (x1 - x0, y1 - y0);
    let mut t0: f64 = 0.0;
    let mut t1: f64 = 1.0;

    for (p, q) in [
        (-dx, x0 - xmin),
        (dx, xmax - x0),
        (-dy, y0 - ymin),
        (dy, ymax - y0),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else {
            let r = q / p;
            if p < 0.0 {
                t0 = t0.max(r);
            } else {
                t1 = t1.min(r);
            }
        }
    }
    if t0 > t1 {
        return None;
    }
    Some((
        (x0 + t0 * dx, y0 + t0 * dy),
        (x0 + t1 * dx, y0 + t1 * dy),
    ))
}

fn draw_grid(axes: &Axes, canvas: &mut Canvas, rect: Rect) {
    for x in axes.x_grid() {
        if let Some((px, _)) = axes.to_pixel(x, axes.y_min, rect) {
            let px = (px.round() as i64).min(rect.right() as i64 - 1);
            canvas.line(px, rect.y as i64, px, rect.bottom() as i64 - 1, Rgba::GRID);
        }
    }
    for y in axes.y_grid() {
        if let Some((_, py)) = axes.to_pixel(axes.x_min, y, rect) {
            let py = (py.round() as i64).min(rect.bottom() as i64 - 1);
            canvas.line(rect.x as i64, py, rect.right() as i64 - 1, py, Rgba::GRID);
        }
    }
}

const LEGEND_PAD: usize = 4;
const SWATCH: usize = 10;

/// Boxed key in the top-right corner of `rect`: a swatch and the label of
/// each series. Skipped when it does not fit.
fn draw_legend(series: &[LineSeries], canvas: &mut Canvas, rect: Rect) -> RenderResult<()> {
    if series.is_empty() {
        return Ok(());
    }
    let text = TextPainter::new(LABEL_SIZE)?;
    let row = text.line_height().max(SWATCH) + 2;
    let label_width = series.iter().map(|s| text.width(&s.label)).max().unwrap_or(0);
    let width = 3 * LEGEND_PAD + SWATCH + label_width;
    let height = 2 * LEGEND_PAD + row * series.len();
    if width + LEGEND_PAD > rect.width || height + LEGEND_PAD > rect.height {
        return Ok(());
    }

    let key = Rect::new(rect.right() - width - LEGEND_PAD, rect.y + LEGEND_PAD, width, height);
    canvas.fill_rect(key, Rgba::WHITE);
    canvas.stroke_rect(key, Rgba::GRID);
    for (i, s) in series.iter().enumerate() {
        let y = key.y + LEGEND_PAD + i * row;
        canvas.fill_rect(
            Rect::new(key.x + LEGEND_PAD, y + (row - SWATCH) / 2, SWATCH, SWATCH),
            s.color,
        );
        let text_x = key.x + 2 * LEGEND_PAD + SWATCH;
        let text_y = y + (row - text.line_height()) / 2;
        text.draw(canvas, &s.label, text_x as i64, text_y as i64, Rgba::BLACK);
    }
    Ok(())
}

/// Draw the panel grid, every series and a labelled key in the top-right corner.
///
/// A point that cannot be placed (NaN, or `x <= 0` on a log axis) breaks
/// its line; segments are clipped to the panel.
pub fn render_lines(
    series: &[LineSeries],
    axes: &Axes,
    canvas: &mut Canvas,
    rect: Rect,
    thickness: u32,
) -> RenderResult<()> {
    axes.validate()?;
    if rect.width == 0 || rect.height == 0 {
        return Ok(());
    }

    draw_grid(axes, canvas, rect);

    for s in series {
        let points: Vec<Option<(f64, f64)>> = s
            .x
            .iter()
            .zip(&s.y)
            .map(|(&x, &y)| axes.to_pixel(x, y, rect))
            .collect();
        for pair in points.windows(2) {
            let (Some(a), Some(b)) = (pair[0], pair[1]) else {
                continue;
            };
            if let Some((a, b)) = clip(a, b, rect) {
                canvas.thick_line(
                    a.0.round() as i64,
                    a.1.round() as i64,
                    b.0.round() as i64,
                    b.1.round() as i64,
                    thickness,
                    s.color,
                );
            }
        }
    }

    draw_legend(series, canvas, rect)?;

    canvas.stroke_rect(rect, Rgba::BLACK);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axes::Scale;

    #[test]
    fn test_clip() {
        let rect = Rect::new(0, 0, 11, 11);
        let inside = clip((1.0, 1.0), (5.0, 5.0), rect).unwrap();
        assert_eq!(inside, ((1.0, 1.0), (5.0, 5.0)));

        let crossing = clip((-5.0, 5.0), (15.0, 5.0), rect).unwrap();
        assert_eq!(crossing, ((0.0, 5.0), (10.0, 5.0)));

        assert!(clip((-5.0, -5.0), (-1.0, -1.0), rect).is_none());
    }

    #[test]
    fn test_series_length_mismatch() {
        assert!(LineSeries::new("a", vec![1.0], vec![], Rgba::BLACK).is_err());
    }

    #[test]
    fn test_vertical_profile_on_semilog_axes() {
        let axes = Axes::new((1e-2, 1e2), (0.0, 4.0), Scale::Log).unwrap();
        let rect = Rect::new(0, 0, 80, 80);
        let mut canvas = Canvas::new(80, 80, Rgba::WHITE);
        // constant x = 1 from y 0 to 4: vertical line in the middle column
        let s = LineSeries::new("run1", vec![1.0, 1.0], vec![0.0, 4.0], SERIES_COLORS[0]).unwrap();

        render_lines(&[s], &axes, &mut canvas, rect, 1).unwrap();

        assert_eq!(canvas.pixel(40, 60), Some(SERIES_COLORS[0]));
        assert_eq!(canvas.pixel(0, 40), Some(Rgba::BLACK));
    }

    #[test]
    fn test_key_shows_swatch_and_label() {
        let axes = Axes::linear((0.0, 1.0), (0.0, 1.0)).unwrap();
        let rect = Rect::new(0, 0, 200, 100);
        let mut canvas = Canvas::new(200, 100, Rgba::WHITE);
        let color = SERIES_COLORS[1];
        // drawn entirely outside the axes, so only the key carries its colour
        let s = LineSeries::new("RH: 95%", vec![5.0, 6.0], vec![5.0, 6.0], color).unwrap();

        render_lines(&[s], &axes, &mut canvas, rect, 1).unwrap();

        let swatch = canvas
            .pixels()
            .chunks_exact(4)
            .filter(|px| *px == color.to_array())
            .count();
        assert_eq!(swatch, SWATCH * SWATCH);

        let text = TextPainter::new(LABEL_SIZE).unwrap();
        let label_x = 200 - LEGEND_PAD - text.width("RH: 95%") - LEGEND_PAD;
        let dark = (LEGEND_PAD..LEGEND_PAD + 20)
            .flat_map(|y| (label_x..196).map(move |x| (x, y)))
            .filter(|&(x, y)| {
                canvas.pixel(x, y).map_or(false, |p| p.r < 128 && p.g < 128 && p.b < 128)
            })
            .count();
        assert!(dark > 10);
    }

    #[test]
    fn test_non_positive_breaks_line() {
        let axes = Axes::new((1e-2, 1e2), (0.0, 4.0), Scale::Log).unwrap();
        let rect = Rect::new(0, 0, 80, 80);
        let mut canvas = Canvas::new(80, 80, Rgba::WHITE);
        let color = SERIES_COLORS[3];
        let s = LineSeries::new("gap", vec![1.0, 0.0, 1.0], vec![0.0, 2.0, 4.0], color).unwrap();

        render_lines(&[s], &axes, &mut canvas, rect, 1).unwrap();

        // below the key
        let painted = (32..79)
            .flat_map(|y| (1..60).map(move |x| (x, y)))
            .filter(|&(x, y)| canvas.pixel(x, y) == Some(color))
            .count();
        assert_eq!(painted, 0);
    }
}
