//! Text drawing with the embedded DejaVu Sans Mono face.
//!
//! [`Canvas`] implements imageproc's drawing canvas, so glyphs are rasterised
//! by `imageproc::drawing::draw_text_mut` and blended onto what is already
//! there.

use imageproc::drawing::{draw_text_mut, Canvas as DrawTarget};
use rusttype::{point, Font, Scale};

use crate::canvas::{Canvas, Rgba};
use crate::error::{RenderError, RenderResult};
use crate::layout::Rect;

/// Embedded font data - DejaVu Sans Mono
const FONT_DATA: &[u8] = include_bytes!("../assets/DejaVuSansMono.ttf");

/// Tick values, legend entries and colour bar levels.
pub const LABEL_SIZE: f32 = 12.0;
/// Panel titles.
pub const TITLE_SIZE: f32 = 14.0;

impl DrawTarget for Canvas {
    type Pixel = image::Rgba<u8>;

    fn dimensions(&self) -> (u32, u32) {
        (self.width() as u32, self.height() as u32)
    }

    fn get_pixel(&self, x: u32, y: u32) -> Self::Pixel {
        let color = self.pixel(x as usize, y as usize).unwrap_or(Rgba::TRANSPARENT);
        image::Rgba(color.to_array())
    }

    fn draw_pixel(&mut self, x: u32, y: u32, color: Self::Pixel) {
        let [r, g, b, a] = color.0;
        self.set_pixel(x as i64, y as i64, Rgba { r, g, b, a });
    }
}

/// The embedded face at one pixel size.
#[derive(Clone)]
pub struct TextPainter {
    font: Font<'static>,
    scale: Scale,
}

impl TextPainter {
    pub fn new(size: f32) -> RenderResult<Self> {
        let font = Font::try_from_bytes(FONT_DATA)
            .ok_or_else(|| RenderError::Font("embedded font could not be parsed".to_string()))?;
        Ok(Self {
            font,
            scale: Scale::uniform(size),
        })
    }

    /// Advance width of `text` in pixels.
    pub fn width(&self, text: &str) -> usize {
        self.font
            .layout(text, self.scale, point(0.0, 0.0))
            .last()
            .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
            .unwrap_or(0.0)
            .ceil() as usize
    }

    /// Height of one line, ascender to descender.
    pub fn line_height(&self) -> usize {
        let v = self.font.v_metrics(self.scale);
        (v.ascent - v.descent).ceil() as usize
    }

    /// Draw `text` with the top-left of its line box at (`x`, `y`).
    /// Glyphs falling outside the canvas are dropped.
    pub fn draw(&self, canvas: &mut Canvas, text: &str, x: i64, y: i64, color: Rgba) {
        if text.is_empty() {
            return;
        }
        draw_text_mut(
            canvas,
            image::Rgba(color.to_array()),
            x as i32,
            y as i32,
            self.scale,
            &self.font,
            text,
        );
    }

    /// Draw `text` centred in `rect`.
    pub fn draw_centered(&self, canvas: &mut Canvas, text: &str, rect: Rect, color: Rgba) {
        let x = rect.x as i64 + (rect.width as i64 - self.width(text) as i64) / 2;
        let y = rect.y as i64 + (rect.height as i64 - self.line_height() as i64) / 2;
        self.draw(canvas, text, x, y, color);
    }

    /// Draw `text` reading bottom to top, centred in `rect`.
    ///
    /// The text is rasterised on a white strip and rotated, so it is meant
    /// for white margins.
    pub fn draw_vertical(&self, canvas: &mut Canvas, text: &str, rect: Rect, color: Rgba) {
        let (width, height) = (self.width(text), self.line_height());
        if width == 0 {
            return;
        }
        let mut strip = Canvas::new(width, height, Rgba::WHITE);
        self.draw(&mut strip, text, 0, 0, color);

        let x0 = rect.x as i64 + (rect.width as i64 - height as i64) / 2;
        let y0 = rect.y as i64 + (rect.height as i64 - width as i64) / 2;
        for ty in 0..height {
            for tx in 0..width {
                match strip.pixel(tx, ty) {
                    Some(p) if p != Rgba::WHITE => {
                        canvas.set_pixel(x0 + ty as i64, y0 + (width - 1 - tx) as i64, p)
                    }
                    _ => {}
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inked(canvas: &Canvas, rect: Rect) -> usize {
        (rect.y..rect.bottom())
            .flat_map(|y| (rect.x..rect.right()).map(move |x| (x, y)))
            .filter(|&(x, y)| canvas.pixel(x, y) != Some(Rgba::WHITE))
            .count()
    }

    #[test]
    fn test_monospace_width() {
        let text = TextPainter::new(LABEL_SIZE).unwrap();
        let one = text.width("0");
        assert!(one > 0);
        assert!(text.width("0000").abs_diff(4 * one) <= 1);
        assert_eq!(text.width(""), 0);
        assert!(text.line_height() >= LABEL_SIZE as usize);
    }

    #[test]
    fn test_draw_stays_in_line_box() {
        let text = TextPainter::new(LABEL_SIZE).unwrap();
        let mut canvas = Canvas::new(80, 40, Rgba::WHITE);
        text.draw(&mut canvas, "1e-2", 10, 10, Rgba::BLACK);

        let line_box = Rect::new(10, 10, text.width("1e-2") + 1, text.line_height());
        assert!(inked(&canvas, line_box) > 10);
        assert_eq!(inked(&canvas, Rect::new(0, 0, 80, 40)), inked(&canvas, line_box));
    }

    #[test]
    fn test_draw_clips_at_canvas_edge() {
        let text = TextPainter::new(TITLE_SIZE).unwrap();
        let mut canvas = Canvas::new(20, 10, Rgba::WHITE);
        text.draw(&mut canvas, "Relative Humidity", -5, -4, Rgba::BLACK);
        assert!(inked(&canvas, Rect::new(0, 0, 20, 10)) > 0);
    }

    #[test]
    fn test_vertical_text_is_tall() {
        let text = TextPainter::new(LABEL_SIZE).unwrap();
        let mut canvas = Canvas::new(40, 120, Rgba::WHITE);
        text.draw_vertical(&mut canvas, "Altitude/km", Rect::new(0, 0, 40, 120), Rgba::BLACK);

        let inked_rows = (0..120)
            .filter(|&y| (0..40).any(|x| canvas.pixel(x, y) != Some(Rgba::WHITE)))
            .count();
        let inked_columns = (0..40)
            .filter(|&x| (0..120).any(|y| canvas.pixel(x, y) != Some(Rgba::WHITE)))
            .count();
        assert!(inked_rows > inked_columns);
        assert!(inked_columns <= text.line_height());
    }
}
