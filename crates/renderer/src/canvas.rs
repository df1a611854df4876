//! RGBA8 raster canvas.

use std::path::Path;

use tracing::debug;

use crate::error::RenderResult;
use crate::layout::Rect;
use crate::png;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::opaque(0, 0, 0);
    pub const WHITE: Rgba = Rgba::opaque(255, 255, 255);
    pub const GRID: Rgba = Rgba::opaque(200, 200, 200);
    pub const TRANSPARENT: Rgba = Rgba { r: 0, g: 0, b: 0, a: 0 };

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Row-major RGBA pixels, origin at the top left.
#[derive(Debug, Clone)]
pub struct Canvas {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl Canvas {
    pub fn new(width: usize, height: usize, background: Rgba) -> Self {
        let mut canvas = Self {
            width,
            height,
            pixels: vec![0; width * height * 4],
        };
        canvas.fill(background);
        canvas
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn fill(&mut self, color: Rgba) {
        let c = color.to_array();
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&c);
        }
    }

    /// Pixels outside the canvas are ignored.
    pub fn set_pixel(&mut self, x: i64, y: i64, color: Rgba) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let i = (y as usize * self.width + x as usize) * 4;
        self.pixels[i..i + 4].copy_from_slice(&color.to_array());
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * 4;
        let p = &self.pixels[i..i + 4];
        Some(Rgba {
            r: p[0],
            g: p[1],
            b: p[2],
            a: p[3],
        })
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        let x0 = rect.x.min(self.width);
        let y0 = rect.y.min(self.height);
        let x1 = (rect.x + rect.width).min(self.width);
        let y1 = (rect.y + rect.height).min(self.height);
        let c = color.to_array();
        for y in y0..y1 {
            let row = y * self.width;
            for x in x0..x1 {
                let i = (row + x) * 4;
                self.pixels[i..i + 4].copy_from_slice(&c);
            }
        }
    }

    pub fn stroke_rect(&mut self, rect: Rect, color: Rgba) {
        if rect.width == 0 || rect.height == 0 {
            return;
        }
        let (x0, y0) = (rect.x as i64, rect.y as i64);
        let (x1, y1) = (x0 + rect.width as i64 - 1, y0 + rect.height as i64 - 1);
        self.line(x0, y0, x1, y0, color);
        self.line(x0, y1, x1, y1, color);
        self.line(x0, y0, x0, y1, color);
        self.line(x1, y0, x1, y1, color);
    }

    /// Bresenham line, endpoints inclusive.
    pub fn line(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: Rgba) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let (mut x, mut y) = (x0, y0);

        loop {
            self.set_pixel(x, y, color);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// A line `thickness` pixels wide, thickened perpendicular to its major axis.
    pub fn thick_line(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, thickness: u32, color: Rgba) {
        let half = thickness.max(1) as i64 / 2;
        let steep = (y1 - y0).abs() > (x1 - x0).abs();
        for offset in -half..=(thickness.max(1) as i64 - 1 - half) {
            if steep {
                self.line(x0 + offset, y0, x1 + offset, y1, color);
            } else {
                self.line(x0, y0 + offset, x1, y1 + offset, color);
            }
        }
    }

    pub fn to_png(&self) -> RenderResult<Vec<u8>> {
        let (bytes, mode) = png::encode_auto(&self.pixels, self.width, self.height)?;
        debug!(
            width = self.width,
            height = self.height,
            mode = ?mode,
            bytes = bytes.len(),
            "Encoded PNG"
        );
        Ok(bytes)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> RenderResult<()> {
        let bytes = self.to_png()?;
        std::fs::write(path.as_ref(), bytes)?;
        Ok(())
    }
}
