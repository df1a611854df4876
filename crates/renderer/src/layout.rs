//! Panel placement on a figure.

/// Pixel rectangle; `x`/`y` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Rect {
    pub const fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Shrink by `margin` on every side; collapses to zero size rather than
    /// underflowing.
    pub fn inset(self, margin: usize) -> Self {
        let width = self.width.saturating_sub(2 * margin);
        let height = self.height.saturating_sub(2 * margin);
        Self {
            x: self.x + margin.min(self.width / 2),
            y: self.y + margin.min(self.height / 2),
            width,
            height,
        }
    }

    /// Split off a strip on the right of `strip` pixels, separated by `gap`.
    ///
    /// Returns `(left, right)`.
    pub fn split_right(self, strip: usize, gap: usize) -> (Rect, Rect) {
        let strip = strip.min(self.width);
        let left_width = self.width.saturating_sub(strip + gap);
        (
            Rect::new(self.x, self.y, left_width, self.height),
            Rect::new(self.x + self.width - strip, self.y, strip, self.height),
        )
    }

    pub fn right(&self) -> usize {
        self.x + self.width
    }

    pub fn bottom(&self) -> usize {
        self.y + self.height
    }
}

/// Equal panels arranged in rows.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelLayout {
    pub panels: Vec<Rect>,
}

impl PanelLayout {
    /// Lay out `panels` cells, `columns` per row, over a `width` x `height`
    /// figure. An incomplete last row is centred horizontally.
    pub fn grid(panels: usize, columns: usize, width: usize, height: usize, margin: usize) -> Self {
        if panels == 0 {
            return Self { panels: Vec::new() };
        }
        let columns = columns.clamp(1, panels);
        let rows = panels.div_ceil(columns);
        let cell_w = width / columns;
        let cell_h = height / rows;

        let mut rects = Vec::with_capacity(panels);
        for i in 0..panels {
            let (row, col) = (i / columns, i % columns);
            let in_row = if row == rows - 1 {
                panels - row * columns
            } else {
                columns
            };
            let offset = (columns - in_row) * cell_w / 2;
            let cell = Rect::new(offset + col * cell_w, row * cell_h, cell_w, cell_h);
            rects.push(cell.inset(margin));
        }
        Self { panels: rects }
    }

    pub fn len(&self) -> usize {
        self.panels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }
}
