//! Static plot rendering for cloud model products.
//!
//! Draws onto an RGBA [`Canvas`] and encodes it as PNG:
//! - filled contour panels with explicit band levels ([`filled`])
//! - colour bars for those bands, with their level values
//! - profile line plots on linear or semilog axes, with a labelled key ([`line`])
//! - panel titles, axis labels and tick values ([`panel`])
//! - multi-panel figure layout ([`layout`])
//!
//! Text uses an embedded DejaVu Sans Mono face drawn through imageproc
//! ([`text`]).

pub mod axes;
pub mod canvas;
pub mod error;
pub mod filled;
pub mod layout;
pub mod line;
pub mod panel;
pub mod png;
pub mod style;
pub mod text;

pub use axes::{Axes, Scale};
pub use canvas::{Canvas, Rgba};
pub use error::{RenderError, RenderResult};
pub use filled::{colorbar_width, draw_colorbar, render_filled, Grid2D};
pub use layout::{PanelLayout, Rect};
pub use line::{render_lines, LineSeries, SERIES_COLORS};
pub use panel::{tick_label, PanelText};
pub use style::{hex_to_rgb, BandStyle, Extend};
pub use text::TextPainter;
