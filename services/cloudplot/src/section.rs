//! `section` command: horizontal/height snapshots of one variable.

use anyhow::{Context, Result};
use tracing::info;

use netcdf_parser::{ModelOutput, Section};
use profile_store::{Run, StoreConfig, VariableSpec};
use renderer::{
    colorbar_width, draw_colorbar, render_filled, Axes, BandStyle, Canvas, Grid2D, PanelLayout,
    PanelText, Rect, Rgba,
};

use crate::config::{label_for, CloudplotConfig, ImageSize, SectionConfig};

const PANEL_MARGIN: usize = 12;
const COLORBAR_GAP: usize = 8;

pub fn run(config: &CloudplotConfig) -> Result<()> {
    let section = config
        .section
        .as_ref()
        .context("No `section` block in the config")?;
    anyhow::ensure!(!section.runs.is_empty(), "section: no runs configured");

    let spec = config.store.variable(&section.variable)?;
    let axes = section.axes()?;

    let (mut canvas, layout) = figure(section.runs.len(), section.columns, section.panel);

    for (i, (run, cell)) in section.runs.iter().zip(&layout.panels).enumerate() {
        let slice = load_section(&config.store, run, spec, section)?;
        info!(
            run = %run,
            label = %label_for(&section.runs, &section.labels, i),
            variable = %spec.name,
            range = ?slice.value_range(),
            "Section loaded"
        );
        let text = section.panel_text(i);
        draw_panel(slice, &section.style, &axes, &text, &mut canvas, *cell)?;
    }

    canvas
        .save(&section.output)
        .with_context(|| format!("Failed to write {:?}", section.output))?;
    info!(output = %section.output.display(), panels = layout.len(), "Wrote section plot");
    Ok(())
}

/// Blank figure sized for `panels` panels and their layout.
pub(crate) fn figure(panels: usize, columns: usize, panel: ImageSize) -> (Canvas, PanelLayout) {
    let columns = columns.clamp(1, panels.max(1));
    let rows = panels.div_ceil(columns).max(1);
    let (width, height) = (columns * panel.width, rows * panel.height);
    (
        Canvas::new(width, height, Rgba::WHITE),
        PanelLayout::grid(panels, columns, width, height, PANEL_MARGIN),
    )
}

/// Filled contours of `slice` framed by `text`, with a labelled colour bar
/// on the right of `cell`.
pub(crate) fn draw_panel(
    slice: Section,
    style: &BandStyle,
    axes: &Axes,
    text: &PanelText,
    canvas: &mut Canvas,
    cell: Rect,
) -> Result<()> {
    let grid = Grid2D::new(slice.x, slice.y, slice.values)?;
    let (left, strip) = cell.split_right(colorbar_width(style)?, COLORBAR_GAP);
    let plot = text.plot_area(left);
    render_filled(&grid, style, axes, canvas, plot)?;
    text.draw(axes, canvas, plot)?;
    draw_colorbar(
        style,
        canvas,
        Rect::new(strip.x, plot.y, strip.width, plot.height),
    )?;
    Ok(())
}

/// Read the configured snapshot of `spec` from `run`, with axes and values in
/// plot units.
///
/// A height window reaching past the top of the run is cut at the top.
pub fn load_section(
    store: &StoreConfig,
    run: &Run,
    spec: &VariableSpec,
    section: &SectionConfig,
) -> Result<Section> {
    let path = store.source_path(run);
    let output = ModelOutput::open(&path)
        .with_context(|| format!("Failed to open source data for {}", run))?;

    let time_index = output
        .time_index(section.time)
        .with_context(|| format!("{}: no output at time {}", run, section.time))?;
    let levels = output.heights()?.len();
    let window = section.z_window[0]..section.z_window[1].min(levels);

    let slice = output
        .height_section(spec.index, time_index, window)
        .with_context(|| format!("{}: failed to read {} section", run, spec.name))?;

    Ok(slice
        .scale_axes(section.axis_scale, section.axis_scale)
        .scale_values(spec.factor))
}
