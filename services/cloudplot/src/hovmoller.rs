//! `hovmoller` command: pressure perturbation against time and horizontal
//! position at one height.

use anyhow::{Context, Result};
use tracing::info;

use netcdf_parser::{ModelOutput, Section};
use profile_store::{Run, StoreConfig};
use renderer::Axes;

use crate::config::{label_for, CloudplotConfig, HovmollerConfig};
use crate::section::{draw_panel, figure};

pub fn run(config: &CloudplotConfig) -> Result<()> {
    let hovmoller = config
        .hovmoller
        .as_ref()
        .context("No `hovmoller` block in the config")?;
    anyhow::ensure!(!hovmoller.runs.is_empty(), "hovmoller: no runs configured");

    let (mut canvas, layout) = figure(hovmoller.runs.len(), hovmoller.columns, hovmoller.panel);

    for (i, (run, cell)) in hovmoller.runs.iter().zip(&layout.panels).enumerate() {
        let slice = load_pressure(&config.store, run, hovmoller)?;
        let axes = axes_for(&slice).with_context(|| format!("{}: degenerate axes", run))?;
        info!(
            run = %run,
            label = %label_for(&hovmoller.runs, &hovmoller.labels, i),
            height = hovmoller.height,
            range = ?slice.value_range(),
            "Pressure section loaded"
        );
        let text = hovmoller.panel_text(i);
        draw_panel(slice, &hovmoller.style, &axes, &text, &mut canvas, *cell)?;
    }

    canvas
        .save(&hovmoller.output)
        .with_context(|| format!("Failed to write {:?}", hovmoller.output))?;
    info!(output = %hovmoller.output.display(), panels = layout.len(), "Wrote hovmoller plot");
    Ok(())
}

/// Pressure perturbation of `run` at the configured height, times along x and
/// horizontal position along y, both in plot units.
pub fn load_pressure(store: &StoreConfig, run: &Run, hovmoller: &HovmollerConfig) -> Result<Section> {
    let path = store.source_path(run);
    let output = ModelOutput::open(&path)
        .with_context(|| format!("Failed to open source data for {}", run))?;

    let height_index = output
        .height_index(hovmoller.height)
        .with_context(|| format!("{}: no height level at {} m", run, hovmoller.height))?;

    let slice = output
        .pressure_section(height_index)
        .with_context(|| format!("{}: failed to read pressure", run))?;

    Ok(slice.scale_axes(hovmoller.time_scale, hovmoller.axis_scale))
}

/// Time from zero to the last output, the full horizontal extent.
fn axes_for(slice: &Section) -> Result<Axes> {
    let last_time = slice.x.last().copied().unwrap_or(0.0);
    let first_time = slice.x.first().copied().unwrap_or(0.0).min(0.0);
    let (y_min, y_max) = match (slice.y.first(), slice.y.last()) {
        (Some(&lo), Some(&hi)) => (lo, hi),
        _ => anyhow::bail!("empty horizontal axis"),
    };
    Ok(Axes::linear((first_time, last_time), (y_min, y_max))?)
}
