//! `profiles` command: fetch cached profiles and plot them.

use std::collections::HashMap;

use anyhow::{Context, Result};
use tracing::{info, warn};

use profile_store::{ExtractAndCacheStore, NetCdfProfileSource, Profile, Run, VariableSpec};
use renderer::{render_lines, Canvas, LineSeries, PanelText, Rect, Rgba, SERIES_COLORS};

use crate::config::{label_for, CloudplotConfig, ProfilesConfig};

const PLOT_MARGIN: usize = 8;

pub fn run(
    config: &CloudplotConfig,
    variable: Option<&str>,
    force: bool,
    runs: &[Run],
) -> Result<()> {
    let plot = config.profiles.clone().unwrap_or_default();
    let variable = variable.unwrap_or(&plot.variable);
    let runs: Vec<Run> = if runs.is_empty() {
        plot.runs.clone()
    } else {
        runs.to_vec()
    };
    anyhow::ensure!(
        !runs.is_empty(),
        "No runs given: pass --runs or list profiles.runs in the config"
    );

    let source = NetCdfProfileSource::from_config(&config.store);
    let store = ExtractAndCacheStore::new(config.store.clone(), source)
        .context("Failed to set up profile store")?;

    info!(runs = runs.len(), variable = %variable, force = force, "Fetching profiles");

    let results = store.get_profiles(&runs, variable, force);

    let mut fetched: HashMap<Run, Profile> = HashMap::new();
    let mut failed = 0;
    for (run, result) in runs.iter().zip(results) {
        match result {
            Ok(profile) => {
                log_summary(run, &profile);
                fetched.insert(run.clone(), profile);
            }
            // already reported by the store
            Err(_) => failed += 1,
        }
    }

    let stats = store.stats();
    info!(
        hits = stats.hits,
        misses = stats.misses,
        computations = stats.computations,
        writes = stats.writes,
        hit_rate = %format!("{:.1}%", stats.hit_rate()),
        "Profiles fetched"
    );

    if let Some(output) = &plot.output {
        if !plot.plot_runs.is_empty() {
            let mut series = Vec::new();
            for (i, run) in plot.plot_runs.iter().enumerate() {
                match fetched.get(run) {
                    Some(profile) => {
                        series.push((label_for(&plot.plot_runs, &plot.labels, i), profile))
                    }
                    None => warn!(run = %run, "No profile to plot"),
                }
            }
            let spec = config.store.variable(variable)?;
            let canvas = render_profiles(&plot, &series, &value_label(&plot, spec))?;
            canvas
                .save(output)
                .with_context(|| format!("Failed to write {:?}", output))?;
            info!(output = %output.display(), series = series.len(), "Wrote profile plot");
        }
    }

    anyhow::ensure!(
        failed == 0,
        "{} of {} profiles unavailable",
        failed,
        runs.len()
    );
    Ok(())
}

fn log_summary(run: &Run, profile: &Profile) {
    match profile.peak() {
        Some(peak) => info!(
            run = %run,
            variable = %profile.variable_label(),
            levels = profile.len(),
            peak_height = peak.coordinate,
            peak_value = peak.value,
            "Profile ready"
        ),
        None => info!(
            run = %run,
            variable = %profile.variable_label(),
            levels = profile.len(),
            "Profile ready, no finite values"
        ),
    }
}

/// Label for the value axis: the configured one, else the variable's
/// description and units.
fn value_label(plot: &ProfilesConfig, spec: &VariableSpec) -> String {
    if let Some(label) = &plot.x_label {
        return label.clone();
    }
    let name = spec.description.as_deref().unwrap_or(&spec.name);
    match &spec.units {
        Some(units) => format!("{}, {}", name, units),
        None => name.to_string(),
    }
}

fn panel_text(plot: &ProfilesConfig, x_label: &str) -> PanelText {
    PanelText::new(&plot.title, x_label, &plot.y_label)
}

fn plot_area(plot: &ProfilesConfig, text: &PanelText) -> Rect {
    text.plot_area(Rect::new(0, 0, plot.size.width, plot.size.height).inset(PLOT_MARGIN))
}

/// Draw one semilog line per `(label, profile)`: value along x, scaled height
/// along y, with a key of the labels.
pub fn render_profiles(
    plot: &ProfilesConfig,
    series: &[(String, &Profile)],
    x_label: &str,
) -> Result<Canvas> {
    let axes = plot.axes()?;

    let lines = series
        .iter()
        .enumerate()
        .map(|(i, (label, profile))| {
            let heights = profile
                .coordinates()
                .into_iter()
                .map(|z| z * plot.height_scale)
                .collect();
            LineSeries::new(
                label.clone(),
                profile.values(),
                heights,
                SERIES_COLORS[i % SERIES_COLORS.len()],
            )
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut canvas = Canvas::new(plot.size.width, plot.size.height, Rgba::WHITE);
    let text = panel_text(plot, x_label);
    let area = plot_area(plot, &text);
    render_lines(&lines, &axes, &mut canvas, area, plot.line_width)?;
    text.draw(&axes, &mut canvas, area)?;
    Ok(canvas)
}
