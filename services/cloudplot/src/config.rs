//! YAML configuration with `${VAR}` / `${VAR:-default}` substitution.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use profile_store::{Run, StoreConfig};
use renderer::{Axes, BandStyle, Extend, PanelText, Scale};

// ============================================================================
// Configuration structures
// ============================================================================

/// Root of the configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CloudplotConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub profiles: Option<ProfilesConfig>,
    #[serde(default)]
    pub section: Option<SectionConfig>,
    #[serde(default)]
    pub hovmoller: Option<HovmollerConfig>,
}

/// Pixel size of an image or of one panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ImageSize {
    pub width: usize,
    pub height: usize,
}

impl ImageSize {
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }
}

/// Vertical profiles of one variable across runs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProfilesConfig {
    /// Runs whose profiles are fetched (and cached).
    pub runs: Vec<Run>,
    pub variable: String,
    /// Subset of `runs` drawn on the line plot.
    pub plot_runs: Vec<Run>,
    /// One legend label per plot run, or none.
    pub labels: Vec<String>,
    pub x_limits: [f64; 2],
    /// Height axis limits after `height_scale` is applied.
    pub y_limits: [f64; 2],
    pub x_scale: Scale,
    /// Multiplier applied to heights before plotting (m to km by default).
    pub height_scale: f64,
    pub line_width: u32,
    pub title: String,
    /// Value axis label; defaults to the variable's description and units.
    pub x_label: Option<String>,
    pub y_label: String,
    pub output: Option<PathBuf>,
    pub size: ImageSize,
}

impl Default for ProfilesConfig {
    fn default() -> Self {
        Self {
            runs: Vec::new(),
            variable: "nc".to_string(),
            plot_runs: Vec::new(),
            labels: Vec::new(),
            x_limits: [1e-2, 1e10],
            y_limits: [0.5, 4.5],
            x_scale: Scale::Log,
            height_scale: 1e-3,
            line_width: 2,
            title: String::new(),
            x_label: None,
            y_label: "Height, km".to_string(),
            output: None,
            size: ImageSize::new(640, 480),
        }
    }
}

impl ProfilesConfig {
    pub fn axes(&self) -> Result<Axes> {
        Axes::new(
            (self.x_limits[0], self.x_limits[1]),
            (self.y_limits[0], self.y_limits[1]),
            self.x_scale,
        )
        .context("Invalid profile plot limits")
    }
}

/// Horizontal/height snapshot of one variable, one panel per run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SectionConfig {
    pub runs: Vec<Run>,
    pub labels: Vec<String>,
    pub variable: String,
    /// Output time of the snapshot in seconds.
    pub time: f64,
    /// Half-open range of height indices to slice.
    pub z_window: [usize; 2],
    /// Horizontal and height limits after `axis_scale` is applied.
    pub x_limits: [f64; 2],
    pub y_limits: [f64; 2],
    pub axis_scale: f64,
    pub style: BandStyle,
    /// Panel titles are this prefix followed by the run's label.
    pub title_prefix: String,
    pub x_label: String,
    pub y_label: String,
    pub columns: usize,
    /// Size of one panel; the figure grows with the number of panels.
    pub panel: ImageSize,
    pub output: PathBuf,
}

impl Default for SectionConfig {
    fn default() -> Self {
        Self {
            runs: Vec::new(),
            labels: Vec::new(),
            variable: "qc".to_string(),
            time: 1800.0,
            z_window: [25, 150],
            x_limits: [-10.0, 10.0],
            y_limits: [0.5, 3.0],
            axis_scale: 1e-3,
            style: BandStyle {
                levels: vec![0.0, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0],
                colors: ["#f2f0f7", "#dadaeb", "#bcbddc", "#9e9ac8", "#756bb1", "#54278f"]
                    .iter()
                    .map(|c| c.to_string())
                    .collect(),
                extend: Extend::Neither,
            },
            title_prefix: "Height of shear layer: ".to_string(),
            x_label: "Horizontal distance/km".to_string(),
            y_label: "Altitude/km".to_string(),
            columns: 1,
            panel: ImageSize::new(960, 240),
            output: PathBuf::from("section.png"),
        }
    }
}

impl SectionConfig {
    pub fn axes(&self) -> Result<Axes> {
        Axes::linear(
            (self.x_limits[0], self.x_limits[1]),
            (self.y_limits[0], self.y_limits[1]),
        )
        .context("Invalid section limits")
    }

    pub fn panel_text(&self, i: usize) -> PanelText {
        let title = format!("{}{}", self.title_prefix, label_for(&self.runs, &self.labels, i));
        PanelText::new(title, &self.x_label, &self.y_label)
    }
}

/// Pressure perturbation against time and horizontal position at one height.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HovmollerConfig {
    pub runs: Vec<Run>,
    pub labels: Vec<String>,
    /// Height level in metres; must match a level of the run exactly.
    pub height: f64,
    /// Multiplier for times (s to h by default).
    pub time_scale: f64,
    /// Multiplier for horizontal positions (m to km by default).
    pub axis_scale: f64,
    pub style: BandStyle,
    /// Panel titles are this prefix followed by the run's label.
    pub title_prefix: String,
    pub x_label: String,
    pub y_label: String,
    pub columns: usize,
    pub panel: ImageSize,
    pub output: PathBuf,
}

impl Default for HovmollerConfig {
    fn default() -> Self {
        Self {
            runs: Vec::new(),
            labels: Vec::new(),
            height: 1510.0,
            time_scale: 1.0 / 3600.0,
            axis_scale: 1e-3,
            style: BandStyle {
                levels: vec![-10.0, -5.0, -1.0, 1.0, 5.0, 10.0],
                colors: ["#a6611a", "#dfc27d", "#f5f5f5", "#80cdc1", "#018571"]
                    .iter()
                    .map(|c| c.to_string())
                    .collect(),
                extend: Extend::Neither,
            },
            title_prefix: "Relative Humidity: ".to_string(),
            x_label: "Time, hrs".to_string(),
            y_label: "Horizontal distance, km".to_string(),
            columns: 2,
            panel: ImageSize::new(480, 360),
            output: PathBuf::from("hovmoller.png"),
        }
    }
}

impl HovmollerConfig {
    pub fn panel_text(&self, i: usize) -> PanelText {
        let title = format!("{}{}", self.title_prefix, label_for(&self.runs, &self.labels, i));
        PanelText::new(title, &self.x_label, &self.y_label)
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Load, expand and validate the configuration file at `path`.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CloudplotConfig> {
    let content = fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read config from {:?}", path.as_ref()))?;

    parse_config(&content)
        .with_context(|| format!("Invalid config in {:?}", path.as_ref()))
}

/// Parse configuration text; see [`load_config`].
pub fn parse_config(content: &str) -> Result<CloudplotConfig> {
    let expanded = expand_env_vars(content)?;

    let config: CloudplotConfig =
        serde_yaml::from_str(&expanded).context("Failed to parse config YAML")?;

    validate_config(&config)?;

    Ok(config)
}

// ============================================================================
// Environment Variable Expansion
// ============================================================================

/// Expand environment variables in the format ${VAR} or ${VAR:-default}
fn expand_env_vars(content: &str) -> Result<String> {
    let mut result = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek() == Some(&'{') {
            chars.next(); // consume '{'

            let mut var_expr = String::new();
            let mut brace_count = 1;

            while brace_count > 0 {
                match chars.next() {
                    Some('{') => {
                        brace_count += 1;
                        var_expr.push('{');
                    }
                    Some('}') => {
                        brace_count -= 1;
                        if brace_count > 0 {
                            var_expr.push('}');
                        }
                    }
                    Some(c) => var_expr.push(c),
                    None => anyhow::bail!("Unclosed variable substitution: ${{{}", var_expr),
                }
            }

            result.push_str(&resolve_var_expr(&var_expr)?);
        } else {
            result.push(ch);
        }
    }

    Ok(result)
}

/// Resolve variable expression (supports VAR and VAR:-default syntax)
fn resolve_var_expr(expr: &str) -> Result<String> {
    if let Some((var_name, default)) = expr.split_once(":-") {
        match std::env::var(var_name.trim()) {
            Ok(val) if !val.is_empty() => Ok(val),
            _ => Ok(default.to_string()),
        }
    } else {
        std::env::var(expr.trim())
            .with_context(|| format!("Environment variable {} not set", expr))
    }
}

// ============================================================================
// Validation
// ============================================================================

fn validate_labels(block: &str, runs: &[Run], labels: &[String]) -> Result<()> {
    anyhow::ensure!(
        labels.is_empty() || labels.len() == runs.len(),
        "{}: {} labels for {} runs",
        block,
        labels.len(),
        runs.len()
    );
    Ok(())
}

fn validate_config(config: &CloudplotConfig) -> Result<()> {
    config.store.validate().context("store")?;

    if let Some(profiles) = &config.profiles {
        config
            .store
            .variable(&profiles.variable)
            .context("profiles.variable")?;
        validate_labels("profiles", &profiles.plot_runs, &profiles.labels)?;
        if let Some(missing) = profiles.plot_runs.iter().find(|r| !profiles.runs.contains(r)) {
            anyhow::bail!("profiles: plot run {} is not listed in runs", missing);
        }
        anyhow::ensure!(
            profiles.plot_runs.is_empty() || profiles.output.is_some(),
            "profiles: plot_runs given without an output path"
        );
        anyhow::ensure!(
            profiles.height_scale.is_finite() && profiles.height_scale > 0.0,
            "profiles: height_scale must be positive"
        );
        profiles.axes()?;
    }

    if let Some(section) = &config.section {
        config
            .store
            .variable(&section.variable)
            .context("section.variable")?;
        validate_labels("section", &section.runs, &section.labels)?;
        anyhow::ensure!(
            section.z_window[0] < section.z_window[1],
            "section: z_window {:?} is empty",
            section.z_window
        );
        anyhow::ensure!(
            section.axis_scale.is_finite() && section.axis_scale > 0.0,
            "section: axis_scale must be positive"
        );
        anyhow::ensure!(section.columns > 0, "section: columns must be at least 1");
        section.style.validate().context("section.style")?;
        section.axes()?;
    }

    if let Some(hovmoller) = &config.hovmoller {
        validate_labels("hovmoller", &hovmoller.runs, &hovmoller.labels)?;
        anyhow::ensure!(
            hovmoller.time_scale > 0.0 && hovmoller.axis_scale > 0.0,
            "hovmoller: scale factors must be positive"
        );
        anyhow::ensure!(hovmoller.columns > 0, "hovmoller: columns must be at least 1");
        hovmoller.style.validate().context("hovmoller.style")?;
    }

    Ok(())
}

/// Label for panel `i`, falling back to the run name.
pub fn label_for(runs: &[Run], labels: &[String], i: usize) -> String {
    labels
        .get(i)
        .cloned()
        .unwrap_or_else(|| runs[i].to_string())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_env_vars_simple() {
        std::env::set_var("CLOUDPLOT_TEST_VAR", "test_value");
        let result = expand_env_vars("prefix_${CLOUDPLOT_TEST_VAR}_suffix").unwrap();
        assert_eq!(result, "prefix_test_value_suffix");
    }

    #[test]
    fn test_expand_env_vars_with_default() {
        std::env::remove_var("CLOUDPLOT_NONEXISTENT_VAR");
        let result = expand_env_vars("value_${CLOUDPLOT_NONEXISTENT_VAR:-default}_end").unwrap();
        assert_eq!(result, "value_default_end");
    }

    #[test]
    fn test_expand_env_vars_missing_required() {
        std::env::remove_var("CLOUDPLOT_REQUIRED_VAR");
        assert!(expand_env_vars("${CLOUDPLOT_REQUIRED_VAR}").is_err());
        assert!(expand_env_vars("${UNCLOSED").is_err());
    }

    #[test]
    fn test_resolve_var_expr_override_default() {
        std::env::set_var("CLOUDPLOT_SET_VAR", "custom");
        let result = resolve_var_expr("CLOUDPLOT_SET_VAR:-default").unwrap();
        assert_eq!(result, "custom");
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("{}").unwrap();
        assert_eq!(config.store, StoreConfig::default());
        assert!(config.profiles.is_none());
        assert!(config.section.is_none());
    }

    #[test]
    fn test_full_config() {
        std::env::set_var("CLOUDPLOT_TEST_DATA", "/data/runs");
        let yaml = r##"
store:
  data_dir: ${CLOUDPLOT_TEST_DATA}
  cache_dir: ${CLOUDPLOT_TEST_CACHE:-cache}
profiles:
  runs: [1, 2, 3, 7, 8, run9]
  plot_runs: [3, 2, 1, 7, 8]
  labels: ["RH: 70%", "RH: 80%", "RH: 90%", "RH: 95%", "RH: 99.5%"]
  output: ncz_semilog.png
section:
  runs: [1, 9, 10]
  labels: ["1700m", "1650m", "1600m"]
  time: 1800
hovmoller:
  runs: [3, 2, 1, 7, 8]
  height: 1510
  style:
    levels: [-10, -5, -1, 1, 5, 10]
    colors: ["#a6611a", "#dfc27d", "#f5f5f5", "#80cdc1", "#018571"]
    extend: both
"##;
        let config = parse_config(yaml).unwrap();

        assert_eq!(config.store.data_dir, PathBuf::from("/data/runs"));
        assert_eq!(config.store.cache_dir, PathBuf::from("cache"));

        let profiles = config.profiles.unwrap();
        assert_eq!(profiles.runs.len(), 6);
        assert_eq!(profiles.runs[5], Run::new("run9").unwrap());
        assert_eq!(profiles.plot_runs[0], Run::numbered(3));
        assert_eq!(profiles.variable, "nc");
        assert_eq!(profiles.x_scale, Scale::Log);

        let section = config.section.unwrap();
        assert_eq!(section.variable, "qc");
        assert_eq!(section.z_window, [25, 150]);
        assert_eq!(section.style.band_count(), 6);

        let hovmoller = config.hovmoller.unwrap();
        assert_eq!(hovmoller.style.extend, Extend::Both);
        assert_eq!(label_for(&hovmoller.runs, &hovmoller.labels, 0), "run3");
        assert_eq!(hovmoller.panel_text(0).title, "Relative Humidity: run3");
        assert_eq!(section.panel_text(1).title, "Height of shear layer: 1650m");
    }

    #[test]
    fn test_default_styles_have_closed_ends() {
        let config = parse_config("section:\n  runs: [1]\nhovmoller:\n  runs: [1]\n").unwrap();
        assert_eq!(config.section.unwrap().style.extend, Extend::Neither);
        assert_eq!(config.hovmoller.unwrap().style.extend, Extend::Neither);
    }

    #[test]
    fn test_label_count_mismatch_rejected() {
        let yaml = r#"
section:
  runs: [1, 2]
  labels: ["only one"]
"#;
        let err = parse_config(yaml).unwrap_err();
        assert!(format!("{:#}", err).contains("1 labels for 2 runs"));
    }

    #[test]
    fn test_invalid_style_rejected() {
        let yaml = r##"
hovmoller:
  runs: [1]
  style:
    levels: [0, 1]
    colors: ["#000000", "#ffffff"]
"##;
        assert!(parse_config(yaml).is_err());
    }

    #[test]
    fn test_plot_run_must_be_fetched() {
        let yaml = r#"
profiles:
  runs: [1]
  plot_runs: [2]
  output: out.png
"#;
        assert!(parse_config(yaml).is_err());
    }

    #[test]
    fn test_unknown_variable_rejected() {
        let yaml = r#"
profiles:
  runs: [1]
  variable: not_a_variable
"#;
        assert!(parse_config(yaml).is_err());
    }
}
