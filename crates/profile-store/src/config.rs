//! Store configuration: where runs live, where records go, what variables exist.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::catalog::{VariableCatalog, VariableSpec};
use crate::error::{Result, StoreError};
use crate::profile::check_label;
use crate::run::Run;

const RUN: &str = "{run}";
const VARIABLE: &str = "{variable}";

/// Everything the store needs, passed in at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding one source file per run.
    pub data_dir: PathBuf,

    /// Directory holding cache records.
    pub cache_dir: PathBuf,

    /// Source file name; `{run}` is replaced by the run name.
    pub source_template: String,

    /// Cache record file name; `{run}` and `{variable}` are replaced.
    pub cache_template: String,

    /// First header token of every record.
    pub coordinate_label: String,

    pub catalog: VariableCatalog,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("ncdf"),
            cache_dir: PathBuf::from("."),
            source_template: "{run}.nc".to_string(),
            cache_template: "{run}_{variable}.txt".to_string(),
            coordinate_label: "z".to_string(),
            catalog: VariableCatalog::default(),
        }
    }
}

impl StoreConfig {
    pub fn with_dirs(data_dir: impl Into<PathBuf>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            cache_dir: cache_dir.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.source_template.contains(RUN) {
            return Err(StoreError::invalid_config(
                "source_template must contain {run}",
            ));
        }
        for template in [&self.source_template, &self.cache_template] {
            if template.contains(['/', '\\']) {
                return Err(StoreError::invalid_config(format!(
                    "template {:?} must be a bare file name",
                    template
                )));
            }
        }
        self.check_cache_layout()?;
        check_label(&self.coordinate_label)
            .map_err(|e| StoreError::invalid_config(format!("coordinate_label: {}", e)))?;
        Ok(())
    }

    /// Every cache file name must belong to exactly one (run, variable) pair.
    ///
    /// With `{run}` first and separator `S` between the placeholders, run
    /// `r1` with variable `a` and run `r2` with variable `b = w + a` share a
    /// file whenever `S + w` ends with `S`; the variable-first layout mirrors
    /// this with prefixes.
    fn check_cache_layout(&self) -> Result<()> {
        let template = &self.cache_template;
        for placeholder in [RUN, VARIABLE] {
            if template.matches(placeholder).count() != 1 {
                return Err(StoreError::invalid_config(format!(
                    "cache_template must contain {} exactly once",
                    placeholder
                )));
            }
        }
        let (run_at, variable_at) = match (template.find(RUN), template.find(VARIABLE)) {
            (Some(r), Some(v)) => (r, v),
            _ => return Err(StoreError::invalid_config("cache_template is missing a placeholder")),
        };
        let run_first = run_at < variable_at;
        let separator = if run_first {
            &template[run_at + RUN.len()..variable_at]
        } else {
            &template[variable_at + VARIABLE.len()..run_at]
        };

        let names: Vec<&str> = self.catalog.variables().iter().map(|v| v.name.as_str()).collect();
        for short in &names {
            for long in names.iter().filter(|n| n.len() > short.len()) {
                let collides = if run_first {
                    long.strip_suffix(short)
                        .map_or(false, |w| format!("{}{}", separator, w).ends_with(separator))
                } else {
                    long.strip_prefix(short)
                        .map_or(false, |w| format!("{}{}", w, separator).starts_with(separator))
                };
                if collides {
                    return Err(StoreError::invalid_config(format!(
                        "variables {:?} and {:?} can share a cache file under {:?}",
                        short, long, template
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn source_path(&self, run: &Run) -> PathBuf {
        self.data_dir
            .join(self.source_template.replace(RUN, run.name()))
    }

    pub fn cache_path(&self, run: &Run, variable: &str) -> PathBuf {
        self.cache_dir
            .join(fill_template(&self.cache_template, run, variable))
    }

    pub fn variable(&self, name: &str) -> Result<&VariableSpec> {
        self.catalog.lookup(name)
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }
}

/// Substitute both placeholders in one pass, so text inside a run name is
/// never read back as a placeholder.
fn fill_template(template: &str, run: &Run, variable: &str) -> String {
    template
        .split(RUN)
        .map(|part| part.replace(VARIABLE, variable))
        .collect::<Vec<_>>()
        .join(run.name())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        let config = StoreConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(
            config.source_path(&Run::numbered(1)),
            PathBuf::from("ncdf/run1.nc")
        );
        assert_eq!(
            config.cache_path(&Run::numbered(1), "nc"),
            PathBuf::from("./run1_nc.txt")
        );
    }

    #[test]
    fn test_templates_must_name_placeholders() {
        let config = StoreConfig {
            cache_template: "{run}.txt".to_string(),
            ..StoreConfig::default()
        };
        assert!(config.validate().is_err());

        let config = StoreConfig {
            source_template: "data/{run}.nc".to_string(),
            ..StoreConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_placeholders_must_appear_once() {
        let config = StoreConfig {
            cache_template: "{run}_{variable}_{run}.txt".to_string(),
            ..StoreConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_run_names_are_not_expanded() {
        let config = StoreConfig::default();
        let braces = Run::new("{variable}").unwrap();
        assert_eq!(
            config.cache_path(&braces, "nc"),
            PathBuf::from("./{variable}_nc.txt")
        );
        assert_ne!(
            config.cache_path(&braces, "nc"),
            config.cache_path(&Run::new("nc").unwrap(), "nc")
        );
    }

    fn with_layout(template: &str, names: &[&str]) -> StoreConfig {
        let specs = names
            .iter()
            .enumerate()
            .map(|(i, name)| VariableSpec::new(*name, i))
            .collect();
        StoreConfig {
            cache_template: template.to_string(),
            catalog: VariableCatalog::new(specs).unwrap(),
            ..StoreConfig::default()
        }
    }

    #[test]
    fn test_rejects_run_first_suffix_collision() {
        // run "x_a" with "b" and run "x" with "a_b" both give x_a_b.txt
        let config = with_layout("{run}_{variable}.txt", &["b", "a_b"]);
        let err = config.validate().unwrap_err();
        assert!(matches!(err, StoreError::InvalidConfig(_)));
        assert_eq!(
            config.cache_path(&Run::new("x_a").unwrap(), "b"),
            config.cache_path(&Run::new("x").unwrap(), "a_b")
        );
    }

    #[test]
    fn test_rejects_variable_first_prefix_collision() {
        // run "b_x" with "a" and run "x" with "a_b" both give a_b_x.txt
        let config = with_layout("{variable}_{run}.txt", &["a", "a_b"]);
        assert!(matches!(config.validate(), Err(StoreError::InvalidConfig(_))));
        assert_eq!(
            config.cache_path(&Run::new("b_x").unwrap(), "a"),
            config.cache_path(&Run::new("x").unwrap(), "a_b")
        );
    }

    #[test]
    fn test_accepts_unambiguous_layouts() {
        assert!(with_layout("{variable}_{run}.txt", &["b", "a_b"]).validate().is_ok());
        assert!(with_layout("{run}-{variable}.txt", &["b", "a_b"]).validate().is_ok());
        assert!(with_layout("{run}_{variable}.txt", &["a", "a_b"]).validate().is_ok());
    }

    #[test]
    fn test_rejects_adjacent_placeholders_with_suffix_names() {
        assert!(with_layout("{run}{variable}.txt", &["b", "ab"]).validate().is_err());
        assert!(with_layout("{run}{variable}.txt", &["nc", "qc"]).validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: StoreConfig = serde_yaml::from_str("cache_dir: /tmp/profiles\n").unwrap();
        assert_eq!(config.cache_dir, PathBuf::from("/tmp/profiles"));
        assert_eq!(config.data_dir, PathBuf::from("ncdf"));
        assert_eq!(config.catalog.len(), 30);
    }
}
