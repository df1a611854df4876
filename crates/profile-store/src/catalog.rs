//! Variable catalog: which slot of the model's `q` array holds which quantity.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

fn default_factor() -> f64 {
    1.0
}

/// One entry of the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableSpec {
    /// Short name, also used in cache file names and record headers.
    pub name: String,

    /// Position on the variable axis of `q`.
    pub index: usize,

    /// Multiplied into every mean before it is stored.
    #[serde(default = "default_factor")]
    pub factor: f64,

    /// Units after `factor` has been applied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl VariableSpec {
    pub fn new(name: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            index,
            factor: 1.0,
            units: None,
            description: None,
        }
    }

    pub fn with_factor(mut self, factor: f64) -> Self {
        self.factor = factor;
        self
    }

    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A validated, ordered set of [`VariableSpec`]s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<VariableSpec>", into = "Vec<VariableSpec>")]
pub struct VariableCatalog {
    variables: Vec<VariableSpec>,
}

impl VariableCatalog {
    pub fn new(variables: Vec<VariableSpec>) -> Result<Self> {
        if variables.is_empty() {
            return Err(StoreError::invalid_config("variable catalog is empty"));
        }

        let mut names = HashSet::new();
        let mut indices = HashSet::new();
        for spec in &variables {
            if spec.name.is_empty()
                || !spec.name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
            {
                return Err(StoreError::invalid_config(format!(
                    "variable name {:?} must be non-empty and contain only letters, digits or '_'",
                    spec.name
                )));
            }
            if !names.insert(spec.name.as_str()) {
                return Err(StoreError::invalid_config(format!(
                    "duplicate variable name {:?}",
                    spec.name
                )));
            }
            if !indices.insert(spec.index) {
                return Err(StoreError::invalid_config(format!(
                    "variable {:?} reuses index {}",
                    spec.name, spec.index
                )));
            }
            if !spec.factor.is_finite() || spec.factor == 0.0 {
                return Err(StoreError::invalid_config(format!(
                    "variable {:?} has unusable factor {}",
                    spec.name, spec.factor
                )));
            }
        }

        Ok(Self { variables })
    }

    /// The 30 entries of the cloud model's `q` array, in index order.
    pub fn cloud_model() -> Self {
        let names = [
            ("qv", "Vapor mixing ratio"),
            ("an_1", "No. aerosol particles in mode 1"),
            ("as_1", "Surface area of aerosol particles in mode 1"),
            ("am_1", "Mass of aerosol particles in mode 1"),
            ("an_2", "No. aerosol particles in mode 2"),
            ("as_2", "Surface area of aerosol particles in mode 2"),
            ("am_2", "Mass of aerosol particles in mode 2"),
            ("an_m_t", "Total no. aerosol particles in mixed mode"),
            ("an_m_1", "No. aerosol particles from mode 1 in mixed mode"),
            ("as_m_1", "Surface area of aerosol particles from mode 1 in mixed mode"),
            ("am_m_1", "Mass of aerosol particles from mode 1 in mixed mode"),
            ("an_m_2", "No. aerosol particles from mode 2 in mixed mode"),
            ("as_m_2", "Surface area of aerosol particles from mode 2 in mixed mode"),
            ("am_m_2", "Mass of aerosol particles from mode 2 in mixed mode"),
            ("nc", "No. cloud droplets"),
            ("qc", "Cloud mixing ratio"),
            ("cn_1", "No. cloud particles in mode 1"),
            ("cs_1", "Surface area of cloud particles in mode 1"),
            ("cm_1", "Mass of cloud particles in mode 1"),
            ("cn_2", "No. cloud particles in mode 2"),
            ("cs_2", "Surface area of cloud particles in mode 2"),
            ("cm_2", "Mass of cloud particles in mode 2"),
            ("nr", "No. rain particles"),
            ("qr", "Rain mixing ratio"),
            ("rn_1", "No. rain particles in mode 1"),
            ("rs_1", "Surface area of rain particles in mode 1"),
            ("rm_1", "Mass of rain particles in mode 1"),
            ("rn_2", "No. rain particles in mode 2"),
            ("rs_2", "Surface area of rain particles in mode 2"),
            ("rm_2", "Mass of rain particles in mode 2"),
        ];

        let variables = names
            .iter()
            .enumerate()
            .map(|(index, (name, description))| {
                let spec = VariableSpec::new(*name, index).with_description(*description);
                match *name {
                    "qv" | "qr" => spec.with_units("kg/kg"),
                    // stored as kg/kg, reported as g/kg
                    "qc" => spec.with_factor(1000.0).with_units("g/kg"),
                    _ => spec,
                }
            })
            .collect();

        Self { variables }
    }

    pub fn lookup(&self, name: &str) -> Result<&VariableSpec> {
        self.variables
            .iter()
            .find(|v| v.name == name)
            .ok_or_else(|| StoreError::UnknownVariable(name.to_string()))
    }

    pub fn variables(&self) -> &[VariableSpec] {
        &self.variables
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

impl Default for VariableCatalog {
    fn default() -> Self {
        Self::cloud_model()
    }
}

impl TryFrom<Vec<VariableSpec>> for VariableCatalog {
    type Error = StoreError;

    fn try_from(variables: Vec<VariableSpec>) -> Result<Self> {
        Self::new(variables)
    }
}

impl From<VariableCatalog> for Vec<VariableSpec> {
    fn from(catalog: VariableCatalog) -> Self {
        catalog.variables
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cloud_model_catalog_is_valid() {
        let catalog = VariableCatalog::cloud_model();
        assert_eq!(catalog.len(), 30);
        assert!(VariableCatalog::new(catalog.variables().to_vec()).is_ok());

        let nc = catalog.lookup("nc").unwrap();
        assert_eq!(nc.index, 14);
        assert_eq!(nc.factor, 1.0);

        let qc = catalog.lookup("qc").unwrap();
        assert_eq!(qc.index, 15);
        assert_eq!(qc.factor, 1000.0);
        assert_eq!(qc.units.as_deref(), Some("g/kg"));
        assert_eq!(qc.description.as_deref(), Some("Cloud mixing ratio"));

        let as_1 = catalog.lookup("as_1").unwrap();
        assert_eq!(
            as_1.description.as_deref(),
            Some("Surface area of aerosol particles in mode 1")
        );
        assert_eq!(
            catalog.lookup("an_m_t").unwrap().description.as_deref(),
            Some("Total no. aerosol particles in mixed mode")
        );
    }

    #[test]
    fn test_lookup_unknown() {
        let err = VariableCatalog::default().lookup("graupel").unwrap_err();
        assert!(matches!(err, StoreError::UnknownVariable(name) if name == "graupel"));
    }

    #[test]
    fn test_rejects_duplicates() {
        let dup_name = vec![VariableSpec::new("nc", 0), VariableSpec::new("nc", 1)];
        assert!(VariableCatalog::new(dup_name).is_err());

        let dup_index = vec![VariableSpec::new("nc", 3), VariableSpec::new("qc", 3)];
        assert!(VariableCatalog::new(dup_index).is_err());
    }

    #[test]
    fn test_rejects_bad_factor_and_name() {
        assert!(VariableCatalog::new(vec![VariableSpec::new("nc", 0).with_factor(0.0)]).is_err());
        assert!(VariableCatalog::new(vec![VariableSpec::new("n c", 0)]).is_err());
        assert!(VariableCatalog::new(vec![]).is_err());
    }

    #[test]
    fn test_deserialize_from_yaml() {
        let yaml = r#"
- name: nc
  index: 14
- name: qc
  index: 15
  factor: 1000.0
  units: g/kg
"#;
        let catalog: VariableCatalog = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.lookup("nc").unwrap().factor, 1.0);

        let bad = "- {name: nc, index: 1}\n- {name: qc, index: 1}\n";
        assert!(serde_yaml::from_str::<VariableCatalog>(bad).is_err());
    }
}
