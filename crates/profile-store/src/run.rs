//! Run identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::StoreError;

/// Name of one simulation run.
///
/// Numbered runs are normalised to `run<n>`, so `Run::numbered(1)` and
/// `"1".parse::<Run>()` both name the `run1` dataset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Run(String);

impl Run {
    pub fn numbered(n: u32) -> Self {
        Self(format!("run{}", n))
    }

    /// Create a run from a free-form name.
    pub fn new(name: impl Into<String>) -> Result<Self, StoreError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(StoreError::invalid_config("run name is empty"));
        }
        if name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(StoreError::invalid_config(format!(
                "run name {:?} must not contain path separators",
                name
            )));
        }
        Ok(Self(name))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Run {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Run {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
            let n = s
                .parse::<u32>()
                .map_err(|e| StoreError::invalid_config(format!("run number {}: {}", s, e)))?;
            return Ok(Self::numbered(n));
        }
        Self::new(s)
    }
}

/// Runs appear in YAML either as bare numbers or as names.
#[derive(Deserialize)]
#[serde(untagged)]
enum RunRef {
    Number(u32),
    Name(String),
}

impl<'de> Deserialize<'de> for Run {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match RunRef::deserialize(deserializer)? {
            RunRef::Number(n) => Ok(Run::numbered(n)),
            RunRef::Name(name) => name.parse().map_err(serde::de::Error::custom),
        }
    }
}

impl Serialize for Run {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}
