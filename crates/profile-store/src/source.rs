//! Where computed profiles come from.

use netcdf_parser::ModelOutput;
use tracing::debug;

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::profile::VerticalMean;
use crate::run::Run;

/// Produces the raw vertical mean of one `q` slot for a run.
///
/// Implementations report every failure as [`StoreError::DataAccess`].
pub trait ProfileSource: Send + Sync {
    fn vertical_mean(&self, run: &Run, index: usize) -> Result<VerticalMean>;
}

/// Reads run output files with `netcdf-parser`.
#[derive(Debug, Clone)]
pub struct NetCdfProfileSource {
    config: StoreConfig,
}

impl NetCdfProfileSource {
    /// Files are located with [`StoreConfig::source_path`].
    pub fn from_config(config: &StoreConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }
}

impl ProfileSource for NetCdfProfileSource {
    fn vertical_mean(&self, run: &Run, index: usize) -> Result<VerticalMean> {
        let path = self.config.source_path(run);
        debug!(run = %run, path = %path.display(), index, "Reading vertical mean");

        let output = ModelOutput::open(&path).map_err(|e| StoreError::data_access(run, e))?;
        let (heights, means) = output
            .vertical_mean(index)
            .map_err(|e| StoreError::data_access(run, e))?;

        Ok(VerticalMean { heights, means })
    }
}
