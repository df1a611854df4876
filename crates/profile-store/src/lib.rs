//! Vertical profile extraction with a flat-file cache.
//!
//! [`ExtractAndCacheStore`] hands out the time- and horizontally-averaged
//! profile of one model variable for one run. The first request computes it
//! from the run's NetCDF output and writes a small two-column text record;
//! later requests read that record back until a recompute is forced.
//!
//! ```no_run
//! use profile_store::{ExtractAndCacheStore, NetCdfProfileSource, Run, StoreConfig};
//!
//! let config = StoreConfig::default();
//! let source = NetCdfProfileSource::from_config(&config);
//! let store = ExtractAndCacheStore::new(config, source)?;
//! let profile = store.get_profile(&Run::numbered(1), "nc", false)?;
//! println!("{} levels", profile.len());
//! # Ok::<(), profile_store::StoreError>(())
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod profile;
pub mod record;
pub mod run;
pub mod source;
pub mod store;

pub use catalog::{VariableCatalog, VariableSpec};
pub use config::StoreConfig;
pub use error::{Result, StoreError};
pub use profile::{Profile, ProfileError, ProfilePoint, VerticalMean};
pub use run::Run;
pub use source::{NetCdfProfileSource, ProfileSource};
pub use store::{ExtractAndCacheStore, StoreStats};
