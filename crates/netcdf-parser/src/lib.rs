//! NetCDF reader for dynamical cloud model output.
//!
//! Each simulation run writes one NetCDF file holding the coordinate axes
//! `z` (height), `time` and `y` (horizontal), a packed 5-D microphysics array
//! `q` indexed `(time, indirection, y, z, variable)`, and the 4-D pressure
//! perturbation `p`. This crate opens those files and reduces them to the
//! products the plotting tools need:
//!
//! - vertical mean profiles of one `q` entry ([`ModelOutput::vertical_mean`])
//! - horizontal/height cross-sections at one time ([`ModelOutput::height_section`])
//! - horizontal/time sections of pressure at one height ([`ModelOutput::pressure_section`])
//!
//! Reading goes through the native netcdf library, which requires
//! libnetcdf and HDF5 at build time.

pub mod error;
pub mod model;
pub mod native;
pub mod reduce;
pub mod section;

pub use error::{NetCdfError, NetCdfResult};
pub use model::ModelOutput;
pub use native::silence_hdf5_errors;
pub use section::Section;
