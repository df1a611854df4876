//! Thin helpers over the native netcdf library.
//!
//! The netcdf crate wraps libnetcdf, which in turn links HDF5. HDF5 prints
//! diagnostics to stderr for lookups that the Rust side handles as `None`
//! (a missing `_FillValue`, for example), so every open goes through
//! [`silence_hdf5_errors`] first.

use std::sync::Once;

use crate::error::{NetCdfError, NetCdfResult};

/// Silence HDF5's automatic error printing to stderr.
///
/// It only needs to be called once per process, but is safe to call multiple times.
/// Call it before any HDF5/NetCDF operation; [`crate::ModelOutput::open`] does.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: H5Eset_auto2 is thread-safe and null handlers are a documented
        // way to disable error output.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

/// Check if a variable has an attribute with the given name.
/// This avoids HDF5 error spam when checking for optional attributes.
fn has_attr(var: &netcdf::Variable, name: &str) -> bool {
    var.attributes().any(|attr| attr.name() == name)
}

/// Helper to get f64 attribute.
pub(crate) fn get_f64_attr(var: &netcdf::Variable, name: &str) -> Option<f64> {
    if !has_attr(var, name) {
        return None;
    }
    let attr_value = var.attribute_value(name)?.ok()?;
    f64::try_from(attr_value).ok()
}

/// The value marking missing data, from `_FillValue` or `missing_value`.
pub(crate) fn fill_value(var: &netcdf::Variable) -> Option<f64> {
    get_f64_attr(var, "_FillValue").or_else(|| get_f64_attr(var, "missing_value"))
}

/// Lengths of a variable's dimensions, outermost first.
pub(crate) fn shape_of(var: &netcdf::Variable) -> Vec<usize> {
    var.dimensions().iter().map(|d| d.len()).collect()
}

/// Error for a failed `get_values` on `name`.
pub(crate) fn read_failed(name: &str, reason: impl std::fmt::Display) -> NetCdfError {
    NetCdfError::Read {
        variable: name.to_string(),
        reason: reason.to_string(),
    }
}

/// Read an entire variable as `f64`, converting from its stored type.
pub(crate) fn read_all(var: &netcdf::Variable, name: &str) -> NetCdfResult<Vec<f64>> {
    var.get_values::<f64, _>(..).map_err(|e| read_failed(name, e))
}
