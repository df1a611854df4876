//! Writing synthetic runs to real NetCDF files.

use std::path::Path;

use crate::generators::SyntheticRun;

/// Dimension names used by the cloud model.
pub mod dims {
    pub const TIME: &str = "time";
    pub const INDIRECTION: &str = "nq_ind";
    pub const HORIZONTAL: &str = "y";
    pub const HEIGHT: &str = "z";
    pub const VARIABLE: &str = "nq";
}

/// The `run1` scenario: three levels whose `nc` mean is `[0.0, 12.5, 3.2]`.
pub mod scenario {
    pub const HEIGHTS: [f64; 3] = [1000.0, 1200.0, 1400.0];
    pub const NC_MEANS: [f64; 3] = [0.0, 12.5, 3.2];
    /// Position of `nc` in the default catalog.
    pub const NC_INDEX: usize = 14;
    pub const VARIABLES: usize = 30;
    pub const RECORD: &str = "z nc\n1000 0.0\n1200 12.5\n1400 3.2\n";
}

/// A run matching [`scenario`].
pub fn scenario_run() -> SyntheticRun {
    SyntheticRun::with_profile(
        scenario::HEIGHTS.to_vec(),
        scenario::VARIABLES,
        scenario::NC_INDEX,
        &scenario::NC_MEANS,
    )
}

/// Write `run` as a NetCDF-4 file laid out like the model's output.
pub fn write_model_output<P: AsRef<Path>>(
    path: P,
    run: &SyntheticRun,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut file = netcdf::create(path.as_ref())?;

    file.add_dimension(dims::TIME, run.times.len())?;
    file.add_dimension(dims::INDIRECTION, 1)?;
    file.add_dimension(dims::HORIZONTAL, run.horizontal.len())?;
    file.add_dimension(dims::HEIGHT, run.heights.len())?;
    file.add_dimension(dims::VARIABLE, run.variables)?;

    {
        let mut var = file.add_variable::<f64>("time", &[dims::TIME])?;
        var.put_values(&run.times, ..)?;
    }
    {
        let mut var = file.add_variable::<f64>("y", &[dims::HORIZONTAL])?;
        var.put_values(&run.horizontal, ..)?;
    }
    {
        let mut var = file.add_variable::<f64>("z", &[dims::HEIGHT])?;
        var.put_values(&run.heights, ..)?;
    }
    {
        let mut var = file.add_variable::<f64>(
            "q",
            &[
                dims::TIME,
                dims::INDIRECTION,
                dims::HORIZONTAL,
                dims::HEIGHT,
                dims::VARIABLE,
            ],
        )?;
        if let Some(fill) = run.fill_value {
            var.add_attribute("_FillValue", fill)?;
        }
        var.put_values(&run.q, ..)?;
    }
    {
        let mut var = file.add_variable::<f64>(
            "p",
            &[dims::TIME, dims::INDIRECTION, dims::HORIZONTAL, dims::HEIGHT],
        )?;
        var.put_values(&run.p, ..)?;
    }

    Ok(())
}
