//! Reading one run's cloud-model output file.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{NetCdfError, NetCdfResult};
use crate::native::{fill_value, read_all, read_failed, shape_of, silence_hdf5_errors};
use crate::reduce::{self, PShape, QShape};
use crate::section::Section;

/// Height coordinate variable (m).
pub const HEIGHT_VAR: &str = "z";
/// Model time coordinate variable (s since start).
pub const TIME_VAR: &str = "time";
/// Horizontal coordinate variable (m).
pub const HORIZONTAL_VAR: &str = "y";
/// Packed microphysics array `(time, indirection, y, z, variable)`.
pub const Q_VAR: &str = "q";
/// Pressure perturbation `(time, indirection, y, z)` in Pa.
pub const PRESSURE_VAR: &str = "p";

/// Tolerance used when looking up a time or height by value.
pub const COORDINATE_TOLERANCE: f64 = 1e-6;

/// An open model output file.
pub struct ModelOutput {
    path: PathBuf,
    file: netcdf::File,
}

impl std::fmt::Debug for ModelOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelOutput").field("path", &self.path).finish()
    }
}

impl ModelOutput {
    /// Open a source data file read-only.
    pub fn open<P: AsRef<Path>>(path: P) -> NetCdfResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(NetCdfError::NotFound(path.display().to_string()));
        }

        silence_hdf5_errors();

        let file = netcdf::open(path).map_err(|e| NetCdfError::Open {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        debug!(path = %path.display(), "Opened model output");

        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn variable(&self, name: &str) -> NetCdfResult<netcdf::Variable<'_>> {
        self.file
            .variable(name)
            .ok_or_else(|| NetCdfError::MissingData(format!("{} variable", name)))
    }

    fn coordinate(&self, name: &str) -> NetCdfResult<Vec<f64>> {
        let var = self.variable(name)?;
        read_all(&var, name)
    }

    /// Vertical coordinate in metres.
    pub fn heights(&self) -> NetCdfResult<Vec<f64>> {
        self.coordinate(HEIGHT_VAR)
    }

    /// Output times in seconds.
    pub fn times(&self) -> NetCdfResult<Vec<f64>> {
        self.coordinate(TIME_VAR)
    }

    /// Horizontal coordinate in metres.
    pub fn horizontal(&self) -> NetCdfResult<Vec<f64>> {
        self.coordinate(HORIZONTAL_VAR)
    }

    fn q_shape(&self) -> NetCdfResult<QShape> {
        QShape::from_dims(&shape_of(&self.variable(Q_VAR)?))
    }

    /// Number of entries on the variable axis of `q`.
    pub fn variable_count(&self) -> NetCdfResult<usize> {
        Ok(self.q_shape()?.variables)
    }

    /// Index of the output time equal to `time` seconds.
    pub fn time_index(&self, time: f64) -> NetCdfResult<usize> {
        reduce::find_coordinate("time", &self.times()?, time, COORDINATE_TOLERANCE)
    }

    /// Index of the height level equal to `height` metres.
    pub fn height_index(&self, height: f64) -> NetCdfResult<usize> {
        reduce::find_coordinate("height", &self.heights()?, height, COORDINATE_TOLERANCE)
    }

    /// Shape and fill value of `q`, with its height axis checked against `z`.
    fn q_layout(&self) -> NetCdfResult<(netcdf::Variable<'_>, QShape, Option<f64>, Vec<f64>)> {
        let var = self.variable(Q_VAR)?;
        let shape = QShape::from_dims(&shape_of(&var))?;
        let heights = self.heights()?;
        if heights.len() != shape.heights {
            return Err(NetCdfError::InvalidFormat(format!(
                "q has {} height levels but z has {}",
                shape.heights,
                heights.len()
            )));
        }
        let fill = fill_value(&var);
        Ok((var, shape, fill, heights))
    }

    /// Heights paired with the time and horizontal mean of one `q` entry.
    ///
    /// Only the slab `q[:, 0, :, :, variable]` is read.
    pub fn vertical_mean(&self, variable: usize) -> NetCdfResult<(Vec<f64>, Vec<f64>)> {
        let (var, shape, fill, heights) = self.q_layout()?;
        shape.check_variable(variable)?;

        let slab = var
            .get_values::<f64, _>((.., 0, .., .., variable))
            .map_err(|e| read_failed(Q_VAR, e))?;
        let means = reduce::vertical_mean(&slab, shape, fill)?;

        debug!(
            path = %self.path.display(),
            variable = variable,
            levels = means.len(),
            "Computed vertical mean"
        );

        Ok((heights, means))
    }

    /// Horizontal/height slice of one `q` entry at one output time.
    pub fn height_section(
        &self,
        variable: usize,
        time_index: usize,
        window: std::ops::Range<usize>,
    ) -> NetCdfResult<Section> {
        let (var, shape, fill, heights) = self.q_layout()?;
        shape.check_variable(variable)?;
        shape.check_time(time_index)?;
        shape.check_window(&window)?;

        let slab = var
            .get_values::<f64, _>((time_index, 0, .., window.clone(), variable))
            .map_err(|e| read_failed(Q_VAR, e))?;
        let horizontal = self.horizontal()?;
        reduce::height_section(&slab, shape, window, &horizontal, &heights, fill)
    }

    /// Horizontal/time slice of the pressure perturbation at one height level.
    pub fn pressure_section(&self, height_index: usize) -> NetCdfResult<Section> {
        let var = self.variable(PRESSURE_VAR)?;
        let shape = PShape::from_dims(&shape_of(&var))?;
        shape.check_height(height_index)?;

        let fill = fill_value(&var);
        let slab = var
            .get_values::<f64, _>((.., 0, .., height_index))
            .map_err(|e| read_failed(PRESSURE_VAR, e))?;
        let times = self.times()?;
        let horizontal = self.horizontal()?;
        reduce::pressure_section(&slab, shape, &times, &horizontal, fill)
    }
}
