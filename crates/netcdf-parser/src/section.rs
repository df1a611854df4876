//! Two-dimensional slices of source arrays.

use crate::error::{NetCdfError, NetCdfResult};

/// A 2-D slice with coordinates on both axes.
///
/// `values` is row-major: `values[row * x.len() + col]`, where columns run
/// along `x` and rows along `y`.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub values: Vec<f64>,
}

impl Section {
    pub fn new(x: Vec<f64>, y: Vec<f64>, values: Vec<f64>) -> NetCdfResult<Self> {
        if x.len() * y.len() != values.len() {
            return Err(NetCdfError::InvalidFormat(format!(
                "section of {}x{} cannot hold {} values",
                x.len(),
                y.len(),
                values.len()
            )));
        }
        Ok(Self { x, y, values })
    }

    pub fn rows(&self) -> usize {
        self.y.len()
    }

    pub fn columns(&self) -> usize {
        self.x.len()
    }

    pub fn value(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.x.len() + col]
    }

    /// Multiply both coordinate axes, e.g. metres to kilometres with 1e-3.
    pub fn scale_axes(mut self, x_factor: f64, y_factor: f64) -> Self {
        self.x.iter_mut().for_each(|x| *x *= x_factor);
        self.y.iter_mut().for_each(|y| *y *= y_factor);
        self
    }

    /// Multiply every value.
    pub fn scale_values(mut self, factor: f64) -> Self {
        self.values.iter_mut().for_each(|v| *v *= factor);
        self
    }

    /// Minimum and maximum of the finite values, if there are any.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}
