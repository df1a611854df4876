//! Array reductions over hyperslabs of the cloud model's variables.
//!
//! Axis order of the 5-D `q` array is `(time, indirection, y, z, variable)`;
//! the 4-D `p` array drops the trailing variable axis. Only indirection
//! index 0 is ever read, so [`crate::ModelOutput`] reads just the slab a
//! product needs and hands it here as a flat row-major slice. The functions
//! work on plain slices so they can be exercised without a NetCDF file.

use std::ops::Range;

use crate::error::{NetCdfError, NetCdfResult};
use crate::section::Section;

/// Values at or above this magnitude are treated as libnetcdf default fill.
const DEFAULT_FILL_THRESHOLD: f64 = 9.96e36;

/// Shape of the 5-D `q` array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QShape {
    pub times: usize,
    pub indirection: usize,
    pub horizontal: usize,
    pub heights: usize,
    pub variables: usize,
}

impl QShape {
    pub fn from_dims(dims: &[usize]) -> NetCdfResult<Self> {
        let shape = match *dims {
            [times, indirection, horizontal, heights, variables] => Self {
                times,
                indirection,
                horizontal,
                heights,
                variables,
            },
            _ => {
                return Err(NetCdfError::InvalidFormat(format!(
                    "q must have 5 dimensions (time, indirection, y, z, variable), found {}",
                    dims.len()
                )))
            }
        };
        check_indirection("q", shape.indirection)?;
        Ok(shape)
    }

    pub fn check_variable(&self, variable: usize) -> NetCdfResult<()> {
        check_index("variable", variable, self.variables)
    }

    pub fn check_time(&self, time: usize) -> NetCdfResult<()> {
        check_index("time", time, self.times)
    }

    /// A height window must be non-empty and inside the z axis.
    pub fn check_window(&self, window: &Range<usize>) -> NetCdfResult<()> {
        if window.start >= window.end || window.end > self.heights {
            return Err(NetCdfError::out_of_range("height", window.end, self.heights));
        }
        Ok(())
    }
}

/// Shape of the 4-D `p` array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PShape {
    pub times: usize,
    pub indirection: usize,
    pub horizontal: usize,
    pub heights: usize,
}

impl PShape {
    pub fn from_dims(dims: &[usize]) -> NetCdfResult<Self> {
        let shape = match *dims {
            [times, indirection, horizontal, heights] => Self {
                times,
                indirection,
                horizontal,
                heights,
            },
            _ => {
                return Err(NetCdfError::InvalidFormat(format!(
                    "p must have 4 dimensions (time, indirection, y, z), found {}",
                    dims.len()
                )))
            }
        };
        check_indirection("p", shape.indirection)?;
        Ok(shape)
    }

    pub fn check_height(&self, height: usize) -> NetCdfResult<()> {
        check_index("height", height, self.heights)
    }
}

/// Whether a raw value is real data rather than fill or NaN.
#[inline]
pub fn is_valid(value: f64, fill_value: Option<f64>) -> bool {
    value.is_finite()
        && value.abs() < DEFAULT_FILL_THRESHOLD
        && fill_value.map_or(true, |fill| value != fill)
}

fn check_indirection(what: &str, indirection: usize) -> NetCdfResult<()> {
    if indirection == 0 {
        return Err(NetCdfError::InvalidFormat(format!(
            "{} has an empty indirection axis",
            what
        )));
    }
    Ok(())
}

fn check_index(axis: &'static str, index: usize, len: usize) -> NetCdfResult<()> {
    if index >= len {
        return Err(NetCdfError::out_of_range(axis, index, len));
    }
    Ok(())
}

fn check_len(what: &str, data: &[f64], expected: usize) -> NetCdfResult<()> {
    if data.len() != expected {
        return Err(NetCdfError::InvalidFormat(format!(
            "{} holds {} values, shape requires {}",
            what,
            data.len(),
            expected
        )));
    }
    Ok(())
}

/// Mean over time and horizontal position for every height, from the slab
/// `q[:, 0, :, :, variable]` laid out `(time, y, z)`.
///
/// Fill values and NaNs are skipped; a level without any valid sample is NaN.
pub fn vertical_mean(slab: &[f64], shape: QShape, fill_value: Option<f64>) -> NetCdfResult<Vec<f64>> {
    check_indirection("q", shape.indirection)?;
    check_len("q slab", slab, shape.times * shape.horizontal * shape.heights)?;

    let mut sums = vec![0.0; shape.heights];
    let mut counts = vec![0usize; shape.heights];
    for column in slab.chunks_exact(shape.heights.max(1)) {
        for (z, &value) in column.iter().enumerate() {
            if is_valid(value, fill_value) {
                sums[z] += value;
                counts[z] += 1;
            }
        }
    }

    Ok(sums
        .into_iter()
        .zip(counts)
        .map(|(sum, count)| if count == 0 { f64::NAN } else { sum / count as f64 })
        .collect())
}

/// Section from the slab `q[time, 0, :, window, variable]` laid out
/// `(y, z)`, with heights as rows.
pub fn height_section(
    slab: &[f64],
    shape: QShape,
    window: Range<usize>,
    horizontal: &[f64],
    heights: &[f64],
    fill_value: Option<f64>,
) -> NetCdfResult<Section> {
    check_indirection("q", shape.indirection)?;
    shape.check_window(&window)?;
    if horizontal.len() != shape.horizontal || heights.len() != shape.heights {
        return Err(NetCdfError::InvalidFormat(
            "coordinate arrays do not match the q array".to_string(),
        ));
    }
    let levels = window.len();
    check_len("q slab", slab, shape.horizontal * levels)?;

    let mut values = Vec::with_capacity(slab.len());
    for z in 0..levels {
        for y in 0..shape.horizontal {
            let value = slab[y * levels + z];
            values.push(if is_valid(value, fill_value) { value } else { f64::NAN });
        }
    }

    Section::new(horizontal.to_vec(), heights[window].to_vec(), values)
}

/// Section from the slab `p[:, 0, :, height]` laid out `(time, y)`, with
/// horizontal positions as rows and times as columns.
pub fn pressure_section(
    slab: &[f64],
    shape: PShape,
    times: &[f64],
    horizontal: &[f64],
    fill_value: Option<f64>,
) -> NetCdfResult<Section> {
    check_indirection("p", shape.indirection)?;
    if times.len() != shape.times || horizontal.len() != shape.horizontal {
        return Err(NetCdfError::InvalidFormat(
            "coordinate arrays do not match the p array".to_string(),
        ));
    }
    check_len("p slab", slab, shape.times * shape.horizontal)?;

    let mut values = Vec::with_capacity(slab.len());
    for y in 0..shape.horizontal {
        for t in 0..shape.times {
            let value = slab[t * shape.horizontal + y];
            values.push(if is_valid(value, fill_value) { value } else { f64::NAN });
        }
    }

    Section::new(times.to_vec(), horizontal.to_vec(), values)
}

/// Index of the coordinate equal to `value` within `tolerance`.
pub fn find_coordinate(
    axis: &'static str,
    coords: &[f64],
    value: f64,
    tolerance: f64,
) -> NetCdfResult<usize> {
    coords
        .iter()
        .position(|c| (c - value).abs() <= tolerance)
        .ok_or(NetCdfError::NoSuchCoordinate { axis, value })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape() -> QShape {
        QShape {
            times: 2,
            indirection: 1,
            horizontal: 3,
            heights: 4,
            variables: 2,
        }
    }

    /// `q[:, 0, :, :, v]` filled with `t * 1000 + y * 100 + z * 10 + v`.
    fn predictable_slab(shape: QShape, v: usize) -> Vec<f64> {
        let mut slab = Vec::new();
        for t in 0..shape.times {
            for y in 0..shape.horizontal {
                for z in 0..shape.heights {
                    slab.push((t * 1000 + y * 100 + z * 10 + v) as f64);
                }
            }
        }
        slab
    }

    #[test]
    fn test_from_dims() {
        assert_eq!(QShape::from_dims(&[2, 1, 3, 4, 2]).unwrap(), shape());
        assert!(matches!(
            QShape::from_dims(&[2, 3, 4, 2]),
            Err(NetCdfError::InvalidFormat(_))
        ));
        assert_eq!(PShape::from_dims(&[2, 1, 3, 4]).unwrap().heights, 4);
    }

    #[test]
    fn test_from_dims_rejects_empty_indirection() {
        let err = QShape::from_dims(&[2, 0, 3, 4, 2]).unwrap_err();
        assert!(err.to_string().contains("empty indirection"));
        let err = PShape::from_dims(&[2, 0, 3, 4]).unwrap_err();
        assert!(err.to_string().contains("empty indirection"));
    }

    #[test]
    fn test_sections_reject_empty_indirection() {
        let q = QShape {
            indirection: 0,
            ..shape()
        };
        let y = [0.0, 50.0, 100.0];
        let z = [0.0, 10.0, 20.0, 30.0];
        assert!(matches!(
            height_section(&[], q, 0..2, &y, &z, None),
            Err(NetCdfError::InvalidFormat(_))
        ));
        assert!(matches!(
            vertical_mean(&[], q, None),
            Err(NetCdfError::InvalidFormat(_))
        ));

        let p = PShape {
            times: 2,
            indirection: 0,
            horizontal: 2,
            heights: 3,
        };
        assert!(matches!(
            pressure_section(&[], p, &[0.0, 60.0], &[0.0, 25.0], None),
            Err(NetCdfError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_index_checks() {
        let shape = shape();
        assert!(shape.check_variable(1).is_ok());
        assert!(matches!(
            shape.check_variable(2),
            Err(NetCdfError::IndexOutOfRange { axis: "variable", index: 2, len: 2 })
        ));
        assert!(shape.check_time(2).is_err());
        assert!(shape.check_window(&(0..4)).is_ok());
        assert!(shape.check_window(&(2..6)).is_err());
        assert!(shape.check_window(&(2..2)).is_err());
    }

    #[test]
    fn test_vertical_mean_averages_time_and_horizontal() {
        let shape = shape();
        let slab = predictable_slab(shape, 1);
        let means = vertical_mean(&slab, shape, None).unwrap();

        // mean(t*1000) = 500, mean(y*100) = 100
        assert_eq!(means.len(), 4);
        for (z, mean) in means.iter().enumerate() {
            let expected = 500.0 + 100.0 + z as f64 * 10.0 + 1.0;
            assert!((mean - expected).abs() < 1e-9, "z={} mean={}", z, mean);
        }
    }

    #[test]
    fn test_vertical_mean_skips_fill_values() {
        let shape = QShape {
            times: 1,
            indirection: 1,
            horizontal: 2,
            heights: 2,
            variables: 1,
        };
        // (y0,z0) (y0,z1) (y1,z0) (y1,z1)
        let slab = vec![2.0, -999.0, 4.0, -999.0];
        let means = vertical_mean(&slab, shape, Some(-999.0)).unwrap();
        assert_eq!(means[0], 3.0);
        assert!(means[1].is_nan());
    }

    #[test]
    fn test_vertical_mean_rejects_short_slab() {
        let err = vertical_mean(&[1.0, 2.0], shape(), None).unwrap_err();
        assert!(matches!(err, NetCdfError::InvalidFormat(_)));
    }

    #[test]
    fn test_height_section_is_transposed() {
        let shape = shape();
        let y = [0.0, 50.0, 100.0];
        let z = [0.0, 10.0, 20.0, 30.0];
        // q[1, 0, :, 1..3, 0] laid out (y, z)
        let slab: Vec<f64> = (0..3)
            .flat_map(|y| (1..3).map(move |z| (1000 + y * 100 + z * 10) as f64))
            .collect();
        let section = height_section(&slab, shape, 1..3, &y, &z, None).unwrap();

        assert_eq!(section.columns(), 3);
        assert_eq!(section.rows(), 2);
        assert_eq!(section.y, vec![10.0, 20.0]);
        // row 0 is z=1, column 2 is y=2
        assert_eq!(section.value(0, 2), 1000.0 + 200.0 + 10.0);
        assert_eq!(section.value(1, 0), 1000.0 + 20.0);
    }

    #[test]
    fn test_height_section_rejects_bad_window() {
        let shape = shape();
        let y = [0.0, 50.0, 100.0];
        let z = [0.0, 10.0, 20.0, 30.0];
        let slab = vec![0.0; 6];
        assert!(height_section(&slab, shape, 2..6, &y, &z, None).is_err());
        assert!(height_section(&slab, shape, 2..2, &y, &z, None).is_err());
        assert!(height_section(&slab, shape, 0..3, &y, &z, None).is_err());
    }

    #[test]
    fn test_pressure_section_rows_are_horizontal() {
        let shape = PShape {
            times: 3,
            indirection: 1,
            horizontal: 2,
            heights: 2,
        };
        // p[:, 0, :, 1] laid out (t, y)
        let slab: Vec<f64> = (0..3)
            .flat_map(|t| (0..2).map(move |y| (t * 100 + y * 10 + 1) as f64))
            .collect();
        let section =
            pressure_section(&slab, shape, &[0.0, 60.0, 120.0], &[0.0, 25.0], None).unwrap();

        assert_eq!(section.rows(), 2);
        assert_eq!(section.columns(), 3);
        assert_eq!(section.value(1, 2), 211.0);
        assert_eq!(section.value(0, 1), 101.0);
    }

    #[test]
    fn test_find_coordinate() {
        let z = [1000.0, 1200.0, 1400.0];
        assert_eq!(find_coordinate("height", &z, 1200.0, 1e-6).unwrap(), 1);
        assert!(matches!(
            find_coordinate("height", &z, 1300.0, 1e-6),
            Err(NetCdfError::NoSuchCoordinate { axis: "height", .. })
        ));
    }

    #[test]
    fn test_is_valid() {
        assert!(is_valid(1.0, None));
        assert!(!is_valid(f64::NAN, None));
        assert!(!is_valid(9.969209968386869e36, None));
        assert!(!is_valid(-1.0, Some(-1.0)));
    }
}
