//! Vertical profiles: ordered (height, value) pairs for one variable in one run.

use thiserror::Error;

/// Why a set of points cannot form a [`Profile`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProfileError {
    #[error("profile has no points")]
    Empty,

    #[error("{coordinates} coordinates but {values} values")]
    LengthMismatch { coordinates: usize, values: usize },

    #[error("coordinate at position {index} is not finite")]
    NonFiniteCoordinate { index: usize },

    #[error("coordinate at position {index} is not greater than the one before it")]
    NotIncreasing { index: usize },

    #[error("label {0:?} must be a single non-empty token")]
    InvalidLabel(String),
}

/// One vertical level of a profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfilePoint {
    pub coordinate: f64,
    pub value: f64,
}

/// A vertical profile.
///
/// Coordinates are finite and strictly increasing; values may be NaN where a
/// level had no valid data.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    coordinate_label: String,
    variable_label: String,
    points: Vec<ProfilePoint>,
}

pub(crate) fn check_label(label: &str) -> Result<(), ProfileError> {
    if label.is_empty() || label.chars().any(char::is_whitespace) {
        return Err(ProfileError::InvalidLabel(label.to_string()));
    }
    Ok(())
}

impl Profile {
    pub fn new(
        coordinate_label: impl Into<String>,
        variable_label: impl Into<String>,
        points: Vec<ProfilePoint>,
    ) -> Result<Self, ProfileError> {
        let coordinate_label = coordinate_label.into();
        let variable_label = variable_label.into();
        check_label(&coordinate_label)?;
        check_label(&variable_label)?;

        if points.is_empty() {
            return Err(ProfileError::Empty);
        }
        for (index, point) in points.iter().enumerate() {
            if !point.coordinate.is_finite() {
                return Err(ProfileError::NonFiniteCoordinate { index });
            }
            if index > 0 && point.coordinate <= points[index - 1].coordinate {
                return Err(ProfileError::NotIncreasing { index });
            }
        }

        Ok(Self {
            coordinate_label,
            variable_label,
            points,
        })
    }

    /// Pair two equal-length columns.
    pub fn from_columns(
        coordinate_label: impl Into<String>,
        variable_label: impl Into<String>,
        coordinates: &[f64],
        values: &[f64],
    ) -> Result<Self, ProfileError> {
        if coordinates.len() != values.len() {
            return Err(ProfileError::LengthMismatch {
                coordinates: coordinates.len(),
                values: values.len(),
            });
        }
        let points = coordinates
            .iter()
            .zip(values)
            .map(|(&coordinate, &value)| ProfilePoint { coordinate, value })
            .collect();
        Self::new(coordinate_label, variable_label, points)
    }

    pub fn coordinate_label(&self) -> &str {
        &self.coordinate_label
    }

    pub fn variable_label(&self) -> &str {
        &self.variable_label
    }

    pub fn points(&self) -> &[ProfilePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false for a constructed profile; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn coordinates(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.coordinate).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Pointwise comparison with a relative tolerance.
    ///
    /// Labels and length must match exactly; NaN values only match NaN.
    pub fn approx_eq(&self, other: &Profile, rel_tol: f64) -> bool {
        fn close(a: f64, b: f64, rel_tol: f64) -> bool {
            if a.is_nan() || b.is_nan() {
                return a.is_nan() && b.is_nan();
            }
            a == b || (a - b).abs() <= rel_tol * a.abs().max(b.abs())
        }

        self.coordinate_label == other.coordinate_label
            && self.variable_label == other.variable_label
            && self.points.len() == other.points.len()
            && self.points.iter().zip(&other.points).all(|(a, b)| {
                close(a.coordinate, b.coordinate, rel_tol) && close(a.value, b.value, rel_tol)
            })
    }

    /// Same points under different labels. Labels must already be valid tokens.
    pub(crate) fn relabeled(&self, coordinate_label: &str, variable_label: &str) -> Profile {
        Profile {
            coordinate_label: coordinate_label.to_string(),
            variable_label: variable_label.to_string(),
            points: self.points.clone(),
        }
    }

    /// The level with the largest finite value.
    pub fn peak(&self) -> Option<ProfilePoint> {
        self.points
            .iter()
            .filter(|p| p.value.is_finite())
            .copied()
            .fold(None, |best: Option<ProfilePoint>, p| match best {
                Some(b) if b.value >= p.value => Some(b),
                _ => Some(p),
            })
    }
}

/// Raw reduction output before unit conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct VerticalMean {
    pub heights: Vec<f64>,
    pub means: Vec<f64>,
}
