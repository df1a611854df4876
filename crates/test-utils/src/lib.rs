//! Test support shared by the cloudplot crates.
//!
//! [`SyntheticRun`] builds model output with known values and
//! [`write_model_output`] turns it into a real NetCDF file, so the reader,
//! the store and the CLI are all tested against the same data. The
//! [`scenario`] module holds the small fixture whose cache record is checked
//! byte for byte.
//!
//! Real runs are too large to commit; tests that want one use
//! [`require_test_file!`] and return early when [`find_test_file`] has
//! nothing.

pub mod fixtures;
pub mod generators;
pub mod paths;

pub use fixtures::*;
pub use generators::*;
pub use paths::*;

/// Path of a model output file, or return from the calling test.
#[macro_export]
macro_rules! require_test_file {
    ($name:expr) => {{
        match $crate::find_test_file($name) {
            Some(path) => path,
            None => {
                eprintln!("SKIPPED: {} not found (set TEST_DATA_DIR)", $name);
                return;
            }
        }
    }};
}

/// Assert `|left - right| <= epsilon`, printing both values on failure.
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if !(diff <= epsilon) {
            panic!(
                "assertion failed: {} != {} within {} (diff {})",
                left, right, epsilon, diff
            );
        }
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_assert_approx_eq_within_epsilon() {
        assert_approx_eq!(1200.0004, 1200.0, 1e-3);
        assert_approx_eq!(-0.5, -0.5000001, 1e-6);
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn test_assert_approx_eq_outside_epsilon() {
        assert_approx_eq!(1.1, 1.0, 0.001);
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn test_assert_approx_eq_rejects_nan() {
        assert_approx_eq!(f64::NAN, 1.0, 0.001);
    }
}
