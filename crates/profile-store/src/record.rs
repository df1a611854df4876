//! Cache record text format.
//!
//! ```text
//! z nc
//! 1000 0.0
//! 1200 12.5
//! 1400 3.2
//! ```
//!
//! One header line naming the two columns, then one `<height> <value>` row per
//! level. Every line, including the last, ends in `\n`; a record whose final
//! newline is missing was cut short by an interrupted write.

use std::fmt::Write as _;
use std::path::Path;

use crate::error::{Result, StoreError};
use crate::profile::{Profile, ProfilePoint};

/// Render a profile as record text.
///
/// Coordinates use the plain `Display` form (`1000`), values the `Debug` form
/// which always carries a fraction or exponent (`0.0`, `1e-11`). Both parse
/// back to the identical `f64`.
pub fn encode(profile: &Profile) -> String {
    let mut out = String::with_capacity(16 * (profile.len() + 1));
    let _ = writeln!(
        out,
        "{} {}",
        profile.coordinate_label(),
        profile.variable_label()
    );
    for point in profile.points() {
        let _ = writeln!(out, "{} {:?}", point.coordinate, point.value);
    }
    out
}

/// Parse record text read from `path`.
///
/// The header must be `<coordinate_label> <variable>`. `path` is only used for
/// error messages.
pub fn decode(path: &Path, text: &str, coordinate_label: &str, variable: &str) -> Result<Profile> {
    if text.is_empty() {
        return Err(StoreError::parse(path, 0, "record is empty"));
    }
    if !text.ends_with('\n') {
        let last_line = text.lines().count();
        return Err(StoreError::parse(
            path,
            last_line,
            "last line is not terminated; record was truncated",
        ));
    }

    let mut lines = text.lines().enumerate().map(|(i, line)| (i + 1, line));

    let (header_no, header) = lines
        .by_ref()
        .find(|(_, line)| !line.trim().is_empty())
        .ok_or_else(|| StoreError::parse(path, 0, "record has no header"))?;
    let labels: Vec<&str> = header.split_whitespace().collect();
    if labels.len() != 2 {
        return Err(StoreError::parse(
            path,
            header_no,
            format!("header has {} columns, expected 2", labels.len()),
        ));
    }
    if labels[0] != coordinate_label || labels[1] != variable {
        return Err(StoreError::parse(
            path,
            header_no,
            format!(
                "header {:?} does not match \"{} {}\"",
                header.trim(),
                coordinate_label,
                variable
            ),
        ));
    }

    let mut points: Vec<ProfilePoint> = Vec::new();
    for (line_no, line) in lines {
        if line.trim().is_empty() {
            continue;
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != 2 {
            return Err(StoreError::parse(
                path,
                line_no,
                format!("row has {} columns, expected 2", tokens.len()),
            ));
        }
        let coordinate = parse_number(path, line_no, tokens[0])?;
        let value = parse_number(path, line_no, tokens[1])?;

        if !coordinate.is_finite() {
            return Err(StoreError::parse(
                path,
                line_no,
                format!("coordinate {} is not finite", tokens[0]),
            ));
        }
        if let Some(previous) = points.last() {
            if coordinate <= previous.coordinate {
                return Err(StoreError::parse(
                    path,
                    line_no,
                    format!(
                        "coordinate {} does not increase past {}",
                        coordinate, previous.coordinate
                    ),
                ));
            }
        }
        points.push(ProfilePoint { coordinate, value });
    }

    if points.is_empty() {
        return Err(StoreError::parse(path, header_no, "record has no data rows"));
    }

    Profile::new(labels[0], labels[1], points)
        .map_err(|e| StoreError::parse(path, 0, e.to_string()))
}

fn parse_number(path: &Path, line_no: usize, token: &str) -> Result<f64> {
    token.parse::<f64>().map_err(|_| {
        StoreError::parse(path, line_no, format!("{:?} is not a number", token))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> Profile {
        Profile::from_columns("z", "nc", &[1000.0, 1200.0, 1400.0], &[0.0, 12.5, 3.2]).unwrap()
    }

    fn decode_str(text: &str) -> Result<Profile> {
        decode(Path::new("run1_nc.txt"), text, "z", "nc")
    }

    fn parse_line(err: StoreError) -> usize {
        match err {
            StoreError::Parse { line, .. } => line,
            other => panic!("expected Parse, got {:?}", other),
        }
    }

    #[test]
    fn test_encode_scenario() {
        assert_eq!(encode(&scenario()), "z nc\n1000 0.0\n1200 12.5\n1400 3.2\n");
    }

    #[test]
    fn test_decode_scenario() {
        let profile = decode_str("z nc\n1000 0.0\n1200 12.5\n1400 3.2\n").unwrap();
        assert_eq!(profile, scenario());
    }

    #[test]
    fn test_exact_round_trip_of_awkward_values() {
        let values = [1e-11, 0.1 + 0.2, -3.5e12, f64::MIN_POSITIVE, 2.0 / 3.0];
        let coords = [10.25, 20.0, 30.125, 1e5, 123456.789];
        let profile = Profile::from_columns("z", "qc", &coords, &values).unwrap();
        let back = decode(Path::new("r"), &encode(&profile), "z", "qc").unwrap();
        assert_eq!(back, profile);
    }

    #[test]
    fn test_nan_value_survives() {
        let profile = Profile::from_columns("z", "nc", &[1.0, 2.0], &[f64::NAN, 1.0]).unwrap();
        let text = encode(&profile);
        assert_eq!(text, "z nc\n1 NaN\n2 1.0\n");
        assert!(decode_str(&text).unwrap().values()[0].is_nan());
    }

    #[test]
    fn test_accepts_any_whitespace() {
        let profile = decode_str("z\tnc\n1000   0.0\n\n1200\t12.5\n").unwrap();
        assert_eq!(profile.len(), 2);
    }

    #[test]
    fn test_non_numeric_token() {
        let err = decode_str("z nc\n1000 0.0\n1200 abc\n").unwrap_err();
        assert_eq!(parse_line(err), 3);
    }

    #[test]
    fn test_wrong_column_count() {
        assert_eq!(parse_line(decode_str("z nc\n1000 0.0 5\n").unwrap_err()), 2);
        assert_eq!(parse_line(decode_str("z nc\n1000\n").unwrap_err()), 2);
        assert_eq!(parse_line(decode_str("z\n1000 0.0\n").unwrap_err()), 1);
    }

    #[test]
    fn test_truncated_record() {
        let err = decode_str("z nc\n1000 0.0\n1200 12").unwrap_err();
        assert_eq!(parse_line(err), 3);
    }

    #[test]
    fn test_header_mismatch_and_empty_body() {
        assert!(matches!(
            decode_str("z qc\n1000 0.0\n"),
            Err(StoreError::Parse { line: 1, .. })
        ));
        assert!(matches!(decode_str("z nc\n"), Err(StoreError::Parse { .. })));
        assert!(matches!(decode_str(""), Err(StoreError::Parse { .. })));
    }

    #[test]
    fn test_coordinates_must_increase() {
        let err = decode_str("z nc\n1200 0.0\n1000 1.0\n").unwrap_err();
        assert_eq!(parse_line(err), 3);
        let err = decode_str("z nc\ninf 0.0\n").unwrap_err();
        assert_eq!(parse_line(err), 2);
    }
}
