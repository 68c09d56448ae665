//! Degrees-minutes-seconds angles as written by camera event exports,
//! e.g. `N52° 30' 45"` or `W123° 15' 30.25"`.

use once_cell::sync::Lazy;
use regex::Regex;

static DMS_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s*([NSEWnsew])\s*(\d+(?:\.\d+)?)\s*°\s*(\d+(?:\.\d+)?)\s*'\s*(\d+(?:\.\d+)?)\s*"?\s*$"#)
        .expect("DMS pattern is valid")
});

/// Quick check used for format detection.
pub fn is_dms(value: &str) -> bool {
    value.contains('°')
}

/// Convert a DMS string to signed decimal degrees (south and west negative).
///
/// Returns `None` if the value is not a well-formed DMS angle.
pub fn dms_to_decimal(value: &str) -> Option<f64> {
    let caps = DMS_PATTERN.captures(value)?;
    let hemisphere = caps[1].to_ascii_uppercase();
    let degrees: f64 = caps[2].parse().ok()?;
    let minutes: f64 = caps[3].parse().ok()?;
    let seconds: f64 = caps[4].parse().ok()?;

    if minutes >= 60.0 || seconds >= 60.0 {
        return None;
    }

    let decimal = degrees + minutes / 60.0 + seconds / 3600.0;
    match hemisphere.as_str() {
        "S" | "W" => Some(-decimal),
        _ => Some(decimal),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_north_east() {
        let result = dms_to_decimal("N52° 30' 45\"").unwrap();
        let expected = 52.0 + 30.0 / 60.0 + 45.0 / 3600.0;
        assert!((result - expected).abs() < 1e-10);
    }

    #[test]
    fn test_south_west() {
        let result = dms_to_decimal("W123° 15' 30\"").unwrap();
        let expected = -(123.0 + 15.0 / 60.0 + 30.0 / 3600.0);
        assert!((result - expected).abs() < 1e-10);
    }

    #[test]
    fn test_fractional_seconds_without_quote() {
        let result = dms_to_decimal("S12° 0' 36.5").unwrap();
        assert!((result + (12.0 + 36.5 / 3600.0)).abs() < 1e-10);
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(dms_to_decimal("52.5").is_none());
        assert!(dms_to_decimal("X52° 30' 45\"").is_none());
        assert!(dms_to_decimal("N52° 75' 45\"").is_none());
        assert!(is_dms("N52° 30' 45\""));
        assert!(!is_dms("52.5125"));
    }
}
