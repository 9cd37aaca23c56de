//! Field decoders for raw diagnostic tokens.
//!
//! Pure functions turning NMEA and modem response tokens into typed values.
//! Every failure is a `FieldError`; callers decide what placeholder to write.

use crate::error::FieldError;
use crate::models::CellId;
use chrono::{DateTime, NaiveDateTime, Utc};

/// Degree digits in an NMEA latitude (`DDMM.mmmm`)
pub const LATITUDE_DEGREE_DIGITS: usize = 2;

/// Degree digits in an NMEA longitude (`DDDMM.mmmm`)
pub const LONGITUDE_DEGREE_DIGITS: usize = 3;

/// Decode an NMEA latitude and its N/S indicator
pub fn decode_latitude(text: &str, hemisphere: &str) -> Result<f64, FieldError> {
    decode_coordinate(text, hemisphere, LATITUDE_DEGREE_DIGITS)
}

/// Decode an NMEA longitude and its E/W indicator
pub fn decode_longitude(text: &str, hemisphere: &str) -> Result<f64, FieldError> {
    decode_coordinate(text, hemisphere, LONGITUDE_DEGREE_DIGITS)
}

/// Decode concatenated degrees+minutes into signed decimal degrees.
///
/// The first `degree_digits` characters are whole degrees, the remainder is
/// decimal minutes. Southern and western hemispheres are negative.
pub fn decode_coordinate(
    text: &str,
    hemisphere: &str,
    degree_digits: usize,
) -> Result<f64, FieldError> {
    let text = text.trim();
    let malformed = || FieldError::MalformedCoordinate {
        value: text.to_string(),
    };

    if !is_fixed_point(text) || text.len() <= degree_digits {
        return Err(malformed());
    }

    let (degrees, minutes) = text.split_at(degree_digits);
    let degrees: u32 = degrees.parse().map_err(|_| malformed())?;
    let minutes: f64 = minutes.parse().map_err(|_| malformed())?;

    let decimal = f64::from(degrees) + minutes / 60.0;
    match hemisphere.trim() {
        "S" | "W" => Ok(-decimal),
        _ => Ok(decimal),
    }
}

/// Digits with at most one decimal point
fn is_fixed_point(text: &str) -> bool {
    let mut seen_point = false;
    let mut seen_digit = false;
    for c in text.chars() {
        match c {
            '0'..='9' => seen_digit = true,
            '.' if !seen_point => seen_point = true,
            _ => return false,
        }
    }
    seen_digit
}

/// Parse a hexadecimal identifier, tolerating an optional `0x` prefix
pub fn decode_hex(text: &str) -> Result<u32, FieldError> {
    let trimmed = text.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(FieldError::MalformedHex {
            value: trimmed.to_string(),
        });
    }

    u32::from_str_radix(digits, 16).map_err(|_| FieldError::MalformedHex {
        value: trimmed.to_string(),
    })
}

/// Split a hexadecimal cell identity into `value / 256` and `value % 256`
pub fn decode_cell_id(text: &str) -> Result<CellId, FieldError> {
    let value = decode_hex(text)?;
    Ok(CellId {
        major: value / 256,
        minor: value % 256,
    })
}

/// Location area code, hexadecimal on the wire
pub fn decode_lac(text: &str) -> Result<u32, FieldError> {
    decode_hex(text)
}

/// GPS altitude truncated towards zero to a multiple of 10 metres
pub fn decode_altitude(text: &str) -> Result<i64, FieldError> {
    let text = text.trim();
    let metres: f64 = text.parse().map_err(|_| FieldError::MalformedNumber {
        value: text.to_string(),
    })?;

    if !metres.is_finite() {
        return Err(FieldError::MalformedNumber {
            value: text.to_string(),
        });
    }

    // The float-to-int cast saturates, so out-of-range values fail the multiply
    ((metres / 10.0).trunc() as i64)
        .checked_mul(10)
        .ok_or_else(|| FieldError::MalformedNumber {
            value: text.to_string(),
        })
}

/// Combine an NMEA `ddmmyy` date and `hhmmss[.sss]` time into a UTC instant.
///
/// Fractional seconds are dropped before parsing.
pub fn decode_utc_timestamp(date: &str, time: &str) -> Result<DateTime<Utc>, FieldError> {
    let date = date.trim();
    let time = time.trim();
    let whole_seconds = time.split('.').next().unwrap_or(time);
    let combined = format!("{}{}", date, whole_seconds);

    let fixed_width = |s: &str| s.len() == 6 && s.chars().all(|c| c.is_ascii_digit());
    if !fixed_width(date) || !fixed_width(whole_seconds) {
        return Err(FieldError::MalformedTimestamp { value: combined });
    }

    NaiveDateTime::parse_from_str(&combined, "%d%m%y%H%M%S")
        .map(|naive| naive.and_utc())
        .map_err(|_| FieldError::MalformedTimestamp { value: combined })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_latitude_north() {
        let lat = decode_latitude("3723.2475", "N").unwrap();
        assert!((lat - 37.387458).abs() < 1e-5);
    }

    #[test]
    fn test_latitude_south_negates() {
        let lat = decode_latitude("3723.2475", "S").unwrap();
        assert!((lat + 37.387458).abs() < 1e-5);
    }

    #[test]
    fn test_longitude_west() {
        let lon = decode_longitude("12202.1234", "W").unwrap();
        assert!((lon + 122.03539).abs() < 1e-5);
    }

    #[test]
    fn test_longitude_east_positive() {
        let lon = decode_longitude("00930.0000", "E").unwrap();
        assert!((lon - 9.5).abs() < 1e-9);
    }

    #[test]
    fn test_malformed_coordinates() {
        for bad in ["", "37", "37a3.2", "37.23.1", "-3723.2475", "N"] {
            assert!(
                matches!(
                    decode_latitude(bad, "N"),
                    Err(FieldError::MalformedCoordinate { .. })
                ),
                "expected failure for {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_cell_id_split() {
        let id = decode_cell_id("1F4").unwrap();
        assert_eq!(id.major, 1);
        assert_eq!(id.minor, 244);
        assert_eq!(id.to_string(), "1.244");
    }

    #[test]
    fn test_cell_id_wide_value() {
        // 28-bit E-UTRAN cell identity
        let id = decode_cell_id("A1B2C03").unwrap();
        assert_eq!(id.major, 0xA1B2C03 / 256);
        assert_eq!(id.minor, 0x03);
    }

    #[test]
    fn test_hex_prefix_and_case() {
        assert_eq!(decode_hex("0x1f4").unwrap(), 500);
        assert_eq!(decode_lac("2B0C").unwrap(), 11020);
    }

    #[test]
    fn test_malformed_hex() {
        for bad in ["", "0x", "XYZ", "12G4", "+1F"] {
            assert!(matches!(
                decode_hex(bad),
                Err(FieldError::MalformedHex { .. })
            ));
        }
    }

    #[test]
    fn test_altitude_truncation() {
        assert_eq!(decode_altitude("123.4").unwrap(), 120);
        assert_eq!(decode_altitude("9.9").unwrap(), 0);
        assert_eq!(decode_altitude("250").unwrap(), 250);
        assert_eq!(decode_altitude("-15.0").unwrap(), -10);
        assert!(decode_altitude("abc").is_err());
        assert!(decode_altitude("NaN").is_err());
        assert!(decode_altitude("1e19").is_err());
        assert!(decode_altitude("-9.9e18").is_err());
        assert!(decode_altitude("inf").is_err());
    }

    #[test]
    fn test_timestamp_with_fraction() {
        let ts = decode_utc_timestamp("230394", "123519.00").unwrap();
        assert_eq!(ts.year(), 1994);
        assert_eq!(ts.month(), 3);
        assert_eq!(ts.day(), 23);
        assert_eq!(ts.hour(), 12);
        assert_eq!(ts.minute(), 35);
        assert_eq!(ts.second(), 19);
    }

    #[test]
    fn test_timestamp_two_digit_year_window() {
        let ts = decode_utc_timestamp("040925", "224745").unwrap();
        assert_eq!(ts.year(), 2025);
    }

    #[test]
    fn test_malformed_timestamps() {
        assert!(decode_utc_timestamp("2303", "123519").is_err());
        assert!(decode_utc_timestamp("230394", "1235").is_err());
        assert!(decode_utc_timestamp("320194", "123519").is_err());
        assert!(decode_utc_timestamp("23a394", "123519").is_err());
        assert!(matches!(
            decode_utc_timestamp("230394", "256000"),
            Err(FieldError::MalformedTimestamp { .. })
        ));
    }
}
