//! Column schema of the telemetry CSV file.
//!
//! The header is a stable contract with the rendering layer: column names and
//! order never change, and readers reject any drift before touching the rows.

use csv::StringRecord;

use crate::error::{Error, Result};

/// Timestamp column, RFC 3339 UTC.
pub const TIMESTAMP: &str = "timestamp";
/// Vehicle speed column, km/h.
pub const SPEED_KMH: &str = "speed_kmh";
/// Engine speed column, revolutions per minute.
pub const RPM: &str = "rpm";
/// Throttle position column, percent.
pub const THROTTLE_PCT: &str = "throttle_pct";
/// Engine load column, percent.
pub const ENGINE_LOAD_PCT: &str = "engine_load_pct";
/// Fuel consumed during the interval ending at the sample, liters.
pub const FUEL_USED_L: &str = "fuel_used_l";

/// All columns in file order.
pub const COLUMNS: [&str; 6] = [
    TIMESTAMP,
    SPEED_KMH,
    RPM,
    THROTTLE_PCT,
    ENGINE_LOAD_PCT,
    FUEL_USED_L,
];

/// Check that a header row matches [`COLUMNS`] exactly.
///
/// # Errors
///
/// Returns [`Error::SchemaMismatch`] when a column is missing, extra, renamed
/// or out of order.
pub fn validate_header(header: &StringRecord) -> Result<()> {
    let matches = header.len() == COLUMNS.len()
        && header
            .iter()
            .zip(COLUMNS)
            .all(|(found, expected)| found.trim() == expected);

    if matches {
        Ok(())
    } else {
        Err(Error::SchemaMismatch {
            expected: COLUMNS.join(","),
            found: header.iter().collect::<Vec<_>>().join(","),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_order() {
        assert_eq!(
            COLUMNS.join(","),
            "timestamp,speed_kmh,rpm,throttle_pct,engine_load_pct,fuel_used_l"
        );
    }

    #[test]
    fn test_validate_header_accepts_schema() {
        let header = StringRecord::from(COLUMNS.to_vec());
        assert!(validate_header(&header).is_ok());
    }

    #[test]
    fn test_validate_header_rejects_missing_column() {
        let header = StringRecord::from(vec!["timestamp", "speed_kmh", "rpm"]);
        let err = validate_header(&header).unwrap_err();
        assert!(matches!(err, Error::SchemaMismatch { .. }));
        assert!(err.to_string().contains("found [timestamp,speed_kmh,rpm]"));
    }

    #[test]
    fn test_validate_header_rejects_reordered_columns() {
        let header = StringRecord::from(vec![
            "timestamp",
            "rpm",
            "speed_kmh",
            "throttle_pct",
            "engine_load_pct",
            "fuel_used_l",
        ]);
        assert!(validate_header(&header).is_err());
    }

    #[test]
    fn test_validate_header_rejects_extra_column() {
        let mut columns = COLUMNS.to_vec();
        columns.push("gear");
        let header = StringRecord::from(columns);
        assert!(validate_header(&header).is_err());
    }
}
