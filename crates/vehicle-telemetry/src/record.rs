//! Core telemetry record types.
//!
//! [`TelemetryRecord`] is a validated sample as produced by the generator.
//! [`RawRecord`] is a row as read back from disk, where any cell may be
//! missing or unparseable; validating it yields a `TelemetryRecord` or a
//! [`Error::MalformedRecord`] describing the first problem found.

use chrono::{DateTime, SecondsFormat, Utc};
use csv::StringRecord;
use serde::{Deserialize, Serialize};

use crate::dataset::schema;
use crate::error::{Error, Result};
use crate::vehicle::VehicleProfile;

/// One timestamped sample of vehicle sensor readings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    /// When the sample was taken.
    pub timestamp: DateTime<Utc>,
    /// Vehicle speed in km/h.
    pub speed_kmh: f64,
    /// Engine speed; zero when the engine is off.
    pub rpm: f64,
    /// Throttle position, percent.
    pub throttle_pct: f64,
    /// Engine load, percent.
    pub engine_load_pct: f64,
    /// Fuel consumed during the interval ending at this sample, liters.
    pub fuel_used_l: f64,
}

impl TelemetryRecord {
    /// Format the record as CSV cells in [`schema::COLUMNS`] order.
    #[must_use]
    pub fn to_csv_row(&self) -> [String; 6] {
        [
            self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            format!("{:.1}", self.speed_kmh),
            format!("{:.0}", self.rpm),
            format!("{:.1}", self.throttle_pct),
            format!("{:.1}", self.engine_load_pct),
            format!("{:.6}", self.fuel_used_l),
        ]
    }

    /// Check every reading against its declared bound.
    ///
    /// A running engine turns at least `idle_rpm`; an engine at 0 rpm is off,
    /// so the vehicle is stationary and burns no fuel.
    ///
    /// # Errors
    ///
    /// Returns a description of the first reading out of bounds.
    pub fn check_bounds(&self, vehicle: &VehicleProfile) -> std::result::Result<(), String> {
        let bounds = [
            (schema::SPEED_KMH, self.speed_kmh, vehicle.max_speed_kmh),
            (schema::RPM, self.rpm, vehicle.max_rpm),
            (schema::THROTTLE_PCT, self.throttle_pct, 100.0),
            (schema::ENGINE_LOAD_PCT, self.engine_load_pct, 100.0),
            (schema::FUEL_USED_L, self.fuel_used_l, f64::MAX),
        ];
        for (column, value, max) in bounds {
            if !value.is_finite() || value < 0.0 || value > max {
                return Err(if max == f64::MAX {
                    format!("{column} {value} must be a non-negative number")
                } else {
                    format!("{column} {value} outside [0, {max}]")
                });
            }
        }

        if self.engine_running() {
            if self.rpm < vehicle.idle_rpm {
                return Err(format!(
                    "{} {} below idle_rpm {} with the engine running",
                    schema::RPM,
                    self.rpm,
                    vehicle.idle_rpm
                ));
            }
        } else if self.speed_kmh > 0.0 || self.fuel_used_l > 0.0 {
            return Err(format!(
                "{} 0 (engine off) with {} {} and {} {}",
                schema::RPM,
                schema::SPEED_KMH,
                self.speed_kmh,
                schema::FUEL_USED_L,
                self.fuel_used_l
            ));
        }
        Ok(())
    }

    /// Whether the engine was running at this sample.
    #[must_use]
    pub fn engine_running(&self) -> bool {
        self.rpm > 0.0
    }
}

/// A dataset row before validation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawRecord {
    /// 1-based data line (the header is line 0).
    pub line: u64,
    /// Parsed timestamp, if present and valid RFC 3339.
    pub timestamp: Option<DateTime<Utc>>,
    /// Parsed speed.
    pub speed_kmh: Option<f64>,
    /// Parsed engine speed.
    pub rpm: Option<f64>,
    /// Parsed throttle position.
    pub throttle_pct: Option<f64>,
    /// Parsed engine load.
    pub engine_load_pct: Option<f64>,
    /// Parsed fuel consumption.
    pub fuel_used_l: Option<f64>,
}

impl RawRecord {
    /// Parse a CSV row. Missing or unparseable cells become `None`.
    #[must_use]
    pub fn from_csv(line: u64, row: &StringRecord) -> Self {
        let number = |index: usize| {
            row.get(index)
                .map(str::trim)
                .filter(|cell| !cell.is_empty())
                .and_then(|cell| cell.parse::<f64>().ok())
        };
        let timestamp = row
            .get(0)
            .map(str::trim)
            .and_then(|cell| DateTime::parse_from_rfc3339(cell).ok())
            .map(|ts| ts.with_timezone(&Utc));

        Self {
            line,
            timestamp,
            speed_kmh: number(1),
            rpm: number(2),
            throttle_pct: number(3),
            engine_load_pct: number(4),
            fuel_used_l: number(5),
        }
    }

    /// Wrap an already built record, e.g. for in-memory datasets.
    #[must_use]
    pub fn from_record(line: u64, record: &TelemetryRecord) -> Self {
        Self {
            line,
            timestamp: Some(record.timestamp),
            speed_kmh: Some(record.speed_kmh),
            rpm: Some(record.rpm),
            throttle_pct: Some(record.throttle_pct),
            engine_load_pct: Some(record.engine_load_pct),
            fuel_used_l: Some(record.fuel_used_l),
        }
    }

    /// Validate presence and bounds of every field.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedRecord`] naming the first missing or
    /// out-of-bound column.
    pub fn validate(&self, vehicle: &VehicleProfile) -> Result<TelemetryRecord> {
        let missing =
            |column: &str| Error::malformed(self.line, format!("missing or invalid {column}"));

        let record = TelemetryRecord {
            timestamp: self.timestamp.ok_or_else(|| missing(schema::TIMESTAMP))?,
            speed_kmh: self.speed_kmh.ok_or_else(|| missing(schema::SPEED_KMH))?,
            rpm: self.rpm.ok_or_else(|| missing(schema::RPM))?,
            throttle_pct: self.throttle_pct.ok_or_else(|| missing(schema::THROTTLE_PCT))?,
            engine_load_pct: self
                .engine_load_pct
                .ok_or_else(|| missing(schema::ENGINE_LOAD_PCT))?,
            fuel_used_l: self.fuel_used_l.ok_or_else(|| missing(schema::FUEL_USED_L))?,
        };

        record
            .check_bounds(vehicle)
            .map_err(|reason| Error::malformed(self.line, reason))?;
        Ok(record)
    }
}
