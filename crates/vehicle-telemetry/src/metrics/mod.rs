//! Derived metrics computed at read time.
//!
//! The [`MetricsCalculator`] makes one pass over a dataset's rows. Rows that
//! fail validation are skipped and reported; every other row becomes a
//! [`DerivedRow`] carrying the values the charts plot. Nothing here mutates
//! the dataset or writes to disk.

mod summary;
pub mod views;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

pub use summary::{Summary, WeeklySpeed};

use crate::error::Error;
use crate::record::{RawRecord, TelemetryRecord};
use crate::vehicle::VehicleProfile;

/// Fuel efficiency in km/L; `None` when no fuel was consumed.
#[must_use]
pub fn fuel_efficiency(distance_km: f64, fuel_used_l: f64) -> Option<f64> {
    (fuel_used_l > 0.0).then(|| distance_km / fuel_used_l)
}

/// A validated row with its derived values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedRow {
    /// When the sample was taken.
    pub timestamp: DateTime<Utc>,
    /// 1-based week number counted from the first valid sample.
    pub week: u32,
    /// Vehicle speed in km/h.
    pub speed_kmh: f64,
    /// Engine speed.
    pub rpm: f64,
    /// Throttle position, percent.
    pub throttle_pct: f64,
    /// Engine load, percent.
    pub engine_load_pct: f64,
    /// Fuel consumed over the interval, liters.
    pub fuel_used_l: f64,
    /// Distance covered over the interval, km.
    pub distance_km: f64,
    /// Fuel efficiency in km/L; `None` when undefined.
    pub efficiency_km_l: Option<f64>,
    /// Gear implied by the speed/RPM ratio.
    pub gear: Option<u8>,
    /// Observed engine revolutions per km/h.
    pub rpm_per_kmh: Option<f64>,
}

impl DerivedRow {
    /// Whether the engine was running.
    #[must_use]
    pub fn engine_running(&self) -> bool {
        self.rpm > 0.0
    }

    /// Whether the engine was running with the vehicle stationary.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.engine_running() && self.speed_kmh < 1.0
    }
}

/// A row rejected during computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRecord {
    /// 1-based data line of the row.
    pub line: u64,
    /// Why it was rejected.
    pub reason: String,
}

impl From<Error> for SkippedRecord {
    fn from(err: Error) -> Self {
        match err {
            Error::MalformedRecord { line, reason } => Self { line, reason },
            other => Self {
                line: 0,
                reason: other.to_string(),
            },
        }
    }
}

/// Result of a metrics computation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricsReport {
    /// Derived rows in dataset order.
    pub rows: Vec<DerivedRow>,
    /// Rows that failed validation.
    pub skipped: Vec<SkippedRecord>,
}

impl MetricsReport {
    /// Number of rows skipped as malformed.
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    /// Rows in the given week, or all rows for `None`.
    pub fn rows_in(&self, week: Option<u32>) -> impl Iterator<Item = &DerivedRow> + '_ {
        self.rows
            .iter()
            .filter(move |row| week.map_or(true, |w| row.week == w))
    }

    /// Week numbers present in the report, ascending.
    #[must_use]
    pub fn weeks(&self) -> Vec<u32> {
        let mut weeks: Vec<u32> = self.rows.iter().map(|row| row.week).collect();
        weeks.dedup();
        weeks
    }

    /// Aggregate statistics for one week, or for the whole dataset.
    #[must_use]
    pub fn summary(&self, week: Option<u32>) -> Summary {
        Summary::from_rows(self.rows_in(week), self.skipped_count())
    }

    /// Mean speed per week.
    #[must_use]
    pub fn weekly_speeds(&self) -> Vec<WeeklySpeed> {
        summary::weekly_speeds(&self.rows)
    }
}

/// Computes derived metrics for a sampling interval and vehicle.
#[derive(Debug, Clone)]
pub struct MetricsCalculator<'a> {
    vehicle: &'a VehicleProfile,
    interval: Duration,
}

impl<'a> MetricsCalculator<'a> {
    /// Create a calculator for samples spaced `interval` apart.
    #[must_use]
    pub fn new(vehicle: &'a VehicleProfile, interval: Duration) -> Self {
        Self { vehicle, interval }
    }

    /// The sampling interval in hours.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn interval_hours(&self) -> f64 {
        self.interval.num_milliseconds() as f64 / 3_600_000.0
    }

    /// Derive chart values for a single validated record.
    #[must_use]
    pub fn derive(&self, record: &TelemetryRecord, week: u32) -> DerivedRow {
        let distance_km = record.speed_kmh * self.interval_hours();
        let moving = record.speed_kmh >= 1.0 && record.engine_running();
        DerivedRow {
            timestamp: record.timestamp,
            week,
            speed_kmh: record.speed_kmh,
            rpm: record.rpm,
            throttle_pct: record.throttle_pct,
            engine_load_pct: record.engine_load_pct,
            fuel_used_l: record.fuel_used_l,
            distance_km,
            efficiency_km_l: fuel_efficiency(distance_km, record.fuel_used_l),
            gear: self.vehicle.implied_gear(record.speed_kmh, record.rpm),
            rpm_per_kmh: moving.then(|| record.rpm / record.speed_kmh),
        }
    }

    /// Validate and derive every row.
    ///
    /// Malformed rows, including rows whose timestamp does not follow the
    /// previous valid row, are skipped and listed in the report.
    #[must_use]
    pub fn compute(&self, rows: &[RawRecord]) -> MetricsReport {
        let mut report = MetricsReport {
            rows: Vec::with_capacity(rows.len()),
            skipped: Vec::new(),
        };
        let mut origin: Option<DateTime<Utc>> = None;
        let mut previous: Option<DateTime<Utc>> = None;

        for raw in rows {
            let record = match raw.validate(self.vehicle) {
                Ok(record) => record,
                Err(err) => {
                    warn!(line = raw.line, error = %err, "Skipping malformed record");
                    report.skipped.push(err.into());
                    continue;
                }
            };

            if let Some(previous) = previous {
                if record.timestamp <= previous {
                    let err = Error::malformed(
                        raw.line,
                        format!(
                            "timestamp {} is not after the previous sample {}",
                            record.timestamp.to_rfc3339(),
                            previous.to_rfc3339()
                        ),
                    );
                    warn!(line = raw.line, error = %err, "Skipping malformed record");
                    report.skipped.push(err.into());
                    continue;
                }
            }
            previous = Some(record.timestamp);

            let first = *origin.get_or_insert(record.timestamp);
            let week =
                u32::try_from((record.timestamp - first).num_weeks() + 1).unwrap_or(u32::MAX);
            report.rows.push(self.derive(&record, week));
        }

        if !report.skipped.is_empty() {
            info!(
                skipped = report.skipped.len(),
                processed = report.rows.len(),
                "Skipped malformed records"
            );
        }
        debug!(rows = report.rows.len(), "Computed derived metrics");
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use crate::generator::{generate, rng_for, GenerationParams, Scenario};
    use chrono::TimeZone;

    fn record(hour: i64, speed_kmh: f64, rpm: f64, fuel_used_l: f64) -> TelemetryRecord {
        TelemetryRecord {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
                + Duration::hours(hour),
            speed_kmh,
            rpm,
            throttle_pct: 30.0,
            engine_load_pct: 40.0,
            fuel_used_l,
        }
    }

    fn calculator(vehicle: &VehicleProfile) -> MetricsCalculator<'_> {
        MetricsCalculator::new(vehicle, Duration::hours(1))
    }

    #[test]
    fn test_fuel_efficiency() {
        assert_eq!(fuel_efficiency(60.0, 4.0), Some(15.0));
        assert_eq!(fuel_efficiency(60.0, 0.0), None);
        assert_eq!(fuel_efficiency(0.0, 0.0), None);
        assert_eq!(fuel_efficiency(0.0, 0.5), Some(0.0));
    }

    #[test]
    fn test_interval_hours() {
        let vehicle = VehicleProfile::default();
        assert!((calculator(&vehicle).interval_hours() - 1.0).abs() < f64::EPSILON);
        let quarter = MetricsCalculator::new(&vehicle, Duration::minutes(15));
        assert!((quarter.interval_hours() - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_derive_row() {
        let vehicle = VehicleProfile::default();
        let row = calculator(&vehicle).derive(&record(0, 60.0, 1500.0, 4.0), 1);
        assert!((row.distance_km - 60.0).abs() < 1e-12);
        assert_eq!(row.efficiency_km_l, Some(15.0));
        assert_eq!(row.gear, Some(5));
        assert_eq!(row.rpm_per_kmh, Some(25.0));
    }

    #[test]
    fn test_zero_fuel_is_undefined_not_zero() {
        let vehicle = VehicleProfile::default();
        let row = calculator(&vehicle).derive(&record(0, 0.0, 0.0, 0.0), 1);
        assert!(row.efficiency_km_l.is_none());
        assert!(row.gear.is_none());
        assert!(row.rpm_per_kmh.is_none());
    }

    #[test]
    fn test_zero_fuel_excluded_from_mean() {
        let vehicle = VehicleProfile::default();
        let dataset = Dataset::from_records(&[
            record(0, 60.0, 1500.0, 4.0),
            record(1, 0.0, 0.0, 0.0),
            record(2, 30.0, 1300.0, 3.0),
        ]);
        let report = calculator(&vehicle).compute(dataset.rows());
        let summary = report.summary(None);

        assert_eq!(report.rows.len(), 3);
        assert_eq!(summary.efficiency_samples, 2);
        let mean = summary.mean_efficiency_km_l.unwrap();
        assert!((mean - 12.5).abs() < 1e-9);
        assert!(mean.is_finite());
    }

    #[test]
    fn test_out_of_bound_throttle_skipped() {
        crate::logging::init_test_logging();
        let vehicle = VehicleProfile::default();
        let records: Vec<_> = (0..10).map(|h| record(h, 50.0, 1500.0, 2.0)).collect();
        let mut rows = Dataset::from_records(&records).rows().to_vec();
        rows[4].throttle_pct = Some(150.0);

        let report = calculator(&vehicle).compute(&rows);
        assert_eq!(report.skipped_count(), 1);
        assert_eq!(report.skipped[0].line, 5);
        assert!(report.skipped[0].reason.contains("throttle_pct"));
        assert_eq!(report.rows.len(), 9);
        assert!(report.rows.iter().all(|row| row.efficiency_km_l == Some(25.0)));
    }

    #[test]
    fn test_missing_field_skipped() {
        let vehicle = VehicleProfile::default();
        let records = [record(0, 50.0, 1500.0, 2.0), record(1, 50.0, 1500.0, 2.0)];
        let mut rows = Dataset::from_records(&records).rows().to_vec();
        rows[0].fuel_used_l = None;

        let report = calculator(&vehicle).compute(&rows);
        assert_eq!(report.skipped_count(), 1);
        assert!(report.skipped[0].reason.contains("fuel_used_l"));
        assert_eq!(report.rows.len(), 1);
    }

    #[test]
    fn test_non_increasing_timestamp_skipped() {
        let vehicle = VehicleProfile::default();
        let dataset = Dataset::from_records(&[
            record(0, 50.0, 1500.0, 2.0),
            record(1, 50.0, 1500.0, 2.0),
            record(1, 50.0, 1500.0, 2.0),
            record(2, 50.0, 1500.0, 2.0),
        ]);
        let report = calculator(&vehicle).compute(dataset.rows());
        assert_eq!(report.skipped_count(), 1);
        assert_eq!(report.skipped[0].line, 3);
        assert!(report.skipped[0].reason.contains("not after"));
        assert_eq!(report.rows.len(), 3);
    }

    #[test]
    fn test_week_numbers() {
        let vehicle = VehicleProfile::default();
        let records: Vec<_> = [0, 100, 167, 168, 200, 336]
            .into_iter()
            .map(|h| record(h, 40.0, 1400.0, 1.0))
            .collect();
        let report = calculator(&vehicle).compute(Dataset::from_records(&records).rows());
        let weeks: Vec<_> = report.rows.iter().map(|row| row.week).collect();
        assert_eq!(weeks, vec![1, 1, 1, 2, 2, 3]);
        assert_eq!(report.weeks(), vec![1, 2, 3]);
        assert_eq!(report.rows_in(Some(2)).count(), 2);
        assert_eq!(report.rows_in(None).count(), 6);
    }

    #[test]
    fn test_compute_does_not_mutate_input() {
        let vehicle = VehicleProfile::default();
        let dataset = Dataset::from_records(&[record(0, 50.0, 1500.0, 2.0)]);
        let before = dataset.clone();
        let _ = calculator(&vehicle).compute(dataset.rows());
        assert_eq!(dataset, before);
    }

    #[test]
    fn test_skipped_record_from_other_error() {
        let skipped = SkippedRecord::from(Error::invalid_parameter("weeks", "zero"));
        assert_eq!(skipped.line, 0);
        assert!(skipped.reason.contains("weeks"));
    }

    #[test]
    fn test_end_to_end_week_of_hourly_samples() {
        let vehicle = VehicleProfile::default();
        let params = GenerationParams {
            weeks: 1,
            scenario: Some(Scenario::Mixed),
            ..GenerationParams::default()
        };
        let data = generate(&params, &vehicle, &mut rng_for(Some(5))).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("telemetry.csv");
        crate::dataset::write(&path, &data.records).unwrap();

        let dataset = Dataset::load(&path).unwrap();
        assert_eq!(dataset.len(), 168);
        let interval = dataset.infer_interval().unwrap();
        assert_eq!(interval, Duration::hours(1));

        let report = MetricsCalculator::new(&vehicle, interval).compute(dataset.rows());
        assert_eq!(report.skipped_count(), 0);
        assert_eq!(report.rows.len(), 168);

        let efficiencies: Vec<f64> = data
            .records
            .iter()
            .filter(|record| record.fuel_used_l > 0.0)
            .map(|record| record.speed_kmh / record.fuel_used_l)
            .collect();
        let summary = report.summary(None);
        assert!(summary.efficiency_samples > 0);
        assert_eq!(summary.efficiency_samples, efficiencies.len());
        #[allow(clippy::cast_precision_loss)]
        let expected = efficiencies.iter().sum::<f64>() / efficiencies.len() as f64;
        assert!((summary.mean_efficiency_km_l.unwrap() - expected).abs() < 1e-6);
    }

    #[test]
    fn test_fixed_dataset_matches_hand_computation() {
        let csv = "\
timestamp,speed_kmh,rpm,throttle_pct,engine_load_pct,fuel_used_l
2024-01-01T08:00:00Z,60.0,1500,30.0,40.0,4.000000
2024-01-01T09:00:00Z,0.0,0,0.0,0.0,0.000000
2024-01-01T10:00:00Z,30.0,1300,20.0,30.0,3.000000
2024-01-01T11:00:00Z,0.0,820,2.0,12.0,0.500000
2024-01-01T12:00:00Z,45.0,1500,150.0,40.0,2.000000
";
        let vehicle = VehicleProfile::default();
        let dataset = Dataset::from_reader(csv.as_bytes()).unwrap();
        let interval = dataset.infer_interval().unwrap();
        let report = MetricsCalculator::new(&vehicle, interval).compute(dataset.rows());
        let summary = report.summary(None);

        // 60/4 = 15, 30/3 = 10, 0/0.5 = 0; the parked row has no efficiency
        // and the last row is rejected for throttle 150
        assert_eq!(summary.samples, 4);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.efficiency_samples, 3);
        assert!((summary.mean_efficiency_km_l.unwrap() - 25.0 / 3.0).abs() < 1e-6);
        assert!((summary.total_distance_km - 90.0).abs() < 1e-9);
        assert!((summary.total_fuel_l - 7.5).abs() < 1e-9);
        assert!((summary.overall_km_per_l.unwrap() - 12.0).abs() < 1e-9);
        assert_eq!(summary.idle_samples, 1);
        assert_eq!(summary.max_speed_kmh, Some(60.0));
    }
}
