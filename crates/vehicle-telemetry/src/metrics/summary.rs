//! Aggregate statistics over derived rows.

use serde::Serialize;

use super::DerivedRow;

/// Quick statistics for a set of rows.
///
/// Means are `None` when no row contributes to them. Undefined fuel
/// efficiencies never contribute.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    /// Rows summarized.
    pub samples: usize,
    /// Rows skipped as malformed across the whole dataset.
    pub skipped: usize,
    /// Rows with the engine running.
    pub engine_on_samples: usize,
    /// Rows with the engine running and the vehicle stationary.
    pub idle_samples: usize,
    /// Total distance covered, km.
    pub total_distance_km: f64,
    /// Total fuel consumed, liters.
    pub total_fuel_l: f64,
    /// Highest speed seen.
    pub max_speed_kmh: Option<f64>,
    /// Mean RPM over rows with the engine running.
    pub mean_rpm: Option<f64>,
    /// Rows with a defined fuel efficiency.
    pub efficiency_samples: usize,
    /// Mean of the defined per-row efficiencies, km/L.
    pub mean_efficiency_km_l: Option<f64>,
    /// Total distance over total fuel, km/L.
    pub overall_km_per_l: Option<f64>,
}

impl Summary {
    /// Summarize rows.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_rows<'a>(rows: impl IntoIterator<Item = &'a DerivedRow>, skipped: usize) -> Self {
        let mut summary = Self {
            skipped,
            ..Self::default()
        };
        let mut rpm_sum = 0.0;
        let mut efficiency_sum = 0.0;

        for row in rows {
            summary.samples += 1;
            summary.total_distance_km += row.distance_km;
            summary.total_fuel_l += row.fuel_used_l;
            summary.max_speed_kmh = Some(
                summary
                    .max_speed_kmh
                    .map_or(row.speed_kmh, |max| max.max(row.speed_kmh)),
            );
            if row.engine_running() {
                summary.engine_on_samples += 1;
                rpm_sum += row.rpm;
            }
            if row.is_idle() {
                summary.idle_samples += 1;
            }
            if let Some(efficiency) = row.efficiency_km_l {
                summary.efficiency_samples += 1;
                efficiency_sum += efficiency;
            }
        }

        summary.mean_rpm =
            (summary.engine_on_samples > 0).then(|| rpm_sum / summary.engine_on_samples as f64);
        summary.mean_efficiency_km_l = (summary.efficiency_samples > 0)
            .then(|| efficiency_sum / summary.efficiency_samples as f64);
        summary.overall_km_per_l =
            super::fuel_efficiency(summary.total_distance_km, summary.total_fuel_l);
        summary
    }
}

/// Mean speed over one week.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklySpeed {
    /// 1-based week number.
    pub week: u32,
    /// Mean speed over every sample in the week, km/h.
    pub mean_speed_kmh: f64,
    /// Samples in the week.
    pub samples: usize,
}

/// Mean speed per week, in week order. Rows must be in week order.
#[allow(clippy::cast_precision_loss)]
pub(super) fn weekly_speeds(rows: &[DerivedRow]) -> Vec<WeeklySpeed> {
    let mut weeks: Vec<(u32, f64, usize)> = Vec::new();
    for row in rows {
        match weeks.last_mut() {
            Some((week, sum, count)) if *week == row.week => {
                *sum += row.speed_kmh;
                *count += 1;
            }
            _ => weeks.push((row.week, row.speed_kmh, 1)),
        }
    }
    weeks
        .into_iter()
        .map(|(week, sum, samples)| WeeklySpeed {
            week,
            mean_speed_kmh: sum / samples as f64,
            samples,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn row(week: u32, speed_kmh: f64, rpm: f64, fuel_used_l: f64) -> DerivedRow {
        DerivedRow {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
                + Duration::weeks(i64::from(week) - 1),
            week,
            speed_kmh,
            rpm,
            throttle_pct: 20.0,
            engine_load_pct: 30.0,
            fuel_used_l,
            distance_km: speed_kmh,
            efficiency_km_l: super::super::fuel_efficiency(speed_kmh, fuel_used_l),
            gear: None,
            rpm_per_kmh: None,
        }
    }

    #[test]
    fn test_empty_summary() {
        let summary = Summary::from_rows(std::iter::empty(), 3);
        assert_eq!(summary.samples, 0);
        assert_eq!(summary.skipped, 3);
        assert!(summary.max_speed_kmh.is_none());
        assert!(summary.mean_rpm.is_none());
        assert!(summary.mean_efficiency_km_l.is_none());
        assert!(summary.overall_km_per_l.is_none());
    }

    #[test]
    fn test_summary_totals() {
        let rows = [
            row(1, 80.0, 2000.0, 5.0),
            row(1, 0.0, 850.0, 0.5),
            row(1, 0.0, 0.0, 0.0),
            row(1, 40.0, 1500.0, 3.5),
        ];
        let summary = Summary::from_rows(&rows, 0);

        assert_eq!(summary.samples, 4);
        assert_eq!(summary.engine_on_samples, 3);
        assert_eq!(summary.idle_samples, 1);
        assert_eq!(summary.max_speed_kmh, Some(80.0));
        assert!((summary.total_distance_km - 120.0).abs() < 1e-9);
        assert!((summary.total_fuel_l - 9.0).abs() < 1e-9);

        let mean_rpm = summary.mean_rpm.unwrap();
        assert!((mean_rpm - 4350.0 / 3.0).abs() < 1e-9);

        // 16, 0 and 40/3.5; the engine-off row has no efficiency
        assert_eq!(summary.efficiency_samples, 3);
        let expected = (16.0 + 0.0 + 40.0 / 3.5) / 3.0;
        assert!((summary.mean_efficiency_km_l.unwrap() - expected).abs() < 1e-9);
        assert!((summary.overall_km_per_l.unwrap() - 120.0 / 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_summary_all_engine_off() {
        let rows = [row(1, 0.0, 0.0, 0.0), row(1, 0.0, 0.0, 0.0)];
        let summary = Summary::from_rows(&rows, 0);
        assert_eq!(summary.efficiency_samples, 0);
        assert!(summary.mean_efficiency_km_l.is_none());
        assert!(summary.overall_km_per_l.is_none());
        assert_eq!(summary.max_speed_kmh, Some(0.0));
    }

    #[test]
    fn test_weekly_speeds() {
        let rows = [
            row(1, 10.0, 900.0, 1.0),
            row(1, 30.0, 1200.0, 1.0),
            row(2, 60.0, 1800.0, 2.0),
            row(3, 0.0, 0.0, 0.0),
            row(3, 90.0, 2200.0, 4.0),
        ];
        let weekly = weekly_speeds(&rows);
        assert_eq!(weekly.len(), 3);
        assert_eq!(weekly[0].week, 1);
        assert!((weekly[0].mean_speed_kmh - 20.0).abs() < 1e-9);
        assert_eq!(weekly[1].samples, 1);
        assert!((weekly[2].mean_speed_kmh - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_weekly_speeds_empty() {
        assert!(weekly_speeds(&[]).is_empty());
    }
}
