//! Synthetic telemetry generation.
//!
//! The generator produces an exact, gap-free grid of samples covering a whole
//! number of weeks. All randomness comes from the `Rng` passed in, so a seeded
//! source reproduces a dataset exactly:
//!
//! ```
//! use vehicle_telemetry::generator::{generate, rng_for, GenerationParams};
//! use vehicle_telemetry::VehicleProfile;
//!
//! let params = GenerationParams { weeks: 1, ..GenerationParams::default() };
//! let vehicle = VehicleProfile::default();
//!
//! let first = generate(&params, &vehicle, &mut rng_for(Some(7))).unwrap();
//! let second = generate(&params, &vehicle, &mut rng_for(Some(7))).unwrap();
//! assert_eq!(first.records.len(), 168);
//! assert_eq!(first.records, second.records);
//! ```

mod drive;
mod scenario;

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub use scenario::Scenario;

use self::drive::DriveSimulator;
use crate::error::{Error, Result};
use crate::record::TelemetryRecord;
use crate::vehicle::VehicleProfile;

/// Seconds in one week.
pub const SECONDS_PER_WEEK: u64 = 7 * 24 * 60 * 60;

/// Upper bound on the number of samples in one run.
pub const MAX_SAMPLES: u64 = 10_000_000;

/// 2024-01-01T08:00:00Z, the default first sample.
const DEFAULT_START_SECS: i64 = 1_704_096_000;

/// Inputs to a generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Number of weeks to cover.
    pub weeks: u32,
    /// Seconds between consecutive samples; must divide one week.
    pub interval_secs: u32,
    /// Timestamp of the first sample.
    pub start: DateTime<Utc>,
    /// Scenario used for every week; drawn per week when `None`.
    pub scenario: Option<Scenario>,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            weeks: 15,
            interval_secs: 3600,
            start: default_start(),
            scenario: None,
        }
    }
}

/// The default timestamp of the first sample.
#[must_use]
pub fn default_start() -> DateTime<Utc> {
    DateTime::from_timestamp(DEFAULT_START_SECS, 0).unwrap_or_default()
}

impl GenerationParams {
    /// Validate the parameters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] when `weeks` or `interval_secs` is
    /// zero, the interval does not divide a week, the run would exceed
    /// [`MAX_SAMPLES`], or its end lies outside the representable date range.
    pub fn validate(&self) -> Result<()> {
        if self.weeks == 0 {
            return Err(Error::invalid_parameter("weeks", "must be greater than 0"));
        }
        if self.interval_secs == 0 {
            return Err(Error::invalid_parameter(
                "interval_secs",
                "must be greater than 0",
            ));
        }
        if SECONDS_PER_WEEK % u64::from(self.interval_secs) != 0 {
            return Err(Error::invalid_parameter(
                "interval_secs",
                format!(
                    "{} does not divide one week ({SECONDS_PER_WEEK} s) evenly",
                    self.interval_secs
                ),
            ));
        }
        if self.total_samples() > MAX_SAMPLES {
            return Err(Error::invalid_parameter(
                "weeks",
                format!(
                    "{} weeks at {} s would produce {} samples, more than {MAX_SAMPLES}",
                    self.weeks,
                    self.interval_secs,
                    self.total_samples()
                ),
            ));
        }
        if self.end().is_none() {
            return Err(Error::invalid_parameter(
                "weeks",
                "run extends past the supported date range",
            ));
        }
        Ok(())
    }

    /// Number of samples in one week.
    #[must_use]
    pub fn samples_per_week(&self) -> u64 {
        SECONDS_PER_WEEK
            .checked_div(u64::from(self.interval_secs))
            .unwrap_or(0)
    }

    /// Number of samples in the whole run.
    #[must_use]
    pub fn total_samples(&self) -> u64 {
        u64::from(self.weeks) * self.samples_per_week()
    }

    /// Time between consecutive samples.
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::seconds(i64::from(self.interval_secs))
    }

    /// Exclusive end of the covered span, `start + weeks`.
    #[must_use]
    pub fn end(&self) -> Option<DateTime<Utc>> {
        self.start.checked_add_signed(Duration::weeks(i64::from(self.weeks)))
    }
}

/// Output of a generation run.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedDataset {
    /// Samples in timestamp order.
    pub records: Vec<TelemetryRecord>,
    /// Scenario driven in each week, first week first.
    pub week_scenarios: Vec<Scenario>,
}

/// Build the pseudo-random source for a run.
///
/// A seed makes the run reproducible; without one the source is seeded from
/// the operating system and every run differs.
#[must_use]
pub fn rng_for(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Generate a complete dataset.
///
/// # Errors
///
/// Returns [`Error::InvalidParameter`] if the parameters or the vehicle
/// profile are invalid. Nothing is generated in that case.
pub fn generate<R: Rng + ?Sized>(
    params: &GenerationParams,
    vehicle: &VehicleProfile,
    rng: &mut R,
) -> Result<GeneratedDataset> {
    params.validate()?;
    vehicle.validate()?;

    let samples_per_week = params.samples_per_week();
    let interval = params.interval();
    let interval_hours = f64::from(params.interval_secs) / 3600.0;
    let capacity = usize::try_from(params.total_samples()).unwrap_or(0);

    let mut records = Vec::with_capacity(capacity);
    let mut week_scenarios = Vec::with_capacity(usize::try_from(params.weeks).unwrap_or(0));
    let mut simulator = DriveSimulator::new(vehicle, interval_hours);
    let mut timestamp = params.start;

    for week in 1..=params.weeks {
        let scenario = params
            .scenario
            .unwrap_or_else(|| Scenario::ALL[rng.gen_range(0..Scenario::ALL.len())]);
        simulator.set_scenario(scenario, rng);
        week_scenarios.push(scenario);
        debug!(week, %scenario, "Generating week");

        for _ in 0..samples_per_week {
            records.push(simulator.step(rng, timestamp));
            timestamp += interval;
        }
    }

    info!(
        rows = records.len(),
        weeks = params.weeks,
        interval_secs = params.interval_secs,
        "Generated telemetry"
    );
    Ok(GeneratedDataset {
        records,
        week_scenarios,
    })
}
