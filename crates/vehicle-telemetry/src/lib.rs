//! `vehicle-telemetry` - Synthetic vehicle telemetry and derived metrics
//!
//! This library generates weeks of plausible OBD-style samples (speed, RPM,
//! throttle, engine load, fuel used), persists them as a CSV dataset, and
//! derives fuel efficiency, implied gear and summary statistics from it.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod dataset;
pub mod error;
pub mod generator;
pub mod logging;
pub mod metrics;
pub mod record;
pub mod vehicle;

pub use config::Config;
pub use dataset::Dataset;
pub use error::{Error, Result};
pub use generator::{GenerationParams, Scenario};
pub use logging::init_logging;
pub use metrics::{MetricsCalculator, MetricsReport, Summary};
pub use record::{RawRecord, TelemetryRecord};
pub use vehicle::VehicleProfile;
