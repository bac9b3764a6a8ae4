//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::generator::Scenario;

/// Generate command arguments.
///
/// Unset flags fall back to the `[generator]` and `[dataset]` config sections.
#[derive(Debug, Args)]
pub struct GenerateCommand {
    /// Number of weeks to generate
    #[arg(short, long)]
    pub weeks: Option<u32>,

    /// Seconds between samples (must divide one week)
    #[arg(short, long, value_name = "SECS")]
    pub interval_secs: Option<u32>,

    /// Seed for reproducible output
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Use one scenario for every week
    #[arg(long, value_enum)]
    pub scenario: Option<ScenarioArg>,

    /// Destination CSV file
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Report command arguments.
#[derive(Debug, Args)]
pub struct ReportCommand {
    /// Dataset to read
    #[arg(short, long, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Restrict the summary to one week (1-based)
    #[arg(short, long)]
    pub week: Option<u32>,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Metrics command arguments.
#[derive(Debug, Args)]
pub struct MetricsCommand {
    /// Dataset to read
    #[arg(short, long, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Restrict the series to one week (1-based)
    #[arg(short, long)]
    pub week: Option<u32>,

    /// Which series to print
    #[arg(long, value_enum, default_value = "rows")]
    pub view: MetricsView,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Scenario argument for generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScenarioArg {
    /// Low-speed urban driving
    City,
    /// Sustained high speeds
    Highway,
    /// A blend of city and highway
    Mixed,
    /// Hard acceleration
    Aggressive,
    /// Over-revving and lugging
    Inefficient,
    /// Engine running, vehicle stationary
    Idle,
}

impl From<ScenarioArg> for Scenario {
    fn from(arg: ScenarioArg) -> Self {
        match arg {
            ScenarioArg::City => Self::City,
            ScenarioArg::Highway => Self::Highway,
            ScenarioArg::Mixed => Self::Mixed,
            ScenarioArg::Aggressive => Self::Aggressive,
            ScenarioArg::Inefficient => Self::Inefficient,
            ScenarioArg::Idle => Self::Idle,
        }
    }
}

/// Chart series printed by `vtelem metrics`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum MetricsView {
    /// Every derived row
    #[default]
    Rows,
    /// Speed against RPM, grouped by implied gear
    Gear,
    /// Throttle against RPM
    Throttle,
    /// Engine load against speed
    Load,
    /// RPM while idling
    Idle,
    /// Fuel efficiency against speed
    Efficiency,
    /// Mean speed per week
    WeeklySpeed,
}
