//! Command-line interface for vehicle-telemetry.
//!
//! This module provides the CLI structure for the `vtelem` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ConfigCommand, GenerateCommand, MetricsCommand, MetricsView, ReportCommand, ScenarioArg,
};

/// vtelem - Synthetic vehicle telemetry and derived metrics
///
/// Generates weeks of plausible OBD-style samples into a CSV file and computes
/// fuel efficiency, implied gear and summary statistics from it.
#[derive(Debug, Parser)]
#[command(name = "vtelem")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a synthetic telemetry dataset
    Generate(GenerateCommand),

    /// Summarize a dataset
    Report(ReportCommand),

    /// Print chart series derived from a dataset
    Metrics(MetricsCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::Verbosity;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_cli_name() {
        assert_eq!(Cli::command().get_name(), "vtelem");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_flags() {
        assert_eq!(parse(&["vtelem", "report"]).verbosity(), Verbosity::Normal);
        assert_eq!(parse(&["vtelem", "-q", "report"]).verbosity(), Verbosity::Quiet);
        assert_eq!(parse(&["vtelem", "-v", "report"]).verbosity(), Verbosity::Verbose);
        assert_eq!(parse(&["vtelem", "-vv", "report"]).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_quiet_wins_over_verbose() {
        assert_eq!(
            parse(&["vtelem", "-q", "-vv", "report"]).verbosity(),
            Verbosity::Quiet
        );
    }

    #[test]
    fn test_parse_generate_defaults() {
        let cli = parse(&["vtelem", "generate"]);
        let Command::Generate(cmd) = cli.command else {
            panic!("expected generate");
        };
        assert!(cmd.weeks.is_none());
        assert!(cmd.interval_secs.is_none());
        assert!(cmd.seed.is_none());
        assert!(cmd.scenario.is_none());
        assert!(cmd.output.is_none());
    }

    #[test]
    fn test_parse_generate_flags() {
        let cli = parse(&[
            "vtelem",
            "generate",
            "--weeks",
            "2",
            "--interval-secs",
            "900",
            "--seed",
            "42",
            "--scenario",
            "highway",
            "--output",
            "out.csv",
        ]);
        let Command::Generate(cmd) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(cmd.weeks, Some(2));
        assert_eq!(cmd.interval_secs, Some(900));
        assert_eq!(cmd.seed, Some(42));
        assert_eq!(cmd.scenario, Some(ScenarioArg::Highway));
        assert_eq!(cmd.output, Some(PathBuf::from("out.csv")));
    }

    #[test]
    fn test_parse_rejects_unknown_scenario() {
        assert!(Cli::try_parse_from(["vtelem", "generate", "--scenario", "rally"]).is_err());
    }

    #[test]
    fn test_parse_report() {
        let cli = parse(&["vtelem", "report", "--week", "3", "--json"]);
        let Command::Report(cmd) = cli.command else {
            panic!("expected report");
        };
        assert_eq!(cmd.week, Some(3));
        assert!(cmd.json);
        assert!(cmd.input.is_none());
    }

    #[test]
    fn test_parse_metrics_view() {
        let cli = parse(&["vtelem", "metrics", "--view", "weekly-speed", "-i", "x.csv"]);
        let Command::Metrics(cmd) = cli.command else {
            panic!("expected metrics");
        };
        assert_eq!(cmd.view, MetricsView::WeeklySpeed);
        assert_eq!(cmd.input, Some(PathBuf::from("x.csv")));

        let cli = parse(&["vtelem", "metrics"]);
        let Command::Metrics(cmd) = cli.command else {
            panic!("expected metrics");
        };
        assert_eq!(cmd.view, MetricsView::Rows);
    }

    #[test]
    fn test_parse_config_validate() {
        let cli = parse(&["vtelem", "config", "validate", "--file", "c.toml"]);
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Validate { file: Some(_) })
        ));
    }

    #[test]
    fn test_parse_with_config() {
        let cli = parse(&["vtelem", "-c", "/custom/config.toml", "report"]);
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = parse(&["vtelem", "generate", "-v", "--config", "c.toml"]);
        assert_eq!(cli.verbose, 1);
        assert_eq!(cli.config, Some(PathBuf::from("c.toml")));
    }
}
