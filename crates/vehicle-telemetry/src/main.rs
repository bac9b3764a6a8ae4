//! `vtelem` - CLI for vehicle-telemetry
//!
//! Generates synthetic telemetry datasets and prints the metrics derived from
//! them.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::{debug, info};

use vehicle_telemetry::cli::{
    Cli, Command, ConfigCommand, GenerateCommand, MetricsCommand, MetricsView, ReportCommand,
};
use vehicle_telemetry::metrics::views;
use vehicle_telemetry::{
    dataset, generator, init_logging, Config, Dataset, MetricsCalculator, MetricsReport, Summary,
};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let verbose = cli.verbose > 0 && !cli.quiet;
    let config_path = cli.config;
    match cli.command {
        Command::Generate(cmd) => handle_generate(load_config(config_path)?, cmd),
        Command::Report(cmd) => handle_report(&load_config(config_path)?, &cmd, verbose),
        Command::Metrics(cmd) => handle_metrics(&load_config(config_path)?, &cmd),
        Command::Config(cmd) => handle_config(config_path, cmd),
    }
}

fn load_config(config_path: Option<PathBuf>) -> anyhow::Result<Config> {
    Config::load_from(config_path).context("failed to load configuration")
}

fn handle_generate(mut config: Config, cmd: GenerateCommand) -> anyhow::Result<()> {
    if let Some(weeks) = cmd.weeks {
        config.generator.weeks = weeks;
    }
    if let Some(interval_secs) = cmd.interval_secs {
        config.generator.interval_secs = interval_secs;
    }
    if let Some(seed) = cmd.seed {
        config.generator.seed = Some(seed);
    }
    if let Some(scenario) = cmd.scenario {
        config.generator.scenario = Some(scenario.into());
    }
    let output = cmd.output.unwrap_or_else(|| config.dataset.path.clone());

    let params = config.generation_params();
    let mut rng = generator::rng_for(config.generator.seed);
    let data = generator::generate(&params, &config.vehicle, &mut rng)?;
    for (week, scenario) in (1..).zip(&data.week_scenarios) {
        debug!(week, %scenario, "Week scenario");
    }

    let summary = dataset::write(&output, &data.records)?;
    info!(path = %summary.path.display(), rows = summary.rows, "Dataset written");

    println!(
        "Wrote {} rows ({} weeks at {} s) to {}",
        summary.rows,
        params.weeks,
        params.interval_secs,
        summary.path.display()
    );
    println!("blake3: {}", summary.digest);
    Ok(())
}

/// Load a dataset and compute its metrics.
fn compute(config: &Config, input: Option<&PathBuf>) -> anyhow::Result<MetricsReport> {
    let path = input.unwrap_or(&config.dataset.path);
    let dataset = Dataset::load(path)?;

    let interval = match dataset.infer_interval() {
        Some(interval) => interval,
        None => {
            debug!(
                interval_secs = config.generator.interval_secs,
                "Could not infer sampling interval; using configured value"
            );
            config.interval()
        }
    };

    Ok(MetricsCalculator::new(&config.vehicle, interval).compute(dataset.rows()))
}

fn check_week(report: &MetricsReport, week: Option<u32>) -> anyhow::Result<()> {
    if let Some(week) = week {
        let weeks = report.weeks();
        if !weeks.contains(&week) {
            bail!(
                "week {week} is not in the dataset (weeks 1 to {})",
                weeks.last().copied().unwrap_or(0)
            );
        }
    }
    Ok(())
}

fn handle_report(config: &Config, cmd: &ReportCommand, verbose: bool) -> anyhow::Result<()> {
    let report = compute(config, cmd.input.as_ref())?;
    check_week(&report, cmd.week)?;
    let summary = report.summary(cmd.week);

    if cmd.json {
        let output = serde_json::json!({
            "week": cmd.week,
            "weeks": report.weeks().len(),
            "summary": summary,
            "skipped_records": report.skipped,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    print_summary(&summary, &report, cmd.week);
    if verbose {
        for skipped in &report.skipped {
            println!("  line {}: {}", skipped.line, skipped.reason);
        }
    }
    Ok(())
}

fn print_summary(summary: &Summary, report: &MetricsReport, week: Option<u32>) {
    match week {
        Some(week) => println!("Week {week} of {}", report.weeks().len()),
        None => println!("All {} weeks", report.weeks().len()),
    }
    println!("==================");
    println!("  Samples:            {}", summary.samples);
    println!("  Skipped (malformed): {}", summary.skipped);
    println!("  Engine on:          {}", summary.engine_on_samples);
    println!("  Idle:               {}", summary.idle_samples);
    println!("  Distance (km):      {:.1}", summary.total_distance_km);
    println!("  Fuel used (L):      {:.3}", summary.total_fuel_l);
    println!("  Max speed (km/h):   {}", or_na(summary.max_speed_kmh, 1));
    println!("  Mean RPM:           {}", or_na(summary.mean_rpm, 0));
    println!(
        "  Mean efficiency:    {} km/L over {} samples",
        or_na(summary.mean_efficiency_km_l, 2),
        summary.efficiency_samples
    );
    println!("  Overall efficiency: {} km/L", or_na(summary.overall_km_per_l, 2));
}

fn or_na(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.decimals$}"))
}

fn handle_metrics(config: &Config, cmd: &MetricsCommand) -> anyhow::Result<()> {
    let report = compute(config, cmd.input.as_ref())?;
    check_week(&report, cmd.week)?;
    let rows = report.rows_in(cmd.week);

    let series = match cmd.view {
        MetricsView::Rows => serde_json::to_value(rows.collect::<Vec<_>>())?,
        MetricsView::Gear => serde_json::to_value(views::gear_groups(&views::gear_view(rows)))?,
        MetricsView::Throttle => serde_json::to_value(views::throttle_view(rows))?,
        MetricsView::Load => serde_json::to_value(views::load_view(rows))?,
        MetricsView::Idle => serde_json::to_value(views::idle_rpm(rows))?,
        MetricsView::Efficiency => serde_json::to_value(views::efficiency_view(rows))?,
        MetricsView::WeeklySpeed => {
            let mut weekly = report.weekly_speeds();
            if let Some(week) = cmd.week {
                weekly.retain(|w| w.week == week);
            }
            serde_json::to_value(weekly)?
        }
    };
    println!("{}", serde_json::to_string_pretty(&series)?);
    Ok(())
}

fn handle_config(config_path: Option<PathBuf>, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = load_config(config_path)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                let scenario = config
                    .generator
                    .scenario
                    .map_or_else(|| "random per week".to_string(), |s| s.to_string());
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Generator]");
                println!("  Weeks:              {}", config.generator.weeks);
                println!("  Interval (s):       {}", config.generator.interval_secs);
                println!(
                    "  Seed:               {}",
                    config
                        .generator
                        .seed
                        .map_or_else(|| "none".to_string(), |s| s.to_string())
                );
                println!("  Start:              {}", config.generator.start.to_rfc3339());
                println!("  Scenario:           {scenario}");
                println!();
                println!("[Dataset]");
                println!("  Path:               {}", config.dataset.path.display());
                println!();
                println!("[Vehicle]");
                println!(
                    "  Idle/max RPM:       {}/{}",
                    config.vehicle.idle_rpm, config.vehicle.max_rpm
                );
                println!("  Max speed (km/h):   {}", config.vehicle.max_speed_kmh);
                println!("  Gears:              {}", config.vehicle.gear_count());
                println!("  Displacement (L):   {}", config.vehicle.displacement_l);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file
                .or(config_path)
                .unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => bail!("configuration error: {e}"),
            }
        }
    }
    Ok(())
}
