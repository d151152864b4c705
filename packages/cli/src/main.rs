#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line dashboard for neighborhood indicators.
//!
//! Prepares the datasets named in the configuration once, then answers
//! one query per invocation: filter options, a dashboard snapshot, or
//! choropleth `GeoJSON`. Without a subcommand it falls back to an
//! interactive menu.
//!
//! Uses `indicatif-log-bridge` (via [`city_monitor_cli_utils::init_logger`])
//! so log lines and the preparation progress bar share the terminal.

mod args;
mod interactive;
mod output;

use std::path::{Path, PathBuf};

use city_monitor_analytics::{DEFAULT_BINS, DatasetView, choropleth_layers, filter_options};
use city_monitor_analytics_models::{DashboardSnapshot, catalogue};
use city_monitor_cli_utils::{MultiProgress, StepProgress};
use city_monitor_ingest::{PreparedDatasets, neighborhood_list, prepare_from_path};
use city_monitor_source::cache::SourceCache;
use clap::{Parser, Subcommand};

use crate::args::{ColumnArgs, FilterArgs};

#[derive(Parser)]
#[command(name = "city_monitor", about = "Neighborhood environment and safety indicators")]
struct Cli {
    /// Dataset configuration file
    #[arg(
        long,
        global = true,
        env = "CITY_MONITOR_CONFIG",
        default_value = "city_monitor.toml"
    )]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the neighborhoods, periods, weekdays, and range found in the readings
    Options,
    /// Print load and join counters for every source
    Report,
    /// List indicator codes, labels, and colour ramps
    Catalogue,
    /// Compute gauges, the indicator table, and the radar for one selection
    Snapshot {
        #[command(flatten)]
        filter: FilterArgs,
        #[command(flatten)]
        columns: ColumnArgs,
        /// Write JSON here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Export choropleth layers of the selected indicators as GeoJSON
    Map {
        #[command(flatten)]
        filter: FilterArgs,
        #[command(flatten)]
        columns: ColumnArgs,
        /// Number of linear colour bins
        #[arg(long, default_value_t = DEFAULT_BINS)]
        bins: usize,
        /// Write JSON here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

/// Loads and joins every configured source behind a progress bar.
fn load(config: &Path, multi: &MultiProgress) -> Result<PreparedDatasets, Box<dyn std::error::Error>> {
    log::info!("Preparing datasets from {}", config.display());
    let progress = StepProgress::new(multi, "Preparing datasets");
    let mut cache = SourceCache::new();
    Ok(prepare_from_path(config, &mut cache, &progress)?)
}

/// Borrows the prepared rows for the analytics functions.
fn view(prepared: &PreparedDatasets) -> DatasetView<'_> {
    DatasetView {
        readings: &prepared.readings,
        incidents: &prepared.incidents,
        survey: &prepared.survey,
        census: &prepared.census,
        rates: prepared.rates,
    }
}

fn snapshot(
    prepared: &PreparedDatasets,
    filter: &FilterArgs,
    columns: &ColumnArgs,
) -> DashboardSnapshot {
    let options = filter_options(&prepared.readings);
    let filter = filter.to_filter(&options);
    city_monitor_analytics::snapshot(&view(prepared), &filter, &columns.columns, columns.group)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = city_monitor_cli_utils::init_logger();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        return interactive::run(&cli.config, &multi);
    };

    match command {
        Commands::Catalogue => output::print_catalogue(&catalogue()),
        Commands::Options => {
            let prepared = load(&cli.config, &multi)?;
            output::write_json(&filter_options(&prepared.readings), None)?;
        }
        Commands::Report => {
            let prepared = load(&cli.config, &multi)?;
            output::write_json(&prepared.report, None)?;
        }
        Commands::Snapshot {
            filter,
            columns,
            output: path,
        } => {
            let prepared = load(&cli.config, &multi)?;
            let snapshot = snapshot(&prepared, &filter, &columns);
            output::write_json(&snapshot, path.as_deref())?;
        }
        Commands::Map {
            filter,
            columns,
            bins,
            output: path,
        } => {
            let prepared = load(&cli.config, &multi)?;
            let snapshot = snapshot(&prepared, &filter, &columns);
            let radar = snapshot.radar.ok_or(
                "A map needs at least one matching neighborhood in --neighborhoods and one --columns code",
            )?;
            let map = choropleth_layers(&neighborhood_list(&prepared), &radar, bins)?;
            output::write_json(&map, path.as_deref())?;
        }
    }

    Ok(())
}
