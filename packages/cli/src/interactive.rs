#![allow(clippy::module_name_repetitions)]

//! Interactive dashboard driven by `dialoguer` prompts.
//!
//! Datasets are prepared once; each menu pass builds a new selection and
//! recomputes everything from the prepared rows.

use std::path::{Path, PathBuf};

use city_monitor_analytics::{DEFAULT_BINS, choropleth_layers, filter_options};
use city_monitor_analytics_models::{
    FilterOptions, FilterSpec, GroupKey, IndicatorColumn, RangeSemantics, TimeBounds, TimeRange,
    catalogue,
};
use city_monitor_cli_utils::MultiProgress;
use city_monitor_ingest::{PreparedDatasets, neighborhood_list};
use dialoguer::{Confirm, Input, MultiSelect, Select};

use crate::args::{format_bounds, parse_bounds};
use crate::output;

/// Top-level actions of the interactive menu.
enum Action {
    Snapshot,
    Map,
    Options,
    Report,
    Quit,
}

impl Action {
    const ALL: &[Self] = &[
        Self::Snapshot,
        Self::Map,
        Self::Options,
        Self::Report,
        Self::Quit,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Snapshot => "Show dashboard for a selection",
            Self::Map => "Export choropleth map",
            Self::Options => "List filter options",
            Self::Report => "Show load report",
            Self::Quit => "Quit",
        }
    }
}

/// Prepares the datasets and runs the menu loop until the user quits.
///
/// # Errors
///
/// Returns an error if preparation, a prompt, or writing output fails.
pub fn run(config: &Path, multi: &MultiProgress) -> Result<(), Box<dyn std::error::Error>> {
    println!("City Monitor");
    println!();

    let prepared = crate::load(config, multi)?;
    let options = filter_options(&prepared.readings);
    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();

    loop {
        let idx = Select::new()
            .with_prompt("What would you like to do?")
            .items(&labels)
            .default(0)
            .interact()?;

        match Action::ALL[idx] {
            Action::Snapshot => {
                let (filter, columns, group) = prompt_selection(&options, true)?;
                let snapshot = snapshot(&prepared, &filter, &columns, group);
                output::print_snapshot(&snapshot);
                if Confirm::new()
                    .with_prompt("Save the snapshot as JSON?")
                    .default(false)
                    .interact()?
                {
                    let path = prompt_path("Output file", "snapshot.json")?;
                    output::write_json(&snapshot, Some(&path))?;
                }
            }
            Action::Map => export_map(&prepared, &options)?,
            Action::Options => output::write_json(&options, None)?,
            Action::Report => output::write_json(&prepared.report, None)?,
            Action::Quit => break,
        }
        println!();
    }

    Ok(())
}

fn snapshot(
    prepared: &PreparedDatasets,
    filter: &FilterSpec,
    columns: &[IndicatorColumn],
    group: GroupKey,
) -> city_monitor_analytics_models::DashboardSnapshot {
    city_monitor_analytics::snapshot(&crate::view(prepared), filter, columns, group)
}

fn export_map(
    prepared: &PreparedDatasets,
    options: &FilterOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let (filter, columns, _) = prompt_selection(options, false)?;
    let snapshot = snapshot(prepared, &filter, &columns, GroupKey::Neighborhood);
    let Some(radar) = snapshot.radar else {
        println!("Select at least one neighborhood with readings and one indicator.");
        return Ok(());
    };

    let bins: usize = Input::new()
        .with_prompt("Colour bins")
        .default(DEFAULT_BINS)
        .interact_text()?;
    let map = choropleth_layers(&neighborhood_list(prepared), &radar, bins)?;
    let path = prompt_path("Output file", "choropleth.geojson.json")?;
    output::write_json(&map, Some(&path))?;
    Ok(())
}

/// Prompts for neighborhoods, periods, weekdays, the optional range, and
/// the indicator columns. The radar grouping is only asked for when
/// `ask_group` is set.
fn prompt_selection(
    options: &FilterOptions,
    ask_group: bool,
) -> Result<(FilterSpec, Vec<IndicatorColumn>, GroupKey), Box<dyn std::error::Error>> {
    let neighborhoods = MultiSelect::new()
        .with_prompt("Neighborhoods (space=toggle, enter=confirm, none=all)")
        .items(&options.neighborhoods)
        .max_length(20)
        .interact()?;
    let periods = MultiSelect::new()
        .with_prompt("Periods (none=all)")
        .items(&options.periods)
        .interact()?;
    let weekdays = MultiSelect::new()
        .with_prompt("Weekdays (none=all)")
        .items(&options.weekdays)
        .interact()?;

    let (range, semantics) = match options.range {
        Some(default)
            if Confirm::new()
                .with_prompt("Restrict the reading range?")
                .default(false)
                .interact()? =>
        {
            let from = prompt_bounds("From", default.from)?;
            let to = prompt_bounds("To", default.to)?;
            let semantics = if Confirm::new()
                .with_prompt("Compare the range as one instant instead of field by field?")
                .default(false)
                .interact()?
            {
                RangeSemantics::Chronological
            } else {
                RangeSemantics::PerField
            };
            (Some(TimeRange { from, to }), semantics)
        }
        _ => (None, RangeSemantics::PerField),
    };

    let descriptors = catalogue();
    let column_labels: Vec<String> = descriptors
        .iter()
        .map(|d| format!("{:<14} {}", d.code, d.label))
        .collect();
    let columns = MultiSelect::new()
        .with_prompt("Indicators for the radar and map")
        .items(&column_labels)
        .max_length(20)
        .interact()?;

    let group = if ask_group {
        let keys = [GroupKey::Neighborhood, GroupKey::Period, GroupKey::Weekday];
        let idx = Select::new()
            .with_prompt("Group the radar by")
            .items(&keys)
            .default(0)
            .interact()?;
        keys[idx]
    } else {
        GroupKey::Neighborhood
    };

    let filter = FilterSpec {
        neighborhoods: neighborhoods
            .into_iter()
            .map(|i| options.neighborhoods[i].clone())
            .collect(),
        periods: periods.into_iter().map(|i| options.periods[i]).collect(),
        weekdays: weekdays.into_iter().map(|i| options.weekdays[i]).collect(),
        range,
        semantics,
    };
    let columns = columns.into_iter().map(|i| descriptors[i].column).collect();

    Ok((filter, columns, group))
}

fn prompt_bounds(
    prompt: &str,
    default: TimeBounds,
) -> Result<TimeBounds, Box<dyn std::error::Error>> {
    let text: String = Input::new()
        .with_prompt(format!("{prompt} (YYYY-MM-DD HH:MM)"))
        .default(format_bounds(&default))
        .validate_with(|input: &String| parse_bounds(input).map(|_| ()))
        .interact_text()?;
    Ok(parse_bounds(&text)?)
}

fn prompt_path(prompt: &str, default: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let text: String = Input::new()
        .with_prompt(prompt)
        .default(default.to_string())
        .interact_text()?;
    Ok(PathBuf::from(text))
}
