//! Terminal and file output.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use city_monitor_analytics_models::{DashboardSnapshot, IndicatorDescriptor};
use serde::Serialize;

/// Writes `value` as pretty JSON to `path`, or to stdout without one.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn write_json<T: Serialize>(
    value: &T,
    path: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(&mut writer, value)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
            log::info!("Wrote {}", path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            serde_json::to_writer_pretty(&mut writer, value)?;
            writer.write_all(b"\n")?;
        }
    }
    Ok(())
}

pub fn print_catalogue(descriptors: &[IndicatorDescriptor]) {
    println!("{:<14} {:<10} LABEL", "CODE", "RAMP");
    println!("{}", "-".repeat(60));
    for descriptor in descriptors {
        println!(
            "{:<14} {:<10} {}",
            descriptor.code,
            descriptor.ramp.as_ref(),
            descriptor.label
        );
    }
}

fn cell(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

/// Gauges and raw radar means as plain text.
pub fn print_snapshot(snapshot: &DashboardSnapshot) {
    println!();
    println!("{} rows selected", snapshot.table.len());
    println!();
    println!(
        "{:<26} {:>9} {:>9} {:>9}  STATUS",
        "CHANNEL", "MIN", "MEAN", "MAX"
    );
    for gauge in &snapshot.gauges {
        println!(
            "{:<26} {:>9.2} {:>9.2} {:>9.2}  {}",
            gauge.label, gauge.stats.min, gauge.stats.mean, gauge.stats.max, gauge.status
        );
    }

    let Some(radar) = &snapshot.radar else {
        return;
    };
    println!();
    print!("{:<24}", radar.group_key.as_ref().to_uppercase());
    for column in &radar.columns {
        print!(" {:>14}", column.code());
    }
    println!();
    for profile in &radar.raw {
        print!("{:<24}", profile.group);
        for column in &radar.columns {
            print!(" {:>14}", cell(profile.value(*column)));
        }
        println!();
    }
}
