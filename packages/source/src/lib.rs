#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Dataset loading and record normalization.
//!
//! Reads the configured CSV and GeoJSON inputs into typed records:
//! sensor readings, incidents, survey rows, and census sectors. Each
//! loader drops rows it cannot interpret and counts them in a
//! [`city_monitor_source_models::LoadReport`]. Parsed files are memoized
//! in a [`cache::SourceCache`].

pub mod cache;
pub mod census;
pub mod config;
pub mod incidents;
pub mod normalize;
pub mod parsing;
pub mod progress;
pub mod readings;
pub mod survey;
pub mod tabular;
pub mod type_mapping;

use city_monitor_spatial::SpatialError;

/// Errors that can occur while reading dataset inputs.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// I/O error (file read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed delimited text.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Malformed dataset configuration.
    #[error("Config parse error: {0}")]
    Config(#[from] toml::de::Error),

    /// Geometry layer could not be read.
    #[error(transparent)]
    Spatial(#[from] SpatialError),

    /// A required column is absent from a file header.
    #[error("{file}: missing required column '{column}'")]
    MissingColumn {
        /// File label.
        file: String,
        /// Configured column name.
        column: String,
    },

    /// The configured delimiter is not a single ASCII character.
    #[error("Invalid delimiter '{delimiter}': expected a single ASCII character")]
    InvalidDelimiter {
        /// Configured delimiter.
        delimiter: String,
    },
}
