#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Terminal helpers shared by the city monitor binaries.
//!
//! [`StepProgress`] renders dataset preparation behind the
//! [`ProgressCallback`] trait and logs how long each step took.
//! [`init_logger`] routes `log` output through `indicatif-log-bridge` so
//! log lines never tear the bar.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use city_monitor_source::progress::ProgressCallback;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

pub use indicatif::MultiProgress;

/// Step currently running and when it started.
struct Step {
    name: Option<String>,
    started: Instant,
}

/// A preparation progress bar: a spinner until the step count is known,
/// then a bar labelled with the running step.
pub struct StepProgress {
    bar: ProgressBar,
    /// Style to switch to once `set_total()` provides a known length.
    bar_style: ProgressStyle,
    step: Mutex<Step>,
}

impl StepProgress {
    /// Adds a preparation bar to `multi`. Drawing is suppressed when
    /// stderr is not a terminal, so piped JSON output stays clean.
    #[must_use]
    pub fn new(multi: &MultiProgress, message: &str) -> Arc<dyn ProgressCallback> {
        let bar = multi.add(ProgressBar::new_spinner());
        if ProgressDrawTarget::stderr().is_hidden() {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        } else {
            bar.enable_steady_tick(Duration::from_millis(100));
        }
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message.to_string());

        let bar_style = ProgressStyle::with_template(
            "{prefix:.bold} {wide_bar:.green/dim} {pos}/{len} {msg} [{elapsed}]",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
        bar.set_prefix(message.to_string());

        Arc::new(Self {
            bar,
            bar_style,
            step: Mutex::new(Step {
                name: None,
                started: Instant::now(),
            }),
        })
    }

    /// Logs the step that just ended and starts timing `next`.
    fn advance(&self, next: Option<String>) {
        let mut step = self.step.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(name) = step.name.take() {
            log::debug!(
                "Prepared {name} in {:.2}s",
                step.started.elapsed().as_secs_f64()
            );
        }
        step.name = next;
        step.started = Instant::now();
    }
}

impl ProgressCallback for StepProgress {
    fn set_total(&self, total: u64) {
        self.bar.set_length(total);
        self.bar.set_position(0);
        self.bar.set_style(self.bar_style.clone());
    }

    fn inc(&self, delta: u64) {
        self.bar.inc(delta);
    }

    fn set_message(&self, msg: String) {
        self.advance(Some(msg.clone()));
        self.bar.set_message(msg);
    }

    fn finish(&self, msg: String) {
        self.advance(None);
        self.bar.finish_and_clear();
        log::debug!("{msg}");
    }
}

/// Initializes the global logger wrapped in `indicatif-log-bridge`.
///
/// Logs at `info` unless `RUST_LOG` says otherwise. Returns the
/// [`MultiProgress`] that every progress bar must be added to.
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    let logger = pretty_env_logger::formatted_builder()
        .filter_level(log::LevelFilter::Info)
        .parse_env("RUST_LOG")
        .build();
    let level = logger.filter();

    // Already set in tests.
    indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .ok();

    log::set_max_level(level);

    multi
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_bar_tracks_steps() {
        let multi = MultiProgress::with_draw_target(ProgressDrawTarget::hidden());
        let progress = StepProgress::new(&multi, "Preparing");
        progress.set_total(2);
        progress.set_message("neighborhoods".to_string());
        progress.inc(1);
        progress.set_message("readings".to_string());
        progress.inc(1);
        progress.finish("done".to_string());
    }
}
