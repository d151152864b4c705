//! Channel summary statistics and gauge status.

use city_monitor_source_models::Channel;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Summary of one channel over the filtered table.
///
/// The cutoffs are linear interpolation points of `[min, max]`, not
/// quantiles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub cutoff25: f64,
    pub cutoff75: f64,
}

impl ChannelStats {
    /// Reported when no neighborhood is selected or no value is present.
    pub const PLACEHOLDER: Self = Self {
        min: 0.0,
        max: 1.0,
        mean: 0.0,
        cutoff25: 0.25,
        cutoff75: 0.75,
    };

    /// Builds the statistics from known bounds and mean.
    #[must_use]
    pub fn from_bounds(min: f64, max: f64, mean: f64) -> Self {
        let range = max - min;
        Self {
            min,
            max,
            mean,
            cutoff25: 0.25f64.mul_add(range, min),
            cutoff75: 0.75f64.mul_add(range, min),
        }
    }

    /// Gauge status of the mean.
    #[must_use]
    pub fn status(&self) -> GaugeStatus {
        GaugeStatus::classify(self.mean, self.cutoff25, self.cutoff75)
    }
}

/// Gauge colouring from a value and its cutoffs.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum GaugeStatus {
    /// Below the lower cutoff.
    #[strum(to_string = "Normal")]
    Normal,
    /// Between the cutoffs, inclusive.
    #[strum(to_string = "Atenção", serialize = "Atencao", serialize = "Attention")]
    Attention,
    /// Above the upper cutoff.
    #[strum(to_string = "Alerta", serialize = "Alert")]
    Alert,
}

impl GaugeStatus {
    #[must_use]
    pub fn classify(value: f64, cutoff25: f64, cutoff75: f64) -> Self {
        if value < cutoff25 {
            Self::Normal
        } else if value > cutoff75 {
            Self::Alert
        } else {
            Self::Attention
        }
    }

    /// Fill colour.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Normal => "#4FBA74",
            Self::Attention => "#FCAB10",
            Self::Alert => "#F6131E",
        }
    }

    /// Shadow colour.
    #[must_use]
    pub const fn shadow(self) -> &'static str {
        match self {
            Self::Normal => "#3FA261",
            Self::Attention => "#F29E02",
            Self::Alert => "#D90812",
        }
    }
}

/// Gauge data for one channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Gauge {
    pub channel: Channel,
    pub label: &'static str,
    pub stats: ChannelStats,
    pub status: GaugeStatus,
    pub color: &'static str,
    pub shadow: &'static str,
}

impl Gauge {
    #[must_use]
    pub fn new(channel: Channel, label: &'static str, stats: ChannelStats) -> Self {
        let status = stats.status();
        Self {
            channel,
            label,
            stats,
            status,
            color: status.color(),
            shadow: status.shadow(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cutoffs_interpolate_range() {
        let stats = ChannelStats::from_bounds(10.0, 30.0, 18.75);
        assert!((stats.cutoff25 - 15.0).abs() < 1e-12);
        assert!((stats.cutoff75 - 25.0).abs() < 1e-12);
        assert_eq!(stats.status(), GaugeStatus::Attention);
    }

    #[test]
    fn placeholder_reads_normal() {
        assert_eq!(ChannelStats::PLACEHOLDER.status(), GaugeStatus::Normal);
    }

    #[test]
    fn status_thresholds_are_strict() {
        assert_eq!(GaugeStatus::classify(15.0, 15.0, 25.0), GaugeStatus::Attention);
        assert_eq!(GaugeStatus::classify(25.0, 15.0, 25.0), GaugeStatus::Attention);
        assert_eq!(GaugeStatus::classify(14.9, 15.0, 25.0), GaugeStatus::Normal);
        assert_eq!(GaugeStatus::classify(25.1, 15.0, 25.0), GaugeStatus::Alert);
    }

    #[test]
    fn status_labels_and_colors() {
        assert_eq!(GaugeStatus::Attention.to_string(), "Atenção");
        assert_eq!(GaugeStatus::Alert.color(), "#F6131E");
        assert_eq!(GaugeStatus::Normal.shadow(), "#3FA261");
    }
}
