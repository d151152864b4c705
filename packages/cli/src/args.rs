//! Command-line filter arguments.

use city_monitor_analytics_models::{
    FilterOptions, FilterSpec, GroupKey, IndicatorColumn, RangeSemantics, TimeBounds, TimeRange,
};
use city_monitor_neighborhood::names::normalize_name;
use city_monitor_source_models::{DayPeriod, WeekdayCode};
use clap::Args;

/// Row selection shared by every reporting subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Comma-separated neighborhood names (accents and case are ignored)
    #[arg(long, value_delimiter = ',')]
    pub neighborhoods: Vec<String>,
    /// Comma-separated periods of the day (Morning, Afternoon, Night)
    #[arg(long, value_delimiter = ',')]
    pub periods: Vec<DayPeriod>,
    /// Comma-separated weekday codes (SEG, TER, QUA, QUI, SEX, SAB, DOM)
    #[arg(long, value_delimiter = ',')]
    pub weekdays: Vec<WeekdayCode>,
    /// Start of the reading range, `YYYY-MM-DD HH:MM`
    #[arg(long, value_parser = parse_bounds)]
    pub from: Option<TimeBounds>,
    /// End of the reading range, `YYYY-MM-DD HH:MM`
    #[arg(long, value_parser = parse_bounds)]
    pub to: Option<TimeBounds>,
    /// How the range is compared: `per_field` or `chronological`
    #[arg(long, default_value_t = RangeSemantics::PerField)]
    pub semantics: RangeSemantics,
}

/// Indicator selection for the radar and the map.
#[derive(Args, Debug, Clone, Default)]
pub struct ColumnArgs {
    /// Comma-separated indicator codes (see `catalogue`)
    #[arg(long, value_delimiter = ',')]
    pub columns: Vec<IndicatorColumn>,
    /// Radar grouping: `neighborhood`, `period`, or `weekday`
    #[arg(long, default_value_t = GroupKey::Neighborhood)]
    pub group: GroupKey,
}

/// Parses `YYYY-MM-DD HH:MM` into range fields.
///
/// Fields are range-checked one by one but not as a calendar date, so a
/// per-field bound such as `2024-02-31 23:59` is accepted.
///
/// # Errors
///
/// Returns a message naming the expected format or the field out of range.
pub fn parse_bounds(value: &str) -> Result<TimeBounds, String> {
    let parts: Vec<&str> = value
        .trim()
        .split(['-', ' ', ':'])
        .filter(|p| !p.is_empty())
        .collect();
    let [year, month, day, hour, minute] = parts.as_slice() else {
        return Err(format!("expected `YYYY-MM-DD HH:MM`, got `{value}`"));
    };

    let field = |text: &str, name: &str, range: std::ops::RangeInclusive<u32>| {
        text.parse::<u32>()
            .ok()
            .filter(|v| range.contains(v))
            .ok_or_else(|| format!("{name} `{text}` must be in {}..={}", range.start(), range.end()))
    };

    Ok(TimeBounds {
        year: year
            .parse()
            .map_err(|_| format!("year `{year}` is not a number"))?,
        month: field(month, "month", 1..=12)?,
        day: field(day, "day", 1..=31)?,
        hour: field(hour, "hour", 0..=23)?,
        minute: field(minute, "minute", 0..=59)?,
    })
}

/// Formats range fields the way [`parse_bounds`] reads them.
#[must_use]
pub fn format_bounds(bounds: &TimeBounds) -> String {
    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}",
        bounds.year, bounds.month, bounds.day, bounds.hour, bounds.minute
    )
}

impl FilterArgs {
    /// Builds the filter. A range with one open end takes the other from
    /// the data's default range.
    #[must_use]
    pub fn to_filter(&self, options: &FilterOptions) -> FilterSpec {
        let range = match (self.from, self.to, options.range) {
            (None, None, _) => None,
            (Some(from), Some(to), _) => Some(TimeRange { from, to }),
            (Some(from), None, Some(default)) => Some(TimeRange {
                from,
                to: default.to,
            }),
            (None, Some(to), Some(default)) => Some(TimeRange {
                from: default.from,
                to,
            }),
            (Some(_), None, None) | (None, Some(_), None) => None,
        };

        FilterSpec {
            neighborhoods: self.neighborhoods.iter().map(|n| normalize_name(n)).collect(),
            periods: self.periods.iter().copied().collect(),
            weekdays: self.weekdays.iter().copied().collect(),
            range,
            semantics: self.semantics,
        }
    }
}
