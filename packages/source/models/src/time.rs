//! Calendar fields derived from a record timestamp.

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Period of the day a record falls in.
///
/// A fixed partition of the 24 hours: `[5, 12)` is morning, `[12, 18)` is
/// afternoon, everything else is night.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum DayPeriod {
    /// 05:00 to 11:59
    #[strum(to_string = "Morning", serialize = "Manha", serialize = "Manhã")]
    Morning,
    /// 12:00 to 17:59
    #[strum(to_string = "Afternoon", serialize = "Tarde")]
    Afternoon,
    /// 18:00 to 04:59
    #[strum(to_string = "Night", serialize = "Noite")]
    Night,
}

impl DayPeriod {
    /// All periods in day order.
    pub const ALL: [Self; 3] = [Self::Morning, Self::Afternoon, Self::Night];

    /// Buckets an hour of the day (`0..24`).
    #[must_use]
    pub const fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => Self::Morning,
            12..=17 => Self::Afternoon,
            _ => Self::Night,
        }
    }
}

/// Three-letter weekday code, Monday first.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum WeekdayCode {
    /// Segunda-feira (Monday)
    Seg,
    /// Terça-feira (Tuesday)
    Ter,
    /// Quarta-feira (Wednesday)
    Qua,
    /// Quinta-feira (Thursday)
    Qui,
    /// Sexta-feira (Friday)
    Sex,
    /// Sábado (Saturday)
    Sab,
    /// Domingo (Sunday)
    Dom,
}

impl WeekdayCode {
    /// All codes, indexed by day number (0 = Monday).
    pub const ALL: [Self; 7] = [
        Self::Seg,
        Self::Ter,
        Self::Qua,
        Self::Qui,
        Self::Sex,
        Self::Sab,
        Self::Dom,
    ];

    /// Code for a day number where 0 is Monday. Wraps modulo 7.
    #[must_use]
    pub const fn from_day_number(day: u32) -> Self {
        Self::ALL[(day % 7) as usize]
    }
}

impl From<Weekday> for WeekdayCode {
    fn from(weekday: Weekday) -> Self {
        Self::from_day_number(weekday.num_days_from_monday())
    }
}

/// Calendar fields of one timestamp, derived once at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeFields {
    /// Period of the day.
    pub period: DayPeriod,
    /// Hour, `0..24`.
    pub hour: u32,
    /// Minute, `0..60`.
    pub minute: u32,
    /// Day of month, `1..=31`.
    pub day: u32,
    /// Month, `1..=12`.
    pub month: u32,
    /// Calendar year.
    pub year: i32,
    /// Weekday code.
    pub weekday: WeekdayCode,
}

impl TimeFields {
    /// `(year, month, day, hour, minute)`, ordered chronologically.
    #[must_use]
    pub const fn chronological_key(&self) -> (i32, u32, u32, u32, u32) {
        (self.year, self.month, self.day, self.hour, self.minute)
    }
}
