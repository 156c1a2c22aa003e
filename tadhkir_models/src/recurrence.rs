use std::{fmt, str::FromStr};

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecurrenceError {
    #[error("Unknown frequency {0:?}")]
    UnknownFrequency(String),

    #[error("Unknown time of day {0:?}")]
    UnknownTimeOfDay(String),

    #[error("Specific time {0:?} is not a valid HH:MM time")]
    InvalidSpecificTime(String),

    #[error("Time of day is specific_time but no specific time was given")]
    MissingSpecificTime,

    #[error("Birthday reminders require the subject's date of birth")]
    MissingDateOfBirth,

    #[error("Death anniversary reminders require the subject's date of death")]
    MissingDateOfDeath,

    #[error("Hour {0} is outside of 0..=23")]
    InvalidHour(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Annually,
    Birthday,
    DeathAnniversary,
    #[serde(other)]
    Unrecognized,
}

impl Frequency {
    /// Like [`FromStr`], but maps anything unknown to [`Frequency::Unrecognized`].
    pub fn parse_lenient(value: &str) -> Self {
        value.parse().unwrap_or(Frequency::Unrecognized)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Quarterly => "quarterly",
            Frequency::Annually => "annually",
            Frequency::Birthday => "birthday",
            Frequency::DeathAnniversary => "death_anniversary",
            Frequency::Unrecognized => "unrecognized",
        }
    }
}

impl FromStr for Frequency {
    type Err = RecurrenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            "quarterly" => Ok(Frequency::Quarterly),
            "annually" => Ok(Frequency::Annually),
            "birthday" => Ok(Frequency::Birthday),
            "death_anniversary" => Ok(Frequency::DeathAnniversary),
            _ => Err(RecurrenceError::UnknownFrequency(s.to_string())),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    SpecificTime,
}

impl TimeOfDay {
    pub fn parse_lenient(value: &str) -> Option<Self> {
        value.parse().ok()
    }
}

impl FromStr for TimeOfDay {
    type Err = RecurrenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "morning" => Ok(TimeOfDay::Morning),
            "afternoon" => Ok(TimeOfDay::Afternoon),
            "evening" => Ok(TimeOfDay::Evening),
            "specific_time" => Ok(TimeOfDay::SpecificTime),
            _ => Err(RecurrenceError::UnknownTimeOfDay(s.to_string())),
        }
    }
}

/// Wall-clock `HH:MM` time. Seconds are always zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecificTime(NaiveTime);

impl SpecificTime {
    pub fn time(&self) -> NaiveTime {
        self.0
    }
}

impl FromStr for SpecificTime {
    type Err = RecurrenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || RecurrenceError::InvalidSpecificTime(s.to_string());

        let (hours, minutes) = s.split_once(':').ok_or_else(invalid)?;
        let is_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());

        if !(1..=2).contains(&hours.len()) || minutes.len() != 2 {
            return Err(invalid());
        }
        if !is_digits(hours) || !is_digits(minutes) {
            return Err(invalid());
        }

        let hours: u32 = hours.parse().map_err(|_| invalid())?;
        let minutes: u32 = minutes.parse().map_err(|_| invalid())?;

        NaiveTime::from_hms_opt(hours, minutes, 0)
            .map(SpecificTime)
            .ok_or_else(invalid)
    }
}

impl fmt::Display for SpecificTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

/// Recurrence settings of a single subscription.
///
/// `specific_time` is kept as the raw string the subscriber supplied, so a
/// malformed value degrades to the default hour instead of being rejected
/// when the config is built. Use [`RecurrenceConfig::validate`] for the
/// strict check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceConfig {
    pub frequency: Frequency,
    #[serde(default)]
    pub time_of_day: Option<TimeOfDay>,
    #[serde(default)]
    pub specific_time: Option<String>,
    #[serde(default)]
    pub subject_date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub subject_date_of_death: Option<NaiveDate>,
}

impl RecurrenceConfig {
    pub fn new(frequency: Frequency) -> Self {
        Self {
            frequency,
            time_of_day: None,
            specific_time: None,
            subject_date_of_birth: None,
            subject_date_of_death: None,
        }
    }

    pub fn with_time_of_day(mut self, time_of_day: TimeOfDay) -> Self {
        self.time_of_day = Some(time_of_day);
        self
    }

    pub fn with_specific_time(mut self, specific_time: impl Into<String>) -> Self {
        self.time_of_day = Some(TimeOfDay::SpecificTime);
        self.specific_time = Some(specific_time.into());
        self
    }

    pub fn with_date_of_birth(mut self, date: NaiveDate) -> Self {
        self.subject_date_of_birth = Some(date);
        self
    }

    pub fn with_date_of_death(mut self, date: NaiveDate) -> Self {
        self.subject_date_of_death = Some(date);
        self
    }

    /// The parsed specific time, if the subscriber asked for one.
    ///
    /// Returns `None` when `time_of_day` is anything other than
    /// `specific_time`, whatever `specific_time` holds.
    pub fn requested_specific_time(&self) -> Option<Result<SpecificTime, RecurrenceError>> {
        if self.time_of_day != Some(TimeOfDay::SpecificTime) {
            return None;
        }

        Some(match &self.specific_time {
            Some(raw) => raw.parse(),
            None => Err(RecurrenceError::MissingSpecificTime),
        })
    }

    pub fn validate(&self) -> Result<(), RecurrenceError> {
        match self.frequency {
            Frequency::Unrecognized => {
                return Err(RecurrenceError::UnknownFrequency(
                    self.frequency.to_string(),
                ));
            }
            Frequency::Birthday if self.subject_date_of_birth.is_none() => {
                return Err(RecurrenceError::MissingDateOfBirth);
            }
            Frequency::DeathAnniversary if self.subject_date_of_death.is_none() => {
                return Err(RecurrenceError::MissingDateOfDeath);
            }
            _ => {}
        }

        if let Some(specific_time) = self.requested_specific_time() {
            specific_time?;
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "HourTableSettings")]
pub struct HourTable {
    morning: NaiveTime,
    afternoon: NaiveTime,
    evening: NaiveTime,
    default: NaiveTime,
}

impl HourTable {
    pub fn new(morning: u32, afternoon: u32, evening: u32, default: u32) -> Result<Self, RecurrenceError> {
        let hour = |h: u32| NaiveTime::from_hms_opt(h, 0, 0).ok_or(RecurrenceError::InvalidHour(h));

        Ok(Self {
            morning: hour(morning)?,
            afternoon: hour(afternoon)?,
            evening: hour(evening)?,
            default: hour(default)?,
        })
    }

    /// Wall-clock time for a coarse time-of-day preference.
    ///
    /// `SpecificTime` and an unset preference both map to the default hour;
    /// resolving the actual specific time is up to the caller.
    pub fn time_for(&self, time_of_day: Option<TimeOfDay>) -> NaiveTime {
        match time_of_day {
            Some(TimeOfDay::Morning) => self.morning,
            Some(TimeOfDay::Afternoon) => self.afternoon,
            Some(TimeOfDay::Evening) => self.evening,
            Some(TimeOfDay::SpecificTime) | None => self.default,
        }
    }
}

impl Default for HourTable {
    fn default() -> Self {
        let hour = |h| NaiveTime::from_hms_opt(h, 0, 0).expect("Constant hours are in range.");

        Self {
            morning: hour(9),
            afternoon: hour(14),
            evening: hour(19),
            default: hour(9),
        }
    }
}

#[derive(Debug, Deserialize)]
struct HourTableSettings {
    morning: u32,
    afternoon: u32,
    evening: u32,
    default: u32,
}

impl TryFrom<HourTableSettings> for HourTable {
    type Error = RecurrenceError;

    fn try_from(value: HourTableSettings) -> Result<Self, Self::Error> {
        HourTable::new(value.morning, value.afternoon, value.evening, value.default)
    }
}
