use std::str::FromStr;

use chrono::{DateTime, Local, Utc};
use chrono_tz::Tz;
use tadhkir_models::recurrence::RecurrenceConfig;

use crate::next_notification::{NextNotification, NextNotificationCalculator};

/// Zone whose wall clock the reminder times are expressed in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScheduleTimezone {
    #[default]
    Local,
    Named(Tz),
}

impl ScheduleTimezone {
    pub fn from_setting(name: Option<&str>) -> anyhow::Result<Self> {
        match name {
            None => Ok(ScheduleTimezone::Local),
            Some(name) => Tz::from_str(name)
                .map(ScheduleTimezone::Named)
                .map_err(|e| anyhow::anyhow!("Invalid timezone {name:?}: {e}")),
        }
    }

    /// Runs the calculator on this zone's wall clock for a UTC instant.
    pub fn next_after(
        &self,
        calculator: &NextNotificationCalculator,
        config: &RecurrenceConfig,
        now: DateTime<Utc>,
    ) -> NextNotification<DateTime<Utc>> {
        match self {
            ScheduleTimezone::Local => calculator
                .next_after(config, &now.with_timezone(&Local))
                .map(|at| at.with_timezone(&Utc)),
            ScheduleTimezone::Named(tz) => calculator
                .next_after(config, &now.with_timezone(tz))
                .map(|at| at.with_timezone(&Utc)),
        }
    }
}
