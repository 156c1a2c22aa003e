use chrono::{
    DateTime, Datelike, Local, LocalResult, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta,
    TimeZone,
};
use tadhkir_models::recurrence::{Frequency, HourTable, RecurrenceConfig};

/// Why the calculator had to fall back to a default instead of following
/// the configuration literally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// Frequency was not recognised, scheduled as if it were daily.
    UnrecognizedFrequency,
    /// Birthday frequency without a date of birth, scheduled for the next day.
    MissingDateOfBirth,
    /// Death anniversary frequency without a date of death, scheduled for the next day.
    MissingDateOfDeath,
    /// `specific_time` was requested but absent or not `HH:MM`, default hour used.
    InvalidSpecificTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextNotification<T> {
    pub at: T,
    /// First fallback taken while computing `at`, if any.
    pub fallback: Option<FallbackReason>,
}

impl<T> NextNotification<T> {
    pub fn used_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    pub(crate) fn map<U>(self, f: impl FnOnce(T) -> U) -> NextNotification<U> {
        NextNotification {
            at: f(self.at),
            fallback: self.fallback,
        }
    }
}

/// Computes when a subscription's next reminder is due.
///
/// The result is always strictly after the supplied `now`. The calculator
/// never fails: incomplete configurations degrade to a next-day schedule and
/// report the reason through [`NextNotification::fallback`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NextNotificationCalculator {
    hours: HourTable,
}

impl NextNotificationCalculator {
    pub fn new(hours: HourTable) -> Self {
        Self { hours }
    }

    /// Same as [`Self::next_naive`], evaluated on `now`'s wall-clock time in its own zone.
    pub fn next_after<Tz: TimeZone>(
        &self,
        config: &RecurrenceConfig,
        now: &DateTime<Tz>,
    ) -> NextNotification<DateTime<Tz>> {
        let timezone = now.timezone();
        let mut next = self.next_naive(config, now.naive_local());

        // A wall-clock result can still land on or before `now` once it is
        // mapped back into the zone around a DST change.
        loop {
            if let Some(at) = resolve_after(&timezone, next.at, now) {
                return next.map(|_| at);
            }
            match next.at.checked_add_signed(TimeDelta::days(1)) {
                Some(at) => next.at = at,
                // Out of calendar, saturate at the last representable instant.
                None => return next.map(|_| timezone.from_utc_datetime(&NaiveDateTime::MAX)),
            }
        }
    }

    pub fn next_naive(
        &self,
        config: &RecurrenceConfig,
        now: NaiveDateTime,
    ) -> NextNotification<NaiveDateTime> {
        let (time, time_fallback) = self.notification_time(config);
        let today = now.date();

        let (date, date_fallback) = match config.frequency {
            // The only frequency that may still fire later today.
            Frequency::Daily if today.and_time(time) > now => (today, None),
            Frequency::Daily => (next_day(today), None),
            Frequency::Weekly => (add_days(today, 7), None),
            Frequency::Monthly => (add_months(today, 1), None),
            Frequency::Quarterly => (add_months(today, 3), None),
            Frequency::Annually => (add_months(today, 12), None),
            Frequency::Birthday => match config.subject_date_of_birth {
                Some(birth) => (next_anniversary(birth, today), None),
                None => (next_day(today), Some(FallbackReason::MissingDateOfBirth)),
            },
            Frequency::DeathAnniversary => match config.subject_date_of_death {
                Some(death) => (next_anniversary(death, today), None),
                None => (next_day(today), Some(FallbackReason::MissingDateOfDeath)),
            },
            Frequency::Unrecognized => (next_day(today), Some(FallbackReason::UnrecognizedFrequency)),
        };

        NextNotification {
            at: date.and_time(time),
            fallback: date_fallback.or(time_fallback),
        }
    }

    fn notification_time(&self, config: &RecurrenceConfig) -> (NaiveTime, Option<FallbackReason>) {
        match config.requested_specific_time() {
            Some(Ok(specific_time)) => (specific_time.time(), None),
            Some(Err(_)) => (
                self.hours.time_for(None),
                Some(FallbackReason::InvalidSpecificTime),
            ),
            None => (self.hours.time_for(config.time_of_day), None),
        }
    }
}

/// Next notification for `config` using the default hour table.
pub fn compute_next<Tz: TimeZone>(config: &RecurrenceConfig, now: &DateTime<Tz>) -> DateTime<Tz> {
    NextNotificationCalculator::default().next_after(config, now).at
}

/// [`compute_next`] against the system clock, in process local time.
pub fn compute_next_from_system_clock(config: &RecurrenceConfig) -> DateTime<Local> {
    compute_next(config, &Local::now())
}

fn resolve_after<Tz: TimeZone>(
    timezone: &Tz,
    wall_clock: NaiveDateTime,
    now: &DateTime<Tz>,
) -> Option<DateTime<Tz>> {
    let mut candidate = wall_clock;

    // Skip forward through a DST gap, no gap is longer than a few hours.
    for _ in 0..4 {
        match timezone.from_local_datetime(&candidate) {
            LocalResult::Single(at) => return (at > *now).then_some(at),
            LocalResult::Ambiguous(earliest, latest) => {
                return [earliest, latest].into_iter().find(|at| at > now);
            }
            LocalResult::None => candidate = candidate.checked_add_signed(TimeDelta::hours(1))?,
        }
    }

    None
}

fn next_day(date: NaiveDate) -> NaiveDate {
    add_days(date, 1)
}

fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    date.checked_add_signed(TimeDelta::days(days))
        .unwrap_or(NaiveDate::MAX)
}

/// Calendar month arithmetic, clamped to the last day of the target month.
fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months))
        .unwrap_or(NaiveDate::MAX)
}

/// The first anniversary of `date` strictly after `today`.
fn next_anniversary(date: NaiveDate, today: NaiveDate) -> NaiveDate {
    let this_year = anniversary_in(date, today.year());
    if this_year > today {
        this_year
    } else {
        anniversary_in(date, today.year() + 1)
    }
}

/// `date`'s month and day in `year`. February 29 falls on the 28th in common years.
fn anniversary_in(date: NaiveDate, year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, date.month(), date.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, date.month(), date.day() - 1))
        .unwrap_or(NaiveDate::MAX)
}
