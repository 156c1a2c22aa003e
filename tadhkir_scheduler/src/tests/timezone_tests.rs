use chrono::{
    FixedOffset, Local, NaiveDate, NaiveDateTime, TimeDelta, TimeZone, Timelike, Utc,
};
use chrono_tz::{America::New_York, Australia::Lord_Howe, Europe::London, Tz};
use proptest::prelude::*;
use tadhkir_models::recurrence::{Frequency, RecurrenceConfig, TimeOfDay};
use test_strategy::proptest;

use super::next_notification_tests::{realistic_datetime, recurrence_config};
use crate::{NextNotificationCalculator, ScheduleTimezone, compute_next, compute_next_from_system_clock};

#[test]
fn compute_next_keeps_the_callers_offset() {
    let offset = FixedOffset::east_opt(3 * 3600).unwrap();
    let now = offset.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
    let config = RecurrenceConfig::new(Frequency::Weekly).with_time_of_day(TimeOfDay::Afternoon);

    let next = compute_next(&config, &now);

    assert_eq!(next, offset.with_ymd_and_hms(2024, 3, 8, 14, 0, 0).unwrap());
}

#[test]
fn specific_time_has_zero_seconds() {
    let now = Utc.with_ymd_and_hms(2024, 3, 1, 10, 17, 42).unwrap();
    let config = RecurrenceConfig::new(Frequency::Monthly).with_specific_time("14:30");

    let next = compute_next(&config, &now);

    assert_eq!((next.hour(), next.minute(), next.second()), (14, 30, 0));
    assert_eq!(next.date_naive(), NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
}

#[test]
fn time_in_a_dst_gap_shifts_forward() {
    let now = London.with_ymd_and_hms(2024, 3, 30, 12, 0, 0).unwrap();
    let config = RecurrenceConfig::new(Frequency::Daily).with_specific_time("01:30");

    let next = NextNotificationCalculator::default().next_after(&config, &now);

    assert_eq!(
        next.at.naive_local(),
        NaiveDate::from_ymd_opt(2024, 3, 31)
            .unwrap()
            .and_hms_opt(2, 30, 0)
            .unwrap()
    );
}

#[test]
fn ambiguous_time_prefers_earliest_instant_after_now() {
    let config = RecurrenceConfig::new(Frequency::Daily).with_specific_time("01:30");
    let calculator = NextNotificationCalculator::default();

    let first_pass = London.with_ymd_and_hms(2024, 10, 27, 1, 10, 0).earliest().unwrap();
    let next = calculator.next_after(&config, &first_pass);
    assert_eq!(
        next.at.with_timezone(&Utc),
        Utc.with_ymd_and_hms(2024, 10, 27, 0, 30, 0).unwrap()
    );

    let second_pass = London.with_ymd_and_hms(2024, 10, 27, 1, 10, 0).latest().unwrap();
    let next = calculator.next_after(&config, &second_pass);
    assert_eq!(
        next.at.with_timezone(&Utc),
        Utc.with_ymd_and_hms(2024, 10, 27, 1, 30, 0).unwrap()
    );
}

#[test]
fn named_timezone_resolves_against_utc() {
    let timezone = ScheduleTimezone::from_setting(Some("Asia/Karachi")).unwrap();
    let now = Utc.with_ymd_and_hms(2024, 3, 1, 2, 0, 0).unwrap();
    let config = RecurrenceConfig::new(Frequency::Daily).with_time_of_day(TimeOfDay::Morning);

    let next = timezone.next_after(&NextNotificationCalculator::default(), &config, now);

    // 07:00 in Karachi, so 09:00 local is still ahead today.
    assert_eq!(next.at, Utc.with_ymd_and_hms(2024, 3, 1, 4, 0, 0).unwrap());
}

#[test]
fn unknown_timezone_is_rejected() {
    assert!(ScheduleTimezone::from_setting(Some("Mars/Olympus_Mons")).is_err());
    assert_eq!(ScheduleTimezone::from_setting(None).unwrap(), ScheduleTimezone::Local);
}

#[test]
fn end_of_calendar_saturates_instead_of_overflowing() {
    let now = Utc.from_utc_datetime(&NaiveDate::MAX.and_hms_opt(10, 0, 0).unwrap());

    for frequency in [Frequency::Daily, Frequency::Weekly, Frequency::Annually] {
        let config = RecurrenceConfig::new(frequency).with_time_of_day(TimeOfDay::Morning);

        let next = NextNotificationCalculator::default().next_after(&config, &now);

        assert!(next.at > now, "{frequency} gave {:?}", next.at);
    }
}

#[test]
fn system_clock_result_is_within_a_day() {
    let config = RecurrenceConfig::new(Frequency::Daily).with_time_of_day(TimeOfDay::Evening);
    let before = Local::now();

    let next = compute_next_from_system_clock(&config);

    assert!(next > before);
    // One extra hour for a DST change in between.
    assert!(next - before <= TimeDelta::days(1) + TimeDelta::hours(1));
    assert_eq!((next.minute(), next.second()), (0, 0));
}

fn dst_zone() -> impl Strategy<Value = Tz> {
    prop_oneof![Just(London), Just(New_York), Just(Lord_Howe)]
}

#[proptest]
fn zoned_result_is_always_after_now(
    #[strategy(recurrence_config())] config: RecurrenceConfig,
    #[strategy(realistic_datetime())] now_utc: NaiveDateTime,
    #[strategy(dst_zone())] zone: Tz,
) {
    let now = zone.from_utc_datetime(&now_utc);

    let next = NextNotificationCalculator::default().next_after(&config, &now);

    prop_assert!(next.at > now, "{:?} is not after {:?}", next.at, now);
}
