use std::sync::Arc;

use chrono::{DateTime, Utc};
use tadhkir_models::{
    notification::{NotificationHistory, NotificationStatus},
    prayer::title_case_name,
    recurrence::{Frequency, RecurrenceConfig, TimeOfDay},
    subscription::{ANONYMOUS_USER, Channel, SubscribeRequest, Subscription, SubscriptionId},
};
use tadhkir_scheduler::{
    NextNotification, NextNotificationCalculator, ScheduleTimezone,
    delivery::{ReminderDeliveryChannel, ReminderMessageType, ReminderNotification},
    resolve_prayer_message,
};
use tadhkir_storage::{
    NewNotificationHistory, NewSubscription, NotificationHistoryStorage, PrayerMessageStorage,
    SubscriptionStorage, UpdateSubscription,
};

/// Changes to the schedule of an existing subscription. `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct RescheduleRequest {
    pub frequency: Option<String>,
    pub time_of_day: Option<String>,
    pub specific_time: Option<String>,
}

pub struct SubscriptionService {
    subscriptions: Arc<dyn SubscriptionStorage>,
    history: Arc<dyn NotificationHistoryStorage>,
    prayers: Arc<dyn PrayerMessageStorage>,
    delivery: Arc<dyn ReminderDeliveryChannel>,
    calculator: NextNotificationCalculator,
    timezone: ScheduleTimezone,
    strict_validation: bool,
}

impl SubscriptionService {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionStorage>,
        history: Arc<dyn NotificationHistoryStorage>,
        prayers: Arc<dyn PrayerMessageStorage>,
        delivery: Arc<dyn ReminderDeliveryChannel>,
        calculator: NextNotificationCalculator,
        timezone: ScheduleTimezone,
    ) -> Self {
        Self {
            subscriptions,
            history,
            prayers,
            delivery,
            calculator,
            timezone,
            strict_validation: false,
        }
    }

    /// Rejects invalid schedules instead of falling back to a next-day reminder.
    pub fn with_strict_validation(mut self, strict_validation: bool) -> Self {
        self.strict_validation = strict_validation;
        self
    }

    pub async fn subscribe(
        &self,
        request: SubscribeRequest,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Subscription> {
        let subscriber_email = request.subscriber_email.trim().to_string();
        anyhow::ensure!(!subscriber_email.is_empty(), "Subscriber email is required");

        let mut recurrence = RecurrenceConfig::new(parse_frequency(&request.frequency));
        recurrence.time_of_day = parse_time_of_day(request.time_of_day.as_deref());
        recurrence.specific_time = request.specific_time.clone();
        recurrence.subject_date_of_birth = request.subject_date_of_birth;
        recurrence.subject_date_of_death = request.subject_date_of_death;

        let next = self.next_notification(&recurrence, now)?;

        let subscription = self
            .subscriptions
            .insert(NewSubscription {
                user_id: request
                    .user_id
                    .clone()
                    .unwrap_or_else(|| ANONYMOUS_USER.to_string()),
                subject_name: subject_name(&request),
                subject_gender: request.subject_gender.unwrap_or_default(),
                subscriber_email,
                subscriber_phone: request.subscriber_phone.clone(),
                recurrence,
                channels: request.channels.clone().unwrap_or_else(|| vec![Channel::Email]),
                reminder_message: None,
                next_notification_date: next.at,
            })
            .await?;

        log::info!(
            "Created subscription. [subscription_id = {}, frequency = {}, next_notification_date = {}]",
            subscription.id,
            subscription.recurrence.frequency,
            subscription.next_notification_date
        );

        self.send_welcome(&subscription).await;

        Ok(subscription)
    }

    pub async fn reschedule(
        &self,
        id: SubscriptionId,
        request: RescheduleRequest,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Subscription> {
        let subscription = self.get_existing(id).await?;

        let mut recurrence = subscription.recurrence;
        if let Some(frequency) = request.frequency.as_deref() {
            recurrence.frequency = parse_frequency(frequency);
        }
        if request.time_of_day.is_some() {
            recurrence.time_of_day = parse_time_of_day(request.time_of_day.as_deref());
        }
        if request.specific_time.is_some() {
            recurrence.specific_time = request.specific_time;
        }

        let next = self.next_notification(&recurrence, now)?;

        let updated = self
            .subscriptions
            .update(UpdateSubscription {
                recurrence: Some(recurrence),
                next_notification_date: Some(next.at),
                ..UpdateSubscription::new(id)
            })
            .await?;

        Ok(updated)
    }

    /// Pauses or resumes a subscription. A resumed subscription whose
    /// notification date already passed gets a fresh one.
    pub async fn set_active(
        &self,
        id: SubscriptionId,
        is_active: bool,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Subscription> {
        let subscription = self.get_existing(id).await?;

        let next_notification_date = if is_active && subscription.next_notification_date <= now {
            Some(
                self.timezone
                    .next_after(&self.calculator, &subscription.recurrence, now)
                    .at,
            )
        } else {
            None
        };

        let updated = self
            .subscriptions
            .update(UpdateSubscription {
                is_active: Some(is_active),
                next_notification_date,
                ..UpdateSubscription::new(id)
            })
            .await?;

        Ok(updated)
    }

    pub async fn delete(&self, id: SubscriptionId) -> anyhow::Result<()> {
        self.subscriptions.delete(id).await?;
        log::info!("Deleted subscription {id}");
        Ok(())
    }

    pub async fn subscriptions_for_email(&self, email: &str) -> anyhow::Result<Vec<Subscription>> {
        Ok(self.subscriptions.get_by_email(email.trim()).await?)
    }

    pub async fn subscriptions_for_user(&self, user_id: &str) -> anyhow::Result<Vec<Subscription>> {
        Ok(self.subscriptions.get_by_user(user_id).await?)
    }

    /// Delivers a reminder right away without touching the schedule.
    ///
    /// The attempt is recorded in the notification history either way.
    pub async fn send_now(
        &self,
        id: SubscriptionId,
        now: DateTime<Utc>,
    ) -> anyhow::Result<NotificationHistory> {
        let subscription = self.get_existing(id).await?;
        anyhow::ensure!(
            !subscription.subscriber_email.trim().is_empty(),
            "Subscription {id} has no email address"
        );

        let prayer_message = resolve_prayer_message(self.prayers.as_ref(), &subscription).await;
        let notification = ReminderNotification {
            subscription,
            prayer_message,
        };

        let result = self
            .delivery
            .send_reminder_notification(&notification, ReminderMessageType::Scheduled)
            .await;

        let entry = match &result {
            Ok(()) => NewNotificationHistory {
                subscription_id: id,
                channel: self.delivery.channel(),
                status: NotificationStatus::Sent,
                sent_at: Some(now),
                error_message: None,
            },
            Err(e) => NewNotificationHistory {
                subscription_id: id,
                channel: self.delivery.channel(),
                status: NotificationStatus::Failed,
                sent_at: None,
                error_message: Some(e.to_string()),
            },
        };
        let history = self.history.record(entry).await?;

        result?;
        log::info!("Sent reminder on demand. [subscription_id = {id}]");
        Ok(history)
    }

    pub async fn unsubscribe_all(&self, email: &str) -> anyhow::Result<usize> {
        let deactivated = self.subscriptions.deactivate_all_by_email(email.trim()).await?;
        log::info!("Deactivated {deactivated} subscriptions for {email}");
        Ok(deactivated)
    }

    pub async fn upcoming(&self, user_id: &str, limit: usize) -> anyhow::Result<Vec<Subscription>> {
        Ok(self.subscriptions.get_upcoming(user_id, limit).await?)
    }

    fn next_notification(
        &self,
        recurrence: &RecurrenceConfig,
        now: DateTime<Utc>,
    ) -> anyhow::Result<NextNotification<DateTime<Utc>>> {
        if self.strict_validation {
            recurrence.validate()?;
        }

        let next = self.timezone.next_after(&self.calculator, recurrence, now);
        if let Some(reason) = next.fallback {
            log::warn!(
                "Reminder schedule is incomplete, using fallback. [frequency = {}, reason = {reason:?}, next = {}]",
                recurrence.frequency,
                next.at
            );
        }

        Ok(next)
    }

    async fn get_existing(&self, id: SubscriptionId) -> anyhow::Result<Subscription> {
        self.subscriptions
            .get(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Subscription {id} not found"))
    }

    async fn send_welcome(&self, subscription: &Subscription) {
        let prayer_message = resolve_prayer_message(self.prayers.as_ref(), subscription).await;
        let notification = ReminderNotification {
            subscription: subscription.clone(),
            prayer_message,
        };

        if let Err(e) = self
            .delivery
            .send_reminder_notification(&notification, ReminderMessageType::Welcome)
            .await
        {
            log::error!(
                "Unable to send welcome reminder. [subscription_id = {}, error = {e}]",
                subscription.id
            );
        }
    }
}

fn parse_frequency(value: &str) -> Frequency {
    let frequency = Frequency::parse_lenient(value);
    if frequency == Frequency::Unrecognized {
        log::warn!("Unrecognized frequency {value:?}");
    }
    frequency
}

fn parse_time_of_day(value: Option<&str>) -> Option<TimeOfDay> {
    let value = value.filter(|v| !v.trim().is_empty())?;
    let time_of_day = TimeOfDay::parse_lenient(value);
    if time_of_day.is_none() {
        log::warn!("Unrecognized time of day {value:?}");
    }
    time_of_day
}

fn subject_name(request: &SubscribeRequest) -> Option<String> {
    let name = match (&request.subject_first_name, &request.subject_last_name) {
        (Some(first), Some(last)) => format!("{} {}", first.trim(), last.trim()),
        _ => request.subject_name.clone()?,
    };

    let name = title_case_name(name.trim());
    (!name.is_empty()).then_some(name)
}
