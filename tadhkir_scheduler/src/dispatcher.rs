use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use tadhkir_models::{
    notification::NotificationStatus,
    subscription::{Channel, Subscription},
};
use tadhkir_storage::{
    NewNotificationHistory, NotificationHistoryStorage, PrayerMessageStorage, SubscriptionStorage,
    UpdateSubscription,
};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::{
    NextNotificationCalculator, ScheduleTimezone,
    delivery::{ReminderDeliveryChannel, ReminderMessageType, ReminderNotification},
    resolve_prayer_message,
};

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchSummary {
    pub sent: usize,
    pub failed: usize,
    pub rescheduled: usize,
}

/// Sends reminders for due subscriptions and rolls their next notification date forward.
pub struct ReminderDispatcher {
    subscriptions: Arc<dyn SubscriptionStorage>,
    history: Arc<dyn NotificationHistoryStorage>,
    prayers: Arc<dyn PrayerMessageStorage>,
    channels: Vec<Arc<dyn ReminderDeliveryChannel>>,
    calculator: NextNotificationCalculator,
    timezone: ScheduleTimezone,
    poll_interval: Duration,
}

pub struct DispatcherHandle {
    task: JoinHandle<()>,
    cancellation_token: CancellationToken,
}

impl DispatcherHandle {
    pub async fn shutdown(self) {
        self.cancellation_token.cancel();
        if let Err(e) = self.task.await {
            log::error!("Reminder dispatcher task failed: {e}");
        }
    }
}

impl ReminderDispatcher {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionStorage>,
        history: Arc<dyn NotificationHistoryStorage>,
        prayers: Arc<dyn PrayerMessageStorage>,
        calculator: NextNotificationCalculator,
        timezone: ScheduleTimezone,
    ) -> Self {
        Self {
            subscriptions,
            history,
            prayers,
            channels: Vec::new(),
            calculator,
            timezone,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_channel(mut self, channel: Arc<dyn ReminderDeliveryChannel>) -> Self {
        self.channels.push(channel);
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn spawn(self) -> DispatcherHandle {
        let cancellation_token = CancellationToken::new();
        let task_cancellation_token = cancellation_token.child_token();

        let task = tokio::spawn(async move { self.run(task_cancellation_token).await });

        DispatcherHandle {
            task,
            cancellation_token,
        }
    }

    async fn run(self, cancellation_token: CancellationToken) {
        log::info!(
            "Starting reminder dispatcher. [poll_interval = {:?}, timezone = {:?}]",
            self.poll_interval,
            self.timezone
        );
        let mut interval = tokio::time::interval(self.poll_interval);

        loop {
            tokio::select! {
                _ = cancellation_token.cancelled() => {
                    log::info!("Reminder dispatcher shutting down");
                    break;
                }
                _ = interval.tick() => {
                    match self.dispatch_due(Utc::now()).await {
                        Ok(summary) if summary != DispatchSummary::default() => {
                            log::info!("Dispatched due reminders {summary:?}");
                        }
                        Ok(_) => {}
                        Err(e) => log::error!("Unable to load due subscriptions: {e}"),
                    }
                }
            }
        }
    }

    pub async fn dispatch_due(&self, now: DateTime<Utc>) -> anyhow::Result<DispatchSummary> {
        let due = self.subscriptions.get_due(now).await?;
        let mut summary = DispatchSummary::default();

        for subscription in due {
            self.deliver(&subscription, now, &mut summary).await;

            match self.reschedule(&subscription, now).await {
                Ok(()) => summary.rescheduled += 1,
                Err(e) => log::error!(
                    "Unable to reschedule subscription. [subscription_id = {}, error = {e}]",
                    subscription.id
                ),
            }
        }

        Ok(summary)
    }

    async fn deliver(
        &self,
        subscription: &Subscription,
        now: DateTime<Utc>,
        summary: &mut DispatchSummary,
    ) {
        let prayer_message = resolve_prayer_message(self.prayers.as_ref(), subscription).await;
        let notification = ReminderNotification {
            subscription: subscription.clone(),
            prayer_message,
        };

        for &channel in &subscription.channels {
            let result = match self.channel(channel) {
                Some(delivery) => {
                    delivery
                        .send_reminder_notification(&notification, ReminderMessageType::Scheduled)
                        .await
                }
                None => Err(anyhow::anyhow!("Channel {channel} is not supported")),
            };

            let entry = match result {
                Ok(()) => {
                    summary.sent += 1;
                    log::info!(
                        "Reminder sent. [subscription_id = {}, channel = {channel}]",
                        subscription.id
                    );
                    NewNotificationHistory {
                        subscription_id: subscription.id,
                        channel,
                        status: NotificationStatus::Sent,
                        sent_at: Some(now),
                        error_message: None,
                    }
                }
                Err(e) => {
                    summary.failed += 1;
                    log::warn!(
                        "Reminder delivery failed. [subscription_id = {}, channel = {channel}, error = {e}]",
                        subscription.id
                    );
                    NewNotificationHistory {
                        subscription_id: subscription.id,
                        channel,
                        status: NotificationStatus::Failed,
                        sent_at: None,
                        error_message: Some(e.to_string()),
                    }
                }
            };

            if let Err(e) = self.history.record(entry).await {
                log::error!(
                    "Unable to record notification history. [subscription_id = {}, error = {e}]",
                    subscription.id
                );
            }
        }
    }

    async fn reschedule(&self, subscription: &Subscription, now: DateTime<Utc>) -> anyhow::Result<()> {
        let next = self
            .timezone
            .next_after(&self.calculator, &subscription.recurrence, now);

        if let Some(reason) = next.fallback {
            log::warn!(
                "Rescheduled with fallback. [subscription_id = {}, reason = {reason:?}]",
                subscription.id
            );
        }

        self.subscriptions
            .update(UpdateSubscription {
                next_notification_date: Some(next.at),
                ..UpdateSubscription::new(subscription.id)
            })
            .await?;

        log::debug!(
            "Next notification for subscription {} at {}",
            subscription.id,
            next.at
        );
        Ok(())
    }

    fn channel(&self, channel: Channel) -> Option<&Arc<dyn ReminderDeliveryChannel>> {
        self.channels.iter().find(|c| c.channel() == channel)
    }
}
