use async_trait::async_trait;
use tadhkir_models::{settings::EmailSettings, subscription::Channel};
use tadhkir_scheduler::delivery::{
    ReminderDeliveryChannel, ReminderMessageType, ReminderNotification,
};

use crate::email::render_prayer_reminder_email;

const UNNAMED_SUBJECT: &str = "your loved one";

/// Renders reminder emails and writes them to the log instead of sending them.
pub struct LogDeliveryChannel {
    settings: EmailSettings,
}

impl LogDeliveryChannel {
    pub fn new(settings: EmailSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl ReminderDeliveryChannel for LogDeliveryChannel {
    fn channel(&self) -> Channel {
        Channel::Email
    }

    async fn send_reminder_notification(
        &self,
        notification: &ReminderNotification,
        message: ReminderMessageType,
    ) -> anyhow::Result<()> {
        let subscription = &notification.subscription;
        if subscription.subscriber_email.trim().is_empty() {
            anyhow::bail!("No email address for subscription {}", subscription.id);
        }

        let email = render_prayer_reminder_email(
            &subscription.subscriber_email,
            subscription.subject_name.as_deref().unwrap_or(UNNAMED_SUBJECT),
            &notification.prayer_message,
            message,
            &self.settings,
        );

        log::info!(
            "[{message:?}] Email to {} from {}: {}",
            email.to,
            email.from,
            email.subject
        );
        log::debug!("Email body for subscription {}:\n{}", subscription.id, email.text);

        Ok(())
    }
}
