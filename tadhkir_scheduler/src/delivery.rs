use async_trait::async_trait;
use tadhkir_models::subscription::{Channel, Subscription};

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ReminderMessageType {
    /// First reminder, sent right after subscribing.
    Welcome,
    Scheduled,
}

#[derive(Debug, Clone)]
pub struct ReminderNotification {
    pub subscription: Subscription,
    pub prayer_message: String,
}

#[async_trait]
pub trait ReminderDeliveryChannel: Send + Sync + 'static {
    fn channel(&self) -> Channel;

    async fn send_reminder_notification(
        &self,
        notification: &ReminderNotification,
        message: ReminderMessageType,
    ) -> anyhow::Result<()>;
}
