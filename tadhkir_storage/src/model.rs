use chrono::{DateTime, Utc};
use tadhkir_models::{
    notification::NotificationStatus,
    recurrence::RecurrenceConfig,
    subscription::{Channel, Gender, SubscriptionId},
};

#[derive(Debug, Clone)]
pub struct NewSubscription {
    pub user_id: String,
    pub subject_name: Option<String>,
    pub subject_gender: Gender,
    pub subscriber_email: String,
    pub subscriber_phone: Option<String>,
    pub recurrence: RecurrenceConfig,
    pub channels: Vec<Channel>,
    pub reminder_message: Option<String>,
    pub next_notification_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateSubscription {
    pub id: SubscriptionId,
    pub recurrence: Option<RecurrenceConfig>,
    pub channels: Option<Vec<Channel>>,
    pub reminder_message: Option<String>,
    pub is_active: Option<bool>,
    pub next_notification_date: Option<DateTime<Utc>>,
}

impl UpdateSubscription {
    pub fn new(id: SubscriptionId) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewNotificationHistory {
    pub subscription_id: SubscriptionId,
    pub channel: Channel,
    pub status: NotificationStatus,
    pub sent_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
}
