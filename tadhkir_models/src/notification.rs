use chrono::{DateTime, Utc};

use crate::subscription::{Channel, SubscriptionId};

pub type NotificationHistoryId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationStatus {
    Sent,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NotificationHistory {
    pub id: NotificationHistoryId,
    pub subscription_id: SubscriptionId,
    pub channel: Channel,
    pub status: NotificationStatus,
    pub sent_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}
