use async_trait::async_trait;
use tadhkir_models::{notification::NotificationHistory, subscription::SubscriptionId};

use crate::{NewNotificationHistory, StorageError};

#[async_trait]
pub trait NotificationHistoryStorage: Send + Sync {
    async fn record(&self, entry: NewNotificationHistory) -> Result<NotificationHistory, StorageError>;
    /// Newest first.
    async fn get_for_subscription(
        &self,
        subscription_id: SubscriptionId,
    ) -> Result<Vec<NotificationHistory>, StorageError>;
}
