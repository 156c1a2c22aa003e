use async_trait::async_trait;
use tadhkir_models::prayer::PrayerMessage;

use crate::StorageError;

#[async_trait]
pub trait PrayerMessageStorage: Send + Sync {
    async fn insert(&self, message: String) -> Result<PrayerMessage, StorageError>;
    async fn get_active(&self) -> Result<Vec<PrayerMessage>, StorageError>;
    async fn get_random_active(&self) -> Result<Option<PrayerMessage>, StorageError>;
}
