use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tadhkir_models::subscription::{Subscription, SubscriptionId};

use crate::{NewSubscription, StorageError, UpdateSubscription};

#[async_trait]
pub trait SubscriptionStorage: Send + Sync {
    async fn insert(&self, subscription: NewSubscription) -> Result<Subscription, StorageError>;
    async fn get(&self, id: SubscriptionId) -> Result<Option<Subscription>, StorageError>;
    /// Subscriptions of a subscriber, oldest first.
    async fn get_by_email(&self, email: &str) -> Result<Vec<Subscription>, StorageError>;
    async fn get_by_user(&self, user_id: &str) -> Result<Vec<Subscription>, StorageError>;
    async fn update(&self, subscription: UpdateSubscription) -> Result<Subscription, StorageError>;
    async fn delete(&self, id: SubscriptionId) -> Result<(), StorageError>;
    /// Returns how many subscriptions were deactivated.
    async fn deactivate_all_by_email(&self, email: &str) -> Result<usize, StorageError>;
    /// Active subscriptions whose next notification is at or before `now`, most overdue first.
    async fn get_due(&self, now: DateTime<Utc>) -> Result<Vec<Subscription>, StorageError>;
    async fn get_upcoming(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<Subscription>, StorageError>;
}
