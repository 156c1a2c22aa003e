use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use tadhkir_models::{
    notification::{NotificationHistory, NotificationHistoryId},
    prayer::{PrayerMessage, PrayerMessageId},
    subscription::{Subscription, SubscriptionId},
};
use tokio::sync::RwLock;

use crate::{
    NewNotificationHistory, NewSubscription, NotificationHistoryStorage, PrayerMessageStorage,
    StorageError, SubscriptionStorage, UpdateSubscription,
};

struct InMemoryStore {
    current_subscription_id: SubscriptionId,
    subscriptions: BTreeMap<SubscriptionId, Subscription>,
    current_history_id: NotificationHistoryId,
    history: Vec<NotificationHistory>,
    current_prayer_id: PrayerMessageId,
    prayer_messages: Vec<PrayerMessage>,
}

pub struct InMemoryStorage {
    store: RwLock<InMemoryStore>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        InMemoryStorage {
            store: RwLock::new(InMemoryStore {
                current_subscription_id: 1,
                subscriptions: BTreeMap::new(),
                current_history_id: 1,
                history: Vec::new(),
                current_prayer_id: 1,
                prayer_messages: Vec::new(),
            }),
        }
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SubscriptionStorage for InMemoryStorage {
    async fn insert(&self, subscription: NewSubscription) -> Result<Subscription, StorageError> {
        let mut store = self.store.write().await;
        let id = store.current_subscription_id;
        let now = Utc::now();

        let NewSubscription {
            user_id,
            subject_name,
            subject_gender,
            subscriber_email,
            subscriber_phone,
            recurrence,
            channels,
            reminder_message,
            next_notification_date,
        } = subscription;

        let subscription = Subscription {
            id,
            user_id,
            subject_name,
            subject_gender,
            subscriber_email,
            subscriber_phone,
            recurrence,
            channels,
            reminder_message,
            is_active: true,
            next_notification_date,
            created_at: now,
            updated_at: now,
        };

        store.subscriptions.insert(id, subscription.clone());
        store.current_subscription_id += 1;

        log::debug!("Inserted subscription {id}");
        Ok(subscription)
    }

    async fn get(&self, id: SubscriptionId) -> Result<Option<Subscription>, StorageError> {
        let store = self.store.read().await;
        Ok(store.subscriptions.get(&id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> Result<Vec<Subscription>, StorageError> {
        let store = self.store.read().await;
        let mut subscriptions: Vec<_> = store
            .subscriptions
            .values()
            .filter(|s| s.subscriber_email == email)
            .cloned()
            .collect();

        subscriptions.sort_by_key(|s| (s.created_at, s.id));
        Ok(subscriptions)
    }

    async fn get_by_user(&self, user_id: &str) -> Result<Vec<Subscription>, StorageError> {
        let store = self.store.read().await;
        Ok(store
            .subscriptions
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn update(&self, update: UpdateSubscription) -> Result<Subscription, StorageError> {
        let mut store = self.store.write().await;
        let subscription = store
            .subscriptions
            .get_mut(&update.id)
            .ok_or(StorageError::SubscriptionNotFound(update.id))?;

        if let Some(recurrence) = update.recurrence {
            subscription.recurrence = recurrence;
        }
        if let Some(channels) = update.channels {
            subscription.channels = channels;
        }
        if let Some(message) = update.reminder_message {
            subscription.reminder_message = Some(message);
        }
        if let Some(is_active) = update.is_active {
            subscription.is_active = is_active;
        }
        if let Some(next) = update.next_notification_date {
            subscription.next_notification_date = next;
        }
        subscription.updated_at = Utc::now();

        Ok(subscription.clone())
    }

    async fn delete(&self, id: SubscriptionId) -> Result<(), StorageError> {
        let mut store = self.store.write().await;
        store
            .subscriptions
            .remove(&id)
            .map(|_| ())
            .ok_or(StorageError::SubscriptionNotFound(id))
    }

    async fn deactivate_all_by_email(&self, email: &str) -> Result<usize, StorageError> {
        let mut store = self.store.write().await;
        let now = Utc::now();
        let mut deactivated = 0;

        for subscription in store
            .subscriptions
            .values_mut()
            .filter(|s| s.subscriber_email == email && s.is_active)
        {
            subscription.is_active = false;
            subscription.updated_at = now;
            deactivated += 1;
        }

        Ok(deactivated)
    }

    async fn get_due(&self, now: DateTime<Utc>) -> Result<Vec<Subscription>, StorageError> {
        let store = self.store.read().await;
        let mut due: Vec<_> = store
            .subscriptions
            .values()
            .filter(|s| s.is_due(now))
            .cloned()
            .collect();

        due.sort_by_key(|s| (s.next_notification_date, s.id));
        Ok(due)
    }

    async fn get_upcoming(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<Subscription>, StorageError> {
        let store = self.store.read().await;
        let mut upcoming: Vec<_> = store
            .subscriptions
            .values()
            .filter(|s| s.user_id == user_id && s.is_active)
            .cloned()
            .collect();

        upcoming.sort_by_key(|s| (s.next_notification_date, s.id));
        upcoming.truncate(limit);
        Ok(upcoming)
    }
}

#[async_trait]
impl NotificationHistoryStorage for InMemoryStorage {
    async fn record(&self, entry: NewNotificationHistory) -> Result<NotificationHistory, StorageError> {
        let mut store = self.store.write().await;
        let id = store.current_history_id;

        let history = NotificationHistory {
            id,
            subscription_id: entry.subscription_id,
            channel: entry.channel,
            status: entry.status,
            sent_at: entry.sent_at,
            error_message: entry.error_message,
            created_at: Utc::now(),
        };

        store.history.push(history.clone());
        store.current_history_id += 1;

        Ok(history)
    }

    async fn get_for_subscription(
        &self,
        subscription_id: SubscriptionId,
    ) -> Result<Vec<NotificationHistory>, StorageError> {
        let store = self.store.read().await;
        Ok(store
            .history
            .iter()
            .rev()
            .filter(|h| h.subscription_id == subscription_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl PrayerMessageStorage for InMemoryStorage {
    async fn insert(&self, message: String) -> Result<PrayerMessage, StorageError> {
        let mut store = self.store.write().await;
        let id = store.current_prayer_id;

        let message = PrayerMessage {
            id,
            message,
            is_active: true,
        };

        store.prayer_messages.push(message.clone());
        store.current_prayer_id += 1;

        Ok(message)
    }

    async fn get_active(&self) -> Result<Vec<PrayerMessage>, StorageError> {
        let store = self.store.read().await;
        Ok(store
            .prayer_messages
            .iter()
            .filter(|m| m.is_active)
            .cloned()
            .collect())
    }

    async fn get_random_active(&self) -> Result<Option<PrayerMessage>, StorageError> {
        let active = self.get_active().await?;
        let chosen = active.choose(&mut rand::thread_rng()).cloned();
        Ok(chosen)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use tadhkir_models::{
        notification::NotificationStatus,
        recurrence::{Frequency, RecurrenceConfig},
        subscription::{Channel, Gender},
    };

    use super::*;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap()
    }

    fn new_subscription(email: &str, next: DateTime<Utc>) -> NewSubscription {
        NewSubscription {
            user_id: "user-1".into(),
            subject_name: Some("Omar Khalid".into()),
            subject_gender: Gender::Male,
            subscriber_email: email.into(),
            subscriber_phone: None,
            recurrence: RecurrenceConfig::new(Frequency::Daily),
            channels: vec![Channel::Email],
            reminder_message: None,
            next_notification_date: next,
        }
    }

    #[tokio::test]
    async fn insert_assigns_sequential_ids() {
        let storage = InMemoryStorage::new();
        let first = SubscriptionStorage::insert(&storage, new_subscription("a@example.com", at(9)))
            .await
            .unwrap();
        let second = SubscriptionStorage::insert(&storage, new_subscription("a@example.com", at(9)))
            .await
            .unwrap();

        assert_eq!(first.id + 1, second.id);
        assert!(first.is_active);
        assert_eq!(storage.get(first.id).await.unwrap(), Some(first));
    }

    #[tokio::test]
    async fn update_of_missing_subscription_fails() {
        let storage = InMemoryStorage::new();
        let result = storage.update(UpdateSubscription::new(42)).await;

        assert_eq!(result.unwrap_err(), StorageError::SubscriptionNotFound(42));
    }

    #[tokio::test]
    async fn update_only_touches_given_fields() {
        let storage = InMemoryStorage::new();
        let subscription = SubscriptionStorage::insert(&storage, new_subscription("a@example.com", at(9)))
            .await
            .unwrap();

        let updated = storage
            .update(UpdateSubscription {
                next_notification_date: Some(at(10)),
                ..UpdateSubscription::new(subscription.id)
            })
            .await
            .unwrap();

        assert_eq!(updated.next_notification_date, at(10));
        assert_eq!(updated.recurrence, subscription.recurrence);
        assert!(updated.is_active);
        assert!(updated.updated_at >= subscription.updated_at);
    }

    #[tokio::test]
    async fn due_subscriptions_are_active_and_ordered() {
        let storage = InMemoryStorage::new();
        let late = SubscriptionStorage::insert(&storage, new_subscription("a@example.com", at(8)))
            .await
            .unwrap();
        let early = SubscriptionStorage::insert(&storage, new_subscription("b@example.com", at(7)))
            .await
            .unwrap();
        let future = SubscriptionStorage::insert(&storage, new_subscription("c@example.com", at(12)))
            .await
            .unwrap();
        let paused = SubscriptionStorage::insert(&storage, new_subscription("d@example.com", at(6)))
            .await
            .unwrap();
        storage
            .update(UpdateSubscription {
                is_active: Some(false),
                ..UpdateSubscription::new(paused.id)
            })
            .await
            .unwrap();

        let due: Vec<_> = storage
            .get_due(at(9))
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();

        assert_eq!(due, vec![early.id, late.id]);
        assert!(!due.contains(&future.id));
    }

    #[tokio::test]
    async fn get_by_user_filters_by_owner() {
        let storage = InMemoryStorage::new();
        let own = SubscriptionStorage::insert(&storage, new_subscription("a@example.com", at(9)))
            .await
            .unwrap();
        SubscriptionStorage::insert(
            &storage,
            NewSubscription {
                user_id: "user-2".into(),
                ..new_subscription("a@example.com", at(9))
            },
        )
        .await
        .unwrap();

        assert_eq!(storage.get_by_user("user-1").await.unwrap(), vec![own]);
        assert!(storage.get_by_user("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn deactivate_all_by_email_only_touches_that_subscriber() {
        let storage = InMemoryStorage::new();
        for _ in 0..2 {
            SubscriptionStorage::insert(&storage, new_subscription("a@example.com", at(9)))
                .await
                .unwrap();
        }
        let other = SubscriptionStorage::insert(&storage, new_subscription("b@example.com", at(9)))
            .await
            .unwrap();

        assert_eq!(storage.deactivate_all_by_email("a@example.com").await.unwrap(), 2);
        assert_eq!(storage.deactivate_all_by_email("a@example.com").await.unwrap(), 0);
        assert!(storage.get(other.id).await.unwrap().unwrap().is_active);
        assert!(
            storage
                .get_by_email("a@example.com")
                .await
                .unwrap()
                .iter()
                .all(|s| !s.is_active)
        );
    }

    #[tokio::test]
    async fn upcoming_is_limited_and_sorted() {
        let storage = InMemoryStorage::new();
        for hours in [5, 1, 3] {
            SubscriptionStorage::insert(
                &storage,
                new_subscription("a@example.com", at(9) + Duration::hours(hours)),
            )
            .await
            .unwrap();
        }

        let upcoming = storage.get_upcoming("user-1", 2).await.unwrap();

        assert_eq!(upcoming.len(), 2);
        assert_eq!(upcoming[0].next_notification_date, at(10));
        assert_eq!(upcoming[1].next_notification_date, at(12));
        assert!(storage.get_upcoming("someone-else", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_removes_subscription() {
        let storage = InMemoryStorage::new();
        let subscription = SubscriptionStorage::insert(&storage, new_subscription("a@example.com", at(9)))
            .await
            .unwrap();

        storage.delete(subscription.id).await.unwrap();

        assert_eq!(storage.get(subscription.id).await.unwrap(), None);
        assert_eq!(
            storage.delete(subscription.id).await,
            Err(StorageError::SubscriptionNotFound(subscription.id))
        );
    }

    #[tokio::test]
    async fn history_is_returned_newest_first() {
        let storage = InMemoryStorage::new();
        for status in [NotificationStatus::Failed, NotificationStatus::Sent] {
            storage
                .record(NewNotificationHistory {
                    subscription_id: 1,
                    channel: Channel::Email,
                    status,
                    sent_at: None,
                    error_message: None,
                })
                .await
                .unwrap();
        }

        let history = storage.get_for_subscription(1).await.unwrap();

        assert_eq!(history.len(), 2);
        assert_eq!(history[0].status, NotificationStatus::Sent);
        assert!(storage.get_for_subscription(2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn random_prayer_message_comes_from_active_messages() {
        let storage = InMemoryStorage::new();
        assert_eq!(storage.get_random_active().await.unwrap(), None);

        let inserted = PrayerMessageStorage::insert(&storage, "Forgive {first-name}.".into())
            .await
            .unwrap();

        assert_eq!(storage.get_random_active().await.unwrap(), Some(inserted));
    }
}
