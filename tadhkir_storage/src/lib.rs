mod error;
mod in_memory;
mod model;
mod notification_storage;
mod prayer_storage;
mod subscription_storage;

pub use error::StorageError;
pub use in_memory::InMemoryStorage;
pub use model::{NewNotificationHistory, NewSubscription, UpdateSubscription};
pub use notification_storage::NotificationHistoryStorage;
pub use prayer_storage::PrayerMessageStorage;
pub use subscription_storage::SubscriptionStorage;
