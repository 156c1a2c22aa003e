use tadhkir_models::subscription::SubscriptionId;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Subscription {0} does not exist")]
    SubscriptionNotFound(SubscriptionId),
}
