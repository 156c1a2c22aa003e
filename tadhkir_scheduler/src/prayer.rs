use tadhkir_models::{
    prayer::{DEFAULT_PRAYER_MESSAGE, personalize_prayer_message},
    subscription::Subscription,
};
use tadhkir_storage::PrayerMessageStorage;

/// Picks the prayer text for a reminder.
///
/// A random active prayer message wins, personalised when the subject has a
/// name. Without any stored messages the subscription's own reminder message
/// is used, then the default one.
pub async fn resolve_prayer_message(
    storage: &dyn PrayerMessageStorage,
    subscription: &Subscription,
) -> String {
    let prayer = match storage.get_random_active().await {
        Ok(prayer) => prayer,
        Err(e) => {
            log::warn!(
                "Unable to load prayer messages, using fallback. [subscription_id = {}, error = {e}]",
                subscription.id
            );
            None
        }
    };

    match (prayer, &subscription.subject_name) {
        (Some(prayer), Some(name)) => {
            personalize_prayer_message(&prayer.message, name, subscription.subject_gender)
        }
        (Some(prayer), None) => prayer.message,
        (None, _) => subscription
            .reminder_message
            .clone()
            .unwrap_or_else(|| DEFAULT_PRAYER_MESSAGE.to_string()),
    }
}
