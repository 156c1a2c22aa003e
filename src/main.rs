use std::{sync::Arc, time::Duration};

use anyhow::Context;
use chrono::Utc;
use tadhkir::{appsettings, delivery::LogDeliveryChannel, subscriptions::SubscriptionService};
use tadhkir_scheduler::{NextNotificationCalculator, ReminderDispatcher, ScheduleTimezone};
use tadhkir_storage::{InMemoryStorage, PrayerMessageStorage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    pretty_env_logger::init();

    let settings = appsettings::load().context("Unable to load appsettings")?;
    let timezone = ScheduleTimezone::from_setting(settings.scheduler.timezone.as_deref())?;
    let calculator = NextNotificationCalculator::new(settings.scheduler.hours);

    let storage = Arc::new(InMemoryStorage::new());
    for message in settings.prayer_messages {
        PrayerMessageStorage::insert(storage.as_ref(), message).await?;
    }

    let delivery = Arc::new(LogDeliveryChannel::new(settings.email));

    let service = SubscriptionService::new(
        storage.clone(),
        storage.clone(),
        storage.clone(),
        delivery.clone(),
        calculator,
        timezone,
    )
    .with_strict_validation(settings.scheduler.strict_validation);

    for request in settings.subscriptions {
        let email = request.subscriber_email.clone();
        if let Err(e) = service.subscribe(request, Utc::now()).await {
            log::error!("Unable to create configured subscription for {email}: {e}");
        }
    }

    let dispatcher = ReminderDispatcher::new(
        storage.clone(),
        storage.clone(),
        storage,
        calculator,
        timezone,
    )
    .with_channel(delivery)
    .with_poll_interval(Duration::from_secs(settings.scheduler.poll_interval_secs.max(1)))
    .spawn();

    log::info!("Tadhkir is running, press Ctrl+C to stop");
    tokio::signal::ctrl_c().await?;

    dispatcher.shutdown().await;
    Ok(())
}
