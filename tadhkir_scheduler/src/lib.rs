pub mod delivery;
mod dispatcher;
mod next_notification;
mod prayer;
mod timezone;

pub use dispatcher::{DispatchSummary, DispatcherHandle, ReminderDispatcher};
pub use next_notification::{
    FallbackReason, NextNotification, NextNotificationCalculator, compute_next,
    compute_next_from_system_clock,
};
pub use prayer::resolve_prayer_message;
pub use timezone::ScheduleTimezone;

#[cfg(test)]
mod tests;
