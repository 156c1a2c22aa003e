use serde::Deserialize;

use crate::{recurrence::HourTable, subscription::SubscribeRequest};

fn default_poll_interval_secs() -> u64 {
    60
}

#[derive(Deserialize, Debug)]
pub struct SchedulerSettings {
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// IANA timezone name. Process local time when absent.
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub strict_validation: bool,
    #[serde(default)]
    pub hours: HourTable,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            timezone: None,
            strict_validation: false,
            hours: HourTable::default(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct EmailSettings {
    pub from: String,
    pub from_name: String,
    pub reply_to: String,
    pub manage_base_url: String,
}

#[derive(Deserialize, Debug)]
pub struct Settings {
    #[serde(default)]
    pub scheduler: SchedulerSettings,
    pub email: EmailSettings,
    #[serde(default)]
    pub prayer_messages: Vec<String>,
    #[serde(default)]
    pub subscriptions: Vec<SubscribeRequest>,
}
