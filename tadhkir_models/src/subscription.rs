use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::recurrence::RecurrenceConfig;

pub type SubscriptionId = i64;

pub const ANONYMOUS_USER: &str = "anonymous";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[default]
    Male,
    Female,
}

impl Gender {
    pub fn object_pronoun(&self) -> &'static str {
        match self {
            Gender::Male => "him",
            Gender::Female => "her",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Email,
    Sms,
    Push,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Channel::Email => "email",
            Channel::Sms => "sms",
            Channel::Push => "push",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub user_id: String,
    pub subject_name: Option<String>,
    pub subject_gender: Gender,
    pub subscriber_email: String,
    pub subscriber_phone: Option<String>,
    pub recurrence: RecurrenceConfig,
    pub channels: Vec<Channel>,
    pub reminder_message: Option<String>,
    pub is_active: bool,
    pub next_notification_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.next_notification_date <= now
    }
}

/// Subscription request as submitted by a subscriber.
///
/// Frequency and time of day stay raw strings; turning them into a
/// [`RecurrenceConfig`] is the subscription workflow's job.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubscribeRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub subject_name: Option<String>,
    #[serde(default)]
    pub subject_first_name: Option<String>,
    #[serde(default)]
    pub subject_last_name: Option<String>,
    #[serde(default)]
    pub subject_gender: Option<Gender>,
    #[serde(default)]
    pub subject_date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub subject_date_of_death: Option<NaiveDate>,
    pub subscriber_email: String,
    #[serde(default)]
    pub subscriber_phone: Option<String>,
    pub frequency: String,
    #[serde(default)]
    pub time_of_day: Option<String>,
    #[serde(default)]
    pub specific_time: Option<String>,
    #[serde(default)]
    pub channels: Option<Vec<Channel>>,
}
