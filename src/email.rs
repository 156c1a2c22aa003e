use tadhkir_models::settings::EmailSettings;
use tadhkir_scheduler::delivery::ReminderMessageType;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderEmail {
    pub to: String,
    pub from: String,
    pub reply_to: String,
    pub subject: String,
    pub text: String,
}

pub fn render_prayer_reminder_email(
    recipient: &str,
    subject_name: &str,
    prayer_message: &str,
    message_type: ReminderMessageType,
    settings: &EmailSettings,
) -> ReminderEmail {
    let manage_url = format!(
        "{}/unsubscribe?email={}",
        settings.manage_base_url.trim_end_matches('/'),
        urlencoding::encode(recipient)
    );

    let intro = match message_type {
        ReminderMessageType::Welcome => format!(
            "You are now subscribed to prayer reminders for {subject_name}. Here is your first one."
        ),
        ReminderMessageType::Scheduled => {
            format!("This is your prayer reminder for {subject_name}.")
        }
    };

    let text = format!(
        "Peace be upon you,\n\
         \n\
         {intro}\n\
         \n\
         {prayer_message}\n\
         \n\
         May Allah grant them peace and mercy.\n\
         \n\
         {from_name} - Prayer reminder service\n\
         Manage your subscriptions: {manage_url}\n\
         \n\
         If the above link doesn't work, please contact support.",
        from_name = settings.from_name,
    );

    ReminderEmail {
        to: recipient.to_string(),
        from: format!("{} <{}>", settings.from_name, settings.from),
        reply_to: settings.reply_to.clone(),
        subject: format!("Prayer reminder: {subject_name}"),
        text,
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn settings() -> EmailSettings {
        EmailSettings {
            from: "reminder@tadhkir.org".into(),
            from_name: "Tadhkir".into(),
            reply_to: "noreply@tadhkir.org".into(),
            manage_base_url: "https://tadhkir.example/".into(),
        }
    }

    #[test]
    fn scheduled_email_contains_prayer_and_manage_link() {
        let email = render_prayer_reminder_email(
            "amina+family@example.com",
            "Omar Khalid",
            "Forgive Omar and have mercy on him.",
            ReminderMessageType::Scheduled,
            &settings(),
        );

        assert_eq!(email.subject, "Prayer reminder: Omar Khalid");
        assert_eq!(email.from, "Tadhkir <reminder@tadhkir.org>");
        assert!(email.text.starts_with("Peace be upon you,"));
        assert!(email.text.contains("This is your prayer reminder for Omar Khalid."));
        assert!(email.text.contains("Forgive Omar and have mercy on him."));
        assert!(email.text.contains(
            "https://tadhkir.example/unsubscribe?email=amina%2Bfamily%40example.com"
        ));
    }

    #[test]
    fn welcome_email_introduces_the_subscription() {
        let email = render_prayer_reminder_email(
            "amina@example.com",
            "Omar Khalid",
            "Ameen.",
            ReminderMessageType::Welcome,
            &settings(),
        );

        assert!(email.text.contains("You are now subscribed to prayer reminders for Omar Khalid."));
    }

    proptest! {
        #[test]
        fn manage_link_carries_the_recipient(recipient in "[a-z0-9.+_-]{1,12}@[a-z]{1,8}\\.[a-z]{2,3}") {
            let email = render_prayer_reminder_email(
                &recipient,
                "Omar Khalid",
                "Ameen.",
                ReminderMessageType::Scheduled,
                &settings(),
            );

            let (_, encoded) = email.text.split_once("unsubscribe?email=").unwrap();
            let encoded = encoded.lines().next().unwrap();
            prop_assert_eq!(urlencoding::decode(encoded).unwrap(), recipient.as_str());
        }
    }
}
