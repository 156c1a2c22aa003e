use crate::subscription::Gender;

pub type PrayerMessageId = i64;

pub const DEFAULT_PRAYER_MESSAGE: &str = "May Allah grant them peace and mercy. Ameen.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrayerMessage {
    pub id: PrayerMessageId,
    pub message: String,
    pub is_active: bool,
}

/// Fills the `{first-name}` and `{pronoun}` placeholders of a prayer template.
pub fn personalize_prayer_message(template: &str, full_name: &str, gender: Gender) -> String {
    let first_name = full_name.split_whitespace().next().unwrap_or_default();

    template
        .replace("{first-name}", first_name)
        .replace("{pronoun}", gender.object_pronoun())
}

/// Capitalises the first letter of every space separated word and lowercases the rest.
pub fn title_case_name(name: &str) -> String {
    name.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
