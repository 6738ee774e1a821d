//! Notification payload types.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Category of a notification; drives the `type` entry of the data map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationCategory {
    #[default]
    General,
    Announcement,
    Content,
    Event,
    Certificate,
    Reminder,
}

impl NotificationCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationCategory::General => "general",
            NotificationCategory::Announcement => "announcement",
            NotificationCategory::Content => "content",
            NotificationCategory::Event => "event",
            NotificationCategory::Certificate => "certificate",
            NotificationCategory::Reminder => "reminder",
        }
    }
}

impl fmt::Display for NotificationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationCategory {
    type Err = color_eyre::eyre::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "general" => Ok(NotificationCategory::General),
            "announcement" => Ok(NotificationCategory::Announcement),
            "content" => Ok(NotificationCategory::Content),
            "event" => Ok(NotificationCategory::Event),
            "certificate" => Ok(NotificationCategory::Certificate),
            "reminder" => Ok(NotificationCategory::Reminder),
            other => Err(color_eyre::eyre::eyre!("unknown notification category: {}", other)),
        }
    }
}

/// Key of the category entry in the data map.
pub const CATEGORY_DATA_KEY: &str = "type";

/// Payload delivered to every recipient of a job.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct NotificationPayload {
    pub title: String,
    pub body: String,
    /// Free-form string data; always carries the category under `type`.
    pub data: BTreeMap<String, String>,
}

impl NotificationPayload {
    /// Create a payload for the given category.
    pub fn new(
        title: impl Into<String>,
        body: impl Into<String>,
        category: NotificationCategory,
    ) -> Self {
        let mut data = BTreeMap::new();
        data.insert(CATEGORY_DATA_KEY.to_string(), category.to_string());

        Self {
            title: title.into(),
            body: body.into(),
            data,
        }
    }

    /// Merge extra data entries. The category entry cannot be overridden.
    pub fn with_data<I, K, V>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in extra {
            let key = key.into();
            if key != CATEGORY_DATA_KEY {
                self.data.insert(key, value.into());
            }
        }
        self
    }

    /// Category recorded in the data map, if any.
    pub fn category(&self) -> Option<NotificationCategory> {
        self.data.get(CATEGORY_DATA_KEY)?.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_carries_category() {
        let payload = NotificationPayload::new("Hi", "There", NotificationCategory::Event);
        assert_eq!(payload.data.get("type").map(String::as_str), Some("event"));
        assert_eq!(payload.category(), Some(NotificationCategory::Event));
    }

    #[test]
    fn test_extra_data_cannot_override_category() {
        let payload = NotificationPayload::new("Hi", "There", NotificationCategory::Content)
            .with_data([("type", "spoofed"), ("content_id", "42")]);

        assert_eq!(payload.category(), Some(NotificationCategory::Content));
        assert_eq!(payload.data.get("content_id").map(String::as_str), Some("42"));
    }

    #[test]
    fn test_category_parse() {
        assert_eq!(
            "certificate".parse::<NotificationCategory>().unwrap(),
            NotificationCategory::Certificate
        );
        assert!("promo".parse::<NotificationCategory>().is_err());
    }
}
