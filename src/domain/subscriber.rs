use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::subscriber_email::SubscriberEmail;

/// One entry of the subscriber document. Never edited once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscriber {
    pub email: String,
    #[serde(with = "iso_timestamp")]
    pub subscribed_at: DateTime<Utc>,
    pub source: String,
}

impl Subscriber {
    pub fn new(email: &SubscriberEmail, source: &str) -> Self {
        Subscriber {
            email: email.as_ref().to_string(),
            subscribed_at: Utc::now(),
            source: source.to_string(),
        }
    }
}

// Timestamps are written with millisecond precision and a `Z` suffix, e.g. 2024-05-01T10:00:00.000Z
mod iso_timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;

        DateTime::parse_from_rfc3339(&raw)
            .map(|value| value.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
