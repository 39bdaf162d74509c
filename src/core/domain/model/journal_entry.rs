//! Quota journal entries from the `/v1/users/{id}/journals` endpoint.

use crate::core::domain::value_object::serde_helpers::unix_seconds;
use chrono::DateTime;
use serde::Deserialize;
use std::fmt;

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// One change to one of the user's quotas.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JournalEntry {
    /// Quota category: `quota_time`, `quota_data` or `quota_storage`.
    pub quota: String,
    /// Value of the quota after the change (seconds or bytes).
    pub new_value: u64,
    /// Why the quota changed.
    pub reason: String,
    /// When the change happened.
    #[serde(with = "unix_seconds")]
    pub timestamp: u64,
    /// The user the quota belongs to.
    #[serde(rename = "ownerid")]
    pub owner_id: u64,
}

impl fmt::Display for JournalEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let date = i64::try_from(self.timestamp)
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map_or_else(|| self.timestamp.to_string(), |dt| dt.format("%Y-%m-%d").to_string());

        if self.quota.contains("time") {
            write!(
                f,
                "{} : Remaining time is {:.2} hours.",
                date,
                self.new_value as f64 / 3600.0
            )
        } else if self.quota.contains("storage") {
            write!(
                f,
                "{} : Remaining storage quota is {:.2} GB.",
                date,
                self.new_value as f64 / GIB
            )
        } else if self.quota.contains("data") {
            write!(
                f,
                "{} : Remaining data quota is {:.2} GB.",
                date,
                self.new_value as f64 / GIB
            )
        } else {
            write!(
                f,
                "{} : {} is {}, after {}.",
                date, self.quota, self.new_value, self.reason
            )
        }
    }
}
