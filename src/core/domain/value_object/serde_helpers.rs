//! Serde helpers for scheduler timestamps.

use serde::{Deserialize, Deserializer};

/// UNIX timestamps that the scheduler may send either as integers or as
/// floats (`1510000000.0`). Fractions are truncated.
pub mod unix_seconds {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Timestamp {
        Int(u64),
        Float(f64),
    }

    fn truncate<E: serde::de::Error>(value: Timestamp) -> Result<u64, E> {
        match value {
            Timestamp::Int(secs) => Ok(secs),
            Timestamp::Float(secs) if secs.is_finite() && secs >= 0.0 => Ok(secs as u64),
            Timestamp::Float(secs) => Err(E::custom(format!("invalid timestamp {}", secs))),
        }
    }

    /// Deserialize a number of seconds since the UNIX epoch.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        truncate(Timestamp::deserialize(deserializer)?)
    }

    /// Same as [`deserialize`] for optional fields (`null` or missing).
    pub mod option {
        use super::*;

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
        where
            D: Deserializer<'de>,
        {
            Option::<Timestamp>::deserialize(deserializer)?
                .map(truncate)
                .transpose()
        }
    }
}
