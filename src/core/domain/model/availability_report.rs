//! Results of the `/v1/schedules/find` endpoint.

use crate::core::domain::value_object::serde_helpers::unix_seconds;
use chrono::DateTime;
use serde::Deserialize;
use std::fmt;

/// The first slot the scheduler could find for a resource request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AvailabilityReport {
    /// Start of the slot.
    #[serde(with = "unix_seconds")]
    pub start: u64,
    /// End of the slot.
    #[serde(with = "unix_seconds")]
    pub stop: u64,
    /// Latest stop the slot could be extended to.
    #[serde(with = "unix_seconds")]
    pub max_stop: u64,
    /// Node count that was asked for.
    pub nodecount: u32,
    /// Largest node count available for the slot.
    pub max_nodecount: u32,
    /// Node filter the slot was searched with.
    pub nodetypes: String,
}

impl AvailabilityReport {
    /// Whether the slot is on testing nodes.
    #[must_use]
    pub fn testing(&self) -> bool {
        self.nodetypes == "type:testing"
    }
}

impl fmt::Display for AvailabilityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Available slot starting at {}", render(self.start))?;
        writeln!(f, "Finishing at {}", render(self.stop))?;
        writeln!(f, "The experiment could use up to {} nodes", self.max_nodecount)?;
        write!(
            f,
            "The experiment may be delayed or the slot extended until {}",
            render(self.max_stop)
        )
    }
}

/// Answer to an availability query.
#[derive(Debug, Clone, PartialEq)]
pub enum AvailabilityOutcome {
    /// A slot exists.
    Available(AvailabilityReport),
    /// No slot exists; the scheduler's explanation.
    Unavailable(String),
}

impl AvailabilityOutcome {
    #[must_use]
    pub fn report(&self) -> Option<&AvailabilityReport> {
        match self {
            AvailabilityOutcome::Available(report) => Some(report),
            AvailabilityOutcome::Unavailable(_) => None,
        }
    }
}

fn render(timestamp: u64) -> String {
    i64::try_from(timestamp)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map_or_else(
            || timestamp.to_string(),
            |dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        )
}
