use crate::core::domain::value_object::serde_helpers::unix_seconds;
use serde::Deserialize;
use std::fmt;

/// A node/time-slot allocation belonging to a submitted experiment.
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    /// Schedule id, as keyed by the scheduler.
    pub id: String,
    pub node_id: u64,
    pub start: u64,
    pub stop: u64,
    pub status: String,
}

/// A schedule as it appears inside the `schedules` mapping, without its key.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct ScheduleEntry {
    #[serde(rename = "nodeid")]
    pub node_id: u64,
    #[serde(with = "unix_seconds")]
    pub start: u64,
    #[serde(with = "unix_seconds")]
    pub stop: u64,
    #[serde(default)]
    pub status: String,
}

impl ScheduleEntry {
    pub(crate) fn into_schedule(self, id: String) -> Schedule {
        Schedule {
            id,
            node_id: self.node_id,
            start: self.start,
            stop: self.stop,
            status: self.status,
        }
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Schedule ID={} Node ID={}", self.id, self.node_id)
    }
}
