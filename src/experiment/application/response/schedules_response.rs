use crate::{
    SchedulerError, SchedulerResult,
    core::{domain::model::schedule::ScheduleEntry, infrastructure::transport::decode},
    Schedule,
};
use serde::Deserialize;
use serde_json::Value;

/// Body of `GET /v1/experiments/{id}/schedules`.
///
/// Schedules arrive as an object keyed by schedule id.
#[derive(Debug, Deserialize)]
pub(crate) struct SchedulesResponse {
    #[serde(default)]
    schedules: Value,
}

impl SchedulesResponse {
    /// One [`Schedule`] per key, in the order the keys were received.
    pub(crate) fn into_schedules(self) -> SchedulerResult<Vec<Schedule>> {
        match self.schedules {
            Value::Object(map) => map
                .into_iter()
                .map(|(id, entry)| Ok(decode::<ScheduleEntry>(entry)?.into_schedule(id)))
                .collect(),
            Value::Null => Ok(Vec::new()),
            Value::Array(entries) if entries.is_empty() => Ok(Vec::new()),
            other => Err(SchedulerError::Connection(format!(
                "Unexpected schedules payload: {}",
                other
            ))),
        }
    }
}
