use crate::{
    AvailabilityOutcome, AvailabilityReport, SchedulerError, SchedulerResult,
    core::infrastructure::transport::{Transport, decode, message_of},
    experiment::application::request::availability_query::AvailabilityQuery,
};
use serde_json::Value;
use tracing::debug;

/// Shown when the scheduler returns no slot and no explanation.
pub const NO_SLOT_MESSAGE: &str = "No slot available for the requested resources";

/// Asks the scheduler for the first slot matching a query.
pub struct AvailabilityService;

impl AvailabilityService {
    pub fn new() -> Self {
        Self
    }

    /// Runs the query.
    ///
    /// An empty result list, or an object carrying only a `message`, is
    /// reported as [`AvailabilityOutcome::Unavailable`]. So is a 4xx reply
    /// whose JSON body has a `message`. Other transport errors are returned
    /// unchanged.
    pub async fn execute(
        &self,
        transport: &dyn Transport,
        query: &AvailabilityQuery,
    ) -> SchedulerResult<AvailabilityOutcome> {
        let response = match transport.get(&query.to_endpoint()).await {
            Ok(response) => response,
            Err(SchedulerError::Api {
                status: 400..=499,
                body: Some(body),
                ..
            }) if message_of(&body).is_some() => body,
            Err(e) => return Err(e),
        };
        let outcome = Self::interpret(response)?;
        debug!(
            available = outcome.report().is_some(),
            duration = query.duration,
            nodecount = query.nodecount,
            "availability checked"
        );
        Ok(outcome)
    }

    fn interpret(response: Value) -> SchedulerResult<AvailabilityOutcome> {
        match response {
            Value::Array(entries) => match entries.into_iter().next() {
                Some(first) => Ok(AvailabilityOutcome::Available(decode::<AvailabilityReport>(
                    first,
                )?)),
                None => Ok(AvailabilityOutcome::Unavailable(NO_SLOT_MESSAGE.to_string())),
            },
            other => match message_of(&other) {
                Some(message) => Ok(AvailabilityOutcome::Unavailable(message.to_string())),
                None => Err(SchedulerError::Connection(format!(
                    "Unexpected availability response: {}",
                    other
                ))),
            },
        }
    }
}

impl Default for AvailabilityService {
    fn default() -> Self {
        Self::new()
    }
}
