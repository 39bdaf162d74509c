use crate::{
    SubmissionReport,
    core::infrastructure::transport::{decode, message_of},
};
use serde_json::Value;

/// Marker the scheduler uses when it cannot fit the request.
pub const ALLOCATION_FAILURE: &str = "Could not allocate";

/// Shown when the scheduler's answer carries no usable message.
pub const FALLBACK_MESSAGE: &str = "Something went wrong. Check the experiment availability.";

/// Interprets the raw text answer to a submission.
///
/// `Err` carries the message explaining why the scheduler refused it.
pub(crate) fn interpret(body: &str) -> Result<SubmissionReport, String> {
    let Some(value) = parse_body(body) else {
        let text = body.trim();
        let message = if text.is_empty() || text.starts_with('<') {
            FALLBACK_MESSAGE.to_string()
        } else {
            text.to_string()
        };
        return Err(message);
    };

    let message = message_of(&value).map(str::to_string);
    if let Some(message) = &message {
        if message.contains(ALLOCATION_FAILURE) {
            return Err(message.clone());
        }
    }

    decode::<SubmissionReport>(value)
        .map_err(|_| message.unwrap_or_else(|| FALLBACK_MESSAGE.to_string()))
}

/// The scheduler sometimes appends non-JSON noise after a `--` separator.
fn parse_body(body: &str) -> Option<Value> {
    serde_json::from_str(body.trim()).ok().or_else(|| {
        body.split("--")
            .next()
            .and_then(|head| serde_json::from_str(head.trim()).ok())
    })
}
