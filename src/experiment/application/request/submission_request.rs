//! Translation of a draft into the body of `POST /v1/experiments`.

use crate::{
    CountryCode, Draft, NodeType, SchedulerError, SchedulerResult, ValidationError,
};
use serde::Serialize;
use serde_json::{Map, Value, json};

/// SSH tunnel server the experiment container connects back to.
pub const TUNNEL_SERVER: &str = "tunnel.monroe-system.eu";
pub const TUNNEL_SERVER_PORT: u16 = 29999;
pub const TUNNEL_SERVER_USER: &str = "tunnel";

/// The only recurrence kind the scheduler supports.
const RECURRENCE_KIND: &str = "simple";

/// Body of an experiment submission.
///
/// `options` is itself a JSON document encoded as a string, which is what
/// the scheduler expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionRequest {
    pub name: String,
    pub nodecount: u32,
    pub nodetypes: String,
    pub options: String,
    pub script: String,
    pub start: u64,
    pub stop: u64,
}

impl SubmissionRequest {
    /// Builds the request for a draft.
    ///
    /// # Errors
    /// Returns `SchedulerError::Conflict` when the draft has both an SSH key
    /// and a recurrence, since the tunnel cannot follow recurring runs.
    pub fn from_draft(draft: &Draft) -> SchedulerResult<Self> {
        let options = encode(&Value::Object(build_options(draft)?), "options")?;

        Ok(Self {
            name: draft.name().to_string(),
            nodecount: draft.node_count(),
            nodetypes: node_type_filter(draft.countries(), draft.node_type()),
            options,
            script: draft.script().to_string(),
            start: draft.start(),
            stop: draft.stop(),
        })
    }

    /// Encodes the request as the JSON text sent on the wire.
    pub fn to_json(&self) -> SchedulerResult<String> {
        encode(self, "request")
    }
}

/// Encoding failures are local, so they are validation errors.
fn encode<T: Serialize>(value: &T, what: &str) -> SchedulerResult<String> {
    serde_json::to_string(value).map_err(|e| {
        ValidationError::Format(format!("Failed to encode {}: {}", what, e)).into()
    })
}

/// Builds the node filter, e.g. `country:no|country:se,type:deployed`.
#[must_use]
pub fn node_type_filter(countries: &[CountryCode], node_type: NodeType) -> String {
    let mut filters = Vec::with_capacity(2);
    if !countries.is_empty() {
        let countries: Vec<String> = countries
            .iter()
            .map(|country| format!("country:{}", country))
            .collect();
        filters.push(countries.join("|"));
    }
    filters.push(node_type.tag().to_string());
    filters.join(",")
}

/// Builds the `options` object. Extra options are merged last and win
/// over the built-in keys.
pub fn build_options(draft: &Draft) -> SchedulerResult<Map<String, Value>> {
    if draft.ssh_public_key().is_some() && draft.recurrence().is_some() {
        return Err(SchedulerError::Conflict(
            "Cannot deploy an SSH tunnel with recurrent events".to_string(),
        ));
    }

    let mut options = Map::new();
    options.insert("traffic".to_string(), json!(draft.traffic_bytes()));
    options.insert("resultsQuota".to_string(), json!(draft.results_quota()));
    options.insert("shared".to_string(), json!(draft.shared_log_bytes()));
    options.insert("storage".to_string(), json!(draft.storage_bytes()));

    if let Some(recurrence) = draft.recurrence() {
        options.insert("recurrence".to_string(), json!(RECURRENCE_KIND));
        options.insert("period".to_string(), json!(recurrence.period()));
        options.insert("until".to_string(), json!(recurrence.until()));
    }

    if let Some(key) = draft.ssh_public_key() {
        options.insert(
            "ssh".to_string(),
            json!({
                "server": TUNNEL_SERVER,
                "server.port": TUNNEL_SERVER_PORT,
                "server.user": TUNNEL_SERVER_USER,
                "client.public": key.as_str(),
            }),
        );
    }

    if !draft.specific_nodes().is_empty() {
        options.insert(
            "nodes".to_string(),
            json!(join_ids(draft.specific_nodes(), ", ")),
        );
    }

    for (key, value) in draft.extra_options() {
        options.insert(key.clone(), value.clone());
    }

    Ok(options)
}

/// Node ids as text. The `nodes` option separates them with `", "`, the
/// slot search query with a bare `,`.
pub(crate) fn join_ids(ids: &[u64], separator: &str) -> String {
    ids.iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(separator)
}
