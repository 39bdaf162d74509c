use crate::{
    Draft, NodeType,
    experiment::application::request::submission_request::{join_ids, node_type_filter},
};

/// Slot search endpoint of the scheduler.
pub const FIND_ENDPOINT: &str = "/v1/schedules/find";

/// Parameters of a slot search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityQuery {
    /// Length of the slot in seconds.
    pub duration: u64,
    pub nodecount: u32,
    /// Node filter, as built by [`node_type_filter`].
    pub nodetypes: String,
    /// Specific node ids; omitted from the query when empty.
    pub nodes: Vec<u64>,
    /// Earliest start; `0` for as soon as possible.
    pub start: u64,
}

impl Default for AvailabilityQuery {
    fn default() -> Self {
        Self {
            duration: 300,
            nodecount: 1,
            nodetypes: NodeType::Testing.tag().to_string(),
            nodes: Vec::new(),
            start: 0,
        }
    }
}

impl AvailabilityQuery {
    /// The search matching what `draft` would ask for if submitted now.
    #[must_use]
    pub fn from_draft(draft: &Draft) -> Self {
        Self {
            duration: draft.duration(),
            nodecount: draft.node_count(),
            nodetypes: node_type_filter(draft.countries(), draft.node_type()),
            nodes: draft.specific_nodes().to_vec(),
            start: draft.start(),
        }
    }

    /// Endpoint path with the encoded query string.
    #[must_use]
    pub fn to_endpoint(&self) -> String {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        query.append_pair("duration", &self.duration.to_string());
        query.append_pair("nodecount", &self.nodecount.to_string());
        if !self.nodes.is_empty() {
            query.append_pair("nodes", &join_ids(&self.nodes, ","));
        }
        query.append_pair("nodetypes", &self.nodetypes);
        query.append_pair("start", &self.start.to_string());
        format!("{}?{}", FIND_ENDPOINT, query.finish())
    }
}
