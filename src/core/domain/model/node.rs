//! Domain model for testbed nodes from the `/v1/resources/` endpoint.

use crate::core::domain::value_object::serde_helpers::unix_seconds;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A testbed node.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Node {
    /// Node id.
    pub id: u64,
    /// Host name of the node.
    #[serde(default)]
    pub hostname: String,
    /// Board model (e.g. "apu2d4").
    #[serde(default)]
    pub model: String,
    /// Site the node is installed at.
    #[serde(default)]
    pub site: String,
    /// Project the node belongs to.
    #[serde(default)]
    pub project: String,
    /// Current status (e.g. "active", "maintenance").
    #[serde(default)]
    pub status: String,
    /// Last time the node was seen.
    #[serde(
        default,
        deserialize_with = "unix_seconds::option::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub heartbeat: Option<u64>,
    /// Node type (e.g. "deployed", "testing"), when the scheduler reports one.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl Node {
    /// The node type, or `"undefined"` when the scheduler omits it.
    #[must_use]
    pub fn node_type(&self) -> &str {
        self.kind.as_deref().unwrap_or("undefined")
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Node ID={} Status={} Type={}",
            self.id,
            self.status,
            self.node_type()
        )
    }
}
