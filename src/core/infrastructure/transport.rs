//! The seam between the scheduler logic and HTTP.

use crate::core::domain::error::{SchedulerError, SchedulerResult};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// The four operations the scheduler client needs from the network.
///
/// Paths are endpoint paths relative to the scheduler base URL (they start
/// with `/` and may carry a query string). [`crate::ApiClient`] is the
/// reqwest implementation; anything honouring this contract can replace it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET and decode the JSON body. Non-2xx is an error.
    async fn get(&self, path: &str) -> SchedulerResult<Value>;

    /// POST a JSON body and return the response text, whatever the status.
    async fn post(&self, path: &str, body: String) -> SchedulerResult<String>;

    /// DELETE and decode the JSON body. Non-2xx is an error.
    async fn delete(&self, path: &str) -> SchedulerResult<Value>;

    /// Download the tree below `path` into `prefix`, dropping the first
    /// remote path segment. Returns the files written.
    async fn download(&self, path: &str, prefix: &Path) -> SchedulerResult<Vec<PathBuf>>;
}

/// GET `path` and deserialize it into `T`.
pub(crate) async fn get_as<T>(transport: &dyn Transport, path: &str) -> SchedulerResult<T>
where
    T: DeserializeOwned,
{
    decode(transport.get(path).await?)
}

/// Deserialize a JSON value returned by a transport.
pub(crate) fn decode<T>(value: Value) -> SchedulerResult<T>
where
    T: DeserializeOwned,
{
    serde_json::from_value(value)
        .map_err(|e| SchedulerError::Connection(format!("Failed to parse response: {}", e)))
}

/// The `message` field of a JSON object, if there is one.
pub(crate) fn message_of(value: &Value) -> Option<&str> {
    value.get("message").and_then(Value::as_str)
}
