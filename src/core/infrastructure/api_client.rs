//! Internal HTTP client that authenticates every request with the client certificate.

use crate::{
    SchedulerConnection, SchedulerError, SchedulerResult,
    core::infrastructure::{
        client_config::ClientConfig,
        transport::{Transport, message_of},
    },
};
use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota};
use regex::Regex;
use reqwest::{
    Client, Method, Response,
    header::{ACCEPT, CONTENT_TYPE},
};
use serde_json::Value;
use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};
use tracing::{debug, warn};

/// File name used for directory URLs that are not HTML listings.
const DIRECTORY_INDEX: &str = "index.html";

/// Link targets of an HTML listing, without fragment or query.
const HREF_PATTERN: &str = r#"(?i)href\s*=\s*["']([^"'#?]+)["']"#;

static HREF: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(HREF_PATTERN).ok());

/// HTTP client for the scheduler REST API.
///
/// Each call is an independent request authenticated by mutual TLS; there is
/// no session and nothing is retried. If a rate limit is configured, requests
/// wait for capacity before being sent.
#[derive(Debug)]
pub struct ApiClient {
    http_client: Client,
    connection: Arc<SchedulerConnection>,
    rate_limiter: Option<Arc<DefaultDirectRateLimiter>>,
}

impl ApiClient {
    /// Creates a new `ApiClient`.
    ///
    /// # Errors
    /// Returns `SchedulerError::Authentication` if the certificate or key is
    /// rejected by the TLS backend, and `SchedulerError::Connection` if the
    /// HTTP client cannot be built.
    pub fn new(connection: SchedulerConnection, config: &ClientConfig) -> SchedulerResult<Self> {
        let mut builder = Client::builder()
            .timeout(config.request_timeout)
            .danger_accept_invalid_certs(connection.accepts_invalid_certs());

        if connection.accepts_invalid_certs() {
            warn!("TLS certificate verification is disabled; use only for development");
        }

        if let Some(identity) = connection.identity() {
            builder = builder.identity(identity.to_reqwest_identity()?);
        }

        if let Some(pem) = connection.ca_certificate() {
            let certificate = reqwest::Certificate::from_pem(pem).map_err(|e| {
                SchedulerError::Connection(format!("Invalid CA certificate: {}", e))
            })?;
            builder = builder.add_root_certificate(certificate);
        }

        let http_client = builder
            .build()
            .map_err(|e| SchedulerError::Connection(e.to_string()))?;

        let rate_limiter = config.rate_limit.map(|rl| {
            let quota = Quota::per_second(rl.requests_per_second).allow_burst(rl.burst_size);
            Arc::new(DefaultDirectRateLimiter::direct(quota))
        });

        Ok(Self {
            http_client,
            connection: Arc::new(connection),
            rate_limiter,
        })
    }

    /// Returns a reference to the underlying connection details.
    pub fn connection(&self) -> &SchedulerConnection {
        &self.connection
    }

    /// Sends one request. Only failures to get any response are errors here.
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<String>,
    ) -> SchedulerResult<Response> {
        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }

        let url = self.connection.url().endpoint(path);
        debug!(%method, %url, "sending scheduler request");

        let mut request = self
            .http_client
            .request(method, &url)
            .header(ACCEPT, "application/json");
        if let Some(body) = body {
            request = request.header(CONTENT_TYPE, "application/json").body(body);
        }

        request
            .send()
            .await
            .map_err(|e| SchedulerError::Connection(format!("HTTP request failed: {}", e)))
    }

    /// Turns a non-2xx response into `SchedulerError::Api` carrying the
    /// server's message.
    async fn ensure_success(response: Response) -> SchedulerResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let body = serde_json::from_str::<Value>(text.trim()).ok();
        let message = error_message(&text, body.as_ref())
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string());
        warn!(status = status.as_u16(), %message, "scheduler returned an error");
        Err(SchedulerError::Api {
            status: status.as_u16(),
            message,
            body,
        })
    }

    async fn parse_json(response: Response) -> SchedulerResult<Value> {
        response
            .json::<Value>()
            .await
            .map_err(|e| SchedulerError::Connection(format!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl Transport for ApiClient {
    async fn get(&self, path: &str) -> SchedulerResult<Value> {
        let response = Self::ensure_success(self.send(Method::GET, path, None).await?).await?;
        Self::parse_json(response).await
    }

    async fn post(&self, path: &str, body: String) -> SchedulerResult<String> {
        let response = self.send(Method::POST, path, Some(body)).await?;
        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), path, "scheduler rejected POST");
        }
        response
            .text()
            .await
            .map_err(|e| SchedulerError::Connection(format!("Failed to read response: {}", e)))
    }

    async fn delete(&self, path: &str) -> SchedulerResult<Value> {
        let response = Self::ensure_success(self.send(Method::DELETE, path, None).await?).await?;
        Self::parse_json(response).await
    }

    async fn download(&self, path: &str, prefix: &Path) -> SchedulerResult<Vec<PathBuf>> {
        let root = if path.ends_with('/') {
            path.to_string()
        } else {
            format!("{}/", path)
        };

        let mut pending = VecDeque::from([root.clone()]);
        let mut seen = HashSet::from([root.clone()]);
        let mut written = Vec::new();

        while let Some(current) = pending.pop_front() {
            let response =
                Self::ensure_success(self.send(Method::GET, &current, None).await?).await?;

            if current.ends_with('/') && is_html(&response) {
                let listing = response.text().await.map_err(|e| {
                    SchedulerError::Connection(format!("Failed to read listing: {}", e))
                })?;
                for link in listing_links(&listing, &current, &root) {
                    if seen.insert(link.clone()) {
                        pending.push_back(link);
                    }
                }
                continue;
            }

            let bytes = response.bytes().await.map_err(|e| {
                SchedulerError::Connection(format!("Failed to read {}: {}", current, e))
            })?;
            let target = local_path(prefix, &current)?;
            if let Some(parent) = target.parent() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    SchedulerError::Download(format!("Cannot create {}: {}", parent.display(), e))
                })?;
            }
            tokio::fs::write(&target, &bytes).await.map_err(|e| {
                SchedulerError::Download(format!("Cannot write {}: {}", target.display(), e))
            })?;
            debug!(remote = %current, local = %target.display(), "downloaded result file");
            written.push(target);
        }

        Ok(written)
    }
}

fn error_message(text: &str, body: Option<&Value>) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(
        body.and_then(message_of)
            .map_or_else(|| trimmed.to_string(), str::to_string),
    )
}

fn is_html(response: &Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("text/html"))
}

/// Links of a directory listing that stay below `root`, as absolute paths.
fn listing_links(listing: &str, current: &str, root: &str) -> Vec<String> {
    let Some(href) = HREF.as_ref() else {
        return Vec::new();
    };
    href.captures_iter(listing)
        .filter_map(|captures| captures.get(1).map(|m| m.as_str()))
        .filter(|link| !link.contains("://"))
        .map(|link| {
            if link.starts_with('/') {
                link.to_string()
            } else {
                format!("{}{}", current, link.trim_start_matches("./"))
            }
        })
        .filter(|link| {
            link.starts_with(root)
                && link != current
                && !link.split('/').any(|segment| segment == "..")
        })
        .collect()
}

/// Maps `/user/<schedule>/a/b` to `prefix/<schedule>/a/b`.
fn local_path(prefix: &Path, remote: &str) -> SchedulerResult<PathBuf> {
    let mut target = prefix.to_path_buf();
    for segment in remote.split('/').filter(|s| !s.is_empty()).skip(1) {
        if segment == ".." || segment == "." {
            return Err(SchedulerError::Download(format!(
                "Refusing to write outside the results directory: {}",
                remote
            )));
        }
        target.push(segment);
    }
    if remote.ends_with('/') {
        target.push(DIRECTORY_INDEX);
    }
    Ok(target)
}
