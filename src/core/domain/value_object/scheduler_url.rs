use crate::core::domain::error::ValidationError;
use std::fmt;

/// Default endpoint of the MONROE scheduler.
pub const DEFAULT_SCHEDULER_URL: &str = "https://scheduler.monroe-system.eu";

const MAX_URL_LENGTH: usize = 2083; // RFC 7230 practical limit
const ALLOWED_SCHEMES: [&str; 2] = ["https", "http"];

/// A validated scheduler base URL.
///
/// The base is stored without a trailing slash so that endpoint paths
/// (which always start with `/`) can be appended directly.
///
/// # Examples
///
/// ```
/// use monroe_scheduler::SchedulerUrl;
///
/// let url = SchedulerUrl::new("https://scheduler.example.org/").unwrap();
/// assert_eq!(url.endpoint("/v1/backend/auth"), "https://scheduler.example.org/v1/backend/auth");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerUrl(String);

impl SchedulerUrl {
    /// Validates and wraps a base URL.
    pub fn new(url: impl Into<String>) -> Result<Self, ValidationError> {
        let url = url.into();
        validate_url(&url)?;
        Ok(Self::new_unchecked(url))
    }

    /// Creates a new URL without validation.
    pub(crate) fn new_unchecked(url: String) -> Self {
        Self(url.trim_end_matches('/').to_string())
    }

    /// Returns the base URL as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Joins an endpoint path (with optional query string) onto the base.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.0, path.trim_start_matches('/'))
    }
}

impl Default for SchedulerUrl {
    fn default() -> Self {
        Self::new_unchecked(DEFAULT_SCHEDULER_URL.to_string())
    }
}

impl fmt::Display for SchedulerUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validates a scheduler base URL.
pub(crate) fn validate_url(url: &str) -> Result<(), ValidationError> {
    if url.is_empty() {
        return Err(ValidationError::Field {
            field: "url".to_string(),
            message: "URL cannot be empty".to_string(),
        });
    }

    if url.len() > MAX_URL_LENGTH {
        return Err(ValidationError::Format(format!(
            "URL exceeds maximum length of {} characters",
            MAX_URL_LENGTH
        )));
    }

    let parsed = url::Url::parse(url)
        .map_err(|e| ValidationError::Format(format!("Invalid URL format: {}", e)))?;

    if !ALLOWED_SCHEMES.contains(&parsed.scheme()) {
        return Err(ValidationError::ConstraintViolation(format!(
            "Invalid scheme. Must be one of: {}",
            ALLOWED_SCHEMES.join(", ")
        )));
    }

    if parsed.host_str().is_none() {
        return Err(ValidationError::Field {
            field: "url".to_string(),
            message: "URL must contain a host".to_string(),
        });
    }

    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(ValidationError::Format(
            "Base URL cannot carry a query or fragment".to_string(),
        ));
    }

    Ok(())
}
