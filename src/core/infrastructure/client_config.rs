//! Client-side configuration.

use std::num::NonZeroU32;
use std::time::Duration;

/// Number of experiments returned by [`crate::SchedulerClient::recent_experiments`].
pub const DEFAULT_EXPERIMENT_HISTORY: usize = 50;

/// Settings shared by every request a client makes.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Upper bound for a single HTTP request, downloads included.
    pub request_timeout: Duration,
    /// Client-side rate limit. `None` disables it.
    pub rate_limit: Option<RateLimitConfig>,
    /// How many experiments `recent_experiments` keeps.
    pub experiment_history: usize,
    /// Where experiment containers expose their SSH tunnel.
    pub tunnel: TunnelConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(60),
            rate_limit: None,
            experiment_history: DEFAULT_EXPERIMENT_HISTORY,
            tunnel: TunnelConfig::default(),
        }
    }
}

/// Token bucket limits for outgoing requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub requests_per_second: NonZeroU32,
    pub burst_size: NonZeroU32,
}

/// The SSH tunnel server in front of experiment containers.
///
/// A container on node `n` is reachable on port `port_base + n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TunnelConfig {
    /// Host name used in the `ssh` command line.
    pub host: String,
    /// Address probed for reachability.
    pub address: String,
    pub port_base: u16,
    /// Pause between two connection attempts.
    pub probe_interval: Duration,
    /// Give up probing after this long.
    pub probe_budget: Duration,
}

impl Default for TunnelConfig {
    fn default() -> Self {
        Self {
            host: "tunnel.monroe-system.eu".to_string(),
            address: "193.10.227.35".to_string(),
            port_base: 30000,
            probe_interval: Duration::from_secs(1),
            probe_budget: Duration::from_secs(180),
        }
    }
}
