//! Waiting for a freshly provisioned container to accept connections.

use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::{Instant, sleep, timeout};
use tracing::{debug, info, warn};

/// Tries to connect to `host:port` every `interval` until one attempt
/// succeeds or `budget` has elapsed.
///
/// Returns `true` on the first successful connection. Each attempt is itself
/// bounded by `interval`, so the call never runs much longer than `budget`.
pub async fn wait_for_port(host: &str, port: u16, interval: Duration, budget: Duration) -> bool {
    let started = Instant::now();
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;
        match timeout(interval, TcpStream::connect((host, port))).await {
            Ok(Ok(_stream)) => {
                info!(host, port, attempts, "port is reachable");
                return true;
            }
            Ok(Err(err)) => debug!(host, port, attempts, %err, "connection attempt failed"),
            Err(_) => debug!(host, port, attempts, "connection attempt timed out"),
        }

        if started.elapsed() >= budget {
            warn!(host, port, attempts, "giving up, port never became reachable");
            return false;
        }
        sleep(interval).await;
    }
}
