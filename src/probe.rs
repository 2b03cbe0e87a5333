//! Connectivity probing.
//!
//! A cheap, advisory reachability check used to short-circuit login attempts
//! when the device is already online. A false positive just skips an attempt;
//! a false negative costs one harmless extra POST.

use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

/// Bounded timeout per probe target.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Well-known public DNS resolvers. A TCP connect on port 53 succeeding
/// against any of them is taken as "online".
const PROBE_TARGETS: &[&str] = &["1.1.1.1:53", "8.8.8.8:53"];

/// Best-effort connectivity prober. Never errors.
#[derive(Debug, Clone)]
pub struct ConnectivityProbe {
    timeout: Duration,
}

impl Default for ConnectivityProbe {
    fn default() -> Self {
        Self {
            timeout: PROBE_TIMEOUT,
        }
    }
}

impl ConnectivityProbe {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Whether the device appears to have internet connectivity.
    pub async fn is_online(&self) -> bool {
        for target in PROBE_TARGETS {
            if self.reachable(target).await {
                return true;
            }
        }
        false
    }

    /// Whether `addr` (host:port) accepts a TCP connection within the
    /// configured timeout. Every failure path maps to `false`.
    pub async fn reachable(&self, addr: &str) -> bool {
        match timeout(self.timeout, TcpStream::connect(addr)).await {
            Ok(Ok(_)) => {
                debug!(target = addr, "Probe target reachable");
                true
            }
            Ok(Err(e)) => {
                debug!(target = addr, error = %e, "Probe target unreachable");
                false
            }
            Err(_) => {
                debug!(target = addr, timeout = ?self.timeout, "Probe timed out");
                false
            }
        }
    }
}
