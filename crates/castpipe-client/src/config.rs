use std::time::Duration;

use castpipe_frame::DEFAULT_MAX_FRAME_SIZE;

/// Default wait for the endpoint to become available.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Default bound on a single request/response exchange.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Tunables for a [`ChannelClient`](crate::ChannelClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Pipe name (Windows) or socket path (Unix).
    pub endpoint: String,
    /// Wait for endpoint availability on connect and on reconnect.
    pub connect_timeout: Duration,
    /// Timeout used by accessors that don't set their own.
    pub request_timeout: Duration,
    /// Sleep between probes while nothing is available.
    pub poll_interval: Duration,
    /// Sleep after a transient read error.
    pub retry_interval: Duration,
    /// Upper bound on a single read.
    pub read_chunk_size: usize,
    /// Probe/read rounds spent discarding stale bytes after a timeout.
    pub drain_max_iterations: usize,
    /// Cap on buffered bytes without a terminator.
    pub max_frame_size: usize,
}

impl ClientConfig {
    /// Default configuration pointed at `endpoint`.
    pub fn for_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: castpipe_transport::default_endpoint(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            poll_interval: Duration::from_millis(10),
            retry_interval: Duration::from_millis(50),
            read_chunk_size: 4096,
            drain_max_iterations: 64,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }
}
