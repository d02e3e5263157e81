use std::time::Duration;

use tracing::info;

use crate::error::{Result, TransportError};
use crate::stream::PipeStream;
use crate::traits::Connector;

/// Pipe name the injected peer listens on.
pub const DEFAULT_PIPE_NAME: &str = "WowInjectPipe";

/// Platform-specific default endpoint.
///
/// Windows: `\\.\pipe\WowInjectPipe`.
/// Unix: `$TMPDIR/WowInjectPipe.sock`.
pub fn default_endpoint() -> String {
    #[cfg(windows)]
    {
        format!(r"\\.\pipe\{DEFAULT_PIPE_NAME}")
    }

    #[cfg(not(windows))]
    {
        std::env::temp_dir()
            .join(format!("{DEFAULT_PIPE_NAME}.sock"))
            .display()
            .to_string()
    }
}

/// A named endpoint that [`PipeStream`]s can be opened against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipeEndpoint {
    name: String,
}

impl PipeEndpoint {
    /// Endpoint with an explicit pipe name or socket path.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The name this endpoint opens.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Wait up to `timeout` for the endpoint, then open it for exclusive
    /// read/write (blocking).
    pub fn open(&self, timeout: Duration) -> Result<PipeStream> {
        if self.name.is_empty() {
            return Err(TransportError::InvalidName {
                name: self.name.clone(),
                reason: "endpoint name is empty".to_string(),
            });
        }

        #[cfg(unix)]
        let stream = crate::uds::connect(std::path::Path::new(&self.name), timeout)?;

        #[cfg(windows)]
        let stream = crate::windows::connect(&self.name, timeout)?;

        info!(endpoint = %self.name, transport = stream.transport_name(), "channel open");
        Ok(stream)
    }
}

impl Default for PipeEndpoint {
    fn default() -> Self {
        Self::new(default_endpoint())
    }
}

impl Connector for PipeEndpoint {
    type Channel = PipeStream;

    fn connect(&self, timeout: Duration) -> Result<PipeStream> {
        self.open(timeout)
    }

    fn endpoint(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_endpoint_uses_pipe_name() {
        let endpoint = PipeEndpoint::default();
        assert!(endpoint.name().contains(DEFAULT_PIPE_NAME));
        assert_eq!(endpoint.endpoint(), endpoint.name());
    }

    #[test]
    fn empty_name_is_rejected_before_io() {
        let endpoint = PipeEndpoint::new("");
        let result = endpoint.connect(Duration::from_millis(10));
        assert!(matches!(result, Err(TransportError::InvalidName { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn unavailable_socket_reports_timeout() {
        let path = std::env::temp_dir().join(format!(
            "castpipe-endpoint-missing-{}.sock",
            std::process::id()
        ));
        let endpoint = PipeEndpoint::new(path.display().to_string());
        let result = endpoint.connect(Duration::from_millis(60));
        assert!(matches!(result, Err(TransportError::Unavailable { .. })));
    }
}
