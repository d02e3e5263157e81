use std::time::Duration;

/// Errors that can occur while opening or using the control channel.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The endpoint did not become available within the wait budget.
    #[error("endpoint {name} not available after {timeout:?}")]
    Unavailable { name: String, timeout: Duration },

    /// The endpoint was available but could not be opened.
    #[error("failed to open {name}: {source}")]
    Connect {
        name: String,
        source: std::io::Error,
    },

    /// The endpoint name cannot be used on this platform.
    #[error("invalid endpoint name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },

    /// An I/O error occurred on an open channel.
    #[error("channel I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TransportError>;
