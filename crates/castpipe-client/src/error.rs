use std::time::Duration;

/// Errors that can occur in client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] castpipe_transport::TransportError),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] castpipe_frame::FrameError),

    /// The command has no entry in the response table.
    #[error("no response rule for command '{0}'")]
    UnknownCommand(String),

    /// No connection is held.
    #[error("not connected")]
    NotConnected,

    /// The peer closed the channel.
    #[error("peer disconnected: {0}")]
    Disconnected(String),

    /// No matching reply arrived in time.
    #[error("no reply to '{command}' within {timeout:?}")]
    Timeout { command: String, timeout: Duration },

    /// The peer answered with an error reply.
    #[error("peer reported failure for '{command}': {reply}")]
    PeerReported { command: String, reply: String },

    /// The reply matched but its payload was malformed.
    #[error("invalid reply: {0}")]
    Parse(#[from] ParseError),

    /// The caller passed an argument the peer cannot accept.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl ClientError {
    /// Whether this error dropped (or never established) the connection.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Frame(_) | Self::Disconnected(_)
        )
    }
}

/// Errors that can occur while parsing a reply payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("expected {expected} fields, got {got}")]
    FieldCount { expected: usize, got: usize },

    #[error("field '{field}' is not a number: '{value}'")]
    InvalidNumber { field: &'static str, value: String },

    #[error("reply does not start with '{expected}'")]
    MissingPrefix { expected: &'static str },

    #[error("malformed reply: {0}")]
    Malformed(String),

    #[error("reply payload is empty")]
    Empty,
}

pub type Result<T> = std::result::Result<T, ClientError>;
