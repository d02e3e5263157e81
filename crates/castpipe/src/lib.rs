//! Named-pipe control client for an injected game automation peer.
//!
//! castpipe drives a game process through the text command channel exposed by
//! a component injected into it: connect to the pipe, send a null-terminated
//! command, wait for the reply that carries the expected prefix.
//!
//! # Crate Structure
//!
//! - [`transport`]: endpoint wait/open and the non-blocking availability probe
//! - [`frame`]: null-terminated text framing
//! - [`client`]: request/response correlation and typed game accessors

/// Re-export transport types.
pub mod transport {
    pub use castpipe_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use castpipe_frame::*;
}

/// Re-export client types.
pub mod client {
    pub use castpipe_client::*;
}

pub use castpipe_client::{ChannelClient, ClientConfig, ClientError, GameInterface, SharedClient};
