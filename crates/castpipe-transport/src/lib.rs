//! Endpoint layer of the castpipe control channel.
//!
//! Opens the single named, full-duplex byte stream exposed by the injected
//! peer:
//! - Named pipes (Windows), e.g. `\\.\pipe\WowInjectPipe`
//! - Unix domain sockets (Linux/macOS), used for development peers
//!
//! Everything above this crate talks to the channel through the
//! [`PipeChannel`] and [`Connector`] traits, so tests can swap in a scripted
//! transport double.

pub mod endpoint;
pub mod error;
pub mod stream;
pub mod traits;

#[cfg(unix)]
pub mod uds;

#[cfg(windows)]
pub mod windows;

pub use endpoint::{default_endpoint, PipeEndpoint};
pub use error::{Result, TransportError};
pub use stream::PipeStream;
pub use traits::{Connector, PipeChannel};
