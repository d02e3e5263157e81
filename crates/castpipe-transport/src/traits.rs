use std::io::{self, Read, Write};
use std::time::Duration;

use crate::error::Result;

/// An open duplex byte channel to the peer.
///
/// On top of plain `Read + Write`, the channel must be able to report how
/// many bytes are waiting without consuming them, so the caller can poll
/// instead of blocking inside `read`.
pub trait PipeChannel: Read + Write {
    /// Bytes readable right now without blocking.
    ///
    /// `Ok(0)` means nothing is pending. A peer that closed its end is
    /// reported as an error of kind [`io::ErrorKind::BrokenPipe`].
    fn bytes_available(&mut self) -> io::Result<usize>;

    /// Close the channel. Called once before the channel is dropped.
    fn shutdown(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Opens channels to a named endpoint.
pub trait Connector {
    /// The channel type produced by a successful connect.
    type Channel: PipeChannel;

    /// Wait up to `timeout` for the endpoint and open it exclusively.
    fn connect(&self, timeout: Duration) -> Result<Self::Channel>;

    /// Endpoint name for diagnostics.
    fn endpoint(&self) -> &str;
}
