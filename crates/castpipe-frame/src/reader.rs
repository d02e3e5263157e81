use std::io::{ErrorKind, Read};

use bytes::BytesMut;
use tracing::trace;

use crate::codec::{decode_frame, Frame, FrameConfig, TERMINATOR};
use crate::error::{FrameError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 4 * 1024;

/// Accumulates bytes from the channel and splits them into frames.
///
/// The reader does not own the stream: the caller decides when a read is
/// safe (after probing for available bytes) and hands the stream in. Bytes
/// that follow a terminator are kept for the next [`next_frame`] call, so a
/// read that delivers more than one message loses nothing.
///
/// [`next_frame`]: FrameReader::next_frame
#[derive(Debug)]
pub struct FrameReader {
    buf: BytesMut,
    config: FrameConfig,
}

impl FrameReader {
    /// Create a new frame reader with default configuration.
    pub fn new() -> Self {
        Self::with_config(FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(config: FrameConfig) -> Self {
        Self {
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Perform one read of at most `limit` bytes from `src` and buffer them.
    ///
    /// Returns the number of bytes appended, which may be 0. `Interrupted`
    /// reads are retried; every other error is returned as-is.
    pub fn fill<R: Read + ?Sized>(&mut self, src: &mut R, limit: usize) -> Result<usize> {
        let mut chunk = vec![0u8; limit.max(1)];
        let read = loop {
            match src.read(&mut chunk) {
                Ok(n) => break n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        };

        self.buf.extend_from_slice(&chunk[..read]);
        trace!(read, buffered = self.buf.len(), "buffered channel bytes");

        if self.buf.len() > self.config.max_frame_size && !self.buf.contains(&TERMINATOR) {
            return Err(FrameError::FrameTooLarge {
                size: self.buf.len(),
                max: self.config.max_frame_size,
            });
        }

        Ok(read)
    }

    /// Take the next complete frame off the buffer, if there is one.
    pub fn next_frame(&mut self) -> Option<Frame> {
        decode_frame(&mut self.buf)
    }

    /// Number of buffered bytes not yet returned as frames.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Drop all buffered bytes. Returns how many were dropped.
    pub fn clear(&mut self) -> usize {
        let dropped = self.buf.len();
        self.buf.clear();
        dropped
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl Default for FrameReader {
    fn default() -> Self {
        Self::new()
    }
}
