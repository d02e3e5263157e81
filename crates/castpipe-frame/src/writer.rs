use std::io::{ErrorKind, Write};

use bytes::BytesMut;
use tracing::trace;

use crate::codec::encode_frame;
use crate::error::{FrameError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 1024;

/// Encodes messages and writes each one to the channel in a single write.
///
/// The peer expects a request to arrive whole. A write that is accepted only
/// partially is reported as [`FrameError::ShortWrite`] rather than resumed,
/// since the peer may already have acted on the fragment.
#[derive(Debug)]
pub struct FrameWriter {
    buf: BytesMut,
}

impl FrameWriter {
    /// Create a new frame writer.
    pub fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
        }
    }

    /// Encode `message` and write it (blocking). Returns the bytes written,
    /// terminator included.
    pub fn send<W: Write + ?Sized>(&mut self, dst: &mut W, message: &str) -> Result<usize> {
        self.buf.clear();
        encode_frame(message, &mut self.buf);
        let expected = self.buf.len();

        let written = loop {
            match dst.write(&self.buf) {
                Ok(n) => break n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        };

        if written == 0 {
            return Err(FrameError::ConnectionClosed);
        }
        if written != expected {
            return Err(FrameError::ShortWrite { written, expected });
        }

        loop {
            match dst.flush() {
                Ok(()) => break,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }

        trace!(bytes = written, "frame written");
        Ok(written)
    }
}

impl Default for FrameWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_message_with_terminator() {
        let mut writer = FrameWriter::new();
        let mut out = Vec::new();

        let written = writer.send(&mut out, "GET_TIME_MS").unwrap();
        assert_eq!(written, 12);
        assert_eq!(out, b"GET_TIME_MS\0");
    }

    #[test]
    fn consecutive_sends_do_not_leak_previous_bytes() {
        let mut writer = FrameWriter::new();
        let mut out = Vec::new();

        writer.send(&mut out, "GET_CD:53").unwrap();
        writer.send(&mut out, "ping").unwrap();
        assert_eq!(out, b"GET_CD:53\0ping\0");
    }

    #[test]
    fn empty_message_is_just_terminator() {
        let mut writer = FrameWriter::new();
        let mut out = Vec::new();
        assert_eq!(writer.send(&mut out, "").unwrap(), 1);
        assert_eq!(out, b"\0");
    }

    #[test]
    fn zero_write_reports_connection_closed() {
        let mut writer = FrameWriter::new();
        let err = writer.send(&mut ZeroWriter, "ping").unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[test]
    fn partial_write_is_not_resumed() {
        let mut writer = FrameWriter::new();
        let mut dst = PartialWriter {
            accept: 3,
            data: Vec::new(),
        };

        let err = writer.send(&mut dst, "GET_COMBO_POINTS").unwrap_err();
        assert!(matches!(
            err,
            FrameError::ShortWrite {
                written: 3,
                expected: 17
            }
        ));
        assert_eq!(dst.data, b"GET");
    }

    #[test]
    fn interrupted_write_retries() {
        let mut writer = FrameWriter::new();
        let mut dst = InterruptedThenWrite {
            interrupted: false,
            data: Vec::new(),
        };

        writer.send(&mut dst, "ping").unwrap();
        assert_eq!(dst.data, b"ping\0");
    }

    #[test]
    fn broken_pipe_propagates() {
        let mut writer = FrameWriter::new();
        let err = writer.send(&mut BrokenWriter, "ping").unwrap_err();
        assert!(matches!(err, FrameError::Io(e) if e.kind() == ErrorKind::BrokenPipe));
    }

    #[test]
    fn flush_error_propagates() {
        let mut writer = FrameWriter::new();
        let err = writer.send(&mut FlushFails, "ping").unwrap_err();
        assert!(matches!(err, FrameError::Io(e) if e.kind() == ErrorKind::Other));
    }

    struct ZeroWriter;

    impl Write for ZeroWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct PartialWriter {
        accept: usize,
        data: Vec<u8>,
    }

    impl Write for PartialWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            let n = self.accept.min(buf.len());
            self.data.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct InterruptedThenWrite {
        interrupted: bool,
        data: Vec<u8>,
    }

    impl Write for InterruptedThenWrite {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct BrokenWriter;

    impl Write for BrokenWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct FlushFails;

    impl Write for FlushFails {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::Error::other("flush failed"))
        }
    }
}
