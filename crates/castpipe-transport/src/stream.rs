use std::io::{self, Read, Write};

use crate::traits::PipeChannel;

/// A connected control channel, readable and writable.
///
/// On Unix, this wraps a Unix domain socket stream.
/// On Windows, this wraps a named pipe client handle.
pub struct PipeStream {
    inner: PipeStreamInner,
}

enum PipeStreamInner {
    #[cfg(unix)]
    Unix(std::os::unix::net::UnixStream),
    #[cfg(windows)]
    Pipe(std::fs::File),
}

impl Read for PipeStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.inner {
            #[cfg(unix)]
            PipeStreamInner::Unix(stream) => stream.read(buf),
            #[cfg(windows)]
            PipeStreamInner::Pipe(file) => file.read(buf),
        }
    }
}

impl Write for PipeStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &mut self.inner {
            #[cfg(unix)]
            PipeStreamInner::Unix(stream) => stream.write(buf),
            #[cfg(windows)]
            PipeStreamInner::Pipe(file) => file.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut self.inner {
            #[cfg(unix)]
            PipeStreamInner::Unix(stream) => stream.flush(),
            #[cfg(windows)]
            PipeStreamInner::Pipe(file) => file.flush(),
        }
    }
}

impl PipeChannel for PipeStream {
    fn bytes_available(&mut self) -> io::Result<usize> {
        match &self.inner {
            #[cfg(unix)]
            PipeStreamInner::Unix(stream) => crate::uds::peek_available(stream),
            #[cfg(windows)]
            PipeStreamInner::Pipe(file) => crate::windows::peek_available(file),
        }
    }

    fn shutdown(&mut self) -> io::Result<()> {
        match &self.inner {
            #[cfg(unix)]
            PipeStreamInner::Unix(stream) => match stream.shutdown(std::net::Shutdown::Both) {
                // Peer already gone; nothing left to close.
                Err(err) if err.kind() == io::ErrorKind::NotConnected => Ok(()),
                other => other,
            },
            // The handle is closed when the file is dropped.
            #[cfg(windows)]
            PipeStreamInner::Pipe(_) => Ok(()),
        }
    }
}

impl PipeStream {
    /// Create a PipeStream from a Unix domain socket stream.
    #[cfg(unix)]
    pub(crate) fn from_unix(stream: std::os::unix::net::UnixStream) -> Self {
        Self {
            inner: PipeStreamInner::Unix(stream),
        }
    }

    /// Create a PipeStream from an opened named pipe client handle.
    #[cfg(windows)]
    pub(crate) fn from_pipe(file: std::fs::File) -> Self {
        Self {
            inner: PipeStreamInner::Pipe(file),
        }
    }

    /// Transport name for diagnostics.
    pub fn transport_name(&self) -> &'static str {
        match &self.inner {
            #[cfg(unix)]
            PipeStreamInner::Unix(_) => "unix-domain-socket",
            #[cfg(windows)]
            PipeStreamInner::Pipe(_) => "named-pipe",
        }
    }
}

impl std::fmt::Debug for PipeStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipeStream")
            .field("type", &self.transport_name())
            .finish()
    }
}
