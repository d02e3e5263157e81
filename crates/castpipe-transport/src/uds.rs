use std::io::{self, ErrorKind};
use std::os::fd::AsRawFd;
use std::os::unix::net::UnixStream;
use std::path::Path;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::{Result, TransportError};
use crate::stream::PipeStream;

/// Pause between connect attempts while the peer has not bound its socket.
const CONNECT_RETRY_INTERVAL: Duration = Duration::from_millis(50);

/// Size of the scratch buffer handed to `recv(MSG_PEEK)`.
const PEEK_PROBE_SIZE: usize = 4096;

/// Maximum socket path length.
/// Unix `sockaddr_un.sun_path` is typically 108 bytes on Linux, 104 on macOS.
#[cfg(target_os = "linux")]
pub const MAX_PATH_LEN: usize = 108;
#[cfg(not(target_os = "linux"))]
pub const MAX_PATH_LEN: usize = 104;

/// Wait for a Unix domain socket endpoint and connect to it.
///
/// The socket counts as "not yet available" while connecting fails with
/// `NotFound` (nothing bound at the path) or `ConnectionRefused` (stale
/// socket file, peer not listening). Any other failure is reported at once.
///
/// Unix sockets cannot refuse a second client, so the exclusive-access
/// guarantee of the Windows pipe is not enforced here.
pub fn connect(path: &Path, timeout: Duration) -> Result<PipeStream> {
    let path_len = path.as_os_str().len();
    if path_len >= MAX_PATH_LEN {
        return Err(TransportError::InvalidName {
            name: path.display().to_string(),
            reason: format!("socket path too long ({path_len} bytes, max {MAX_PATH_LEN})"),
        });
    }

    let deadline = Instant::now() + timeout;
    loop {
        match UnixStream::connect(path) {
            Ok(stream) => {
                debug!(?path, "connected to unix domain socket");
                return Ok(PipeStream::from_unix(stream));
            }
            Err(err) if is_not_yet_available(&err) => {
                let now = Instant::now();
                if now >= deadline {
                    return Err(TransportError::Unavailable {
                        name: path.display().to_string(),
                        timeout,
                    });
                }
                std::thread::sleep(CONNECT_RETRY_INTERVAL.min(deadline - now));
            }
            Err(err) => {
                return Err(TransportError::Connect {
                    name: path.display().to_string(),
                    source: err,
                });
            }
        }
    }
}

fn is_not_yet_available(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::NotFound | ErrorKind::ConnectionRefused
    )
}

/// Count readable bytes without consuming them.
///
/// `recv` with `MSG_PEEK | MSG_DONTWAIT` returns the pending byte count
/// (capped at the probe size), `0` once the peer has closed its end, and
/// `EAGAIN` when nothing is pending.
pub(crate) fn peek_available(stream: &UnixStream) -> io::Result<usize> {
    let fd = stream.as_raw_fd();
    let mut probe = [0u8; PEEK_PROBE_SIZE];

    // SAFETY: `probe` is a valid writable buffer of `probe.len()` bytes and
    // `fd` is an open socket descriptor owned by `stream` for this call.
    let rc = unsafe {
        libc::recv(
            fd,
            probe.as_mut_ptr().cast::<libc::c_void>(),
            probe.len(),
            libc::MSG_PEEK | libc::MSG_DONTWAIT,
        )
    };

    if rc > 0 {
        return Ok(rc as usize);
    }
    if rc == 0 {
        return Err(io::Error::new(
            ErrorKind::BrokenPipe,
            "peer closed the channel",
        ));
    }

    let err = io::Error::last_os_error();
    if err.kind() == ErrorKind::WouldBlock {
        Ok(0)
    } else {
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::os::unix::net::UnixListener;
    use std::path::PathBuf;

    use super::*;
    use crate::traits::PipeChannel;

    fn make_sock_path(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "castpipe-uds-{}-{}-{}",
            tag,
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("time should be after epoch")
                .as_nanos()
        ));
        std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
        dir.join("peer.sock")
    }

    #[test]
    fn connect_and_exchange_bytes() {
        let sock_path = make_sock_path("exchange");
        let listener = UnixListener::bind(&sock_path).unwrap();

        let server = std::thread::spawn(move || {
            let (mut peer, _) = listener.accept().unwrap();
            let mut buf = [0u8; 5];
            peer.read_exact(&mut buf).unwrap();
            assert_eq!(&buf, b"ping\0");
            peer.write_all(b"PONG\0").unwrap();
        });

        let mut stream = connect(&sock_path, Duration::from_secs(1)).unwrap();
        stream.write_all(b"ping\0").unwrap();
        let mut buf = [0u8; 5];
        stream.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"PONG\0");

        server.join().unwrap();
        let _ = std::fs::remove_dir_all(sock_path.parent().unwrap());
    }

    #[test]
    fn waits_for_late_listener() {
        let sock_path = make_sock_path("late");
        let path_clone = sock_path.clone();

        let server = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(120));
            let listener = UnixListener::bind(&path_clone).unwrap();
            let _ = listener.accept().unwrap();
        });

        let stream = connect(&sock_path, Duration::from_secs(2));
        assert!(stream.is_ok());

        server.join().unwrap();
        let _ = std::fs::remove_dir_all(sock_path.parent().unwrap());
    }

    #[test]
    fn missing_endpoint_times_out() {
        let sock_path = make_sock_path("missing");
        let started = Instant::now();
        let result = connect(&sock_path, Duration::from_millis(100));

        assert!(matches!(result, Err(TransportError::Unavailable { .. })));
        assert!(started.elapsed() >= Duration::from_millis(100));
        let _ = std::fs::remove_dir_all(sock_path.parent().unwrap());
    }

    #[test]
    fn path_too_long_is_rejected() {
        let long_path = PathBuf::from("/tmp/".to_string() + &"a".repeat(200) + ".sock");
        let result = connect(&long_path, Duration::from_millis(10));
        assert!(matches!(result, Err(TransportError::InvalidName { .. })));
    }

    #[test]
    fn peek_reports_pending_bytes_without_consuming() {
        let (left, right) = UnixStream::pair().unwrap();
        let mut reader = PipeStream::from_unix(right);
        let mut writer = left;

        assert_eq!(reader.bytes_available().unwrap(), 0);

        writer.write_all(b"CP:3\0").unwrap();
        assert_eq!(reader.bytes_available().unwrap(), 5);
        assert_eq!(reader.bytes_available().unwrap(), 5);

        let mut buf = [0u8; 5];
        reader.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"CP:3\0");
        assert_eq!(reader.bytes_available().unwrap(), 0);
    }

    #[test]
    fn peek_reports_broken_pipe_after_peer_closes() {
        let (left, right) = UnixStream::pair().unwrap();
        let mut reader = PipeStream::from_unix(right);
        drop(left);

        let err = reader.bytes_available().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BrokenPipe);
    }

    #[test]
    fn shutdown_is_quiet_after_peer_closed() {
        let (left, right) = UnixStream::pair().unwrap();
        let mut stream = PipeStream::from_unix(right);
        drop(left);

        assert!(stream.shutdown().is_ok());
    }
}
