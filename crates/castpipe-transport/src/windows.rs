use std::ffi::OsStr;
use std::fs::{File, OpenOptions};
use std::io;
use std::iter;
use std::os::windows::ffi::OsStrExt;
use std::os::windows::fs::OpenOptionsExt;
use std::os::windows::io::AsRawHandle;
use std::time::Duration;

use tracing::debug;
use windows_sys::Win32::System::Pipes::{PeekNamedPipe, WaitNamedPipeW};

use crate::error::{Result, TransportError};
use crate::stream::PipeStream;

/// Local named pipe namespace prefix.
pub const PIPE_PREFIX: &str = r"\\.\pipe\";

/// Wait for a named pipe instance and open it for exclusive read/write.
pub fn connect(name: &str, timeout: Duration) -> Result<PipeStream> {
    if !name.starts_with(PIPE_PREFIX) {
        return Err(TransportError::InvalidName {
            name: name.to_string(),
            reason: format!("named pipe must start with {PIPE_PREFIX}"),
        });
    }

    let wide: Vec<u16> = OsStr::new(name)
        .encode_wide()
        .chain(iter::once(0))
        .collect();

    // 0 means "server default" and u32::MAX means "forever"; keep the wait bounded.
    let wait_ms = u32::try_from(timeout.as_millis())
        .unwrap_or(u32::MAX - 1)
        .clamp(1, u32::MAX - 1);

    // SAFETY: `wide` is a NUL-terminated UTF-16 string that outlives the call.
    let available = unsafe { WaitNamedPipeW(wide.as_ptr(), wait_ms) };
    if available == 0 {
        let err = io::Error::last_os_error();
        debug!(pipe = name, error = %err, "named pipe not available");
        return Err(TransportError::Unavailable {
            name: name.to_string(),
            timeout,
        });
    }

    // Share mode 0: no other client may open the pipe while we hold it.
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .share_mode(0)
        .open(name)
        .map_err(|source| TransportError::Connect {
            name: name.to_string(),
            source,
        })?;

    debug!(pipe = name, "connected to named pipe");
    Ok(PipeStream::from_pipe(file))
}

/// Count readable bytes without consuming them.
///
/// A server that closed its end surfaces as `ERROR_BROKEN_PIPE`, which std
/// maps to [`io::ErrorKind::BrokenPipe`].
pub(crate) fn peek_available(file: &File) -> io::Result<usize> {
    let mut total_available: u32 = 0;

    // SAFETY: the handle is owned by `file` and open for the duration of the
    // call; a null buffer with size 0 asks only for the counters, and
    // `total_available` is a valid writable u32.
    let ok = unsafe {
        PeekNamedPipe(
            file.as_raw_handle(),
            std::ptr::null_mut(),
            0,
            std::ptr::null_mut(),
            &mut total_available,
            std::ptr::null_mut(),
        )
    };

    if ok == 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(total_available as usize)
}
