use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Frame terminator byte.
pub const TERMINATOR: u8 = 0;

/// Default cap on buffered bytes that have not yet seen a terminator: 1 MiB.
pub const DEFAULT_MAX_FRAME_SIZE: usize = 1024 * 1024;

/// One logical message taken off the stream, terminator removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Raw message bytes.
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Self {
            payload: payload.into(),
        }
    }

    /// Decoded message text.
    ///
    /// Invalid UTF-8 is replaced with U+FFFD and surrounding whitespace is
    /// trimmed; decoding never fails.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.payload).trim().to_string()
    }

    /// The total wire size of this frame (payload + terminator).
    pub fn wire_size(&self) -> usize {
        self.payload.len() + 1
    }
}

/// Encode a message into the wire format: UTF-8 bytes plus one `\0`.
pub fn encode_frame(message: &str, dst: &mut BytesMut) {
    dst.reserve(message.len() + 1);
    dst.put_slice(message.as_bytes());
    dst.put_u8(TERMINATOR);
}

/// Decode a frame from a buffer.
///
/// Returns `None` if the buffer doesn't contain a terminator yet. On success
/// the frame and its terminator are consumed; any bytes after the terminator
/// stay in `src` as the start of the next frame.
pub fn decode_frame(src: &mut BytesMut) -> Option<Frame> {
    let end = src.iter().position(|&b| b == TERMINATOR)?;
    let payload = src.split_to(end).freeze();
    src.advance(1);
    Some(Frame { payload })
}

/// Configuration for the frame codec.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum buffered bytes without a terminator. Default: 1 MiB.
    pub max_frame_size: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }
}
