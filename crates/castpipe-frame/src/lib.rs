//! Null-terminated text framing for the castpipe control channel.
//!
//! The channel is a plain byte stream with no message boundaries of its own.
//! Every request and every response is UTF-8 text followed by a single `\0`:
//!
//! ```text
//! GET_CD:53\0            client -> peer
//! CD:1200,1500,1\0       peer -> client
//! ```
//!
//! There is no length field and no escaping: a payload that itself contains
//! `\0` splits into two frames on the receiving side.

pub mod codec;
pub mod error;
pub mod reader;
pub mod writer;

pub use codec::{
    decode_frame, encode_frame, Frame, FrameConfig, DEFAULT_MAX_FRAME_SIZE, TERMINATOR,
};
pub use error::{FrameError, Result};
pub use reader::FrameReader;
pub use writer::FrameWriter;
