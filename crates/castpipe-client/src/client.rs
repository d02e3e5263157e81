use std::fmt;
use std::io::ErrorKind;
use std::thread;
use std::time::{Duration, Instant};

use castpipe_frame::{FrameConfig, FrameError, FrameReader, FrameWriter};
use castpipe_transport::{Connector, PipeChannel, PipeEndpoint};
use tracing::{debug, error, info, warn};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::rules::{self, ReplyKind, ResponseRule};

/// Anything that can run one correlated request/response exchange.
///
/// [`GameInterface`](crate::GameInterface) is generic over this so it works
/// on a plain [`ChannelClient`] as well as a [`SharedClient`](crate::SharedClient).
pub trait Requester {
    fn request(&mut self, command: &str, timeout: Duration) -> Result<String>;
}

/// Owns the connection to the peer and runs exchanges over it.
///
/// One exchange at a time: every operation takes `&mut self`. Bytes that
/// arrive after a matched reply stay buffered for the next exchange and are
/// dropped whenever the connection is dropped.
pub struct ChannelClient<C: Connector = PipeEndpoint> {
    connector: C,
    config: ClientConfig,
    channel: Option<C::Channel>,
    reader: FrameReader,
    writer: FrameWriter,
}

impl ChannelClient<PipeEndpoint> {
    /// Client for the platform endpoint named in `config`. Does not connect.
    pub fn new(config: ClientConfig) -> Self {
        let connector = PipeEndpoint::new(config.endpoint.clone());
        Self::with_connector(connector, config)
    }
}

impl Default for ChannelClient<PipeEndpoint> {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}

impl<C: Connector> ChannelClient<C> {
    /// Client over an explicit connector. Does not connect.
    pub fn with_connector(connector: C, config: ClientConfig) -> Self {
        let reader = FrameReader::with_config(FrameConfig {
            max_frame_size: config.max_frame_size,
        });
        Self {
            connector,
            config,
            channel: None,
            reader,
            writer: FrameWriter::new(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn endpoint(&self) -> &str {
        self.connector.endpoint()
    }

    /// True iff a connection is held. No I/O.
    pub fn is_ready(&self) -> bool {
        self.channel.is_some()
    }

    /// Connect, waiting up to `timeout` for the endpoint. Succeeds at once
    /// when already connected.
    pub fn try_connect(&mut self, timeout: Duration) -> Result<()> {
        if self.channel.is_some() {
            debug!(endpoint = self.connector.endpoint(), "already connected");
            return Ok(());
        }

        let channel = self.connector.connect(timeout)?;
        self.reader.clear();
        self.channel = Some(channel);
        info!(endpoint = self.connector.endpoint(), "connected");
        Ok(())
    }

    /// [`try_connect`](Self::try_connect), logging and discarding the error.
    pub fn connect(&mut self, timeout: Duration) -> bool {
        match self.try_connect(timeout) {
            Ok(()) => true,
            Err(err) => {
                warn!(endpoint = self.connector.endpoint(), error = %err, "connect failed");
                false
            }
        }
    }

    /// Close the connection if one is held. Never fails.
    pub fn disconnect(&mut self) {
        let Some(mut channel) = self.channel.take() else {
            debug!("already disconnected");
            return;
        };
        if let Err(err) = channel.shutdown() {
            debug!(error = %err, "error while closing channel");
        }
        let dropped = self.reader.clear();
        info!(
            endpoint = self.connector.endpoint(),
            dropped_bytes = dropped,
            "disconnected"
        );
    }

    /// Write one framed command. A failed or partial write disconnects.
    pub fn try_send(&mut self, command: &str) -> Result<()> {
        let channel = self.channel.as_mut().ok_or(ClientError::NotConnected)?;
        match self.writer.send(channel, command) {
            Ok(bytes) => {
                debug!(command, bytes, "sent");
                Ok(())
            }
            Err(err) => {
                warn!(command, error = %err, "send failed");
                self.disconnect();
                Err(err.into())
            }
        }
    }

    /// [`try_send`](Self::try_send), logging and discarding the error.
    pub fn send(&mut self, command: &str) -> bool {
        match self.try_send(command) {
            Ok(()) => true,
            Err(ClientError::NotConnected) => {
                warn!(command, "cannot send: not connected");
                false
            }
            Err(_) => false,
        }
    }

    /// Send `command` and wait up to `timeout` for the reply its rule
    /// expects.
    ///
    /// Fails without I/O when the command has no rule. Reconnects once when
    /// not connected. Frames that don't belong to this exchange are skipped.
    /// On timeout the stale bytes are drained and the connection stays open.
    pub fn try_request(&mut self, command: &str, timeout: Duration) -> Result<String> {
        let rule =
            rules::lookup(command).ok_or_else(|| ClientError::UnknownCommand(command.to_string()))?;

        if self.channel.is_none() {
            warn!(command, "not connected, attempting reconnect");
            self.try_connect(self.config.connect_timeout)?;
        }

        self.try_send(command)?;
        self.await_reply(command, rule, timeout)
    }

    /// [`try_request`](Self::try_request), logging and discarding the error.
    pub fn request_response(&mut self, command: &str, timeout: Duration) -> Option<String> {
        match self.try_request(command, timeout) {
            Ok(reply) => Some(reply),
            Err(err) => {
                log_failure(command, &err);
                None
            }
        }
    }

    fn await_reply(
        &mut self,
        command: &str,
        rule: &ResponseRule,
        timeout: Duration,
    ) -> Result<String> {
        let deadline = Instant::now() + timeout;

        loop {
            while let Some(frame) = self.reader.next_frame() {
                let message = frame.text();
                match rule.classify(&message) {
                    ReplyKind::Answer => {
                        debug!(command, reply = %message, buffered = self.reader.buffered(), "matched reply");
                        return Ok(message);
                    }
                    ReplyKind::PeerError => {
                        debug!(command, reply = %message, "peer reported failure");
                        return Err(ClientError::PeerReported {
                            command: command.to_string(),
                            reply: message,
                        });
                    }
                    ReplyKind::Stray => {
                        debug!(command, expected = %rule.reply, skipped = %message, "discarding unexpected frame");
                    }
                }
            }

            let now = Instant::now();
            if now >= deadline {
                break;
            }
            let remaining = deadline - now;

            let channel = self.channel.as_mut().ok_or(ClientError::NotConnected)?;
            let available = match channel.bytes_available() {
                Ok(n) => n,
                Err(err) if is_transient(err.kind()) => {
                    thread::sleep(self.config.retry_interval.min(remaining));
                    continue;
                }
                Err(err) => {
                    warn!(command, error = %err, "channel probe failed");
                    self.disconnect();
                    return Err(channel_error(err));
                }
            };

            if available == 0 {
                thread::sleep(self.config.poll_interval.min(remaining));
                continue;
            }

            let limit = available.min(self.config.read_chunk_size);
            match self.reader.fill(channel, limit) {
                Ok(0) => thread::sleep(self.config.retry_interval.min(remaining)),
                Ok(_) => {}
                Err(FrameError::Io(err)) if is_transient(err.kind()) => {
                    thread::sleep(self.config.retry_interval.min(remaining));
                }
                Err(FrameError::Io(err)) => {
                    warn!(command, error = %err, "channel read failed");
                    self.disconnect();
                    return Err(channel_error(err));
                }
                Err(err) => {
                    warn!(command, error = %err, "receive buffer overflow");
                    self.disconnect();
                    return Err(err.into());
                }
            }
        }

        let drained = self.drain_stale();
        warn!(
            command,
            expected = %rule.reply,
            timeout_ms = timeout.as_millis() as u64,
            drained,
            "timed out waiting for reply"
        );
        Err(ClientError::Timeout {
            command: command.to_string(),
            timeout,
        })
    }

    /// Best-effort discard of whatever is buffered or pending on the channel.
    /// Returns the number of bytes dropped.
    fn drain_stale(&mut self) -> usize {
        let mut dropped = self.reader.clear();

        for _ in 0..self.config.drain_max_iterations {
            let Some(channel) = self.channel.as_mut() else {
                break;
            };
            let available = match channel.bytes_available() {
                Ok(0) => break,
                Ok(n) => n,
                Err(err) => {
                    debug!(error = %err, "probe failed while draining");
                    break;
                }
            };
            match self
                .reader
                .fill(channel, available.min(self.config.read_chunk_size))
            {
                Ok(0) => break,
                Ok(_) => dropped += self.reader.clear(),
                Err(err) => {
                    debug!(error = %err, "read failed while draining");
                    dropped += self.reader.clear();
                    break;
                }
            }
        }

        if dropped > 0 {
            debug!(bytes = dropped, "drained stale bytes");
        }
        dropped
    }
}

impl<C: Connector> fmt::Debug for ChannelClient<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelClient")
            .field("endpoint", &self.connector.endpoint())
            .field("connected", &self.channel.is_some())
            .field("buffered", &self.reader.buffered())
            .finish()
    }
}

impl<C: Connector> Drop for ChannelClient<C> {
    fn drop(&mut self) {
        self.disconnect();
    }
}

impl<C: Connector> Requester for ChannelClient<C> {
    fn request(&mut self, command: &str, timeout: Duration) -> Result<String> {
        self.try_request(command, timeout)
    }
}

fn is_transient(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::Interrupted | ErrorKind::WouldBlock | ErrorKind::TimedOut
    )
}

fn channel_error(err: std::io::Error) -> ClientError {
    match err.kind() {
        ErrorKind::BrokenPipe | ErrorKind::ConnectionReset | ErrorKind::UnexpectedEof => {
            ClientError::Disconnected(err.to_string())
        }
        _ => ClientError::Transport(err.into()),
    }
}

/// Log level per error class for the `bool`/`Option` facades.
pub(crate) fn log_failure(command: &str, err: &ClientError) {
    match err {
        ClientError::UnknownCommand(_) | ClientError::InvalidArgument(_) => {
            error!(command, error = %err, "request rejected")
        }
        ClientError::PeerReported { reply, .. } => {
            debug!(command, reply = %reply, "peer reported failure")
        }
        ClientError::Parse(_) => warn!(command, error = %err, "unparseable reply"),
        _ => warn!(command, error = %err, "request failed"),
    }
}
