//! Scripted transport double for client tests.

use std::collections::VecDeque;
use std::io::{self, ErrorKind, Read, Write};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use castpipe_transport::{Connector, PipeChannel, TransportError};

use crate::config::ClientConfig;

/// One scripted event on the inbound side.
#[derive(Debug, Clone)]
pub(crate) enum Inbound {
    /// Bytes the probe reports and the next read returns.
    Chunk(Vec<u8>),
    /// The probe itself fails.
    ProbeError(ErrorKind),
    /// The probe reports data but the read fails.
    ReadError(ErrorKind),
    /// The probe reports data but the read returns nothing.
    EmptyRead,
}

#[derive(Debug, Default)]
pub(crate) struct Script {
    pub writes: Vec<Vec<u8>>,
    pub inbound: VecDeque<Inbound>,
    /// Each write pops one batch and queues it as inbound.
    pub replies: VecDeque<Vec<Inbound>>,
    pub short_write: Option<usize>,
    pub fail_connect: bool,
    pub connects: usize,
    pub shutdowns: usize,
    pub probes: usize,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct FakeConnector {
    script: Arc<Mutex<Script>>,
}

impl FakeConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap()
    }

    /// Queue a reply delivered after the next unanswered write.
    pub fn reply(&self, events: Vec<Inbound>) {
        self.script().replies.push_back(events);
    }

    pub fn reply_text(&self, text: &str) {
        self.reply(vec![Inbound::Chunk(frame(text))]);
    }

    /// Queue bytes that are already waiting on the channel.
    pub fn preload(&self, event: Inbound) {
        self.script().inbound.push_back(event);
    }

    pub fn writes(&self) -> Vec<String> {
        self.script()
            .writes
            .iter()
            .map(|w| String::from_utf8_lossy(w).into_owned())
            .collect()
    }
}

impl Connector for FakeConnector {
    type Channel = FakeChannel;

    fn connect(&self, timeout: Duration) -> castpipe_transport::Result<FakeChannel> {
        let mut script = self.script();
        if script.fail_connect {
            return Err(TransportError::Unavailable {
                name: "fake".to_string(),
                timeout,
            });
        }
        script.connects += 1;
        Ok(FakeChannel {
            script: Arc::clone(&self.script),
        })
    }

    fn endpoint(&self) -> &str {
        "fake"
    }
}

#[derive(Debug)]
pub(crate) struct FakeChannel {
    script: Arc<Mutex<Script>>,
}

impl Read for FakeChannel {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut script = self.script.lock().unwrap();
        match script.inbound.pop_front() {
            Some(Inbound::Chunk(mut bytes)) => {
                let n = bytes.len().min(buf.len());
                buf[..n].copy_from_slice(&bytes[..n]);
                if n < bytes.len() {
                    bytes.drain(..n);
                    script.inbound.push_front(Inbound::Chunk(bytes));
                }
                Ok(n)
            }
            Some(Inbound::ReadError(kind)) => Err(io::Error::from(kind)),
            Some(Inbound::EmptyRead) | None => Ok(0),
            Some(other @ Inbound::ProbeError(_)) => {
                script.inbound.push_front(other);
                Ok(0)
            }
        }
    }
}

impl Write for FakeChannel {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut script = self.script.lock().unwrap();
        let n = script.short_write.unwrap_or(buf.len()).min(buf.len());
        script.writes.push(buf[..n].to_vec());
        if let Some(events) = script.replies.pop_front() {
            script.inbound.extend(events);
        }
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl PipeChannel for FakeChannel {
    fn bytes_available(&mut self) -> io::Result<usize> {
        let mut script = self.script.lock().unwrap();
        script.probes += 1;
        match script.inbound.front().cloned() {
            Some(Inbound::Chunk(bytes)) => Ok(bytes.len()),
            Some(Inbound::ProbeError(kind)) => {
                script.inbound.pop_front();
                Err(io::Error::from(kind))
            }
            Some(Inbound::ReadError(_)) | Some(Inbound::EmptyRead) => Ok(1),
            None => Ok(0),
        }
    }

    fn shutdown(&mut self) -> io::Result<()> {
        self.script.lock().unwrap().shutdowns += 1;
        Ok(())
    }
}

/// Wire bytes for `text`.
pub(crate) fn frame(text: &str) -> Vec<u8> {
    let mut bytes = text.as_bytes().to_vec();
    bytes.push(0);
    bytes
}

/// Config with tight intervals so timeout paths finish quickly.
pub(crate) fn fast_config() -> ClientConfig {
    ClientConfig {
        endpoint: "fake".to_string(),
        connect_timeout: Duration::from_millis(20),
        request_timeout: Duration::from_millis(200),
        poll_interval: Duration::from_millis(1),
        retry_interval: Duration::from_millis(1),
        ..ClientConfig::default()
    }
}
