use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use castpipe_transport::{Connector, PipeEndpoint};

use crate::client::{ChannelClient, Requester};
use crate::config::ClientConfig;
use crate::error::Result;

/// A [`ChannelClient`] that can be cloned across threads.
///
/// Every call holds the lock for the whole exchange, so requests from
/// different threads never interleave on the channel.
pub struct SharedClient<C: Connector = PipeEndpoint> {
    inner: Arc<Mutex<ChannelClient<C>>>,
}

impl SharedClient<PipeEndpoint> {
    pub fn from_config(config: ClientConfig) -> Self {
        Self::new(ChannelClient::new(config))
    }
}

impl<C: Connector> SharedClient<C> {
    pub fn new(client: ChannelClient<C>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(client)),
        }
    }

    /// Exclusive access to the client for several calls in a row.
    ///
    /// A lock poisoned by a panicking holder is taken over: the connection
    /// and buffer stay consistent, and the next exchange checks them anyway.
    pub fn lock(&self) -> MutexGuard<'_, ChannelClient<C>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn connect(&self, timeout: Duration) -> bool {
        self.lock().connect(timeout)
    }

    pub fn disconnect(&self) {
        self.lock().disconnect();
    }

    pub fn is_ready(&self) -> bool {
        self.lock().is_ready()
    }

    pub fn send(&self, command: &str) -> bool {
        self.lock().send(command)
    }

    pub fn request_response(&self, command: &str, timeout: Duration) -> Option<String> {
        self.lock().request_response(command, timeout)
    }

    pub fn try_request(&self, command: &str, timeout: Duration) -> Result<String> {
        self.lock().try_request(command, timeout)
    }
}

impl<C: Connector> fmt::Debug for SharedClient<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedClient")
            .field("handles", &Arc::strong_count(&self.inner))
            .finish_non_exhaustive()
    }
}

impl<C: Connector> Clone for SharedClient<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: Connector> Requester for SharedClient<C> {
    fn request(&mut self, command: &str, timeout: Duration) -> Result<String> {
        self.try_request(command, timeout)
    }
}
