//! Request/response client for the castpipe control channel.
//!
//! [`ChannelClient`] owns the connection to the injected peer and correlates
//! each request with its reply through the [`rules`] table. [`GameInterface`]
//! layers the typed accessors (cooldowns, casting, movement) on top of any
//! [`Requester`], either a plain client or a [`SharedClient`] used from
//! several threads.

pub mod client;
pub mod config;
pub mod error;
pub mod game;
pub mod parse;
pub mod rules;
pub mod shared;

#[cfg(test)]
mod testing;

pub use client::{ChannelClient, Requester};
pub use config::ClientConfig;
pub use error::{ClientError, ParseError, Result};
pub use game::{GameInterface, DEFAULT_UNIT};
pub use parse::{cooldown_state, Position, SpellCooldown, SpellInfo, SpellRange};
pub use rules::{lookup, CommandMatcher, ReplyKind, ReplyMatcher, ResponseRule, RESPONSE_RULES};
pub use shared::SharedClient;
