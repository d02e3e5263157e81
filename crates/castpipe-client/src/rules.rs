//! Command → reply correlation table.
//!
//! The channel carries no request IDs. A reply is tied to its request by the
//! text it starts with, so every command issued through
//! [`ChannelClient::request_response`](crate::ChannelClient::request_response)
//! needs a row here. Order matters: the first matching row wins.

use std::fmt;

/// How a row recognizes the outgoing command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandMatcher {
    /// The whole command equals this string.
    Exact(&'static str),
    /// The command starts with this string.
    Prefix(&'static str),
}

impl CommandMatcher {
    pub fn matches(&self, command: &str) -> bool {
        match self {
            Self::Exact(s) => command == *s,
            Self::Prefix(p) => command.starts_with(p),
        }
    }
}

/// How a row recognizes the reply that answers the command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyMatcher {
    Prefix(&'static str),
    /// ASCII case-insensitive substring anywhere in the message.
    ContainsIgnoreCase(&'static str),
}

impl ReplyMatcher {
    pub fn matches(&self, message: &str) -> bool {
        match self {
            Self::Prefix(p) => message.starts_with(p),
            Self::ContainsIgnoreCase(needle) => message
                .to_ascii_uppercase()
                .contains(&needle.to_ascii_uppercase()),
        }
    }
}

impl fmt::Display for ReplyMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prefix(p) => write!(f, "prefix '{p}'"),
            Self::ContainsIgnoreCase(n) => write!(f, "contains '{n}'"),
        }
    }
}

/// One row of the correlation table.
#[derive(Debug, Clone, Copy)]
pub struct ResponseRule {
    pub command: CommandMatcher,
    pub reply: ReplyMatcher,
    /// Reply prefixes that also end the exchange, as a peer-reported failure.
    /// Checked before `reply`.
    pub error_prefixes: &'static [&'static str],
}

/// What an inbound message means for the exchange in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    Answer,
    PeerError,
    /// Belongs to some other exchange; skip it.
    Stray,
}

impl ResponseRule {
    const fn new(command: CommandMatcher, reply: ReplyMatcher) -> Self {
        Self {
            command,
            reply,
            error_prefixes: &[],
        }
    }

    const fn with_errors(mut self, error_prefixes: &'static [&'static str]) -> Self {
        self.error_prefixes = error_prefixes;
        self
    }

    /// Classify an inbound, already trimmed message.
    ///
    /// A bare `ERR:` carries no command family, so it cannot be told apart
    /// from a late answer to an earlier exchange and is skipped.
    pub fn classify(&self, message: &str) -> ReplyKind {
        if self.error_prefixes.iter().any(|p| message.starts_with(p)) {
            ReplyKind::PeerError
        } else if self.reply.matches(message) {
            ReplyKind::Answer
        } else {
            ReplyKind::Stray
        }
    }
}

use CommandMatcher::{Exact, Prefix};
use ReplyMatcher::{ContainsIgnoreCase, Prefix as Starts};

/// The correlation table, in match order.
pub static RESPONSE_RULES: &[ResponseRule] = &[
    ResponseRule::new(Exact("ping"), ContainsIgnoreCase("PONG")),
    ResponseRule::new(Prefix("GET_UNIT_INFO"), Starts("UNIT_INFO:")),
    ResponseRule::new(Prefix("GET_PLAYER_INFO"), Starts("PLAYER_INFO:")),
    ResponseRule::new(Exact("GET_TARGET_GUID"), Starts("TARGET_GUID:")),
    ResponseRule::new(Prefix("CAST_SPELL"), Starts("CAST_RESULT:")),
    ResponseRule::new(Prefix("RUN_LUA"), Starts("LUA_RESULT:")).with_errors(&["LUA_RESULT:ERROR:"]),
    ResponseRule::new(Prefix("GET_SPELL_INFO"), Starts("SPELL_INFO:"))
        .with_errors(&["SPELLINFO_ERR", "SPELL_INFO_ERR"]),
    ResponseRule::new(Exact("GET_COMBO_POINTS"), Starts("CP:")),
    ResponseRule::new(Exact("GET_KNOWN_SPELLS"), Starts("KNOWN_SPELLS:")),
    ResponseRule::new(Prefix("EXEC_LUA:"), Starts("LUA_RESULT:")).with_errors(&["LUA_RESULT:ERROR:"]),
    ResponseRule::new(Prefix("GET_TIME_MS"), Starts("TIME_MS:")),
    ResponseRule::new(Prefix("GET_CD:"), Starts("CD:")).with_errors(&["CD_ERR"]),
    ResponseRule::new(Prefix("IS_BEHIND_TARGET:"), Starts("[IS_BEHIND_TARGET_OK:")),
    ResponseRule::new(Prefix("MOVE_TO:"), Starts("MOVE_TO_RESULT:")),
    ResponseRule::new(Prefix("GET_RANGE:"), Starts("RANGE:")),
    ResponseRule::new(Prefix("IS_IN_RANGE:"), Starts("IN_RANGE:")),
];

/// First rule whose command matcher accepts `command`.
pub fn lookup(command: &str) -> Option<&'static ResponseRule> {
    RESPONSE_RULES.iter().find(|rule| rule.command.matches(command))
}
