use std::time::{Duration, Instant};

use castpipe_client::{ChannelClient, ClientConfig, GameInterface};
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::exit::{client_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_reply, OutputFormat};

pub mod action;
pub mod info;
pub mod query;
pub mod version;

/// A connected client with the typed accessors on top.
pub type Session = GameInterface<ChannelClient>;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check that the peer answers.
    Ping,
    /// Send a raw command and print the correlated reply.
    Request(RequestArgs),
    /// Run Lua code in the game and print its results.
    Lua(LuaArgs),
    /// Show a spell's cooldown and readiness.
    Cooldown(SpellArgs),
    /// Show a spell's min/max range.
    Range(SpellArgs),
    /// Check whether a unit is in range of a spell.
    InRange(InRangeArgs),
    /// Show static spell data.
    SpellInfo(SpellArgs),
    /// Show the game clock in milliseconds.
    Time,
    /// Show combo points on the current target.
    ComboPoints,
    /// Show the current target's GUID.
    Target,
    /// Check whether the player is behind a unit.
    Behind(BehindArgs),
    /// Cast a spell.
    Cast(CastArgs),
    /// Move the player to a world position.
    MoveTo(MoveToArgs),
    /// Probe the peer and print connection metadata.
    Info,
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, connection: &ConnectionArgs, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Ping => query::ping(connection, format),
        Command::Request(args) => query::request(args, connection, format),
        Command::Lua(args) => query::lua(args, connection, format),
        Command::Cooldown(args) => query::cooldown(args, connection, format),
        Command::Range(args) => query::range(args, connection, format),
        Command::InRange(args) => query::in_range(args, connection, format),
        Command::SpellInfo(args) => query::spell_info(args, connection, format),
        Command::Time => query::time(connection, format),
        Command::ComboPoints => query::combo_points(connection, format),
        Command::Target => query::target(connection, format),
        Command::Behind(args) => query::behind(args, connection, format),
        Command::Cast(args) => action::cast(args, connection, format),
        Command::MoveTo(args) => action::move_to(args, connection, format),
        Command::Info => info::run(connection, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// Pipe name (Windows) or socket path (Unix). Default: the platform endpoint.
    #[arg(long, value_name = "NAME", env = "CASTPIPE_ENDPOINT", global = true)]
    pub endpoint: Option<String>,
    /// How long to wait for the endpoint (e.g. 5s, 500ms).
    #[arg(
        long,
        value_name = "DURATION",
        env = "CASTPIPE_CONNECT_TIMEOUT",
        default_value = "5s",
        global = true
    )]
    pub connect_timeout: String,
}

#[derive(Args, Debug)]
pub struct RequestArgs {
    /// Command text, sent verbatim.
    pub command: String,
    /// Maximum time to wait for the reply (e.g. 10s, 500ms).
    #[arg(long, default_value = "10s")]
    pub timeout: String,
}

#[derive(Args, Debug)]
pub struct LuaArgs {
    /// Lua source to execute.
    pub code: String,
}

#[derive(Args, Debug)]
pub struct SpellArgs {
    /// Spell ID.
    pub spell_id: u32,
}

#[derive(Args, Debug)]
pub struct InRangeArgs {
    /// Spell ID.
    pub spell_id: u32,
    /// Unit token to check against.
    #[arg(long, default_value = castpipe_client::DEFAULT_UNIT)]
    pub unit: String,
}

#[derive(Args, Debug)]
pub struct BehindArgs {
    /// Unit GUID in hex, with or without 0x.
    pub guid: String,
}

#[derive(Args, Debug)]
pub struct CastArgs {
    /// Spell ID.
    pub spell_id: u32,
    /// Target GUID in hex. Default lets the game pick.
    #[arg(long, default_value = "0")]
    pub target: String,
}

#[derive(Args, Debug)]
pub struct MoveToArgs {
    #[arg(allow_negative_numbers = true)]
    pub x: f32,
    #[arg(allow_negative_numbers = true)]
    pub y: f32,
    #[arg(allow_negative_numbers = true)]
    pub z: f32,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Connect to the configured endpoint.
pub fn open_session(connection: &ConnectionArgs) -> CliResult<Session> {
    let connect_timeout = parse_duration(&connection.connect_timeout)?;
    let mut config = match &connection.endpoint {
        Some(endpoint) => ClientConfig::for_endpoint(endpoint.as_str()),
        None => ClientConfig::default(),
    };
    config.connect_timeout = connect_timeout;

    let mut client = ChannelClient::new(config);
    client
        .try_connect(connect_timeout)
        .map_err(|err| client_error("connect failed", err))?;
    Ok(GameInterface::from_client(client))
}

/// Connect, run one exchange, print its result.
pub fn run_exchange<T, F>(
    connection: &ConnectionArgs,
    format: OutputFormat,
    name: &str,
    schema_id: &str,
    exchange: F,
) -> CliResult<i32>
where
    T: Serialize,
    F: FnOnce(&mut Session) -> castpipe_client::Result<T>,
{
    let mut session = open_session(connection)?;
    let started = Instant::now();
    let result = exchange(&mut session).map_err(|err| client_error(name, err))?;
    print_reply(schema_id, name, &result, started.elapsed(), format);
    Ok(SUCCESS)
}

/// Parse `500ms`, `5s` or bare seconds.
pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .trim()
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration: {input}")))?;
    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}

/// Parse a GUID given in hex, with or without `0x`.
pub fn parse_guid(input: &str) -> CliResult<u64> {
    let trimmed = input.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    u64::from_str_radix(digits, 16)
        .map_err(|_| CliError::new(USAGE, format!("invalid GUID: {input}")))
}

pub fn schema_id(name: &str) -> String {
    format!("castpipe/cli/v1/{name}")
}
