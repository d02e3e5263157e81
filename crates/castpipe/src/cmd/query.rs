use std::time::Instant;

use serde::Serialize;

use crate::cmd::{
    open_session, parse_duration, parse_guid, run_exchange, schema_id, BehindArgs, ConnectionArgs,
    InRangeArgs, LuaArgs, RequestArgs, SpellArgs,
};
use crate::exit::{client_error, CliResult, SUCCESS};
use crate::output::{print_reply, round_ms, OutputFormat};

#[derive(Serialize)]
struct PingResult {
    reply: String,
    latency_ms: f64,
}

#[derive(Serialize)]
struct GuidResult {
    guid: u64,
    hex: String,
}

#[derive(Serialize)]
struct BehindResult {
    guid: String,
    behind: bool,
}

pub fn ping(connection: &ConnectionArgs, format: OutputFormat) -> CliResult<i32> {
    run_exchange(connection, format, "ping", &schema_id("ping"), |session| {
        let started = Instant::now();
        let reply = session.try_ping()?;
        Ok(PingResult {
            reply,
            latency_ms: round_ms(started.elapsed()),
        })
    })
}

pub fn request(
    args: RequestArgs,
    connection: &ConnectionArgs,
    format: OutputFormat,
) -> CliResult<i32> {
    let timeout = parse_duration(&args.timeout)?;
    let mut session = open_session(connection)?;

    let started = Instant::now();
    let reply = session
        .requester_mut()
        .try_request(&args.command, timeout)
        .map_err(|err| client_error("request failed", err))?;

    print_reply(
        &schema_id("reply"),
        &args.command,
        &reply,
        started.elapsed(),
        format,
    );
    Ok(SUCCESS)
}

pub fn lua(args: LuaArgs, connection: &ConnectionArgs, format: OutputFormat) -> CliResult<i32> {
    run_exchange(connection, format, "lua", &schema_id("lua-result"), |session| {
        session.try_execute_lua(&args.code)
    })
}

pub fn cooldown(args: SpellArgs, connection: &ConnectionArgs, format: OutputFormat) -> CliResult<i32> {
    run_exchange(connection, format, "cooldown", &schema_id("spell-cooldown"), |session| {
        session.try_get_spell_cooldown(args.spell_id)
    })
}

pub fn range(args: SpellArgs, connection: &ConnectionArgs, format: OutputFormat) -> CliResult<i32> {
    run_exchange(connection, format, "range", &schema_id("spell-range"), |session| {
        session.try_get_spell_range(args.spell_id)
    })
}

pub fn in_range(
    args: InRangeArgs,
    connection: &ConnectionArgs,
    format: OutputFormat,
) -> CliResult<i32> {
    run_exchange(connection, format, "in-range", &schema_id("in-range"), |session| {
        session.try_is_spell_in_range(args.spell_id, &args.unit)
    })
}

pub fn spell_info(
    args: SpellArgs,
    connection: &ConnectionArgs,
    format: OutputFormat,
) -> CliResult<i32> {
    run_exchange(connection, format, "spell-info", &schema_id("spell-info"), |session| {
        session.try_get_spell_info(args.spell_id)
    })
}

pub fn time(connection: &ConnectionArgs, format: OutputFormat) -> CliResult<i32> {
    run_exchange(connection, format, "time", &schema_id("game-time"), |session| {
        session.try_get_game_time_millis()
    })
}

pub fn combo_points(connection: &ConnectionArgs, format: OutputFormat) -> CliResult<i32> {
    run_exchange(connection, format, "combo-points", &schema_id("combo-points"), |session| {
        session.try_get_combo_points()
    })
}

pub fn target(connection: &ConnectionArgs, format: OutputFormat) -> CliResult<i32> {
    run_exchange(connection, format, "target", &schema_id("target-guid"), |session| {
        let guid = session.try_get_target_guid()?;
        Ok(GuidResult {
            guid,
            hex: format!("0x{guid:X}"),
        })
    })
}

pub fn behind(args: BehindArgs, connection: &ConnectionArgs, format: OutputFormat) -> CliResult<i32> {
    let guid = parse_guid(&args.guid)?;
    run_exchange(connection, format, "behind", &schema_id("behind-target"), |session| {
        let behind = session.try_is_behind_target(guid)?;
        Ok(BehindResult {
            guid: format!("0x{guid:X}"),
            behind,
        })
    })
}
