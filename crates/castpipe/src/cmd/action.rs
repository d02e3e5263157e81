use std::time::Instant;

use castpipe_client::Position;
use serde::Serialize;

use crate::cmd::{open_session, parse_guid, schema_id, CastArgs, ConnectionArgs, MoveToArgs};
use crate::exit::{client_error, CliResult, FAILURE, SUCCESS};
use crate::output::{print_reply, OutputFormat};

#[derive(Serialize)]
struct CastOutcome {
    spell_id: u32,
    target_guid: u64,
    accepted: bool,
}

#[derive(Serialize)]
struct MoveOutcome {
    position: Position,
    accepted: bool,
}

/// Exit status for an action the peer may decline.
fn outcome_code(accepted: bool) -> i32 {
    if accepted {
        SUCCESS
    } else {
        FAILURE
    }
}

pub fn cast(args: CastArgs, connection: &ConnectionArgs, format: OutputFormat) -> CliResult<i32> {
    let target_guid = parse_guid(&args.target)?;
    let mut session = open_session(connection)?;

    let started = Instant::now();
    let accepted = session
        .try_cast_spell(args.spell_id, target_guid)
        .map_err(|err| client_error("cast failed", err))?;

    let outcome = CastOutcome {
        spell_id: args.spell_id,
        target_guid,
        accepted,
    };
    print_reply(&schema_id("cast-result"), "cast", &outcome, started.elapsed(), format);
    Ok(outcome_code(accepted))
}

pub fn move_to(args: MoveToArgs, connection: &ConnectionArgs, format: OutputFormat) -> CliResult<i32> {
    let position = Position::new(args.x, args.y, args.z);
    let mut session = open_session(connection)?;

    let started = Instant::now();
    let accepted = session
        .try_move_to(position)
        .map_err(|err| client_error("move failed", err))?;

    let outcome = MoveOutcome { position, accepted };
    print_reply(&schema_id("move-result"), "move-to", &outcome, started.elapsed(), format);
    Ok(outcome_code(accepted))
}
