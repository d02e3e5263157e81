use std::time::Instant;

use serde::Serialize;

use crate::cmd::{open_session, schema_id, ConnectionArgs};
use crate::exit::{client_error, CliResult, SUCCESS};
use crate::output::{round_ms, OutputFormat};

#[derive(Serialize)]
struct InfoOutput {
    schema_id: String,
    endpoint: String,
    connected: bool,
    ping_latency_ms: Option<f64>,
    game_time_ms: Option<i64>,
    target_guid: Option<String>,
}

pub fn run(connection: &ConnectionArgs, format: OutputFormat) -> CliResult<i32> {
    let mut session = open_session(connection)?;

    let started = Instant::now();
    session
        .try_ping()
        .map_err(|err| client_error("ping failed", err))?;
    let ping_latency_ms = Some(round_ms(started.elapsed()));

    let out = InfoOutput {
        schema_id: schema_id("connection-info"),
        endpoint: session.requester().endpoint().to_string(),
        connected: session.requester().is_ready(),
        ping_latency_ms,
        game_time_ms: session.get_game_time_millis(),
        target_guid: session
            .get_target_guid()
            .filter(|guid| *guid != 0)
            .map(|guid| format!("0x{guid:X}")),
    };

    print_info(&out, format);
    Ok(SUCCESS)
}

fn print_info(out: &InfoOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("Connection Info:");
            println!("  Endpoint:   {}", out.endpoint);
            println!("  Connected:  {}", out.connected);
            match out.ping_latency_ms {
                Some(ms) => println!("  Ping:       {ms:.2}ms"),
                None => println!("  Ping:       unavailable"),
            }
            match out.game_time_ms {
                Some(ms) => println!("  Game time:  {ms}ms"),
                None => println!("  Game time:  unavailable"),
            }
            match &out.target_guid {
                Some(guid) => println!("  Target:     {guid}"),
                None => println!("  Target:     none"),
            }
        }
        OutputFormat::Raw => {
            println!("{}", out.endpoint);
        }
    }
}
