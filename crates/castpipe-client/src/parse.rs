//! Typed results of the game accessors and the pure parsers behind them.
//!
//! Every parser takes the full, trimmed reply (prefix included) and never
//! touches the channel.

use std::str::FromStr;

use serde::Serialize;

use crate::error::ParseError;

/// Cooldown state of one spell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpellCooldown {
    pub start_time_secs: f64,
    pub duration_ms: i64,
    pub is_ready: bool,
    /// `None` when game time could not be fetched.
    pub remaining_secs: Option<f64>,
    /// Raw flag from the peer.
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpellRange {
    pub min_range: f64,
    pub max_range: f64,
}

/// Static spell data. `N/A` text fields come back as `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpellInfo {
    pub name: Option<String>,
    pub rank: Option<String>,
    pub cast_time_ms: f64,
    pub min_range: f64,
    pub max_range: f64,
    pub icon: Option<String>,
    pub cost: f64,
    pub power_type: i32,
}

/// World coordinates for `MOVE_TO`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Raw fields of a `CD:` reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RawCooldown {
    pub start_ms: i64,
    pub duration_ms: i64,
    pub enabled: bool,
}

fn strip<'a>(reply: &'a str, prefix: &'static str) -> Result<&'a str, ParseError> {
    reply
        .strip_prefix(prefix)
        .ok_or(ParseError::MissingPrefix { expected: prefix })
}

fn number<T: FromStr>(field: &'static str, value: &str) -> Result<T, ParseError> {
    value
        .trim()
        .parse()
        .map_err(|_| ParseError::InvalidNumber {
            field,
            value: value.to_string(),
        })
}

fn fields<'a, const N: usize>(body: &'a str, sep: char) -> Result<[&'a str; N], ParseError> {
    let parts: Vec<&str> = body.split(sep).collect();
    let got = parts.len();
    parts
        .try_into()
        .map_err(|_| ParseError::FieldCount { expected: N, got })
}

/// The segment between the first and second `:`.
fn first_segment<'a>(reply: &'a str, prefix: &'static str) -> Result<&'a str, ParseError> {
    let body = strip(reply, prefix)?;
    Ok(body.split(':').next().unwrap_or(body))
}

fn optional_text(value: &str) -> Option<String> {
    (value != "N/A").then(|| value.to_string())
}

/// `LUA_RESULT:<a>,<b>,...` → values; an empty result is an empty list.
pub fn parse_lua_result(reply: &str) -> Result<Vec<String>, ParseError> {
    let body = strip(reply, "LUA_RESULT:")?;
    if body.is_empty() {
        return Ok(Vec::new());
    }
    Ok(body.split(',').map(str::to_string).collect())
}

/// `CD:<start_ms>,<duration_ms>,<enabled>`.
pub(crate) fn parse_cooldown(reply: &str) -> Result<RawCooldown, ParseError> {
    let [start, duration, enabled] = fields(first_segment(reply, "CD:")?, ',')?;
    Ok(RawCooldown {
        start_ms: number("start_ms", start)?,
        duration_ms: number("duration_ms", duration)?,
        enabled: number::<i64>("enabled", enabled)? != 0,
    })
}

/// `RANGE:<min>,<max>`.
pub fn parse_range(reply: &str) -> Result<SpellRange, ParseError> {
    let [min, max] = fields(first_segment(reply, "RANGE:")?, ',')?;
    Ok(SpellRange {
        min_range: number("min_range", min)?,
        max_range: number("max_range", max)?,
    })
}

/// `IN_RANGE:<n>`; nonzero means in range.
pub fn parse_in_range(reply: &str) -> Result<bool, ParseError> {
    let value: i64 = number("in_range", first_segment(reply, "IN_RANGE:")?)?;
    Ok(value != 0)
}

/// `SPELL_INFO:name|rank|castTime|minRange|maxRange|icon|cost|powerType`.
pub fn parse_spell_info(reply: &str) -> Result<SpellInfo, ParseError> {
    let [name, rank, cast_time, min, max, icon, cost, power_type] =
        fields(strip(reply, "SPELL_INFO:")?, '|')?;
    Ok(SpellInfo {
        name: optional_text(name),
        rank: optional_text(rank),
        cast_time_ms: number("cast_time_ms", cast_time)?,
        min_range: number("min_range", min)?,
        max_range: number("max_range", max)?,
        icon: optional_text(icon),
        cost: number("cost", cost)?,
        power_type: number("power_type", power_type)?,
    })
}

/// `TIME_MS:<ms>`.
pub fn parse_game_time(reply: &str) -> Result<i64, ParseError> {
    number("time_ms", first_segment(reply, "TIME_MS:")?)
}

/// `CAST_RESULT:<id>,<result>`; any result other than `0` is success.
pub fn parse_cast_result(reply: &str) -> Result<bool, ParseError> {
    let [_spell_id, result] = fields(first_segment(reply, "CAST_RESULT:")?, ',')?;
    Ok(result != "0")
}

/// `CP:<n>`, raw value including the peer's negative codes.
pub fn parse_combo_points(reply: &str) -> Result<i32, ParseError> {
    number("combo_points", first_segment(reply, "CP:")?)
}

/// `TARGET_GUID:<hex>` with or without `0x`.
pub fn parse_target_guid(reply: &str) -> Result<u64, ParseError> {
    let body = strip(reply, "TARGET_GUID:")?.trim();
    if body.is_empty() {
        return Err(ParseError::Empty);
    }
    let digits = body
        .strip_prefix("0x")
        .or_else(|| body.strip_prefix("0X"))
        .unwrap_or(body);
    u64::from_str_radix(digits, 16).map_err(|_| ParseError::InvalidNumber {
        field: "target_guid",
        value: body.to_string(),
    })
}

/// `[IS_BEHIND_TARGET_OK:<v>]`; behind iff `v` is `1`.
pub fn parse_behind_target(reply: &str) -> Result<bool, ParseError> {
    let body = strip(reply, "[IS_BEHIND_TARGET_OK:")?;
    let value = body
        .strip_suffix(']')
        .ok_or_else(|| ParseError::Malformed(format!("missing closing ']' in '{reply}'")))?;
    Ok(value == "1")
}

/// `MOVE_TO_RESULT:<v>`; success iff `v` is `1`.
pub fn parse_move_result(reply: &str) -> Result<bool, ParseError> {
    Ok(first_segment(reply, "MOVE_TO_RESULT:")? == "1")
}

/// Derive readiness from the raw cooldown fields and the current game time.
///
/// Peer values are untrusted; the end time saturates instead of overflowing.
pub fn cooldown_state(
    start_ms: i64,
    duration_ms: i64,
    now_ms: Option<i64>,
    enabled: bool,
) -> SpellCooldown {
    let active = duration_ms > 0 && start_ms > 0;
    let (is_ready, remaining_secs) = match now_ms {
        None => (!active, None),
        Some(now) if active => {
            let end = start_ms.saturating_add(duration_ms);
            if now < end {
                (false, Some(end.saturating_sub(now) as f64 / 1000.0))
            } else {
                (true, Some(0.0))
            }
        }
        Some(_) => (true, Some(0.0)),
    };

    SpellCooldown {
        start_time_secs: start_ms as f64 / 1000.0,
        duration_ms,
        is_ready,
        remaining_secs,
        enabled,
    }
}
