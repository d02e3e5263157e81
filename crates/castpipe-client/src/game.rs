use std::time::Duration;

use tracing::{debug, warn};

use castpipe_transport::Connector;

use crate::client::{log_failure, ChannelClient, Requester};
use crate::config::DEFAULT_REQUEST_TIMEOUT;
use crate::error::{ClientError, ParseError, Result};
use crate::parse::{self, Position, SpellCooldown, SpellInfo, SpellRange};

/// Unit token used by range checks when the caller doesn't name one.
pub const DEFAULT_UNIT: &str = "target";

const PING_TIMEOUT: Duration = Duration::from_millis(2000);
const LUA_TIMEOUT: Duration = Duration::from_millis(15_000);
const COOLDOWN_TIMEOUT: Duration = Duration::from_millis(1000);
const SPELL_INFO_TIMEOUT: Duration = Duration::from_millis(1000);
const GAME_TIME_TIMEOUT: Duration = Duration::from_millis(500);
const CAST_TIMEOUT: Duration = Duration::from_millis(1500);
const MOVE_TIMEOUT: Duration = Duration::from_millis(1500);

/// Typed game queries and actions over a [`Requester`].
///
/// Each accessor comes in two forms: `try_*` returns the reason for a
/// failure, the plain form logs it and returns `None` (or `false`).
#[derive(Debug)]
pub struct GameInterface<R> {
    requester: R,
    default_timeout: Duration,
}

impl<R: Requester> GameInterface<R> {
    pub fn new(requester: R) -> Self {
        Self {
            requester,
            default_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Timeout for accessors without a dedicated one.
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn requester(&self) -> &R {
        &self.requester
    }

    pub fn requester_mut(&mut self) -> &mut R {
        &mut self.requester
    }

    pub fn into_inner(self) -> R {
        self.requester
    }

    fn exchange<T>(
        &mut self,
        command: &str,
        timeout: Duration,
        parse: impl FnOnce(&str) -> std::result::Result<T, ParseError>,
    ) -> Result<T> {
        let reply = self.requester.request(command, timeout)?;
        parse(&reply).map_err(ClientError::from)
    }

    /// Round-trip `ping`; returns the reply text.
    pub fn try_ping(&mut self) -> Result<String> {
        self.requester.request("ping", PING_TIMEOUT)
    }

    pub fn ping(&mut self) -> bool {
        settle("ping", self.try_ping()).is_some()
    }

    /// Run a Lua snippet in the game and return its comma-separated results.
    /// Empty code returns an empty list without touching the channel.
    pub fn try_execute_lua(&mut self, code: &str) -> Result<Vec<String>> {
        if code.is_empty() {
            warn!("empty Lua code, nothing to execute");
            return Ok(Vec::new());
        }
        let command = format!("EXEC_LUA:{code}");
        self.exchange(&command, LUA_TIMEOUT, parse::parse_lua_result)
    }

    pub fn execute_lua(&mut self, code: &str) -> Option<Vec<String>> {
        settle("EXEC_LUA", self.try_execute_lua(code))
    }

    /// Cooldown of `spell_id`, with readiness judged against game time.
    ///
    /// Issues a second request for the game time. If that one fails the
    /// cooldown is still returned, with `remaining_secs` unknown.
    pub fn try_get_spell_cooldown(&mut self, spell_id: u32) -> Result<SpellCooldown> {
        let command = format!("GET_CD:{spell_id}");
        let raw = self.exchange(&command, COOLDOWN_TIMEOUT, parse::parse_cooldown)?;

        let now = match self.try_get_game_time_millis() {
            Ok(now) => Some(now),
            Err(err) => {
                warn!(spell_id, error = %err, "game time unavailable, cooldown readiness is a guess");
                None
            }
        };
        Ok(parse::cooldown_state(
            raw.start_ms,
            raw.duration_ms,
            now,
            raw.enabled,
        ))
    }

    pub fn get_spell_cooldown(&mut self, spell_id: u32) -> Option<SpellCooldown> {
        settle("GET_CD", self.try_get_spell_cooldown(spell_id))
    }

    pub fn try_get_spell_range(&mut self, spell_id: u32) -> Result<SpellRange> {
        let command = format!("GET_RANGE:{spell_id}");
        let timeout = self.default_timeout;
        self.exchange(&command, timeout, parse::parse_range)
    }

    pub fn get_spell_range(&mut self, spell_id: u32) -> Option<SpellRange> {
        settle("GET_RANGE", self.try_get_spell_range(spell_id))
    }

    pub fn try_is_spell_in_range(&mut self, spell_id: u32, unit: &str) -> Result<bool> {
        let command = format!("IS_IN_RANGE:{spell_id},{unit}");
        let timeout = self.default_timeout;
        self.exchange(&command, timeout, parse::parse_in_range)
    }

    pub fn is_spell_in_range(&mut self, spell_id: u32, unit: &str) -> Option<bool> {
        settle("IS_IN_RANGE", self.try_is_spell_in_range(spell_id, unit))
    }

    pub fn try_get_spell_info(&mut self, spell_id: u32) -> Result<SpellInfo> {
        let command = format!("GET_SPELL_INFO:{spell_id}");
        self.exchange(&command, SPELL_INFO_TIMEOUT, parse::parse_spell_info)
    }

    pub fn get_spell_info(&mut self, spell_id: u32) -> Option<SpellInfo> {
        settle("GET_SPELL_INFO", self.try_get_spell_info(spell_id))
    }

    /// Game clock in milliseconds.
    pub fn try_get_game_time_millis(&mut self) -> Result<i64> {
        self.exchange("GET_TIME_MS", GAME_TIME_TIMEOUT, parse::parse_game_time)
    }

    pub fn get_game_time_millis(&mut self) -> Option<i64> {
        settle("GET_TIME_MS", self.try_get_game_time_millis())
    }

    /// Cast `spell_id` at `target_guid` (0 lets the game pick). Returns
    /// whether the game accepted the cast.
    pub fn try_cast_spell(&mut self, spell_id: u32, target_guid: u64) -> Result<bool> {
        let command = format!("CAST_SPELL:{spell_id},{target_guid}");
        let accepted = self.exchange(&command, CAST_TIMEOUT, parse::parse_cast_result)?;
        debug!(spell_id, target_guid, accepted, "cast result");
        Ok(accepted)
    }

    pub fn cast_spell(&mut self, spell_id: u32, target_guid: u64) -> bool {
        settle("CAST_SPELL", self.try_cast_spell(spell_id, target_guid)).unwrap_or(false)
    }

    /// Combo points on the current target.
    ///
    /// The peer sends `-1` when there is no valid target; that reads as 0.
    /// Lower values are peer error codes.
    pub fn try_get_combo_points(&mut self) -> Result<i32> {
        let timeout = self.default_timeout;
        let points = self.exchange("GET_COMBO_POINTS", timeout, parse::parse_combo_points)?;
        match points {
            -1 => {
                warn!("no combo point target, reporting 0");
                Ok(0)
            }
            code if code < -1 => Err(ClientError::PeerReported {
                command: "GET_COMBO_POINTS".to_string(),
                reply: format!("CP:{code}"),
            }),
            points => Ok(points),
        }
    }

    pub fn get_combo_points(&mut self) -> Option<i32> {
        settle("GET_COMBO_POINTS", self.try_get_combo_points())
    }

    pub fn try_get_target_guid(&mut self) -> Result<u64> {
        let timeout = self.default_timeout;
        self.exchange("GET_TARGET_GUID", timeout, parse::parse_target_guid)
    }

    pub fn get_target_guid(&mut self) -> Option<u64> {
        settle("GET_TARGET_GUID", self.try_get_target_guid())
    }

    /// Whether the player stands behind the unit with `target_guid`.
    pub fn try_is_behind_target(&mut self, target_guid: u64) -> Result<bool> {
        if target_guid == 0 {
            return Err(ClientError::InvalidArgument(
                "target guid must be nonzero".to_string(),
            ));
        }
        let command = format!("IS_BEHIND_TARGET:{target_guid:X}");
        let timeout = self.default_timeout;
        self.exchange(&command, timeout, parse::parse_behind_target)
    }

    pub fn is_behind_target(&mut self, target_guid: u64) -> Option<bool> {
        if target_guid == 0 {
            return None;
        }
        settle("IS_BEHIND_TARGET", self.try_is_behind_target(target_guid))
    }

    /// Start moving the player to `position`.
    ///
    /// Coordinates always carry a decimal point (`1.0`, not `1`).
    pub fn try_move_to(&mut self, position: Position) -> Result<bool> {
        let Position { x, y, z } = position;
        let command = format!("MOVE_TO:{x:?},{y:?},{z:?}");
        self.exchange(&command, MOVE_TIMEOUT, parse::parse_move_result)
    }

    pub fn move_to(&mut self, position: Position) -> bool {
        settle("MOVE_TO", self.try_move_to(position)).unwrap_or(false)
    }
}

impl<C: Connector> GameInterface<ChannelClient<C>> {
    /// Accessors over `client`, defaulting to its configured request timeout.
    pub fn from_client(client: ChannelClient<C>) -> Self {
        let timeout = client.config().request_timeout;
        Self::new(client).with_default_timeout(timeout)
    }
}

fn settle<T>(command: &str, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            log_failure(command, &err);
            None
        }
    }
}
