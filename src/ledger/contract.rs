//! Score Contract
//!
//! Function identifiers and result parsing for the on-chain score module:
//!
//! - `update_score(u64)`: entry function, records the caller's score
//! - `get_top_players()`: view, returns `[[{address, score}, ...]]`
//! - `get_player_score(address)`: view, returns `[score]`

use serde_json::Value;
use tracing::debug;

use super::types::{AccountAddress, EntryFunctionPayload, ScoreRecord, ViewRequest};
use super::{FetchError, LedgerClient};

/// Entry function that records a score.
pub const UPDATE_SCORE: &str = "update_score";
/// View returning the top players.
pub const GET_TOP_PLAYERS: &str = "get_top_players";
/// View returning one player's score.
pub const GET_PLAYER_SCORE: &str = "get_player_score";

/// Location of the score module on chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreContract {
    /// Publishing account.
    pub address: AccountAddress,
    /// Module name.
    pub module: String,
}

impl ScoreContract {
    /// Create a contract reference.
    pub fn new(address: AccountAddress, module: impl Into<String>) -> Self {
        Self {
            address,
            module: module.into(),
        }
    }

    /// Fully qualified function id: `<address>::<module>::<name>`.
    pub fn function_id(&self, name: &str) -> String {
        format!("{}::{}::{}", self.address, self.module, name)
    }

    /// `update_score` payload. The score travels as a u64 decimal string.
    pub fn update_score(&self, score: u64) -> EntryFunctionPayload {
        EntryFunctionPayload::new(
            self.function_id(UPDATE_SCORE),
            vec![Value::String(score.to_string())],
        )
    }

    /// `get_top_players` view request.
    pub fn top_players(&self) -> ViewRequest {
        ViewRequest {
            function: self.function_id(GET_TOP_PLAYERS),
            type_arguments: Vec::new(),
            arguments: Vec::new(),
        }
    }

    /// `get_player_score` view request.
    pub fn player_score(&self, player: &AccountAddress) -> ViewRequest {
        ViewRequest {
            function: self.function_id(GET_PLAYER_SCORE),
            type_arguments: Vec::new(),
            arguments: vec![Value::String(player.to_hex_literal())],
        }
    }
}

/// Fetch the leaderboard rows in the order the contract returns them.
pub async fn fetch_leaderboard<L: LedgerClient + ?Sized>(
    client: &L,
    contract: &ScoreContract,
) -> Result<Vec<ScoreRecord>, FetchError> {
    let result = client.view(&contract.top_players()).await?;
    let rows = single_value(result)?;
    let records: Vec<ScoreRecord> = serde_json::from_value(rows)
        .map_err(|e| FetchError::UnexpectedShape(format!("top players: {}", e)))?;

    debug!("Fetched {} leaderboard rows", records.len());
    Ok(records)
}

/// Fetch a single player's recorded score.
pub async fn fetch_player_score<L: LedgerClient + ?Sized>(
    client: &L,
    contract: &ScoreContract,
    player: &AccountAddress,
) -> Result<u64, FetchError> {
    let result = client.view(&contract.player_score(player)).await?;
    parse_u64(&single_value(result)?)
}

/// Views answer with an array holding exactly one return value.
fn single_value(result: Vec<Value>) -> Result<Value, FetchError> {
    let count = result.len();
    let mut iter = result.into_iter();
    match (iter.next(), count) {
        (Some(value), 1) => Ok(value),
        _ => Err(FetchError::UnexpectedShape(format!(
            "expected 1 return value, got {}",
            count
        ))),
    }
}

fn parse_u64(value: &Value) -> Result<u64, FetchError> {
    match value {
        Value::String(s) => s
            .parse()
            .map_err(|_| FetchError::UnexpectedShape(format!("not a u64: {:?}", s))),
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| FetchError::UnexpectedShape(format!("not a u64: {}", n))),
        other => Err(FetchError::UnexpectedShape(format!("not a u64: {}", other))),
    }
}
