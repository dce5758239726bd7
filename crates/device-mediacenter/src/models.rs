use debridcast_core::CastError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";

/// JSON-RPC 2.0 request body (one call per HTTP request)
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub method: &'a str,
    pub params: Value,
    pub id: u64,
}

impl<'a> JsonRpcRequest<'a> {
    pub fn new(method: &'a str, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            method,
            params,
            id: 1,
        }
    }
}

/// JSON-RPC 2.0 response envelope
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// Error object wins over result; a missing result is `Value::Null`
    pub fn into_result(self) -> Result<Value, CastError> {
        match self.error {
            Some(error) => Err(error.into()),
            None => Ok(self.result.unwrap_or(Value::Null)),
        }
    }
}

/// Error object returned in place of a result
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JsonRpcError {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

impl From<JsonRpcError> for CastError {
    fn from(e: JsonRpcError) -> Self {
        CastError::fault(e.code, e.message)
    }
}

/// Entry of `Player.GetActivePlayers`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ActivePlayer {
    #[serde(default)]
    pub playerid: i64,
    #[serde(default, rename = "type")]
    pub kind: String,
}

/// What the media center is doing right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Idle,
    Playing,
}

impl PlayerState {
    pub fn from_active_players(players: &[ActivePlayer]) -> Self {
        if players.is_empty() {
            PlayerState::Idle
        } else {
            PlayerState::Playing
        }
    }
}
