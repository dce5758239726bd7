use crate::models::*;
use async_trait::async_trait;
use debridcast_core::{
    jsonrpc_item, CastConfig, CastError, CastOutcome, Caster, Device, MediaReference,
};
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

/// Media-center controller using the JSON-RPC 2.0 HTTP API
///
/// Endpoint format: http://{address}:{port}/jsonrpc
pub struct MediaCenterClient {
    client: Client,
    config: CastConfig,
}

impl MediaCenterClient {
    pub fn new(config: CastConfig) -> Result<Self, CastError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self { client, config })
    }

    /// Execute a single JSON-RPC call and return its `result`
    async fn call(&self, endpoint: &str, method: &str, params: Value) -> Result<Value, CastError> {
        let request = JsonRpcRequest::new(method, params);
        debug!("JSON-RPC call: {} -> {}", method, endpoint);

        let response = self.client.post(endpoint).json(&request).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(CastError::HttpStatus {
                status: status.as_u16(),
                body: text,
            });
        }

        debug!("JSON-RPC response: {}", text);
        let parsed: JsonRpcResponse = serde_json::from_str(&text)?;
        parsed.into_result()
    }

    /// Query whether something is playing
    ///
    /// Method: Player.GetActivePlayers
    /// Response: [] when idle, [{"playerid":1,"type":"video"}] while playing
    pub async fn player_state(&self, endpoint: &str) -> Result<PlayerState, CastError> {
        let result = self
            .call(endpoint, "Player.GetActivePlayers", json!({}))
            .await?;

        let players: Vec<ActivePlayer> = match result {
            Value::Null => Vec::new(),
            Value::Array(_) => serde_json::from_value(result)?,
            other => {
                return Err(CastError::MalformedResponse(format!(
                    "expected an array of active players, got {}",
                    other
                )))
            }
        };

        Ok(PlayerState::from_active_players(&players))
    }

    /// Play an item immediately
    ///
    /// Method: Player.Open
    pub async fn open(&self, endpoint: &str, item: Value) -> Result<(), CastError> {
        self.call(endpoint, "Player.Open", json!({ "item": item }))
            .await?;
        Ok(())
    }

    /// Append an item to the video playlist
    ///
    /// Method: Playlist.Add
    pub async fn playlist_add(&self, endpoint: &str, item: Value) -> Result<(), CastError> {
        let params = json!({
            "playlistid": self.config.video_playlist_id,
            "item": item,
        });
        self.call(endpoint, "Playlist.Add", params).await?;
        Ok(())
    }

    async fn try_cast(
        &self,
        device: &Device,
        media: &MediaReference,
    ) -> Result<CastOutcome, CastError> {
        device.validate()?;
        media.validate()?;

        let endpoint = self.config.jsonrpc_url(&device.address, device.port);
        let item = jsonrpc_item(media);

        match self.player_state(&endpoint).await? {
            PlayerState::Playing => {
                info!(
                    "{} is playing, queuing to playlist {}",
                    device.name, self.config.video_playlist_id
                );
                self.playlist_add(&endpoint, item).await?;
                Ok(CastOutcome::queued())
            }
            PlayerState::Idle => {
                info!("{} is idle, playing immediately", device.name);
                self.open(&endpoint, item).await?;
                Ok(CastOutcome::playing())
            }
        }
    }
}

#[async_trait]
impl Caster for MediaCenterClient {
    fn name(&self) -> &'static str {
        "mediacenter"
    }

    async fn cast(&self, device: &Device, media: &MediaReference) -> CastOutcome {
        let outcome = CastOutcome::from(self.try_cast(device, media).await);
        if let CastOutcome::Failure { reason } = &outcome {
            warn!("Media-center cast to {} failed: {}", device.name, reason);
        }
        outcome
    }
}
