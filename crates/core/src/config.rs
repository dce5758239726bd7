use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Well-known AVTransport service URN
pub const AVTRANSPORT_SERVICE: &str = "urn:schemas-upnp-org:service:AVTransport:1";

/// Tunables shared by the protocol clients
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CastConfig {
    /// Upper bound for each individual HTTP request
    pub request_timeout_secs: u64,
    /// Port of the renderer's AVTransport control endpoint
    pub dlna_port: u16,
    pub dlna_control_path: String,
    pub avtransport_service: String,
    /// Media-center playlist that receives queued videos
    pub video_playlist_id: u32,
}

impl Default for CastConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 8,
            dlna_port: 9197,
            dlna_control_path: "/upnp/control/AVTransport1".to_string(),
            avtransport_service: AVTRANSPORT_SERVICE.to_string(),
            video_playlist_id: 1,
        }
    }
}

impl CastConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// `http://<address>:<dlna_port><dlna_control_path>`
    pub fn dlna_control_url(&self, address: &str) -> String {
        let path = if self.dlna_control_path.starts_with('/') {
            self.dlna_control_path.clone()
        } else {
            format!("/{}", self.dlna_control_path)
        };
        format!("http://{}:{}{}", address, self.dlna_port, path)
    }

    /// `http://<address>:<port>/jsonrpc`
    pub fn jsonrpc_url(&self, address: &str, port: u16) -> String {
        format!("http://{}:{}/jsonrpc", address, port)
    }
}
