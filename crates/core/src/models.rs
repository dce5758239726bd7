use crate::error::CastError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Default JSON-RPC port for media-center receivers
pub const DEFAULT_MEDIACENTER_PORT: u16 = 8080;

/// Wire protocol spoken by a receiver
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceProtocol {
    /// UPnP MediaRenderer driven through AVTransport SOAP actions
    Dlna,
    /// Media center driven through JSON-RPC 2.0
    #[serde(alias = "kodi")]
    MediaCenter,
}

impl DeviceProtocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceProtocol::Dlna => "dlna",
            DeviceProtocol::MediaCenter => "mediacenter",
        }
    }
}

impl fmt::Display for DeviceProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for invalid protocol strings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseProtocolError(String);

impl fmt::Display for ParseProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown device protocol '{}' (expected dlna or mediacenter)", self.0)
    }
}

impl std::error::Error for ParseProtocolError {}

impl FromStr for DeviceProtocol {
    type Err = ParseProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dlna" | "upnp" => Ok(DeviceProtocol::Dlna),
            "mediacenter" | "kodi" => Ok(DeviceProtocol::MediaCenter),
            other => Err(ParseProtocolError(other.to_string())),
        }
    }
}

/// A manually registered receiver
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    pub name: String,
    /// IPv4 dotted quad
    pub address: String,
    pub protocol: DeviceProtocol,
    /// JSON-RPC port, only meaningful for media-center receivers
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    DEFAULT_MEDIACENTER_PORT
}

impl Device {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        address: impl Into<String>,
        protocol: DeviceProtocol,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            address: address.into(),
            protocol,
            port: DEFAULT_MEDIACENTER_PORT,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Reject devices that cannot possibly be reached, before any request goes out
    pub fn validate(&self) -> Result<(), CastError> {
        if self.name.trim().is_empty() {
            return Err(CastError::Validation("device name is required".to_string()));
        }
        if self.address.trim().is_empty() {
            return Err(CastError::Validation("device address is required".to_string()));
        }
        if !is_ipv4_address(&self.address) {
            return Err(CastError::Validation(format!(
                "invalid IPv4 address '{}'",
                self.address
            )));
        }
        if self.protocol == DeviceProtocol::MediaCenter && self.port == 0 {
            return Err(CastError::Validation(format!(
                "device '{}' needs a non-zero port",
                self.name
            )));
        }
        Ok(())
    }
}

/// Dotted-quad check: four decimal octets, each 0-255
pub fn is_ipv4_address(address: &str) -> bool {
    let parts: Vec<&str> = address.split('.').collect();
    parts.len() == 4
        && parts.iter().all(|p| {
            !p.is_empty() && p.len() <= 3 && p.bytes().all(|b| b.is_ascii_digit())
        })
        && parts
            .iter()
            .map(|p| p.parse::<u16>())
            .all(|n| matches!(n, Ok(v) if v <= 255))
}

/// Directly fetchable media handed over by the link resolver
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaReference {
    pub url: String,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub size_bytes: Option<u64>,
}

impl MediaReference {
    pub fn new(url: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            filename: filename.into(),
            size_bytes: None,
        }
    }

    pub fn with_size(mut self, size_bytes: u64) -> Self {
        self.size_bytes = Some(size_bytes);
        self
    }

    pub fn validate(&self) -> Result<(), CastError> {
        let parsed = Url::parse(&self.url)
            .map_err(|e| CastError::Validation(format!("invalid media URL '{}': {}", self.url, e)))?;

        match parsed.scheme() {
            "http" | "https" if parsed.has_host() => Ok(()),
            _ => Err(CastError::Validation(format!(
                "media URL must be absolute http(s): {}",
                self.url
            ))),
        }
    }

    /// Declared filename, or the last segment of the URL when none was given
    pub fn display_filename(&self) -> String {
        let declared = self.filename.trim();
        if !declared.is_empty() {
            return declared.to_string();
        }

        let segment = Url::parse(&self.url)
            .ok()
            .and_then(|u| {
                u.path_segments()
                    .and_then(|mut segments| segments.next_back().map(str::to_string))
            })
            .or_else(|| self.url.rsplit('/').next().map(str::to_string))
            .unwrap_or_default();

        let decoded = urlencoding::decode(&segment)
            .map(|s| s.into_owned())
            .unwrap_or(segment);

        if decoded.trim().is_empty() {
            "video".to_string()
        } else {
            decoded
        }
    }
}

/// Result of one cast call, handed back to the presentation layer
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CastOutcome {
    Success {
        /// True when the media was appended to a queue instead of played immediately
        queued: bool,
        /// Set when playback could not be confirmed after the URI was accepted
        #[serde(default, skip_serializing_if = "Option::is_none")]
        warning: Option<String>,
    },
    Failure {
        reason: String,
    },
}

impl CastOutcome {
    pub fn playing() -> Self {
        CastOutcome::Success {
            queued: false,
            warning: None,
        }
    }

    pub fn queued() -> Self {
        CastOutcome::Success {
            queued: true,
            warning: None,
        }
    }

    pub fn degraded(warning: impl Into<String>) -> Self {
        CastOutcome::Success {
            queued: false,
            warning: Some(warning.into()),
        }
    }

    pub fn from_error(error: &CastError) -> Self {
        CastOutcome::Failure {
            reason: error.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, CastOutcome::Success { .. })
    }

    pub fn is_queued(&self) -> bool {
        matches!(self, CastOutcome::Success { queued: true, .. })
    }
}

impl From<Result<CastOutcome, CastError>> for CastOutcome {
    fn from(result: Result<CastOutcome, CastError>) -> Self {
        result.unwrap_or_else(|e| CastOutcome::from_error(&e))
    }
}
