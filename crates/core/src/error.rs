use thiserror::Error;

/// UPnP error code for "Transition not available"
pub const UPNP_TRANSITION_NOT_AVAILABLE: u32 = 701;

/// Everything that can go wrong during a single cast call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CastError {
    /// Device or media reference rejected before any request was sent
    #[error("invalid input: {0}")]
    Validation(String),

    /// Connect/timeout/DNS failure
    #[error("transport error: {0}")]
    Transport(String),

    /// Receiver answered with a non-2xx status and no recognisable fault
    #[error("receiver returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// Well-formed SOAP fault or JSON-RPC error object
    #[error("receiver fault {code}: {description}")]
    Fault { code: i64, description: String },

    /// Receiver sent something we could not parse
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl CastError {
    pub fn fault(code: i64, description: impl Into<String>) -> Self {
        CastError::Fault {
            code,
            description: description.into(),
        }
    }

    /// A Play request refused with 701 means the renderer is already transitioning
    pub fn is_benign_play_fault(&self) -> bool {
        matches!(self, CastError::Fault { code, .. } if *code == UPNP_TRANSITION_NOT_AVAILABLE as i64)
    }

    /// Faults are answers from the receiver; everything else means we never got one
    pub fn is_fault(&self) -> bool {
        matches!(self, CastError::Fault { .. })
    }
}

impl From<reqwest::Error> for CastError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            CastError::MalformedResponse(e.to_string())
        } else {
            CastError::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for CastError {
    fn from(e: serde_json::Error) -> Self {
        CastError::MalformedResponse(e.to_string())
    }
}
