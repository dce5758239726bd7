use crate::models::{CastOutcome, Device, MediaReference};
use async_trait::async_trait;

/// Trait for protocol-specific receiver clients (DLNA, media center, ...)
#[async_trait]
pub trait Caster: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Start (or queue) playback of `media` on `device`.
    ///
    /// Never fails: every error is reported as `CastOutcome::Failure`.
    async fn cast(&self, device: &Device, media: &MediaReference) -> CastOutcome;
}
