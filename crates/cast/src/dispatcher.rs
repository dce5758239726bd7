use debridcast_core::{
    CastConfig, CastError, CastOutcome, Caster, Device, DeviceProtocol, MediaReference,
};
use debridcast_device_dlna::DlnaRendererClient;
use debridcast_device_mediacenter::MediaCenterClient;
use tracing::{info, warn};

/// Single entry point over every supported receiver protocol
pub struct CastDispatcher {
    dlna: Box<dyn Caster>,
    media_center: Box<dyn Caster>,
}

impl CastDispatcher {
    /// Create a dispatcher backed by the real protocol clients
    pub fn new(config: CastConfig) -> Result<Self, CastError> {
        Ok(Self {
            dlna: Box::new(DlnaRendererClient::new(config.clone())?),
            media_center: Box::new(MediaCenterClient::new(config)?),
        })
    }

    /// Create a dispatcher from arbitrary clients
    pub fn from_casters(dlna: Box<dyn Caster>, media_center: Box<dyn Caster>) -> Self {
        Self { dlna, media_center }
    }

    /// Client responsible for a protocol
    pub fn caster_for(&self, protocol: DeviceProtocol) -> &dyn Caster {
        match protocol {
            DeviceProtocol::MediaCenter => self.media_center.as_ref(),
            DeviceProtocol::Dlna => self.dlna.as_ref(),
        }
    }

    /// Cast `media` to `device`; invalid input is rejected before any request
    pub async fn cast(&self, device: &Device, media: &MediaReference) -> CastOutcome {
        if let Err(e) = device.validate().and_then(|_| media.validate()) {
            warn!("Rejecting cast to {}: {}", device.name, e);
            return CastOutcome::from_error(&e);
        }

        let caster = self.caster_for(device.protocol);
        info!(
            "Casting {} to {} ({} via {})",
            media.url,
            device.name,
            device.address,
            caster.name()
        );

        let outcome = caster.cast(device, media).await;
        match &outcome {
            CastOutcome::Success { queued: true, .. } => info!("Queued on {}", device.name),
            CastOutcome::Success { warning: Some(w), .. } => {
                warn!("Sent to {} with warning: {}", device.name, w)
            }
            CastOutcome::Success { .. } => info!("Playing on {}", device.name),
            CastOutcome::Failure { reason } => warn!("Cast to {} failed: {}", device.name, reason),
        }
        outcome
    }
}
