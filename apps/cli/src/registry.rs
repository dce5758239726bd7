/// Device registry operations on the loaded config
use crate::config::AppConfig;
use anyhow::{anyhow, Result};
use debridcast_core::{Device, DeviceProtocol, DEFAULT_MEDIACENTER_PORT};

impl AppConfig {
    pub fn list(&self) -> &[Device] {
        &self.devices
    }

    /// Register a receiver under a fresh id
    pub fn add(
        &mut self,
        name: &str,
        address: &str,
        protocol: DeviceProtocol,
        port: Option<u16>,
    ) -> Result<&Device> {
        let device = Device::new(
            uuid::Uuid::new_v4().to_string(),
            name.trim(),
            address.trim(),
            protocol,
        )
        .with_port(port.unwrap_or(DEFAULT_MEDIACENTER_PORT));

        device.validate()?;
        tracing::info!("Adding {} device '{}' at {}", protocol, device.name, device.address);

        self.devices.push(device);
        Ok(&self.devices[self.devices.len() - 1])
    }

    pub fn remove(&mut self, id: &str) -> Result<Device> {
        let idx = self
            .devices
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| anyhow!("Device '{}' not found", id))?;

        if self.default_device.as_deref() == Some(id) {
            self.default_device = None;
        }

        Ok(self.devices.remove(idx))
    }

    pub fn set_default(&mut self, id: &str) -> Result<()> {
        if !self.devices.iter().any(|d| d.id == id) {
            return Err(anyhow!("Device '{}' not found", id));
        }
        self.default_device = Some(id.to_string());
        Ok(())
    }

    /// Pick a device by id or name; without a selector use the default, then the first one
    pub fn resolve(&self, selector: Option<&str>) -> Result<&Device> {
        if let Some(selector) = selector {
            return self
                .devices
                .iter()
                .find(|d| d.id == selector || d.name.eq_ignore_ascii_case(selector))
                .ok_or_else(|| anyhow!("No device matches '{}'", selector));
        }

        self.default_device
            .as_deref()
            .and_then(|id| self.devices.iter().find(|d| d.id == id))
            .or_else(|| self.devices.first())
            .ok_or_else(|| anyhow!("No devices configured; add one with `debridcast devices add`"))
    }
}
