use anyhow::{Context, Result};
use debridcast_core::{CastConfig, Device};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Contents of `config.toml`: client tunables plus the device registry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_device: Option<String>,
    #[serde(default)]
    pub cast: CastConfig,
    #[serde(default)]
    pub devices: Vec<Device>,
}

impl AppConfig {
    /// Load from `path`; a missing file yields an empty registry
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = toml::from_str(&text)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let text = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;

        tracing::debug!("Saved config to {}", path.display());
        Ok(())
    }
}

/// Get the config file path (platform-specific)
pub fn default_config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Failed to get config directory"))?
        .join("debridcast");

    Ok(config_dir.join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use debridcast_core::DeviceProtocol;

    const SAMPLE: &str = r#"
default_device = "kodi-1"

[cast]
request_timeout_secs = 5

[[devices]]
id = "tv-1"
name = "Living Room"
address = "192.168.1.50"
protocol = "dlna"

[[devices]]
id = "kodi-1"
name = "Kodi"
address = "192.168.1.60"
protocol = "kodi"
port = 9090
"#;

    #[test]
    fn test_parse_sample() {
        let config: AppConfig = toml::from_str(SAMPLE).unwrap();
        assert_eq!(config.default_device.as_deref(), Some("kodi-1"));
        assert_eq!(config.cast.request_timeout_secs, 5);
        assert_eq!(config.cast.dlna_port, 9197);
        assert_eq!(config.devices.len(), 2);
        assert_eq!(config.devices[0].port, 8080);
        assert_eq!(config.devices[1].protocol, DeviceProtocol::MediaCenter);
        assert_eq!(config.devices[1].port, 9090);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let path = std::env::temp_dir().join(format!("debridcast-missing-{}.toml", uuid::Uuid::new_v4()));
        assert_eq!(AppConfig::load(&path).unwrap(), AppConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = std::env::temp_dir().join(format!("debridcast-{}", uuid::Uuid::new_v4()));
        let path = dir.join("config.toml");

        let config: AppConfig = toml::from_str(SAMPLE).unwrap();
        config.save(&path).unwrap();
        assert_eq!(AppConfig::load(&path).unwrap(), config);

        std::fs::remove_dir_all(dir).ok();
    }
}
