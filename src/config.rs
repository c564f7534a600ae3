use std::path::{Path, PathBuf};

use color_eyre::{eyre::eyre, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn, Level};

use crate::mqtt::MqttConfig;
use crate::sync::{TopicKey, TopicRegistry};

const CONFIG_DIR: &str = "smarthome-bridge";
const CONFIG_FILE: &str = "config.toml";

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    /// trace, debug, info, warn or error
    pub log_level: String,
    pub mqtt: MqttConfig,
    pub topics: TopicConfig,
    pub ui: UiConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            mqtt: MqttConfig::default(),
            topics: TopicConfig::default(),
            ui: UiConfig::default(),
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct TopicConfig {
    /// Keys of the inbound topics to subscribe, e.g. "temp" or "luz1"
    pub subscriptions: Vec<String>,
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            subscriptions: TopicKey::ALL.iter().map(|k| k.key().to_string()).collect(),
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct UiConfig {
    pub log_capacity: usize,
    pub repaint_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            log_capacity: 200,
            repaint_ms: 33,
        }
    }
}

impl AppConfig {
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: AppConfig =
            toml::from_str(content).map_err(|e| eyre!("Failed to parse config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| eyre!("Failed to serialize config: {}", e))
    }

    pub fn validate(&self) -> Result<()> {
        self.registry()?;
        self.level()?;
        Ok(())
    }

    pub fn registry(&self) -> Result<TopicRegistry> {
        TopicRegistry::from_keys(&self.topics.subscriptions)
            .map_err(|e| eyre!("Invalid topic subscription: {}", e))
    }

    pub fn level(&self) -> Result<Level> {
        self.log_level
            .parse::<Level>()
            .map_err(|_| eyre!("Invalid log level: {}", self.log_level))
    }

    /// Reads the config file, writing the defaults first if there is none.
    pub async fn load_or_init(path: &Path) -> Result<Self> {
        let exists = tokio::fs::try_exists(path)
            .await
            .map_err(|e| eyre!("Failed to check if config exists: {}", e))?;

        if !exists {
            let config = AppConfig::default();
            config.save(path).await?;
            info!("Wrote default config to {}", path.display());
            return Ok(config);
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| eyre!("Failed to read config {}: {}", path.display(), e))?;
        debug!("Loaded config from {}", path.display());
        Self::from_toml(&content)
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| eyre!("Failed to create config directory: {}", e))?;
        }
        tokio::fs::write(path, self.to_toml()?)
            .await
            .map_err(|e| eyre!("Failed to write config: {}", e))
    }
}

pub fn default_config_path() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_else(|| {
        warn!("Could not determine config directory, using current directory");
        PathBuf::from(".")
    });
    path.push(CONFIG_DIR);
    path.push(CONFIG_FILE);
    path
}
