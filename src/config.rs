use std::{
    collections::HashMap,
    fs::{self, File},
    io::prelude::*,
    net::SocketAddr,
    path::Path,
    time::Duration,
};

use log::warn;
use serde::{Deserialize, Serialize};

/// Top-level configuration for the server, loaded from a TOML file.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PandoraConfig {
    /// Socket address to bind to, e.g. "0.0.0.0:25565".
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Server list description.
    #[serde(default = "default_motd")]
    pub motd: String,

    /// Version name shown in the server list.
    #[serde(default = "default_version_name")]
    pub version_name: String,

    /// Advertised player slots.
    #[serde(default = "default_max_players")]
    pub max_players: i32,

    /// Largest frame a client may declare, in bytes.
    #[serde(default = "default_max_frame_size")]
    pub max_frame_size: usize,

    /// Idle read timeout in seconds. `0` disables it.
    #[serde(default = "default_read_timeout_secs")]
    pub read_timeout_secs: u64,

    /// Maximum concurrent connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Plain text sent to clients that try to log in.
    #[serde(default = "default_login_message")]
    pub login_message: String,

    #[serde(flatten)]
    pub other_fields: HashMap<String, toml::Value>,
}

fn default_bind() -> String {
    "0.0.0.0:25565".to_string()
}

fn default_motd() -> String {
    "Pandora".to_string()
}

fn default_version_name() -> String {
    "1.21.3".to_string()
}

fn default_max_players() -> i32 {
    10
}

fn default_max_frame_size() -> usize {
    1024 * 1024
}

fn default_read_timeout_secs() -> u64 {
    30
}

fn default_max_connections() -> u32 {
    1024
}

fn default_login_message() -> String {
    "This server only answers status queries".to_string()
}

impl Default for PandoraConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            motd: default_motd(),
            version_name: default_version_name(),
            max_players: default_max_players(),
            max_frame_size: default_max_frame_size(),
            read_timeout_secs: default_read_timeout_secs(),
            max_connections: default_max_connections(),
            login_message: default_login_message(),
            other_fields: HashMap::new(),
        }
    }
}

impl PandoraConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        let raw = fs::read_to_string(path)?;
        let config = Self::parse(&raw)?;

        for (key, value) in &config.other_fields {
            warn!("Unknown configuration '{key}' with value {value:?}");
        }

        Ok(config)
    }

    pub fn parse(raw: &str) -> Result<Self, ConfigLoadError> {
        let config: Self = toml::from_str(raw)?;
        if config.max_frame_size == 0 {
            return Err(ConfigLoadError::Invalid("max_frame_size must be positive"));
        }
        Ok(config)
    }

    /// Loads `path`, writing defaults there first if it does not exist.
    ///
    /// An existing file is rewritten so missing keys show up with their defaults.
    pub fn load_or_init(path: &Path) -> anyhow::Result<Self> {
        let config = match Self::load(path) {
            Ok(config) => config,
            Err(ConfigLoadError::Io(_)) => Self::default(),
            Err(err) => return Err(err.into()),
        };
        if let Err(err) = config.save(path) {
            warn!("Could not write config to {}: {err}", path.display());
        }
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let config_str = toml::to_string(&self)?;
        let mut file = File::create(path)?;
        file.write_all(config_str.as_bytes())?;
        Ok(())
    }

    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.bind.parse()?)
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        (self.read_timeout_secs > 0).then(|| Duration::from_secs(self.read_timeout_secs))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("Could not open config")]
    Io(#[from] std::io::Error),
    #[error("Could not parse: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config: {0}")]
    Invalid(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = PandoraConfig::parse("").unwrap();
        assert_eq!(config.bind, "0.0.0.0:25565");
        assert_eq!(config.max_players, 10);
        assert_eq!(config.max_frame_size, 1024 * 1024);
        assert_eq!(config.read_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn overrides_and_unknown_keys() {
        let config = PandoraConfig::parse(
            r#"
            bind = "127.0.0.1:25570"
            motd = "Hello"
            read_timeout_secs = 0
            colour = "blue"
            "#,
        )
        .unwrap();
        assert_eq!(config.bind_addr().unwrap().port(), 25570);
        assert_eq!(config.motd, "Hello");
        assert_eq!(config.read_timeout(), None);
        assert!(config.other_fields.contains_key("colour"));
    }

    #[test]
    fn zero_frame_size_is_rejected() {
        assert!(matches!(
            PandoraConfig::parse("max_frame_size = 0"),
            Err(ConfigLoadError::Invalid(_))
        ));
    }

    #[test]
    fn load_or_init_writes_defaults() {
        let path = std::env::temp_dir().join(format!("pandora-config-{}.toml", std::process::id()));
        let _ = fs::remove_file(&path);

        let config = PandoraConfig::load_or_init(&path).unwrap();
        assert_eq!(config.motd, "Pandora");
        let reloaded = PandoraConfig::load(&path).unwrap();
        assert_eq!(reloaded.bind, config.bind);

        fs::remove_file(&path).unwrap();
    }
}
