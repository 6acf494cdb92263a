//! Configuration types for the Vigil harness

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main harness configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VigilConfig {
    /// HTTP listener settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Traffic statistics settings
    #[serde(default)]
    pub stats: StatsConfig,

    /// Durable log and live-view filter settings
    #[serde(default)]
    pub log: LogConfig,

    /// Received-message retention settings
    #[serde(default)]
    pub messages: MessageConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

/// Traffic statistics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsConfig {
    /// How many minutes of per-minute request buckets to retain
    #[serde(default = "default_retention_minutes")]
    pub retention_minutes: u32,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            retention_minutes: default_retention_minutes(),
        }
    }
}

/// Durable log configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Append-only log file path. Never rotated or truncated.
    #[serde(default = "default_log_file")]
    pub file: String,

    /// Initial live-view filter
    #[serde(default)]
    pub filter: FilterConfig,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file: default_log_file(),
            filter: FilterConfig::default(),
        }
    }
}

/// Live-view filter configuration. An absent field matches any value.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FilterConfig {
    /// Only forward entries with this exact HTTP method
    #[serde(default)]
    pub method: Option<String>,

    /// Only forward entries with this exact response status
    #[serde(default)]
    pub status: Option<u16>,
}

/// Received-message retention configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageConfig {
    /// Maximum number of received messages kept in memory
    #[serde(default = "default_message_capacity")]
    pub capacity: usize,
}

impl Default for MessageConfig {
    fn default() -> Self {
        Self {
            capacity: default_message_capacity(),
        }
    }
}

// Default value functions
fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_retention_minutes() -> u32 {
    60
}

fn default_log_file() -> String {
    "vigil.log".to_string()
}

fn default_message_capacity() -> usize {
    1024
}

impl VigilConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Save configuration to a TOML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;
        std::fs::write(path.as_ref(), content)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Address string the HTTP listener binds to
    pub fn bind_target(&self) -> String {
        format!("{}:{}", self.server.bind_address, self.server.port)
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = VigilConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.bind_address, "127.0.0.1");
        assert_eq!(config.stats.retention_minutes, 60);
        assert_eq!(config.log.file, "vigil.log");
        assert!(config.log.filter.method.is_none());
        assert!(config.log.filter.status.is_none());
        assert_eq!(config.messages.capacity, 1024);
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[server]
bind_address = "0.0.0.0"
port = 3000

[stats]
retention_minutes = 15

[log]
file = "/tmp/vigil-test.log"

[log.filter]
method = "GET"
status = 200

[messages]
capacity = 32
"#;

        let config = VigilConfig::from_toml(toml).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.bind_address, "0.0.0.0");
        assert_eq!(config.stats.retention_minutes, 15);
        assert_eq!(config.log.file, "/tmp/vigil-test.log");
        assert_eq!(config.log.filter.method.as_deref(), Some("GET"));
        assert_eq!(config.log.filter.status, Some(200));
        assert_eq!(config.messages.capacity, 32);
        assert_eq!(config.bind_target(), "0.0.0.0:3000");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = VigilConfig::from_toml("[server]\nport = 9000\n").unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.bind_address, "127.0.0.1");
        assert_eq!(config.stats.retention_minutes, 60);
    }
}
