use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Settings read from config.json. Every field has a default so a partial
/// file (or no file at all) works. CLI flags override whatever was loaded.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub listen: ListenSettings,
    pub transport: TransportSettings,
    pub automation: AutomationSettings,
    pub debug: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListenSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TransportSettings {
    /// Serve OSC over TCP instead of UDP.
    pub tcp: bool,
    /// SLIP framing on TCP (OSC 1.1) instead of packet-length framing.
    pub slip: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AutomationSettings {
    /// Real key injection. Off means key actions are only logged.
    pub enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: ListenSettings::default(),
            transport: TransportSettings::default(),
            automation: AutomationSettings::default(),
            debug: false,
        }
    }
}

impl Default for ListenSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 6379,
        }
    }
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            tcp: false,
            slip: false,
        }
    }
}

impl Default for AutomationSettings {
    fn default() -> Self {
        Self { enabled: false }
    }
}

impl Config {
    /// Load settings from `path`. A missing file yields the defaults; an
    /// unreadable or malformed file is an error.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)?;
        let config = serde_json::from_str(&text)
            .map_err(|err| Error::Config(format!("{}: {}", path.display(), err)))?;
        Ok(config)
    }

    /// Address string the listener binds, "host:port".
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.listen.host, self.listen.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.listen.host, "0.0.0.0");
        assert_eq!(config.listen.port, 6379);
        assert!(!config.transport.tcp);
        assert!(!config.transport.slip);
        assert!(!config.automation.enabled);
        assert!(!config.debug);
        assert_eq!(config.bind_addr(), "0.0.0.0:6379");
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(dir.path().join("config.json")).unwrap();
        assert_eq!(config.listen.port, 6379);
    }

    #[test]
    fn test_load_full_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{
                "listen": { "host": "127.0.0.1", "port": 9000 },
                "transport": { "tcp": true, "slip": true },
                "automation": { "enabled": true },
                "debug": true
            }"#,
        )
        .unwrap();

        let config = Config::load_or_default(&path).unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:9000");
        assert!(config.transport.tcp);
        assert!(config.transport.slip);
        assert!(config.automation.enabled);
        assert!(config.debug);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "listen": { "port": 9000 } }"#).unwrap();

        let config = Config::load_or_default(&path).unwrap();
        assert_eq!(config.listen.host, "0.0.0.0");
        assert_eq!(config.listen.port, 9000);
        assert!(!config.transport.tcp);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let err = Config::load_or_default(&path).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
