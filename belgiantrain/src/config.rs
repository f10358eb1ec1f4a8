//! Process configuration, loaded from YAML.

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::cache::CacheConfig;
use crate::irail::IrailConfig;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "BELGIANTRAIN_CONFIG";

/// Used when [`CONFIG_ENV`] is not set.
pub const DEFAULT_CONFIG_PATH: &str = "belgiantrain.yaml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Address the HTTP surface listens on (default: 127.0.0.1:8123)
    #[serde(default = "Config::default_bind")]
    pub bind: SocketAddr,
    /// Seconds between coordinator refreshes (default: 60)
    #[serde(default = "Config::default_update_interval_secs")]
    pub update_interval_secs: u64,
    /// Seconds between station list refreshes (default: one day)
    #[serde(default = "Config::default_station_refresh_secs")]
    pub station_refresh_secs: u64,
    #[serde(default)]
    pub irail: IrailSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    /// Station pairs to monitor
    #[serde(default)]
    pub connections: Vec<ConnectionEntry>,
    /// Stations whose departure board is monitored on its own
    #[serde(default)]
    pub liveboards: Vec<LiveboardEntry>,
}

impl Config {
    fn default_bind() -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], 8123))
    }
    fn default_update_interval_secs() -> u64 {
        60
    }
    fn default_station_refresh_secs() -> u64 {
        24 * 60 * 60
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::ReadError(e.to_string()))?;

        Self::parse(&content)
    }

    /// Load from the file named by `BELGIANTRAIN_CONFIG`, or the default
    /// path.
    pub fn from_env() -> Result<Self, ConfigError> {
        let path =
            std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load(path)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.update_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "update_interval_secs must be greater than 0".into(),
            ));
        }
        if self.station_refresh_secs == 0 {
            return Err(ConfigError::Invalid(
                "station_refresh_secs must be greater than 0".into(),
            ));
        }
        if self.irail.max_concurrent == 0 {
            return Err(ConfigError::Invalid(
                "irail.max_concurrent must be greater than 0".into(),
            ));
        }
        if self.irail.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "irail.timeout_secs must be greater than 0".into(),
            ));
        }
        if self.cache.enabled && self.cache.ttl_secs == 0 {
            return Err(ConfigError::Invalid(
                "cache.ttl_secs must be greater than 0 when the cache is enabled".into(),
            ));
        }
        if self.cache.enabled && self.cache.ttl_secs >= self.update_interval_secs {
            return Err(ConfigError::Invalid(format!(
                "cache.ttl_secs ({}) must be shorter than update_interval_secs ({})",
                self.cache.ttl_secs, self.update_interval_secs
            )));
        }
        Ok(())
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval_secs)
    }

    pub fn station_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.station_refresh_secs)
    }
}

/// iRail client settings.
#[derive(Debug, Clone, Deserialize)]
pub struct IrailSettings {
    #[serde(default = "IrailSettings::default_base_url")]
    pub base_url: String,
    /// Language of station names and messages (default: en)
    #[serde(default = "IrailSettings::default_language")]
    pub language: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "IrailSettings::default_timeout_secs")]
    pub timeout_secs: u64,
    /// Maximum concurrent requests to iRail (default: 5)
    #[serde(default = "IrailSettings::default_max_concurrent")]
    pub max_concurrent: usize,
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for IrailSettings {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            language: Self::default_language(),
            timeout_secs: Self::default_timeout_secs(),
            max_concurrent: Self::default_max_concurrent(),
            user_agent: None,
        }
    }
}

impl IrailSettings {
    fn default_base_url() -> String {
        IrailConfig::default().base_url
    }
    fn default_language() -> String {
        "en".to_string()
    }
    fn default_timeout_secs() -> u64 {
        30
    }
    fn default_max_concurrent() -> usize {
        5
    }

    pub fn to_client_config(&self) -> IrailConfig {
        let config = IrailConfig::default()
            .with_base_url(&self.base_url)
            .with_language(&self.language)
            .with_timeout(self.timeout_secs)
            .with_max_concurrent(self.max_concurrent);

        match &self.user_agent {
            Some(agent) => config.with_user_agent(agent),
            None => config,
        }
    }
}

/// Response cache settings.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    /// Whether board and connection responses are cached (default: true)
    #[serde(default = "CacheSettings::default_enabled")]
    pub enabled: bool,
    /// Seconds a cached response stays valid (default: 30)
    #[serde(default = "CacheSettings::default_ttl_secs")]
    pub ttl_secs: u64,
    /// Maximum cached responses per kind (default: 256)
    #[serde(default = "CacheSettings::default_max_capacity")]
    pub max_capacity: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            ttl_secs: Self::default_ttl_secs(),
            max_capacity: Self::default_max_capacity(),
        }
    }
}

impl CacheSettings {
    fn default_enabled() -> bool {
        true
    }
    fn default_ttl_secs() -> u64 {
        30
    }
    fn default_max_capacity() -> u64 {
        256
    }

    pub fn to_cache_config(&self) -> CacheConfig {
        CacheConfig {
            ttl: Duration::from_secs(self.ttl_secs),
            max_capacity: self.max_capacity,
        }
    }
}

/// A monitored station pair.
///
/// Stations are referenced by iRail id or by name.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConnectionEntry {
    pub station_from: String,
    pub station_to: String,
    /// Ignore rides that need a transfer
    #[serde(default)]
    pub exclude_vias: bool,
    /// Publish the departure station's coordinates
    #[serde(default)]
    pub show_on_map: bool,
    #[serde(default)]
    pub name: Option<String>,
    /// Also monitor the departure station's board on its own
    #[serde(default)]
    pub add_departure_liveboard: bool,
    /// Also monitor the arrival station's board on its own
    #[serde(default)]
    pub add_arrival_liveboard: bool,
}

/// A station whose board is monitored on its own.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LiveboardEntry {
    pub station: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),
    #[error("Failed to parse config: {0}")]
    ParseError(String),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const FULL: &str = r#"
bind: 0.0.0.0:9000
update_interval_secs: 120
irail:
  language: nl
  max_concurrent: 2
cache:
  enabled: false
connections:
  - station_from: Brussels-Central
    station_to: BE.NMBS.008892007
    exclude_vias: true
    name: Commute
    add_departure_liveboard: true
liveboards:
  - station: Antwerp-Central
"#;

    #[test]
    fn defaults_apply_to_a_minimal_file() {
        let config = Config::parse("connections: []\n").unwrap();

        assert_eq!(config.bind, "127.0.0.1:8123".parse().unwrap());
        assert_eq!(config.update_interval(), Duration::from_secs(60));
        assert_eq!(config.station_refresh_secs, 86_400);
        assert_eq!(config.irail.base_url, "https://api.irail.be");
        assert_eq!(config.irail.language, "en");
        assert_eq!(config.irail.timeout_secs, 30);
        assert_eq!(config.irail.max_concurrent, 5);
        assert!(config.cache.enabled);
        assert_eq!(config.cache.ttl_secs, 30);
        assert!(config.liveboards.is_empty());
    }

    #[test]
    fn full_file() {
        let config = Config::parse(FULL).unwrap();

        assert_eq!(config.bind.port(), 9000);
        assert_eq!(config.update_interval_secs, 120);
        assert_eq!(config.irail.language, "nl");
        assert_eq!(config.irail.timeout_secs, 30);
        assert!(!config.cache.enabled);

        let entry = &config.connections[0];
        assert_eq!(entry.station_from, "Brussels-Central");
        assert_eq!(entry.station_to, "BE.NMBS.008892007");
        assert!(entry.exclude_vias);
        assert!(!entry.show_on_map);
        assert_eq!(entry.name.as_deref(), Some("Commute"));
        assert!(entry.add_departure_liveboard);
        assert!(!entry.add_arrival_liveboard);

        assert_eq!(config.liveboards[0].station, "Antwerp-Central");
    }

    #[test]
    fn zero_interval_is_rejected() {
        let err = Config::parse("update_interval_secs: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn zero_ttl_is_only_rejected_when_caching() {
        assert!(Config::parse("cache:\n  ttl_secs: 0\n").is_err());
        assert!(Config::parse("cache:\n  enabled: false\n  ttl_secs: 0\n").is_ok());
    }

    #[test]
    fn ttl_must_be_shorter_than_the_refresh_period() {
        let err = Config::parse("update_interval_secs: 10\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(Config::parse("update_interval_secs: 30\n").is_err());

        let config = Config::parse("update_interval_secs: 10\ncache:\n  ttl_secs: 5\n").unwrap();
        assert_eq!(config.cache.ttl_secs, 5);

        assert!(Config::parse("update_interval_secs: 10\ncache:\n  enabled: false\n").is_ok());
    }

    #[test]
    fn missing_station_is_a_parse_error() {
        let err = Config::parse("connections:\n  - station_from: Brussels-Central\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FULL.as_bytes()).unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.connections.len(), 1);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError(_)));
    }

    #[test]
    fn settings_convert_to_client_and_cache_config() {
        let config = Config::parse(FULL).unwrap();

        let client = config.irail.to_client_config();
        assert_eq!(client.language, "nl");
        assert_eq!(client.max_concurrent, 2);

        let cache = config.cache.to_cache_config();
        assert_eq!(cache.ttl, Duration::from_secs(30));
        assert_eq!(cache.max_capacity, 256);
    }
}
