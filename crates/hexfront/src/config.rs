//! Server settings, read from the environment.

use std::env;
use std::path::PathBuf;

use hexfront_room::RoomConfig;
use hexfront_sim::MatchConfig;

use crate::HexfrontError;

const DEFAULT_ADDR: &str = "127.0.0.1:8000";
const DEFAULT_LOG: &str = "info";

/// Process-level settings for the `hexfront` binary.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address (`HEXFRONT_ADDR`).
    pub addr: String,
    /// Fallback log filter when `RUST_LOG` is unset (`HEXFRONT_LOG`).
    pub log_level: String,
    /// JSON scenario file (`HEXFRONT_SCENARIO`). The built-in basic
    /// scenario is used when unset.
    pub scenario: Option<PathBuf>,
    pub room: RoomConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            log_level: DEFAULT_LOG.to_string(),
            scenario: None,
            room: RoomConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Loads settings from environment variables, with defaults for
    /// anything unset.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            addr: lookup("HEXFRONT_ADDR").unwrap_or(defaults.addr),
            log_level: lookup("HEXFRONT_LOG").unwrap_or(defaults.log_level),
            scenario: lookup("HEXFRONT_SCENARIO")
                .filter(|path| !path.is_empty())
                .map(PathBuf::from),
            room: defaults.room,
        }
    }

    /// Reads and validates the scenario every match will play.
    ///
    /// # Errors
    /// [`HexfrontError::Config`] if the file cannot be read or parsed,
    /// [`HexfrontError::Scenario`] if it parses but cannot start a match.
    pub fn load_match_config(&self) -> Result<MatchConfig, HexfrontError> {
        let config = match &self.scenario {
            None => MatchConfig::basic(),
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|e| {
                    HexfrontError::Config(format!("cannot read {}: {e}", path.display()))
                })?;
                serde_json::from_str(&raw).map_err(|e| {
                    HexfrontError::Config(format!("cannot parse {}: {e}", path.display()))
                })?
            }
        };
        config.validate()?;
        Ok(config)
    }
}
