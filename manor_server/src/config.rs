use manor_core::{deck::DeckConfig, game_state::MAX_PLAYERS};
use serde::{Deserialize, Serialize};
use std::{fs, io, path::PathBuf};
use thiserror::Error;

pub const USAGE: &str = "Usage: manor_server [SERVER_PORT] [CONFIG_FILE]";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{0:?} is not a port number")]
    Port(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    pub max_clients: usize,
    pub protocol_id: u64,
    pub deck: DeckConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            port: 5000,
            max_clients: MAX_PLAYERS,
            protocol_id: 0,
            deck: DeckConfig::standard(),
        }
    }
}

impl ServerConfig {
    pub fn from_json(path: PathBuf, text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|source| ConfigError::Parse { path, source })
    }

    pub fn load(path: PathBuf) -> Result<Self, ConfigError> {
        match fs::read_to_string(&path) {
            Ok(text) => Self::from_json(path, &text),
            Err(source) => Err(ConfigError::Io { path, source }),
        }
    }

    /// `args[1]` overrides the port, `args[2]` names a JSON config file.
    pub fn from_args(args: &[String]) -> Result<Self, ConfigError> {
        let mut config = match args.get(2) {
            Some(path) => Self::load(PathBuf::from(path))?,
            None => Self::default(),
        };
        if let Some(port) = args.get(1) {
            config.port = port
                .parse()
                .map_err(|_| ConfigError::Port(port.to_string()))?;
        }
        config.max_clients = config.max_clients.clamp(1, MAX_PLAYERS);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{ConfigError, ServerConfig};
    use manor_core::{card::ClueCard, card::WeaponType, deck::DeckConfig};
    use std::path::PathBuf;

    #[test]
    fn partial_file_should_keep_the_defaults() {
        let config = ServerConfig::from_json(PathBuf::from("x.json"), r#"{"port": 7777}"#).unwrap();
        assert_eq!(config.port, 7777);
        assert_eq!(config.max_clients, 6);
        assert_eq!(config.deck, DeckConfig::standard());
    }

    #[test]
    fn deck_should_be_configurable() {
        let config = ServerConfig::from_json(
            PathBuf::from("x.json"),
            r#"{"deck": {"characters": [{"Character": "Plum"}], "weapons": [{"Weapon": "Rope"}], "rooms": [{"Room": "Hall"}]}}"#,
        )
        .unwrap();
        assert_eq!(config.deck.weapons, vec![ClueCard::Weapon(WeaponType::Rope)]);
    }

    #[test]
    fn port_argument_should_override_the_default() {
        let args = vec!["manor_server".to_string(), "6000".to_string()];
        assert_eq!(ServerConfig::from_args(&args).unwrap().port, 6000);
    }

    #[test]
    fn bad_port_should_be_reported() {
        let args = vec!["manor_server".to_string(), "sixty".to_string()];
        assert!(matches!(
            ServerConfig::from_args(&args),
            Err(ConfigError::Port(p)) if p == "sixty"
        ));
    }

    #[test]
    fn missing_file_should_be_reported() {
        let args = vec![
            "manor_server".to_string(),
            "6000".to_string(),
            "/does/not/exist.json".to_string(),
        ];
        assert!(matches!(
            ServerConfig::from_args(&args),
            Err(ConfigError::Io { .. })
        ));
    }
}
