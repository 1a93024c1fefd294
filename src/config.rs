//! Configuration loading (TOML file plus environment overrides).

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::constants::{DEFAULT_INSTANCE_ID, DEFAULT_MAP_SIZE};
use crate::error::Result;
use crate::operator::OperatorId;
use crate::store::BypassPolicy;

/// Environment variable naming a TOML config file.
pub const CONFIG_ENV: &str = "ROLEBITS_CONFIG";
/// Environment variable overriding `db_path`.
pub const DB_ENV: &str = "ROLEBITS_DB";
/// Environment variable overriding `listen`.
pub const LISTEN_ENV: &str = "ROLEBITS_LISTEN";

/// Instance configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// LMDB directory.
    pub db_path: PathBuf,
    /// LMDB map size in bytes.
    pub map_size: usize,
    /// The instance's own identifier, recorded on feature change events.
    pub instance: OperatorId,
    /// Whether `ACCESS_MANAGER` holders pass every role check.
    pub bypass: BypassPolicy,
    /// HTTP listen address for the server binary.
    pub listen: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            db_path: PathBuf::from("./data/rolebits.mdb"),
            map_size: DEFAULT_MAP_SIZE,
            instance: DEFAULT_INSTANCE_ID,
            bypass: BypassPolicy::default(),
            listen: "0.0.0.0:3000".into(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// File named by `ROLEBITS_CONFIG` (or defaults), then `ROLEBITS_DB`
    /// and `ROLEBITS_LISTEN` overrides.
    pub fn from_env() -> Result<Self> {
        let mut config = match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::load(path)?,
            Err(_) => Self::default(),
        };
        if let Ok(db) = std::env::var(DB_ENV) {
            config.db_path = PathBuf::from(db);
        }
        if let Ok(listen) = std::env::var(LISTEN_ENV) {
            config.listen = listen;
        }
        Ok(config)
    }
}
