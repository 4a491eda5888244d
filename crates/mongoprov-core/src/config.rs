//! Configuration for mongoprov

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MongoprovConfig {
    #[serde(default)]
    pub connection: ConnectionConfig,

    #[serde(default)]
    pub replica_set: ReplicaSetConfig,

    #[serde(default)]
    pub reconcile: ReconcileConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl MongoprovConfig {
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_string(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| Error::ConfigParse {
            path: path.to_string(),
            source,
        })
    }

    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(uri) = std::env::var("MONGOPROV_URI") {
            config.connection.uri = uri;
        }
        if let Ok(name) = std::env::var("MONGOPROV_REPLICA_SET") {
            config.replica_set.name = name;
        }
        if let Ok(level) = std::env::var("MONGOPROV_LOG_LEVEL") {
            config.logging.level = level;
        }

        config
    }

    /// Fail fast on settings that cannot possibly provision anything.
    pub fn ensure_named(&self) -> Result<()> {
        if self.replica_set.name.is_empty() {
            return Err(Error::MissingReplicaSetName);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Connection string; empty means "derive from the first declared member"
    #[serde(default)]
    pub uri: String,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_selection_timeout")]
    pub server_selection_timeout_secs: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            uri: String::new(),
            connect_timeout_secs: default_connect_timeout(),
            server_selection_timeout_secs: default_selection_timeout(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplicaSetConfig {
    /// Name of the target replica set
    #[serde(default)]
    pub name: String,

    /// Raw member list; validated before anything is sent to the server
    #[serde(default)]
    pub members: Vec<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileConfig {
    /// Extra status polls after the first failed one
    #[serde(default = "default_status_retries")]
    pub status_retries: u32,

    /// Fixed pause between status polls
    #[serde(default = "default_retry_interval")]
    pub retry_interval_secs: u64,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            status_retries: default_status_retries(),
            retry_interval_secs: default_retry_interval(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_selection_timeout() -> u64 {
    30
}

fn default_status_retries() -> u32 {
    10
}

fn default_retry_interval() -> u64 {
    5
}

fn default_log_level() -> String {
    "info".to_string()
}
