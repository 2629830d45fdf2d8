//! Node configuration: a TOML defaults file plus environment overrides.
//!
//! The file is `./tomolink_defaults.toml` unless `TOMOLINK_CONFIG` names
//! another one. Every setting has a built-in default, so a missing default
//! file is not an error; a missing file named explicitly is.
//!
//! | Variable | Setting |
//! |----------|---------|
//! | `PORT` | `http.port` |
//! | `HTTP_HOST` | `http.host` |
//! | `HTTP_GRACEFULWAIT` | `http.gracefulwait` |
//! | `HTTP_TIMEOUT` | `http.timeout` |
//! | `HTTP_BODYLIMIT` | `http.bodylimit` |
//! | `LOGGING_LEVEL` | `logging.level` |
//! | `LOGGING_FORMAT` | `logging.format` |
//! | `DATABASE_ENGINE` | `database.engine` |
//! | `DATABASE_PATH` | `database.path` |
//! | `RELATIONSHIPS_STRICT` | `relationships.strict` |
//! | `DEV` | `dev` |

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tomolink::{RelationshipSchema, SchemaError};

pub const CONFIG_PATH_VAR: &str = "TOMOLINK_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "./tomolink_defaults.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("environment variable {var}={value:?} is not a valid value for {key}")]
    InvalidOverride {
        var: &'static str,
        key: &'static str,
        value: String,
    },
}

/// Runtime configuration for a Tomolink node.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct NodeConfig {
    /// Log every resolved setting at startup.
    pub dev: bool,
    pub http: HttpConfig,
    pub logging: LoggingConfig,
    pub database: DatabaseConfig,
    pub relationships: RelationshipsConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
    /// Seconds in-flight requests get to finish after a shutdown signal.
    pub gracefulwait: u64,
    /// Per-request timeout in seconds.
    pub timeout: u64,
    /// Maximum request body size in bytes.
    pub bodylimit: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
            gracefulwait: 15,
            timeout: 15,
            bodylimit: 4096,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `tracing` filter directive applied to the tomolink crates.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    pub engine: StorageEngine,
    /// SQLite database file; ignored by the memory engine.
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            engine: StorageEngine::Memory,
            path: "tomolink.db".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageEngine {
    #[default]
    Memory,
    Sqlite,
}

impl FromStr for StorageEngine {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "memory" => Ok(StorageEngine::Memory),
            "sqlite" => Ok(StorageEngine::Sqlite),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RelationshipsConfig {
    /// Reject relationship names that are not in `definitions`.
    pub strict: bool,
    pub definitions: Vec<RelationshipDefinition>,
}

impl Default for RelationshipsConfig {
    fn default() -> Self {
        Self {
            strict: true,
            definitions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RelationshipDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// An environment variable that replaced a file or built-in value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Override {
    pub var: &'static str,
    pub key: &'static str,
    pub value: String,
}

/// The result of [`NodeConfig::load_with`]: the settings plus where they
/// came from, for startup logging.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: NodeConfig,
    /// The file that was read, or `None` if built-in defaults were used.
    pub source: Option<PathBuf>,
    pub overrides: Vec<Override>,
}

impl NodeConfig {
    /// Load from the process environment.
    pub fn load() -> Result<LoadedConfig, ConfigError> {
        Self::load_with(|var| std::env::var(var).ok())
    }

    /// Load using `env` to look up environment variables.
    pub fn load_with<F>(env: F) -> Result<LoadedConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let (mut config, source) = match env(CONFIG_PATH_VAR) {
            Some(path) => {
                let path = PathBuf::from(path);
                (Self::from_file(&path)?, Some(path))
            }
            None => {
                let path = PathBuf::from(DEFAULT_CONFIG_PATH);
                if path.exists() {
                    (Self::from_file(&path)?, Some(path))
                } else {
                    (Self::default(), None)
                }
            }
        };
        let overrides = config.apply_overrides(env)?;
        Ok(LoadedConfig {
            config,
            source,
            overrides,
        })
    }

    /// Parse a TOML config file. Settings it omits keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::TomlParse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn apply_overrides<F>(&mut self, env: F) -> Result<Vec<Override>, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut applied = Vec::new();
        let mut take = |var: &'static str, key: &'static str| {
            env(var).map(|value| {
                applied.push(Override {
                    var,
                    key,
                    value: value.clone(),
                });
                (var, key, value)
            })
        };

        if let Some(v) = take("PORT", "http.port") {
            self.http.port = parsed(v)?;
        }
        if let Some((_, _, v)) = take("HTTP_HOST", "http.host") {
            self.http.host = v;
        }
        if let Some(v) = take("HTTP_GRACEFULWAIT", "http.gracefulwait") {
            self.http.gracefulwait = parsed(v)?;
        }
        if let Some(v) = take("HTTP_TIMEOUT", "http.timeout") {
            self.http.timeout = parsed(v)?;
        }
        if let Some(v) = take("HTTP_BODYLIMIT", "http.bodylimit") {
            self.http.bodylimit = parsed(v)?;
        }
        if let Some((_, _, v)) = take("LOGGING_LEVEL", "logging.level") {
            self.logging.level = v;
        }
        if let Some(v) = take("LOGGING_FORMAT", "logging.format") {
            self.logging.format = parsed(v)?;
        }
        if let Some(v) = take("DATABASE_ENGINE", "database.engine") {
            self.database.engine = parsed(v)?;
        }
        if let Some((_, _, v)) = take("DATABASE_PATH", "database.path") {
            self.database.path = v;
        }
        if let Some(v) = take("RELATIONSHIPS_STRICT", "relationships.strict") {
            self.relationships.strict = parsed(v)?;
        }
        if let Some(v) = take("DEV", "dev") {
            self.dev = parsed(v)?;
        }

        Ok(applied)
    }

    /// Build the relationship schema from `relationships.definitions`.
    pub fn schema(&self) -> Result<RelationshipSchema, SchemaError> {
        RelationshipSchema::from_definitions(
            self.relationships
                .definitions
                .iter()
                .map(|d| (d.name.as_str(), d.kind.as_str())),
        )
    }

    /// `host:port` for the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.http.host, self.http.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout)
    }

    pub fn graceful_wait(&self) -> Duration {
        Duration::from_secs(self.http.gracefulwait)
    }

    /// Every resolved setting as `(key, value)` pairs, for dev-mode logging.
    pub fn settings(&self) -> Vec<(String, String)> {
        let mut out = vec![
            ("dev".to_string(), self.dev.to_string()),
            ("http.host".to_string(), self.http.host.clone()),
            ("http.port".to_string(), self.http.port.to_string()),
            ("http.gracefulwait".to_string(), self.http.gracefulwait.to_string()),
            ("http.timeout".to_string(), self.http.timeout.to_string()),
            ("http.bodylimit".to_string(), self.http.bodylimit.to_string()),
            ("logging.level".to_string(), self.logging.level.clone()),
            ("logging.format".to_string(), format!("{:?}", self.logging.format).to_lowercase()),
            ("database.engine".to_string(), format!("{:?}", self.database.engine).to_lowercase()),
            ("database.path".to_string(), self.database.path.clone()),
            ("relationships.strict".to_string(), self.relationships.strict.to_string()),
        ];
        for (i, d) in self.relationships.definitions.iter().enumerate() {
            out.push((format!("relationships.definitions.{i}.name"), d.name.clone()));
            out.push((format!("relationships.definitions.{i}.type"), d.kind.clone()));
        }
        out
    }
}

fn parsed<T: FromStr>(
    (var, key, value): (&'static str, &'static str, String),
) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::InvalidOverride { var, key, value })
}
