//! Configuration loading.
//!
//! Layered in the usual order: built-in defaults, then an optional
//! TOML file, then environment variables with the `IGOR` prefix
//! (`IGOR__ENDPOINT`, `IGOR__LOGGING__LEVEL`, ...). A missing config
//! file is not an error.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

const APP_NAME: &str = "igor";

const DEFAULT_ENDPOINT: &str = "ws://localhost:8000/ws";
const DEFAULT_RECONNECT_DELAY_MS: u64 = 3000;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// WebSocket endpoint of the Igor service.
    pub endpoint: String,

    /// Fixed delay between reconnect attempts, in milliseconds.
    pub reconnect_delay_ms: u64,

    /// Whether knowledge excerpts and task intents are narrated.
    pub narration_enabled: bool,

    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            reconnect_delay_ms: DEFAULT_RECONNECT_DELAY_MS,
            narration_enabled: true,
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl ClientConfig {
    /// Load configuration from `path` (or the default location when
    /// `None`), environment on top.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_file = match path {
            Some(p) => p.to_path_buf(),
            None => default_config_dir()?.join("config.toml"),
        };

        let built = Config::builder()
            .set_default("endpoint", DEFAULT_ENDPOINT)?
            .set_default("reconnect_delay_ms", DEFAULT_RECONNECT_DELAY_MS as i64)?
            .set_default("narration_enabled", true)?
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            .add_source(
                File::from(config_file.as_path())
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(Environment::with_prefix(APP_NAME).separator("__"))
            .build()
            .context("building configuration")?;

        let config: Self = built.try_deserialize().context("parsing configuration")?;
        Ok(config)
    }
}

/// Expand `~` and `$VAR` in a user-supplied path.
pub fn expand_str_path(text: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(text).context("expanding path")?;
    Ok(PathBuf::from(expanded.to_string()))
}

fn default_config_dir() -> Result<PathBuf> {
    if let Some(dir) = env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        let mut path = PathBuf::from(dir);
        path.push(APP_NAME);
        return Ok(path);
    }

    if let Some(mut dir) = dirs::config_dir() {
        dir.push(APP_NAME);
        return Ok(dir);
    }

    dirs::home_dir()
        .map(|home| home.join(".config").join(APP_NAME))
        .ok_or_else(|| anyhow!("unable to determine configuration directory"))
}
