use std::{env, fs};
use log::{info, warn};
use serde::Deserialize;
use crate::errors::ConfigError;
use crate::logging::setup_logger;
use crate::manager_history::DEFAULT_LIST_LIMIT;

#[derive(Deserialize, Debug)]
pub struct WebServer {
    pub bind_address: String,
    pub bind_port: u16,
}

#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct Weather {
    pub api_key: Option<String>,
    pub base_url: String,
    pub forecast_days: usize,
    pub search_limit: usize,
    pub timeout_secs: u64,
}

impl Default for Weather {
    fn default() -> Self {
        Weather {
            api_key: None,
            base_url: "https://api.openweathermap.org".to_string(),
            forecast_days: 5,
            search_limit: 5,
            timeout_secs: 10,
        }
    }
}

#[derive(Deserialize, Debug, Default, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Memory,
    Sqlite,
}

#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct History {
    pub backend: Backend,
    pub db_path: Option<String>,
    pub list_limit: usize,
    pub max_entries: Option<usize>,
}

impl Default for History {
    fn default() -> Self {
        History {
            backend: Backend::Memory,
            db_path: None,
            list_limit: DEFAULT_LIST_LIMIT,
            max_entries: None,
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct General {
    pub log_path: Option<String>,
    pub log_level: String,
    pub log_to_stdout: bool,
}

impl Default for General {
    fn default() -> Self {
        General {
            log_path: None,
            log_level: "info".to_string(),
            log_to_stdout: true,
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct Config {
    pub web_server: WebServer,
    #[serde(default)]
    pub weather: Weather,
    #[serde(default)]
    pub history: History,
    #[serde(default)]
    pub general: General,
}

/// Loads the configuration and sets up logging
///
/// The config file is given as the first program argument and defaults to `config.toml`.
/// An `OPENWEATHER_API_KEY` environment variable takes precedence over the api key in the file.
pub fn config() -> Result<Config, ConfigError> {
    let config_path = env::args().nth(1).unwrap_or_else(|| "config.toml".to_string());
    let mut config = load_config(&config_path)?;

    if let Ok(api_key) = env::var("OPENWEATHER_API_KEY") {
        if !api_key.is_empty() {
            config.weather.api_key = Some(api_key);
        }
    }

    setup_logger(&config.general)?;
    info!("configuration loaded from {}", config_path);

    if config.weather.api_key.as_deref().map_or(true, str::is_empty) {
        warn!("OpenWeatherMap API key not found, weather lookups will fail");
    }

    Ok(config)
}

/// Reads and parses a configuration file
///
/// # Arguments
///
/// * 'config_path' - path to the toml file
pub fn load_config(config_path: &str) -> Result<Config, ConfigError> {
    let toml = fs::read_to_string(config_path)?;
    parse_config(&toml)
}

/// Parses configuration from toml and checks values that depend on each other
///
/// # Arguments
///
/// * 'toml' - configuration as a toml string
pub fn parse_config(toml: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(toml)?;

    if config.history.backend == Backend::Sqlite && config.history.db_path.is_none() {
        return Err(ConfigError::from("history.db_path is required for the sqlite backend"));
    }
    if config.history.max_entries == Some(0) {
        return Err(ConfigError::from("history.max_entries must be at least 1"));
    }

    Ok(config)
}
