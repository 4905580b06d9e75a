use crate::logging::LOG_FILE_ENV;
use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;
use thiserror::Error;

/// Default MongoDB connection string used when `MONGO_URI` is unset.
pub const DEFAULT_MONGO_URI: &str = "mongodb://127.0.0.1:27017";
/// Default database holding the `exams` and `students` collections.
pub const DEFAULT_MONGO_DB: &str = "clinicdb";
/// Default HTTP port.
pub const DEFAULT_SERVER_PORT: u16 = 5003;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
    /// Configuration was installed more than once.
    #[error("Configuration already initialized")]
    AlreadyInitialized,
}

/// Runtime configuration for the Record Gateway.
#[derive(Debug, Clone)]
pub struct Config {
    /// Connection string of the MongoDB deployment.
    pub mongo_uri: String,
    /// Database name holding both collections.
    pub mongo_database: String,
    /// Port the HTTP server listens on.
    pub server_port: u16,
    /// Document store implementation backing the gateway.
    pub store_backend: StoreBackend,
    /// Log file path; `None` selects the default under `logs/`.
    pub log_file: Option<PathBuf>,
}

/// Supported document store backends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    /// MongoDB through the official driver.
    Mongo,
    /// Process-local store, lost on restart.
    Memory,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// Blank values are treated as unset so that an empty `MONGO_URI=` in a `.env` file falls
    /// back to the default instead of producing an unusable connection string.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Ok(Self {
            mongo_uri: optional("MONGO_URI").unwrap_or_else(|| DEFAULT_MONGO_URI.to_string()),
            mongo_database: optional("MONGO_DB").unwrap_or_else(|| DEFAULT_MONGO_DB.to_string()),
            server_port: optional("SERVER_PORT")
                .map(|value| {
                    value
                        .trim()
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".into()))
                })
                .transpose()?
                .unwrap_or(DEFAULT_SERVER_PORT),
            store_backend: optional("STORE_BACKEND")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|()| ConfigError::InvalidValue("STORE_BACKEND".into()))
                })
                .transpose()?
                .unwrap_or(StoreBackend::Mongo),
            log_file: optional(LOG_FILE_ENV).map(PathBuf::from),
        })
    }
}

impl std::str::FromStr for StoreBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(Self::Mongo),
            "memory" => Ok(Self::Memory),
            _ => Err(()),
        }
    }
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from `.env` and the environment, apply `overrides` (command-line flags),
/// then install the result in the global cache.
pub fn init_config<F>(overrides: F) -> Result<&'static Config, ConfigError>
where
    F: FnOnce(&mut Config),
{
    dotenvy::dotenv().ok();
    let mut config = Config::from_env()?;
    overrides(&mut config);
    install_config(config)
}

/// Install an already-built configuration in the global cache.
pub fn install_config(config: Config) -> Result<&'static Config, ConfigError> {
    tracing::debug!(
        mongo_uri = %config.mongo_uri,
        database = %config.mongo_database,
        server_port = config.server_port,
        store_backend = ?config.store_backend,
        log_file = ?config.log_file,
        "Loaded configuration"
    );
    CONFIG
        .set(config)
        .map_err(|_| ConfigError::AlreadyInitialized)?;
    Ok(get_config())
}
