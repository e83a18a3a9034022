use std::{env, fmt, net::IpAddr, str::FromStr, time::Duration};

use dotenvy::dotenv;
use log::{debug, info, warn};

use crate::errors::ConfigError;

// Server-specific configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub workers: usize,
    pub shutdown_timeout_seconds: u64,
}

impl ServerConfig {
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_seconds)
    }
}

// Application-specific configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub name: String,
    pub version: String,
    /// `NODE_ENV` as given, reported to error tracking unchanged
    pub environment_name: String,
    pub environment: Environment,
    /// `RUST_LOG`-style filter directives, e.g. `info,sqlx=warn`
    pub log_level: String,
}

// Environment enum for different deployment environments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Testing,
    Production,
}

impl Environment {
    /// Classify an environment name; unknown names behave like production
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "development" | "dev" => Environment::Development,
            "testing" | "test" => Environment::Testing,
            "production" | "prod" => Environment::Production,
            _ => {
                warn!(
                    "Unknown environment '{}', using production behaviour",
                    name
                );
                Environment::Production
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Testing => "testing",
            Environment::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Database Config
#[derive(Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_seconds: u64,
}

// The connection string carries credentials, keep it out of debug output.
impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &"<redacted>")
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .field("acquire_timeout_seconds", &self.acquire_timeout_seconds)
            .finish()
    }
}

/// Whether the error-tracking DSN must be present for the service to start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DsnPolicy {
    StrictRequired,
    Optional,
}

impl fmt::Display for DsnPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DsnPolicy::StrictRequired => f.write_str("strict-required"),
            DsnPolicy::Optional => f.write_str("optional"),
        }
    }
}

impl FromStr for DsnPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict-required" | "strict" | "required" => Ok(DsnPolicy::StrictRequired),
            "optional" => Ok(DsnPolicy::Optional),
            _ => Err(format!(
                "Invalid DSN policy: {}. Must be one of: strict-required, optional",
                s
            )),
        }
    }
}

// Error tracking config
#[derive(Clone)]
pub struct ErrorTrackingConfig {
    pub dsn: Option<String>,
    pub policy: DsnPolicy,
}

impl fmt::Debug for ErrorTrackingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorTrackingConfig")
            .field("dsn", &self.dsn.as_ref().map(|_| "<redacted>"))
            .field("policy", &self.policy)
            .finish()
    }
}

// Config struct that matches our environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub app: AppConfig,
    pub db: DatabaseConfig,
    pub error_tracking: ErrorTrackingConfig,
}

// Result type for configuration functions
type ConfigResult<T> = Result<T, ConfigError>;

impl Config {
    // Load the local .env override, then configuration from environment variables
    pub fn load() -> ConfigResult<Self> {
        match dotenv() {
            Ok(path) => debug!(".env file loaded from {}", path.display()),
            Err(e) if e.not_found() => debug!("No .env file found"),
            Err(e) => warn!("Could not load .env file: {}", e),
        }

        let config = Self::from_env()?;
        info!("Configuration loaded successfully");
        debug!("Loaded config: {:?}", config);

        Ok(config)
    }

    // Build the configuration from the current process environment only
    pub fn from_env() -> ConfigResult<Self> {
        let server = ServerConfig {
            host: get_env_or_default("LISTEN_ADDR", "0.0.0.0")?,
            port: get_env_or_default("LISTEN_PORT", "9090")?,
            workers: get_env_or_default("LISTEN_WORKERS", "4")?,
            shutdown_timeout_seconds: get_env_or_default("SHUTDOWN_TIMEOUT_SECONDS", "30")?,
        };

        let environment_name: String = get_env_or_default("NODE_ENV", "production")?;
        let environment = Environment::from_name(&environment_name);
        let default_level = if environment == Environment::Development {
            "debug"
        } else {
            "info"
        };

        let app = AppConfig {
            name: get_env_or_default("APP_NAME", "microservice")?,
            version: get_env_or_default("APP_VERSION", env!("CARGO_PKG_VERSION"))?,
            environment_name,
            environment,
            log_level: get_env_or_default("RUST_LOG", default_level)?,
        };

        let db = DatabaseConfig {
            url: require_env("DB_URL")?,
            max_connections: get_env_or_default("DB_MAX_CONNECTIONS", "10")?,
            min_connections: get_env_or_default("DB_MIN_CONNECTIONS", "0")?,
            acquire_timeout_seconds: get_env_or_default("DB_ACQUIRE_TIMEOUT_SECONDS", "5")?,
        };

        let policy: DsnPolicy = get_env_or_default("SENTRY_DSN_POLICY", "optional")?;
        let dsn = match policy {
            DsnPolicy::StrictRequired => Some(require_env("SENTRY_DSN")?),
            DsnPolicy::Optional => optional_env("SENTRY_DSN")?,
        };

        Ok(Config {
            server,
            app,
            db,
            error_tracking: ErrorTrackingConfig { dsn, policy },
        })
    }

    pub fn is_development(&self) -> bool {
        self.app.environment == Environment::Development
    }
}

/// Reads a variable, treating an empty value the same as an absent one
fn optional_env(key: &str) -> ConfigResult<Option<String>> {
    match env::var(key) {
        Ok(val) if val.trim().is_empty() => Ok(None),
        Ok(val) => Ok(Some(val)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(ConfigError::EnvVarError(e)),
    }
}

fn require_env(key: &str) -> ConfigResult<String> {
    optional_env(key)?.ok_or_else(|| ConfigError::MissingVar(key.to_string()))
}

/// Helper function to get an env variable with a default value
fn get_env_or_default<T: FromStr>(key: &str, default: &str) -> ConfigResult<T>
where
    T::Err: fmt::Display,
{
    match optional_env(key)? {
        Some(val) => val
            .parse::<T>()
            .map_err(|e| ConfigError::ParseError(format!("Could not parse {}: {}", key, e))),
        None => {
            debug!("{} not set, using default: {}", key, default);
            default.parse::<T>().map_err(|e| {
                ConfigError::ParseError(format!("Could not parse default for {}: {}", key, e))
            })
        }
    }
}
