//! Service configuration.
//!
//! Values resolve in order: built-in defaults, an optional TOML file
//! (`catalog.toml` or `config/catalog.toml` unless a path is given), `CATALOG_*`
//! environment variables, then programmatic overrides. The result is validated
//! before use.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::rates::DEFAULT_RATES_URL;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub rates: RatesConfig,
    pub import: ImportConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

#[derive(Clone, Debug)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub database_url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct RatesConfig {
    pub url: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct ImportConfig {
    pub csv_path: Option<PathBuf>,
    pub required: bool,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    Memory,
    Sqlite,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub port: Option<u16>,
    pub store_backend: Option<StoreBackend>,
    pub database_url: Option<String>,
    pub rates_url: Option<String>,
    pub import_csv_path: Option<PathBuf>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub skip_env: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig { bind_address: "0.0.0.0".to_string(), port: 8000 },
            store: StoreConfig {
                backend: StoreBackend::Memory,
                database_url: "sqlite://catalog.db".to_string(),
                max_connections: 5,
                timeout_secs: 30,
            },
            rates: RatesConfig { url: DEFAULT_RATES_URL.to_string(), timeout_secs: 10 },
            import: ImportConfig { csv_path: None, required: false },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "sqlite" => Ok(Self::Sqlite),
            other => Err(ConfigError::Validation(format!(
                "unsupported store backend `{other}` (expected memory|sqlite)"
            ))),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = resolve_config_path(options.config_path.as_deref()) {
            config.apply_patch(read_patch(&path)?);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("catalog.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        if !options.skip_env {
            config.apply_env_overrides()?;
        }
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
        }

        if let Some(store) = patch.store {
            if let Some(backend) = store.backend {
                self.store.backend = backend;
            }
            if let Some(database_url) = store.database_url {
                self.store.database_url = database_url;
            }
            if let Some(max_connections) = store.max_connections {
                self.store.max_connections = max_connections;
            }
            if let Some(timeout_secs) = store.timeout_secs {
                self.store.timeout_secs = timeout_secs;
            }
        }

        if let Some(rates) = patch.rates {
            if let Some(url) = rates.url {
                self.rates.url = url;
            }
            if let Some(timeout_secs) = rates.timeout_secs {
                self.rates.timeout_secs = timeout_secs;
            }
        }

        if let Some(import) = patch.import {
            if let Some(csv_path) = import.csv_path {
                self.import.csv_path = Some(csv_path);
            }
            if let Some(required) = import.required {
                self.import.required = required;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("CATALOG_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("CATALOG_SERVER_PORT") {
            self.server.port = parse_env("CATALOG_SERVER_PORT", &value)?;
        }

        if let Some(value) = read_env("CATALOG_STORE_BACKEND") {
            self.store.backend = value.parse()?;
        }
        if let Some(value) = read_env("CATALOG_STORE_DATABASE_URL") {
            self.store.database_url = value;
        }
        if let Some(value) = read_env("CATALOG_STORE_MAX_CONNECTIONS") {
            self.store.max_connections = parse_env("CATALOG_STORE_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = read_env("CATALOG_STORE_TIMEOUT_SECS") {
            self.store.timeout_secs = parse_env("CATALOG_STORE_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("CATALOG_RATES_URL") {
            self.rates.url = value;
        }
        if let Some(value) = read_env("CATALOG_RATES_TIMEOUT_SECS") {
            self.rates.timeout_secs = parse_env("CATALOG_RATES_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("CATALOG_IMPORT_CSV_PATH") {
            self.import.csv_path = Some(PathBuf::from(value));
        }
        if let Some(value) = read_env("CATALOG_IMPORT_REQUIRED") {
            self.import.required = parse_bool("CATALOG_IMPORT_REQUIRED", &value)?;
        }

        let log_level = read_env("CATALOG_LOGGING_LEVEL").or_else(|| read_env("CATALOG_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        if let Some(value) = read_env("CATALOG_LOGGING_FORMAT") {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(backend) = overrides.store_backend {
            self.store.backend = backend;
        }
        if let Some(database_url) = overrides.database_url {
            self.store.database_url = database_url;
        }
        if let Some(rates_url) = overrides.rates_url {
            self.rates.url = rates_url;
        }
        if let Some(csv_path) = overrides.import_csv_path {
            self.import.csv_path = Some(csv_path);
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.bind_address.trim().is_empty() {
            return Err(ConfigError::Validation(
                "server.bind_address must not be empty".to_string(),
            ));
        }

        if self.store.backend == StoreBackend::Sqlite {
            let url = self.store.database_url.trim();
            if !(url.starts_with("sqlite:") || url == ":memory:") {
                return Err(ConfigError::Validation(
                    "store.database_url must be a sqlite URL (`sqlite://...` or `sqlite::memory:`)"
                        .to_string(),
                ));
            }
            if self.store.max_connections == 0 {
                return Err(ConfigError::Validation(
                    "store.max_connections must be greater than zero".to_string(),
                ));
            }
        }

        if self.store.timeout_secs == 0 || self.store.timeout_secs > 300 {
            return Err(ConfigError::Validation(
                "store.timeout_secs must be in range 1..=300".to_string(),
            ));
        }

        let url = self.rates.url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Validation(
                "rates.url must be an http:// or https:// URL".to_string(),
            ));
        }
        if self.rates.timeout_secs == 0 || self.rates.timeout_secs > 120 {
            return Err(ConfigError::Validation(
                "rates.timeout_secs must be in range 1..=120".to_string(),
            ));
        }

        if self.import.required && self.import.csv_path.is_none() {
            return Err(ConfigError::Validation(
                "import.required is set but import.csv_path is missing".to_string(),
            ));
        }

        let level = self.logging.level.trim().to_ascii_lowercase();
        if !matches!(level.as_str(), "trace" | "debug" | "info" | "warn" | "error") {
            return Err(ConfigError::Validation(format!(
                "logging.level `{}` is not one of trace|debug|info|warn|error",
                self.logging.level
            )));
        }

        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    server: Option<ServerPatch>,
    store: Option<StorePatch>,
    rates: Option<RatesPatch>,
    import: Option<ImportPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct StorePatch {
    backend: Option<StoreBackend>,
    database_url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct RatesPatch {
    url: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ImportPatch {
    csv_path: Option<PathBuf>,
    required: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("catalog.toml"), PathBuf::from("config/catalog.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    parse_patch(&raw, path)
}

fn parse_patch(raw: &str, path: &Path) -> Result<ConfigPatch, ConfigError> {
    let interpolated = interpolate_env_vars(raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

/// Expands `${VAR}` references from the process environment.
fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidEnvOverride { key: key.to_string(), value: value.to_string() }),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::{Path, PathBuf};

    use super::*;

    fn isolated() -> LoadOptions {
        LoadOptions {
            config_path: Some(PathBuf::from("/nonexistent/catalog.toml")),
            skip_env: true,
            ..LoadOptions::default()
        }
    }

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::load(isolated()).expect("defaults should validate");

        assert_eq!(config.server.port, 8000);
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.rates.url, DEFAULT_RATES_URL);
        assert!(config.import.csv_path.is_none());
        assert_eq!(config.logging.format, LogFormat::Compact);
    }

    #[test]
    fn missing_required_file_fails() {
        let result = AppConfig::load(LoadOptions { require_file: true, ..isolated() });

        assert!(matches!(result, Err(ConfigError::MissingConfigFile(_))));
    }

    #[test]
    fn toml_file_patches_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"
[server]
port = 9100

[store]
backend = "sqlite"
database_url = "sqlite::memory:"

[rates]
url = "http://localhost:9999/latest/USD"
timeout_secs = 3

[import]
csv_path = "seed/products.csv"
required = true

[logging]
level = "debug"
format = "json"
"#
        )
        .expect("write config");

        let config = AppConfig::load(LoadOptions {
            config_path: Some(file.path().to_path_buf()),
            require_file: true,
            skip_env: true,
            ..LoadOptions::default()
        })
        .expect("config should load");

        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.bind_address, "0.0.0.0");
        assert_eq!(config.store.backend, StoreBackend::Sqlite);
        assert_eq!(config.store.database_url, "sqlite::memory:");
        assert_eq!(config.rates.timeout_secs, 3);
        assert_eq!(config.import.csv_path, Some(PathBuf::from("seed/products.csv")));
        assert!(config.import.required);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn overrides_win_over_defaults() {
        let config = AppConfig::load(LoadOptions {
            overrides: ConfigOverrides {
                port: Some(0),
                store_backend: Some(StoreBackend::Sqlite),
                database_url: Some("sqlite::memory:".to_string()),
                ..ConfigOverrides::default()
            },
            ..isolated()
        })
        .expect("config should load");

        assert_eq!(config.server.port, 0);
        assert_eq!(config.store.backend, StoreBackend::Sqlite);
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.rates.url = "ftp://rates.example".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        let mut config = AppConfig::default();
        config.store.backend = StoreBackend::Sqlite;
        config.store.database_url = "postgres://localhost/catalog".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.import.required = true;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn enum_values_parse_case_insensitively() {
        assert_eq!("SQLite".parse::<StoreBackend>().ok(), Some(StoreBackend::Sqlite));
        assert_eq!(" memory ".parse::<StoreBackend>().ok(), Some(StoreBackend::Memory));
        assert_eq!("Pretty".parse::<LogFormat>().ok(), Some(LogFormat::Pretty));
        assert!("mongo".parse::<StoreBackend>().is_err());
    }

    #[test]
    fn unterminated_interpolation_is_rejected() {
        let result = parse_patch("[server]\nbind_address = \"${HOST\"\n", Path::new("inline.toml"));

        assert!(matches!(result, Err(ConfigError::UnterminatedInterpolation)));
    }

    #[test]
    fn bool_overrides_accept_common_spellings() {
        assert!(parse_bool("KEY", "yes").expect("yes"));
        assert!(!parse_bool("KEY", "0").expect("0"));
        assert!(parse_bool("KEY", "maybe").is_err());
    }
}
