use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use super::ConfigError;
use super::validator;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub status: StatusConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub conn_string: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
}

impl DatabaseConfig {
    pub fn db_type(&self) -> DbType {
        let url = self.connection_string();
        if url.starts_with("sqlite://") {
            DbType::Sqlite
        } else {
            DbType::Postgres
        }
    }

    pub fn connection_string(&self) -> String {
        if let Some(ref url) = self.url {
            url.clone()
        } else if let Some(ref conn) = self.conn_string {
            conn.clone()
        } else if let Some(ref file) = self.filename {
            format!("sqlite://{}", file)
        } else {
            String::new()
        }
    }

    pub fn sqlite_path(&self) -> Option<String> {
        if let DbType::Sqlite = self.db_type() {
            let url = self.connection_string();
            Some(url.strip_prefix("sqlite://").unwrap_or(&url).to_string())
        } else {
            None
        }
    }

    /// Connection string safe for logs: any password is masked.
    pub fn redacted_connection_string(&self) -> String {
        let raw = self.connection_string();
        match Url::parse(&raw) {
            Ok(mut url) if url.password().is_some() => {
                if url.set_password(Some("***")).is_ok() {
                    url.to_string()
                } else {
                    raw
                }
            }
            _ => raw,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbType {
    Postgres,
    Sqlite,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExportConfig {
    #[serde(default = "default_output_root")]
    pub output_root: PathBuf,
    #[serde(default = "default_tables")]
    pub tables: Vec<TableConfig>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_root: default_output_root(),
            tables: default_tables(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TableConfig {
    pub name: String,
    #[serde(default)]
    pub query: Option<String>,
}

impl TableConfig {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            query: None,
        }
    }

    pub fn select_statement(&self) -> String {
        match self.query {
            Some(ref query) => query.clone(),
            None => format!("SELECT * FROM {}", self.name),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StatusConfig {
    #[serde(default = "default_status_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_status_port")]
    pub port: u16,
    #[serde(default = "default_status_db_file")]
    pub db_file: PathBuf,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            bind_address: default_status_bind_address(),
            port: default_status_port(),
            db_file: default_status_db_file(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(alias = "console", default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Loads the explicit file if given, otherwise `config.yaml` when present,
    /// otherwise the built-in defaults. Environment overrides apply on top.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => Self::parse_file(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::parse_file(DEFAULT_CONFIG_PATH)?
            }
            None => Self::default(),
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut config = Self::parse_file(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn parse_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validator::validate(self)
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("DATABASE_URL").filter(|v| !v.is_empty()) {
            self.database.url = Some(value);
        }
        if let Some(port) = lookup("STATUS_PORT").and_then(|v| v.parse::<u16>().ok()) {
            self.status.port = port;
        }
    }
}

fn default_output_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_tables() -> Vec<TableConfig> {
    ["users", "cards", "transactions", "exchange_rates"]
        .into_iter()
        .map(TableConfig::named)
        .collect()
}

fn default_status_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_status_port() -> u16 {
    5002
}

fn default_status_db_file() -> PathBuf {
    PathBuf::from("sqlite.db")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}
