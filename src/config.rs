pub use self::parser::{
    Config, DatabaseConfig, DbType, ExportConfig, LoggingConfig, StatusConfig, TableConfig,
};
pub use self::validator::ConfigError;

mod parser;
mod validator;
