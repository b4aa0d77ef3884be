use tracing::{debug, info};

use crate::config::{DatabaseConfig as ConfigDatabaseConfig, DbType as ConfigDbType};
use crate::db::{DatabaseError, TableSource};

#[cfg(feature = "postgres")]
use crate::db::postgres::PostgresTableSource;
#[cfg(feature = "sqlite")]
use crate::db::sqlite::SqliteTableSource;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DbType {
    Postgres,
    Sqlite,
}

impl From<ConfigDbType> for DbType {
    fn from(value: ConfigDbType) -> Self {
        match value {
            ConfigDbType::Postgres => DbType::Postgres,
            ConfigDbType::Sqlite => DbType::Sqlite,
        }
    }
}

/// Owns the single connection an export run reads through.
pub struct DatabaseManager {
    source: Box<dyn TableSource>,
    db_type: DbType,
}

impl DatabaseManager {
    pub fn connect(config: &ConfigDatabaseConfig) -> Result<Self, DatabaseError> {
        let connection_string = config.connection_string();
        if connection_string.is_empty() {
            return Err(DatabaseError::Connection(
                "database connection string is not configured (set DATABASE_URL)".to_string(),
            ));
        }

        let db_type = DbType::from(config.db_type());
        info!(
            "connecting to {:?} database at {}",
            db_type,
            config.redacted_connection_string()
        );

        let source: Box<dyn TableSource> = match db_type {
            #[cfg(feature = "postgres")]
            DbType::Postgres => Box::new(PostgresTableSource::connect(&connection_string)?),
            #[cfg(feature = "sqlite")]
            DbType::Sqlite => {
                let path = config.sqlite_path().unwrap_or_default();
                Box::new(SqliteTableSource::connect(&path)?)
            }
            #[cfg(not(feature = "postgres"))]
            DbType::Postgres => {
                return Err(DatabaseError::Connection(
                    "PostgreSQL feature not enabled".to_string(),
                ));
            }
            #[cfg(not(feature = "sqlite"))]
            DbType::Sqlite => {
                return Err(DatabaseError::Connection(
                    "SQLite feature not enabled".to_string(),
                ));
            }
        };

        Ok(Self { source, db_type })
    }

    pub fn source(&mut self) -> &mut dyn TableSource {
        self.source.as_mut()
    }

    pub fn db_type(&self) -> DbType {
        self.db_type
    }

    pub fn close(self) {
        debug!("closing {:?} database connection", self.db_type);
        drop(self.source);
    }
}
