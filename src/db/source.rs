use diesel::QueryableByName;
use diesel::sql_types::Text;
use serde_json::{Map, Value};

use crate::config::TableConfig;

use super::DatabaseError;

/// One result row as a flat JSON object keyed by column name.
pub type JsonRow = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub data_type: String,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }

    /// Date/time columns are dumped as text, never as free-form strings.
    pub fn is_temporal(&self) -> bool {
        let ty = self.data_type.trim().to_ascii_lowercase();
        ty.starts_with("timestamp")
            || ty.starts_with("datetime")
            || ty.starts_with("time ")
            || ty == "time"
            || ty == "date"
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableQuery {
    pub name: String,
    pub statement: String,
}

impl TableQuery {
    pub fn new(name: impl Into<String>, statement: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            statement: statement.into(),
        }
    }

    /// The statement with trailing semicolons removed so it can be wrapped
    /// as a subquery.
    pub fn as_subquery(&self) -> &str {
        self.statement.trim().trim_end_matches(';').trim_end()
    }

    pub(crate) fn verify_statement(&self) -> String {
        format!("SELECT * FROM ({}) AS t LIMIT 0", self.as_subquery())
    }
}

impl From<&TableConfig> for TableQuery {
    fn from(config: &TableConfig) -> Self {
        Self::new(config.name.clone(), config.select_statement())
    }
}

/// A read-only view of one database connection.
pub trait TableSource {
    /// Columns of the table in ordinal order. Empty when the catalog has none.
    fn columns(&mut self, table: &TableQuery) -> Result<Vec<Column>, DatabaseError>;

    /// Every row the table's statement returns.
    fn rows(&mut self, table: &TableQuery) -> Result<Vec<JsonRow>, DatabaseError>;

    /// Runs the statement without reading any row, so a missing or
    /// unreadable table fails with the driver's own message.
    fn verify(&mut self, table: &TableQuery) -> Result<(), DatabaseError>;
}

#[derive(Debug, QueryableByName)]
pub(crate) struct CatalogColumn {
    #[diesel(sql_type = Text)]
    pub(crate) column_name: String,
    #[diesel(sql_type = Text)]
    pub(crate) data_type: String,
}

impl From<CatalogColumn> for Column {
    fn from(value: CatalogColumn) -> Self {
        Column::new(value.column_name, value.data_type)
    }
}

#[derive(Debug, QueryableByName)]
pub(crate) struct RowJson {
    #[diesel(sql_type = Text)]
    pub(crate) row_json: String,
}

impl RowJson {
    pub(crate) fn parse(&self) -> Result<JsonRow, DatabaseError> {
        match serde_json::from_str::<Value>(&self.row_json) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(DatabaseError::Decode(format!(
                "expected a JSON object per row, got {}",
                other
            ))),
            Err(e) => Err(DatabaseError::Decode(e.to_string())),
        }
    }
}
