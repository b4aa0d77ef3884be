use std::path::Path;

use diesel::prelude::*;
use diesel::sql_types::Text;
use diesel::sqlite::SqliteConnection;

use super::source::{CatalogColumn, RowJson};
use super::{Column, DatabaseError, JsonRow, TableQuery, TableSource};

const COLUMNS_QUERY: &str =
    "SELECT name AS column_name, type AS data_type FROM pragma_table_info(?) ORDER BY cid";

pub struct SqliteTableSource {
    conn: SqliteConnection,
    // Captured by `columns` so `rows` can build its json_object() call.
    last_columns: Option<(String, Vec<Column>)>,
}

impl SqliteTableSource {
    /// Opens an existing database file; a missing file is a connection
    /// error rather than a fresh empty database.
    pub fn connect(path: &str) -> Result<Self, DatabaseError> {
        if !Path::new(path).is_file() {
            return Err(DatabaseError::Connection(format!(
                "sqlite database file not found: {}",
                path
            )));
        }

        let conn = SqliteConnection::establish(path)
            .map_err(|e| DatabaseError::Connection(e.to_string()))?;
        Ok(Self {
            conn,
            last_columns: None,
        })
    }

    fn columns_for(&mut self, table: &TableQuery) -> Result<Vec<Column>, DatabaseError> {
        if let Some((ref name, ref columns)) = self.last_columns {
            if name == &table.name {
                return Ok(columns.clone());
            }
        }
        self.columns(table)
    }
}

impl TableSource for SqliteTableSource {
    fn columns(&mut self, table: &TableQuery) -> Result<Vec<Column>, DatabaseError> {
        let columns: Vec<Column> = diesel::sql_query(COLUMNS_QUERY)
            .bind::<Text, _>(table.name.clone())
            .load::<CatalogColumn>(&mut self.conn)
            .map_err(|e| DatabaseError::Query(e.to_string()))?
            .into_iter()
            .map(Column::from)
            .collect();

        self.last_columns = Some((table.name.clone(), columns.clone()));
        Ok(columns)
    }

    fn rows(&mut self, table: &TableQuery) -> Result<Vec<JsonRow>, DatabaseError> {
        let columns = self.columns_for(table)?;
        if columns.is_empty() {
            self.verify(table)?;
            return Ok(Vec::new());
        }

        let statement = format!(
            "SELECT {} AS row_json FROM ({})",
            json_object_expr(&columns),
            table.as_subquery()
        );

        diesel::sql_query(statement)
            .load::<RowJson>(&mut self.conn)
            .map_err(|e| DatabaseError::Query(e.to_string()))?
            .iter()
            .map(RowJson::parse)
            .collect()
    }

    fn verify(&mut self, table: &TableQuery) -> Result<(), DatabaseError> {
        diesel::sql_query(table.verify_statement())
            .execute(&mut self.conn)
            .map(|_| ())
            .map_err(|e| DatabaseError::Query(e.to_string()))
    }
}

fn json_object_expr(columns: &[Column]) -> String {
    let pairs: Vec<String> = columns
        .iter()
        .map(|c| {
            format!(
                "'{}', \"{}\"",
                c.name.replace('\'', "''"),
                c.name.replace('"', "\"\"")
            )
        })
        .collect();
    format!("json_object({})", pairs.join(", "))
}
