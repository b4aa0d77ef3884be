use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::sql_types::Text;

use super::source::{CatalogColumn, RowJson};
use super::{Column, DatabaseError, JsonRow, TableQuery, TableSource};

// pg_attribute resolves the name through the search path and, unlike
// information_schema, lists columns of tables the role cannot read.
const COLUMNS_QUERY: &str = r#"
    SELECT a.attname::text AS column_name,
           format_type(a.atttypid, a.atttypmod) AS data_type
    FROM pg_catalog.pg_attribute a
    WHERE a.attrelid = to_regclass($1) AND a.attnum > 0 AND NOT a.attisdropped
    ORDER BY a.attnum
"#;

pub struct PostgresTableSource {
    conn: PgConnection,
}

impl PostgresTableSource {
    pub fn connect(connection_string: &str) -> Result<Self, DatabaseError> {
        let conn = PgConnection::establish(connection_string)
            .map_err(|e| DatabaseError::Connection(e.to_string()))?;
        Ok(Self { conn })
    }
}

impl TableSource for PostgresTableSource {
    fn columns(&mut self, table: &TableQuery) -> Result<Vec<Column>, DatabaseError> {
        let columns = diesel::sql_query(COLUMNS_QUERY)
            .bind::<Text, _>(table.name.clone())
            .load::<CatalogColumn>(&mut self.conn)
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        Ok(columns.into_iter().map(Column::from).collect())
    }

    fn rows(&mut self, table: &TableQuery) -> Result<Vec<JsonRow>, DatabaseError> {
        let statement = format!(
            "SELECT row_to_json(t)::text AS row_json FROM ({}) AS t",
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
