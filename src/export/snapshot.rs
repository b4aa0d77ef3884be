use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::{Number, Value};

use crate::db::{Column, DatabaseError, JsonRow};

use super::layout::BackupStamp;

#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Integer(i64),
    /// Any other JSON number, kept as the exact text the database produced.
    Number(Number),
    Boolean(bool),
    Text(String),
    Timestamp(String),
}

impl Scalar {
    /// Converts one JSON cell. Nested values (json/jsonb, arrays) are kept
    /// as their JSON text.
    pub fn from_json(value: Value, column: &Column) -> Self {
        match value {
            Value::Null => Scalar::Null,
            Value::Bool(b) => Scalar::Boolean(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Scalar::Integer(i),
                None => Scalar::Number(n),
            },
            Value::String(s) if column.is_temporal() => Scalar::Timestamp(normalize_timestamp(s)),
            Value::String(s) => Scalar::Text(s),
            nested @ (Value::Array(_) | Value::Object(_)) => Scalar::Text(nested.to_string()),
        }
    }
}

// row_to_json renders timestamps as ISO 8601; the dump uses the database's
// own `YYYY-MM-DD HH:MM:SS` text form.
fn normalize_timestamp(mut s: String) -> String {
    if s.find('T') == Some(10) {
        s.replace_range(10..11, " ");
    }
    s
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Scalar::Null => serializer.serialize_none(),
            Scalar::Integer(i) => serializer.serialize_i64(*i),
            Scalar::Number(n) => n.serialize(serializer),
            Scalar::Boolean(b) => serializer.serialize_bool(*b),
            Scalar::Text(s) | Scalar::Timestamp(s) => serializer.serialize_str(s),
        }
    }
}

/// The rows of one table. Every row carries exactly the captured column
/// list, in the same order.
#[derive(Debug, Clone, PartialEq)]
pub struct TableDump {
    name: String,
    columns: Vec<Column>,
    rows: Vec<Vec<Scalar>>,
}

impl TableDump {
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn rows(&self) -> &[Vec<Scalar>] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Aligns a result row to the column list. Missing or extra keys mean the
    /// statement does not return the table's column set.
    pub fn push_json(&mut self, mut row: JsonRow) -> Result<(), DatabaseError> {
        let mut values = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            let value = row.remove(&column.name).ok_or_else(|| {
                DatabaseError::Decode(format!(
                    "column `{}` missing from a row of `{}`",
                    column.name, self.name
                ))
            })?;
            values.push(Scalar::from_json(value, column));
        }

        if let Some(extra) = row.keys().next() {
            return Err(DatabaseError::Decode(format!(
                "unexpected column `{}` in a row of `{}`",
                extra, self.name
            )));
        }

        self.rows.push(values);
        Ok(())
    }
}

struct RowRecord<'a> {
    columns: &'a [Column],
    values: &'a [Scalar],
}

impl Serialize for RowRecord<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (column, value) in self.columns.iter().zip(self.values) {
            map.serialize_entry(&column.name, value)?;
        }
        map.end()
    }
}

impl Serialize for TableDump {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for values in &self.rows {
            seq.serialize_element(&RowRecord {
                columns: &self.columns,
                values,
            })?;
        }
        seq.end()
    }
}

/// One run's capture of every table that was read successfully.
#[derive(Debug, Clone)]
pub struct Snapshot {
    stamp: BackupStamp,
    tables: Vec<TableDump>,
}

impl Snapshot {
    pub fn new(stamp: BackupStamp, tables: Vec<TableDump>) -> Self {
        Self { stamp, tables }
    }

    pub fn stamp(&self) -> &BackupStamp {
        &self.stamp
    }

    /// Tables with at least one row, in configured order.
    pub fn tables(&self) -> impl Iterator<Item = &TableDump> {
        self.tables.iter().filter(|t| !t.is_empty())
    }

    pub fn table(&self, name: &str) -> Option<&TableDump> {
        self.tables().find(|t| t.name == name)
    }

    pub fn row_count(&self) -> usize {
        self.tables.iter().map(TableDump::len).sum()
    }
}

impl Serialize for Snapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for table in self.tables() {
            map.serialize_entry(table.name(), table)?;
        }
        map.end()
    }
}
