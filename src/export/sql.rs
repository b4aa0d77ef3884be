use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::snapshot::{Scalar, Snapshot, TableDump};
use super::ExportError;

/// Renders one value as a SQL literal. Only single quotes are escaped.
pub fn format_value(value: &Scalar) -> String {
    match value {
        Scalar::Null => "NULL".to_string(),
        Scalar::Integer(i) => i.to_string(),
        Scalar::Number(n) => n.to_string(),
        Scalar::Boolean(true) => "TRUE".to_string(),
        Scalar::Boolean(false) => "FALSE".to_string(),
        Scalar::Text(s) | Scalar::Timestamp(s) => quote(s),
    }
}

fn quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

fn render_table(out: &mut String, table: &TableDump) {
    let columns: Vec<&str> = table.column_names().collect();
    let _ = write!(out, "\n-- Table: {}\n", table.name());
    let _ = writeln!(
        out,
        "INSERT INTO {} ({}) VALUES",
        table.name(),
        columns.join(", ")
    );

    let tuples: Vec<String> = table
        .rows()
        .iter()
        .map(|row| {
            let values: Vec<String> = row.iter().map(format_value).collect();
            format!("({})", values.join(", "))
        })
        .collect();
    out.push_str(&tuples.join(",\n"));
    out.push_str(";\n");
}

/// One commented multi-row INSERT per non-empty table.
pub fn render_script(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    for table in snapshot.tables() {
        render_table(&mut out, table);
    }
    out
}

pub fn write_script(path: &Path, snapshot: &Snapshot) -> Result<(), ExportError> {
    let file = File::create(path).map_err(ExportError::filesystem(path))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(render_script(snapshot).as_bytes())
        .and_then(|_| writer.flush())
        .map_err(ExportError::filesystem(path))
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use test_case::test_case;

    use super::*;
    use crate::db::Column;
    use crate::export::layout::BackupStamp;

    fn number(text: &str) -> Scalar {
        match serde_json::from_str(text).expect("number") {
            serde_json::Value::Number(n) => Scalar::Number(n),
            other => panic!("not a number: {other}"),
        }
    }

    #[test_case(Scalar::Null, "NULL" ; "null")]
    #[test_case(Scalar::Integer(-42), "-42" ; "integer")]
    #[test_case(number("10.5"), "10.5" ; "float")]
    #[test_case(number("3.0"), "3.0" ; "whole float keeps its point")]
    #[test_case(number("12.50"), "12.50" ; "numeric scale kept")]
    #[test_case(number("99999999999999999999"), "99999999999999999999" ; "beyond i64")]
    #[test_case(Scalar::Text("NaN".into()), "'NaN'" ; "nan arrives as text")]
    #[test_case(Scalar::Boolean(true), "TRUE" ; "boolean")]
    #[test_case(Scalar::Text("O'Brien".into()), "'O''Brien'" ; "quote doubled")]
    #[test_case(Scalar::Text("a\\b\nc".into()), "'a\\b\nc'" ; "no other escaping")]
    #[test_case(Scalar::Timestamp("2024-03-01 09:30:00".into()), "'2024-03-01 09:30:00'" ; "timestamp quoted")]
    fn value_formatting(value: Scalar, expected: &str) {
        assert_eq!(format_value(&value), expected);
    }

    #[test]
    fn doubled_quotes_round_trip() {
        let original = "it's O'Brien''s";
        let literal = format_value(&Scalar::Text(original.to_string()));
        let inner = &literal[1..literal.len() - 1];
        assert_eq!(inner.replace("''", "'"), original);
    }

    fn snapshot(tables: Vec<TableDump>) -> Snapshot {
        Snapshot::new(BackupStamp::parse("20240301_090507").expect("valid"), tables)
    }

    #[test]
    fn script_matches_single_row_layout() {
        let mut users = TableDump::new(
            "users",
            vec![Column::new("id", "integer"), Column::new("name", "text")],
        );
        users
            .push_json(json!({"id": 1, "name": "O'Brien"}).as_object().cloned().expect("object"))
            .expect("push");

        let script = render_script(&snapshot(vec![users]));
        assert_eq!(
            script,
            "\n-- Table: users\nINSERT INTO users (id, name) VALUES\n(1, 'O''Brien');\n"
        );
        assert!(script.contains("INSERT INTO users (id, name) VALUES\n(1, 'O''Brien');"));
    }

    #[test]
    fn multi_row_tuples_are_comma_newline_joined() {
        let mut cards = TableDump::new(
            "cards",
            vec![Column::new("id", "integer"), Column::new("holder", "text")],
        );
        for row in [json!({"id": 1, "holder": null}), json!({"id": 2, "holder": "Ann"})] {
            cards
                .push_json(row.as_object().cloned().expect("object"))
                .expect("push");
        }

        let script = render_script(&snapshot(vec![cards]));
        assert!(script.ends_with("VALUES\n(1, NULL),\n(2, 'Ann');\n"));
    }

    #[test]
    fn empty_tables_produce_no_statements() {
        let users = TableDump::new("users", vec![Column::new("id", "integer")]);
        assert_eq!(render_script(&snapshot(vec![users])), "");
    }
}
