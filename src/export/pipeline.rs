use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::{info, warn};

use crate::config::DatabaseConfig;
use crate::db::{DatabaseError, DatabaseManager, TableQuery, TableSource};

use super::archive::write_single_file_archive;
use super::error::TableReadError;
use super::layout::{ArtifactPaths, BackupLayout, BackupStamp};
use super::snapshot::{Snapshot, TableDump};
use super::sql::write_script;
use super::ExportError;

/// What one run produced.
#[derive(Debug)]
pub struct ExportReport {
    pub paths: ArtifactPaths,
    pub exported: Vec<(String, usize)>,
    pub skipped: Vec<TableReadError>,
}

/// Tables read from one connection, before the run is stamped.
#[derive(Debug, Default)]
pub struct CollectedTables {
    pub dumps: Vec<TableDump>,
    pub skipped: Vec<TableReadError>,
}

/// Dumps every configured table through a single connection and writes the
/// JSON snapshot, its zip archive and the SQL reconstruction script.
///
/// Only a failed connection or a failed write aborts the run; a table that
/// cannot be read is logged and left out.
pub fn run_export(
    database: &DatabaseConfig,
    tables: &[TableQuery],
    output_root: &Path,
) -> Result<ExportReport, ExportError> {
    let layout = BackupLayout::new(output_root);
    layout.ensure_dirs()?;

    let mut manager = DatabaseManager::connect(database).map_err(ExportError::Connection)?;
    let collected = collect_tables(manager.source(), tables);
    let report = write_artifacts(&layout, BackupStamp::now(), collected);
    manager.close();

    report
}

pub fn collect_tables(source: &mut dyn TableSource, tables: &[TableQuery]) -> CollectedTables {
    let mut collected = CollectedTables::default();

    for table in tables {
        match read_table(source, table) {
            Ok(Some(dump)) => {
                info!("read {} rows from {}", dump.len(), table.name);
                collected.dumps.push(dump);
            }
            Ok(None) => {
                warn!("no columns found for table {}", table.name);
            }
            Err(err) => {
                let error = TableReadError {
                    table: table.name.clone(),
                    source: err,
                };
                warn!("{}", error);
                collected.skipped.push(error);
            }
        }
    }

    collected
}

fn read_table(
    source: &mut dyn TableSource,
    table: &TableQuery,
) -> Result<Option<TableDump>, DatabaseError> {
    let columns = source.columns(table)?;
    if columns.is_empty() {
        source.verify(table)?;
        return Ok(None);
    }

    let rows = source.rows(table)?;
    let mut dump = TableDump::new(table.name.clone(), columns);
    for row in rows {
        dump.push_json(row)?;
    }
    Ok(Some(dump))
}

pub fn write_artifacts(
    layout: &BackupLayout,
    stamp: BackupStamp,
    collected: CollectedTables,
) -> Result<ExportReport, ExportError> {
    let paths = layout.artifacts(&stamp);
    if paths.json.exists() {
        warn!(
            "overwriting existing backup {} from the same second",
            paths.json.display()
        );
    }

    let exported = collected
        .dumps
        .iter()
        .filter(|dump| !dump.is_empty())
        .map(|dump| (dump.name().to_string(), dump.len()))
        .collect();
    let snapshot = Snapshot::new(stamp, collected.dumps);

    write_snapshot(&paths.json, &snapshot)?;
    write_single_file_archive(&paths.zip, &snapshot.stamp().file_name("json"), &paths.json)?;
    write_script(&paths.sql, &snapshot)?;

    info!(
        "backup {} written with {} rows",
        snapshot.stamp(),
        snapshot.row_count()
    );

    Ok(ExportReport {
        paths,
        exported,
        skipped: collected.skipped,
    })
}

fn write_snapshot(path: &Path, snapshot: &Snapshot) -> Result<(), ExportError> {
    let file = File::create(path).map_err(ExportError::filesystem(path))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, snapshot)?;
    writer.flush().map_err(ExportError::filesystem(path))
}
