use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};

use super::ExportError;

const STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const BACKUP_DIR: &str = "backup";

/// `YYYYMMDD_HHMMSS` token shared by every artifact of one run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BackupStamp(String);

impl BackupStamp {
    pub fn now() -> Self {
        Self::from_datetime(&Local::now().naive_local())
    }

    pub fn from_datetime(datetime: &NaiveDateTime) -> Self {
        Self(datetime.format(STAMP_FORMAT).to_string())
    }

    pub fn parse(token: &str) -> Result<Self, chrono::ParseError> {
        NaiveDateTime::parse_from_str(token, STAMP_FORMAT).map(|dt| Self::from_datetime(&dt))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `backup_<stamp>.<extension>`
    pub fn file_name(&self, extension: &str) -> String {
        format!("backup_{}.{}", self.0, extension)
    }
}

impl fmt::Display for BackupStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub json: PathBuf,
    pub zip: PathBuf,
    pub sql: PathBuf,
}

impl ArtifactPaths {
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Path)> {
        [
            ("json", self.json.as_path()),
            ("zip", self.zip.as_path()),
            ("sql", self.sql.as_path()),
        ]
        .into_iter()
    }
}

/// `backup/`, `backup/zip/` and `backup/sql/` under an output root.
#[derive(Debug, Clone)]
pub struct BackupLayout {
    backup_dir: PathBuf,
}

impl BackupLayout {
    pub fn new(output_root: &Path) -> Self {
        let backup_dir = if output_root == Path::new(".") {
            PathBuf::from(BACKUP_DIR)
        } else {
            output_root.join(BACKUP_DIR)
        };
        Self { backup_dir }
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    pub fn zip_dir(&self) -> PathBuf {
        self.backup_dir.join("zip")
    }

    pub fn sql_dir(&self) -> PathBuf {
        self.backup_dir.join("sql")
    }

    pub fn ensure_dirs(&self) -> Result<(), ExportError> {
        for dir in [self.backup_dir.clone(), self.zip_dir(), self.sql_dir()] {
            std::fs::create_dir_all(&dir)
                .map_err(|source| ExportError::Filesystem { path: dir, source })?;
        }
        Ok(())
    }

    pub fn artifacts(&self, stamp: &BackupStamp) -> ArtifactPaths {
        ArtifactPaths {
            json: self.backup_dir.join(stamp.file_name("json")),
            zip: self.zip_dir().join(stamp.file_name("zip")),
            sql: self.sql_dir().join(stamp.file_name("sql")),
        }
    }
}
