use std::path::PathBuf;

use thiserror::Error;

use crate::db::DatabaseError;

/// Failures that abort a whole export run.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("database connection failed: {0}")]
    Connection(#[source] DatabaseError),
    #[error("filesystem error at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write archive {}: {source}", path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
}

impl ExportError {
    pub(crate) fn filesystem(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| ExportError::Filesystem { path, source }
    }
}

/// A table left out of the snapshot because reading it failed.
#[derive(Debug, Error)]
#[error("failed to back up table {table}: {source}")]
pub struct TableReadError {
    pub table: String,
    #[source]
    pub source: DatabaseError,
}
