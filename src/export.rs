pub use self::error::{ExportError, TableReadError};
pub use self::layout::{ArtifactPaths, BackupLayout, BackupStamp};
pub use self::pipeline::{ExportReport, run_export};

pub mod archive;
pub mod error;
pub mod layout;
pub mod pipeline;
pub mod snapshot;
pub mod sql;
