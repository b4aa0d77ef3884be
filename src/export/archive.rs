use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::ExportError;

/// Writes `archive` holding exactly one deflated entry, `entry_name`, with
/// the contents of `source`.
pub fn write_single_file_archive(
    archive: &Path,
    entry_name: &str,
    source: &Path,
) -> Result<(), ExportError> {
    let archive_error = |source| ExportError::Archive {
        path: archive.to_path_buf(),
        source,
    };

    let mut input = BufReader::new(File::open(source).map_err(ExportError::filesystem(source))?);
    let output = File::create(archive).map_err(ExportError::filesystem(archive))?;

    let mut zip = ZipWriter::new(output);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    zip.start_file(entry_name, options).map_err(archive_error)?;
    io::copy(&mut input, &mut zip).map_err(ExportError::filesystem(archive))?;
    zip.finish().map_err(archive_error)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use tempfile::TempDir;
    use zip::ZipArchive;

    use super::*;

    #[test]
    fn archive_contains_only_the_named_entry() {
        let dir = TempDir::new().expect("temp dir");
        let source = dir.path().join("backup_20240301_090507.json");
        std::fs::write(&source, br#"{"users":[]}"#).expect("write source");
        let archive = dir.path().join("backup_20240301_090507.zip");

        write_single_file_archive(&archive, "backup_20240301_090507.json", &source)
            .expect("write archive");

        let mut zip = ZipArchive::new(File::open(&archive).expect("open archive")).expect("read");
        assert_eq!(zip.len(), 1);
        let mut entry = zip.by_index(0).expect("entry");
        assert_eq!(entry.name(), "backup_20240301_090507.json");
        let mut contents = String::new();
        entry.read_to_string(&mut contents).expect("read entry");
        assert_eq!(contents, r#"{"users":[]}"#);
    }

    #[test]
    fn missing_source_is_a_filesystem_error() {
        let dir = TempDir::new().expect("temp dir");
        let result = write_single_file_archive(
            &dir.path().join("out.zip"),
            "absent.json",
            &dir.path().join("absent.json"),
        );
        assert!(matches!(result, Err(ExportError::Filesystem { .. })));
    }
}
